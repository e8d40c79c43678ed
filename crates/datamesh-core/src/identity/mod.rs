//! Identity module for Datamesh
//!
//! Every participant holds an Ed25519 keypair generated on first run. The
//! private key never leaves the process; the public key is what gets bound
//! to a username at the registry.
//!
//! ## Overview
//!
//! - **Keypairs**: Ed25519 signing keys with byte-level persistence
//! - **Peer identifiers**: the network-level address of a participant
//! - **Profile identifiers**: derived deterministically from a peer
//!   identifier, or adopted from the registry after a successful proof
//!
//! ## Example
//!
//! ```rust
//! use datamesh_core::identity::{Keypair, PeerId, ProfileId};
//!
//! let keypair = Keypair::generate();
//! let public_key = keypair.public_key();
//!
//! // Sign and verify a message
//! let message = b"hello, mesh";
//! let signature = keypair.sign(message);
//! assert!(public_key.verify(message, &signature));
//!
//! // Derive a profile identifier from a peer identifier
//! let peer_id = PeerId::from_public_key(&public_key);
//! let profile_id = ProfileId::from_peer_id(&peer_id);
//! println!("profile: {}", profile_id);
//! ```

mod keypair;
mod profile_id;
mod signature;

// Re-export public types
pub use keypair::{Keypair, PublicKey};
pub use profile_id::{PeerId, ProfileId};
pub use signature::Signature;
