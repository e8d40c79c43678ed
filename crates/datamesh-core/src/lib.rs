//! Datamesh Core Library
//!
//! Identity and registry core for a peer-to-peer dataset network.
//!
//! ## Overview
//!
//! Each participant generates a keypair on first run and derives a profile
//! identifier from its network peer identifier. A shared registry service
//! records which public key owns which human-chosen username. Proving
//! possession of the bound private key reconciles the local identifier with
//! the registry's authoritative one - one human account, one registry
//! identity, potentially many peer identities over time.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use datamesh_core::identity::{Keypair, PeerId};
//! use datamesh_core::profile::{Profile, ProfileStore};
//! use datamesh_core::registry::{LocalTransport, ProveParams, RegistryClient, RegistryService};
//! use datamesh_core::storage::Storage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = Storage::new("~/.datamesh/data.db")?;
//!     let profiles = ProfileStore::open(storage)?;
//!
//!     let keypair = Keypair::generate();
//!     let peer_id = PeerId::from_public_key(&keypair.public_key());
//!     profiles.set_owner(&Profile::new("alice".to_string(), keypair, &peer_id))?;
//!
//!     let registry = Arc::new(RegistryService::new());
//!     let client = RegistryClient::new(LocalTransport::new(registry));
//!     let id = client
//!         .prove_profile_key(
//!             &profiles,
//!             &ProveParams {
//!                 username: "alice".to_string(),
//!                 email: "alice@example.com".to_string(),
//!                 password: "hunter2".to_string(),
//!             },
//!         )
//!         .await?;
//!     println!("authoritative profile id: {}", id);
//!
//!     Ok(())
//! }
//! ```

pub mod datasets;
pub mod error;
pub mod identity;
pub mod profile;
pub mod registry;
pub mod storage;

// Re-exports
pub use datasets::{ContentKey, DatasetGetter, NamespaceResolver};
pub use error::{MeshError, MeshResult};
pub use identity::{Keypair, PeerId, ProfileId, PublicKey, Signature};
pub use profile::{Profile, ProfileStore};
pub use registry::{
    LocalTransport, ProveParams, RegistryClient, RegistryErrorCode, RegistryService,
    RegistryTransport,
};
pub use storage::Storage;
