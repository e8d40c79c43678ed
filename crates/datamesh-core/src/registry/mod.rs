//! Registry protocol: username claims and ownership proofs
//!
//! A participant binds its locally generated keypair to a human-chosen
//! username at a shared registry, then proves possession of the bound
//! private key to adopt the registry's authoritative profile identifier.
//!
//! - [`protocol`] — wire messages, error codes, proof derivation
//! - [`service`] — the registry side: claims, verification, conflict rules
//! - [`client`] — the participant side: `prove_profile_key`

pub mod client;
pub mod protocol;
pub mod service;

// Re-export public types
pub use client::{
    LocalTransport, ProveParams, RegistryClient, RegistryTransport, DEFAULT_REGISTRY_TIMEOUT,
};
pub use protocol::{
    credential_digest, proof_message, reconcile, Credential, ProofRequest, RegistryErrorCode,
    RegistryRequest, RegistryResponse, REGISTRY_ALPN,
};
pub use service::{RegistryRecord, RegistryService};
