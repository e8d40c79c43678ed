//! Registry wire protocol
//!
//! Defines the request/response messages exchanged between the registry
//! client and the registry service, along with the proof message and
//! credential digest derivations. Transport framing is left to whatever
//! carries the bytes; only the message fields and error codes here are
//! load-bearing.
//!
//! ## Message Flow
//!
//! ```text
//! Participant                        Registry
//!   |                                   |
//!   |--- Register ---------------------->|
//!   |    (username, pubkey, credential)  |
//!   |<-- Profile(authoritative id) ------|
//!   |                                   |
//!   |--- Prove -------------------------->|
//!   |    (username, credential,          |
//!   |     pubkey, signature)             |
//!   |<-- Profile(authoritative id) ------|
//!   |    or Denied(code)                 |
//! ```
//!
//! ## Proof Message Derivation
//!
//! The signed payload is a domain-separated BLAKE3 digest, so the raw
//! credential bytes are never what gets signed:
//!
//! ```text
//! proof_message     = BLAKE3("datamesh-proof-v1" || username || email || password)
//! credential_digest = BLAKE3("datamesh-credential-v1" || username || email || password)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::MeshError;
use crate::identity::{PeerId, ProfileId, PublicKey, Signature};

/// ALPN protocol identifier for registry exchanges
pub const REGISTRY_ALPN: &[u8] = b"/datamesh/registry/1";

/// Credential a participant submits alongside a claim or proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Account email address
    pub email: String,
    /// Account password
    pub password: String,
}

/// Derive the 32-byte payload that gets signed for an ownership proof
pub fn proof_message(username: &str, credential: &Credential) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"datamesh-proof-v1");
    hasher.update(username.as_bytes());
    hasher.update(credential.email.as_bytes());
    hasher.update(credential.password.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Derive the digest the registry keeps on file for credential checks
pub fn credential_digest(username: &str, credential: &Credential) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"datamesh-credential-v1");
    hasher.update(username.as_bytes());
    hasher.update(credential.email.as_bytes());
    hasher.update(credential.password.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Signed assertion that the caller controls the private key bound to a
/// claimed username. Constructed per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofRequest {
    /// Username whose registry record is being proven
    pub username: String,
    /// Submitted credential, checked against the record on file
    pub credential: Credential,
    /// Caller's self-declared public key
    pub public_key: PublicKey,
    /// Signature over `proof_message(username, credential)` with the
    /// caller's private key
    pub signature: Signature,
}

/// Registry protocol requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistryRequest {
    /// Claim an unclaimed username, binding it to a public key
    Register {
        /// Username being claimed
        username: String,
        /// Public key to bind to the username
        public_key: PublicKey,
        /// Credential to keep on file for later proof checks
        credential: Credential,
        /// Registrant's peer id, the source of the default authoritative
        /// profile identifier
        peer_id: PeerId,
    },
    /// Prove ownership of an already-claimed username
    Prove(ProofRequest),
}

/// Registry protocol responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryResponse {
    /// The authoritative profile identifier for the username
    Profile(ProfileId),
    /// The request was rejected
    Denied(RegistryErrorCode),
}

/// Structured error codes carried on the wire when a registry request is
/// rejected. Rejections are reported verbatim to the caller and never
/// retried automatically: retrying without changed input cannot succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum RegistryErrorCode {
    /// No record exists for the submitted username
    #[error("username is not registered")]
    UnknownUsername,
    /// Signature did not verify against the record's bound key
    #[error("signature does not match the bound key")]
    InvalidSignature,
    /// Credential did not match the one on file
    #[error("invalid credential")]
    InvalidCredential,
    /// Username is already bound to a different public key
    #[error("username already claimed")]
    AlreadyClaimed,
}

impl RegistryErrorCode {
    /// Convert a wire code into the crate error, attaching the username
    /// for the variants that carry one.
    pub fn into_error(self, username: &str) -> MeshError {
        match self {
            RegistryErrorCode::UnknownUsername => MeshError::UnknownUsername(username.to_string()),
            RegistryErrorCode::InvalidSignature => MeshError::InvalidSignature,
            RegistryErrorCode::InvalidCredential => MeshError::InvalidCredential,
            RegistryErrorCode::AlreadyClaimed => MeshError::AlreadyClaimed(username.to_string()),
        }
    }
}

impl RegistryRequest {
    /// Encode a request to bytes using postcard
    pub fn encode(&self) -> Result<Vec<u8>, MeshError> {
        postcard::to_allocvec(self).map_err(|e| MeshError::Serialization(e.to_string()))
    }

    /// Decode a request from bytes using postcard
    pub fn decode(data: &[u8]) -> Result<Self, MeshError> {
        postcard::from_bytes(data).map_err(|e| MeshError::Serialization(e.to_string()))
    }
}

impl RegistryResponse {
    /// Encode a response to bytes using postcard
    pub fn encode(&self) -> Result<Vec<u8>, MeshError> {
        postcard::to_allocvec(self).map_err(|e| MeshError::Serialization(e.to_string()))
    }

    /// Decode a response from bytes using postcard
    pub fn decode(data: &[u8]) -> Result<Self, MeshError> {
        postcard::from_bytes(data).map_err(|e| MeshError::Serialization(e.to_string()))
    }
}

/// Resolve a divergence between a locally derived profile identifier and
/// the registry's authoritative one.
///
/// The registry's record always wins: one human account maps to one
/// registry identity, however many peer identities it has passed through.
pub fn reconcile(local: &ProfileId, authoritative: &ProfileId) -> ProfileId {
    if local != authoritative {
        debug!(%local, %authoritative, "adopting authoritative profile id");
    }
    authoritative.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Keypair, PeerId};

    fn test_credential() -> Credential {
        Credential {
            email: "alice@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_proof_message_deterministic() {
        let credential = test_credential();
        assert_eq!(
            proof_message("alice", &credential),
            proof_message("alice", &credential)
        );
    }

    #[test]
    fn test_proof_message_differs_by_field() {
        let credential = test_credential();
        let other = Credential {
            email: "alice@example.com".to_string(),
            password: "wrong".to_string(),
        };

        assert_ne!(
            proof_message("alice", &credential),
            proof_message("bob", &credential)
        );
        assert_ne!(
            proof_message("alice", &credential),
            proof_message("alice", &other)
        );
    }

    #[test]
    fn test_proof_and_credential_digests_are_independent() {
        let credential = test_credential();
        // Distinct domain separators keep the signed payload and the
        // stored digest from being interchangeable.
        assert_ne!(
            proof_message("alice", &credential),
            credential_digest("alice", &credential)
        );
    }

    #[test]
    fn test_request_encode_decode_roundtrip() {
        let keypair = Keypair::generate();
        let credential = test_credential();
        let message = proof_message("alice", &credential);

        let request = RegistryRequest::Prove(ProofRequest {
            username: "alice".to_string(),
            credential,
            public_key: keypair.public_key(),
            signature: keypair.sign(&message),
        });

        let bytes = request.encode().unwrap();
        let decoded = RegistryRequest::decode(&bytes).unwrap();

        match decoded {
            RegistryRequest::Prove(proof) => {
                assert_eq!(proof.username, "alice");
                assert_eq!(proof.public_key, keypair.public_key());
                assert!(proof.public_key.verify(&message, &proof.signature));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[test]
    fn test_response_encode_decode_roundtrip() {
        let id = ProfileId::from_peer_id(&PeerId::from_bytes([1u8; 32]));
        let response = RegistryResponse::Profile(id.clone());

        let bytes = response.encode().unwrap();
        assert_eq!(RegistryResponse::decode(&bytes).unwrap(), response);

        let denied = RegistryResponse::Denied(RegistryErrorCode::AlreadyClaimed);
        let bytes = denied.encode().unwrap();
        assert_eq!(RegistryResponse::decode(&bytes).unwrap(), denied);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(RegistryRequest::decode(&[0xFF; 3]).is_err());
    }

    #[test]
    fn test_reconcile_always_returns_authoritative() {
        let local = ProfileId::from_peer_id(&PeerId::from_bytes([1u8; 32]));
        let authoritative = ProfileId::from_peer_id(&PeerId::from_bytes([2u8; 32]));

        assert_eq!(reconcile(&local, &authoritative), authoritative);
        // Agreement is a no-op
        assert_eq!(reconcile(&authoritative, &authoritative), authoritative);
    }

    #[test]
    fn test_error_code_conversion() {
        let err = RegistryErrorCode::AlreadyClaimed.into_error("alice");
        assert!(matches!(err, MeshError::AlreadyClaimed(u) if u == "alice"));

        let err = RegistryErrorCode::InvalidSignature.into_error("alice");
        assert!(matches!(err, MeshError::InvalidSignature));
    }
}
