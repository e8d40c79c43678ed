//! Peer and profile identifiers
//!
//! A `PeerId` is the network-level address of a participant. A `ProfileId`
//! is the canonical identity handle used by the rest of the system: it is
//! derived deterministically from a peer identifier, unless the registry
//! later hands back an authoritative value for it.

use crate::identity::PublicKey;
use crate::MeshError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network-level identifier for a participant (32 bytes, base58-encoded
/// for display).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId([u8; 32]);

impl PeerId {
    /// Construct a peer identifier from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a peer identifier from a public key (BLAKE3 of the key bytes)
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let hash = blake3::hash(&public_key.to_bytes());
        Self(*hash.as_bytes())
    }

    /// Get the raw bytes of the identifier
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(&self.0).into_string())
    }
}

impl FromStr for PeerId {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| MeshError::Identity("invalid base58 in peer id".to_string()))?;
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| MeshError::Identity("peer id must be 32 bytes".to_string()))?;
        Ok(Self(raw))
    }
}

/// Canonical identity handle for a participant.
///
/// Derived as base58(BLAKE3(peer id bytes)). The derivation is pure and
/// total: equal peer identifiers always produce equal profile identifiers,
/// and distinct peers collide only with cryptographically negligible
/// probability. After a successful ownership proof the registry's
/// authoritative value replaces the locally derived one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(String);

impl ProfileId {
    /// Derive a profile identifier from a network peer identifier
    pub fn from_peer_id(peer_id: &PeerId) -> Self {
        let hash = blake3::hash(peer_id.as_bytes());
        ProfileId(bs58::encode(hash.as_bytes()).into_string())
    }

    /// Parse a profile identifier from its base58 string form
    pub fn parse(s: &str) -> Result<Self, MeshError> {
        if s.is_empty() {
            return Err(MeshError::Identity(
                "profile id cannot be empty".to_string(),
            ));
        }
        bs58::decode(s)
            .into_vec()
            .map_err(|_| MeshError::Identity("invalid base58 in profile id".to_string()))?;
        Ok(ProfileId(s.to_string()))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProfileId {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProfileId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
