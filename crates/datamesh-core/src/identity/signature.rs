//! Ed25519 signature wrapper with byte-level serialization

use crate::MeshError;
use ed25519_dalek::Signature as Ed25519Signature;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Detached Ed25519 signature over an ownership proof message.
#[derive(Clone)]
pub struct Signature(Ed25519Signature);

impl Signature {
    pub(crate) fn new(inner: Ed25519Signature) -> Self {
        Self(inner)
    }

    pub(crate) fn inner(&self) -> &Ed25519Signature {
        &self.0
    }

    /// Serialize the signature to bytes (64 bytes)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }

    /// Deserialize a signature from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MeshError> {
        let raw: [u8; 64] = bytes
            .try_into()
            .map_err(|_| MeshError::Identity("invalid signature length".to_string()))?;
        Ok(Self(Ed25519Signature::from_bytes(&raw)))
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signature")
            .field(&hex::encode(self.0.to_bytes()))
            .finish()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bytes() == other.0.to_bytes()
    }
}

impl Eq for Signature {}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
