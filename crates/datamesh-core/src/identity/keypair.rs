//! Ed25519 keypair for participant identity
//!
//! The keypair is generated once per participant and persisted as opaque
//! bytes. Signing proves possession of the private key without ever
//! transmitting it.

use crate::identity::Signature;
use crate::MeshError;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ed25519 keypair used to sign ownership proofs.
pub struct Keypair {
    signing: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        // Use getrandom directly to avoid rand version conflicts
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).expect("Failed to get random bytes");
        Self {
            signing: SigningKey::from_bytes(&seed),
        }
    }

    /// Generate a deterministic keypair from a 32-byte seed
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(seed),
        }
    }

    /// Get the public key for this keypair
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing.verifying_key())
    }

    /// Sign a message with the private key
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing.sign(message))
    }

    /// Serialize the private key seed to bytes (32 bytes)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.signing.as_bytes().to_vec()
    }

    /// Deserialize a keypair from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MeshError> {
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| MeshError::Identity("invalid keypair seed length".to_string()))?;
        Ok(Self {
            signing: SigningKey::from_bytes(&seed),
        })
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self {
            signing: SigningKey::from_bytes(self.signing.as_bytes()),
        }
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field(
                "public",
                &hex::encode(self.signing.verifying_key().as_bytes()),
            )
            .finish_non_exhaustive()
    }
}

impl Serialize for Keypair {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for Keypair {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Ed25519 public key used for proof verification.
#[derive(Clone)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Verify a signature against a message
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.0.verify(message, signature.inner()).is_ok()
    }

    /// Serialize the public key to bytes (32 bytes)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    /// Deserialize a public key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MeshError> {
        let raw: [u8; 32] = bytes
            .try_into()
            .map_err(|_| MeshError::Identity("invalid public key length".to_string()))?;
        let key = VerifyingKey::from_bytes(&raw)
            .map_err(|_| MeshError::Identity("invalid public key".to_string()))?;
        Ok(Self(key))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&hex::encode(self.0.as_bytes()))
            .finish()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes() == other.0.as_bytes()
    }
}

impl Eq for PublicKey {}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.as_bytes().hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}
