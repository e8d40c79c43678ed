//! Local profile and the profile store
//!
//! The profile store exclusively owns the local participant's identity
//! record: username, keypair, and current profile identifier. It is
//! created once per runtime session and passed explicitly to whatever
//! needs it; there is no ambient global owner.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::identity::{Keypair, PeerId, ProfileId, PublicKey};
use crate::storage::Storage;

/// The local participant's identity record.
///
/// The profile identifier starts out derived from the participant's
/// network peer identifier and is replaced exactly once per successful
/// ownership proof with the registry's authoritative value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Human-chosen username for this participant
    pub username: String,
    /// Public half of the identity keypair
    pub public_key: PublicKey,
    /// Identity keypair (the private key never leaves this process)
    pub keypair: Keypair,
    /// Canonical identity handle, locally derived or registry-authoritative
    pub profile_id: ProfileId,
    /// Unix timestamp when the profile was created
    pub created_at: i64,
}

impl Profile {
    /// Create a profile with an identifier derived from the given peer id.
    pub fn new(username: String, keypair: Keypair, peer_id: &PeerId) -> Self {
        let public_key = keypair.public_key();
        Self {
            username,
            public_key,
            keypair,
            profile_id: ProfileId::from_peer_id(peer_id),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Check the record is complete: a username is present and the stored
    /// public key matches the keypair.
    pub fn validate(&self) -> MeshResult<()> {
        if self.username.is_empty() {
            return Err(MeshError::Validation("username is empty".to_string()));
        }
        if self.keypair.public_key() != self.public_key {
            return Err(MeshError::Validation(
                "public key does not match keypair".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owner of the local profile record.
///
/// Reads and writes are atomic: `set_owner` swaps the whole record under a
/// write lock after persisting it, so a concurrent `get_owner` observes
/// either the old record or the new one, never a partial update.
pub struct ProfileStore {
    storage: Storage,
    owner: RwLock<Option<Profile>>,
}

impl ProfileStore {
    /// Open the profile store, loading any persisted owner record.
    pub fn open(storage: Storage) -> MeshResult<Self> {
        let owner = storage.load_owner()?;
        Ok(Self {
            storage,
            owner: RwLock::new(owner),
        })
    }

    /// Return the current owner record.
    ///
    /// Fails with `NoLocalIdentity` if no owner has been set.
    pub fn get_owner(&self) -> MeshResult<Profile> {
        self.owner.read().clone().ok_or(MeshError::NoLocalIdentity)
    }

    /// Replace the owner record.
    ///
    /// Fails with a `Validation` error if the profile lacks a username or
    /// its keys are inconsistent. The record is persisted before the
    /// in-memory copy is swapped; the write lock is held across both so the
    /// update is atomic with respect to readers.
    pub fn set_owner(&self, profile: &Profile) -> MeshResult<()> {
        profile.validate()?;

        let mut guard = self.owner.write();
        self.storage.save_owner(profile)?;
        *guard = Some(profile.clone());
        debug!(username = %profile.username, profile_id = %profile.profile_id, "owner profile replaced");
        Ok(())
    }
}
