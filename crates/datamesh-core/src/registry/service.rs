//! Registry service - the single source of truth for username ownership
//!
//! Holds the mapping username → (bound public key, authoritative profile
//! identifier) and validates ownership proofs against it. A username moves
//! from Unclaimed to Claimed exactly once; after that the key binding is
//! terminal and `verify` only reads and authenticates.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::identity::{PeerId, ProfileId, PublicKey};
use crate::registry::protocol::{
    credential_digest, proof_message, Credential, ProofRequest, RegistryErrorCode,
    RegistryRequest, RegistryResponse,
};

/// A claimed username and everything bound to it.
#[derive(Debug, Clone)]
pub struct RegistryRecord {
    /// The globally unique username
    pub username: String,
    /// Public key bound on first claim, never silently reassigned
    pub public_key: PublicKey,
    /// The profile identifier the registry considers correct for this
    /// username
    pub profile_id: ProfileId,
    /// Digest of the credential supplied at claim time
    credential: [u8; 32],
}

/// In-memory registry of username claims.
///
/// All mutation happens under a single mutex, so check-unclaimed-then-bind
/// is atomic: two concurrent claims of the same name cannot both succeed.
pub struct RegistryService {
    records: Mutex<HashMap<String, RegistryRecord>>,
}

impl RegistryService {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Claim an unclaimed username, binding it to a public key.
    ///
    /// The authoritative profile identifier is derived from the
    /// registrant's peer identifier. Claiming an already-claimed username
    /// with the same key is idempotent and returns the identifier assigned
    /// at first claim; a different key fails with `AlreadyClaimed` and
    /// leaves the record untouched.
    pub fn register(
        &self,
        username: &str,
        public_key: &PublicKey,
        credential: &Credential,
        peer_id: &PeerId,
    ) -> Result<ProfileId, RegistryErrorCode> {
        let mut records = self.records.lock();

        if let Some(record) = records.get(username) {
            if &record.public_key == public_key {
                debug!(%username, "repeat registration with the bound key");
                return Ok(record.profile_id.clone());
            }
            return Err(RegistryErrorCode::AlreadyClaimed);
        }

        let profile_id = ProfileId::from_peer_id(peer_id);
        records.insert(
            username.to_string(),
            RegistryRecord {
                username: username.to_string(),
                public_key: public_key.clone(),
                profile_id: profile_id.clone(),
                credential: credential_digest(username, credential),
            },
        );
        info!(%username, %profile_id, "username claimed");
        Ok(profile_id)
    }

    /// Validate an ownership proof and return the authoritative profile
    /// identifier for the username.
    ///
    /// The signature is checked against the record's bound key, not the
    /// caller's self-declared key, so possession of the original private
    /// key is the only way to pass. The returned identifier may differ
    /// from what the caller derives locally; the record is authoritative.
    pub fn verify(&self, proof: &ProofRequest) -> Result<ProfileId, RegistryErrorCode> {
        let records = self.records.lock();

        let record = records
            .get(&proof.username)
            .ok_or(RegistryErrorCode::UnknownUsername)?;

        let message = proof_message(&proof.username, &proof.credential);
        if !record.public_key.verify(&message, &proof.signature) {
            return Err(RegistryErrorCode::InvalidSignature);
        }

        if credential_digest(&proof.username, &proof.credential) != record.credential {
            return Err(RegistryErrorCode::InvalidCredential);
        }

        debug!(username = %proof.username, profile_id = %record.profile_id, "ownership proof accepted");
        Ok(record.profile_id.clone())
    }

    /// Wire-level dispatch: handle a decoded request, producing a response.
    pub fn handle(&self, request: RegistryRequest) -> RegistryResponse {
        let result = match &request {
            RegistryRequest::Register {
                username,
                public_key,
                credential,
                peer_id,
            } => self.register(username, public_key, credential, peer_id),
            RegistryRequest::Prove(proof) => self.verify(proof),
        };

        match result {
            Ok(profile_id) => RegistryResponse::Profile(profile_id),
            Err(code) => RegistryResponse::Denied(code),
        }
    }

    /// Look up the record for a username, if claimed.
    pub fn lookup(&self, username: &str) -> Option<RegistryRecord> {
        self.records.lock().get(username).cloned()
    }
}

impl Default for RegistryService {
    fn default() -> Self {
        Self::new()
    }
}
