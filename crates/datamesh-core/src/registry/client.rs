//! Registry client - proves key ownership and adopts the registry's
//! authoritative profile identifier
//!
//! The client is a stateless mediator between the profile store and the
//! registry service: it signs the submitted credential with the local
//! private key, sends the proof, and on success rewrites the owner record
//! with the identifier the registry returned. On any failure the profile
//! store is left untouched.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::identity::ProfileId;
use crate::profile::ProfileStore;
use crate::registry::protocol::{
    proof_message, reconcile, Credential, ProofRequest, RegistryRequest, RegistryResponse,
};
use crate::registry::service::RegistryService;

/// Default timeout for a registry round trip
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

/// Point-to-point channel to a registry service.
///
/// A round trip sends one encoded request and resolves with the matching
/// response. Implementations own the framing; the client only cares about
/// the logical exchange.
pub trait RegistryTransport: Send + Sync {
    /// Send a request and await the response
    fn round_trip(
        &self,
        request: RegistryRequest,
    ) -> impl Future<Output = MeshResult<RegistryResponse>> + Send;
}

/// In-process transport wrapping a [`RegistryService`] directly.
///
/// Requests and responses still pass through the postcard wire encoding,
/// so the exchange exercises exactly what a networked transport would
/// carry. Used for local registries and tests.
#[derive(Clone)]
pub struct LocalTransport {
    service: Arc<RegistryService>,
}

impl LocalTransport {
    /// Wrap a registry service in an in-process channel
    pub fn new(service: Arc<RegistryService>) -> Self {
        Self { service }
    }
}

impl RegistryTransport for LocalTransport {
    fn round_trip(
        &self,
        request: RegistryRequest,
    ) -> impl Future<Output = MeshResult<RegistryResponse>> + Send {
        let service = self.service.clone();
        async move {
            let bytes = request.encode()?;
            let request = RegistryRequest::decode(&bytes)?;
            let response = service.handle(request);
            RegistryResponse::decode(&response.encode()?)
        }
    }
}

/// Parameters for an ownership proof call
#[derive(Debug, Clone)]
pub struct ProveParams {
    /// Username to prove ownership of
    pub username: String,
    /// Account email address
    pub email: String,
    /// Account password
    pub password: String,
}

/// Client side of the registry protocol.
///
/// Holds no persistent state. Proof attempts are serialized through an
/// internal lock so at most one call can mutate the owner identity at a
/// time; concurrent callers queue.
pub struct RegistryClient<T: RegistryTransport> {
    transport: T,
    timeout: Duration,
    prove_lock: Mutex<()>,
}

impl<T: RegistryTransport> RegistryClient<T> {
    /// Create a client with the default timeout
    pub fn new(transport: T) -> Self {
        Self::with_timeout(transport, DEFAULT_REGISTRY_TIMEOUT)
    }

    /// Create a client with an explicit round-trip timeout
    pub fn with_timeout(transport: T, timeout: Duration) -> Self {
        Self {
            transport,
            timeout,
            prove_lock: Mutex::new(()),
        }
    }

    /// Prove to the registry that this node owns the key bound to
    /// `params.username`, and adopt the registry's authoritative profile
    /// identifier on success.
    ///
    /// Fails with `NoLocalIdentity` when the profile store has no owner.
    /// A rejected proof or a timeout leaves the profile store unchanged;
    /// the whole call is safe to retry since it has no partial-effect
    /// window. Exactly one store mutation happens on success.
    pub async fn prove_profile_key(
        &self,
        profiles: &ProfileStore,
        params: &ProveParams,
    ) -> MeshResult<ProfileId> {
        let _guard = self.prove_lock.lock().await;

        let owner = profiles.get_owner()?;
        let credential = Credential {
            email: params.email.clone(),
            password: params.password.clone(),
        };

        let message = proof_message(&params.username, &credential);
        let proof = ProofRequest {
            username: params.username.clone(),
            credential,
            public_key: owner.public_key.clone(),
            signature: owner.keypair.sign(&message),
        };
        debug!(username = %params.username, "sending ownership proof");

        let response = tokio::time::timeout(
            self.timeout,
            self.transport.round_trip(RegistryRequest::Prove(proof)),
        )
        .await
        .map_err(|_| MeshError::Timeout)??;

        match response {
            RegistryResponse::Profile(authoritative) => {
                let final_id = reconcile(&owner.profile_id, &authoritative);
                let mut updated = owner;
                updated.profile_id = final_id.clone();
                profiles.set_owner(&updated)?;
                info!(username = %params.username, profile_id = %final_id, "ownership proven");
                Ok(final_id)
            }
            RegistryResponse::Denied(code) => Err(code.into_error(&params.username)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Keypair, PeerId};
    use crate::profile::Profile;
    use crate::storage::Storage;
    use tempfile::tempdir;

    fn open_store() -> (tempfile::TempDir, ProfileStore) {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.db")).unwrap();
        let store = ProfileStore::open(storage).unwrap();
        (temp_dir, store)
    }

    fn prove_params(username: &str) -> ProveParams {
        ProveParams {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "hunter2".to_string(),
        }
    }

    fn credential_for(params: &ProveParams) -> Credential {
        Credential {
            email: params.email.clone(),
            password: params.password.clone(),
        }
    }

    #[tokio::test]
    async fn test_prove_without_local_identity_fails() {
        let (_dir, store) = open_store();
        let registry = Arc::new(RegistryService::new());
        let client = RegistryClient::new(LocalTransport::new(registry));

        let err = client
            .prove_profile_key(&store, &prove_params("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, MeshError::NoLocalIdentity));
    }

    #[tokio::test]
    async fn test_prove_denied_leaves_store_untouched() {
        let (_dir, store) = open_store();
        let registry = Arc::new(RegistryService::new());
        let client = RegistryClient::new(LocalTransport::new(registry));

        let keypair = Keypair::generate();
        let peer_id = PeerId::from_public_key(&keypair.public_key());
        let profile = Profile::new("alice".to_string(), keypair, &peer_id);
        store.set_owner(&profile).unwrap();

        // Nothing registered, so the proof is rejected
        let err = client
            .prove_profile_key(&store, &prove_params("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, MeshError::UnknownUsername(_)));

        let owner = store.get_owner().unwrap();
        assert_eq!(owner.profile_id, profile.profile_id);
    }

    #[tokio::test]
    async fn test_prove_adopts_authoritative_id() {
        let (_dir, store) = open_store();
        let registry = Arc::new(RegistryService::new());
        let params = prove_params("alice");

        // Username was claimed from a different peer identity
        let keypair = Keypair::generate();
        let original_peer = PeerId::from_bytes([1u8; 32]);
        registry
            .register(
                "alice",
                &keypair.public_key(),
                &credential_for(&params),
                &original_peer,
            )
            .unwrap();

        // This node derives its own, different profile id
        let local_peer = PeerId::from_bytes([2u8; 32]);
        let profile = Profile::new("alice".to_string(), keypair, &local_peer);
        store.set_owner(&profile).unwrap();
        assert_ne!(profile.profile_id, ProfileId::from_peer_id(&original_peer));

        let client = RegistryClient::new(LocalTransport::new(registry));
        let proven = client.prove_profile_key(&store, &params).await.unwrap();

        assert_eq!(proven, ProfileId::from_peer_id(&original_peer));
        assert_eq!(store.get_owner().unwrap().profile_id, proven);
    }

    #[tokio::test]
    async fn test_prove_wrong_credential_preserves_owner() {
        let (_dir, store) = open_store();
        let registry = Arc::new(RegistryService::new());
        let params = prove_params("alice");

        let keypair = Keypair::generate();
        let peer_id = PeerId::from_bytes([1u8; 32]);
        registry
            .register(
                "alice",
                &keypair.public_key(),
                &credential_for(&params),
                &peer_id,
            )
            .unwrap();

        let local_peer = PeerId::from_bytes([2u8; 32]);
        let profile = Profile::new("alice".to_string(), keypair, &local_peer);
        store.set_owner(&profile).unwrap();

        let client = RegistryClient::new(LocalTransport::new(registry));
        let mut wrong = params.clone();
        wrong.password = "wrong".to_string();

        let err = client.prove_profile_key(&store, &wrong).await.unwrap_err();
        assert!(matches!(err, MeshError::InvalidCredential));

        // Local identifier unchanged
        assert_eq!(store.get_owner().unwrap().profile_id, profile.profile_id);
    }

    struct StalledTransport;

    impl RegistryTransport for StalledTransport {
        fn round_trip(
            &self,
            _request: RegistryRequest,
        ) -> impl Future<Output = MeshResult<RegistryResponse>> + Send {
            std::future::pending()
        }
    }

    #[tokio::test]
    async fn test_prove_timeout_leaves_store_unchanged() {
        let (_dir, store) = open_store();
        let client = RegistryClient::with_timeout(StalledTransport, Duration::from_millis(20));

        let keypair = Keypair::generate();
        let peer_id = PeerId::from_public_key(&keypair.public_key());
        let profile = Profile::new("alice".to_string(), keypair, &peer_id);
        store.set_owner(&profile).unwrap();

        let err = client
            .prove_profile_key(&store, &prove_params("alice"))
            .await
            .unwrap_err();
        assert!(matches!(err, MeshError::Timeout));

        assert_eq!(store.get_owner().unwrap().profile_id, profile.profile_id);
    }

    #[tokio::test]
    async fn test_prove_is_repeatable() {
        let (_dir, store) = open_store();
        let registry = Arc::new(RegistryService::new());
        let params = prove_params("alice");

        let keypair = Keypair::generate();
        let peer_id = PeerId::from_bytes([1u8; 32]);
        registry
            .register(
                "alice",
                &keypair.public_key(),
                &credential_for(&params),
                &peer_id,
            )
            .unwrap();

        let profile = Profile::new("alice".to_string(), keypair, &PeerId::from_bytes([2u8; 32]));
        store.set_owner(&profile).unwrap();

        let client = RegistryClient::new(LocalTransport::new(registry));
        let first = client.prove_profile_key(&store, &params).await.unwrap();
        let second = client.prove_profile_key(&store, &params).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.get_owner().unwrap().profile_id, second);
    }

    #[tokio::test]
    async fn test_prove_rejects_imposter_signature() {
        let (_dir, store) = open_store();
        let registry = Arc::new(RegistryService::new());
        let params = prove_params("alice");

        // Username bound to a key this node does not hold
        let bound = Keypair::generate();
        registry
            .register(
                "alice",
                &bound.public_key(),
                &credential_for(&params),
                &PeerId::from_bytes([1u8; 32]),
            )
            .unwrap();

        // Local profile has its own keypair; correct credential, wrong key
        let imposter = Keypair::generate();
        let peer_id = PeerId::from_public_key(&imposter.public_key());
        let profile = Profile::new("alice".to_string(), imposter, &peer_id);
        store.set_owner(&profile).unwrap();

        let client = RegistryClient::new(LocalTransport::new(registry));
        let err = client
            .prove_profile_key(&store, &params)
            .await
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidSignature));
        assert_eq!(store.get_owner().unwrap().profile_id, profile.profile_id);
    }
}
