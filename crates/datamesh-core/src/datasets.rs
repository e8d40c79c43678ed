//! Dataset and namespace collaborators
//!
//! The identity core never touches these; they exist for the request
//! handlers that serve dataset content. Both collaborators are read-only
//! lookups: fetch content by key, and resolve a human-readable name to a
//! content key. Uses BLAKE3 for content addressing.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::storage::Storage;

/// Content-addressed key for a dataset blob (BLAKE3 hash, hex-encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey(String);

impl ContentKey {
    /// Compute the content key for a byte slice
    pub fn for_bytes(data: &[u8]) -> Self {
        ContentKey(blake3::hash(data).to_hex().to_string())
    }

    /// Parse a content key from its hex string form
    pub fn parse(s: &str) -> MeshResult<Self> {
        let bytes = hex::decode(s)
            .map_err(|_| MeshError::Identity("invalid hex in content key".to_string()))?;
        if bytes.len() != 32 {
            return Err(MeshError::Identity(
                "content key must be 32 bytes".to_string(),
            ));
        }
        Ok(ContentKey(s.to_string()))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only access to dataset content by key.
pub trait DatasetGetter {
    /// Fetch dataset bytes by content key; `None` when absent
    fn get_dataset(&self, key: &ContentKey) -> MeshResult<Option<Vec<u8>>>;
}

/// Read-only resolution of names to content keys.
pub trait NamespaceResolver {
    /// Resolve a name to the content key it is bound to; `None` when unbound
    fn resolve(&self, name: &str) -> MeshResult<Option<ContentKey>>;
}

impl DatasetGetter for Storage {
    fn get_dataset(&self, key: &ContentKey) -> MeshResult<Option<Vec<u8>>> {
        self.load_dataset(key)
    }
}

impl NamespaceResolver for Storage {
    fn resolve(&self, name: &str) -> MeshResult<Option<ContentKey>> {
        self.resolve_name(name)
    }
}

/// Load a namespace map from a JSON file of `{ "name": "<content key hex>" }`
/// entries.
///
/// A missing file yields an empty map; a node with no namespace bindings is
/// a valid state.
pub fn load_namespace_file(path: impl AsRef<Path>) -> MeshResult<HashMap<String, ContentKey>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let raw = std::fs::read(path)?;
    let entries: HashMap<String, String> =
        serde_json::from_slice(&raw).map_err(|e| MeshError::Serialization(e.to_string()))?;

    let mut namespace = HashMap::with_capacity(entries.len());
    for (name, key) in entries {
        namespace.insert(name, ContentKey::parse(&key)?);
    }
    Ok(namespace)
}

/// Import a namespace map into storage, overwriting existing bindings with
/// the same names.
pub fn import_namespace(
    storage: &Storage,
    namespace: &HashMap<String, ContentKey>,
) -> MeshResult<()> {
    for (name, key) in namespace {
        storage.bind_name(name, key)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_content_key_deterministic() {
        let key1 = ContentKey::for_bytes(b"dataset");
        let key2 = ContentKey::for_bytes(b"dataset");
        assert_eq!(key1, key2);

        let other = ContentKey::for_bytes(b"different dataset");
        assert_ne!(key1, other);
    }

    #[test]
    fn test_content_key_parse_roundtrip() {
        let key = ContentKey::for_bytes(b"dataset");
        let parsed = ContentKey::parse(key.as_str()).unwrap();
        assert_eq!(key, parsed);
    }

    #[test]
    fn test_content_key_parse_invalid() {
        assert!(ContentKey::parse("not hex").is_err());
        assert!(ContentKey::parse("abcd").is_err()); // too short
    }

    #[test]
    fn test_read_only_lookups() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.db")).unwrap();

        let key = storage.save_dataset(b"city census".to_vec()).unwrap();
        storage.bind_name("census", &key).unwrap();

        // Through the collaborator traits only
        let resolver: &dyn NamespaceResolver = &storage;
        let getter: &dyn DatasetGetter = &storage;

        let resolved = resolver.resolve("census").unwrap().unwrap();
        let data = getter.get_dataset(&resolved).unwrap().unwrap();
        assert_eq!(data, b"city census");

        assert!(resolver.resolve("missing").unwrap().is_none());
        let absent = ContentKey::for_bytes(b"never stored");
        assert!(getter.get_dataset(&absent).unwrap().is_none());
    }

    #[test]
    fn test_load_namespace_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("namespace.json");

        let key = ContentKey::for_bytes(b"dataset one");
        let json = format!("{{\"one\": \"{}\"}}", key);
        std::fs::write(&path, json).unwrap();

        let namespace = load_namespace_file(&path).unwrap();
        assert_eq!(namespace.len(), 1);
        assert_eq!(namespace.get("one"), Some(&key));
    }

    #[test]
    fn test_load_namespace_file_missing_is_empty() {
        let temp_dir = tempdir().unwrap();
        let namespace = load_namespace_file(temp_dir.path().join("absent.json")).unwrap();
        assert!(namespace.is_empty());
    }

    #[test]
    fn test_load_namespace_file_rejects_bad_key() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("namespace.json");
        std::fs::write(&path, "{\"one\": \"nothex\"}").unwrap();

        assert!(load_namespace_file(&path).is_err());
    }

    #[test]
    fn test_import_namespace() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(temp_dir.path().join("test.db")).unwrap();

        let mut namespace = HashMap::new();
        let key = storage.save_dataset(b"dataset".to_vec()).unwrap();
        namespace.insert("data".to_string(), key.clone());

        import_namespace(&storage, &namespace).unwrap();
        assert_eq!(storage.resolve_name("data").unwrap(), Some(key));
    }
}
