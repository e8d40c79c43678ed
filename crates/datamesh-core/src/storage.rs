//! Persistent storage using redb.
//!
//! This module provides ACID-compliant storage for:
//! - The local owner profile (identity record)
//! - Dataset blobs (content-addressed)
//! - The namespace map (name → content key)

use crate::datasets::ContentKey;
use crate::error::MeshError;
use crate::profile::Profile;
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

/// Table for the local owner profile (single well-known key)
const OWNER_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("owner");
/// Table for dataset blobs (key: BLAKE3 hash hex string, value: raw bytes)
const DATASETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("datasets");
/// Table for the namespace map (key: dataset name, value: content key hex)
const NAMESPACE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("namespace");

/// Key under which the owner profile is stored in `OWNER_TABLE`
const OWNER_KEY: &str = "owner";

/// Storage layer using redb for ACID-compliant persistence
#[derive(Clone)]
pub struct Storage {
    db: Arc<RwLock<Database>>,
}

impl Storage {
    /// Create a new storage instance at the given path.
    ///
    /// This will:
    /// - Create the database directory if it doesn't exist
    /// - Initialize the database file
    /// - Create all required tables
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Open/create database
        let db = Database::create(path)?;

        // Initialize all tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(OWNER_TABLE)?;
            let _ = write_txn.open_table(DATASETS_TABLE)?;
            let _ = write_txn.open_table(NAMESPACE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Owner Profile Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Persist the owner profile, replacing any previous record.
    pub fn save_owner(&self, profile: &Profile) -> Result<(), MeshError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(OWNER_TABLE)?;
            let serialized = postcard::to_allocvec(profile)
                .map_err(|e| MeshError::Serialization(e.to_string()))?;
            table.insert(OWNER_KEY, serialized.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Load the owner profile.
    ///
    /// Returns `None` if no owner has been persisted yet.
    pub fn load_owner(&self) -> Result<Option<Profile>, MeshError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(OWNER_TABLE)?;

        if let Some(data) = table.get(OWNER_KEY)? {
            let profile: Profile = postcard::from_bytes(data.value())
                .map_err(|e| MeshError::Serialization(e.to_string()))?;
            Ok(Some(profile))
        } else {
            Ok(None)
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dataset Operations (content-addressed)
    // ═══════════════════════════════════════════════════════════════════════

    /// Save a dataset blob and return its content key.
    ///
    /// Uses BLAKE3 for content addressing. If the blob already exists,
    /// returns the existing key without re-storing.
    pub fn save_dataset(&self, data: Vec<u8>) -> Result<ContentKey, MeshError> {
        let key = ContentKey::for_bytes(&data);

        let db = self.db.read();

        // Check if the blob already exists (content-addressed deduplication)
        {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(DATASETS_TABLE)?;
            if table.get(key.as_str())?.is_some() {
                return Ok(key);
            }
        }

        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DATASETS_TABLE)?;
            table.insert(key.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;

        Ok(key)
    }

    /// Load a dataset blob by content key.
    ///
    /// Returns `None` if the blob doesn't exist.
    pub fn load_dataset(&self, key: &ContentKey) -> Result<Option<Vec<u8>>, MeshError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(DATASETS_TABLE)?;

        if let Some(data) = table.get(key.as_str())? {
            Ok(Some(data.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Namespace Operations
    // ═══════════════════════════════════════════════════════════════════════

    /// Bind a human-readable name to a content key.
    ///
    /// An existing binding for the same name is overwritten.
    pub fn bind_name(&self, name: &str, key: &ContentKey) -> Result<(), MeshError> {
        let db = self.db.read();
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(NAMESPACE_TABLE)?;
            table.insert(name, key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Resolve a name to the content key it is bound to.
    ///
    /// Returns `None` if the name is unbound.
    pub fn resolve_name(&self, name: &str) -> Result<Option<ContentKey>, MeshError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(NAMESPACE_TABLE)?;

        if let Some(value) = table.get(name)? {
            Ok(Some(ContentKey::parse(value.value())?))
        } else {
            Ok(None)
        }
    }

    /// List all name bindings in the namespace.
    pub fn list_names(&self) -> Result<Vec<(String, ContentKey)>, MeshError> {
        let db = self.db.read();
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(NAMESPACE_TABLE)?;

        let mut names = Vec::new();
        for entry in table.iter()? {
            let (name, value) = entry?;
            names.push((name.value().to_string(), ContentKey::parse(value.value())?));
        }

        Ok(names)
    }
}
