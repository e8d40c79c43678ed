//! Error types for Datamesh

use thiserror::Error;

/// Main error type for Datamesh operations
#[derive(Error, Debug)]
pub enum MeshError {
    /// No owner profile has been set in the profile store
    #[error("no local identity: profile owner has not been set")]
    NoLocalIdentity,

    /// The registry has no record for the submitted username
    #[error("username is not registered: {0}")]
    UnknownUsername(String),

    /// Proof signature did not verify against the registry's bound key
    #[error("signature does not match the key bound to this username")]
    InvalidSignature,

    /// Submitted credential did not match the one on file
    #[error("invalid credential for username")]
    InvalidCredential,

    /// Username is already bound to a different public key
    #[error("username already claimed: {0}")]
    AlreadyClaimed(String),

    /// Profile failed validation (missing username or keypair mismatch)
    #[error("profile validation failed: {0}")]
    Validation(String),

    /// Identity-related error (keys, signatures, identifiers)
    #[error("identity error: {0}")]
    Identity(String),

    /// Error during serialization/deserialization
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Registry transport failed before a response arrived
    #[error("registry transport error: {0}")]
    Transport(String),

    /// Registry call timed out waiting for a response
    #[error("registry call timed out")]
    Timeout,

    /// Database creation/opening error
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    /// Transaction error
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    /// Table error
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    /// Storage operation error
    #[error("storage operation error: {0}")]
    StorageOp(#[from] redb::StorageError),

    /// Commit error
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// General I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using MeshError
pub type MeshResult<T> = Result<T, MeshError>;
