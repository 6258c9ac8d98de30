//! Error types for storage operations.

use crate::record::RecordId;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// The store namespace an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Encrypted metadata records.
    Records,
    /// Encrypted file payloads.
    Blobs,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Records => f.write_str("records"),
            Self::Blobs => f.write_str("blobs"),
        }
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No item matched the id, owner and content type.
    #[error("{namespace} item {id} not found")]
    NotFound {
        /// Namespace searched.
        namespace: Namespace,
        /// The id that was not found.
        id: RecordId,
    },

    /// An item with this id already exists.
    #[error("{namespace} item {id} already exists")]
    AlreadyExists {
        /// Namespace written to.
        namespace: Namespace,
        /// The colliding id.
        id: RecordId,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store contents are corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the store lock.
    #[error("store is locked by another process")]
    Locked,

    /// The backend refused the operation.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Creates a not found error.
    pub fn not_found(namespace: Namespace, id: RecordId) -> Self {
        Self::NotFound { namespace, id }
    }

    /// Creates an already exists error.
    pub fn already_exists(namespace: Namespace, id: RecordId) -> Self {
        Self::AlreadyExists { namespace, id }
    }

    /// Returns true if this error means "nothing matched".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
