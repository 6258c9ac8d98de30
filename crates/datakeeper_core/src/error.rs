//! Error types for the vault core.

use crate::crypto::CodecError;
use datakeeper_storage::{RecordId, StorageError};
use thiserror::Error;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors that can occur in vault operations.
///
/// Every variant is either a client error (the caller can fix the request
/// or its credentials) or a server error (retrying later may help). See
/// [`is_client_error`](Self::is_client_error).
#[derive(Debug, Error)]
pub enum VaultError {
    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The call carries no resolvable owner.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The identity provider rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The account already exists.
    #[error("account already exists: {0}")]
    AccountExists(String),

    /// The owner has no registered key.
    #[error("no key registered for owner {owner}")]
    KeyNotFound {
        /// The owner that was looked up.
        owner: String,
    },

    /// Encryption or decryption failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The record or blob is absent or belongs to another owner.
    #[error("record {id} not found")]
    NotFound {
        /// The id that was not found.
        id: RecordId,
    },

    /// A record with this id already exists.
    #[error("record {id} already exists")]
    AlreadyExists {
        /// The colliding id.
        id: RecordId,
    },

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// Only one of the two stores backing a file was changed.
    #[error("partial failure on file {id}: {message}")]
    PartialFailure {
        /// The file id.
        id: RecordId,
        /// Which half was left behind.
        message: String,
    },

    /// A stored record decrypted to something unusable, or its halves
    /// disagree.
    #[error("corrupt record {id}: {message}")]
    CorruptRecord {
        /// The record id.
        id: RecordId,
        /// Description of the corruption.
        message: String,
    },

    /// A payload could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<StorageError> for VaultError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id, .. } => Self::NotFound { id },
            StorageError::AlreadyExists { id, .. } => Self::AlreadyExists { id },
            other => Self::Storage(other),
        }
    }
}

impl VaultError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a key not found error.
    pub fn key_not_found(owner: impl Into<String>) -> Self {
        Self::KeyNotFound {
            owner: owner.into(),
        }
    }

    /// Creates a partial failure error.
    pub fn partial_failure(id: RecordId, message: impl Into<String>) -> Self {
        Self::PartialFailure {
            id,
            message: message.into(),
        }
    }

    /// Creates a corrupt record error.
    pub fn corrupt_record(id: RecordId, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id,
            message: message.into(),
        }
    }

    /// Returns true if the caller caused this error.
    ///
    /// Codec errors count as client errors: the usual cause is an owner
    /// re-supplying a different key than the one their records were
    /// written with.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Unauthenticated
                | Self::AuthenticationFailed(_)
                | Self::AccountExists(_)
                | Self::KeyNotFound { .. }
                | Self::Codec(_)
                | Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::Cancelled
        )
    }

    /// Returns true if the server side caused this error.
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datakeeper_storage::Namespace;

    #[test]
    fn storage_not_found_maps_to_not_found() {
        let id = RecordId::new();
        let err: VaultError = StorageError::not_found(Namespace::Blobs, id).into();
        assert!(matches!(err, VaultError::NotFound { id: found } if found == id));
        assert!(err.is_client_error());
    }

    #[test]
    fn backend_failures_are_server_errors() {
        let err: VaultError = StorageError::Unavailable("down".into()).into();
        assert!(matches!(err, VaultError::Storage(_)));
        assert!(err.is_server_error());
        assert!(VaultError::partial_failure(RecordId::new(), "x").is_server_error());
        assert!(VaultError::corrupt_record(RecordId::new(), "x").is_server_error());
    }

    #[test]
    fn client_errors() {
        assert!(VaultError::Unauthenticated.is_client_error());
        assert!(VaultError::key_not_found("bob").is_client_error());
        assert!(VaultError::Codec(CodecError::InvalidPadding { value: 0 }).is_client_error());
        assert!(!VaultError::validation("bad").is_server_error());
    }

    #[test]
    fn error_display() {
        let msg = VaultError::key_not_found("bob").to_string();
        assert!(msg.contains("bob"));
    }
}
