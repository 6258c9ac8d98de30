//! Error types for the vault server.

use datakeeper_core::VaultError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors returned to callers of the vault server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid request format or content.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Missing, malformed or expired token.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// Record or file does not exist for this owner.
    #[error("not found: {0}")]
    NotFound(String),

    /// Account or record already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upload exceeds the configured limit.
    #[error("payload too large: {size} bytes, limit is {limit}")]
    PayloadTooLarge {
        /// Size of the rejected upload.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// The owner has no usable key, or their data does not decrypt with it.
    #[error("unprocessable: {0}")]
    Unprocessable(String),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<VaultError> for ServerError {
    fn from(err: VaultError) -> Self {
        let message = err.to_string();
        match err {
            VaultError::Validation(_) => Self::InvalidRequest(message),
            VaultError::Unauthenticated => Self::NotAuthorized(message),
            VaultError::AuthenticationFailed(_) => Self::AuthenticationFailed(message),
            VaultError::AccountExists(_) | VaultError::AlreadyExists { .. } => Self::Conflict(message),
            VaultError::KeyNotFound { .. } | VaultError::Codec(_) => Self::Unprocessable(message),
            VaultError::NotFound { .. } => Self::NotFound(message),
            VaultError::Cancelled => Self::Cancelled,
            VaultError::Storage(_)
            | VaultError::PartialFailure { .. }
            | VaultError::CorruptRecord { .. }
            | VaultError::Encoding(_) => Self::Internal(message),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl ServerError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidRequest(_) => 400,
            ServerError::AuthenticationFailed(_) | ServerError::NotAuthorized(_) => 401,
            ServerError::NotFound(_) => 404,
            ServerError::Conflict(_) => 409,
            ServerError::PayloadTooLarge { .. } => 413,
            ServerError::Unprocessable(_) => 422,
            ServerError::Cancelled => 499,
            ServerError::Internal(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}
