//! CLI command implementations.
//!
//! Every command returns a JSON value that `main` prints to stdout.

pub mod card;
pub mod credential;
pub mod file;
pub mod keygen;

use datakeeper_core::{
    CallContext, ContextOwnerResolver, OwnerKey, Vault, VaultConfig, VaultError,
};
use datakeeper_storage::{FileStore, StorageError};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// No owner given on the command line or in the environment.
    #[error("owner required (--owner or DATAKEEPER_OWNER)")]
    MissingOwner,

    /// No key given on the command line or in the environment.
    #[error("key required (--key or DATAKEEPER_KEY)")]
    MissingKey,

    /// A vault operation failed.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// The vault directory could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Reading or writing a local file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be encoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// An opened vault directory with the caller's key registered.
pub struct LocalVault {
    /// The vault.
    pub vault: Vault,
    /// Context of the calling owner.
    pub ctx: CallContext,
}

impl LocalVault {
    /// Opens the vault at `path` for `owner`, registering `key`.
    pub fn open(path: &Path, owner: Option<&str>, key: Option<&str>) -> CliResult<Self> {
        let owner = owner.filter(|o| !o.is_empty()).ok_or(CliError::MissingOwner)?;
        let key = key.filter(|k| !k.is_empty()).ok_or(CliError::MissingKey)?;

        let store = Arc::new(FileStore::open(path)?);
        let vault = Vault::new(VaultConfig::default(), store, Arc::new(ContextOwnerResolver))?;
        vault.keys().set_key(owner, OwnerKey::from(key));
        debug!(path = %path.display(), owner, "vault opened");

        Ok(Self {
            vault,
            ctx: CallContext::for_owner(owner),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tempfile::TempDir;

    pub(crate) const KEY: &str = "0123456789abcdef";

    pub(crate) fn open(dir: &TempDir, owner: &str) -> LocalVault {
        LocalVault::open(dir.path(), Some(owner), Some(KEY)).unwrap()
    }
}
