//! Vault facade wiring the usecases to one store.

use crate::config::VaultConfig;
use crate::context::{ContextOwnerResolver, OwnerResolver};
use crate::error::VaultResult;
use crate::keys::KeyRegistry;
use crate::usecase::{
    AccountService, CardService, CredentialService, FileService, IdentityProvider, VaultDeps,
};
use datakeeper_storage::{BlobStore, InMemoryStore, RecordStore};
use std::fmt;
use std::sync::Arc;

/// An encrypted vault.
///
/// Owns the key registry and one instance of every usecase over a single
/// store implementing both [`RecordStore`] and [`BlobStore`].
///
/// # Example
///
/// ```rust
/// use datakeeper_core::{CallContext, CredentialSecret, OwnerKey, Vault};
///
/// let vault = Vault::in_memory().unwrap();
/// vault.keys().set_key("bob", OwnerKey::from("0123456789abcdef"));
///
/// let ctx = CallContext::for_owner("bob");
/// let secret = CredentialSecret {
///     name: "site".into(),
///     login: "bob".into(),
///     password: "pw1".into(),
/// };
/// let id = vault.credentials().create(&ctx, secret.clone()).unwrap();
///
/// let items = vault.credentials().list(&ctx).unwrap();
/// assert_eq!(items[0].id, id);
/// assert_eq!(items[0].secret, secret);
/// ```
#[derive(Clone)]
pub struct Vault {
    config: VaultConfig,
    keys: Arc<KeyRegistry>,
    credentials: CredentialService,
    cards: CardService,
    files: FileService,
}

impl Vault {
    /// Opens a vault over `store`, resolving owners with `resolver`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the configuration is unusable.
    pub fn new<S>(
        config: VaultConfig,
        store: Arc<S>,
        resolver: Arc<dyn OwnerResolver>,
    ) -> VaultResult<Self>
    where
        S: RecordStore + BlobStore + 'static,
    {
        config.validate()?;

        let keys = Arc::new(KeyRegistry::with_generated_key_len(config.generated_key_len));
        let records: Arc<dyn RecordStore> = store.clone();
        let blobs: Arc<dyn BlobStore> = store;
        let deps = VaultDeps {
            keys: Arc::clone(&keys),
            records,
            resolver,
        };

        Ok(Self {
            credentials: CredentialService::new(deps.clone()),
            cards: CardService::new(deps.clone()),
            files: FileService::new(deps, blobs, &config),
            keys,
            config,
        })
    }

    /// Opens an ephemeral vault with the default configuration.
    ///
    /// Owners are read from the [`CallContext`](crate::CallContext).
    pub fn in_memory() -> VaultResult<Self> {
        Self::new(
            VaultConfig::default(),
            Arc::new(InMemoryStore::new()),
            Arc::new(ContextOwnerResolver),
        )
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Returns the key registry.
    #[must_use]
    pub fn keys(&self) -> &Arc<KeyRegistry> {
        &self.keys
    }

    /// Credential usecase.
    #[must_use]
    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    /// Card usecase.
    #[must_use]
    pub fn cards(&self) -> &CardService {
        &self.cards
    }

    /// File usecase.
    #[must_use]
    pub fn files(&self) -> &FileService {
        &self.files
    }

    /// Account usecase backed by `provider`, sharing this vault's keys.
    pub fn accounts(&self, provider: Arc<dyn IdentityProvider>) -> AccountService {
        AccountService::new(Arc::clone(&self.keys), provider)
    }
}

impl fmt::Debug for Vault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vault")
            .field("config", &self.config)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;
    use crate::keys::OwnerKey;
    use crate::payload::CardSecret;
    use crate::usecase::UploadFileRequest;
    use datakeeper_storage::FileStore;
    use tempfile::tempdir;

    #[test]
    fn rejects_bad_config() {
        let result = Vault::new(
            VaultConfig::new().generated_key_len(7),
            Arc::new(InMemoryStore::new()),
            Arc::new(ContextOwnerResolver),
        );
        assert!(result.is_err());
    }

    #[test]
    fn generated_keys_follow_config() {
        let vault = Vault::new(
            VaultConfig::new().generated_key_len(16),
            Arc::new(InMemoryStore::new()),
            Arc::new(ContextOwnerResolver),
        )
        .unwrap();
        assert_eq!(vault.keys().generate_key().len(), 16);
    }

    #[test]
    fn file_store_vault_survives_reopen() {
        let dir = tempdir().unwrap();
        let ctx = CallContext::for_owner("bob");
        let key = OwnerKey::from("0123456789abcdef");

        let (card, file) = {
            let store = Arc::new(FileStore::open(dir.path()).unwrap());
            let vault = Vault::new(VaultConfig::default(), store, Arc::new(ContextOwnerResolver)).unwrap();
            vault.keys().set_key("bob", key.clone());

            let card = vault.cards().create(&ctx, CardSecret::default()).unwrap();
            let file = vault
                .files()
                .upload(
                    &ctx,
                    UploadFileRequest {
                        name: "a.txt".into(),
                        format: "txt".into(),
                        bytes: b"test".to_vec(),
                    },
                )
                .unwrap();
            (card, file)
        };

        let store = Arc::new(FileStore::open(dir.path()).unwrap());
        let vault = Vault::new(VaultConfig::default(), store, Arc::new(ContextOwnerResolver)).unwrap();
        assert!(matches!(
            vault.cards().list(&ctx),
            Err(crate::VaultError::KeyNotFound { .. })
        ));

        vault.keys().set_key("bob", key);
        assert_eq!(vault.cards().list(&ctx).unwrap()[0].id, card);
        assert_eq!(vault.files().download(&ctx, file).unwrap().bytes, b"test");
    }
}
