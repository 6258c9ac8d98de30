//! Test fixtures and vault helpers.
//!
//! Provides convenience functions for setting up test vaults with
//! registered owners.

use datakeeper_core::{
    CallContext, ContextOwnerResolver, CredentialSecret, OwnerKey, Vault, VaultConfig,
};
use datakeeper_storage::{FileStore, InMemoryStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Owner registered in every test vault.
pub const TEST_OWNER: &str = "bob";

/// Key of [`TEST_OWNER`].
pub const TEST_KEY: &str = "0123456789abcdef";

/// A test vault with automatic cleanup.
pub struct TestVault {
    /// The vault instance.
    pub vault: Vault,
    /// The in-memory store, if the vault is memory-backed.
    pub store: Option<Arc<InMemoryStore>>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestVault {
    /// Creates a new in-memory test vault with [`TEST_OWNER`] registered.
    pub fn memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let vault = Vault::new(
            VaultConfig::default(),
            Arc::clone(&store),
            Arc::new(ContextOwnerResolver),
        )
        .expect("Failed to open in-memory vault");
        vault.keys().set_key(TEST_OWNER, OwnerKey::from(TEST_KEY));

        Self {
            vault,
            store: Some(store),
            temp_dir: None,
        }
    }

    /// Creates a new directory-backed test vault with [`TEST_OWNER`]
    /// registered.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(FileStore::open(temp_dir.path()).expect("Failed to open file store"));
        let vault = Vault::new(VaultConfig::default(), store, Arc::new(ContextOwnerResolver))
            .expect("Failed to open file vault");
        vault.keys().set_key(TEST_OWNER, OwnerKey::from(TEST_KEY));

        Self {
            vault,
            store: None,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the vault directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }

    /// Returns the context of [`TEST_OWNER`].
    pub fn owner(&self) -> CallContext {
        CallContext::for_owner(TEST_OWNER)
    }

    /// Registers `owner` with a freshly generated key and returns their
    /// context.
    pub fn register(&self, owner: &str) -> CallContext {
        let key = self.vault.keys().generate_key();
        self.vault.keys().set_key(owner, key);
        CallContext::for_owner(owner)
    }
}

impl std::ops::Deref for TestVault {
    type Target = Vault;

    fn deref(&self) -> &Self::Target {
        &self.vault
    }
}

/// Runs a test with a temporary in-memory vault.
///
/// # Example
///
/// ```rust
/// use datakeeper_testkit::with_test_vault;
///
/// with_test_vault(|vault, ctx| {
///     assert!(vault.credentials().list(ctx).unwrap().is_empty());
/// });
/// ```
pub fn with_test_vault<F, R>(f: F) -> R
where
    F: FnOnce(&Vault, &CallContext) -> R,
{
    let test_vault = TestVault::memory();
    let ctx = test_vault.owner();
    f(&test_vault.vault, &ctx)
}

/// Runs a test with a temporary directory-backed vault.
pub fn with_file_vault<F, R>(f: F) -> R
where
    F: FnOnce(&Vault, &CallContext, &Path) -> R,
{
    let test_vault = TestVault::file();
    let ctx = test_vault.owner();
    let path = test_vault.path().expect("File vault should have a path");
    f(&test_vault.vault, &ctx, path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a vault whose test owner has `count` credentials.
    pub fn populated_vault(count: usize) -> TestVault {
        let test_vault = TestVault::memory();
        let ctx = test_vault.owner();

        for i in 0..count {
            let secret = CredentialSecret {
                name: format!("site-{i}"),
                login: TEST_OWNER.to_string(),
                password: format!("pw-{i}"),
            };
            test_vault
                .credentials()
                .create(&ctx, secret)
                .expect("Failed to create credential");
        }

        test_vault
    }
}
