//! Vault configuration.

use crate::crypto::KEY_SIZES;
use crate::error::{VaultError, VaultResult};

/// Configuration for a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Length of keys generated at sign-up. Must be a valid AES key size.
    pub generated_key_len: usize,

    /// Largest file accepted for upload, in bytes.
    pub max_file_size: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            generated_key_len: 32,
            max_file_size: 5 * 1024 * 1024, // 5 MB
        }
    }
}

impl VaultConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generated key length.
    #[must_use]
    pub const fn generated_key_len(mut self, len: usize) -> Self {
        self.generated_key_len = len;
        self
    }

    /// Sets the maximum file size.
    #[must_use]
    pub const fn max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the key length is not an AES key size
    /// or the file size limit is zero.
    pub fn validate(&self) -> VaultResult<()> {
        if !KEY_SIZES.contains(&self.generated_key_len) {
            return Err(VaultError::validation(format!(
                "generated key length {} is not one of {KEY_SIZES:?}",
                self.generated_key_len
            )));
        }
        if self.max_file_size == 0 {
            return Err(VaultError::validation("max file size must be positive"));
        }
        Ok(())
    }
}
