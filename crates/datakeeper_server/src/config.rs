//! Server configuration.

use datakeeper_core::VaultConfig;
use std::time::Duration;

/// Configuration for the vault server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Secret key for token signing.
    pub token_secret: Vec<u8>,
    /// Token lifetime.
    pub token_expiry: Duration,
    /// Largest accepted upload, in bytes.
    pub max_upload_size: u64,
    /// Configuration of the vault behind the server.
    pub vault: VaultConfig,
}

impl ServerConfig {
    /// Creates a new server configuration signing tokens with `secret`.
    pub fn new(token_secret: Vec<u8>) -> Self {
        Self {
            token_secret,
            token_expiry: Duration::from_secs(24 * 60 * 60), // 24 hours
            max_upload_size: 5 * 1024 * 1024,
            vault: VaultConfig::default(),
        }
    }

    /// Sets the token lifetime.
    pub fn with_token_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }

    /// Sets the maximum upload size.
    pub fn with_max_upload_size(mut self, size: u64) -> Self {
        self.max_upload_size = size;
        self
    }

    /// Sets the vault configuration.
    pub fn with_vault(mut self, vault: VaultConfig) -> Self {
        self.vault = vault;
        self
    }
}
