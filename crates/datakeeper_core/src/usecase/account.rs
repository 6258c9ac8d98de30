//! Sign-in and sign-up.
//!
//! Credentials are checked by an external [`IdentityProvider`]. The vault
//! only takes care of the owner's key: at sign-in the owner supplies it,
//! at sign-up a fresh one is generated and handed back once.

use crate::crypto::{CodecError, KEY_SIZES};
use crate::error::{VaultError, VaultResult};
use crate::keys::{KeyRegistry, OwnerKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// External authentication service.
pub trait IdentityProvider: Send + Sync {
    /// Checks the credentials and returns a session token.
    ///
    /// # Errors
    ///
    /// [`VaultError::AuthenticationFailed`] for unknown accounts or wrong
    /// passwords.
    fn login(&self, email: &str, password: &str) -> VaultResult<String>;

    /// Creates an account and returns a session token.
    ///
    /// # Errors
    ///
    /// [`VaultError::AccountExists`] if the email is taken.
    fn register(&self, email: &str, password: &str) -> VaultResult<String>;
}

/// Result of a sign-up: the session token and the generated key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    /// Session token.
    pub token: String,
    /// The owner's new key. Shown once; the vault keeps it only in memory.
    pub key: String,
}

impl fmt::Debug for SignUpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpOutcome")
            .field("token", &self.token)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Sign-in / sign-up usecase.
#[derive(Clone)]
pub struct AccountService {
    keys: Arc<KeyRegistry>,
    provider: Arc<dyn IdentityProvider>,
}

impl AccountService {
    /// Creates the account usecase.
    pub fn new(keys: Arc<KeyRegistry>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { keys, provider }
    }

    /// Authenticates the owner and registers the key they supplied.
    ///
    /// The key is checked before the provider is asked, so a typo in the
    /// key never produces a session without a usable key.
    pub fn sign_in(&self, email: &str, password: &str, key: &str) -> VaultResult<String> {
        if !KEY_SIZES.contains(&key.len()) {
            return Err(CodecError::InvalidKeySize { actual: key.len() }.into());
        }
        let token = self.provider.login(email, password).map_err(|err| {
            warn!(owner = %email, error = %err, "sign-in rejected");
            err
        })?;

        self.keys.set_key(email, OwnerKey::from(key));
        debug!(owner = %email, "signed in");
        Ok(token)
    }

    /// Registers a new account and generates its key.
    pub fn sign_up(&self, email: &str, password: &str) -> VaultResult<SignUpOutcome> {
        if email.is_empty() {
            return Err(VaultError::validation("email must not be empty"));
        }
        let token = self.provider.register(email, password)?;

        let key = self.keys.generate_key();
        let printable = String::from_utf8_lossy(key.as_bytes()).into_owned();
        self.keys.set_key(email, key);

        debug!(owner = %email, "signed up");
        Ok(SignUpOutcome {
            token,
            key: printable,
        })
    }
}
