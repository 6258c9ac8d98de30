//! Local identity provider.
//!
//! Keeps accounts in memory with Argon2id password hashes and issues
//! owner tokens through the [`TokenValidator`]. Suitable for tests and
//! single-process deployments; a real deployment plugs an external
//! service in through [`IdentityProvider`].

use crate::auth::TokenValidator;
use argon2::Argon2;
use datakeeper_core::{IdentityProvider, VaultError, VaultResult};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use std::sync::Arc;
use tracing::debug;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

struct Account {
    salt: [u8; SALT_LEN],
    hash: [u8; HASH_LEN],
}

/// In-memory accounts.
pub struct LocalIdentityProvider {
    tokens: Arc<TokenValidator>,
    accounts: RwLock<HashMap<String, Account>>,
}

impl LocalIdentityProvider {
    /// Creates a provider issuing tokens with `tokens`.
    pub fn new(tokens: Arc<TokenValidator>) -> Self {
        Self {
            tokens,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the number of accounts.
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn issue(&self, email: &str) -> VaultResult<String> {
        self.tokens
            .create_token(email)
            .map_err(|e| VaultError::AuthenticationFailed(e.to_string()))
    }
}

fn hash_password(password: &str, salt: &[u8; SALT_LEN]) -> VaultResult<[u8; HASH_LEN]> {
    let mut output = [0u8; HASH_LEN];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut output)
        .map_err(|e| VaultError::AuthenticationFailed(format!("password hashing failed: {e}")))?;
    Ok(output)
}

impl IdentityProvider for LocalIdentityProvider {
    fn login(&self, email: &str, password: &str) -> VaultResult<String> {
        let (salt, expected) = match self.accounts.read().get(email) {
            Some(account) => (account.salt, account.hash),
            None => return Err(VaultError::AuthenticationFailed("invalid email or password".into())),
        };

        let actual = hash_password(password, &salt)?;
        if !bool::from(actual[..].ct_eq(&expected[..])) {
            return Err(VaultError::AuthenticationFailed("invalid email or password".into()));
        }

        debug!(owner = %email, "login accepted");
        self.issue(email)
    }

    fn register(&self, email: &str, password: &str) -> VaultResult<String> {
        if password.is_empty() {
            return Err(VaultError::validation("password must not be empty"));
        }
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let hash = hash_password(password, &salt)?;

        {
            let mut accounts = self.accounts.write();
            if accounts.contains_key(email) {
                return Err(VaultError::AccountExists(email.to_string()));
            }
            accounts.insert(email.to_string(), Account { salt, hash });
        }

        debug!(owner = %email, "account registered");
        self.issue(email)
    }
}
