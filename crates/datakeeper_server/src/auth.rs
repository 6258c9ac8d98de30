//! Owner tokens.
//!
//! Tokens are HMAC-SHA256 signed and carry the owner identity plus an
//! issue timestamp for expiration checking.
//!
//! ## Token Format
//!
//! Tokens are composed of:
//! - 8 bytes: timestamp (Unix millis, big-endian)
//! - n bytes: owner identity (UTF-8)
//! - 32 bytes: HMAC-SHA256 signature over the preceding bytes
//!
//! The whole token is hex-encoded for transport.

use crate::error::{ServerError, ServerResult};
use datakeeper_core::CallContext;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const TIMESTAMP_LEN: usize = 8;
const SIGNATURE_LEN: usize = 32;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token expiration duration.
    pub token_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_expiry: Duration::from_secs(24 * 60 * 60), // 24 hours
        }
    }

    /// Sets the token expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

/// Issues and checks owner tokens.
#[derive(Clone)]
pub struct TokenValidator {
    config: AuthConfig,
}

impl TokenValidator {
    /// Creates a new token validator.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Creates a token for `owner`.
    pub fn create_token(&self, owner: &str) -> ServerResult<String> {
        self.create_token_at(owner, now_millis())
    }

    fn create_token_at(&self, owner: &str, timestamp: u64) -> ServerResult<String> {
        let mut data = Vec::with_capacity(TIMESTAMP_LEN + owner.len() + SIGNATURE_LEN);
        data.extend_from_slice(&timestamp.to_be_bytes());
        data.extend_from_slice(owner.as_bytes());

        let signature = self.sign(&data)?;
        data.extend_from_slice(&signature);
        Ok(hex::encode(data))
    }

    /// Validates a token and returns the owner it was issued to.
    pub fn validate_token(&self, token: &str) -> ServerResult<String> {
        let raw = hex::decode(token)
            .map_err(|_| ServerError::NotAuthorized("Malformed token".into()))?;
        if raw.len() <= TIMESTAMP_LEN + SIGNATURE_LEN {
            return Err(ServerError::NotAuthorized("Invalid token length".into()));
        }

        let (data, signature) = raw.split_at(raw.len() - SIGNATURE_LEN);
        self.verify(data, signature)?;

        let (timestamp_bytes, owner) = data.split_at(TIMESTAMP_LEN);
        let mut timestamp = [0u8; TIMESTAMP_LEN];
        timestamp.copy_from_slice(timestamp_bytes);
        let timestamp = u64::from_be_bytes(timestamp);

        let expiry_millis = self.config.token_expiry.as_millis() as u64;
        if now_millis() > timestamp.saturating_add(expiry_millis) {
            return Err(ServerError::NotAuthorized("Token expired".into()));
        }

        String::from_utf8(owner.to_vec())
            .map_err(|_| ServerError::NotAuthorized("Malformed owner".into()))
    }

    /// Validates a token and builds the call context for its owner.
    pub fn authenticate(&self, token: Option<&str>) -> ServerResult<CallContext> {
        let token = token.ok_or_else(|| ServerError::NotAuthorized("Missing token".into()))?;
        Ok(CallContext::for_owner(self.validate_token(token)?))
    }

    fn mac(&self) -> ServerResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| ServerError::Internal(format!("token key: {e}")))
    }

    /// Signs data with HMAC-SHA256.
    fn sign(&self, data: &[u8]) -> ServerResult<[u8; SIGNATURE_LEN]> {
        let mut mac = self.mac()?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> ServerResult<()> {
        let mut mac = self.mac()?;
        mac.update(data);
        mac.verify_slice(signature)
            .map_err(|_| ServerError::NotAuthorized("Invalid signature".into()))
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> TokenValidator {
        TokenValidator::new(AuthConfig::new(b"test-secret-key-32-bytes-long!!".to_vec()))
    }

    #[test]
    fn create_and_validate_token() {
        let validator = validator();
        let token = validator.create_token("bob@example.com").unwrap();
        assert_eq!(validator.validate_token(&token).unwrap(), "bob@example.com");
    }

    #[test]
    fn authenticate_builds_context() {
        let validator = validator();
        let token = validator.create_token("bob").unwrap();
        let ctx = validator.authenticate(Some(&token)).unwrap();
        assert_eq!(ctx.owner(), Some("bob"));
        assert!(validator.authenticate(None).is_err());
    }

    #[test]
    fn reject_tampered_token() {
        let validator = validator();
        let mut raw = hex::decode(validator.create_token("bob").unwrap()).unwrap();
        raw[TIMESTAMP_LEN] = b'r'; // "rob"

        assert!(validator.validate_token(&hex::encode(raw)).is_err());
    }

    #[test]
    fn reject_other_secret() {
        let token = validator().create_token("bob").unwrap();
        let other = TokenValidator::new(AuthConfig::new(b"another-secret".to_vec()));
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn reject_garbage() {
        let validator = validator();
        assert!(validator.validate_token("zz").is_err());
        assert!(validator.validate_token("00ff").is_err());
        assert!(validator.validate_token("").is_err());
    }

    #[test]
    fn reject_expired_token() {
        let validator = TokenValidator::new(
            AuthConfig::new(b"test-secret-key-32-bytes-long!!".to_vec())
                .with_expiry(Duration::from_secs(60)),
        );
        let issued = now_millis() - 61_000;
        let token = validator.create_token_at("bob", issued).unwrap();

        let err = validator.validate_token(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }
}
