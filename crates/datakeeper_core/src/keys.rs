//! Per-owner key registry.
//!
//! Keys live only in process memory. They are registered when an owner
//! signs in (key supplied by the owner) or signs up (key generated here),
//! and are lost on restart. Records written under a lost key stay
//! undecryptable until the owner supplies the same key again.

use crate::crypto::{CbcCipher, CodecResult};
use crate::error::{VaultError, VaultResult};
use parking_lot::Mutex;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The symmetric key encrypting all of one owner's records.
///
/// The key is zeroized when dropped and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct OwnerKey {
    bytes: Vec<u8>,
}

impl OwnerKey {
    /// Creates a key from raw bytes. The length is not checked here; the
    /// codec rejects unusable keys.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Returns the key bytes.
    ///
    /// # Security
    ///
    /// Don't log or persist the result.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Builds a codec for this key.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidKeySize` for keys that are not 16, 24 or 32 bytes.
    pub fn cipher(&self) -> CodecResult<CbcCipher> {
        CbcCipher::new(&self.bytes)
    }
}

impl From<&str> for OwnerKey {
    fn from(key: &str) -> Self {
        Self::from_bytes(key.as_bytes())
    }
}

impl fmt::Debug for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Generates a key of `len` letters drawn from the OS CSPRNG.
///
/// The key is printable so it can be handed to the owner at sign-up and
/// typed back in at sign-in.
pub fn generate_key(len: usize) -> OwnerKey {
    let pick = Uniform::from(0..KEY_ALPHABET.len());
    let bytes: Vec<u8> = (0..len)
        .map(|_| KEY_ALPHABET[pick.sample(&mut OsRng)])
        .collect();
    OwnerKey::from_bytes(bytes)
}

/// Thread-safe map from owner identity to key.
///
/// A single mutex guards the map and is held only for the map access,
/// never around encryption or storage calls.
pub struct KeyRegistry {
    keys: Mutex<HashMap<String, OwnerKey>>,
    generated_key_len: usize,
}

impl KeyRegistry {
    /// Creates an empty registry generating 32-byte keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_generated_key_len(32)
    }

    /// Creates an empty registry generating keys of `len` bytes.
    #[must_use]
    pub fn with_generated_key_len(len: usize) -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            generated_key_len: len,
        }
    }

    /// Registers `key` for `owner`, replacing any previous key.
    pub fn set_key(&self, owner: impl Into<String>, key: OwnerKey) {
        self.keys.lock().insert(owner.into(), key);
    }

    /// Returns the key registered for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeyNotFound`] if the owner never registered a
    /// key in this process.
    pub fn get_key(&self, owner: &str) -> VaultResult<OwnerKey> {
        self.keys
            .lock()
            .get(owner)
            .cloned()
            .ok_or_else(|| VaultError::key_not_found(owner))
    }

    /// Forgets the key of `owner`, returning it if present.
    pub fn remove_key(&self, owner: &str) -> Option<OwnerKey> {
        self.keys.lock().remove(owner)
    }

    /// Generates a fresh key of the configured length.
    pub fn generate_key(&self) -> OwnerKey {
        generate_key(self.generated_key_len)
    }

    /// Returns the number of registered owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    /// Returns true if no owner is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRegistry")
            .field("owners", &self.len())
            .field("generated_key_len", &self.generated_key_len)
            .finish()
    }
}
