//! Symmetric codec for vault payloads.
//!
//! Every payload is encrypted with AES in CBC mode under the owner's key.
//!
//! ## Format
//!
//! `iv (16 bytes) || ciphertext`, where the ciphertext is the plaintext
//! padded to a multiple of the block size. Each padding byte holds the
//! padding length (1..=16), so a full block of padding is added when the
//! plaintext is already block aligned.
//!
//! ## Security Model
//!
//! - A fresh random IV is drawn from the OS CSPRNG on every call, so
//!   encrypting the same plaintext twice yields different ciphertexts
//! - Keys of 16, 24 or 32 bytes select AES-128, AES-192 or AES-256
//! - **No authentication tag.** Decryption only checks the last padding
//!   byte. A modified ciphertext either fails with
//!   [`CodecError::InvalidPadding`] or silently decrypts to different
//!   plaintext. Callers must not treat a successful decrypt as proof of
//!   integrity.
//!
//! ## Usage
//!
//! ```
//! use datakeeper_core::crypto::{decrypt, encrypt};
//!
//! let key = b"0123456789abcdef";
//! let sealed = encrypt(key, b"secret").unwrap();
//! assert_eq!(decrypt(key, &sealed).unwrap(), b"secret");
//! ```

mod cipher;

pub use cipher::{decrypt, encrypt, CbcCipher, CodecError, CodecResult, BLOCK_SIZE, KEY_SIZES};
