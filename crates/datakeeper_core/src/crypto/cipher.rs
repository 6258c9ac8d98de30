//! AES-CBC with length-valued padding.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// AES block size in bytes. Also the IV length.
pub const BLOCK_SIZE: usize = 16;

/// Accepted key lengths in bytes.
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The key is not 16, 24 or 32 bytes long.
    #[error("invalid key size: {actual} bytes (expected 16, 24 or 32)")]
    InvalidKeySize {
        /// Length of the rejected key.
        actual: usize,
    },

    /// The ciphertext is shorter than an IV plus one block, or the body is
    /// not block aligned.
    #[error("invalid ciphertext length: {len} bytes")]
    InvalidCiphertext {
        /// Length of the rejected ciphertext.
        len: usize,
    },

    /// The trailing padding byte is outside `1..=16`.
    #[error("invalid padding value: {value}")]
    InvalidPadding {
        /// The padding byte found after decryption.
        value: u8,
    },
}

enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    fn new(key: &[u8]) -> CodecResult<Self> {
        let invalid = |_| CodecError::InvalidKeySize { actual: key.len() };
        match key.len() {
            16 => Aes128::new_from_slice(key).map(Self::Aes128).map_err(invalid),
            24 => Aes192::new_from_slice(key).map(Self::Aes192).map_err(invalid),
            32 => Aes256::new_from_slice(key).map(Self::Aes256).map_err(invalid),
            actual => Err(CodecError::InvalidKeySize { actual }),
        }
    }

    fn encrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(c) => c.decrypt_block(block),
            Self::Aes192(c) => c.decrypt_block(block),
            Self::Aes256(c) => c.decrypt_block(block),
        }
    }
}

/// A CBC codec bound to one key.
///
/// Building the cipher validates the key once, so a usecase encrypting
/// several payloads for the same owner only pays for the key schedule once.
pub struct CbcCipher {
    inner: BlockCipher,
}

impl CbcCipher {
    /// Creates a codec for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidKeySize`] unless the key is 16, 24 or
    /// 32 bytes long.
    pub fn new(key: &[u8]) -> CodecResult<Self> {
        Ok(Self {
            inner: BlockCipher::new(key)?,
        })
    }

    /// Encrypts `plaintext` under a fresh random IV.
    ///
    /// The output is `iv || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let padding = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;

        let mut iv = [0u8; BLOCK_SIZE];
        OsRng.fill_bytes(&mut iv);

        let mut out = Vec::with_capacity(BLOCK_SIZE + plaintext.len() + padding);
        out.extend_from_slice(&iv);
        out.extend_from_slice(plaintext);
        // padding is in 1..=16
        out.resize(out.len() + padding, padding as u8);

        let mut chain = iv;
        for chunk in out[BLOCK_SIZE..].chunks_exact_mut(BLOCK_SIZE) {
            xor_in_place(chunk, &chain);
            let block = Block::from_mut_slice(chunk);
            self.inner.encrypt_block(block);
            chain.copy_from_slice(block);
        }
        out
    }

    /// Decrypts `iv || ciphertext` produced by [`encrypt`](Self::encrypt).
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidCiphertext`] if the input is shorter than two
    ///   blocks or not block aligned
    /// - [`CodecError::InvalidPadding`] if the final byte is not a valid
    ///   padding length
    pub fn decrypt(&self, cipher_text: &[u8]) -> CodecResult<Vec<u8>> {
        let len = cipher_text.len();
        if len < 2 * BLOCK_SIZE || len % BLOCK_SIZE != 0 {
            return Err(CodecError::InvalidCiphertext { len });
        }

        let (iv, body) = cipher_text.split_at(BLOCK_SIZE);
        let mut plain = body.to_vec();

        let mut chain = [0u8; BLOCK_SIZE];
        chain.copy_from_slice(iv);
        for chunk in plain.chunks_exact_mut(BLOCK_SIZE) {
            let mut next = [0u8; BLOCK_SIZE];
            next.copy_from_slice(chunk);
            self.inner.decrypt_block(Block::from_mut_slice(chunk));
            xor_in_place(chunk, &chain);
            chain = next;
        }

        let value = plain.last().copied().unwrap_or(0);
        let padding = usize::from(value);
        if padding == 0 || padding > BLOCK_SIZE {
            return Err(CodecError::InvalidPadding { value });
        }
        plain.truncate(plain.len() - padding);
        Ok(plain)
    }
}

fn xor_in_place(block: &mut [u8], other: &[u8; BLOCK_SIZE]) {
    for (b, o) in block.iter_mut().zip(other) {
        *b ^= o;
    }
}

/// Encrypts `plaintext` with `key`.
///
/// # Errors
///
/// Returns [`CodecError::InvalidKeySize`] for keys that are not 16, 24 or
/// 32 bytes long.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> CodecResult<Vec<u8>> {
    Ok(CbcCipher::new(key)?.encrypt(plaintext))
}

/// Decrypts `cipher_text` with `key`.
///
/// # Errors
///
/// See [`CbcCipher::decrypt`]; also fails with
/// [`CodecError::InvalidKeySize`].
pub fn decrypt(key: &[u8], cipher_text: &[u8]) -> CodecResult<Vec<u8>> {
    CbcCipher::new(key)?.decrypt(cipher_text)
}
