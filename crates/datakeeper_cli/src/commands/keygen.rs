//! Key generation.

use super::CliResult;
use datakeeper_core::{generate_key, CodecError, VaultError, KEY_SIZES};
use serde_json::{json, Value};

/// Generates a printable key of `length` characters.
pub fn run(length: usize) -> CliResult<Value> {
    if !KEY_SIZES.contains(&length) {
        let err = VaultError::from(CodecError::InvalidKeySize { actual: length });
        return Err(err.into());
    }
    let key = generate_key(length);
    Ok(json!({ "key": String::from_utf8_lossy(key.as_bytes()) }))
}
