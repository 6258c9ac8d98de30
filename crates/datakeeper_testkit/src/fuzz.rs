//! Fuzz harnesses for Datakeeper.
//!
//! Each target accepts arbitrary bytes and must either succeed or return
//! an error. A panic is a bug. The targets can be driven by cargo-fuzz or
//! by proptest, as the tests below do.

use crate::fixtures::{TestVault, TEST_OWNER};
use datakeeper_core::crypto::{decrypt, encrypt, KEY_SIZES};
use datakeeper_core::{CredentialPatch, CredentialSecret, Payload, UpdateRequest};
use datakeeper_server::{ServerConfig, VaultServer};
use datakeeper_storage::{ContentType, RecordId, RecordStore, VaultRecord};

/// Fuzz target for ciphertext decoding.
///
/// The first byte picks the key size, the rest is treated as ciphertext.
pub fn fuzz_decrypt(data: &[u8]) {
    let Some((&selector, cipher_text)) = data.split_first() else {
        return;
    };
    let len = KEY_SIZES[selector as usize % KEY_SIZES.len()];
    let key = vec![selector; len];
    let _ = decrypt(&key, cipher_text);
}

/// Fuzz target for the encrypt / decrypt pair.
///
/// Whatever goes in must come back out under the same key.
pub fn fuzz_codec_roundtrip(data: &[u8]) {
    let key = b"0123456789abcdef0123456789abcdef";
    let sealed = encrypt(key, data).expect("32-byte key is valid");
    let opened = decrypt(key, &sealed).expect("Fresh ciphertext must decrypt");
    assert_eq!(opened, data, "Roundtrip mismatch");
}

/// Fuzz target for payload decoding.
pub fn fuzz_payload_decode(data: &[u8]) {
    for content_type in [ContentType::Credential, ContentType::Card, ContentType::File] {
        if let Ok(payload) = Payload::decode(content_type, data) {
            assert_eq!(payload.content_type(), content_type);
        }
    }
}

/// Fuzz target for stored records.
///
/// Plants `data` as the ciphertext of a credential owned by the test
/// owner, then lists and updates it. Both calls must fail cleanly or
/// succeed.
pub fn fuzz_stored_record(data: &[u8]) {
    let vault = TestVault::memory();
    let ctx = vault.owner();
    let Some(store) = vault.store.as_ref() else {
        return;
    };
    let id = RecordId::new();
    let record = VaultRecord::new(id, TEST_OWNER, ContentType::Credential, data.to_vec());
    if store.insert(&record).is_err() {
        return;
    }

    let listed = vault.credentials().list(&ctx);
    let updated = vault
        .credentials()
        .update(&ctx, UpdateRequest::new(id, CredentialPatch::default()));
    assert_eq!(listed.is_ok(), updated.is_ok(), "List and update disagree on {id}");
    if updated.is_err() {
        let stored = store.raw_record(id).expect("Record must survive a failed update");
        assert_eq!(stored.cipher_text, data, "Failed update must not overwrite");
    }
}

/// Fuzz target for the JSON request surface.
pub fn fuzz_request_json(data: &[u8]) {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(server) = VaultServer::in_memory(ServerConfig::new(b"fuzz".to_vec())) else {
        return;
    };
    let response = server.handle_json(None, body);
    assert!(
        serde_json::from_str::<serde_json::Value>(&response).is_ok(),
        "Response is not JSON: {response}"
    );
}

/// Fuzz target for a credential surviving arbitrary field contents.
pub fn fuzz_credential_fields(name: &str, login: &str, password: &str) {
    let vault = TestVault::memory();
    let ctx = vault.owner();
    let secret = CredentialSecret {
        name: name.to_string(),
        login: login.to_string(),
        password: password.to_string(),
    };
    let id = vault
        .credentials()
        .create(&ctx, secret.clone())
        .expect("Failed to create credential");
    let items = vault.credentials().list(&ctx).expect("Failed to list credentials");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, id);
    assert_eq!(items[0].secret, secret);
}
