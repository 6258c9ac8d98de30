//! End-to-end tests through the JSON request surface.

use datakeeper_server::{ServerConfig, VaultServer};
use datakeeper_storage::FileStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;

fn call(server: &VaultServer, token: Option<&str>, request: Value) -> Value {
    let response = server.handle_json(token, &request.to_string());
    serde_json::from_str(&response).unwrap()
}

fn sign_up(server: &VaultServer, email: &str) -> (String, String) {
    let response = call(
        server,
        None,
        json!({ "op": "sign_up", "body": { "email": email, "password": "hunter2" } }),
    );
    assert_eq!(response["kind"], "signed_up", "{response}");
    let token = response["body"]["token"].as_str().unwrap().to_string();
    let key = response["body"]["key"].as_str().unwrap().to_string();
    (token, key)
}

#[test]
fn credential_lifecycle() {
    let server = VaultServer::in_memory(ServerConfig::new(b"secret".to_vec())).unwrap();
    let (token, key) = sign_up(&server, "bob@example.com");
    assert_eq!(key.len(), 32);
    let token = Some(token.as_str());

    let created = call(
        &server,
        token,
        json!({
            "op": "create_credential",
            "body": { "name": "site", "login": "bob", "password": "pw1" }
        }),
    );
    assert_eq!(created["kind"], "id", "{created}");
    let id = created["body"]["id"].clone();

    let updated = call(
        &server,
        token,
        json!({ "op": "update_credential", "body": { "id": id, "password": "pw2" } }),
    );
    assert_eq!(updated["body"]["id"], id);

    let listed = call(&server, token, json!({ "op": "list_credentials" }));
    assert_eq!(
        listed,
        json!({
            "kind": "credentials",
            "body": [{ "id": id, "name": "site", "login": "bob", "password": "pw2" }]
        })
    );

    let deleted = call(&server, token, json!({ "op": "delete_credential", "body": { "id": id } }));
    assert_eq!(deleted["kind"], "id");
    let listed = call(&server, token, json!({ "op": "list_credentials" }));
    assert_eq!(listed["body"], json!([]));
}

#[test]
fn files_survive_restart_after_sign_in() {
    let dir = tempdir().unwrap();
    let config = ServerConfig::new(b"secret".to_vec());

    let (key, id) = {
        let server = VaultServer::new(config.clone(), Arc::new(FileStore::open(dir.path()).unwrap()))
            .unwrap();
        let (token, key) = sign_up(&server, "bob@example.com");
        let uploaded = call(
            &server,
            Some(&token),
            json!({
                "op": "upload_file",
                "body": { "name": "a.txt", "format": "txt", "bytes": hex_of(b"test") }
            }),
        );
        assert_eq!(uploaded["kind"], "id", "{uploaded}");
        (key, uploaded["body"]["id"].clone())
    };

    // Accounts live in memory, so the restarted server needs a new
    // account with the same email; the owner is the email either way.
    let server = VaultServer::new(config, Arc::new(FileStore::open(dir.path()).unwrap())).unwrap();
    sign_up(&server, "bob@example.com");
    let signed_in = call(
        &server,
        None,
        json!({
            "op": "sign_in",
            "body": { "email": "bob@example.com", "password": "hunter2", "key": key }
        }),
    );
    assert_eq!(signed_in["kind"], "token", "{signed_in}");
    let token = signed_in["body"]["token"].as_str().unwrap().to_string();

    let downloaded = call(
        &server,
        Some(&token),
        json!({ "op": "download_file", "body": { "id": id } }),
    );
    assert_eq!(
        downloaded,
        json!({
            "kind": "file",
            "body": { "name": "a.txt", "format": "txt", "bytes": hex_of(b"test") }
        })
    );
}

#[test]
fn requests_without_token_are_rejected() {
    let server = VaultServer::in_memory(ServerConfig::new(b"secret".to_vec())).unwrap();
    let response = call(&server, None, json!({ "op": "list_cards" }));
    assert_eq!(response["kind"], "error");
    assert_eq!(response["body"]["status"], 401);

    let response = call(&server, Some("garbage"), json!({ "op": "list_cards" }));
    assert_eq!(response["body"]["status"], 401);
}

#[test]
fn malformed_requests_are_bad_requests() {
    let server = VaultServer::in_memory(ServerConfig::new(b"secret".to_vec())).unwrap();
    let (token, _) = sign_up(&server, "bob@example.com");

    let response = server.handle_json(Some(&token), "{ not json");
    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["body"]["status"], 400);

    let response = call(
        &server,
        Some(&token),
        json!({ "op": "delete_card", "body": { "id": "not-an-id" } }),
    );
    assert_eq!(response["body"]["status"], 400);
}

#[test]
fn owners_are_isolated() {
    let server = VaultServer::in_memory(ServerConfig::new(b"secret".to_vec())).unwrap();
    let (bob, _) = sign_up(&server, "bob@example.com");
    let (alice, _) = sign_up(&server, "alice@example.com");

    let created = call(
        &server,
        Some(&bob),
        json!({
            "op": "create_card",
            "body": {
                "key": "visa",
                "number": "4111111111111111",
                "cvv": "123",
                "name": "BOB",
                "expires": "12/30"
            }
        }),
    );
    let id = created["body"]["id"].clone();

    let listed = call(&server, Some(&alice), json!({ "op": "list_cards" }));
    assert_eq!(listed["body"], json!([]));

    let deleted = call(&server, Some(&alice), json!({ "op": "delete_card", "body": { "id": id } }));
    assert_eq!(deleted["body"]["status"], 404);

    let listed = call(&server, Some(&bob), json!({ "op": "list_cards" }));
    assert_eq!(listed["body"].as_array().unwrap().len(), 1);
}

fn hex_of(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
