//! Credential commands.

use super::{CliResult, LocalVault};
use clap::Subcommand;
use datakeeper_core::{parse_id, CredentialPatch, CredentialSecret, UpdateRequest};
use serde_json::{json, Value};

/// Credential subcommands.
#[derive(Debug, Subcommand)]
pub enum CredentialAction {
    /// Store a login / password pair
    Add {
        /// Label, e.g. the site name
        name: String,
        /// Login
        login: String,
        /// Password
        password: String,
    },

    /// Change some fields of a stored credential
    Update {
        /// Record id
        id: String,
        /// New label
        #[arg(long)]
        name: Option<String>,
        /// New login
        #[arg(long)]
        login: Option<String>,
        /// New password
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete a credential
    Rm {
        /// Record id
        id: String,
    },

    /// List credentials
    Ls,
}

/// Runs a credential subcommand.
pub fn run(local: &LocalVault, action: CredentialAction) -> CliResult<Value> {
    let credentials = local.vault.credentials();
    let ctx = &local.ctx;
    let value = match action {
        CredentialAction::Add {
            name,
            login,
            password,
        } => {
            let id = credentials.create(
                ctx,
                CredentialSecret {
                    name,
                    login,
                    password,
                },
            )?;
            json!({ "id": id })
        }
        CredentialAction::Update {
            id,
            name,
            login,
            password,
        } => {
            let patch = CredentialPatch {
                name,
                login,
                password,
            };
            let id = credentials.update(ctx, UpdateRequest::new(parse_id(&id)?, patch))?;
            json!({ "id": id })
        }
        CredentialAction::Rm { id } => {
            let id = credentials.delete(ctx, parse_id(&id)?)?;
            json!({ "id": id })
        }
        CredentialAction::Ls => serde_json::to_value(credentials.list(ctx)?)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::super::testing::open;
    use super::*;
    use tempfile::tempdir;

    fn add(local: &LocalVault) -> String {
        let value = run(
            local,
            CredentialAction::Add {
                name: "site".into(),
                login: "bob".into(),
                password: "pw1".into(),
            },
        )
        .unwrap();
        value["id"].as_str().unwrap().to_string()
    }

    #[test]
    fn add_update_list_rm() {
        let dir = tempdir().unwrap();
        let local = open(&dir, "bob");
        let id = add(&local);

        run(
            &local,
            CredentialAction::Update {
                id: id.clone(),
                name: None,
                login: None,
                password: Some("pw2".into()),
            },
        )
        .unwrap();

        let listed = run(&local, CredentialAction::Ls).unwrap();
        assert_eq!(
            listed,
            json!([{ "id": id, "name": "site", "login": "bob", "password": "pw2" }])
        );

        run(&local, CredentialAction::Rm { id }).unwrap();
        assert_eq!(run(&local, CredentialAction::Ls).unwrap(), json!([]));
    }

    #[test]
    fn malformed_id_is_rejected() {
        let dir = tempdir().unwrap();
        let local = open(&dir, "bob");
        assert!(run(&local, CredentialAction::Rm { id: "nope".into() }).is_err());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let local = open(&dir, "bob");
            add(&local)
        };

        let local = open(&dir, "bob");
        let listed = run(&local, CredentialAction::Ls).unwrap();
        assert_eq!(listed[0]["id"], id);
    }
}
