//! Model-based integration harness.
//!
//! [`VaultHarness`] applies [`VaultOperation`]s to a real vault and to a
//! plain in-memory model at the same time, then checks that listing the
//! vault gives back exactly what the model expects.

use crate::fixtures::TestVault;
use crate::generators::VaultOperation;
use datakeeper_core::{
    CallContext, CardSecret, CredentialSecret, FileEntry, Patch, RecordId, UpdateRequest, Vault,
};
use std::collections::BTreeMap;

/// A vault paired with the state it should hold.
pub struct VaultHarness {
    /// The vault under test.
    pub vault: TestVault,
    ctx: CallContext,
    credentials: BTreeMap<RecordId, CredentialSecret>,
    cards: BTreeMap<RecordId, CardSecret>,
    files: BTreeMap<RecordId, (String, String, Vec<u8>)>,
}

impl VaultHarness {
    /// Creates a harness over an in-memory vault.
    pub fn new() -> Self {
        Self::over(TestVault::memory())
    }

    /// Creates a harness over `vault`, acting as its test owner.
    pub fn over(vault: TestVault) -> Self {
        let ctx = vault.owner();
        Self {
            vault,
            ctx,
            credentials: BTreeMap::new(),
            cards: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Returns the vault under test.
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Applies one operation to both the vault and the model.
    ///
    /// Index-addressed operations against an empty collection are no-ops.
    pub fn apply(&mut self, op: VaultOperation) {
        let ctx = &self.ctx;
        match op {
            VaultOperation::CreateCredential(secret) => {
                let id = self
                    .vault
                    .credentials()
                    .create(ctx, secret.clone())
                    .expect("Failed to create credential");
                self.credentials.insert(id, secret);
            }
            VaultOperation::UpdateCredential { index, patch } => {
                let Some(id) = nth_key(&self.credentials, index) else {
                    return;
                };
                self.vault
                    .credentials()
                    .update(ctx, UpdateRequest::new(id, patch.clone()))
                    .expect("Failed to update credential");
                if let Some(secret) = self.credentials.get_mut(&id) {
                    patch.apply_to(secret);
                }
            }
            VaultOperation::DeleteCredential { index } => {
                let Some(id) = nth_key(&self.credentials, index) else {
                    return;
                };
                self.vault
                    .credentials()
                    .delete(ctx, id)
                    .expect("Failed to delete credential");
                self.credentials.remove(&id);
            }
            VaultOperation::CreateCard(secret) => {
                let id = self
                    .vault
                    .cards()
                    .create(ctx, secret.clone())
                    .expect("Failed to create card");
                self.cards.insert(id, secret);
            }
            VaultOperation::UpdateCard { index, patch } => {
                let Some(id) = nth_key(&self.cards, index) else {
                    return;
                };
                self.vault
                    .cards()
                    .update(ctx, UpdateRequest::new(id, patch.clone()))
                    .expect("Failed to update card");
                if let Some(secret) = self.cards.get_mut(&id) {
                    patch.apply_to(secret);
                }
            }
            VaultOperation::DeleteCard { index } => {
                let Some(id) = nth_key(&self.cards, index) else {
                    return;
                };
                self.vault
                    .cards()
                    .delete(ctx, id)
                    .expect("Failed to delete card");
                self.cards.remove(&id);
            }
            VaultOperation::UploadFile(request) => {
                let expected = (
                    request.name.clone(),
                    request.format.clone(),
                    request.bytes.clone(),
                );
                let id = self
                    .vault
                    .files()
                    .upload(ctx, request)
                    .expect("Failed to upload file");
                self.files.insert(id, expected);
            }
            VaultOperation::DeleteFile { index } => {
                let Some(id) = nth_key(&self.files, index) else {
                    return;
                };
                self.vault
                    .files()
                    .delete(ctx, id)
                    .expect("Failed to delete file");
                self.files.remove(&id);
            }
        }
    }

    /// Asserts that the vault lists exactly the modelled contents.
    pub fn verify_all(&self) {
        let ctx = &self.ctx;

        let credentials: BTreeMap<_, _> = self
            .vault
            .credentials()
            .list(ctx)
            .expect("Failed to list credentials")
            .into_iter()
            .map(|item| (item.id, item.secret))
            .collect();
        assert_eq!(credentials, self.credentials, "Credential mismatch");

        let cards: BTreeMap<_, _> = self
            .vault
            .cards()
            .list(ctx)
            .expect("Failed to list cards")
            .into_iter()
            .map(|item| (item.id, item.secret))
            .collect();
        assert_eq!(cards, self.cards, "Card mismatch");

        let files: BTreeMap<RecordId, FileEntry> = self
            .vault
            .files()
            .list(ctx)
            .expect("Failed to list files")
            .into_iter()
            .map(|entry| (entry.id, entry))
            .collect();
        assert_eq!(
            files.keys().collect::<Vec<_>>(),
            self.files.keys().collect::<Vec<_>>(),
            "File id mismatch"
        );
        for (id, (name, format, bytes)) in &self.files {
            let entry = &files[id];
            assert_eq!(&entry.name, name, "File name mismatch for {id}");
            assert_eq!(&entry.format, format, "File format mismatch for {id}");
            assert_eq!(entry.size, bytes.len() as u64, "File size mismatch for {id}");

            let downloaded = self
                .vault
                .files()
                .download(ctx, *id)
                .expect("Failed to download file");
            assert_eq!(&downloaded.bytes, bytes, "File bytes mismatch for {id}");
        }
    }

    /// Returns the number of modelled items across all shapes.
    pub fn tracked_count(&self) -> usize {
        self.credentials.len() + self.cards.len() + self.files.len()
    }
}

impl Default for VaultHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn nth_key<V>(map: &BTreeMap<RecordId, V>, index: usize) -> Option<RecordId> {
    if map.is_empty() {
        return None;
    }
    map.keys().nth(index % map.len()).copied()
}
