//! Directory-based store for persistent vaults.

use crate::backend::{BlobStore, RecordStore};
use crate::error::{Namespace, StorageError, StorageResult};
use crate::record::{ContentType, FileBlob, RecordId, VaultRecord};
use fs2::FileExt;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const RECORDS_DIR: &str = "records";
const BLOBS_DIR: &str = "blobs";
const LOCK_FILE: &str = "vault.lock";

/// A directory-based record and blob store.
///
/// Layout:
///
/// ```text
/// <root>/vault.lock
/// <root>/records/<uuid>.json
/// <root>/blobs/<uuid>.json
/// ```
///
/// # Durability
///
/// Every write goes to a temporary file which is synced and then renamed
/// over the target, so a crash leaves either the old or the new document.
///
/// # Thread Safety
///
/// Access within a process is serialized by an internal lock. Access
/// across processes is prevented by an exclusive lock on `vault.lock`,
/// held for the lifetime of the store.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    guard: RwLock<()>,
    lock_file: File,
}

impl FileStore {
    /// Opens or creates a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another process has the vault
    /// open, or an I/O error if the directories cannot be created.
    pub fn open(root: &Path) -> StorageResult<Self> {
        fs::create_dir_all(root.join(RECORDS_DIR))?;
        fs::create_dir_all(root.join(BLOBS_DIR))?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join(LOCK_FILE))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| StorageError::Locked)?;

        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self {
            root: root.to_path_buf(),
            guard: RwLock::new(()),
            lock_file,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn item_path(&self, namespace: Namespace, id: RecordId) -> PathBuf {
        let dir = match namespace {
            Namespace::Records => RECORDS_DIR,
            Namespace::Blobs => BLOBS_DIR,
        };
        self.root.join(dir).join(format!("{id}.json"))
    }

    fn read_item<T: DeserializeOwned>(
        &self,
        namespace: Namespace,
        id: RecordId,
    ) -> StorageResult<Option<T>> {
        match fs::read(self.item_path(namespace, id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_item<T: Serialize>(
        &self,
        namespace: Namespace,
        id: RecordId,
        item: &T,
    ) -> StorageResult<()> {
        let bytes = serde_json::to_vec(item)?;
        write_atomically(&self.item_path(namespace, id), &bytes)?;
        Ok(())
    }

    fn remove_item(&self, namespace: Namespace, id: RecordId) -> StorageResult<()> {
        fs::remove_file(self.item_path(namespace, id))?;
        Ok(())
    }

    fn list_records(&self) -> StorageResult<Vec<VaultRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(self.root.join(RECORDS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            let record: VaultRecord = serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::Corrupted(format!("{}: {e}", path.display()))
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock_file);
    }
}

impl RecordStore for FileStore {
    fn insert(&self, record: &VaultRecord) -> StorageResult<()> {
        let _guard = self.guard.write();
        if self.item_path(Namespace::Records, record.id).exists() {
            return Err(StorageError::already_exists(Namespace::Records, record.id));
        }
        self.write_item(Namespace::Records, record.id, record)
    }

    fn update(&self, record: &VaultRecord) -> StorageResult<()> {
        let _guard = self.guard.write();
        let mut stored: VaultRecord = self
            .read_item(Namespace::Records, record.id)?
            .filter(|s: &VaultRecord| {
                s.matches(&record.owner_id, record.id, record.content_type)
            })
            .ok_or(StorageError::not_found(Namespace::Records, record.id))?;
        stored.cipher_text.clone_from(&record.cipher_text);
        self.write_item(Namespace::Records, record.id, &stored)
    }

    fn delete(&self, owner: &str, id: RecordId, content_type: ContentType) -> StorageResult<()> {
        let _guard = self.guard.write();
        let matched = self
            .read_item::<VaultRecord>(Namespace::Records, id)?
            .is_some_and(|s| s.matches(owner, id, content_type));
        if !matched {
            return Err(StorageError::not_found(Namespace::Records, id));
        }
        self.remove_item(Namespace::Records, id)
    }

    fn get_by_id(
        &self,
        owner: &str,
        id: RecordId,
        content_type: ContentType,
    ) -> StorageResult<VaultRecord> {
        let _guard = self.guard.read();
        self.read_item::<VaultRecord>(Namespace::Records, id)?
            .filter(|s| s.matches(owner, id, content_type))
            .ok_or(StorageError::not_found(Namespace::Records, id))
    }

    fn get_by_owner(
        &self,
        owner: &str,
        content_type: ContentType,
    ) -> StorageResult<Vec<VaultRecord>> {
        let _guard = self.guard.read();
        Ok(self
            .list_records()?
            .into_iter()
            .filter(|r| r.content_type == content_type && r.is_owned_by(owner))
            .collect())
    }
}

impl BlobStore for FileStore {
    fn insert_blob(&self, blob: &FileBlob) -> StorageResult<()> {
        let _guard = self.guard.write();
        if self.item_path(Namespace::Blobs, blob.id).exists() {
            return Err(StorageError::already_exists(Namespace::Blobs, blob.id));
        }
        self.write_item(Namespace::Blobs, blob.id, blob)
    }

    fn delete_blob(&self, owner: &str, id: RecordId) -> StorageResult<()> {
        let _guard = self.guard.write();
        let matched = self
            .read_item::<FileBlob>(Namespace::Blobs, id)?
            .is_some_and(|b| b.is_owned_by(owner));
        if !matched {
            return Err(StorageError::not_found(Namespace::Blobs, id));
        }
        self.remove_item(Namespace::Blobs, id)
    }

    fn get_blob(&self, owner: &str, id: RecordId) -> StorageResult<FileBlob> {
        let _guard = self.guard.read();
        self.read_item::<FileBlob>(Namespace::Blobs, id)?
            .filter(|b| b.is_owned_by(owner))
            .ok_or(StorageError::not_found(Namespace::Blobs, id))
    }
}

/// Writes `bytes` to a sibling temp file, syncs it and renames it over
/// `path`. The temp file is removed again if any step fails.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let result = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_open_creates_layout() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert!(dir.path().join("records").is_dir());
        assert!(dir.path().join("blobs").is_dir());
        assert_eq!(store.path(), dir.path());
    }

    #[test]
    fn file_second_open_is_locked() {
        let dir = tempdir().unwrap();
        let _store = FileStore::open(dir.path()).unwrap();

        let err = FileStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StorageError::Locked));
    }

    #[test]
    fn file_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let record = VaultRecord::new(RecordId::new(), "bob", ContentType::Card, vec![5; 48]);
        {
            let store = FileStore::open(dir.path()).unwrap();
            store.insert(&record).unwrap();
        }

        let store = FileStore::open(dir.path()).unwrap();
        let found = store.get_by_id("bob", record.id, ContentType::Card).unwrap();
        assert_eq!(found, record);
    }

    #[test]
    fn file_update_and_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let mut record = VaultRecord::new(RecordId::new(), "bob", ContentType::Credential, vec![1]);
        store.insert(&record).unwrap();

        record.cipher_text = vec![2, 2];
        store.update(&record).unwrap();
        assert_eq!(
            store
                .get_by_id("bob", record.id, ContentType::Credential)
                .unwrap()
                .cipher_text,
            vec![2, 2]
        );

        assert!(store
            .delete("alice", record.id, ContentType::Credential)
            .unwrap_err()
            .is_not_found());
        store.delete("bob", record.id, ContentType::Credential).unwrap();
        assert!(store
            .get_by_owner("bob", ContentType::Credential)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn file_duplicate_insert_fails() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let record = VaultRecord::new(RecordId::new(), "bob", ContentType::File, vec![1]);
        store.insert(&record).unwrap();

        assert!(matches!(
            store.insert(&record).unwrap_err(),
            StorageError::AlreadyExists { .. }
        ));
    }

    #[test]
    fn file_list_reports_corrupt_document() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        fs::write(
            dir.path().join("records").join(format!("{}.json", RecordId::new())),
            b"{not json",
        )
        .unwrap();

        let err = store.get_by_owner("bob", ContentType::Card).unwrap_err();
        assert!(matches!(err, StorageError::Corrupted(_)));
    }

    #[test]
    fn file_blob_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let id = RecordId::new();
        store.insert_blob(&FileBlob::new(id, "bob", vec![0x74; 32])).unwrap();

        assert_eq!(store.get_blob("bob", id).unwrap().cipher_text, vec![0x74; 32]);
        assert!(store.get_blob("eve", id).unwrap_err().is_not_found());
        store.delete_blob("bob", id).unwrap();
        assert!(store.delete_blob("bob", id).unwrap_err().is_not_found());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("item.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("occupied"), b"x").unwrap();

        assert!(write_atomically(&target, b"{}").is_err());
        assert!(!dir.path().join("item.json.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn atomic_write_replaces_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("item.json");
        write_atomically(&target, b"old").unwrap();
        write_atomically(&target, b"new").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert!(!dir.path().join("item.json.tmp").exists());
    }
}
