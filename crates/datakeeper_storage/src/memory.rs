//! In-memory store for testing.

use crate::backend::{BlobStore, RecordStore};
use crate::error::{Namespace, StorageError, StorageResult};
use crate::record::{ContentType, FileBlob, RecordId, VaultRecord};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory record and blob store.
///
/// This store keeps everything in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral vaults that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads. Each
/// namespace has its own lock, held only for the map access.
///
/// # Example
///
/// ```rust
/// use datakeeper_storage::{BlobStore, FileBlob, InMemoryStore, RecordId};
///
/// let store = InMemoryStore::new();
/// let id = RecordId::new();
/// store.insert_blob(&FileBlob::new(id, "bob", vec![9; 32])).unwrap();
/// assert_eq!(store.blob_count(), 1);
/// assert!(store.get_blob("eve", id).is_err());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<RecordId, VaultRecord>>,
    blobs: RwLock<HashMap<RecordId, FileBlob>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of records across all owners.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// Returns the number of blobs across all owners.
    #[must_use]
    pub fn blob_count(&self) -> usize {
        self.blobs.read().len()
    }

    /// Returns a copy of a record regardless of owner.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn raw_record(&self, id: RecordId) -> Option<VaultRecord> {
        self.records.read().get(&id).cloned()
    }

    /// Clears both namespaces.
    pub fn clear(&self) {
        self.records.write().clear();
        self.blobs.write().clear();
    }
}

impl RecordStore for InMemoryStore {
    fn insert(&self, record: &VaultRecord) -> StorageResult<()> {
        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(StorageError::already_exists(Namespace::Records, record.id));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    fn update(&self, record: &VaultRecord) -> StorageResult<()> {
        let mut records = self.records.write();
        match records.get_mut(&record.id) {
            Some(stored) if stored.matches(&record.owner_id, record.id, record.content_type) => {
                stored.cipher_text.clone_from(&record.cipher_text);
                Ok(())
            }
            _ => Err(StorageError::not_found(Namespace::Records, record.id)),
        }
    }

    fn delete(&self, owner: &str, id: RecordId, content_type: ContentType) -> StorageResult<()> {
        let mut records = self.records.write();
        match records.get(&id) {
            Some(stored) if stored.matches(owner, id, content_type) => {
                records.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::not_found(Namespace::Records, id)),
        }
    }

    fn get_by_id(
        &self,
        owner: &str,
        id: RecordId,
        content_type: ContentType,
    ) -> StorageResult<VaultRecord> {
        self.records
            .read()
            .get(&id)
            .filter(|stored| stored.matches(owner, id, content_type))
            .cloned()
            .ok_or(StorageError::not_found(Namespace::Records, id))
    }

    fn get_by_owner(
        &self,
        owner: &str,
        content_type: ContentType,
    ) -> StorageResult<Vec<VaultRecord>> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|r| r.content_type == content_type && r.is_owned_by(owner))
            .cloned()
            .collect())
    }
}

impl BlobStore for InMemoryStore {
    fn insert_blob(&self, blob: &FileBlob) -> StorageResult<()> {
        let mut blobs = self.blobs.write();
        if blobs.contains_key(&blob.id) {
            return Err(StorageError::already_exists(Namespace::Blobs, blob.id));
        }
        blobs.insert(blob.id, blob.clone());
        Ok(())
    }

    fn delete_blob(&self, owner: &str, id: RecordId) -> StorageResult<()> {
        let mut blobs = self.blobs.write();
        match blobs.get(&id) {
            Some(stored) if stored.is_owned_by(owner) => {
                blobs.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::not_found(Namespace::Blobs, id)),
        }
    }

    fn get_blob(&self, owner: &str, id: RecordId) -> StorageResult<FileBlob> {
        self.blobs
            .read()
            .get(&id)
            .filter(|stored| stored.is_owned_by(owner))
            .cloned()
            .ok_or(StorageError::not_found(Namespace::Blobs, id))
    }
}
