//! Failure injection for store implementations.
//!
//! [`FailingStore`] wraps an [`InMemoryStore`] and makes chosen operations
//! fail with [`StorageError::Unavailable`]. Use it to drive the file
//! saga's compensation and partial failure paths.

use datakeeper_storage::{
    BlobStore, ContentType, FileBlob, InMemoryStore, RecordId, RecordStore, StorageError,
    StorageResult, VaultRecord,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A store operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// [`RecordStore::insert`].
    RecordInsert,
    /// [`RecordStore::update`].
    RecordUpdate,
    /// [`RecordStore::delete`].
    RecordDelete,
    /// [`RecordStore::get_by_id`] and [`RecordStore::get_by_owner`].
    RecordRead,
    /// [`BlobStore::insert_blob`].
    BlobInsert,
    /// [`BlobStore::delete_blob`].
    BlobDelete,
    /// [`BlobStore::get_blob`].
    BlobRead,
}

/// An in-memory store that fails on demand.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: InMemoryStore,
    faults: Mutex<HashSet<Fault>>,
    injected: AtomicUsize,
}

impl FailingStore {
    /// Creates a store with no faults armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `faults` armed.
    pub fn failing(faults: &[Fault]) -> Self {
        let store = Self::new();
        for fault in faults {
            store.arm(*fault);
        }
        store
    }

    /// Makes every future `fault` operation fail.
    pub fn arm(&self, fault: Fault) {
        self.faults.lock().insert(fault);
    }

    /// Lets `fault` operations succeed again.
    pub fn disarm(&self, fault: Fault) {
        self.faults.lock().remove(&fault);
    }

    /// Disarms every fault.
    pub fn heal(&self) {
        self.faults.lock().clear();
    }

    /// Returns how many operations were failed so far.
    pub fn injected(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn check(&self, fault: Fault) -> StorageResult<()> {
        if self.faults.lock().contains(&fault) {
            self.injected.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Unavailable(format!("injected {fault:?}")));
        }
        Ok(())
    }
}

impl RecordStore for FailingStore {
    fn insert(&self, record: &VaultRecord) -> StorageResult<()> {
        self.check(Fault::RecordInsert)?;
        self.inner.insert(record)
    }

    fn update(&self, record: &VaultRecord) -> StorageResult<()> {
        self.check(Fault::RecordUpdate)?;
        self.inner.update(record)
    }

    fn delete(&self, owner: &str, id: RecordId, content_type: ContentType) -> StorageResult<()> {
        self.check(Fault::RecordDelete)?;
        self.inner.delete(owner, id, content_type)
    }

    fn get_by_id(
        &self,
        owner: &str,
        id: RecordId,
        content_type: ContentType,
    ) -> StorageResult<VaultRecord> {
        self.check(Fault::RecordRead)?;
        self.inner.get_by_id(owner, id, content_type)
    }

    fn get_by_owner(
        &self,
        owner: &str,
        content_type: ContentType,
    ) -> StorageResult<Vec<VaultRecord>> {
        self.check(Fault::RecordRead)?;
        self.inner.get_by_owner(owner, content_type)
    }
}

impl BlobStore for FailingStore {
    fn insert_blob(&self, blob: &FileBlob) -> StorageResult<()> {
        self.check(Fault::BlobInsert)?;
        self.inner.insert_blob(blob)
    }

    fn delete_blob(&self, owner: &str, id: RecordId) -> StorageResult<()> {
        self.check(Fault::BlobDelete)?;
        self.inner.delete_blob(owner, id)
    }

    fn get_blob(&self, owner: &str, id: RecordId) -> StorageResult<FileBlob> {
        self.check(Fault::BlobRead)?;
        self.inner.get_blob(owner, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> VaultRecord {
        VaultRecord::new(RecordId::new(), "bob", ContentType::Credential, vec![1])
    }

    #[test]
    fn passes_through_when_disarmed() {
        let store = FailingStore::new();
        let record = record();
        store.insert(&record).unwrap();
        assert_eq!(store.inner().record_count(), 1);
        assert_eq!(store.injected(), 0);
    }

    #[test]
    fn armed_fault_fails_without_touching_inner() {
        let store = FailingStore::failing(&[Fault::RecordInsert]);
        let err = store.insert(&record()).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.inner().record_count(), 0);
        assert_eq!(store.injected(), 1);
    }

    #[test]
    fn heal_restores_operations() {
        let store = FailingStore::failing(&[Fault::BlobInsert, Fault::BlobRead]);
        let blob = FileBlob::new(RecordId::new(), "bob", vec![9]);
        assert!(store.insert_blob(&blob).is_err());

        store.disarm(Fault::BlobInsert);
        store.insert_blob(&blob).unwrap();
        assert!(store.get_blob("bob", blob.id).is_err());

        store.heal();
        assert_eq!(store.get_blob("bob", blob.id).unwrap().cipher_text, vec![9]);
    }
}
