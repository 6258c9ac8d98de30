//! File usecase.
//!
//! A file is split across both stores under one id: a small encrypted
//! [`FileMeta`] record in the record store and the encrypted bytes in the
//! blob store. There is no transaction spanning the two, so every write
//! path is a short saga:
//!
//! - upload writes the metadata first, then the blob; if the blob write
//!   fails the metadata is deleted again
//! - delete removes the blob first, then the metadata
//!
//! Cancellation is only honoured before the first write. Whenever a step
//! leaves exactly one half behind the caller gets
//! [`VaultError::PartialFailure`].

use super::{Session, VaultDeps};
use crate::config::VaultConfig;
use crate::context::CallContext;
use crate::error::{VaultError, VaultResult};
use crate::payload::FileMeta;
use datakeeper_storage::{BlobStore, ContentType, FileBlob, RecordId, StorageError, VaultRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFileRequest {
    /// File name.
    pub name: String,
    /// Format / extension.
    pub format: String,
    /// File contents.
    #[serde(with = "hex::serde")]
    pub bytes: Vec<u8>,
}

/// A listed file. Listing never touches the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Record id.
    pub id: RecordId,
    /// File name.
    pub name: String,
    /// Format / extension.
    pub format: String,
    /// Size in bytes.
    pub size: u64,
}

/// A downloaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    /// File name.
    pub name: String,
    /// Format / extension.
    pub format: String,
    /// File contents.
    #[serde(with = "hex::serde")]
    pub bytes: Vec<u8>,
}

/// Upload / delete / list / download of files.
#[derive(Clone)]
pub struct FileService {
    deps: VaultDeps,
    blobs: Arc<dyn BlobStore>,
    max_file_size: u64,
}

impl FileService {
    /// Creates the file usecase.
    #[must_use]
    pub fn new(deps: VaultDeps, blobs: Arc<dyn BlobStore>, config: &VaultConfig) -> Self {
        Self {
            deps,
            blobs,
            max_file_size: config.max_file_size,
        }
    }

    /// Stores a file and returns its id.
    ///
    /// Once the metadata is written the blob write always runs, even if
    /// the caller cancelled in between.
    pub fn upload(&self, ctx: &CallContext, request: UploadFileRequest) -> VaultResult<RecordId> {
        if request.name.is_empty() {
            return Err(VaultError::validation("file name must not be empty"));
        }
        let size = request.bytes.len() as u64;
        if size > self.max_file_size {
            return Err(VaultError::validation(format!(
                "file is {size} bytes, limit is {}",
                self.max_file_size
            )));
        }

        let session = self.deps.session(ctx)?;
        let id = RecordId::new();
        let meta = FileMeta {
            name: request.name,
            format: request.format,
            size,
        };
        let record = VaultRecord::new(id, &session.owner, ContentType::File, session.seal(meta)?);
        let blob = FileBlob::new(id, &session.owner, session.encrypt_bytes(&request.bytes));

        ctx.ensure_active()?;
        self.deps.records.insert(&record)?;

        if let Err(err) = self.blobs.insert_blob(&blob) {
            return Err(self.compensate_upload(&session, id, err));
        }

        debug!(owner = %session.owner, %id, size, "file uploaded");
        Ok(id)
    }

    fn compensate_upload(&self, session: &Session, id: RecordId, cause: StorageError) -> VaultError {
        warn!(owner = %session.owner, %id, error = %cause, "blob write failed, removing metadata");
        match self
            .deps
            .records
            .delete(&session.owner, id, ContentType::File)
        {
            Ok(()) => cause.into(),
            Err(err) => {
                error!(owner = %session.owner, %id, error = %err, "metadata left without blob");
                VaultError::partial_failure(
                    id,
                    format!("blob write failed ({cause}) and metadata removal failed ({err})"),
                )
            }
        }
    }

    /// Deletes both halves of a file.
    ///
    /// A missing blob is tolerated so that metadata left behind by an
    /// earlier failure can still be removed. Once the blob is gone the
    /// metadata delete always runs, even if the caller cancelled. If the
    /// metadata is already gone too, another delete got there first and
    /// the file counts as deleted.
    pub fn delete(&self, ctx: &CallContext, id: RecordId) -> VaultResult<RecordId> {
        let session = self.deps.session(ctx)?;

        ctx.ensure_active()?;
        let blob_deleted = match self.blobs.delete_blob(&session.owner, id) {
            Ok(()) => true,
            Err(err) if err.is_not_found() => {
                warn!(owner = %session.owner, %id, "no blob for file, removing metadata only");
                false
            }
            Err(err) => return Err(err.into()),
        };

        match self
            .deps
            .records
            .delete(&session.owner, id, ContentType::File)
        {
            Ok(()) => {
                debug!(owner = %session.owner, %id, "file deleted");
                Ok(id)
            }
            Err(err) if blob_deleted && err.is_not_found() => {
                debug!(owner = %session.owner, %id, "metadata already removed");
                Ok(id)
            }
            Err(err) if blob_deleted => {
                error!(owner = %session.owner, %id, error = %err, "blob deleted but metadata remains");
                Err(VaultError::partial_failure(
                    id,
                    format!("blob deleted, metadata delete failed: {err}"),
                ))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the caller's files from their metadata.
    pub fn list(&self, ctx: &CallContext) -> VaultResult<Vec<FileEntry>> {
        let session = self.deps.session(ctx)?;

        ctx.ensure_active()?;
        let records = self
            .deps
            .records
            .get_by_owner(&session.owner, ContentType::File)?;

        let entries = records
            .iter()
            .map(|record| {
                let meta: FileMeta = session.open(record)?;
                Ok(FileEntry {
                    id: record.id,
                    name: meta.name,
                    format: meta.format,
                    size: meta.size,
                })
            })
            .collect::<VaultResult<Vec<_>>>()?;

        debug!(owner = %session.owner, count = entries.len(), "files listed");
        Ok(entries)
    }

    /// Returns a file's metadata and contents.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] if there is no metadata record,
    /// [`VaultError::CorruptRecord`] if the blob is missing or its size
    /// disagrees with the metadata.
    pub fn download(&self, ctx: &CallContext, id: RecordId) -> VaultResult<DownloadedFile> {
        let session = self.deps.session(ctx)?;

        ctx.ensure_active()?;
        let record = self
            .deps
            .records
            .get_by_id(&session.owner, id, ContentType::File)?;
        let meta: FileMeta = session.open(&record)?;

        ctx.ensure_active()?;
        let blob = match self.blobs.get_blob(&session.owner, id) {
            Ok(blob) => blob,
            Err(err) if err.is_not_found() => {
                warn!(owner = %session.owner, %id, "file metadata without blob");
                return Err(VaultError::corrupt_record(id, "file contents are missing"));
            }
            Err(err) => return Err(err.into()),
        };

        let bytes = session.decrypt_bytes(&blob.cipher_text)?;
        if bytes.len() as u64 != meta.size {
            return Err(VaultError::corrupt_record(
                id,
                format!("file is {} bytes, metadata says {}", bytes.len(), meta.size),
            ));
        }

        debug!(owner = %session.owner, %id, size = meta.size, "file downloaded");
        Ok(DownloadedFile {
            name: meta.name,
            format: meta.format,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::context::CancellationToken;
    use crate::keys::OwnerKey;
    use datakeeper_storage::{InMemoryStore, RecordStore, StorageResult};

    fn service() -> (FileService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let deps = deps_with(Arc::clone(&store));
        let service = FileService::new(deps, store.clone(), &VaultConfig::default());
        (service, store)
    }

    /// Store that simulates a concurrent caller between saga steps.
    struct RacingStore {
        inner: Arc<InMemoryStore>,
        cancel_on_insert: Option<CancellationToken>,
        remove_metadata_with_blob: bool,
    }

    impl RecordStore for RacingStore {
        fn insert(&self, record: &VaultRecord) -> StorageResult<()> {
            self.inner.insert(record)?;
            if let Some(token) = &self.cancel_on_insert {
                token.cancel();
            }
            Ok(())
        }

        fn update(&self, record: &VaultRecord) -> StorageResult<()> {
            self.inner.update(record)
        }

        fn delete(&self, owner: &str, id: RecordId, content_type: ContentType) -> StorageResult<()> {
            self.inner.delete(owner, id, content_type)
        }

        fn get_by_id(
            &self,
            owner: &str,
            id: RecordId,
            content_type: ContentType,
        ) -> StorageResult<VaultRecord> {
            self.inner.get_by_id(owner, id, content_type)
        }

        fn get_by_owner(
            &self,
            owner: &str,
            content_type: ContentType,
        ) -> StorageResult<Vec<VaultRecord>> {
            self.inner.get_by_owner(owner, content_type)
        }
    }

    impl BlobStore for RacingStore {
        fn insert_blob(&self, blob: &FileBlob) -> StorageResult<()> {
            self.inner.insert_blob(blob)
        }

        fn delete_blob(&self, owner: &str, id: RecordId) -> StorageResult<()> {
            self.inner.delete_blob(owner, id)?;
            if self.remove_metadata_with_blob {
                self.inner.delete(owner, id, ContentType::File)?;
            }
            Ok(())
        }

        fn get_blob(&self, owner: &str, id: RecordId) -> StorageResult<FileBlob> {
            self.inner.get_blob(owner, id)
        }
    }

    fn deps_over(records: Arc<RacingStore>) -> VaultDeps {
        VaultDeps {
            records,
            ..deps_with(Arc::new(InMemoryStore::new()))
        }
    }

    fn test_txt() -> UploadFileRequest {
        UploadFileRequest {
            name: "a.txt".into(),
            format: "txt".into(),
            bytes: vec![0x74, 0x65, 0x73, 0x74],
        }
    }

    #[test]
    fn upload_then_download() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.blob_count(), 1);

        let file = service.download(&bob(), id).unwrap();
        assert_eq!(
            file,
            DownloadedFile {
                name: "a.txt".into(),
                format: "txt".into(),
                bytes: vec![0x74, 0x65, 0x73, 0x74],
            }
        );
    }

    #[test]
    fn empty_file_round_trips() {
        let (service, _) = service();
        let request = UploadFileRequest {
            bytes: Vec::new(),
            ..test_txt()
        };
        let id = service.upload(&bob(), request).unwrap();
        assert!(service.download(&bob(), id).unwrap().bytes.is_empty());
    }

    #[test]
    fn list_reports_metadata() {
        let (service, _) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();

        let entries = service.list(&bob()).unwrap();
        assert_eq!(
            entries,
            vec![FileEntry {
                id,
                name: "a.txt".into(),
                format: "txt".into(),
                size: 4,
            }]
        );
        assert!(service.list(&alice()).unwrap().is_empty());
    }

    #[test]
    fn upload_validation() {
        let store = Arc::new(InMemoryStore::new());
        let service = FileService::new(
            deps_with(Arc::clone(&store)),
            store.clone(),
            &VaultConfig::new().max_file_size(3),
        );

        let unnamed = UploadFileRequest {
            name: String::new(),
            ..test_txt()
        };
        assert!(matches!(service.upload(&bob(), unnamed), Err(VaultError::Validation(_))));
        assert!(matches!(service.upload(&bob(), test_txt()), Err(VaultError::Validation(_))));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn delete_removes_both_halves() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();

        assert_eq!(service.delete(&bob(), id).unwrap(), id);
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.blob_count(), 0);
        assert!(matches!(service.download(&bob(), id), Err(VaultError::NotFound { .. })));
        assert!(matches!(service.delete(&bob(), id), Err(VaultError::NotFound { .. })));
    }

    #[test]
    fn delete_repairs_metadata_without_blob() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();
        store.delete_blob("bob", id).unwrap();

        assert_eq!(service.delete(&bob(), id).unwrap(), id);
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn delete_of_blob_without_metadata_succeeds() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();
        store.delete("bob", id, ContentType::File).unwrap();

        assert_eq!(service.delete(&bob(), id).unwrap(), id);
        assert_eq!(store.blob_count(), 0);
    }

    #[test]
    fn delete_racing_another_delete_succeeds() {
        let store = Arc::new(InMemoryStore::new());
        let racing = Arc::new(RacingStore {
            inner: Arc::clone(&store),
            cancel_on_insert: None,
            remove_metadata_with_blob: true,
        });
        let service = FileService::new(
            deps_over(Arc::clone(&racing)),
            racing,
            &VaultConfig::default(),
        );
        let id = service.upload(&bob(), test_txt()).unwrap();

        assert_eq!(service.delete(&bob(), id).unwrap(), id);
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.blob_count(), 0);
    }

    #[test]
    fn download_without_blob_is_corrupt() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();
        store.delete_blob("bob", id).unwrap();

        assert!(matches!(
            service.download(&bob(), id),
            Err(VaultError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn download_size_mismatch_is_corrupt() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();

        let cipher = OwnerKey::from(BOB_KEY).cipher().unwrap();
        store.delete_blob("bob", id).unwrap();
        store
            .insert_blob(&FileBlob::new(id, "bob", cipher.encrypt(b"longer")))
            .unwrap();

        assert!(matches!(
            service.download(&bob(), id),
            Err(VaultError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn other_owner_cannot_touch_file() {
        let (service, store) = service();
        let id = service.upload(&bob(), test_txt()).unwrap();

        assert!(matches!(service.download(&alice(), id), Err(VaultError::NotFound { .. })));
        assert!(service.delete(&alice(), id).is_err());
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.blob_count(), 1);
    }

    #[test]
    fn cancelled_upload_writes_nothing() {
        let (service, store) = service();
        let token = CancellationToken::new();
        token.cancel();

        let ctx = bob().with_cancellation(token);
        assert!(matches!(service.upload(&ctx, test_txt()), Err(VaultError::Cancelled)));
        assert_eq!(store.record_count(), 0);
        assert_eq!(store.blob_count(), 0);
    }

    #[test]
    fn cancel_after_metadata_still_writes_blob() {
        let store = Arc::new(InMemoryStore::new());
        let token = CancellationToken::new();
        let racing = Arc::new(RacingStore {
            inner: Arc::clone(&store),
            cancel_on_insert: Some(token.clone()),
            remove_metadata_with_blob: false,
        });
        let service = FileService::new(
            deps_over(Arc::clone(&racing)),
            racing,
            &VaultConfig::default(),
        );

        let ctx = bob().with_cancellation(token.clone());
        let id = service.upload(&ctx, test_txt()).unwrap();
        assert!(token.is_cancelled());
        assert_eq!(store.record_count(), 1);
        assert_eq!(store.blob_count(), 1);
        assert_eq!(service.download(&bob(), id).unwrap().bytes, test_txt().bytes);
    }

    #[test]
    fn request_bytes_serialize_as_hex() {
        let json = serde_json::to_value(test_txt()).unwrap();
        assert_eq!(json["bytes"], "74657374");
    }
}
