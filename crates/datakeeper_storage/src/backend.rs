//! Store trait definitions.

use crate::error::StorageResult;
use crate::record::{ContentType, FileBlob, RecordId, VaultRecord};

/// A durable keyed store for encrypted vault records.
///
/// Every operation is scoped by owner: a record created by another owner
/// behaves exactly like an absent one.
///
/// # Invariants
///
/// - `insert` never overwrites an existing id
/// - `update` only replaces the ciphertext of a record matching
///   `(owner, id, content_type)`
/// - `get_by_owner` never returns records of another owner or content type
/// - Stores must be `Send + Sync`; each operation is atomic on its own but
///   there is no cross-operation concurrency control (last write wins)
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait RecordStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyExists`](crate::StorageError::AlreadyExists) if the
    /// id is taken, or a backend error.
    fn insert(&self, record: &VaultRecord) -> StorageResult<()>;

    /// Replaces the ciphertext of the record matching
    /// `(record.owner_id, record.id, record.content_type)`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::StorageError::NotFound) if nothing matched.
    fn update(&self, record: &VaultRecord) -> StorageResult<()>;

    /// Deletes the record matching `(owner, id, content_type)`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::StorageError::NotFound) if nothing matched.
    fn delete(&self, owner: &str, id: RecordId, content_type: ContentType) -> StorageResult<()>;

    /// Fetches the record matching `(owner, id, content_type)`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::StorageError::NotFound) if the record is
    /// absent, of another content type, or owned by someone else.
    fn get_by_id(
        &self,
        owner: &str,
        id: RecordId,
        content_type: ContentType,
    ) -> StorageResult<VaultRecord>;

    /// Returns every record of `content_type` owned by `owner`, in no
    /// particular order.
    fn get_by_owner(&self, owner: &str, content_type: ContentType)
        -> StorageResult<Vec<VaultRecord>>;
}

/// A durable keyed store for encrypted file payloads.
///
/// Same shape as [`RecordStore`] but a separate namespace. A blob shares
/// its id with the `File` record describing it.
pub trait BlobStore: Send + Sync {
    /// Inserts a new blob.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyExists`](crate::StorageError::AlreadyExists) if the
    /// id is taken, or a backend error.
    fn insert_blob(&self, blob: &FileBlob) -> StorageResult<()>;

    /// Deletes the blob `id` created by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::StorageError::NotFound) if nothing matched.
    fn delete_blob(&self, owner: &str, id: RecordId) -> StorageResult<()>;

    /// Fetches the blob `id` created by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](crate::StorageError::NotFound) if absent or
    /// owned by someone else.
    fn get_blob(&self, owner: &str, id: RecordId) -> StorageResult<FileBlob>;
}
