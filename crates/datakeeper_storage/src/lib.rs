//! # Datakeeper Storage
//!
//! Durable keyed stores for Datakeeper vault records and file blobs.
//!
//! Stores are **opaque ciphertext stores**: they never see plaintext and
//! never hold keys. They only enforce ownership scoping, i.e. every read,
//! update and delete is filtered by the owner that created the item.
//!
//! ## Namespaces
//!
//! - [`RecordStore`] holds [`VaultRecord`]s (owner, id, content type,
//!   ciphertext)
//! - [`BlobStore`] holds [`FileBlob`]s, the raw encrypted bytes of uploaded
//!   files, keyed by the id of their metadata record
//!
//! The two namespaces are paired by convention only. Nothing in this crate
//! keeps them consistent.
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral vaults
//! - [`FileStore`] - One JSON document per item inside a vault directory
//!
//! ## Example
//!
//! ```rust
//! use datakeeper_storage::{ContentType, InMemoryStore, RecordId, RecordStore, VaultRecord};
//!
//! let store = InMemoryStore::new();
//! let record = VaultRecord::new(RecordId::new(), "bob", ContentType::Credential, vec![1, 2, 3]);
//! store.insert(&record).unwrap();
//!
//! let found = store.get_by_id("bob", record.id, ContentType::Credential).unwrap();
//! assert_eq!(found.cipher_text, vec![1, 2, 3]);
//! assert!(store.get_by_id("alice", record.id, ContentType::Credential).is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod record;

pub use backend::{BlobStore, RecordStore};
pub use error::{Namespace, StorageError, StorageResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use record::{ContentType, FileBlob, ParseContentTypeError, RecordId, VaultRecord};
