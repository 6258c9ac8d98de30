//! # Datakeeper Core
//!
//! Encrypted vault engine for Datakeeper.
//!
//! This crate provides:
//! - An AES-CBC codec with a random IV per message
//! - The in-memory per-owner key registry
//! - Typed payloads (credential, card, file metadata) and the field-level
//!   merge used by partial updates
//! - Credential, card and file usecases over the stores from
//!   `datakeeper_storage`
//! - Sign-in / sign-up against an external identity provider
//!
//! ## Data flow
//!
//! ```text
//! CallContext -> OwnerResolver -> KeyRegistry -> encode -> encrypt -> RecordStore
//!                                                                  \-> BlobStore (files)
//! ```
//!
//! Reads run the same pipeline backwards. Keys are never persisted: after a
//! restart every owner has to sign in again with the key they were given.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
pub mod crypto;
mod error;
mod keys;
pub mod merge;
mod payload;
pub mod usecase;
mod vault;

pub use config::VaultConfig;
pub use context::{CallContext, CancellationToken, ContextOwnerResolver, OwnerResolver};
pub use crypto::{CbcCipher, CodecError, CodecResult, KEY_SIZES};
pub use error::{VaultError, VaultResult};
pub use keys::{generate_key, KeyRegistry, OwnerKey};
pub use merge::{CardPatch, CredentialPatch, Patch};
pub use payload::{CardSecret, CredentialSecret, FileMeta, Payload, PayloadKind};
pub use usecase::{
    parse_id, AccountService, CardService, CredentialService, DownloadedFile, FileEntry,
    FileService, IdentityProvider, Item, SignUpOutcome, UpdateRequest, UploadFileRequest,
};
pub use vault::Vault;

pub use datakeeper_storage::{ContentType, RecordId};
