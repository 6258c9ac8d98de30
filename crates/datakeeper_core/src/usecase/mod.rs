//! Vault usecases.
//!
//! Every operation follows the same pipeline: resolve the owner from the
//! [`CallContext`], look up the owner's key, then encode + encrypt on the
//! way in or decrypt + decode on the way out. Stores only ever see
//! ciphertext.
//!
//! Credentials and cards share one implementation, [`SecretStore`],
//! parameterised by the payload shape. Files add a second store for the
//! raw bytes, see [`FileService`].

mod account;
mod card;
mod credential;
mod file;

pub use account::{AccountService, IdentityProvider, SignUpOutcome};
pub use card::CardService;
pub use credential::CredentialService;
pub use file::{DownloadedFile, FileEntry, FileService, UploadFileRequest};

use crate::context::{CallContext, OwnerResolver};
use crate::crypto::CbcCipher;
use crate::error::{VaultError, VaultResult};
use crate::keys::KeyRegistry;
use crate::merge::Patch;
use crate::payload::{Payload, PayloadKind};
use datakeeper_storage::{RecordId, RecordStore, VaultRecord};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Collaborators shared by all usecases.
#[derive(Clone)]
pub struct VaultDeps {
    /// Owner keys.
    pub keys: Arc<KeyRegistry>,
    /// Metadata record store.
    pub records: Arc<dyn RecordStore>,
    /// Owner resolution for inbound calls.
    pub resolver: Arc<dyn OwnerResolver>,
}

impl VaultDeps {
    /// Resolves the caller and their key.
    pub(crate) fn session(&self, ctx: &CallContext) -> VaultResult<Session> {
        let owner = self.resolver.resolve(ctx)?;
        let cipher = self.keys.get_key(&owner)?.cipher()?;
        Ok(Session { owner, cipher })
    }
}

/// The owner of a call together with a codec for their key.
pub(crate) struct Session {
    pub(crate) owner: String,
    cipher: CbcCipher,
}

impl Session {
    pub(crate) fn seal<T: PayloadKind>(&self, value: T) -> VaultResult<Vec<u8>> {
        let plain = value.into_payload().encode()?;
        Ok(self.cipher.encrypt(&plain))
    }

    pub(crate) fn open<T: PayloadKind>(&self, record: &VaultRecord) -> VaultResult<T> {
        let plain = self.cipher.decrypt(&record.cipher_text)?;
        let payload = Payload::decode(record.content_type, &plain)
            .map_err(|e| VaultError::corrupt_record(record.id, e.to_string()))?;
        T::from_payload(payload)
            .ok_or_else(|| VaultError::corrupt_record(record.id, "unexpected payload shape"))
    }

    pub(crate) fn encrypt_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        self.cipher.encrypt(bytes)
    }

    pub(crate) fn decrypt_bytes(&self, bytes: &[u8]) -> VaultResult<Vec<u8>> {
        Ok(self.cipher.decrypt(bytes)?)
    }
}

/// A payload shape that can be updated field by field.
pub trait Secret: PayloadKind + Clone + Send + Sync {
    /// The partial update type.
    type Patch: Patch<Self>;
}

/// A decrypted secret with the id of its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<T> {
    /// Record id.
    pub id: RecordId,
    /// Decrypted payload.
    #[serde(flatten)]
    pub secret: T,
}

/// An update request: the record id plus the fields to overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest<P> {
    /// Record to update.
    pub id: RecordId,
    /// Fields to change.
    #[serde(flatten)]
    pub patch: P,
}

impl<P> UpdateRequest<P> {
    /// Creates an update request.
    pub fn new(id: RecordId, patch: P) -> Self {
        Self { id, patch }
    }
}

/// Create / update / delete / list for one secret shape.
pub struct SecretStore<T> {
    deps: VaultDeps,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SecretStore<T> {
    fn clone(&self) -> Self {
        Self {
            deps: self.deps.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Secret> SecretStore<T> {
    /// Creates a store over the shared collaborators.
    #[must_use]
    pub fn new(deps: VaultDeps) -> Self {
        Self {
            deps,
            _marker: PhantomData,
        }
    }

    /// Encrypts and stores a new secret, returning its id.
    pub fn create(&self, ctx: &CallContext, secret: T) -> VaultResult<RecordId> {
        let session = self.deps.session(ctx)?;
        let id = RecordId::new();
        let record = VaultRecord::new(id, &session.owner, T::CONTENT_TYPE, session.seal(secret)?);

        ctx.ensure_active()?;
        self.deps.records.insert(&record)?;

        debug!(owner = %session.owner, %id, content_type = %T::CONTENT_TYPE, "secret created");
        Ok(id)
    }

    /// Overlays the fields present in the request onto the stored secret.
    ///
    /// The stored record must decrypt under the owner's current key; a
    /// record that does not is never overwritten. Concurrent updates of
    /// the same record race and the last write wins.
    pub fn update(&self, ctx: &CallContext, request: UpdateRequest<T::Patch>) -> VaultResult<RecordId> {
        let session = self.deps.session(ctx)?;
        let id = request.id;

        ctx.ensure_active()?;
        let mut record = self
            .deps
            .records
            .get_by_id(&session.owner, id, T::CONTENT_TYPE)?;

        let mut secret: T = session.open(&record)?;
        request.patch.apply_to(&mut secret);
        record.cipher_text = session.seal(secret)?;

        ctx.ensure_active()?;
        self.deps.records.update(&record)?;

        debug!(owner = %session.owner, %id, content_type = %T::CONTENT_TYPE, "secret updated");
        Ok(id)
    }

    /// Deletes a secret.
    pub fn delete(&self, ctx: &CallContext, id: RecordId) -> VaultResult<RecordId> {
        let session = self.deps.session(ctx)?;

        ctx.ensure_active()?;
        self.deps
            .records
            .delete(&session.owner, id, T::CONTENT_TYPE)?;

        debug!(owner = %session.owner, %id, content_type = %T::CONTENT_TYPE, "secret deleted");
        Ok(id)
    }

    /// Decrypts every secret of this shape owned by the caller.
    ///
    /// Order is unspecified. One undecryptable record fails the whole
    /// listing.
    pub fn list(&self, ctx: &CallContext) -> VaultResult<Vec<Item<T>>> {
        let session = self.deps.session(ctx)?;

        ctx.ensure_active()?;
        let records = self
            .deps
            .records
            .get_by_owner(&session.owner, T::CONTENT_TYPE)?;

        let items = records
            .iter()
            .map(|record| {
                Ok(Item {
                    id: record.id,
                    secret: session.open(record)?,
                })
            })
            .collect::<VaultResult<Vec<_>>>()?;

        debug!(owner = %session.owner, count = items.len(), content_type = %T::CONTENT_TYPE, "secrets listed");
        Ok(items)
    }
}

/// Parses a record id supplied by a caller.
///
/// # Errors
///
/// Returns [`VaultError::Validation`] for anything but a hyphenated or
/// simple UUID.
pub fn parse_id(s: &str) -> VaultResult<RecordId> {
    s.parse()
        .map_err(|e| VaultError::validation(format!("invalid record id {s:?}: {e}")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::context::ContextOwnerResolver;
    use crate::keys::OwnerKey;
    use datakeeper_storage::InMemoryStore;

    pub(crate) const BOB_KEY: &str = "0123456789abcdef";

    pub(crate) fn deps_with(store: Arc<InMemoryStore>) -> VaultDeps {
        let keys = Arc::new(KeyRegistry::new());
        keys.set_key("bob", OwnerKey::from(BOB_KEY));
        keys.set_key("alice", OwnerKey::from("fedcba9876543210"));
        VaultDeps {
            keys,
            records: store,
            resolver: Arc::new(ContextOwnerResolver),
        }
    }

    pub(crate) fn deps() -> (VaultDeps, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (deps_with(Arc::clone(&store)), store)
    }

    pub(crate) fn bob() -> CallContext {
        CallContext::for_owner("bob")
    }

    pub(crate) fn alice() -> CallContext {
        CallContext::for_owner("alice")
    }
}
