//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random vault inputs and operation
//! sequences.

use datakeeper_core::{
    CardPatch, CardSecret, CredentialPatch, CredentialSecret, OwnerKey, UploadFileRequest,
    KEY_SIZES,
};
use proptest::prelude::*;

/// Strategy for generating printable keys of every accepted length.
pub fn key_strategy() -> impl Strategy<Value = OwnerKey> {
    prop::sample::select(KEY_SIZES.to_vec())
        .prop_flat_map(|len| prop::collection::vec(b'!'..=b'~', len))
        .prop_map(|bytes| OwnerKey::from_bytes(bytes))
}

/// Strategy for generating owner names.
pub fn owner_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Strategy for generating field text, including empty and non-ASCII.
pub fn field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-zA-Z0-9 ._@-]{0,24}",
        1 => Just(String::new()),
        1 => "\\PC{0,12}",
    ]
}

fn optional_field() -> impl Strategy<Value = Option<String>> {
    prop::option::of(field_strategy())
}

/// Strategy for generating credentials.
pub fn credential_strategy() -> impl Strategy<Value = CredentialSecret> {
    (field_strategy(), field_strategy(), field_strategy()).prop_map(|(name, login, password)| {
        CredentialSecret {
            name,
            login,
            password,
        }
    })
}

/// Strategy for generating cards.
pub fn card_strategy() -> impl Strategy<Value = CardSecret> {
    (
        field_strategy(),
        "[0-9]{12,19}",
        "[0-9]{3,4}",
        field_strategy(),
        "(0[1-9]|1[0-2])/[0-9]{2}",
    )
        .prop_map(|(key, number, cvv, name, expires)| CardSecret {
            key,
            number,
            cvv,
            name,
            expires,
        })
}

/// Strategy for generating credential patches, empty ones included.
pub fn credential_patch_strategy() -> impl Strategy<Value = CredentialPatch> {
    (optional_field(), optional_field(), optional_field()).prop_map(|(name, login, password)| {
        CredentialPatch {
            name,
            login,
            password,
        }
    })
}

/// Strategy for generating card patches, empty ones included.
pub fn card_patch_strategy() -> impl Strategy<Value = CardPatch> {
    (
        optional_field(),
        optional_field(),
        optional_field(),
        optional_field(),
        optional_field(),
    )
        .prop_map(|(key, number, cvv, name, expires)| CardPatch {
            key,
            number,
            cvv,
            name,
            expires,
        })
}

/// Strategy for generating file contents.
pub fn file_bytes_strategy(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_len)
}

/// Strategy for generating upload requests with a non-empty name.
pub fn upload_strategy(max_len: usize) -> impl Strategy<Value = UploadFileRequest> {
    (
        "[a-z0-9_-]{1,16}",
        prop::sample::select(vec!["txt", "pdf", "png", "bin", ""]),
        file_bytes_strategy(max_len),
    )
        .prop_map(|(stem, format, bytes)| UploadFileRequest {
            name: if format.is_empty() {
                stem
            } else {
                format!("{stem}.{format}")
            },
            format: format.to_string(),
            bytes,
        })
}

/// A single operation against a vault, for model-based tests.
#[derive(Debug, Clone)]
pub enum VaultOperation {
    /// Store a credential.
    CreateCredential(CredentialSecret),
    /// Patch the n-th live credential (modulo the live count).
    UpdateCredential {
        /// Index into the live credentials.
        index: usize,
        /// The patch.
        patch: CredentialPatch,
    },
    /// Delete the n-th live credential.
    DeleteCredential {
        /// Index into the live credentials.
        index: usize,
    },
    /// Store a card.
    CreateCard(CardSecret),
    /// Patch the n-th live card.
    UpdateCard {
        /// Index into the live cards.
        index: usize,
        /// The patch.
        patch: CardPatch,
    },
    /// Delete the n-th live card.
    DeleteCard {
        /// Index into the live cards.
        index: usize,
    },
    /// Upload a file.
    UploadFile(UploadFileRequest),
    /// Delete the n-th live file.
    DeleteFile {
        /// Index into the live files.
        index: usize,
    },
}

/// Strategy for generating vault operations.
pub fn vault_operation_strategy() -> impl Strategy<Value = VaultOperation> {
    prop_oneof![
        3 => credential_strategy().prop_map(VaultOperation::CreateCredential),
        2 => (any::<usize>(), credential_patch_strategy())
            .prop_map(|(index, patch)| VaultOperation::UpdateCredential { index, patch }),
        1 => any::<usize>().prop_map(|index| VaultOperation::DeleteCredential { index }),
        2 => card_strategy().prop_map(VaultOperation::CreateCard),
        1 => (any::<usize>(), card_patch_strategy())
            .prop_map(|(index, patch)| VaultOperation::UpdateCard { index, patch }),
        1 => any::<usize>().prop_map(|index| VaultOperation::DeleteCard { index }),
        2 => upload_strategy(512).prop_map(VaultOperation::UploadFile),
        1 => any::<usize>().prop_map(|index| VaultOperation::DeleteFile { index }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<VaultOperation>> {
    prop::collection::vec(vault_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
