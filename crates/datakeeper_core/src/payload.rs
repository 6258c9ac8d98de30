//! Plaintext payload shapes stored inside vault records.
//!
//! A record's [`ContentType`] selects how its decrypted bytes are read.
//! Each shape is encoded as a JSON object with the field names used on
//! the wire.

use datakeeper_storage::ContentType;
use serde::{Deserialize, Serialize};

/// A login / password pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSecret {
    /// Label, e.g. the site name.
    pub name: String,
    /// Login.
    pub login: String,
    /// Password.
    pub password: String,
}

/// A payment card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSecret {
    /// Owner-chosen label.
    pub key: String,
    /// Card number.
    pub number: String,
    /// Security code.
    pub cvv: String,
    /// Holder name.
    pub name: String,
    /// Expiry, as entered.
    pub expires: String,
}

/// Metadata of an uploaded file. The bytes live in the blob store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// File name.
    pub name: String,
    /// Format / extension.
    pub format: String,
    /// Plaintext size in bytes.
    pub size: u64,
}

/// A decoded record payload, tagged by content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A [`ContentType::Credential`] payload.
    Credential(CredentialSecret),
    /// A [`ContentType::Card`] payload.
    Card(CardSecret),
    /// A [`ContentType::File`] payload.
    FileMeta(FileMeta),
}

impl Payload {
    /// Returns the content type tag of this payload.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Credential(_) => ContentType::Credential,
            Self::Card(_) => ContentType::Card,
            Self::FileMeta(_) => ContentType::File,
        }
    }

    /// Encodes the payload body. The tag is not part of the encoding; it
    /// is stored next to the ciphertext.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            Self::Credential(p) => serde_json::to_vec(p),
            Self::Card(p) => serde_json::to_vec(p),
            Self::FileMeta(p) => serde_json::to_vec(p),
        }
    }

    /// Decodes a payload body of the given content type.
    pub fn decode(content_type: ContentType, bytes: &[u8]) -> serde_json::Result<Self> {
        Ok(match content_type {
            ContentType::Credential => Self::Credential(serde_json::from_slice(bytes)?),
            ContentType::Card => Self::Card(serde_json::from_slice(bytes)?),
            ContentType::File => Self::FileMeta(serde_json::from_slice(bytes)?),
        })
    }
}

/// A payload shape bound to one content type.
pub trait PayloadKind: Sized {
    /// The content type records of this shape carry.
    const CONTENT_TYPE: ContentType;

    /// Wraps the value in the tagged union.
    fn into_payload(self) -> Payload;

    /// Unwraps the tagged union, or `None` for another shape.
    fn from_payload(payload: Payload) -> Option<Self>;
}

macro_rules! payload_kind {
    ($ty:ty, $variant:ident, $content_type:expr) => {
        impl PayloadKind for $ty {
            const CONTENT_TYPE: ContentType = $content_type;

            fn into_payload(self) -> Payload {
                Payload::$variant(self)
            }

            fn from_payload(payload: Payload) -> Option<Self> {
                match payload {
                    Payload::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

payload_kind!(CredentialSecret, Credential, ContentType::Credential);
payload_kind!(CardSecret, Card, ContentType::Card);
payload_kind!(FileMeta, FileMeta, ContentType::File);
