//! Record identifiers and stored item types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;
use uuid::Uuid;

/// Unique identifier shared by a vault record and its file blob.
///
/// Record IDs are v4 UUIDs that are:
/// - Globally unique across owners
/// - Immutable once assigned
/// - Never reused
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a record ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RecordId> for Uuid {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// Tag distinguishing the payload shape inside a record's ciphertext.
///
/// Immutable after a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Login / password pair.
    #[serde(rename = "LOG_PASS")]
    Credential,
    /// Payment card.
    #[serde(rename = "CARD")]
    Card,
    /// Metadata of an uploaded file.
    #[serde(rename = "FILE")]
    File,
}

impl ContentType {
    /// All content types.
    pub const ALL: [ContentType; 3] = [Self::Credential, Self::Card, Self::File];

    /// Returns the stored tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credential => "LOG_PASS",
            Self::Card => "CARD",
            Self::File => "FILE",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown content type tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type: {0}")]
pub struct ParseContentTypeError(pub String);

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| ParseContentTypeError(s.to_string()))
    }
}

/// An encrypted, owner-scoped vault record.
///
/// `cipher_text` is only meaningful when decrypted with the owner's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRecord {
    /// Record id.
    pub id: RecordId,
    /// Owner the record belongs to.
    pub owner_id: String,
    /// Payload shape inside the ciphertext.
    pub content_type: ContentType,
    /// Encrypted payload.
    #[serde(with = "hex::serde")]
    pub cipher_text: Vec<u8>,
    /// Creation time.
    pub created_at: SystemTime,
    /// Identity that created the record.
    pub created_by: String,
}

impl VaultRecord {
    /// Creates a record owned and created by `owner`, timestamped now.
    pub fn new(
        id: RecordId,
        owner: impl Into<String>,
        content_type: ContentType,
        cipher_text: Vec<u8>,
    ) -> Self {
        let owner = owner.into();
        Self {
            id,
            created_by: owner.clone(),
            owner_id: owner,
            content_type,
            cipher_text,
            created_at: SystemTime::now(),
        }
    }

    /// Returns true if `owner` both owns and created this record.
    #[must_use]
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner_id == owner && self.created_by == owner
    }

    /// Returns true if the record matches the `(owner, id, content_type)` scope.
    #[must_use]
    pub fn matches(&self, owner: &str, id: RecordId, content_type: ContentType) -> bool {
        self.id == id && self.content_type == content_type && self.is_owned_by(owner)
    }
}

/// The encrypted bytes of an uploaded file.
///
/// Shares its id with the `File` record holding the file's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBlob {
    /// Id of the paired metadata record.
    pub id: RecordId,
    /// Encrypted file contents.
    #[serde(with = "hex::serde")]
    pub cipher_text: Vec<u8>,
    /// Creation time.
    pub created_at: SystemTime,
    /// Owner that uploaded the file.
    pub created_by: String,
}

impl FileBlob {
    /// Creates a blob for `owner`, timestamped now.
    pub fn new(id: RecordId, owner: impl Into<String>, cipher_text: Vec<u8>) -> Self {
        Self {
            id,
            cipher_text,
            created_at: SystemTime::now(),
            created_by: owner.into(),
        }
    }

    /// Returns true if `owner` created this blob.
    #[must_use]
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.created_by == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_unique() {
        assert_ne!(RecordId::new(), RecordId::new());
    }

    #[test]
    fn display_parses_back() {
        let id = RecordId::new();
        let parsed: RecordId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn malformed_id_is_rejected() {
        assert!("not-a-uuid".parse::<RecordId>().is_err());
    }

    #[test]
    fn content_type_tags() {
        assert_eq!(ContentType::Credential.as_str(), "LOG_PASS");
        assert_eq!("CARD".parse::<ContentType>().unwrap(), ContentType::Card);
        assert!("card".parse::<ContentType>().is_err());
        assert_eq!(
            serde_json::to_string(&ContentType::File).unwrap(),
            "\"FILE\""
        );
    }

    #[test]
    fn record_scope_checks_owner_and_type() {
        let record = VaultRecord::new(RecordId::new(), "bob", ContentType::Card, vec![1]);
        assert!(record.matches("bob", record.id, ContentType::Card));
        assert!(!record.matches("alice", record.id, ContentType::Card));
        assert!(!record.matches("bob", record.id, ContentType::Credential));
        assert!(!record.matches("bob", RecordId::new(), ContentType::Card));
    }

    #[test]
    fn record_json_uses_hex_ciphertext() {
        let record = VaultRecord::new(RecordId::new(), "bob", ContentType::File, vec![0xde, 0xad]);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"dead\""));
        let back: VaultRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn blob_json_rejects_malformed_hex() {
        let blob = FileBlob::new(RecordId::new(), "bob", vec![0xbe, 0xef]);
        let json = serde_json::to_string(&blob).unwrap();
        assert!(json.contains("\"beef\""));

        let broken = json.replace("\"beef\"", "\"bexf\"");
        assert!(serde_json::from_str::<FileBlob>(&broken).is_err());
    }
}
