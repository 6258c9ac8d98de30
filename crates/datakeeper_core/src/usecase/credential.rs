//! Login / password secrets.

use super::{Secret, SecretStore};
use crate::merge::CredentialPatch;
use crate::payload::CredentialSecret;

impl Secret for CredentialSecret {
    type Patch = CredentialPatch;
}

/// Credential usecase, stored under `LOG_PASS`.
pub type CredentialService = SecretStore<CredentialSecret>;
