//! Request dispatch.

use crate::auth::TokenValidator;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use datakeeper_core::usecase::Item;
use datakeeper_core::{
    AccountService, CallContext, CancellationToken, CardPatch, CardSecret, CredentialPatch,
    CredentialSecret, DownloadedFile, FileEntry, RecordId, SignUpOutcome, UpdateRequest,
    UploadFileRequest, Vault,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// A request to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "body", rename_all = "snake_case")]
pub enum VaultRequest {
    /// Authenticate and register the owner's key.
    SignIn {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
        /// The owner's key.
        key: String,
    },
    /// Create an account and generate its key.
    SignUp {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Store a credential.
    CreateCredential(CredentialSecret),
    /// Merge fields into a credential.
    UpdateCredential(UpdateRequest<CredentialPatch>),
    /// Delete a credential.
    DeleteCredential {
        /// Record id.
        id: RecordId,
    },
    /// List credentials.
    ListCredentials,
    /// Store a card.
    CreateCard(CardSecret),
    /// Merge fields into a card.
    UpdateCard(UpdateRequest<CardPatch>),
    /// Delete a card.
    DeleteCard {
        /// Record id.
        id: RecordId,
    },
    /// List cards.
    ListCards,
    /// Upload a file.
    UploadFile(UploadFileRequest),
    /// Delete a file.
    DeleteFile {
        /// Record id.
        id: RecordId,
    },
    /// List files.
    ListFiles,
    /// Download a file.
    DownloadFile {
        /// Record id.
        id: RecordId,
    },
}

impl VaultRequest {
    /// Returns the operation name, as used on the wire.
    pub fn op(&self) -> &'static str {
        match self {
            Self::SignIn { .. } => "sign_in",
            Self::SignUp { .. } => "sign_up",
            Self::CreateCredential(_) => "create_credential",
            Self::UpdateCredential(_) => "update_credential",
            Self::DeleteCredential { .. } => "delete_credential",
            Self::ListCredentials => "list_credentials",
            Self::CreateCard(_) => "create_card",
            Self::UpdateCard(_) => "update_card",
            Self::DeleteCard { .. } => "delete_card",
            Self::ListCards => "list_cards",
            Self::UploadFile(_) => "upload_file",
            Self::DeleteFile { .. } => "delete_file",
            Self::ListFiles => "list_files",
            Self::DownloadFile { .. } => "download_file",
        }
    }
}

/// A response from the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum VaultResponse {
    /// Session token from a sign-in.
    Token {
        /// Bearer token.
        token: String,
    },
    /// Token and generated key from a sign-up.
    SignedUp(SignUpOutcome),
    /// Id of the created, updated or deleted record.
    Id {
        /// Record id.
        id: RecordId,
    },
    /// Listed credentials.
    Credentials(Vec<Item<CredentialSecret>>),
    /// Listed cards.
    Cards(Vec<Item<CardSecret>>),
    /// Listed files.
    Files(Vec<FileEntry>),
    /// A downloaded file.
    File(DownloadedFile),
    /// A failed request.
    Error {
        /// HTTP style status code.
        status: u16,
        /// Error message.
        message: String,
    },
}

impl VaultResponse {
    /// Builds the response for a failed request.
    pub fn error(err: &ServerError) -> Self {
        Self::Error {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// The vault.
    pub vault: Vault,
    /// Token issuing and checking.
    pub tokens: Arc<TokenValidator>,
    /// Sign-in / sign-up.
    pub accounts: AccountService,
}

/// Handler for vault requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Handles a request carrying an optional bearer token.
    pub fn handle(&self, token: Option<&str>, request: VaultRequest) -> ServerResult<VaultResponse> {
        self.handle_cancellable(token, request, CancellationToken::new())
    }

    /// Handles a request the caller may abandon through `cancellation`.
    pub fn handle_cancellable(
        &self,
        token: Option<&str>,
        request: VaultRequest,
        cancellation: CancellationToken,
    ) -> ServerResult<VaultResponse> {
        let op = request.op();
        let result = self.dispatch(token, request, cancellation);
        match &result {
            Ok(_) => debug!(op, "request handled"),
            Err(err) if err.is_server_error() => warn!(op, error = %err, "request failed"),
            Err(err) => debug!(op, error = %err, "request rejected"),
        }
        result
    }

    fn dispatch(
        &self,
        token: Option<&str>,
        request: VaultRequest,
        cancellation: CancellationToken,
    ) -> ServerResult<VaultResponse> {
        let vault = &self.context.vault;
        match request {
            VaultRequest::SignIn {
                email,
                password,
                key,
            } => {
                let token = self.context.accounts.sign_in(&email, &password, &key)?;
                Ok(VaultResponse::Token { token })
            }
            VaultRequest::SignUp { email, password } => {
                let outcome = self.context.accounts.sign_up(&email, &password)?;
                Ok(VaultResponse::SignedUp(outcome))
            }
            request => {
                let ctx = self.authenticate(token, cancellation)?;
                match request {
                    VaultRequest::CreateCredential(secret) => {
                        id(vault.credentials().create(&ctx, secret)?)
                    }
                    VaultRequest::UpdateCredential(update) => {
                        id(vault.credentials().update(&ctx, update)?)
                    }
                    VaultRequest::DeleteCredential { id: target } => {
                        id(vault.credentials().delete(&ctx, target)?)
                    }
                    VaultRequest::ListCredentials => {
                        Ok(VaultResponse::Credentials(vault.credentials().list(&ctx)?))
                    }
                    VaultRequest::CreateCard(secret) => id(vault.cards().create(&ctx, secret)?),
                    VaultRequest::UpdateCard(update) => id(vault.cards().update(&ctx, update)?),
                    VaultRequest::DeleteCard { id: target } => {
                        id(vault.cards().delete(&ctx, target)?)
                    }
                    VaultRequest::ListCards => Ok(VaultResponse::Cards(vault.cards().list(&ctx)?)),
                    VaultRequest::UploadFile(upload) => {
                        let size = upload.bytes.len() as u64;
                        let limit = self.context.config.max_upload_size;
                        if size > limit {
                            return Err(ServerError::PayloadTooLarge { size, limit });
                        }
                        id(vault.files().upload(&ctx, upload)?)
                    }
                    VaultRequest::DeleteFile { id: target } => {
                        id(vault.files().delete(&ctx, target)?)
                    }
                    VaultRequest::ListFiles => Ok(VaultResponse::Files(vault.files().list(&ctx)?)),
                    VaultRequest::DownloadFile { id: target } => {
                        Ok(VaultResponse::File(vault.files().download(&ctx, target)?))
                    }
                    VaultRequest::SignIn { .. } | VaultRequest::SignUp { .. } => Err(
                        ServerError::Internal("account request reached owner dispatch".into()),
                    ),
                }
            }
        }
    }

    fn authenticate(
        &self,
        token: Option<&str>,
        cancellation: CancellationToken,
    ) -> ServerResult<CallContext> {
        Ok(self
            .context
            .tokens
            .authenticate(token)?
            .with_cancellation(cancellation))
    }

    /// Handles a JSON encoded request and returns a JSON encoded response.
    ///
    /// Failures, including malformed JSON, are reported as
    /// [`VaultResponse::Error`].
    pub fn handle_json(&self, token: Option<&str>, body: &str) -> String {
        let response = serde_json::from_str::<VaultRequest>(body)
            .map_err(ServerError::from)
            .and_then(|request| self.handle(token, request))
            .unwrap_or_else(|err| VaultResponse::error(&err));

        serde_json::to_string(&response).unwrap_or_else(|err| encoding_failure(&err.to_string()))
    }
}

fn encoding_failure(message: &str) -> String {
    warn!(error = message, "response encoding failed");
    serde_json::json!({
        "kind": "error",
        "body": { "status": 500, "message": message },
    })
    .to_string()
}

fn id(id: RecordId) -> ServerResult<VaultResponse> {
    Ok(VaultResponse::Id { id })
}
