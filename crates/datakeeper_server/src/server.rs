//! Main vault server.

use crate::auth::{AuthConfig, TokenValidator};
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{HandlerContext, RequestHandler, VaultRequest, VaultResponse};
use crate::identity::LocalIdentityProvider;
use datakeeper_core::{ContextOwnerResolver, IdentityProvider, Vault};
use datakeeper_storage::{BlobStore, InMemoryStore, RecordStore};
use std::sync::Arc;

/// The vault server.
///
/// Binds a [`Vault`] to token authentication and an identity provider.
/// Transports call [`handle`](Self::handle) or
/// [`handle_json`](Self::handle_json) with the bearer token of the
/// request, if any.
///
/// # Example
///
/// ```
/// use datakeeper_server::{ServerConfig, VaultServer};
///
/// let server = VaultServer::in_memory(ServerConfig::new(b"secret".to_vec())).unwrap();
///
/// let response = server.handle_json(
///     None,
///     r#"{"op":"sign_up","body":{"email":"bob@example.com","password":"hunter2"}}"#,
/// );
/// assert!(response.contains("signed_up"));
/// ```
pub struct VaultServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
}

impl VaultServer {
    /// Creates a server over `store` with the local identity provider.
    pub fn new<S>(config: ServerConfig, store: Arc<S>) -> ServerResult<Self>
    where
        S: RecordStore + BlobStore + 'static,
    {
        let tokens = Arc::new(Self::validator(&config));
        let provider = Arc::new(LocalIdentityProvider::new(Arc::clone(&tokens)));
        Self::with_provider(config, store, tokens, provider)
    }

    /// Creates a server with a caller-supplied identity provider. Tokens
    /// the provider issues must validate with `tokens`.
    pub fn with_provider<S>(
        config: ServerConfig,
        store: Arc<S>,
        tokens: Arc<TokenValidator>,
        provider: Arc<dyn IdentityProvider>,
    ) -> ServerResult<Self>
    where
        S: RecordStore + BlobStore + 'static,
    {
        let vault = Vault::new(config.vault.clone(), store, Arc::new(ContextOwnerResolver))?;
        let accounts = vault.accounts(provider);
        let context = Arc::new(HandlerContext {
            config,
            vault,
            tokens,
            accounts,
        });
        let handler = RequestHandler::new(Arc::clone(&context));

        Ok(Self { handler, context })
    }

    /// Creates a server over an ephemeral in-memory store.
    pub fn in_memory(config: ServerConfig) -> ServerResult<Self> {
        Self::new(config, Arc::new(InMemoryStore::new()))
    }

    /// Builds the token validator described by `config`.
    pub fn validator(config: &ServerConfig) -> TokenValidator {
        TokenValidator::new(
            AuthConfig::new(config.token_secret.clone()).with_expiry(config.token_expiry),
        )
    }

    /// Handles a request.
    pub fn handle(&self, token: Option<&str>, request: VaultRequest) -> ServerResult<VaultResponse> {
        self.handler.handle(token, request)
    }

    /// Handles a JSON encoded request.
    pub fn handle_json(&self, token: Option<&str>, body: &str) -> String {
        self.handler.handle_json(token, body)
    }

    /// Returns the vault behind the server.
    pub fn vault(&self) -> &Vault {
        &self.context.vault
    }

    /// Returns the token validator.
    pub fn tokens(&self) -> &TokenValidator {
        &self.context.tokens
    }
}
