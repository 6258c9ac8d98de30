//! # Datakeeper Server
//!
//! Transport-neutral request handling for Datakeeper vaults.
//!
//! This crate provides:
//! - Owner tokens (HMAC-SHA256, with expiry)
//! - A local identity provider with Argon2id password hashes
//! - Typed and JSON request dispatch to the vault usecases
//! - Error classification with HTTP style status codes
//!
//! # Architecture
//!
//! An HTTP (or any other) transport only has to extract the bearer token
//! and the request body and pass both to [`VaultServer::handle_json`]:
//!
//! ```text
//! token -> TokenValidator -> CallContext { owner } -> Vault usecase
//! ```
//!
//! `sign_in` and `sign_up` need no token. Sign-in registers the key the
//! owner supplies; sign-up generates one and returns it with the token.
//! Keys are held in memory only, so after a restart owners must sign in
//! again before their records can be read.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod auth;
mod config;
mod error;
mod handler;
mod identity;
mod server;

pub use auth::{AuthConfig, TokenValidator};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler, VaultRequest, VaultResponse};
pub use identity::LocalIdentityProvider;
pub use server::VaultServer;
