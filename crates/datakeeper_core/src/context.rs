//! Call context and owner resolution.

use crate::error::{VaultError, VaultResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag the caller flips to abandon an in-flight operation.
///
/// Usecases check it before each storage call. Writes that already
/// completed are not rolled back.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Ambient context of one inbound call.
///
/// Built by the transport after it authenticated the request.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    owner: Option<String>,
    cancellation: CancellationToken,
}

impl CallContext {
    /// A context without an authenticated owner.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for an authenticated owner.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            cancellation: CancellationToken::new(),
        }
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Returns the authenticated owner, if any.
    #[must_use]
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Fails with [`VaultError::Cancelled`] if the caller gave up.
    pub fn ensure_active(&self) -> VaultResult<()> {
        if self.cancellation.is_cancelled() {
            Err(VaultError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Resolves the owner identity of a call.
///
/// The vault never validates credentials itself; an implementation sits
/// between the transport's authentication and the usecases.
pub trait OwnerResolver: Send + Sync {
    /// Returns the owner of the call.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Unauthenticated`] if no owner can be resolved.
    fn resolve(&self, ctx: &CallContext) -> VaultResult<String>;
}

/// Resolver reading the owner the transport stored in the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextOwnerResolver;

impl OwnerResolver for ContextOwnerResolver {
    fn resolve(&self, ctx: &CallContext) -> VaultResult<String> {
        match ctx.owner() {
            Some(owner) if !owner.is_empty() => Ok(owner.to_string()),
            _ => Err(VaultError::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_reads_owner() {
        let ctx = CallContext::for_owner("bob");
        assert_eq!(ContextOwnerResolver.resolve(&ctx).unwrap(), "bob");
    }

    #[test]
    fn anonymous_and_empty_are_unauthenticated() {
        assert!(matches!(
            ContextOwnerResolver.resolve(&CallContext::anonymous()),
            Err(VaultError::Unauthenticated)
        ));
        assert!(matches!(
            ContextOwnerResolver.resolve(&CallContext::for_owner("")),
            Err(VaultError::Unauthenticated)
        ));
    }

    #[test]
    fn cancellation_is_shared() {
        let token = CancellationToken::new();
        let ctx = CallContext::for_owner("bob").with_cancellation(token.clone());
        assert!(ctx.ensure_active().is_ok());

        token.cancel();
        assert!(matches!(ctx.ensure_active(), Err(VaultError::Cancelled)));
    }
}
