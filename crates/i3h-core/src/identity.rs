//! Identity provider and token source interfaces.
//!
//! `IdentityProvider` is the shape of the backing SDK (fallible session
//! queries). `TokenSource` is what the rest of the portal consumes: it never
//! fails, and "no token" is its only failure signal. `ProviderTokenSource`
//! bridges the two.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Tokens of the provider's current session. All fields are absent when no
/// session exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

impl ProviderSession {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            id_token: None,
        }
    }
}

/// Session API of an external identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current session, refreshing tokens if the provider supports it.
    async fn current_session(&self) -> Result<ProviderSession>;

    /// Terminates the provider session.
    async fn sign_out(&self) -> Result<()>;
}

/// Infallible access-token source used by the fetcher and URL augmenter.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns the current access token, or `None` if there is no usable session.
    async fn get_token(&self) -> Option<String>;

    /// Requests session termination. Failures are logged, never returned.
    async fn sign_out(&self);
}

/// Adapts an [`IdentityProvider`] to the [`TokenSource`] contract.
pub struct ProviderTokenSource<P: ?Sized> {
    provider: std::sync::Arc<P>,
}

impl<P: IdentityProvider + ?Sized> ProviderTokenSource<P> {
    pub fn new(provider: std::sync::Arc<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &std::sync::Arc<P> {
        &self.provider
    }
}

#[async_trait::async_trait]
impl<P: IdentityProvider + ?Sized> TokenSource for ProviderTokenSource<P> {
    async fn get_token(&self) -> Option<String> {
        match self.provider.current_session().await {
            Ok(session) => session.access_token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::error!("[TokenSource] Error fetching auth token: {}", e);
                None
            }
        }
    }

    async fn sign_out(&self) {
        if let Err(e) = self.provider.sign_out().await {
            tracing::error!("[TokenSource] Error signing out: {}", e);
        }
    }
}
