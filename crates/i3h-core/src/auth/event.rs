//! Identity provider session notifications.

use serde::{Deserialize, Serialize};

/// Session lifecycle events published by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum AuthEvent {
    /// Credentials were exchanged for a new session.
    SignedIn,
    /// A hosted-UI (OAuth redirect) sign-in completed.
    SignInWithRedirect,
    /// A hosted-UI sign-in failed.
    SignInWithRedirectFailure(String),
    /// The access token was refreshed.
    TokenRefresh,
    /// The refresh token was rejected; the session is no longer valid.
    TokenRefreshFailure,
    SignedOut,
}

impl AuthEvent {
    /// Whether this event invalidates the current session.
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::TokenRefreshFailure | Self::SignedOut)
    }
}
