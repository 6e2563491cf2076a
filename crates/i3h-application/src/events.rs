//! Reaction to identity provider session events.

use i3h_core::auth::{AuthEvent, AuthStore};
use i3h_core::route::Navigation;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Applies [`AuthEvent`]s to the store and derives navigations from them.
#[derive(Debug, Clone)]
pub struct AuthEventHandler {
    store: AuthStore,
    sign_in_landing: String,
}

impl AuthEventHandler {
    pub fn new(store: AuthStore, sign_in_landing: impl Into<String>) -> Self {
        Self {
            store,
            sign_in_landing: sign_in_landing.into(),
        }
    }

    /// Handles one event. Returns the navigation the event calls for, if any.
    pub fn handle(&self, event: &AuthEvent) -> Option<Navigation> {
        match event {
            AuthEvent::SignedIn => {
                tracing::info!("[AuthEvents] Signed in");
                None
            }
            AuthEvent::SignInWithRedirect => {
                tracing::info!(
                    "[AuthEvents] Redirect sign-in complete, landing on {}",
                    self.sign_in_landing
                );
                Some(Navigation::redirect(self.sign_in_landing.clone(), false))
            }
            AuthEvent::SignInWithRedirectFailure(message) => {
                tracing::error!("[AuthEvents] Redirect sign-in failed: {}", message);
                None
            }
            AuthEvent::TokenRefresh => {
                tracing::debug!("[AuthEvents] Token refreshed");
                None
            }
            AuthEvent::TokenRefreshFailure => {
                tracing::warn!("[AuthEvents] Token refresh failed, signing out");
                self.store.clear_state();
                None
            }
            AuthEvent::SignedOut => {
                tracing::info!("[AuthEvents] Signed out");
                self.store.clear_state();
                None
            }
        }
    }

    /// Drains `events` until every sender is dropped, forwarding
    /// navigations to `navigations` when given.
    pub async fn listen(
        &self,
        mut events: UnboundedReceiver<AuthEvent>,
        navigations: Option<UnboundedSender<Navigation>>,
    ) {
        while let Some(event) = events.recv().await {
            let Some(navigation) = self.handle(&event) else {
                continue;
            };
            if let Some(tx) = &navigations {
                if tx.send(navigation).is_err() {
                    tracing::debug!("[AuthEvents] Navigation receiver dropped");
                }
            }
        }
        tracing::debug!("[AuthEvents] Event channel closed");
    }
}
