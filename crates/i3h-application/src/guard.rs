//! Navigation guard for protected portal routes.

use crate::profile::ProfileFetcher;
use i3h_core::auth::AuthStore;
use i3h_core::config::RouteConfig;
use i3h_core::route::{Navigation, is_protected_path, route_path};

/// Decides whether a navigation may proceed.
#[derive(Clone)]
pub struct RouteGuard {
    config: RouteConfig,
    store: AuthStore,
    fetcher: ProfileFetcher,
}

impl RouteGuard {
    pub fn new(config: RouteConfig, fetcher: ProfileFetcher) -> Self {
        Self {
            config,
            store: fetcher.store().clone(),
            fetcher,
        }
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// Checks a navigation to `target` (path, optionally with query and
    /// fragment).
    ///
    /// A signed-out session is refreshed first: the guard starts a profile
    /// fetch or joins the one in flight. Fetch failures are absorbed; the
    /// decision only looks at the resulting session.
    pub async fn check(&self, target: &str) -> Navigation {
        if !self.config.guard_enabled {
            return Navigation::Proceed;
        }

        if !self.store.is_signed_in() {
            if self.store.is_loading() && !self.fetcher.is_in_flight() {
                tracing::debug!("[RouteGuard] Waiting for session load started elsewhere");
                self.store.wait_until_settled().await;
            } else {
                self.fetcher.fetch_profile().await;
            }
        }

        let path = route_path(target);
        if self.store.is_signed_in() || !is_protected_path(path, &self.config.protected_roots) {
            return Navigation::Proceed;
        }

        if path == route_path(&self.config.redirect_to) {
            return Navigation::Proceed;
        }

        tracing::info!(
            "[RouteGuard] Redirecting {} to {}: not signed in",
            path,
            self.config.redirect_to
        );
        Navigation::redirect(self.config.redirect_to.clone(), true)
    }
}
