//! Wiring of one portal session.

use crate::events::AuthEventHandler;
use crate::guard::RouteGuard;
use crate::profile::{ProfileFetcher, ProfileSnapshot};
use crate::url_token::UrlTokenAugmenter;
use i3h_core::auth::AuthStore;
use i3h_core::config::PortalConfig;
use i3h_core::http::JsonClient;
use i3h_core::identity::TokenSource;
use i3h_core::route::Navigation;
use std::sync::Arc;

/// One signed-in (or signed-out) portal session and the services acting on
/// it. All services share the same [`AuthStore`].
#[derive(Clone)]
pub struct PortalSession {
    store: AuthStore,
    tokens: Arc<dyn TokenSource>,
    fetcher: ProfileFetcher,
    augmenter: UrlTokenAugmenter,
    guard: RouteGuard,
    events: AuthEventHandler,
}

impl PortalSession {
    pub fn new(
        config: &PortalConfig,
        tokens: Arc<dyn TokenSource>,
        client: Arc<dyn JsonClient>,
    ) -> Self {
        let store = AuthStore::new();
        let fetcher = ProfileFetcher::new(
            store.clone(),
            tokens.clone(),
            client,
            config.api.api_host.clone(),
        );
        let augmenter =
            UrlTokenAugmenter::new(config.trusted_hosts(), store.clone(), tokens.clone());
        let guard = RouteGuard::new(config.routes.clone(), fetcher.clone());
        let events = AuthEventHandler::new(store.clone(), config.routes.sign_in_landing.clone());

        Self {
            store,
            tokens,
            fetcher,
            augmenter,
            guard,
            events,
        }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    pub fn fetcher(&self) -> &ProfileFetcher {
        &self.fetcher
    }

    pub fn augmenter(&self) -> &UrlTokenAugmenter {
        &self.augmenter
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn events(&self) -> &AuthEventHandler {
        &self.events
    }

    pub async fn fetch_profile(&self) -> Option<ProfileSnapshot> {
        self.fetcher.fetch_profile().await
    }

    pub async fn augment_url(&self, url: &str) -> String {
        self.augmenter.augment(url).await
    }

    pub async fn check_route(&self, target: &str) -> Navigation {
        self.guard.check(target).await
    }

    /// Ends the provider session, then resets the local state.
    pub async fn sign_out(&self) {
        self.tokens.sign_out().await;
        self.store.clear_state();
        tracing::info!("[PortalSession] Signed out");
    }
}
