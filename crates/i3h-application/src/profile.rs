//! Profile fetch orchestration.
//!
//! Loads the signed-in user and their workspaces from the Pennsieve API and
//! publishes the outcome to the [`AuthStore`]. Concurrent callers share one
//! in-flight fetch.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use i3h_core::auth::AuthStore;
use i3h_core::error::Result;
use i3h_core::http::{JsonClient, append_query_param, get_json};
use i3h_core::identity::TokenSource;
use i3h_core::user::{Organization, OrganizationsResponse, User};
use std::sync::{Arc, Mutex, Weak};

/// Result of a successful profile fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub user: User,
    pub workspaces: Vec<Organization>,
}

type SharedFetch = Shared<BoxFuture<'static, Option<ProfileSnapshot>>>;
type InFlightSlot = Arc<Mutex<Option<SharedFetch>>>;

/// Everything one fetch needs, owned so the fetch future is `'static`.
#[derive(Clone)]
struct FetchJob {
    store: AuthStore,
    tokens: Arc<dyn TokenSource>,
    client: Arc<dyn JsonClient>,
    api_host: String,
}

/// Resets `is_auth_loading` when the fetch completes or is dropped.
struct LoadingGuard<'a> {
    store: &'a AuthStore,
}

impl<'a> LoadingGuard<'a> {
    fn start(store: &'a AuthStore) -> Self {
        store.set_loading(true);
        store.set_error(None);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}

/// Fetches the user profile and workspaces into the store.
///
/// Cloning yields a handle to the same fetcher; all clones share the
/// in-flight fetch.
#[derive(Clone)]
pub struct ProfileFetcher {
    job: FetchJob,
    in_flight: InFlightSlot,
}

impl ProfileFetcher {
    pub fn new(
        store: AuthStore,
        tokens: Arc<dyn TokenSource>,
        client: Arc<dyn JsonClient>,
        api_host: impl Into<String>,
    ) -> Self {
        let api_host = api_host.into().trim_end_matches('/').to_string();
        Self {
            job: FetchJob {
                store,
                tokens,
                client,
                api_host,
            },
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &AuthStore {
        &self.job.store
    }

    /// True while a fetch started by this fetcher has not completed.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Fetches the profile, or joins the fetch already in flight.
    ///
    /// Returns `None` when there is no token or the API calls fail; the
    /// failure text is left in `auth_error`.
    pub async fn fetch_profile(&self) -> Option<ProfileSnapshot> {
        let pending = {
            let mut slot = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("[ProfileFetcher] Joining fetch in flight");
                    pending.clone()
                }
                None => {
                    let pending = Self::start(self.job.clone(), Arc::downgrade(&self.in_flight));
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn start(job: FetchJob, slot: Weak<Mutex<Option<SharedFetch>>>) -> SharedFetch {
        async move {
            let result = job.run().await;
            if let Some(slot) = slot.upgrade() {
                slot.lock().unwrap_or_else(|e| e.into_inner()).take();
            }
            result
        }
        .boxed()
        .shared()
    }
}

impl FetchJob {
    async fn run(&self) -> Option<ProfileSnapshot> {
        let _loading = LoadingGuard::start(&self.store);

        let Some(token) = self.tokens.get_token().await else {
            tracing::debug!("[ProfileFetcher] No token available, clearing session");
            self.store.clear_state();
            return None;
        };

        match self.load(&token).await {
            Ok(snapshot) => {
                tracing::info!(
                    "[ProfileFetcher] Loaded profile {} with {} workspace(s)",
                    snapshot.user.id,
                    snapshot.workspaces.len()
                );
                self.store.apply_profile(
                    snapshot.user.clone(),
                    snapshot.workspaces.clone(),
                    token,
                );
                Some(snapshot)
            }
            Err(e) => {
                tracing::error!("[ProfileFetcher] Error fetching profile: {}", e);
                self.store.fail(e.to_string());
                None
            }
        }
    }

    async fn load(&self, token: &str) -> Result<ProfileSnapshot> {
        let user_url = append_query_param(&format!("{}/user", self.api_host), "api_key", token);
        let user: User = get_json(self.client.as_ref(), &user_url).await?;

        let orgs_url = append_query_param(
            &format!("{}/organizations", self.api_host),
            "api_key",
            token,
        );
        let orgs: OrganizationsResponse = get_json(self.client.as_ref(), &orgs_url).await?;

        Ok(ProfileSnapshot {
            user,
            workspaces: orgs.organizations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{API_HOST, FixedTokens, StubApi};
    use i3h_core::error::PortalError;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn fetcher(tokens: Arc<FixedTokens>, api: Arc<StubApi>) -> ProfileFetcher {
        ProfileFetcher::new(AuthStore::new(), tokens, api, API_HOST)
    }

    #[tokio::test]
    async fn test_no_token_clears_session_without_error() {
        let api = Arc::new(StubApi::healthy());
        let fetcher = fetcher(Arc::new(FixedTokens::new(None)), api.clone());
        let store = fetcher.store().clone();
        store.apply_profile(User::new("stale", "Old", "User"), vec![], "old".to_string());

        assert!(fetcher.fetch_profile().await.is_none());

        let state = store.snapshot();
        assert!(!state.is_signed_in());
        assert!(state.auth_token.is_none());
        assert!(state.auth_error.is_none());
        assert!(!state.is_auth_loading);
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_request_records_error() {
        let api = Arc::new(StubApi::default());
        let fetcher = fetcher(Arc::new(FixedTokens::new(Some("abc"))), api);
        let store = fetcher.store().clone();
        store.apply_profile(User::new("stale", "Old", "User"), vec![], "old".to_string());

        assert!(fetcher.fetch_profile().await.is_none());

        let state = store.snapshot();
        assert!(state.profile.is_none());
        assert!(state.workspaces.is_empty());
        assert!(state.auth_token.is_none());
        assert!(state.auth_error.as_deref().unwrap().contains("404"));
        assert!(!state.is_auth_loading);
    }

    #[tokio::test]
    async fn test_successful_fetch_populates_store() {
        let api = Arc::new(StubApi::healthy());
        let fetcher = fetcher(Arc::new(FixedTokens::new(Some("abc"))), api.clone());
        let store = fetcher.store().clone();
        store.set_error(Some("previous failure".to_string()));

        let snapshot = fetcher.fetch_profile().await.unwrap();
        assert_eq!(snapshot.user.id, "u1");
        assert_eq!(snapshot.workspaces.len(), 1);

        let state = store.snapshot();
        assert_eq!(state.profile.as_ref().map(|u| u.id.as_str()), Some("u1"));
        assert_eq!(state.workspaces.len(), 1);
        assert_eq!(state.auth_token.as_deref(), Some("abc"));
        assert!(state.auth_error.is_none());
        assert!(!state.is_auth_loading);
        assert_eq!(store.display_name(), "J. Doe");

        assert_eq!(
            api.requests(),
            vec![
                "https://api.pennsieve.net/user?api_key=abc".to_string(),
                "https://api.pennsieve.net/organizations?api_key=abc".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_organizations_field_means_no_workspaces() {
        let api = Arc::new(StubApi::healthy().route("/organizations", Ok(json!({}))));
        let fetcher = fetcher(Arc::new(FixedTokens::new(Some("abc"))), api);

        let snapshot = fetcher.fetch_profile().await.unwrap();
        assert!(snapshot.workspaces.is_empty());
        assert!(fetcher.store().is_signed_in());
    }

    #[tokio::test]
    async fn test_user_without_id_is_a_failure() {
        let api = Arc::new(StubApi::healthy().route("/user", Ok(json!({}))));
        let fetcher = fetcher(Arc::new(FixedTokens::new(Some("abc"))), api);

        assert!(fetcher.fetch_profile().await.is_none());
        assert!(!fetcher.store().is_signed_in());
        assert!(fetcher.store().error().is_some());
    }

    #[tokio::test]
    async fn test_transport_failure_on_organizations() {
        let api = Arc::new(
            StubApi::healthy().route("/organizations", Err(PortalError::transport("connection reset"))),
        );
        let fetcher = fetcher(Arc::new(FixedTokens::new(Some("abc"))), api);

        assert!(fetcher.fetch_profile().await.is_none());
        let state = fetcher.store().snapshot();
        assert!(state.profile.is_none());
        assert!(state.auth_error.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let tokens = Arc::new(FixedTokens::new(Some("abc")).delayed(Duration::from_millis(20)));
        let api = Arc::new(StubApi::healthy());
        let fetcher = fetcher(tokens.clone(), api.clone());
        let other = fetcher.clone();

        let (first, second) = tokio::join!(fetcher.fetch_profile(), other.fetch_profile());

        assert_eq!(first, second);
        assert_eq!(first.unwrap().user.id, "u1");
        assert_eq!(tokens.calls(), 1);
        assert_eq!(api.requests().len(), 2);
        assert!(!fetcher.is_in_flight());

        // A later call starts a fresh fetch.
        fetcher.fetch_profile().await.unwrap();
        assert_eq!(tokens.calls(), 2);
    }

    #[tokio::test]
    async fn test_loading_is_set_while_in_flight() {
        let gate = Arc::new(Notify::new());
        let tokens = Arc::new(FixedTokens::new(Some("abc")).gated(gate.clone()));
        let fetcher = fetcher(tokens, Arc::new(StubApi::healthy()));
        let store = fetcher.store().clone();

        let task = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.fetch_profile().await })
        };
        store
            .subscribe()
            .wait_for(|s| s.is_auth_loading)
            .await
            .unwrap();
        assert!(fetcher.is_in_flight());

        gate.notify_one();
        assert!(task.await.unwrap().is_some());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_dropping_the_fetch_resets_loading() {
        let gate = Arc::new(Notify::new());
        let tokens = Arc::new(FixedTokens::new(Some("abc")).gated(gate));
        let fetcher = fetcher(tokens, Arc::new(StubApi::healthy()));
        let store = fetcher.store().clone();

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), fetcher.fetch_profile()).await;
        assert!(abandoned.is_err());
        assert!(store.is_loading());

        drop(fetcher);
        assert!(!store.is_loading());
        assert!(!store.is_signed_in());
    }
}
