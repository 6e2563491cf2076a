//! `api_key` augmentation for Pennsieve API URLs.

use i3h_core::auth::AuthStore;
use i3h_core::http::append_query_param;
use i3h_core::identity::TokenSource;
use std::sync::Arc;

/// Appends the current access token to URLs aimed at trusted API hosts.
#[derive(Clone)]
pub struct UrlTokenAugmenter {
    trusted_hosts: Vec<String>,
    store: AuthStore,
    tokens: Arc<dyn TokenSource>,
}

impl UrlTokenAugmenter {
    /// Empty host strings are discarded.
    pub fn new(trusted_hosts: Vec<String>, store: AuthStore, tokens: Arc<dyn TokenSource>) -> Self {
        let trusted_hosts = trusted_hosts.into_iter().filter(|h| !h.is_empty()).collect();
        Self {
            trusted_hosts,
            store,
            tokens,
        }
    }

    pub fn trusted_hosts(&self) -> &[String] {
        &self.trusted_hosts
    }

    /// Returns `url` with `api_key={token}` appended when the session is
    /// signed in and the URL contains a trusted host. Never fails; every
    /// other case returns the URL unchanged.
    pub async fn augment(&self, url: &str) -> String {
        if !self.store.is_signed_in() {
            return url.to_string();
        }
        if !self.trusted_hosts.iter().any(|host| url.contains(host.as_str())) {
            return url.to_string();
        }
        match self.tokens.get_token().await {
            Some(token) => append_query_param(url, "api_key", &token),
            None => {
                tracing::debug!("[UrlTokenAugmenter] No token available, leaving URL unchanged");
                url.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{API_HOST, FixedTokens};
    use i3h_core::user::User;

    fn signed_in_store() -> AuthStore {
        let store = AuthStore::new();
        store.update_profile(User::new("u1", "Jane", "Doe"));
        store
    }

    fn augmenter(store: AuthStore, token: Option<&str>) -> UrlTokenAugmenter {
        UrlTokenAugmenter::new(
            vec![API_HOST.to_string()],
            store,
            Arc::new(FixedTokens::new(token)),
        )
    }

    #[tokio::test]
    async fn test_appends_with_question_mark() {
        let augmenter = augmenter(signed_in_store(), Some("abc"));
        assert_eq!(
            augmenter.augment("https://api.pennsieve.net/datasets").await,
            "https://api.pennsieve.net/datasets?api_key=abc"
        );
    }

    #[tokio::test]
    async fn test_appends_with_ampersand_when_query_present() {
        let augmenter = augmenter(signed_in_store(), Some("abc"));
        assert_eq!(
            augmenter.augment("https://api.pennsieve.net/datasets?limit=10").await,
            "https://api.pennsieve.net/datasets?limit=10&api_key=abc"
        );
    }

    #[tokio::test]
    async fn test_untrusted_host_is_unchanged() {
        let augmenter = augmenter(signed_in_store(), Some("abc"));
        assert_eq!(
            augmenter.augment("https://example.org/data").await,
            "https://example.org/data"
        );
    }

    #[tokio::test]
    async fn test_signed_out_is_unchanged() {
        let tokens = Arc::new(FixedTokens::new(Some("abc")));
        let augmenter =
            UrlTokenAugmenter::new(vec![API_HOST.to_string()], AuthStore::new(), tokens.clone());

        let url = "https://api.pennsieve.net/datasets";
        assert_eq!(augmenter.augment(url).await, url);
        assert_eq!(tokens.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_token_is_unchanged() {
        let augmenter = augmenter(signed_in_store(), None);
        let url = "https://api.pennsieve.net/datasets";
        assert_eq!(augmenter.augment(url).await, url);
    }

    #[tokio::test]
    async fn test_empty_hosts_never_match() {
        let augmenter = UrlTokenAugmenter::new(
            vec![String::new()],
            signed_in_store(),
            Arc::new(FixedTokens::new(Some("abc"))),
        );
        assert!(augmenter.trusted_hosts().is_empty());
        assert_eq!(
            augmenter.augment("https://example.org/data").await,
            "https://example.org/data"
        );
    }
}
