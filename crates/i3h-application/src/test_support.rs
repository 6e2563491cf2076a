//! Shared doubles for application-layer tests.

use async_trait::async_trait;
use i3h_core::error::{PortalError, Result};
use i3h_core::http::{JsonClient, RequestOptions};
use i3h_core::identity::TokenSource;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

pub const API_HOST: &str = "https://api.pennsieve.net";

/// Token source returning a fixed token, optionally after a delay or a gate.
pub struct FixedTokens {
    token: Option<String>,
    delay: Option<Duration>,
    gate: Option<std::sync::Arc<Notify>>,
    pub calls: AtomicUsize,
    pub sign_outs: AtomicUsize,
}

impl FixedTokens {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.map(str::to_string),
            delay: None,
            gate: None,
            calls: AtomicUsize::new(0),
            sign_outs: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn gated(mut self, gate: std::sync::Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for FixedTokens {
    async fn get_token(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.token.clone()
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
    }
}

/// JSON client answering by URL path with canned results.
#[derive(Default)]
pub struct StubApi {
    routes: HashMap<String, Result<Value>>,
    pub requests: Mutex<Vec<String>>,
}

impl StubApi {
    /// `/user` answers `u1`, `/organizations` answers one workspace.
    pub fn healthy() -> Self {
        Self::default()
            .route(
                "/user",
                Ok(json!({
                    "id": "u1",
                    "firstName": "Jane",
                    "lastName": "Doe",
                    "email": "jane@example.org",
                    "preferredOrganizationId": "o1"
                })),
            )
            .route(
                "/organizations",
                Ok(json!({
                    "organizations": [{"id": "o1", "name": "I3H Lab", "slug": "i3h-lab"}]
                })),
            )
    }

    pub fn route(mut self, path: &str, result: Result<Value>) -> Self {
        self.routes.insert(path.to_string(), result);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl JsonClient for StubApi {
    async fn send(&self, url: &str, _options: RequestOptions) -> Result<Value> {
        self.requests.lock().unwrap().push(url.to_string());
        let path = url
            .strip_prefix(API_HOST)
            .unwrap_or(url)
            .split('?')
            .next()
            .unwrap_or_default();
        self.routes
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(PortalError::http(404, "Not Found")))
    }
}
