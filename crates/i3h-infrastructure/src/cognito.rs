//! Cognito user pool identity provider.
//!
//! Talks to the `cognito-idp` JSON API directly (InitiateAuth,
//! GlobalSignOut) through a [`JsonClient`] and keeps the issued tokens in
//! [`SessionStorage`]. Session lifecycle changes are published as
//! [`AuthEvent`]s.

use crate::session_storage::{SessionStorage, StoredSession};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use i3h_core::auth::AuthEvent;
use i3h_core::config::AuthConfig;
use i3h_core::error::{PortalError, Result};
use i3h_core::http::{HttpMethod, JsonClient, RequestOptions, send_json};
use i3h_core::identity::{IdentityProvider, ProviderSession};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const REFRESH_TOKEN_AUTH: &str = "REFRESH_TOKEN_AUTH";

/// Access tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: BTreeMap<&'a str, &'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<AuthenticationResult>,
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: String,
    expires_in: Option<i64>,
    id_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GlobalSignOutRequest<'a> {
    access_token: &'a str,
}

/// Error body returned by the Cognito API on 4xx.
#[derive(Debug, Deserialize)]
struct CognitoErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    message: Option<String>,
}

/// [`IdentityProvider`] backed by a Cognito user pool.
pub struct CognitoIdentityProvider {
    config: AuthConfig,
    endpoint: String,
    client: Arc<dyn JsonClient>,
    storage: SessionStorage,
    events: Option<UnboundedSender<AuthEvent>>,
    /// Serializes refreshes so concurrent callers do not spend the refresh
    /// token twice.
    refresh_lock: Mutex<()>,
}

impl CognitoIdentityProvider {
    /// Fails when the pool is not configured or its region cannot be derived.
    pub fn new(
        config: AuthConfig,
        client: Arc<dyn JsonClient>,
        storage: SessionStorage,
    ) -> Result<Self> {
        if !config.is_configured() {
            return Err(PortalError::config(
                "Cognito user pool id and web client id are required",
            ));
        }
        let endpoint = config.cognito_endpoint().ok_or_else(|| {
            PortalError::config(format!(
                "Cannot derive Cognito region from user pool id {:?}",
                config.user_pool_id
            ))
        })?;

        Ok(Self {
            config,
            endpoint,
            client,
            storage,
            events: None,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Publishes session events on `sender`.
    pub fn with_events(mut self, sender: UnboundedSender<AuthEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Signs in with username and password using the configured
    /// authentication flow, and stores the resulting session.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<()> {
        let mut parameters = BTreeMap::new();
        parameters.insert("USERNAME", username);
        parameters.insert("PASSWORD", password);

        let flow = self.config.authentication_flow_type.clone();
        let result = self.initiate_auth(&flow, parameters).await?;

        let session = stored_from(result, None)?;
        self.storage.save(&session)?;
        tracing::info!("[Cognito] Signed in as {}", username);
        self.emit(AuthEvent::SignedIn);
        Ok(())
    }

    /// OAuth authorize URL of the hosted UI. `identity_provider` selects a
    /// federated provider such as `ORCID`.
    pub fn hosted_ui_sign_in_url(&self, identity_provider: Option<&str>) -> Result<String> {
        if self.config.oauth_domain.is_empty() {
            return Err(PortalError::config("oauth_domain is not configured"));
        }
        let domain = self
            .config
            .oauth_domain
            .trim_start_matches("https://")
            .trim_end_matches('/');
        let scope = self.config.oauth_scopes().join(" ");

        let mut params = vec![
            ("response_type", "token"),
            ("client_id", self.config.user_pool_web_client_id.as_str()),
            ("redirect_uri", self.config.oauth_redirect_sign_in.as_str()),
            ("scope", scope.as_str()),
        ];
        if let Some(provider) = identity_provider {
            params.push(("identity_provider", provider));
        }

        let url = reqwest::Url::parse_with_params(
            &format!("https://{}/oauth2/authorize", domain),
            &params,
        )
        .map_err(|e| PortalError::config(format!("Invalid oauth_domain: {}", e)))?;
        Ok(url.to_string())
    }

    /// Stores a session obtained outside this provider (hosted-UI redirect
    /// fragment) and announces the redirect sign-in.
    pub fn complete_redirect_sign_in(
        &self,
        access_token: &str,
        id_token: Option<String>,
        expires_in: Option<i64>,
    ) -> Result<()> {
        if access_token.is_empty() {
            self.emit(AuthEvent::SignInWithRedirectFailure(
                "missing access token".to_string(),
            ));
            return Err(PortalError::provider("Redirect sign-in returned no access token"));
        }
        let mut session = match StoredSession::issued_now(access_token, expires_in) {
            Ok(session) => session,
            Err(e) => {
                self.emit(AuthEvent::SignInWithRedirectFailure(e.to_string()));
                return Err(e);
            }
        };
        session.id_token = id_token;
        self.storage.save(&session)?;
        self.emit(AuthEvent::SignInWithRedirect);
        Ok(())
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: BTreeMap<&str, &str>,
    ) -> Result<AuthenticationResult> {
        let request = InitiateAuthRequest {
            auth_flow: flow,
            client_id: &self.config.user_pool_web_client_id,
            auth_parameters: parameters,
        };
        let response: InitiateAuthResponse = self.call("InitiateAuth", &request).await?;

        match (response.authentication_result, response.challenge_name) {
            (Some(result), _) => Ok(result),
            (None, Some(challenge)) => Err(PortalError::provider(format!(
                "Unsupported authentication challenge: {}",
                challenge
            ))),
            (None, None) => Err(PortalError::provider(
                "InitiateAuth returned no authentication result",
            )),
        }
    }

    async fn call<Req, Resp>(&self, action: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let options = RequestOptions::new(HttpMethod::Post)
            .with_header("Content-Type", AMZ_JSON)
            .with_header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, action))
            .with_body(serde_json::to_value(request)?);

        send_json(self.client.as_ref(), &format!("{}/", self.endpoint), options)
            .await
            .map_err(|e| provider_error(action, e))
    }

    fn emit(&self, event: AuthEvent) {
        if let Some(sender) = &self.events {
            // A closed receiver only means nobody is listening.
            let _ = sender.send(event);
        }
    }

    async fn refresh(&self, stored: StoredSession, refresh_token: String) -> Result<ProviderSession> {
        let mut parameters = BTreeMap::new();
        parameters.insert("REFRESH_TOKEN", refresh_token.as_str());

        match self.initiate_auth(REFRESH_TOKEN_AUTH, parameters).await {
            Ok(result) => {
                let mut session = stored_from(result, Some(refresh_token.clone()))?;
                if session.id_token.is_none() {
                    session.id_token = stored.id_token;
                }
                self.storage.save(&session)?;
                tracing::info!("[Cognito] Token refreshed");
                self.emit(AuthEvent::TokenRefresh);
                Ok(provider_session(&session))
            }
            Err(e) => {
                tracing::error!("[Cognito] Token refresh failed: {}", e);
                self.emit(AuthEvent::TokenRefreshFailure);
                if let Err(clear_err) = self.storage.clear() {
                    tracing::warn!("[Cognito] Failed to clear stored session: {}", clear_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn current_session(&self) -> Result<ProviderSession> {
        let _guard = self.refresh_lock.lock().await;

        let Some(stored) = self.storage.load()? else {
            return Ok(ProviderSession::empty());
        };

        if !stored.is_expired(Utc::now(), Duration::seconds(EXPIRY_SKEW_SECS)) {
            return Ok(provider_session(&stored));
        }

        match stored.refresh_token.clone() {
            Some(refresh_token) => self.refresh(stored, refresh_token).await,
            None => {
                tracing::debug!("[Cognito] Stored session expired without a refresh token");
                self.storage.clear()?;
                Ok(ProviderSession::empty())
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(stored) = self.storage.load().ok().flatten() {
            let request = GlobalSignOutRequest {
                access_token: &stored.access_token,
            };
            if let Err(e) = self
                .call::<_, serde_json::Value>("GlobalSignOut", &request)
                .await
            {
                tracing::warn!("[Cognito] GlobalSignOut failed, clearing local session: {}", e);
            }
        }

        self.storage.clear()?;
        tracing::info!("[Cognito] Signed out");
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }
}

fn stored_from(
    result: AuthenticationResult,
    fallback_refresh: Option<String>,
) -> Result<StoredSession> {
    let mut session = StoredSession::issued_now(result.access_token, result.expires_in)?;
    session.id_token = result.id_token;
    session.refresh_token = result.refresh_token.or(fallback_refresh);
    Ok(session)
}

fn provider_session(stored: &StoredSession) -> ProviderSession {
    ProviderSession {
        access_token: Some(stored.access_token.clone()),
        id_token: stored.id_token.clone(),
    }
}

/// Maps Cognito's `{"__type", "message"}` error bodies to provider errors.
fn provider_error(action: &str, err: PortalError) -> PortalError {
    match err {
        PortalError::Http { status, message } => {
            let detail = match serde_json::from_str::<CognitoErrorBody>(&message) {
                Ok(body) => {
                    let kind = body.kind.unwrap_or_else(|| "Error".to_string());
                    let kind = kind.rsplit('#').next().unwrap_or_default().to_string();
                    format!("{}: {}", kind, body.message.unwrap_or_default())
                }
                Err(_) => message,
            };
            PortalError::provider(format!("{} failed ({}): {}", action, status, detail))
        }
        other => other,
    }
}
