//! Service wiring shared by the session commands.

use anyhow::{Result, anyhow};
use i3h_application::PortalSession;
use i3h_core::auth::AuthEvent;
use i3h_core::config::PortalConfig;
use i3h_core::http::JsonClient;
use i3h_core::identity::{ProviderTokenSource, TokenSource};
use i3h_core::route::Navigation;
use i3h_infrastructure::static_provider::ACCESS_TOKEN_ENV;
use i3h_infrastructure::{
    CognitoIdentityProvider, ConfigService, PortalPaths, ReqwestJsonClient, SessionStorage,
    StaticIdentityProvider,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub struct CliContext {
    pub config: PortalConfig,
    pub session: PortalSession,
    cognito: Option<Arc<CognitoIdentityProvider>>,
    events: UnboundedReceiver<AuthEvent>,
}

impl CliContext {
    /// Loads the configuration and picks the identity provider: Cognito when
    /// the user pool is configured, otherwise a fixed token from
    /// `I3H_ACCESS_TOKEN`.
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        let paths = PortalPaths::new(config_dir);
        let config = ConfigService::new(paths.clone()).get_config()?;

        let client: Arc<dyn JsonClient> = Arc::new(ReqwestJsonClient::new(Duration::from_secs(
            config.api.request_timeout_secs,
        )));
        let (event_tx, events) = mpsc::unbounded_channel();

        let (cognito, tokens): (Option<Arc<CognitoIdentityProvider>>, Arc<dyn TokenSource>) =
            if config.is_auth_configured() {
                let storage = SessionStorage::with_path(paths.session_file()?);
                let provider = Arc::new(
                    CognitoIdentityProvider::new(config.auth.clone(), client.clone(), storage)?
                        .with_events(event_tx),
                );
                tracing::debug!("[CLI] Using Cognito user pool {}", config.auth.user_pool_id);
                (
                    Some(provider.clone()),
                    Arc::new(ProviderTokenSource::new(provider)),
                )
            } else {
                tracing::debug!(
                    "[CLI] No user pool configured, reading token from {}",
                    ACCESS_TOKEN_ENV
                );
                let provider = Arc::new(StaticIdentityProvider::from_env());
                (None, Arc::new(ProviderTokenSource::new(provider)))
            };

        let session = PortalSession::new(&config, tokens, client);
        Ok(Self {
            config,
            session,
            cognito,
            events,
        })
    }

    pub fn cognito(&self) -> Result<&CognitoIdentityProvider> {
        self.cognito.as_deref().ok_or_else(|| {
            anyhow!("Cognito is not configured: set USER_POOL_ID and USER_POOL_WEB_CLIENT_ID")
        })
    }

    /// Applies the provider events queued so far and returns the navigations
    /// they produced.
    pub fn drain_events(&mut self) -> Vec<Navigation> {
        let mut navigations = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let Some(navigation) = self.session.events().handle(&event) {
                navigations.push(navigation);
            }
        }
        navigations
    }
}
