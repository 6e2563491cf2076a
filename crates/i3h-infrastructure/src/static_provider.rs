//! Fixed-token identity provider.

use async_trait::async_trait;
use i3h_core::error::Result;
use i3h_core::identity::{IdentityProvider, ProviderSession};
use std::sync::Mutex;

/// Environment variable read by [`StaticIdentityProvider::from_env`].
pub const ACCESS_TOKEN_ENV: &str = "I3H_ACCESS_TOKEN";

/// Serves a token supplied up front (scripts, CI, local development).
/// Signing out forgets the token for the lifetime of the provider.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    token: Mutex<Option<String>>,
}

impl StaticIdentityProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token.filter(|t| !t.is_empty())),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(ACCESS_TOKEN_ENV).ok())
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_session(&self) -> Result<ProviderSession> {
        let token = self.token.lock().unwrap_or_else(|e| e.into_inner()).clone();
        Ok(ProviderSession {
            access_token: token,
            id_token: None,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}
