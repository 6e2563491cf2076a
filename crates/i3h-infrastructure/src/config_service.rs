//! Configuration service implementation.
//!
//! Loads `PortalConfig` from `~/.config/i3h-portal/config.toml` and applies
//! environment overrides on top.

use crate::paths::PortalPaths;
use i3h_core::config::PortalConfig;
use i3h_core::error::{PortalError, Result};
use std::sync::{Arc, RwLock};

/// Environment variables that override file values, in the order applied.
pub const ENV_OVERRIDES: &[&str] = &[
    "PENNSIEVE_API_HOST",
    "PENNSIEVE_API2_HOST",
    "PENNSIEVE_DISCOVER_API_HOST",
    "USER_POOL_ID",
    "USER_POOL_WEB_CLIENT_ID",
    "OAUTH_DOMAIN",
    "OAUTH_REDIRECT_SIGNIN",
    "OAUTH_REDIRECT_SIGNOUT",
    "AUTHENTICATION_FLOW_TYPE",
    "APP_DOMAIN",
    "DEPLOY_ENV",
    "SITE_URL",
    "ORCID_CLIENT_ID",
    "ORCID_API_HOST",
    "I3H_AUTH_GUARD_ENABLED",
];

/// Configuration service that loads and caches the portal configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: PortalPaths,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<PortalConfig>>>,
}

impl ConfigService {
    pub fn new(paths: PortalPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<PortalConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Writes `config` to the config file, creating the directory if needed.
    pub fn save(&self, config: &PortalConfig) -> Result<()> {
        let path = self.paths.config_file()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(config)?)?;
        tracing::info!("[ConfigService] Saved configuration to {}", path.display());
        self.invalidate_cache();
        Ok(())
    }

    fn load_config(&self) -> Result<PortalConfig> {
        let path = self.paths.config_file()?;

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(|e| {
                PortalError::config(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            tracing::debug!(
                "[ConfigService] No config file at {}, using defaults",
                path.display()
            );
            PortalConfig::default()
        };

        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }
}

/// Applies environment-style overrides. `lookup` returns the raw value for a
/// key; empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut PortalConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    for key in ENV_OVERRIDES {
        let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let value = value.trim().to_string();

        match *key {
            "PENNSIEVE_API_HOST" => config.api.api_host = value,
            "PENNSIEVE_API2_HOST" => config.api.api2_host = value,
            "PENNSIEVE_DISCOVER_API_HOST" => config.api.discover_api_host = value,
            "USER_POOL_ID" => config.auth.user_pool_id = value,
            "USER_POOL_WEB_CLIENT_ID" => config.auth.user_pool_web_client_id = value,
            "OAUTH_DOMAIN" => config.auth.oauth_domain = value,
            "OAUTH_REDIRECT_SIGNIN" => config.auth.oauth_redirect_sign_in = value,
            "OAUTH_REDIRECT_SIGNOUT" => config.auth.oauth_redirect_sign_out = value,
            "AUTHENTICATION_FLOW_TYPE" => config.auth.authentication_flow_type = value,
            "APP_DOMAIN" => config.app.app_domain = value,
            "DEPLOY_ENV" => config.app.deploy_env = value,
            "SITE_URL" => config.app.site_url = value,
            "ORCID_CLIENT_ID" => config.auth.orcid_client_id = value,
            "ORCID_API_HOST" => config.auth.orcid_api_host = value,
            "I3H_AUTH_GUARD_ENABLED" => match parse_bool(&value) {
                Some(enabled) => config.routes.guard_enabled = enabled,
                None => tracing::warn!(
                    "[ConfigService] Ignoring I3H_AUTH_GUARD_ENABLED={:?}: not a boolean",
                    value
                ),
            },
            _ => {}
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
