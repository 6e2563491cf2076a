//! Portal configuration model.
//!
//! Loaded from `config.toml` by the infrastructure `ConfigService`; every
//! field has a default so a missing file or section yields a working
//! development configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_HOST: &str = "https://api.pennsieve.net";
pub const DEFAULT_API2_HOST: &str = "https://api2.pennsieve.net";
pub const DEFAULT_DISCOVER_API_HOST: &str = "https://api.pennsieve.net/discover";
pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000";
pub const DEFAULT_AUTH_FLOW: &str = "USER_PASSWORD_AUTH";
pub const DEFAULT_ORCID_API_HOST: &str = "https://sandbox.orcid.org";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub routes: RouteConfig,
}

/// Pennsieve API endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_host: String,
    pub api2_host: String,
    pub discover_api_host: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api2_host: DEFAULT_API2_HOST.to_string(),
            discover_api_host: DEFAULT_DISCOVER_API_HOST.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Cognito user pool and federated login settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub user_pool_id: String,
    pub user_pool_web_client_id: String,
    pub oauth_domain: String,
    pub oauth_redirect_sign_in: String,
    pub oauth_redirect_sign_out: String,
    pub authentication_flow_type: String,
    pub orcid_client_id: String,
    pub orcid_api_host: String,
    /// Overrides the regional `cognito-idp` endpoint (local emulators, tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognito_endpoint: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_pool_id: String::new(),
            user_pool_web_client_id: String::new(),
            oauth_domain: String::new(),
            oauth_redirect_sign_in: DEFAULT_REDIRECT_URL.to_string(),
            oauth_redirect_sign_out: DEFAULT_REDIRECT_URL.to_string(),
            authentication_flow_type: DEFAULT_AUTH_FLOW.to_string(),
            orcid_client_id: String::new(),
            orcid_api_host: DEFAULT_ORCID_API_HOST.to_string(),
            cognito_endpoint: None,
        }
    }
}

/// An external OIDC provider federated through the user pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcProvider {
    pub name: String,
    pub client_id: String,
    pub issuer_url: String,
}

impl AuthConfig {
    /// Both the pool id and the web client id are required for sign-in.
    pub fn is_configured(&self) -> bool {
        !self.user_pool_id.is_empty() && !self.user_pool_web_client_id.is_empty()
    }

    /// AWS region encoded in the pool id (`us-east-1_AbCdEf` -> `us-east-1`).
    pub fn cognito_region(&self) -> Option<&str> {
        self.user_pool_id
            .split_once('_')
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
    }

    /// Endpoint of the Cognito identity provider API.
    pub fn cognito_endpoint(&self) -> Option<String> {
        if let Some(endpoint) = &self.cognito_endpoint {
            return Some(endpoint.trim_end_matches('/').to_string());
        }
        self.cognito_region()
            .map(|region| format!("https://cognito-idp.{}.amazonaws.com", region))
    }

    pub fn oauth_scopes(&self) -> &'static [&'static str] {
        &["email", "openid", "profile"]
    }

    /// ORCID is offered as an external provider when its client id is set.
    pub fn external_oidc_providers(&self) -> Vec<OidcProvider> {
        if self.orcid_client_id.is_empty() {
            return Vec::new();
        }
        vec![OidcProvider {
            name: "ORCID".to_string(),
            client_id: self.orcid_client_id.clone(),
            issuer_url: self.orcid_api_host.clone(),
        }]
    }
}

/// Deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_domain: String,
    pub deploy_env: String,
    pub site_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_domain: "localhost".to_string(),
            deploy_env: "development".to_string(),
            site_url: DEFAULT_REDIRECT_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.deploy_env == "production"
    }
}

/// Route protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// When false the guard lets every navigation through without
    /// checking the session.
    pub guard_enabled: bool,
    /// Path roots requiring a signed-in session; sub-paths are covered too.
    pub protected_roots: Vec<String>,
    /// Where denied navigations are sent.
    pub redirect_to: String,
    /// Where a completed hosted-UI sign-in lands.
    pub sign_in_landing: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            guard_enabled: true,
            protected_roots: vec!["/dashboard".to_string()],
            redirect_to: "/".to_string(),
            sign_in_landing: "/dashboard".to_string(),
        }
    }
}

impl PortalConfig {
    /// API hosts eligible for `api_key` augmentation. Empty entries are
    /// dropped.
    pub fn trusted_hosts(&self) -> Vec<String> {
        [&self.api.api_host, &self.api.discover_api_host]
            .into_iter()
            .filter(|h| !h.is_empty())
            .cloned()
            .collect()
    }

    pub fn is_auth_configured(&self) -> bool {
        self.auth.is_configured()
    }

    pub fn is_production(&self) -> bool {
        self.app.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PortalConfig::default();
        assert_eq!(config.api.api_host, DEFAULT_API_HOST);
        assert_eq!(config.routes.protected_roots, vec!["/dashboard"]);
        assert!(config.routes.guard_enabled);
        assert!(!config.is_auth_configured());
        assert!(!config.is_production());
        assert_eq!(
            config.trusted_hosts(),
            vec![DEFAULT_API_HOST.to_string(), DEFAULT_DISCOVER_API_HOST.to_string()]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [auth]
            user_pool_id = "us-east-1_AbCdEf"
            user_pool_web_client_id = "client123"

            [routes]
            guard_enabled = false
        "#;
        let config: PortalConfig = toml::from_str(toml_str).unwrap();

        assert!(config.is_auth_configured());
        assert!(!config.routes.guard_enabled);
        assert_eq!(config.routes.redirect_to, "/");
        assert_eq!(config.api.discover_api_host, DEFAULT_DISCOVER_API_HOST);
        assert_eq!(config.auth.authentication_flow_type, DEFAULT_AUTH_FLOW);
    }

    #[test]
    fn test_cognito_endpoint() {
        let mut auth = AuthConfig {
            user_pool_id: "eu-west-2_Xyz".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(auth.cognito_region(), Some("eu-west-2"));
        assert_eq!(
            auth.cognito_endpoint().as_deref(),
            Some("https://cognito-idp.eu-west-2.amazonaws.com")
        );

        auth.cognito_endpoint = Some("http://127.0.0.1:9229/".to_string());
        assert_eq!(auth.cognito_endpoint().as_deref(), Some("http://127.0.0.1:9229"));

        let unset = AuthConfig::default();
        assert!(unset.cognito_endpoint().is_none());
    }

    #[test]
    fn test_orcid_provider_only_when_configured() {
        let mut auth = AuthConfig::default();
        assert!(auth.external_oidc_providers().is_empty());

        auth.orcid_client_id = "APP-123".to_string();
        let providers = auth.external_oidc_providers();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "ORCID");
        assert_eq!(providers[0].issuer_url, DEFAULT_ORCID_API_HOST);
    }

    #[test]
    fn test_trusted_hosts_skip_empty() {
        let mut config = PortalConfig::default();
        config.api.discover_api_host = String::new();
        assert_eq!(config.trusted_hosts(), vec![DEFAULT_API_HOST.to_string()]);
    }
}
