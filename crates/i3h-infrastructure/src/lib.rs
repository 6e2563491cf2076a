//! Infrastructure for the I3H portal: configuration files, session
//! persistence, the reqwest JSON client and identity providers.

pub mod cognito;
pub mod config_service;
pub mod http_client;
pub mod paths;
pub mod session_storage;
pub mod static_provider;

pub use crate::cognito::CognitoIdentityProvider;
pub use crate::config_service::ConfigService;
pub use crate::http_client::ReqwestJsonClient;
pub use crate::paths::PortalPaths;
pub use crate::session_storage::{SessionStorage, StoredSession};
pub use crate::static_provider::StaticIdentityProvider;
