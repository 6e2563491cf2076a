//! Domain layer of the I3H portal session core.
//!
//! Holds the auth state store, the identity and HTTP contracts, the
//! configuration model and route classification. Nothing here performs I/O;
//! implementations live in `i3h-infrastructure` and orchestration in
//! `i3h-application`.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod route;
pub mod user;

// Re-export common error type
pub use error::{PortalError, Result};
