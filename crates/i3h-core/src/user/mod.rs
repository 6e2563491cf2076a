//! User domain module.
//!
//! Identity-service records describing the signed-in user and the
//! organizations (workspaces) they belong to.
//!
//! # Usage
//!
//! ```ignore
//! use i3h_core::user::{User, Organization, OrganizationsResponse};
//! ```

mod model;

// Re-export public API
pub use model::{Organization, OrganizationsResponse, User};
