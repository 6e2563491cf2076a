//! Application layer for the I3H portal.
//!
//! Coordinates the session store, the identity provider and the Pennsieve
//! API: profile loading, URL token augmentation, route protection and
//! session event handling.

pub mod events;
pub mod guard;
pub mod portal;
pub mod profile;
pub mod url_token;

#[cfg(test)]
pub(crate) mod test_support;

pub use events::AuthEventHandler;
pub use guard::RouteGuard;
pub use portal::PortalSession;
pub use profile::{ProfileFetcher, ProfileSnapshot};
pub use url_token::UrlTokenAugmenter;
