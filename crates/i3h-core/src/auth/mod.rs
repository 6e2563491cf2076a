//! Authentication state domain module.
//!
//! # Module Structure
//!
//! - `state`: The `AuthState` snapshot and its derived views
//! - `store`: `AuthStore`, the shared injectable handle over one session
//! - `prompt`: `LoginPrompt`, sign-in prompt state
//! - `event`: `AuthEvent`, identity provider notifications
//!
//! # Usage
//!
//! ```ignore
//! use i3h_core::auth::{AuthState, AuthStore};
//! ```

mod event;
mod prompt;
mod state;
mod store;

// Re-export public API
pub use event::AuthEvent;
pub use prompt::LoginPrompt;
pub use state::AuthState;
pub use store::AuthStore;
