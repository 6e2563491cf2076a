//! Injectable auth state store.

use super::state::AuthState;
use crate::user::{Organization, User};
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable handle to one session's [`AuthState`].
///
/// Every clone observes and mutates the same state. Mutations are
/// synchronous single-step updates; subscribers are notified after each one.
/// The store performs no I/O.
#[derive(Debug, Clone)]
pub struct AuthStore {
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthStore {
    /// Creates a store holding an empty, signed-out state.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(AuthState::default());
        Self {
            state: Arc::new(sender),
        }
    }

    // ============================================================================
    // Mutators
    // ============================================================================

    /// Sets `is_auth_loading`. Subscribers are only notified on a change.
    pub fn set_loading(&self, is_loading: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.is_auth_loading != is_loading;
            s.is_auth_loading = is_loading;
            changed
        });
    }

    /// Replaces the last error message.
    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|s| s.auth_error = error);
    }

    /// Replaces the access token.
    pub fn set_token(&self, token: Option<String>) {
        self.state.send_modify(|s| s.auth_token = token);
    }

    /// Stores the signed-in user's profile.
    pub fn update_profile(&self, profile: User) {
        self.state.send_modify(|s| s.profile = Some(profile));
    }

    /// Replaces the workspace list.
    pub fn update_workspaces(&self, workspaces: Vec<Organization>) {
        self.state.send_modify(|s| s.workspaces = workspaces);
    }

    /// Resets profile, workspaces, token and error in one step.
    /// `is_auth_loading` is left untouched.
    pub fn clear_state(&self) {
        self.state.send_modify(AuthState::clear);
    }

    /// Populates the session from a successful profile fetch in one step.
    pub fn apply_profile(&self, profile: User, workspaces: Vec<Organization>, token: String) {
        self.state.send_modify(|s| {
            s.profile = Some(profile);
            s.workspaces = workspaces;
            s.auth_token = Some(token);
        });
    }

    /// Clears the session and records `message` as the last error in one step.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|s| {
            s.clear();
            s.auth_error = Some(message);
        });
    }

    // ============================================================================
    // Views
    // ============================================================================

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// True while a profile is present.
    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_signed_in()
    }

    /// True while a profile fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_auth_loading
    }

    /// Returns the last error message, if any.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().auth_error.clone()
    }

    /// Returns the access token of the current session, if any.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().auth_token.clone()
    }

    /// Returns a copy of the signed-in user's profile.
    pub fn profile(&self) -> Option<User> {
        self.state.borrow().profile.clone()
    }

    /// Returns a copy of the workspace list.
    pub fn workspaces(&self) -> Vec<Organization> {
        self.state.borrow().workspaces.clone()
    }

    /// Returns the short name, e.g. `J. Doe`.
    pub fn display_name(&self) -> String {
        self.state.borrow().display_name()
    }

    /// Returns first and last name joined by a space.
    pub fn full_name(&self) -> String {
        self.state.borrow().full_name()
    }

    /// Returns the profile email, or an empty string when signed out.
    pub fn email(&self) -> String {
        self.state.borrow().email().to_string()
    }

    /// Returns the upper-case initials.
    pub fn initials(&self) -> String {
        self.state.borrow().initials()
    }

    /// Returns the preferred workspace, else the first one.
    pub fn primary_workspace(&self) -> Option<Organization> {
        self.state.borrow().primary_workspace().cloned()
    }

    // ============================================================================
    // Change notification
    // ============================================================================

    /// Returns a receiver that is notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Resolves once no profile fetch is in flight.
    ///
    /// Readers should await this before trusting `profile` or `auth_error`.
    pub async fn wait_until_settled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here.
        let _ = rx.wait_for(|s| !s.is_auth_loading).await;
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}
