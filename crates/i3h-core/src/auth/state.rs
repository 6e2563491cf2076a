//! Authentication state snapshot and its derived views.

use crate::user::{Organization, User};
use serde::{Deserialize, Serialize};

/// The authenticated-user state shared across the portal.
///
/// `profile` is the single source of truth for "signed in"; the token and
/// workspace list are only meaningful while a profile is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub profile: Option<User>,
    #[serde(default)]
    pub workspaces: Vec<Organization>,
    pub auth_token: Option<String>,
    #[serde(default)]
    pub is_auth_loading: bool,
    pub auth_error: Option<String>,
}

impl AuthState {
    /// Creates an empty, signed-out state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signed_in(&self) -> bool {
        self.profile.is_some()
    }

    /// First initial and last name, e.g. `"J. Doe"`. Empty when signed out.
    pub fn display_name(&self) -> String {
        let Some(profile) = &self.profile else {
            return String::new();
        };
        let initial = first_char(&profile.first_name);
        format!("{}. {}", initial, profile.last_name)
    }

    pub fn full_name(&self) -> String {
        let Some(profile) = &self.profile else {
            return String::new();
        };
        format!("{} {}", profile.first_name, profile.last_name)
            .trim()
            .to_string()
    }

    pub fn email(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.email.as_str())
            .unwrap_or("")
    }

    pub fn initials(&self) -> String {
        let Some(profile) = &self.profile else {
            return String::new();
        };
        format!(
            "{}{}",
            first_char(&profile.first_name),
            first_char(&profile.last_name)
        )
        .to_uppercase()
    }

    /// The workspace matching the profile's preferred organization, falling
    /// back to the first workspace.
    pub fn primary_workspace(&self) -> Option<&Organization> {
        let preferred = self
            .profile
            .as_ref()
            .and_then(|p| p.preferred_organization_id.as_deref());

        preferred
            .and_then(|id| self.workspaces.iter().find(|w| w.id == id))
            .or_else(|| self.workspaces.first())
    }

    /// Resets profile, workspaces, token and error. `is_auth_loading` is
    /// owned by the fetch lifecycle and left as is.
    pub(crate) fn clear(&mut self) {
        self.profile = None;
        self.workspaces.clear();
        self.auth_token = None;
        self.auth_error = None;
    }
}

fn first_char(s: &str) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}
