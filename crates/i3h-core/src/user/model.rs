//! User and organization domain models.
//!
//! Wire format is the camelCase JSON returned by the profile API.

use serde::{Deserialize, Serialize};

/// The authenticated user's profile.
///
/// Only `id` is mandatory on the wire; the profile service omits empty
/// fields for some federated (ORCID) accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable user identifier
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Organization the user selected as their default workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_organization_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl User {
    /// Creates a user with only identity and name fields populated.
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: String::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            preferred_organization_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_preferred_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.preferred_organization_id = Some(organization_id.into());
        self
    }
}

/// An organization (workspace) the user is a member of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Membership role, e.g. "owner" or "viewer"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            slug: String::new(),
            role: None,
        }
    }
}

/// Body of `GET /organizations`.
///
/// A missing `organizations` field decodes as an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: Vec<Organization>,
}
