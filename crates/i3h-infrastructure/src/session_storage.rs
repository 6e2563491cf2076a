//! Stored identity provider session.
//!
//! Persists the tokens issued by the user pool as `session.json` so a
//! session survives process restarts the way the browser portal keeps it in
//! a cookie.

use chrono::{DateTime, Duration, Utc};
use i3h_core::error::{PortalError, Result};
use std::io::Write;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lifetime assumed when the provider does not report one.
pub const DEFAULT_SESSION_DAYS: i64 = 7;

/// Tokens of one provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// When `access_token` stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl StoredSession {
    /// Creates a session whose access token expires `expires_in_secs` from
    /// now, or after [`DEFAULT_SESSION_DAYS`] when unknown.
    ///
    /// A negative lifetime, or one that overflows the calendar, is a
    /// provider error.
    pub fn issued_now(
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
    ) -> Result<Self> {
        let invalid = || {
            PortalError::provider(format!(
                "invalid expires_in: {}",
                expires_in_secs.unwrap_or_default()
            ))
        };
        let lifetime = match expires_in_secs {
            None => Duration::days(DEFAULT_SESSION_DAYS),
            Some(secs) if secs < 0 => return Err(invalid()),
            Some(secs) => Duration::try_seconds(secs).ok_or_else(invalid)?,
        };
        let expires_at = Utc::now().checked_add_signed(lifetime).ok_or_else(invalid)?;

        Ok(Self {
            access_token: access_token.into(),
            id_token: None,
            refresh_token: None,
            expires_at,
        })
    }

    /// True once `now + skew` reaches the expiry.
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        now + skew >= self.expires_at
    }
}

/// JSON file storage for [`StoredSession`].
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Writes the session with user-only permissions.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Created user read/write only on Unix, never readable by others
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten a file left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Removes the stored session. Removing a missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
