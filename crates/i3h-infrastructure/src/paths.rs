//! Path management for portal configuration and session files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/i3h-portal/        # Config directory (platform config dir + app name)
//! ├── config.toml              # PortalConfig
//! └── session.json             # Stored identity provider session (0600)
//! ```

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "i3h-portal";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for i3h_core::PortalError {
    fn from(e: PathError) -> Self {
        i3h_core::PortalError::config(e.to_string())
    }
}

/// Resolves portal file locations.
///
/// With a base path every file lives directly under it; without one the
/// platform config directory (`dirs::config_dir`) plus `i3h-portal` is used.
#[derive(Debug, Clone, Default)]
pub struct PortalPaths {
    base: Option<PathBuf>,
}

impl PortalPaths {
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            base: base_path.map(Path::to_path_buf),
        }
    }

    /// Returns the portal configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/i3h-portal/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the stored session file.
    ///
    /// # Security Note
    ///
    /// The file holds refresh tokens; `SessionStorage` writes it with 600
    /// permissions on Unix.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_path_override() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let paths = PortalPaths::new(Some(temp_dir.path()));

        assert_eq!(paths.config_dir().unwrap(), temp_dir.path());
        assert_eq!(
            paths.config_file().unwrap(),
            temp_dir.path().join("config.toml")
        );
        assert_eq!(
            paths.session_file().unwrap(),
            temp_dir.path().join("session.json")
        );
    }

    #[test]
    fn test_default_dir_is_app_scoped() {
        // Hosts without a config dir (bare CI containers) have nothing to check.
        if let Ok(dir) = PortalPaths::default().config_dir() {
            assert!(dir.ends_with(APP_DIR_NAME));
        }
    }
}
