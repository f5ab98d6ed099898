//! Unified path management for twins configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/twins/             # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/twins/        # Data directory
//! └── storage/                 # Key-value store (one JSON file per key)
//!     └── dt_sessions.json     # Session history
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "twins";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves platform-appropriate locations (XDG on Linux, the platform
/// equivalents elsewhere).
pub struct TwinsPaths;

impl TwinsPaths {
    /// Returns the twins configuration directory (e.g. `~/.config/twins/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the twins data directory (e.g. `~/.local/share/twins/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the root directory of the file-backed key-value store.
    pub fn storage_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("storage"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_nested_under_app_dir() {
        if let (Ok(config), Ok(storage)) = (TwinsPaths::config_file(), TwinsPaths::storage_dir()) {
            assert!(config.ends_with("twins/config.toml"));
            assert!(storage.ends_with("twins/storage"));
        }
    }
}
