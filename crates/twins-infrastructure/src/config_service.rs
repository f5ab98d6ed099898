//! Configuration service implementation.
//!
//! Loads [`TwinsConfig`] from `config.toml` and applies environment
//! overrides. A missing file is not an error: every field has a default.

use std::path::{Path, PathBuf};

use twins_core::config::TwinsConfig;
use twins_core::error::{Result, TwinsError};

use crate::paths::TwinsPaths;

/// Overrides `service.base_url`.
pub const ENV_API_URL: &str = "TWINS_API_URL";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
}

impl ConfigService {
    /// Uses the platform config file (`~/.config/twins/config.toml`).
    pub fn new() -> Self {
        Self {
            path: TwinsPaths::config_file().ok(),
        }
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the configuration and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if a value fails [`TwinsConfig::validate`].
    pub fn load(&self) -> Result<TwinsConfig> {
        let config = match &self.path {
            Some(path) => Self::load_file(path)?,
            None => {
                tracing::debug!("no config directory available, using defaults");
                TwinsConfig::default()
            }
        };
        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<TwinsConfig> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(TwinsConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            TwinsError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(mut config: TwinsConfig, lookup: F) -> TwinsConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.service.base_url = url;
        }
        config
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use twins_core::config::DEFAULT_BASE_URL;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = ConfigService::load_file(service.path().unwrap()).unwrap();
        assert_eq!(config, TwinsConfig::default());
    }

    #[test]
    fn test_loads_file_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[orchestrator]\npoll_timeout_secs = 30\n\n[history]\ncapacity = 10\n",
        )
        .unwrap();

        let config = ConfigService::load_file(&path).unwrap();
        assert_eq!(config.orchestrator.poll_timeout_secs, 30);
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[orchestrator\n").unwrap();

        let err = ConfigService::load_file(&path).unwrap_err();
        assert!(matches!(err, TwinsError::Config(_)));
    }

    #[test]
    fn test_load_rejects_zero_intervals() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[orchestrator]\npoll_interval_ms = 0\n").unwrap();

        let err = ConfigService::with_path(&path).load().unwrap_err();
        assert!(matches!(err, TwinsError::Config(_)));
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        let config = ConfigService::apply_env_overrides(TwinsConfig::default(), |key| {
            (key == ENV_API_URL).then(|| "http://remote:8000".to_string())
        });
        assert_eq!(config.service.base_url, "http://remote:8000");

        let untouched = ConfigService::apply_env_overrides(TwinsConfig::default(), |_| None);
        assert_eq!(untouched.service.base_url, DEFAULT_BASE_URL);
    }
}
