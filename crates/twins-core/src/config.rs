//! Configuration model.
//!
//! Mirrors `config.toml`. Every field has a default so a partial (or
//! missing) file is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TwinsError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_HISTORY_KEY: &str = "dt_sessions";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TwinsConfig {
    pub service: ServiceConfig,
    pub orchestrator: OrchestratorConfig,
    pub availability: AvailabilityConfig,
    pub history: HistoryConfig,
}

impl TwinsConfig {
    /// Rejects values the runtime cannot honor.
    ///
    /// # Errors
    ///
    /// Returns `TwinsError::Config` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("orchestrator.poll_interval_ms", self.orchestrator.poll_interval_ms),
            ("orchestrator.poll_timeout_secs", self.orchestrator.poll_timeout_secs),
            ("availability.probe_interval_secs", self.availability.probe_interval_secs),
            ("service.request_timeout_secs", self.service.request_timeout_secs),
        ];
        if let Some((key, _)) = checks.iter().find(|(_, value)| *value == 0) {
            return Err(TwinsError::config(format!("{} must be greater than zero", key)));
        }
        if self.orchestrator.max_personas_per_run == Some(0) {
            return Err(TwinsError::config(
                "orchestrator.max_personas_per_run must be at least 1",
            ));
        }
        if self.history.capacity == 0 {
            return Err(TwinsError::config("history.capacity must be at least 1"));
        }
        Ok(())
    }
}

/// Remote generation service settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Free-form context sent with every submission
    pub context: String,
    pub use_heygen_voice: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            context: String::new(),
            use_heygen_voice: false,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Unit revealed per tick by the streaming presenter.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RevealGranularity {
    #[default]
    Word,
    Char,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
    pub reveal_tick_ms: u64,
    pub reveal_granularity: RevealGranularity,
    /// Upper bound on personas per run; `None` allows any N >= 1
    pub max_personas_per_run: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            poll_timeout_secs: 120,
            reveal_tick_ms: 25,
            reveal_granularity: RevealGranularity::Word,
            max_personas_per_run: None,
        }
    }
}

impl OrchestratorConfig {
    /// Never zero; a zero setting is treated as 1 ms.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn reveal_tick(&self) -> Duration {
        Duration::from_millis(self.reveal_tick_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub probe_interval_secs: u64,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            probe_interval_secs: 15,
        }
    }
}

impl AvailabilityConfig {
    /// Never zero; a zero setting is treated as 1 s.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs.max(1))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub storage_key: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50,
            storage_key: DEFAULT_HISTORY_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TwinsConfig = toml::from_str(
            r#"
            [service]
            base_url = "http://twins.internal:9000"

            [orchestrator]
            reveal_granularity = "char"
            "#,
        )
        .unwrap();

        assert_eq!(config.service.base_url, "http://twins.internal:9000");
        assert_eq!(config.service.request_timeout_secs, 30);
        assert_eq!(config.orchestrator.reveal_granularity, RevealGranularity::Char);
        assert_eq!(config.orchestrator.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.orchestrator.poll_timeout(), Duration::from_secs(120));
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.history.storage_key, "dt_sessions");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: TwinsConfig = toml::from_str("").unwrap();
        assert_eq!(config, TwinsConfig::default());
        assert!(config.orchestrator.max_personas_per_run.is_none());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(TwinsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_intervals_are_rejected() {
        let config: TwinsConfig = toml::from_str("[orchestrator]\npoll_interval_ms = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TwinsError::Config(ref m) if m.contains("poll_interval_ms")));

        let config: TwinsConfig =
            toml::from_str("[availability]\nprobe_interval_secs = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TwinsError::Config(ref m) if m.contains("probe_interval_secs")));
    }

    #[test]
    fn test_zero_interval_accessors_never_return_zero() {
        let orchestrator = OrchestratorConfig {
            poll_interval_ms: 0,
            ..OrchestratorConfig::default()
        };
        assert_eq!(orchestrator.poll_interval(), Duration::from_millis(1));

        let availability = AvailabilityConfig {
            probe_interval_secs: 0,
        };
        assert_eq!(availability.probe_interval(), Duration::from_secs(1));
    }
}
