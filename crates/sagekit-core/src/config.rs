//! Client configuration file support.
//!
//! Wait, retry and list settings are read from a TOML file; every section
//! and key is optional and falls back to the built-in defaults.

use crate::retry::RetryPolicy;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read or write the configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Log filter applied when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    pub wait: WaitConfig,
    pub retry: RetryConfig,
    pub list: ListConfig,
}

/// Defaults for `wait`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub poll_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    pub backoff_multiplier: f64,
    pub max_poll_interval_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self { poll_interval_secs: 5, timeout_secs: None, backoff_multiplier: 1.0, max_poll_interval_secs: 60 }
    }
}

impl WaitConfig {
    #[must_use]
    pub fn to_options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
            backoff_multiplier: self.backoff_multiplier,
            max_poll_interval: Duration::from_secs(self.max_poll_interval_secs),
        }
    }
}

/// Throttling retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 4, initial_delay_ms: 200, max_delay_ms: 5000, multiplier: 2.0 }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.multiplier,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// `MaxResults` sent when the caller's filters leave it unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(format!("Failed to serialize: {}", e)))
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml_string()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::ReadError(format!("Failed to create directory: {}", e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("Failed to write file: {}", e)))?;

        Ok(())
    }

    /// Get default configuration file path (`~/.sagekit/config.toml`).
    pub fn default_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".sagekit")
            .join("config.toml")
    }

    /// Loads `path` if given, otherwise the default file if it exists, otherwise defaults.
    pub fn discover(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::load_from_file(&Self::default_path()) {
                Err(ConfigError::NotFound(_)) => Ok(Self::default()),
                other => other,
            },
        }
    }

    /// Checks values a client cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        let wait = &self.wait;
        if wait.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue("wait.poll_interval_secs must be greater than 0".to_string()));
        }
        if !wait.backoff_multiplier.is_finite() || wait.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue("wait.backoff_multiplier must be >= 1.0".to_string()));
        }
        if wait.max_poll_interval_secs < wait.poll_interval_secs {
            return Err(ConfigError::InvalidValue(
                "wait.max_poll_interval_secs must be >= wait.poll_interval_secs".to_string(),
            ));
        }
        if wait.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue("wait.timeout_secs must be greater than 0".to_string()));
        }

        let retry = &self.retry;
        if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
            return Err(ConfigError::InvalidValue("retry.multiplier must be >= 1.0".to_string()));
        }
        if retry.max_delay_ms < retry.initial_delay_ms {
            return Err(ConfigError::InvalidValue(
                "retry.max_delay_ms must be >= retry.initial_delay_ms".to_string(),
            ));
        }

        if self.list.page_size == Some(0) {
            return Err(ConfigError::InvalidValue("list.page_size must be greater than 0".to_string()));
        }
        Ok(())
    }
}
