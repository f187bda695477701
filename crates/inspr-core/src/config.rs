//! Control-plane configuration
//!
//! Parsed from TOML. Every section is optional.
//!
//! ```toml
//! [brokers]
//! available = ["kafka"]
//! default = "kafka"
//!
//! [transaction]
//! timeout_ms = 5000
//!
//! [logging]
//! profile = "production"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::brokers::StaticBrokers;
use crate::errors::{ExError, ExErrorKind};
use crate::logging_facility::Profile;

/// Overrides `brokers.default`
pub const ENV_DEFAULT_BROKER: &str = "INSPR_DEFAULT_BROKER";

/// Overrides `transaction.timeout_ms`
pub const ENV_TRANSACTION_TIMEOUT_MS: &str = "INSPR_TRANSACTION_TIMEOUT_MS";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsprConfig {
    #[serde(default)]
    pub brokers: BrokersConfig,

    #[serde(default)]
    pub transaction: TransactionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BrokersConfig {
    #[serde(default)]
    pub available: Vec<String>,

    /// Empty means the first available broker
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Deadline for acquiring the writer lock
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
        }
    }
}

fn default_profile() -> String {
    "development".to_string()
}

impl InsprConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the default broker is
    /// not listed as available.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `INSPR_*` environment overrides and re-validate
    ///
    /// # Errors
    ///
    /// Returns an error if an override is malformed or breaks validation.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (tests use a map)
    ///
    /// # Errors
    ///
    /// Returns an error if an override is malformed or breaks validation.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(broker) = lookup(ENV_DEFAULT_BROKER) {
            self.brokers.default = broker;
        }
        if let Some(raw) = lookup(ENV_TRANSACTION_TIMEOUT_MS) {
            self.transaction.timeout_ms = raw.parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "{} must be a number of milliseconds, got '{}'",
                    ENV_TRANSACTION_TIMEOUT_MS, raw
                ))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error when the default broker is not available, the
    /// timeout is zero or the logging profile is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let default = &self.brokers.default;
        if !default.is_empty() && !self.brokers.available.contains(default) {
            return Err(ConfigError::Validation(format!(
                "default broker '{}' is not in the available list",
                default
            )));
        }
        if self.transaction.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "transaction.timeout_ms must be greater than zero".to_string(),
            ));
        }
        self.logging_profile()?;
        Ok(())
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction.timeout_ms)
    }

    /// # Errors
    ///
    /// Returns an error if the profile name is unknown.
    pub fn logging_profile(&self) -> Result<Profile, ConfigError> {
        self.logging
            .profile
            .parse()
            .map_err(ConfigError::Validation)
    }

    /// Broker registry described by the `[brokers]` section
    pub fn broker_registry(&self) -> StaticBrokers {
        let mut registry = StaticBrokers::with_brokers(self.brokers.available.iter().cloned());
        if !self.brokers.default.is_empty() {
            // validate() guarantees the default is registered
            let _ = registry.set_default(&self.brokers.default);
        }
        registry
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let kind = match &err {
            ConfigError::Io(_) => ExErrorKind::Io,
            ConfigError::Serialize(_) => ExErrorKind::Serialization,
            ConfigError::Parse(_) | ConfigError::Validation(_) => ExErrorKind::InvalidConfig,
        };
        ExError::new(kind)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}
