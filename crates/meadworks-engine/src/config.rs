//! Configuration for the accrual engine.
//!
//! [`BrewingConfig`] bundles the process-wide scalars every accrual
//! computation reads: the base experience rate, the base fermentation
//! period, and the treasury account that receives withheld claim tax.
//! Defaults match the original production deployment (14-day fermentation
//! period, one experience point per second).
//!
//! Configuration can be constructed directly, or loaded from YAML via
//! [`BrewingConfig::from_yaml_str`] / [`BrewingConfig::from_yaml_file`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use meadworks_types::AccountId;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Base fermentation period: 14 days in seconds.
const DEFAULT_FERMENTATION_PERIOD: u64 = 14 * 86_400;

/// Base experience accrual: one point per second.
const DEFAULT_EXPERIENCE_PER_SECOND: u64 = 1;

const fn default_fermentation_period() -> u64 {
    DEFAULT_FERMENTATION_PERIOD
}

const fn default_experience_per_second() -> u64 {
    DEFAULT_EXPERIENCE_PER_SECOND
}

const fn default_treasury() -> AccountId {
    AccountId::nil()
}

/// Process-wide accrual configuration.
///
/// Per-unit basis-point multipliers are applied on top of these scalars;
/// the scalars themselves change only through explicit reconfiguration
/// calls on the brewhouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrewingConfig {
    /// Base experience points accrued per second (default: 1).
    #[serde(default = "default_experience_per_second")]
    pub base_experience_per_second: u64,

    /// Base fermentation period in seconds (default: 14 days).
    #[serde(default = "default_fermentation_period")]
    pub base_fermentation_period: u64,

    /// Account that receives the withheld portion of claim tax
    /// (default: the nil account -- embedders are expected to set this).
    #[serde(default = "default_treasury")]
    pub treasury: AccountId,
}

impl Default for BrewingConfig {
    fn default() -> Self {
        Self {
            base_experience_per_second: DEFAULT_EXPERIENCE_PER_SECOND,
            base_fermentation_period: DEFAULT_FERMENTATION_PERIOD,
            treasury: AccountId::nil(),
        }
    }
}

impl BrewingConfig {
    /// Parse configuration from a YAML string.
    ///
    /// Missing fields fall back to their documented defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the content is not valid YAML or
    /// does not match the expected structure.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(content)?)
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it cannot be parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}
