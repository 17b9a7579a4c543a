//! Configuration management for livetrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::update_log::DEFAULT_LOG_CAPACITY;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "livetrack";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "LIVETRACK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LIVETRACK_`, sections split on `__`)
/// 2. TOML config file at `~/.config/livetrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shipment feed configuration.
    pub feed: FeedConfig,
    /// Inventory feed configuration.
    pub inventory: InventoryConfig,
}

/// Shipment feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Period between generated events in milliseconds.
    pub interval_ms: u64,
    /// Number of updates kept in the log.
    pub log_capacity: usize,
    /// Tracking codes seeded at session start, in order.
    pub tracking_numbers: Vec<String>,
    /// Fixed seed for reproducible feeds. Unset uses the thread RNG.
    pub seed: Option<u64>,
}

/// Inventory feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Period between perturbations in milliseconds.
    pub interval_ms: u64,
    /// Chance that any one item changes on a tick.
    pub change_probability: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_ms: 6_000,
            log_capacity: DEFAULT_LOG_CAPACITY,
            tracking_numbers: default_tracking_numbers(),
            seed: None,
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            change_probability: 0.3,
            seed: None,
        }
    }
}

/// Tracking codes the demo feed starts with.
fn default_tracking_numbers() -> Vec<String> {
    (1..=4).map(|n| format!("SHP-2024-{n:03}")).collect()
}

impl FeedConfig {
    /// Get the event interval as a Duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl InventoryConfig {
    /// Get the perturbation interval as a Duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `LIVETRACK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config = Self::figment(&config_file).extract::<Self>()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.feed.interval_ms == 0 {
            return Err(Error::config_validation(
                "feed.interval_ms must be greater than 0",
            ));
        }

        if self.feed.log_capacity == 0 {
            return Err(Error::config_validation(
                "feed.log_capacity must be greater than 0",
            ));
        }

        if self.feed.tracking_numbers.is_empty() {
            return Err(Error::config_validation(
                "feed.tracking_numbers must not be empty",
            ));
        }

        if let Some(blank) = self
            .feed
            .tracking_numbers
            .iter()
            .position(|code| code.trim().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: format!("feed.tracking_numbers[{blank}] is blank"),
            });
        }

        if self.inventory.interval_ms == 0 {
            return Err(Error::config_validation(
                "inventory.interval_ms must be greater than 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.inventory.change_probability) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "inventory.change_probability ({}) must be between 0 and 1",
                    self.inventory.change_probability
                ),
            });
        }

        Ok(())
    }
}
