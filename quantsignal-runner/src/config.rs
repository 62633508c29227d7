//! Pipeline configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! [pipeline]
//! max_workers = 4
//! rsi_padding_days = 90
//! ma_padding_days = 60
//! quote_lookback_days = 7
//!
//! [screening]
//! value_momentum_sample = 50
//! simple_value_sample = 200
//! pool_size = 10
//!
//! [reference]
//! min_refresh_interval_secs = 300
//! ```
//!
//! Strategy parameters are not configured here; they arrive per request.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or validating a pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub pipeline: ExecutionSettings,
    pub screening: ScreeningSettings,
    pub reference: ReferenceSettings,
}

/// Worker pool size and history windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionSettings {
    /// Per-instrument worker pool size. 1 runs sequentially.
    pub max_workers: usize,
    /// Calendar days added to the RSI period when requesting bars.
    pub rsi_padding_days: u32,
    /// Calendar days added to `long_ma_period + 1` when requesting bars.
    pub ma_padding_days: u32,
    /// How far back to look for a closing price when no valuation quote exists.
    pub quote_lookback_days: u32,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            max_workers: 4,
            rsi_padding_days: 90,
            ma_padding_days: 60,
            quote_lookback_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreeningSettings {
    /// Instruments taken from the head of the universe for value-momentum.
    pub value_momentum_sample: usize,
    /// Instruments taken from the head of the universe for the simple value screen.
    pub simple_value_sample: usize,
    /// Ranked pool size.
    pub pool_size: usize,
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self {
            value_momentum_sample: 50,
            simple_value_sample: 200,
            pool_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceSettings {
    pub min_refresh_interval_secs: u64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            min_refresh_interval_secs: 300,
        }
    }
}

impl ReferenceSettings {
    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.min_refresh_interval_secs)
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.max_workers == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.max_workers must be at least 1".into(),
            ));
        }
        if self.screening.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "screening.pool_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
