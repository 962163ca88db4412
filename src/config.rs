//! Configuration System
//!
//! Run parameters for the generation pipeline, loaded from an optional TOML
//! file layered with `SAASGEN_*` environment overrides. Every field has a
//! default, so a missing file yields a fully usable configuration.

use crate::logging::LoggingConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration for one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Number of users to seed
    #[serde(default = "default_user_count")]
    pub user_count: usize,

    /// RNG seed; unset means a fresh entropy source per run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Earliest possible signup date in the seeded cohort
    #[serde(default = "default_signup_window_start")]
    pub signup_window_start: NaiveDate,

    /// Reference "now"; unset means the wall clock at run time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<NaiveDate>,

    /// Plan assignment weights, one per catalog plan in ascending id order
    #[serde(default = "default_plan_mix")]
    pub plan_mix: Vec<f64>,

    /// Cap on sampled usage occasions per subscription period
    #[serde(default = "default_max_occasions")]
    pub max_occasions_per_subscription: usize,

    /// Chance a free-plan sampled day produces no usage event
    #[serde(default = "default_free_plan_skip_probability")]
    pub free_plan_skip_probability: f64,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_user_count() -> usize {
    1000
}

fn default_signup_window_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 1).unwrap_or_default()
}

fn default_plan_mix() -> Vec<f64> {
    vec![0.33, 0.27, 0.18, 0.16, 0.06]
}

fn default_max_occasions() -> usize {
    60
}

fn default_free_plan_skip_probability() -> f64 {
    0.3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            user_count: default_user_count(),
            seed: None,
            signup_window_start: default_signup_window_start(),
            reference_date: None,
            plan_mix: default_plan_mix(),
            max_occasions_per_subscription: default_max_occasions(),
            free_plan_skip_probability: default_free_plan_skip_probability(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GenerationConfig {
    /// Validate cross-field constraints not expressible through serde
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plan_mix.is_empty() {
            return Err(ConfigError::Invalid("plan_mix must not be empty".to_string()));
        }
        if self
            .plan_mix
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(ConfigError::Invalid(
                "plan_mix weights must be finite and non-negative".to_string(),
            ));
        }
        if self.plan_mix.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::Invalid(
                "plan_mix weights must not all be zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.free_plan_skip_probability) {
            return Err(ConfigError::Invalid(
                "free_plan_skip_probability must lie in [0, 1]".to_string(),
            ));
        }
        if self.max_occasions_per_subscription == 0 {
            return Err(ConfigError::Invalid(
                "max_occasions_per_subscription must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loader layering file, environment, and defaults
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional TOML file plus `SAASGEN_*`
    /// environment overrides (e.g. `SAASGEN_USER_COUNT=50`).
    pub fn load(path: Option<&Path>) -> Result<GenerationConfig, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("SAASGEN").separator("__"))
            .build()?;

        let loaded: GenerationConfig = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Render the default configuration as a TOML document
    pub fn default_toml() -> Result<String, ConfigError> {
        toml::to_string_pretty(&GenerationConfig::default())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
