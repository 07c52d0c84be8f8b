//! Configuration management for the Field Analytics Engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with FAE_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::knowledge::KnowledgeBase;

/// Main engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Variable-rate application planner settings
    pub planner: PlannerConfig,

    /// Yield forecast defaults
    pub forecast: ForecastConfig,

    /// Reference table source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    /// Application service fee per hectare
    pub service_fee_per_hectare: f64,

    /// Base rate used when the type/crop pair has no reference rate
    pub default_base_rate: f64,

    /// Fail instead of falling back to the default base rate
    pub reject_unsupported_application: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Used when the weather snapshot carries no rainfall adequacy
    pub default_rainfall_adequacy: f64,

    /// Used when the soil snapshot carries no drainage quality
    pub default_drainage_quality: f64,

    /// Used when the season carries no weather certainty
    pub default_weather_certainty: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KnowledgeConfig {
    /// JSON file replacing the built-in reference tables
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FAE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("planner.service_fee_per_hectare", 25.0)?
            .set_default("planner.default_base_rate", 100.0)?
            .set_default("planner.reject_unsupported_application", false)?
            .set_default("forecast.default_rainfall_adequacy", 0.8)?
            .set_default("forecast.default_drainage_quality", 0.8)?
            .set_default("forecast.default_weather_certainty", 0.7)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FAE_ prefix)
            .add_source(
                Environment::with_prefix("FAE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reference tables from the configured file, or the built-in tables
    pub fn knowledge_base(&self) -> AnalyticsResult<KnowledgeBase> {
        match &self.knowledge.path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    AnalyticsError::Configuration(format!("cannot read {}: {}", path, e))
                })?;
                let knowledge: KnowledgeBase = serde_json::from_str(&raw)?;
                tracing::info!(path = %path, crops = knowledge.crops.len(), "Loaded reference tables");
                Ok(knowledge)
            }
            None => Ok(KnowledgeBase::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            planner: PlannerConfig::default(),
            forecast: ForecastConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            service_fee_per_hectare: 25.0,
            default_base_rate: 100.0,
            reject_unsupported_application: false,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_rainfall_adequacy: 0.8,
            default_drainage_quality: 0.8,
            default_weather_certainty: 0.7,
        }
    }
}
