//! Application configuration.
//!
//! Sources are layered in this order, later ones winning:
//! 1. Built-in defaults
//! 2. `config/default.toml`, or the file passed explicitly (which must exist)
//! 3. Environment variables `PHARMASTOCK__*` (`__` separates nested keys,
//!    e.g. `PHARMASTOCK__FORECAST__SAFETY_Z=1.64`)

use std::path::{Path, PathBuf};

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use pharmastock_core::DomainError;
use pharmastock_forecast::ForecastPolicy;
use pharmastock_inventory::StockLevelPolicy;
pub use pharmastock_observability::LogConfig;
use pharmastock_observability::LogConfigError;

pub const ENV_PREFIX: &str = "PHARMASTOCK";
const DEFAULT_FILE: &str = "config/default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Historical order CSV.
    pub dataset_path: PathBuf,
    /// JSON array of medication drafts loaded into the inventory at startup.
    pub inventory_path: PathBuf,
    pub forecast: ForecastPolicy,
    pub stock_levels: StockLevelPolicy,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/pharmacy_dataset.csv"),
            inventory_path: PathBuf::from("data/inventory.json"),
            forecast: ForecastPolicy::default(),
            stock_levels: StockLevelPolicy::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("configuration validation failed: {0}")]
    Invalid(#[from] DomainError),

    #[error("configuration validation failed: {0}")]
    Log(#[from] LogConfigError),
}

impl AppConfig {
    /// Load from all sources and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = file_layer(path)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;
        Self::finish(config)
    }

    /// Defaults and the file layer only; environment variables are ignored.
    pub fn load_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::finish(file_layer(path).build()?)
    }

    fn finish(config: Config) -> Result<Self, ConfigError> {
        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        info!(
            dataset = %app.dataset_path.display(),
            inventory = %app.inventory_path.display(),
            "configuration loaded"
        );
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset_path.as_os_str().is_empty() {
            return Err(DomainError::validation("dataset_path cannot be empty").into());
        }
        if self.inventory_path.as_os_str().is_empty() {
            return Err(DomainError::validation("inventory_path cannot be empty").into());
        }
        self.forecast.validate()?;
        self.stock_levels.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

fn file_layer(path: Option<&Path>) -> ConfigBuilder<DefaultState> {
    let builder = Config::builder();
    match path {
        Some(p) => builder.add_source(File::from(p).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_FILE).required(false)),
    }
}
