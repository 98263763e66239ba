//! Infrastructure layer: dataset and seed files, configuration, and the
//! adapters that connect the inventory store to the forecast engine.

pub mod app;
pub mod config;
pub mod dataset;
pub mod lookup;
pub mod seed;

pub use app::{Engine, build_engine, load_inventory};
pub use config::{AppConfig, ConfigError, LogConfig};
pub use dataset::CsvHistorySource;
pub use lookup::StoreLookup;
pub use seed::{SeedError, load_seed};
