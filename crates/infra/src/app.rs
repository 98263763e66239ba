//! Wiring from an [`AppConfig`] to a ready forecast engine.

use std::sync::Arc;

use pharmastock_forecast::ForecastEngine;
use pharmastock_inventory::InMemoryMedicationStore;

use crate::config::AppConfig;
use crate::dataset::CsvHistorySource;
use crate::lookup::StoreLookup;
use crate::seed::{SeedError, load_seed};

/// Engine over the seeded in-memory inventory and the CSV dataset.
pub type Engine = ForecastEngine<StoreLookup<Arc<InMemoryMedicationStore>>, CsvHistorySource>;

/// Build the inventory store with the configured stock-level policy and load
/// the seed file into it.
pub fn load_inventory(config: &AppConfig) -> Result<Arc<InMemoryMedicationStore>, SeedError> {
    let store = Arc::new(InMemoryMedicationStore::new(config.stock_levels));
    load_seed(store.as_ref(), &config.inventory_path)?;
    Ok(store)
}

/// The dataset is not opened here; it is read on every forecast.
pub fn build_engine(config: &AppConfig) -> Result<Engine, SeedError> {
    let store = load_inventory(config)?;
    Ok(ForecastEngine::new(
        StoreLookup::new(store),
        CsvHistorySource::new(&config.dataset_path),
        config.forecast.clone(),
    ))
}
