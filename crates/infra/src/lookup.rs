use pharmastock_forecast::{ForecastError, InventoryLookup, StockRecord};
use pharmastock_inventory::MedicationStore;

/// Exposes a [`MedicationStore`] to the forecast engine.
#[derive(Debug, Clone)]
pub struct StoreLookup<S> {
    store: S,
}

impl<S> StoreLookup<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> InventoryLookup for StoreLookup<S>
where
    S: MedicationStore,
{
    fn records_by_name(&self, name: &str) -> Result<Vec<StockRecord>, ForecastError> {
        Ok(self
            .store
            .find_by_name(name)
            .into_iter()
            .map(|m| StockRecord {
                medication_id: m.id,
                stock: m.stock,
                quantity: m.quantity,
            })
            .collect())
    }
}
