use std::sync::Arc;

use pharmastock_core::MedicationId;

use crate::history::HistoricalOrderRow;
use crate::result::ForecastError;

/// Inventory fields the engine reads for one (medication, pharmacy) record.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub medication_id: MedicationId,
    /// Central-warehouse stock (shared across pharmacies).
    pub stock: i64,
    /// Quantity on the pharmacy's shelves.
    pub quantity: i64,
}

/// Current stock for a medication across the warehouse and all pharmacies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockPosition {
    pub medication_id: MedicationId,
    pub central: i64,
    pub pharmacy: i64,
}

impl StockPosition {
    /// The first record supplies the medication id and the central stock; shelf
    /// quantities are summed. `None` for an empty slice.
    pub fn from_records(records: &[StockRecord]) -> Option<Self> {
        let first = records.first()?;
        Some(Self {
            medication_id: first.medication_id,
            central: first.stock,
            pharmacy: records.iter().map(|r| r.quantity).sum(),
        })
    }

    pub fn total(&self) -> i64 {
        self.central + self.pharmacy
    }
}

/// Read access to the inventory store.
pub trait InventoryLookup: Send + Sync {
    /// All records sharing `name`; empty when the medication is unknown.
    fn records_by_name(&self, name: &str) -> Result<Vec<StockRecord>, ForecastError>;
}

/// Read access to the historical order dataset. Loaded in full on every call.
pub trait HistorySource: Send + Sync {
    fn load(&self) -> Result<Vec<HistoricalOrderRow>, ForecastError>;
}

impl<S> InventoryLookup for Arc<S>
where
    S: InventoryLookup + ?Sized,
{
    fn records_by_name(&self, name: &str) -> Result<Vec<StockRecord>, ForecastError> {
        (**self).records_by_name(name)
    }
}

impl<S> HistorySource for Arc<S>
where
    S: HistorySource + ?Sized,
{
    fn load(&self) -> Result<Vec<HistoricalOrderRow>, ForecastError> {
        (**self).load()
    }
}

/// In-memory history for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    rows: Vec<HistoricalOrderRow>,
}

impl InMemoryHistory {
    pub fn new(rows: Vec<HistoricalOrderRow>) -> Self {
        Self { rows }
    }
}

impl HistorySource for InMemoryHistory {
    fn load(&self) -> Result<Vec<HistoricalOrderRow>, ForecastError> {
        Ok(self.rows.clone())
    }
}
