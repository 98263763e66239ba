use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pharmastock_core::MedicationId;

/// One row of the external historical order dataset.
///
/// Several rows may share a `(id, order_date)` pair; they are aggregated during
/// feature preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalOrderRow {
    pub id: MedicationId,
    pub order_date: NaiveDate,
    /// Units sold that day.
    pub quantity: f64,
    /// Units ordered that day (forecast target).
    pub quantity_ordered: f64,
    /// Unit price at the time of sale.
    pub price: f64,
    /// Warehouse stock at the time of sale.
    pub stock: f64,
}
