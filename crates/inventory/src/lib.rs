//! Inventory domain module.
//!
//! Medication records, the stock-level policy and the inventory store. Business
//! rules here are deterministic; the only state lives behind [`MedicationStore`].

pub mod medication;
pub mod stock_level;
pub mod store;

pub use medication::{Medication, MedicationDraft, MedicationType};
pub use stock_level::{StockLevel, StockLevelPolicy};
pub use store::{InMemoryMedicationStore, MedicationStore};
