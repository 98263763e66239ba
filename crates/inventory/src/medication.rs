use serde::{Deserialize, Serialize};

use pharmastock_core::{DomainError, DomainResult, MedicationId};

use crate::stock_level::{StockLevel, StockLevelPolicy};

/// Dispensing category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MedicationType {
    #[serde(rename = "RX")]
    Rx,
    #[serde(rename = "OTC")]
    Otc,
}

/// Persisted medication record: one row per (medication, pharmacy).
///
/// `stock` is the shared central-warehouse count; `quantity` is what the
/// pharmacy holds on its shelves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: MedicationId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MedicationType,
    pub quantity: i64,
    pub price: f64,
    pub pharmacy: String,
    pub stock: i64,
    pub stock_level: StockLevel,
}

/// Write-path input for a medication record.
///
/// The stock level is never accepted from callers; it is derived in [`MedicationDraft::prepare`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MedicationType,
    pub quantity: i64,
    pub price: f64,
    pub pharmacy: String,
    pub stock: i64,
}

const NAME_MIN: usize = 3;
const NAME_MAX: usize = 50;

impl MedicationDraft {
    pub fn validate(&self) -> DomainResult<()> {
        let len = self.name.trim().chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&len) {
            return Err(DomainError::validation(format!(
                "name must be between {NAME_MIN} and {NAME_MAX} characters"
            )));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("stock cannot be negative"));
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(DomainError::validation("price must be a positive number"));
        }
        if self.pharmacy.trim().is_empty() {
            return Err(DomainError::validation("pharmacy cannot be empty"));
        }
        Ok(())
    }

    /// Validate and turn the draft into a record ready for persistence,
    /// recomputing the stock level from the warehouse stock.
    pub fn prepare(self, id: MedicationId, policy: &StockLevelPolicy) -> DomainResult<Medication> {
        self.validate()?;
        let stock_level = policy.classify(self.stock);
        Ok(Medication {
            id,
            name: self.name,
            kind: self.kind,
            quantity: self.quantity,
            price: self.price,
            pharmacy: self.pharmacy,
            stock: self.stock,
            stock_level,
        })
    }

    /// Key under which the store enforces uniqueness.
    pub(crate) fn unique_key(&self) -> UniqueKey {
        UniqueKey {
            name: self.name.trim().to_lowercase(),
            kind: self.kind,
            quantity: self.quantity,
            price_bits: self.price.to_bits(),
            pharmacy: self.pharmacy.trim().to_string(),
            stock: self.stock,
        }
    }
}

impl Medication {
    pub(crate) fn unique_key(&self) -> UniqueKey {
        UniqueKey {
            name: self.name.trim().to_lowercase(),
            kind: self.kind,
            quantity: self.quantity,
            price_bits: self.price.to_bits(),
            pharmacy: self.pharmacy.trim().to_string(),
            stock: self.stock,
        }
    }
}

/// Every user-supplied field, with the name compared case-insensitively.
///
/// Records that differ only in shelf quantity or warehouse stock are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct UniqueKey {
    name: String,
    kind: MedicationType,
    quantity: i64,
    price_bits: u64,
    pharmacy: String,
    stock: i64,
}
