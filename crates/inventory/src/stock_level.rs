use serde::{Deserialize, Serialize};

use pharmastock_core::{DomainError, DomainResult};

/// Categorical bucket derived from the central-warehouse stock count.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Low,
    Medium,
    High,
}

impl StockLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::Low => "low",
            StockLevel::Medium => "medium",
            StockLevel::High => "high",
        }
    }
}

impl core::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds mapping warehouse stock to a [`StockLevel`].
///
/// `stock <= low_max` is low, `stock <= medium_max` is medium, anything above is high.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockLevelPolicy {
    pub low_max: i64,
    pub medium_max: i64,
}

impl Default for StockLevelPolicy {
    fn default() -> Self {
        Self {
            low_max: 100,
            medium_max: 350,
        }
    }
}

impl StockLevelPolicy {
    pub fn validate(&self) -> DomainResult<()> {
        if self.low_max < 0 {
            return Err(DomainError::validation("low_max cannot be negative"));
        }
        if self.medium_max <= self.low_max {
            return Err(DomainError::validation(
                "medium_max must be greater than low_max",
            ));
        }
        Ok(())
    }

    /// Classify a warehouse stock count. Pure; called by the write path right
    /// before a record is persisted.
    pub fn classify(&self, stock: i64) -> StockLevel {
        if stock <= self.low_max {
            StockLevel::Low
        } else if stock <= self.medium_max {
            StockLevel::Medium
        } else {
            StockLevel::High
        }
    }
}
