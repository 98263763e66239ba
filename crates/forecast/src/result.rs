use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Stock forecast for one medication.
///
/// Transient report: computed per request, never persisted. All quantities are
/// truncated toward zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub medication_name: String,
    pub forecast_date: NaiveDate,
    pub current_central_stock: i64,
    pub current_pharmacy_stock: i64,
    pub total_current_stock: i64,
    /// Sum of the ensemble's daily predictions over the horizon.
    pub predicted_monthly_demand: i64,
    /// Blend of the model forecast and the yearly comparables; the order is
    /// based on this figure.
    pub weighted_demand: i64,
    pub recommended_order_quantity: i64,
    pub safety_stock: i64,
    pub historical_comparison: HistoricalComparison,
    pub model_performance: ModelPerformance,
}

/// Ordered quantity in the same calendar month, one to three years back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct HistoricalComparison {
    pub one_year_ago: i64,
    pub two_years_ago: i64,
    pub three_years_ago: i64,
}

/// Out-of-sample diagnostics on the held-out test split.
///
/// R² is NaN (serialized as `null`) when the test split has fewer than two rows.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ModelPerformance {
    pub random_forest_mse: f64,
    pub random_forest_r2: f64,
    pub xgboost_mse: f64,
    pub xgboost_r2: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("{0} not found in inventory")]
    NotFound(String),

    #[error("no historical data found for {0}")]
    NoHistory(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ForecastError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable tag for callers that map errors onto their own surface.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::NotFound(_) => "not_found",
            ForecastError::NoHistory(_) => "no_history",
            ForecastError::Internal(_) => "internal_error",
        }
    }
}
