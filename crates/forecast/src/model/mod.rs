//! Tree-ensemble regressors.

pub mod boosting;
pub mod forest;
pub mod tree;

pub use boosting::{GradientBoosting, GradientBoostingParams};
pub use forest::{RandomForest, RandomForestParams};
pub use tree::{RegressionTree, TreeParams};

use crate::result::ForecastError;

/// A regression model over dense feature rows.
///
/// Fitting is deterministic for a given configuration (seeded randomness only).
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ForecastError>;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError>;
}

/// Shape and finiteness checks shared by every `fit`.
pub(crate) fn check_training_set(x: &[Vec<f64>], y: &[f64]) -> Result<(), ForecastError> {
    if x.is_empty() {
        return Err(ForecastError::internal("cannot fit on an empty training set"));
    }
    if x.len() != y.len() {
        return Err(ForecastError::internal(format!(
            "feature rows ({}) and targets ({}) differ in length",
            x.len(),
            y.len()
        )));
    }
    check_rows(x, x[0].len())?;
    if y.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::internal("non-finite target value"));
    }
    Ok(())
}

pub(crate) fn check_rows(x: &[Vec<f64>], width: usize) -> Result<(), ForecastError> {
    for row in x {
        if row.len() != width {
            return Err(ForecastError::internal(format!(
                "expected {width} features, got {}",
                row.len()
            )));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::internal("non-finite feature value"));
        }
    }
    Ok(())
}
