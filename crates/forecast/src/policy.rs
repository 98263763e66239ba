use serde::{Deserialize, Serialize};

use pharmastock_core::{DomainError, DomainResult};

use crate::model::{GradientBoostingParams, RandomForestParams};

/// Weights of the model forecast and the three yearly comparables in the
/// demand blend.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub model: f64,
    pub one_year_ago: f64,
    pub two_years_ago: f64,
    pub three_years_ago: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            model: 0.4,
            one_year_ago: 0.3,
            two_years_ago: 0.2,
            three_years_ago: 0.1,
        }
    }
}

impl BlendWeights {
    fn as_array(&self) -> [f64; 4] {
        [
            self.model,
            self.one_year_ago,
            self.two_years_ago,
            self.three_years_ago,
        ]
    }
}

/// Policy constants and model hyper-parameters for a forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastPolicy {
    /// Days forecast ahead, starting today.
    pub horizon_days: usize,
    pub weights: BlendWeights,
    /// z-score applied to the comparables' standard deviation (1.96 ≈ 95%).
    pub safety_z: f64,
    /// Cap on the order as a multiple of `max(blend, mean comparables)`.
    pub order_cap_multiplier: f64,
    pub random_forest: RandomForestParams,
    pub gradient_boosting: GradientBoostingParams,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            weights: BlendWeights::default(),
            safety_z: 1.96,
            order_cap_multiplier: 1.5,
            random_forest: RandomForestParams::default(),
            gradient_boosting: GradientBoostingParams::default(),
        }
    }
}

impl ForecastPolicy {
    pub fn validate(&self) -> DomainResult<()> {
        if self.horizon_days == 0 {
            return Err(DomainError::validation("horizon_days must be at least 1"));
        }
        if self
            .weights
            .as_array()
            .iter()
            .any(|w| !(w.is_finite() && *w >= 0.0))
        {
            return Err(DomainError::validation(
                "blend weights must be finite and non-negative",
            ));
        }
        if !(self.safety_z.is_finite() && self.safety_z >= 0.0) {
            return Err(DomainError::validation(
                "safety_z must be finite and non-negative",
            ));
        }
        if !(self.order_cap_multiplier.is_finite() && self.order_cap_multiplier >= 0.0) {
            return Err(DomainError::validation(
                "order_cap_multiplier must be finite and non-negative",
            ));
        }
        if self.random_forest.n_estimators == 0 {
            return Err(DomainError::validation(
                "random_forest.n_estimators must be at least 1",
            ));
        }
        let gb = &self.gradient_boosting;
        if !(gb.learning_rate.is_finite() && gb.learning_rate > 0.0) {
            return Err(DomainError::validation(
                "gradient_boosting.learning_rate must be positive",
            ));
        }
        if !(gb.subsample > 0.0 && gb.subsample <= 1.0) {
            return Err(DomainError::validation(
                "gradient_boosting.subsample must be in (0, 1]",
            ));
        }
        if !(gb.l2_regularization.is_finite() && gb.l2_regularization >= 0.0) {
            return Err(DomainError::validation(
                "gradient_boosting.l2_regularization must be non-negative",
            ));
        }
        Ok(())
    }
}
