use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::tree::{RegressionTree, TreeParams};
use crate::model::{Regressor, check_rows, check_training_set};
use crate::result::ForecastError;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// L2 penalty on leaf weights (λ).
    pub l2_regularization: f64,
    /// Minimum rows per child (unit hessian under squared loss).
    pub min_child_weight: usize,
    /// Fraction of rows drawn (without replacement) for each round.
    pub subsample: f64,
    pub seed: u64,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.03,
            max_depth: 5,
            l2_regularization: 1.0,
            min_child_weight: 1,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// Gradient-boosted regression trees under squared loss.
///
/// Starts from the target mean; each round fits a tree to the current residuals
/// and adds `learning_rate` times its output.
#[derive(Debug, Clone)]
pub struct GradientBoosting {
    params: GradientBoostingParams,
    width: usize,
    base_score: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub fn new(params: GradientBoostingParams) -> Self {
        Self {
            params,
            width: 0,
            base_score: 0.0,
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    fn draw_rows(&self, rng: &mut StdRng, n: usize) -> Vec<usize> {
        if self.params.subsample >= 1.0 {
            return (0..n).collect();
        }
        let rows: Vec<usize> = (0..n)
            .filter(|_| rng.gen_bool(self.params.subsample))
            .collect();
        if rows.is_empty() {
            vec![rng.gen_range(0..n)]
        } else {
            rows
        }
    }
}

impl Regressor for GradientBoosting {
    fn name(&self) -> &'static str {
        "xgboost"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ForecastError> {
        check_training_set(x, y)?;
        let p = self.params;
        if !(p.learning_rate.is_finite() && p.learning_rate > 0.0) {
            return Err(ForecastError::internal("learning_rate must be positive"));
        }
        if !(p.subsample > 0.0 && p.subsample <= 1.0) {
            return Err(ForecastError::internal("subsample must be in (0, 1]"));
        }

        let n = x.len();
        let tree_params = TreeParams {
            max_depth: p.max_depth,
            min_samples_leaf: p.min_child_weight,
            l2_regularization: p.l2_regularization,
        };

        self.base_score = y.iter().sum::<f64>() / n as f64;
        let mut fitted = vec![self.base_score; n];
        let mut residuals = vec![0.0; n];
        let mut rng = StdRng::seed_from_u64(p.seed);

        self.trees = Vec::with_capacity(p.n_estimators);
        for _ in 0..p.n_estimators {
            for ((r, target), current) in residuals.iter_mut().zip(y).zip(&fitted) {
                *r = target - current;
            }
            let rows = self.draw_rows(&mut rng, n);
            let tree = RegressionTree::fit(x, &residuals, &rows, &tree_params);
            for (f, row) in fitted.iter_mut().zip(x) {
                *f += p.learning_rate * tree.predict_row(row);
            }
            self.trees.push(tree);
        }
        self.width = x[0].len();

        debug!(
            model = self.name(),
            rounds = self.trees.len(),
            base_score = self.base_score,
            rows = n,
            "model fitted"
        );
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        if self.width == 0 {
            return Err(ForecastError::internal("gradient boosting is not fitted"));
        }
        check_rows(x, self.width)?;

        let lr = self.params.learning_rate;
        Ok(x.iter()
            .map(|row| {
                self.base_score + self.trees.iter().map(|t| lr * t.predict_row(row)).sum::<f64>()
            })
            .collect())
    }
}
