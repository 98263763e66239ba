use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::tree::{RegressionTree, TreeParams};
use crate::model::{Regressor, check_rows, check_training_set};
use crate::result::ForecastError;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 8,
            min_samples_leaf: 5,
            seed: 42,
        }
    }
}

/// Bagged regression trees: each tree sees a bootstrap sample of the rows and
/// every feature at every split. Prediction is the mean over trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    params: RandomForestParams,
    width: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(params: RandomForestParams) -> Self {
        Self {
            params,
            width: 0,
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &RandomForestParams {
        &self.params
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ForecastError> {
        check_training_set(x, y)?;
        if self.params.n_estimators == 0 {
            return Err(ForecastError::internal("random forest needs at least one tree"));
        }

        let n = x.len();
        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_leaf: self.params.min_samples_leaf,
            l2_regularization: 0.0,
        };

        let mut rng = StdRng::seed_from_u64(self.params.seed);
        self.trees = (0..self.params.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample, &tree_params)
            })
            .collect();
        self.width = x[0].len();

        debug!(
            model = self.name(),
            trees = self.trees.len(),
            rows = n,
            "model fitted"
        );
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        if self.trees.is_empty() {
            return Err(ForecastError::internal("random forest is not fitted"));
        }
        check_rows(x, self.width)?;

        let count = self.trees.len() as f64;
        Ok(x.iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / count)
            .collect())
    }
}
