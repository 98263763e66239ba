//! Model training and out-of-sample evaluation.

use tracing::debug;

use crate::features::FeatureRow;
use crate::metrics::{mean_squared_error, r2_score};
use crate::model::{GradientBoosting, RandomForest, Regressor};
use crate::policy::ForecastPolicy;
use crate::result::{ForecastError, ModelPerformance};
use crate::scaler::StandardScaler;
use crate::split::ChronologicalSplit;

/// Fitted models plus the scaler every later input must go through.
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub scaler: StandardScaler,
    pub forest: RandomForest,
    pub booster: GradientBoosting,
    pub performance: ModelPerformance,
    pub split: ChronologicalSplit,
}

impl TrainedModels {
    /// Scale raw feature rows and return the unweighted mean of both models'
    /// predictions per row.
    pub fn predict_ensemble(&self, raw: &[Vec<f64>]) -> Result<Vec<f64>, ForecastError> {
        let scaled = self.scaler.transform(raw)?;
        let a = self.forest.predict(&scaled)?;
        let b = self.booster.predict(&scaled)?;
        let out: Vec<f64> = a.iter().zip(&b).map(|(a, b)| (a + b) / 2.0).collect();
        if out.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::internal("non-finite ensemble prediction"));
        }
        Ok(out)
    }
}

/// Split `rows` chronologically, fit the scaler and both models on train +
/// validation, and score them on the untouched test rows.
pub fn train_and_evaluate(
    rows: &[FeatureRow],
    policy: &ForecastPolicy,
) -> Result<TrainedModels, ForecastError> {
    let split = ChronologicalSplit::new(rows.len())?;

    let x: Vec<Vec<f64>> = rows.iter().map(FeatureRow::features).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.quantity_ordered).collect();

    let fit_range = split.fitting();
    let scaler = StandardScaler::fit(&x[fit_range.clone()])?;
    let x_fit = scaler.transform(&x[fit_range.clone()])?;
    let y_fit = &y[fit_range];
    let x_test = scaler.transform(&x[split.test.clone()])?;
    let y_test = &y[split.test.clone()];

    let mut forest = RandomForest::new(policy.random_forest);
    forest.fit(&x_fit, y_fit)?;
    let mut booster = GradientBoosting::new(policy.gradient_boosting);
    booster.fit(&x_fit, y_fit)?;

    let forest_test = forest.predict(&x_test)?;
    let booster_test = booster.predict(&x_test)?;

    let performance = ModelPerformance {
        random_forest_mse: mean_squared_error(y_test, &forest_test),
        random_forest_r2: r2_score(y_test, &forest_test),
        xgboost_mse: mean_squared_error(y_test, &booster_test),
        xgboost_r2: r2_score(y_test, &booster_test),
    };

    debug!(
        train_rows = split.train.len(),
        validation_rows = split.validation.len(),
        test_rows = split.test.len(),
        random_forest_mse = performance.random_forest_mse,
        random_forest_r2 = performance.random_forest_r2,
        xgboost_mse = performance.xgboost_mse,
        xgboost_r2 = performance.xgboost_r2,
        "models evaluated"
    );

    Ok(TrainedModels {
        scaler,
        forest,
        booster,
        performance,
        split,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::prepare_features;
    use crate::history::HistoricalOrderRow;
    use chrono::NaiveDate;
    use pharmastock_core::MedicationId;

    fn history(days: i64) -> Vec<FeatureRow> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let rows: Vec<HistoricalOrderRow> = (0..days)
            .map(|i| HistoricalOrderRow {
                id: MedicationId::new(1),
                order_date: start + chrono::Duration::days(i),
                quantity: 5.0,
                quantity_ordered: 10.0 + (i % 7) as f64,
                price: 3.0,
                stock: 200.0 - (i % 30) as f64,
            })
            .collect();
        prepare_features(&rows, MedicationId::new(1))
    }

    #[test]
    fn evaluates_on_the_most_recent_rows() {
        let rows = history(50);
        let trained = train_and_evaluate(&rows, &ForecastPolicy::default()).unwrap();
        assert_eq!(trained.split.test, 40..50);
        assert!(trained.performance.random_forest_mse.is_finite());
        assert!(trained.performance.xgboost_mse.is_finite());
        assert!(trained.performance.random_forest_r2.is_finite());
    }

    #[test]
    fn ensemble_averages_both_models() {
        let rows = history(40);
        let trained = train_and_evaluate(&rows, &ForecastPolicy::default()).unwrap();
        let raw = vec![rows[5].features()];

        let scaled = trained.scaler.transform(&raw).unwrap();
        let a = trained.forest.predict(&scaled).unwrap()[0];
        let b = trained.booster.predict(&scaled).unwrap()[0];
        assert_eq!(trained.predict_ensemble(&raw).unwrap(), vec![(a + b) / 2.0]);
    }

    #[test]
    fn scaler_sees_only_the_fitting_rows() {
        let rows = history(50);
        let trained = train_and_evaluate(&rows, &ForecastPolicy::default()).unwrap();
        let x: Vec<Vec<f64>> = rows.iter().map(FeatureRow::features).collect();

        let fitting_only = StandardScaler::fit(&x[trained.split.fitting()]).unwrap();
        assert_eq!(trained.scaler, fitting_only);

        // The trend column keeps growing, so including test rows shifts its statistics.
        let all_rows = StandardScaler::fit(&x).unwrap();
        assert_ne!(trained.scaler, all_rows);
        let last = vec![x[49].clone()];
        assert_ne!(
            trained.scaler.transform(&last).unwrap(),
            all_rows.transform(&last).unwrap()
        );
    }

    #[test]
    fn single_row_cannot_be_trained() {
        let rows = history(1);
        let err = train_and_evaluate(&rows, &ForecastPolicy::default()).unwrap_err();
        assert!(matches!(err, ForecastError::Internal(_)));
    }

    #[test]
    fn training_is_deterministic() {
        let rows = history(60);
        let a = train_and_evaluate(&rows, &ForecastPolicy::default()).unwrap();
        let b = train_and_evaluate(&rows, &ForecastPolicy::default()).unwrap();
        let probe: Vec<Vec<f64>> = rows.iter().map(FeatureRow::features).collect();
        assert_eq!(
            a.predict_ensemble(&probe).unwrap(),
            b.predict_ensemble(&probe).unwrap()
        );
    }
}
