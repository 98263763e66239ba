use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::compose::{horizon_rows, recommend, yearly_comparison};
use crate::features::prepare_features;
use crate::policy::ForecastPolicy;
use crate::result::{ForecastError, ForecastReport, HistoricalComparison};
use crate::source::{HistorySource, InventoryLookup, StockPosition};
use crate::training::train_and_evaluate;

/// Stateless forecast pipeline over an inventory lookup and a history source.
///
/// Every call reloads the history and fits fresh models; nothing is cached
/// between calls, so concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct ForecastEngine<I, H> {
    inventory: I,
    history: H,
    policy: ForecastPolicy,
}

impl<I, H> ForecastEngine<I, H>
where
    I: InventoryLookup,
    H: HistorySource,
{
    pub fn new(inventory: I, history: H, policy: ForecastPolicy) -> Self {
        Self {
            inventory,
            history,
            policy,
        }
    }

    pub fn policy(&self) -> &ForecastPolicy {
        &self.policy
    }

    /// Forecast starting from the current UTC date.
    pub fn forecast(&self, medication_name: &str) -> Result<ForecastReport, ForecastError> {
        self.forecast_on(medication_name, Utc::now().date_naive())
    }

    /// Forecast with the horizon starting on `today`.
    #[instrument(skip(self, medication_name), fields(medication = %medication_name))]
    pub fn forecast_on(
        &self,
        medication_name: &str,
        today: NaiveDate,
    ) -> Result<ForecastReport, ForecastError> {
        let result = self.run(medication_name, today);
        match &result {
            Ok(report) => info!(
                predicted_monthly_demand = report.predicted_monthly_demand,
                weighted_demand = report.weighted_demand,
                recommended_order_quantity = report.recommended_order_quantity,
                safety_stock = report.safety_stock,
                "forecast computed"
            ),
            Err(ForecastError::Internal(msg)) => error!(error = %msg, "forecast failed"),
            Err(e) => info!(reason = e.kind(), "forecast unavailable"),
        }
        result
    }

    fn run(
        &self,
        medication_name: &str,
        today: NaiveDate,
    ) -> Result<ForecastReport, ForecastError> {
        let records = self.inventory.records_by_name(medication_name)?;
        let position = StockPosition::from_records(&records)
            .ok_or_else(|| ForecastError::NotFound(medication_name.to_string()))?;

        let rows = self.history.load()?;
        let features = prepare_features(&rows, position.medication_id);
        if features.is_empty() {
            return Err(ForecastError::NoHistory(medication_name.to_string()));
        }
        debug!(
            medication_id = %position.medication_id,
            dataset_rows = rows.len(),
            feature_rows = features.len(),
            "history prepared"
        );

        let trained = train_and_evaluate(&features, &self.policy)?;

        let horizon = horizon_rows(&features, &position, today, self.policy.horizon_days)?;
        let daily = trained.predict_ensemble(&horizon)?;
        let model_demand: f64 = daily.iter().sum();

        let comparison = yearly_comparison(&features, today);
        if comparison.available() < 3 {
            // Missing years count as zero demand and skew the safety stock.
            warn!(
                comparables_available = comparison.available(),
                "history does not cover the same month in each of the last three years"
            );
        }

        let rec = recommend(
            model_demand,
            &comparison,
            position.total() as f64,
            &self.policy,
        );
        debug!(
            model_demand,
            weighted_blend = rec.weighted_blend,
            safety_stock = rec.safety_stock,
            order_cap = rec.order_cap,
            "recommendation composed"
        );

        Ok(ForecastReport {
            medication_name: medication_name.to_string(),
            forecast_date: today,
            current_central_stock: position.central,
            current_pharmacy_stock: position.pharmacy,
            total_current_stock: position.total(),
            predicted_monthly_demand: model_demand as i64,
            weighted_demand: rec.weighted_blend as i64,
            recommended_order_quantity: rec.order_quantity as i64,
            safety_stock: rec.safety_stock as i64,
            historical_comparison: HistoricalComparison {
                one_year_ago: comparison.one_year_ago as i64,
                two_years_ago: comparison.two_years_ago as i64,
                three_years_ago: comparison.three_years_ago as i64,
            },
            model_performance: trained.performance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pharmastock_core::MedicationId;

    use crate::history::HistoricalOrderRow;
    use crate::source::{InMemoryHistory, StockRecord};

    #[derive(Debug, Default)]
    struct FixedInventory {
        records: Vec<(String, StockRecord)>,
    }

    impl FixedInventory {
        fn with(mut self, name: &str, id: i64, stock: i64, quantity: i64) -> Self {
            self.records.push((
                name.to_string(),
                StockRecord {
                    medication_id: MedicationId::new(id),
                    stock,
                    quantity,
                },
            ));
            self
        }
    }

    impl InventoryLookup for FixedInventory {
        fn records_by_name(&self, name: &str) -> Result<Vec<StockRecord>, ForecastError> {
            Ok(self
                .records
                .iter()
                .filter(|(n, _)| n == name)
                .map(|(_, r)| r.clone())
                .collect())
        }
    }

    /// Counts loads so tests can assert the history was never touched.
    #[derive(Debug)]
    struct CountingHistory {
        inner: InMemoryHistory,
        loads: AtomicUsize,
    }

    impl HistorySource for CountingHistory {
        fn load(&self) -> Result<Vec<HistoricalOrderRow>, ForecastError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load()
        }
    }

    struct BrokenHistory;

    impl HistorySource for BrokenHistory {
        fn load(&self) -> Result<Vec<HistoricalOrderRow>, ForecastError> {
            Err(ForecastError::internal("dataset unreadable"))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    /// Three and a half years of daily orders for medication 1, with a yearly bump in June.
    fn daily_history(id: i64) -> Vec<HistoricalOrderRow> {
        let start = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
        start
            .iter_days()
            .take_while(|d| *d < today())
            .enumerate()
            .map(|(i, date)| HistoricalOrderRow {
                id: MedicationId::new(id),
                order_date: date,
                quantity: 4.0 + (i % 3) as f64,
                quantity_ordered: if chrono::Datelike::month(&date) == 6 { 12.0 } else { 8.0 }
                    + (i % 5) as f64,
                price: 2.5,
                stock: 300.0 - (i % 40) as f64,
            })
            .collect()
    }

    fn engine(
        inventory: FixedInventory,
        rows: Vec<HistoricalOrderRow>,
    ) -> ForecastEngine<Arc<FixedInventory>, Arc<CountingHistory>> {
        ForecastEngine::new(
            Arc::new(inventory),
            Arc::new(CountingHistory {
                inner: InMemoryHistory::new(rows),
                loads: AtomicUsize::new(0),
            }),
            ForecastPolicy::default(),
        )
    }

    #[test]
    fn unknown_medication_is_not_found_before_history_is_read() {
        let engine = engine(FixedInventory::default(), daily_history(1));
        let err = engine.forecast_on("Unknown", today()).unwrap_err();
        assert_eq!(err, ForecastError::NotFound("Unknown".to_string()));
        assert_eq!(engine.history.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn medication_without_history_reports_no_history() {
        let inventory = FixedInventory::default().with("Aspirin", 2, 100, 5);
        let engine = engine(inventory, daily_history(1));
        let err = engine.forecast_on("Aspirin", today()).unwrap_err();
        assert_eq!(err, ForecastError::NoHistory("Aspirin".to_string()));
        assert_eq!(err.kind(), "no_history");
    }

    #[test]
    fn dataset_failures_are_internal() {
        let inventory = Arc::new(FixedInventory::default().with("Ibuprofen", 1, 100, 5));
        let engine = ForecastEngine::new(inventory, BrokenHistory, ForecastPolicy::default());
        let err = engine.forecast_on("Ibuprofen", today()).unwrap_err();
        assert_eq!(err.kind(), "internal_error");
    }

    #[test]
    fn full_forecast_report() {
        let inventory = FixedInventory::default()
            .with("Ibuprofen", 1, 150, 10)
            .with("Ibuprofen", 1, 150, 15);
        let engine = engine(inventory, daily_history(1));
        let report = engine.forecast_on("Ibuprofen", today()).unwrap();

        assert_eq!(report.medication_name, "Ibuprofen");
        assert_eq!(report.current_central_stock, 150);
        assert_eq!(report.current_pharmacy_stock, 25);
        assert_eq!(report.total_current_stock, 175);
        assert_eq!(report.forecast_date, today());

        // June 2021..2023 fully covered: 30 days per year.
        let cmp = report.historical_comparison;
        assert!(cmp.one_year_ago >= 30 * 12);
        assert!(cmp.two_years_ago >= 30 * 12);
        assert!(cmp.three_years_ago >= 30 * 12);

        assert!(report.predicted_monthly_demand > 0);
        assert!(report.weighted_demand > 0);
        assert!(report.recommended_order_quantity >= 0);
        assert!(report.model_performance.random_forest_mse.is_finite());
        assert!(report.model_performance.xgboost_mse.is_finite());
    }

    #[test]
    fn identical_inputs_give_identical_reports() {
        let inventory = || FixedInventory::default().with("Ibuprofen", 1, 40, 2);
        let a = engine(inventory(), daily_history(1))
            .forecast_on("Ibuprofen", today())
            .unwrap();
        let b = engine(inventory(), daily_history(1))
            .forecast_on("Ibuprofen", today())
            .unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn large_stock_means_no_order() {
        let inventory = FixedInventory::default().with("Ibuprofen", 1, 1_000_000, 0);
        let report = engine(inventory, daily_history(1))
            .forecast_on("Ibuprofen", today())
            .unwrap();
        assert_eq!(report.recommended_order_quantity, 0);
    }

    #[test]
    fn single_day_of_history_is_an_internal_error() {
        let inventory = FixedInventory::default().with("Ibuprofen", 1, 10, 0);
        let rows = daily_history(1).into_iter().take(1).collect();
        let err = engine(inventory, rows)
            .forecast_on("Ibuprofen", today())
            .unwrap_err();
        assert!(matches!(err, ForecastError::Internal(_)));
    }
}
