//! `pharmastock-forecast`
//!
//! **Responsibility:** demand forecasting and reorder recommendations.
//!
//! This crate is storage-agnostic:
//! - Inventory records and historical order rows come in through [`InventoryLookup`]
//!   and [`HistorySource`], implemented by callers (infra).
//! - It never mutates inventory state; a [`ForecastReport`] is computed fresh on
//!   every call and discarded by the caller.
//!
//! Pipeline: [`features`] → [`training`] → [`compose`], driven by [`ForecastEngine`].

pub mod compose;
pub mod engine;
pub mod features;
pub mod history;
pub mod metrics;
pub mod model;
pub mod policy;
pub mod result;
pub mod scaler;
pub mod source;
pub mod split;
pub mod training;

pub use engine::ForecastEngine;
pub use features::{FeatureRow, prepare_features, season_code};
pub use history::HistoricalOrderRow;
pub use model::{
    GradientBoosting, GradientBoostingParams, RandomForest, RandomForestParams, Regressor,
};
pub use policy::{BlendWeights, ForecastPolicy};
pub use result::{ForecastError, ForecastReport, HistoricalComparison, ModelPerformance};
pub use source::{HistorySource, InMemoryHistory, InventoryLookup, StockPosition, StockRecord};
