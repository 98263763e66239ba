//! Forecast composition: horizon rows, yearly comparables, and the bounded
//! reorder recommendation.

use chrono::{Datelike, NaiveDate};

use crate::features::{FeatureRow, day_of_week, season_code};
use crate::metrics::population_std;
use crate::policy::ForecastPolicy;
use crate::result::ForecastError;
use crate::source::StockPosition;

/// Synthetic model inputs for `days` consecutive dates starting at `start`.
///
/// Stock and shelf quantity hold at their current values, price at the
/// historical mean, and both moving averages at their last historical value.
/// The trend index continues after the last historical row.
pub fn horizon_rows(
    history: &[FeatureRow],
    position: &StockPosition,
    start: NaiveDate,
    days: usize,
) -> Result<Vec<Vec<f64>>, ForecastError> {
    let last = history
        .last()
        .ok_or_else(|| ForecastError::internal("horizon requires at least one historical row"))?;
    let mean_price = history.iter().map(|r| r.price).sum::<f64>() / history.len() as f64;

    let rows: Vec<Vec<f64>> = start
        .iter_days()
        .take(days)
        .enumerate()
        .map(|(offset, date)| {
            FeatureRow {
                date,
                stock: position.central as f64,
                quantity: position.pharmacy as f64,
                quantity_ordered: 0.0,
                price: mean_price,
                day_of_week: day_of_week(date),
                month: date.month(),
                year: date.year(),
                demand_ma_7: last.demand_ma_7,
                demand_ma_30: last.demand_ma_30,
                season: season_code(date.month()),
                trend: history.len() + offset,
            }
            .features()
        })
        .collect();

    if rows.len() != days {
        return Err(ForecastError::internal("forecast horizon runs past the calendar"));
    }
    Ok(rows)
}

/// Ordered quantity in `today`'s calendar month, one to three years back.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct YearlyComparison {
    pub one_year_ago: f64,
    pub two_years_ago: f64,
    pub three_years_ago: f64,
}

impl YearlyComparison {
    pub fn values(&self) -> [f64; 3] {
        [self.one_year_ago, self.two_years_ago, self.three_years_ago]
    }

    pub fn mean(&self) -> f64 {
        self.values().iter().sum::<f64>() / 3.0
    }

    /// How many of the three years have any ordered quantity on record.
    pub fn available(&self) -> usize {
        self.values().iter().filter(|v| **v != 0.0).count()
    }
}

/// Sum the feature rows' ordered quantity per comparable year. Years without
/// rows contribute 0.
pub fn yearly_comparison(rows: &[FeatureRow], today: NaiveDate) -> YearlyComparison {
    let month = today.month();
    let total_for = |years_back: i32| -> f64 {
        let year = today.year() - years_back;
        rows.iter()
            .filter(|r| r.month == month && r.year == year)
            .map(|r| r.quantity_ordered)
            .sum()
    };
    YearlyComparison {
        one_year_ago: total_for(1),
        two_years_ago: total_for(2),
        three_years_ago: total_for(3),
    }
}

/// Untruncated recommendation figures.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Recommendation {
    pub weighted_blend: f64,
    pub safety_stock: f64,
    pub order_cap: f64,
    pub order_quantity: f64,
}

/// Blend the model demand with the comparables, add safety stock, subtract
/// current stock, and cap the result.
///
/// The order is always within `[0, order_cap]`.
pub fn recommend(
    model_demand: f64,
    comparison: &YearlyComparison,
    total_stock: f64,
    policy: &ForecastPolicy,
) -> Recommendation {
    let w = &policy.weights;
    let weighted_blend = w.model * model_demand
        + w.one_year_ago * comparison.one_year_ago
        + w.two_years_ago * comparison.two_years_ago
        + w.three_years_ago * comparison.three_years_ago;

    let safety_stock = policy.safety_z * population_std(&comparison.values());

    let uncapped = (weighted_blend + safety_stock - total_stock).max(0.0);
    let order_cap = policy.order_cap_multiplier * weighted_blend.max(comparison.mean());
    let order_quantity = uncapped.min(order_cap).max(0.0);

    Recommendation {
        weighted_blend,
        safety_stock,
        order_cap,
        order_quantity,
    }
}
