//! Feature preparation for one medication's order history.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use pharmastock_core::MedicationId;

use crate::history::HistoricalOrderRow;

/// Column order of the model input matrix.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "stock",
    "quantity",
    "price",
    "day_of_week",
    "month",
    "year",
    "demand_ma_7",
    "demand_ma_30",
    "season",
    "trend",
];

pub const FEATURE_COUNT: usize = 10;

pub const SHORT_WINDOW: usize = 7;
pub const LONG_WINDOW: usize = 30;

/// One aggregated day of history for a single medication.
///
/// Only meaningful inside a date-ascending sequence: the moving averages and
/// `trend` depend on the row's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub stock: f64,
    pub quantity: f64,
    pub quantity_ordered: f64,
    pub price: f64,
    /// Monday = 0.
    pub day_of_week: u32,
    pub month: u32,
    pub year: i32,
    pub demand_ma_7: f64,
    pub demand_ma_30: f64,
    pub season: u32,
    pub trend: usize,
}

impl FeatureRow {
    /// Model input vector, in [`FEATURE_NAMES`] order.
    pub fn features(&self) -> Vec<f64> {
        vec![
            self.stock,
            self.quantity,
            self.price,
            f64::from(self.day_of_week),
            f64::from(self.month),
            f64::from(self.year),
            self.demand_ma_7,
            self.demand_ma_30,
            f64::from(self.season),
            self.trend as f64,
        ]
    }
}

/// Season bucket for a calendar month: `(month % 12 + 3) / 3`.
///
/// December, January and February map to 1; the remaining months follow in
/// blocks of three.
pub fn season_code(month: u32) -> u32 {
    (month % 12 + 3) / 3
}

/// Monday = 0 ... Sunday = 6.
pub fn day_of_week(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Build the date-ascending feature table for `medication_id`.
///
/// Rows sharing a date are aggregated: quantities summed, price averaged, and
/// the first stock value in input order kept. Returns an empty vec when the
/// medication has no rows.
pub fn prepare_features(
    rows: &[HistoricalOrderRow],
    medication_id: MedicationId,
) -> Vec<FeatureRow> {
    let mut matching: Vec<&HistoricalOrderRow> =
        rows.iter().filter(|r| r.id == medication_id).collect();
    // Stable: equal dates keep input order, so "first stock" is well defined.
    matching.sort_by_key(|r| r.order_date);

    let mut days: Vec<DailyTotals> = Vec::new();
    for row in matching {
        match days.last_mut() {
            Some(day) if day.date == row.order_date => day.add(row),
            _ => days.push(DailyTotals::start(row)),
        }
    }

    let ordered: Vec<f64> = days.iter().map(|d| d.quantity_ordered).collect();
    let ma_short = trailing_mean(&ordered, SHORT_WINDOW);
    let ma_long = trailing_mean(&ordered, LONG_WINDOW);

    days.into_iter()
        .enumerate()
        .map(|(trend, day)| {
            let month = day.date.month();
            FeatureRow {
                date: day.date,
                stock: day.stock,
                quantity: day.quantity,
                quantity_ordered: day.quantity_ordered,
                price: day.price_sum / day.count as f64,
                day_of_week: day_of_week(day.date),
                month,
                year: day.date.year(),
                demand_ma_7: ma_short[trend],
                demand_ma_30: ma_long[trend],
                season: season_code(month),
                trend,
            }
        })
        .collect()
}

/// Trailing mean over at most `window` values ending at each position.
///
/// The first `window - 1` entries average whatever is available, so no entry is
/// undefined.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

struct DailyTotals {
    date: NaiveDate,
    quantity: f64,
    quantity_ordered: f64,
    price_sum: f64,
    count: usize,
    stock: f64,
}

impl DailyTotals {
    fn start(row: &HistoricalOrderRow) -> Self {
        Self {
            date: row.order_date,
            quantity: row.quantity,
            quantity_ordered: row.quantity_ordered,
            price_sum: row.price,
            count: 1,
            stock: row.stock,
        }
    }

    fn add(&mut self, row: &HistoricalOrderRow) {
        self.quantity += row.quantity;
        self.quantity_ordered += row.quantity_ordered;
        self.price_sum += row.price;
        self.count += 1;
    }
}
