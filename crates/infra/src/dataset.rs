//! Historical order dataset backed by a CSV file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

use pharmastock_core::MedicationId;
use pharmastock_forecast::{ForecastError, HistoricalOrderRow, HistorySource};

/// Reads the whole dataset on every [`HistorySource::load`] call.
///
/// Columns are matched by header name (`id, order_date, quantity,
/// quantity_ordered, price, stock`); any other column is ignored.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    path: PathBuf,
}

impl CsvHistorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: i64,
    order_date: String,
    quantity: f64,
    quantity_ordered: f64,
    price: f64,
    stock: f64,
}

impl CsvRow {
    fn into_row(self, line: u64) -> Result<HistoricalOrderRow, ForecastError> {
        let order_date = parse_order_date(&self.order_date).ok_or_else(|| {
            ForecastError::internal(format!(
                "dataset line {line}: unrecognised order_date {:?}",
                self.order_date
            ))
        })?;
        Ok(HistoricalOrderRow {
            id: MedicationId::new(self.id),
            order_date,
            quantity: self.quantity,
            quantity_ordered: self.quantity_ordered,
            price: self.price,
            stock: self.stock,
        })
    }
}

impl HistorySource for CsvHistorySource {
    fn load(&self) -> Result<Vec<HistoricalOrderRow>, ForecastError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| {
                ForecastError::internal(format!("open dataset {}: {e}", self.path.display()))
            })?;

        let mut rows = Vec::new();
        for record in reader.deserialize::<CsvRow>() {
            let raw = record.map_err(|e| {
                ForecastError::internal(format!("read dataset {}: {e}", self.path.display()))
            })?;
            // Header is line 1.
            let line = rows.len() as u64 + 2;
            rows.push(raw.into_row(line)?);
        }

        debug!(path = %self.path.display(), rows = rows.len(), "dataset loaded");
        Ok(rows)
    }
}

/// Calendar date of an order timestamp. Any time-of-day or offset is dropped.
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parses_supported_date_forms() {
        assert_eq!(parse_order_date("2023-04-05"), Some(d(2023, 4, 5)));
        assert_eq!(parse_order_date("2023-04-05 13:45:00"), Some(d(2023, 4, 5)));
        assert_eq!(parse_order_date("2023-04-05T23:59:59"), Some(d(2023, 4, 5)));
        assert_eq!(parse_order_date("2023-04-05 08:00:00.250"), Some(d(2023, 4, 5)));
        assert_eq!(parse_order_date("2023-04-05T10:00:00+02:00"), Some(d(2023, 4, 5)));
        assert_eq!(parse_order_date(" 2023-04-05 "), Some(d(2023, 4, 5)));
        assert_eq!(parse_order_date("05/04/2023"), None);
        assert_eq!(parse_order_date(""), None);
    }

    #[test]
    fn reads_columns_by_header_and_ignores_extras() {
        let file = csv_file(
            "order_date,id,name,stock,price,quantity,quantity_ordered\n\
             2023-01-02,7,Ibuprofen,300,2.5,4,11\n\
             2023-01-03 09:30:00,7,Ibuprofen,290,2.5,5,12\n",
        );
        let rows = CsvHistorySource::new(file.path()).load().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, MedicationId::new(7));
        assert_eq!(rows[0].order_date, d(2023, 1, 2));
        assert_eq!(rows[0].quantity_ordered, 11.0);
        assert_eq!(rows[1].stock, 290.0);
        assert_eq!(rows[1].order_date, d(2023, 1, 3));
    }

    #[test]
    fn bad_date_is_internal_error_with_line() {
        let file = csv_file(
            "id,order_date,quantity,quantity_ordered,price,stock\n\
             1,2023-01-02,4,11,2.5,300\n\
             1,yesterday,4,11,2.5,300\n",
        );
        let err = CsvHistorySource::new(file.path()).load().unwrap_err();
        match err {
            ForecastError::Internal(msg) => assert!(msg.contains("line 3"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_internal_error() {
        let file = csv_file("id,order_date,quantity\n1,2023-01-02,4\n");
        let err = CsvHistorySource::new(file.path()).load().unwrap_err();
        assert_eq!(err.kind(), "internal_error");
    }

    #[test]
    fn missing_file_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvHistorySource::new(dir.path().join("absent.csv"));
        assert!(matches!(source.load(), Err(ForecastError::Internal(_))));
    }

    #[test]
    fn header_only_file_is_empty() {
        let file = csv_file("id,order_date,quantity,quantity_ordered,price,stock\n");
        assert!(CsvHistorySource::new(file.path()).load().unwrap().is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: every accepted timestamp form yields the same calendar date.
        #[test]
        fn timestamp_forms_agree(
            days in 0i64..40_000,
            h in 0u32..24,
            m in 0u32..60,
            sec in 0u32..60,
        ) {
            let date = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap() + chrono::Duration::days(days);
            let day = date.format("%Y-%m-%d").to_string();
            let time = format!("{h:02}:{m:02}:{sec:02}");

            prop_assert_eq!(parse_order_date(&day), Some(date));
            prop_assert_eq!(parse_order_date(&format!("{day} {time}")), Some(date));
            prop_assert_eq!(parse_order_date(&format!("{day}T{time}")), Some(date));
            prop_assert_eq!(parse_order_date(&format!("{day}T{time}Z")), Some(date));
        }
    }
}
