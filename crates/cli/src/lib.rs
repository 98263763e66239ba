//! `pharmastock` command line: argument parsing and command execution.
//!
//! Every command renders a JSON document on stdout. Forecast failures map to
//! distinct exit codes so scripts can tell them apart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use pharmastock_forecast::ForecastError;
use pharmastock_infra::{AppConfig, build_engine};
use pharmastock_inventory::StockLevel;

#[derive(Debug, Parser)]
#[command(name = "pharmastock", about = "Pharmacy stock forecasting", version)]
pub struct Cli {
    /// Config file (TOML/JSON/YAML). Defaults to config/default.toml when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast next-period demand and the reorder quantity for a medication.
    Forecast {
        /// Medication name, matched exactly.
        name: String,
        /// First day of the forecast horizon (YYYY-MM-DD). Defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Classify a warehouse stock count under the configured thresholds.
    StockLevel {
        #[arg(allow_negative_numbers = true)]
        stock: i64,
    },
}

/// Rendered command result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub body: String,
    pub exit_code: u8,
}

impl Output {
    fn json<T: Serialize>(value: &T, exit_code: u8) -> Result<Self> {
        Ok(Self {
            body: serde_json::to_string_pretty(value).context("render output")?,
            exit_code,
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug, Serialize)]
struct StockLevelBody {
    stock: i64,
    stock_level: StockLevel,
}

/// Exit code for a forecast failure.
pub fn exit_code(err: &ForecastError) -> u8 {
    match err {
        ForecastError::NotFound(_) => 2,
        ForecastError::NoHistory(_) => 3,
        ForecastError::Internal(_) => 1,
    }
}

pub fn execute(command: &Command, config: &AppConfig) -> Result<Output> {
    match command {
        Command::Forecast { name, date } => {
            let engine = build_engine(config).context("load inventory")?;
            let today = date.unwrap_or_else(|| Utc::now().date_naive());
            debug!(medication = %name, %today, "running forecast");
            match engine.forecast_on(name, today) {
                Ok(report) => Output::json(&report, 0),
                Err(err) => Output::json(
                    &ErrorBody {
                        error: err.kind(),
                        message: err.to_string(),
                    },
                    exit_code(&err),
                ),
            }
        }
        Command::StockLevel { stock } => Output::json(
            &StockLevelBody {
                stock: *stock,
                stock_level: config.stock_levels.classify(*stock),
            },
            0,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parses_forecast_with_date_and_config() {
        let cli = parse(&[
            "pharmastock",
            "forecast",
            "Ibuprofen",
            "--date",
            "2024-05-01",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Forecast { name, date } => {
                assert_eq!(name, "Ibuprofen");
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_date() {
        assert!(
            Cli::try_parse_from(["pharmastock", "forecast", "X", "--date", "01/05/2024"]).is_err()
        );
    }

    #[test]
    fn stock_level_uses_configured_thresholds() {
        let mut config = AppConfig::default();
        let out = execute(&Command::StockLevel { stock: 101 }, &config).unwrap();
        assert_eq!(out.exit_code, 0);
        let body: serde_json::Value = serde_json::from_str(&out.body).unwrap();
        assert_eq!(body["stock_level"], "medium");

        config.stock_levels.low_max = 150;
        let out = execute(&Command::StockLevel { stock: 101 }, &config).unwrap();
        let body: serde_json::Value = serde_json::from_str(&out.body).unwrap();
        assert_eq!(body["stock_level"], "low");
    }

    #[test]
    fn forecast_failures_render_error_bodies() {
        let dir = tempfile::tempdir().unwrap();
        let inventory = dir.path().join("inventory.json");
        let dataset = dir.path().join("orders.csv");
        fs::write(
            &inventory,
            r#"[{"name":"Aspirin","type":"OTC","quantity":3,"price":1.0,"pharmacy":"North","stock":50}]"#,
        )
        .unwrap();
        fs::write(&dataset, "id,order_date,quantity,quantity_ordered,price,stock\n").unwrap();

        let config = AppConfig {
            dataset_path: dataset,
            inventory_path: inventory,
            ..AppConfig::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 1);

        let out = execute(
            &Command::Forecast {
                name: "Unknown".to_string(),
                date,
            },
            &config,
        )
        .unwrap();
        assert_eq!(out.exit_code, 2);
        let body: serde_json::Value = serde_json::from_str(&out.body).unwrap();
        assert_eq!(body["error"], "not_found");

        let out = execute(
            &Command::Forecast {
                name: "Aspirin".to_string(),
                date,
            },
            &config,
        )
        .unwrap();
        assert_eq!(out.exit_code, 3);
        let body: serde_json::Value = serde_json::from_str(&out.body).unwrap();
        assert_eq!(body["error"], "no_history");
    }

    #[test]
    fn missing_inventory_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            inventory_path: dir.path().join("none.json"),
            ..AppConfig::default()
        };
        let cmd = Command::Forecast {
            name: "Aspirin".to_string(),
            date: None,
        };
        assert!(execute(&cmd, &config).is_err());
    }
}
