//! Tracing/logging initialization.
//!
//! `RUST_LOG`, when set, takes precedence over the configured level.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging section of the application config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset (`trace` .. `error`).
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown log level {0:?} (expected one of trace, debug, info, warn, error)")]
pub struct LogConfigError(pub String);

impl LogConfig {
    pub fn validate(&self) -> Result<(), LogConfigError> {
        let level = self.level.trim().to_ascii_lowercase();
        if LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(LogConfigError(self.level.clone()))
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.trim().to_ascii_lowercase()))
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Logs go to
/// stderr so stdout stays reserved for command output.
pub fn init(config: &LogConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr);

    let _ = if config.json {
        builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init()
    } else {
        builder.with_target(false).try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_is_info() {
        let c = LogConfig::default();
        assert_eq!(c.level, "info");
        assert!(!c.json);
        c.validate().unwrap();
    }

    #[test]
    fn level_check_ignores_case() {
        let c = LogConfig {
            level: "WARN".to_string(),
            json: true,
        };
        c.validate().unwrap();
    }

    #[test]
    fn rejects_unknown_level() {
        let c = LogConfig {
            level: "verbose".to_string(),
            json: false,
        };
        assert_eq!(c.validate(), Err(LogConfigError("verbose".to_string())));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let c: LogConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert_eq!(c.level, "info");
        assert!(c.json);
    }

    #[test]
    fn init_twice_is_harmless() {
        init(&LogConfig::default());
        init(&LogConfig {
            level: "debug".to_string(),
            json: true,
        });
    }
}
