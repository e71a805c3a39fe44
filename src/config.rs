//! Configuration management for the feature pipeline

use crate::pipeline::DEFAULT_REFRESH_WINDOW_DAYS;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub ingest: IngestConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    pub logging: LoggingConfig,
}

/// Raw input locations
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// JSONL file of raw account records
    pub accounts_path: String,
    /// JSONL file of raw transaction records
    pub transactions_path: String,
}

/// Relation storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the materialized relations
    pub data_dir: String,
}

/// Hourly aggregate refresh configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    /// Trailing refresh window in days
    #[serde(default = "default_refresh_window_days")]
    pub refresh_window_days: u32,
    /// Reference date for the refresh window (YYYY-MM-DD); the current UTC
    /// date when unset. Pin it when replaying historical batches.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

fn default_refresh_window_days() -> u32 {
    DEFAULT_REFRESH_WINDOW_DAYS
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ingest: IngestConfig {
                accounts_path: "data/raw/accounts.jsonl".to_string(),
                transactions_path: "data/raw/transactions.jsonl".to_string(),
            },
            storage: StorageConfig {
                data_dir: "data/warehouse".to_string(),
            },
            aggregation: AggregationConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            refresh_window_days: DEFAULT_REFRESH_WINDOW_DAYS,
            as_of: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.data_dir, "data/warehouse");
        assert_eq!(config.ingest.accounts_path, "data/raw/accounts.jsonl");
        assert_eq!(config.aggregation.refresh_window_days, 7);
        assert!(config.aggregation.as_of.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[ingest]
accounts_path = "fixtures/accounts.jsonl"
transactions_path = "fixtures/transactions.jsonl"

[storage]
data_dir = "/tmp/warehouse"

[aggregation]
refresh_window_days = 3
as_of = "2020-07-01"

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();

        assert_eq!(config.ingest.accounts_path, "fixtures/accounts.jsonl");
        assert_eq!(config.aggregation.refresh_window_days, 3);
        assert_eq!(
            config.aggregation.as_of,
            Some(NaiveDate::from_ymd_opt(2020, 7, 1).unwrap())
        );
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_aggregation_section_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[ingest]
accounts_path = "a.jsonl"
transactions_path = "t.jsonl"

[storage]
data_dir = "warehouse"

[logging]
level = "info"
format = "pretty"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();

        assert_eq!(config.aggregation.refresh_window_days, 7);
        assert!(config.aggregation.as_of.is_none());
    }
}
