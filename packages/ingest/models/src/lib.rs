#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion configuration, per-run context, progress, and result types.

pub mod progress;

use std::path::{Path, PathBuf};
use std::str::FromStr as _;
use std::time::Duration;

use adreport_report_models::{DateRangeType, Dimensions, HeaderStyle, NaiveDate, ReportType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use progress::{IngestProgress, NullProgress};

/// Environment variable overriding [`IngestConfig::db_path`].
pub const DB_PATH_ENV: &str = "ADREPORT_DB_PATH";
/// Environment variable overriding [`IngestConfig::batch_size`].
pub const BATCH_SIZE_ENV: &str = "ADREPORT_BATCH_SIZE";
/// Environment variable holding a comma-separated report type filter.
pub const REPORT_TYPES_ENV: &str = "ADREPORT_REPORT_TYPES";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`IngestConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Settings for an ingestion run.
///
/// Loaded from an optional TOML file, then overridden by `ADREPORT_*`
/// environment variables, then by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// `DuckDB` file to write to. `None` uses the default data path.
    pub db_path: Option<PathBuf>,
    /// Records per committed batch.
    pub batch_size: usize,
    /// How export headers are matched.
    pub header_style: HeaderStyle,
    /// Lines above the header row.
    pub title_lines: usize,
    /// Field delimiter.
    pub delimiter: char,
    /// Report types to accept. Empty accepts all.
    pub report_types: Vec<ReportType>,
    /// Parent account stamped onto every record.
    pub top_account_id: Option<i64>,
    /// Partner stamped onto every record.
    pub partner_id: Option<i64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            batch_size: 50,
            header_style: HeaderStyle::Detect,
            title_lines: 1,
            delimiter: ',',
            report_types: Vec::new(),
            top_account_id: None,
            partner_id: None,
        }
    }
}

impl IngestConfig {
    /// Parses a TOML config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is invalid.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads the config file at `path` (defaults when `None`) and applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or an
    /// environment override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };

        config.apply_env()?;

        Ok(config)
    }

    /// Applies `ADREPORT_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if an override cannot be parsed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// Unknown names in the report type filter are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if the batch size is not a
    /// positive integer.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DB_PATH_ENV) {
            self.db_path = Some(PathBuf::from(path));
        }

        if let Some(value) = lookup(BATCH_SIZE_ENV) {
            self.batch_size = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidEnv {
                    var: BATCH_SIZE_ENV,
                    value,
                })?;
        }

        if let Some(value) = lookup(REPORT_TYPES_ENV) {
            self.report_types = parse_report_types(&value);
        }

        Ok(())
    }
}

/// Parses a comma-separated list of report type names, skipping unknown
/// names with a warning.
#[must_use]
pub fn parse_report_types(list: &str) -> Vec<ReportType> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            ReportType::from_str(name)
                .inspect_err(|_| log::warn!("Ignoring unknown report type {name:?}"))
                .ok()
        })
        .collect()
}

/// Values stamped onto every record of one ingestion run before identities
/// are assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestContext {
    pub top_account_id: Option<i64>,
    pub partner_id: Option<i64>,
    /// Period the report was requested for.
    pub date_range_type: Option<DateRangeType>,
    /// Explicit period bounds, for `CUSTOM_DATE` reports.
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    /// Account used for rows that carry no account id column.
    pub fallback_account_id: Option<i64>,
    /// Ingestion time. `None` leaves records unstamped.
    pub timestamp: Option<DateTime<Utc>>,
}

impl IngestContext {
    /// Context carrying the config's parent account and partner.
    #[must_use]
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            top_account_id: config.top_account_id,
            partner_id: config.partner_id,
            ..Self::default()
        }
    }

    /// Stamps the context onto `dims`. Values already decoded from the row
    /// take precedence.
    pub fn apply_to(&self, dims: &mut Dimensions) {
        if dims.account_id.is_none() {
            dims.account_id = self.fallback_account_id;
        }
        if self.top_account_id.is_some() {
            dims.top_account_id = self.top_account_id;
        }
        if self.partner_id.is_some() {
            dims.partner_id = self.partner_id;
        }
        if dims.date_range_type.is_none() {
            dims.date_range_type = self.date_range_type;
        }
        if dims.date_start.is_none() {
            dims.date_start = self.date_start;
        }
        if dims.date_end.is_none() {
            dims.date_end = self.date_end;
        }
        if dims.timestamp.is_none() {
            dims.timestamp = self.timestamp;
        }
    }
}

/// Outcome of ingesting one report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResult {
    pub report_type: ReportType,
    /// Data rows decoded (summary rows excluded).
    pub rows_read: u64,
    /// `Total` rows dropped from the end of the file.
    pub summary_rows: u64,
    /// Records handed to the store.
    pub records_written: u64,
    /// Batches committed.
    pub commits: u64,
    /// How long the ingestion took.
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults_match_an_empty_file() {
        let config = IngestConfig::from_toml_str("").unwrap();
        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.title_lines, 1);
        assert_eq!(config.delimiter, ',');
        assert_eq!(config.header_style, HeaderStyle::Detect);
    }

    #[test]
    fn parses_toml() {
        let config = IngestConfig::from_toml_str(
            r#"
            db_path = "/tmp/reports.duckdb"
            batch_size = 200
            header_style = "field_names"
            title_lines = 0
            delimiter = "\t"
            report_types = ["CAMPAIGN_PERFORMANCE_REPORT", "GEO_PERFORMANCE_REPORT"]
            top_account_id = 99
            "#,
        )
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/reports.duckdb")));
        assert_eq!(config.batch_size, 200);
        assert_eq!(config.header_style, HeaderStyle::FieldNames);
        assert_eq!(config.title_lines, 0);
        assert_eq!(config.delimiter, '\t');
        assert_eq!(
            config.report_types,
            [
                ReportType::CampaignPerformanceReport,
                ReportType::GeoPerformanceReport
            ]
        );
        assert_eq!(config.top_account_id, Some(99));
        assert_eq!(config.partner_id, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            IngestConfig::from_toml_str("batch = 3"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: BTreeMap<&str, &str> = [
            (DB_PATH_ENV, "other.duckdb"),
            (BATCH_SIZE_ENV, "75"),
            (REPORT_TYPES_ENV, "URL_PERFORMANCE_REPORT, NOT_A_REPORT"),
        ]
        .into_iter()
        .collect();

        let mut config = IngestConfig::from_toml_str("batch_size = 10").unwrap();
        config
            .apply_env_from(|var| env.get(var).map(|v| (*v).to_owned()))
            .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("other.duckdb")));
        assert_eq!(config.batch_size, 75);
        assert_eq!(config.report_types, [ReportType::UrlPerformanceReport]);
    }

    #[test]
    fn invalid_batch_size_is_an_error() {
        let mut config = IngestConfig::default();
        let err = config
            .apply_env_from(|var| (var == BATCH_SIZE_ENV).then(|| "0".to_owned()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: BATCH_SIZE_ENV,
                ..
            }
        ));
    }

    #[test]
    fn context_fills_gaps_without_overwriting_row_values() {
        let context = IngestContext {
            top_account_id: Some(1),
            partner_id: Some(2),
            date_range_type: Some(DateRangeType::Yesterday),
            fallback_account_id: Some(3),
            ..IngestContext::default()
        };

        let mut decoded = Dimensions {
            account_id: Some(7),
            ..Dimensions::default()
        };
        context.apply_to(&mut decoded);
        assert_eq!(decoded.account_id, Some(7));
        assert_eq!(decoded.top_account_id, Some(1));
        assert_eq!(decoded.partner_id, Some(2));
        assert_eq!(decoded.date_range_type, Some(DateRangeType::Yesterday));

        let mut bare = Dimensions::default();
        context.apply_to(&mut bare);
        assert_eq!(bare.account_id, Some(3));
    }
}
