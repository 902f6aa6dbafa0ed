#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for ingesting advertising performance report exports into the
//! report database.
//!
//! A file is read into header and data rows, every row is decoded against
//! the report type's schema, the run's [`IngestContext`] is stamped onto each
//! record, and the records are persisted through a
//! [`BatchedUpsertStore`] one batch at a time as they are decoded.

use std::num::ParseIntError;
use std::path::Path;
use std::time::Instant;

use adreport_database::store::{CONTEXT_COLUMNS, column_value};
use adreport_database::{BatchedUpsertStore, StoreBackend, StoreError};
use adreport_ingest_models::{IngestConfig, IngestContext, IngestProgress, IngestResult};
use adreport_report::{
    ColumnPlan, DecodeError, ReaderError, RegistryError, ReportFile, ReportReader, ReportRegistry,
    ReportSchema,
};
use adreport_report_models::{HeaderStyle, ReportRecord, ReportType};

/// Errors that can occur while ingesting a report file.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file could not be read.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// A row could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The report type has no schema.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Records could not be stored.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Neither the caller nor the file title names the report type.
    #[error("Cannot determine the report type of {file}")]
    UnknownReportType {
        /// File being ingested.
        file: String,
    },

    /// The report type is filtered out by the configuration.
    #[error("Report type {report_type} is not enabled")]
    ReportTypeDisabled {
        /// Report type of the file.
        report_type: ReportType,
    },

    /// The configured delimiter is not a single-byte character.
    #[error("Delimiter {0:?} is not a single-byte character")]
    InvalidDelimiter(char),
}

/// Returns the report types to ingest, filtered by `filter` (from the
/// `--report-types` flag or the `ADREPORT_REPORT_TYPES` environment
/// variable). An empty filter enables every registered type.
#[must_use]
pub fn enabled_report_types(registry: &ReportRegistry, filter: &[ReportType]) -> Vec<ReportType> {
    let all = registry.report_types();

    if filter.is_empty() {
        return all;
    }

    let enabled: Vec<ReportType> = all.into_iter().filter(|t| filter.contains(t)).collect();

    if enabled.is_empty() {
        log::warn!(
            "No registered report types match {:?}. Available: {}",
            filter,
            registry
                .report_types()
                .iter()
                .map(ReportType::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    enabled
}

/// Parses an account id written with or without dashes (`123-456-7890`).
///
/// # Errors
///
/// Returns [`ParseIntError`] if the remaining text is not an integer.
pub fn parse_account_id(text: &str) -> Result<i64, ParseIntError> {
    text.trim().replace('-', "").parse()
}

/// Account id embedded in an export file name
/// (`{prefix}-{report}-{account id}-...`): the third `-`-separated segment,
/// when it is all digits.
#[must_use]
pub fn account_id_from_file_name(path: &Path) -> Option<i64> {
    let name = path.file_name()?.to_str()?;
    let segment = name.split('-').nth(2)?;

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    segment.parse().ok()
}

/// Decodes the rows of `report`, stamps `context` onto each record, and
/// persists them batch by batch as they are decoded.
///
/// # Errors
///
/// * [`IngestError::Decode`] if a row is malformed; the batch it falls in
///   is dropped
/// * [`IngestError::Store`] if identities cannot be assigned or a batch
///   fails to commit
///
/// Either way, batches committed before the failure stay committed.
pub fn ingest_rows<B: StoreBackend>(
    store: &mut BatchedUpsertStore<'_, B>,
    schema: &ReportSchema,
    style: HeaderStyle,
    context: &IngestContext,
    report: &ReportFile,
    progress: &dyn IngestProgress,
) -> Result<IngestResult, IngestError> {
    let start = Instant::now();
    let plan = ColumnPlan::new(schema, report.headers.as_slice(), style);

    let matched = plan.matched_fields().count();
    if matched < report.headers.len() {
        log::warn!(
            "{}: {} of {} columns not recognized ({} header style)",
            schema.report_type(),
            report.headers.len() - matched,
            report.headers.len(),
            plan.style(),
        );
    }

    progress.begin(report.rows.len() as u64);

    progress.stage(&format!("Storing {}", schema.report_type()));
    let records = report.rows.iter().enumerate().map(|(i, row)| {
        let mut record = plan.decode_row(i, row.as_slice())?;
        context.apply_to(record.dimensions_mut());
        progress.advance(1);
        Ok::<_, IngestError>(record)
    });
    let summary = store.try_persist(records)?;

    let elapsed = start.elapsed();
    log::info!(
        "Ingested {} {} rows: {} records in {} commits, took {:.1}s",
        report.rows.len(),
        schema.report_type(),
        summary.records_written,
        summary.commits,
        elapsed.as_secs_f64()
    );

    Ok(IngestResult {
        report_type: schema.report_type(),
        rows_read: report.rows.len() as u64,
        summary_rows: report.summary_rows as u64,
        records_written: summary.records_written,
        commits: summary.commits,
        duration: elapsed,
    })
}

/// Reads and ingests one export file.
///
/// The report type is `report_type` when given, otherwise the one named by
/// the file's title line. Rows without an account id fall back to the
/// context's fallback account, then to the id in the file name.
///
/// # Errors
///
/// Returns [`IngestError`] if the file cannot be read, its report type is
/// unknown or disabled, or decoding or storing fails.
pub fn ingest_file<B: StoreBackend>(
    store: &mut BatchedUpsertStore<'_, B>,
    registry: &ReportRegistry,
    config: &IngestConfig,
    context: &IngestContext,
    path: &Path,
    report_type: Option<ReportType>,
    progress: &dyn IngestProgress,
) -> Result<IngestResult, IngestError> {
    let delimiter =
        u8::try_from(config.delimiter).map_err(|_| IngestError::InvalidDelimiter(config.delimiter))?;

    let report = ReportReader::new()
        .with_delimiter(delimiter)
        .with_title_lines(config.title_lines)
        .read_path(path)?;

    let report_type = report_type
        .or_else(|| report.title_report_type())
        .ok_or_else(|| IngestError::UnknownReportType {
            file: path.display().to_string(),
        })?;

    if !config.report_types.is_empty() && !config.report_types.contains(&report_type) {
        return Err(IngestError::ReportTypeDisabled { report_type });
    }

    let schema = registry.schema_for(report_type)?;

    let mut context = context.clone();
    if context.fallback_account_id.is_none() {
        context.fallback_account_id = account_id_from_file_name(path);
    }

    ingest_rows(store, schema, config.header_style, &context, &report, progress)
}

/// Renders a stored record as a JSON object of its context columns and
/// schema fields. Unset values are `null`.
#[must_use]
pub fn record_to_json(
    schema: &ReportSchema,
    record: &dyn ReportRecord,
) -> serde_json::Map<String, serde_json::Value> {
    let names = CONTEXT_COLUMNS.iter().map(|(name, _)| *name).chain(
        schema
            .fields()
            .iter()
            .map(|f| f.name)
            .filter(|name| !CONTEXT_COLUMNS.iter().any(|(c, _)| c == name)),
    );

    names
        .map(|name| {
            let value = column_value(record, name)
                .and_then(|v| serde_json::to_value(v).ok())
                .unwrap_or(serde_json::Value::Null);
            (name.to_owned(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::PathBuf;

    use adreport_database::MemoryBackend;
    use adreport_ingest_models::NullProgress;
    use adreport_report::{IdentityAssigner, initialize_registry};
    use adreport_report_models::{DateRangeType, NaiveDate};

    use super::*;

    const CAMPAIGN_EXPORT: &str = "\
\"CAMPAIGN_PERFORMANCE_REPORT (May 1, 2013)\"
Campaign ID,Campaign,Day,Device,Clicks,Impressions,CTR,Cost
42,Brand,2013-05-01,Computers,10,1978,0.51%,3.50
42,Brand,2013-05-01,Mobile devices with full browsers,2,300,0.67%,0.80
43,Generic,2013-05-01,Computers,,,--,
Total,--,--,--,12,2278,0.53%,4.30
";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 5, 15).unwrap()
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("adreport_ingest_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_dashed_account_ids() {
        assert_eq!(parse_account_id("123-456-7890").unwrap(), 1_234_567_890);
        assert_eq!(parse_account_id(" 42 ").unwrap(), 42);
        assert!(parse_account_id("abc").is_err());
    }

    #[test]
    fn reads_account_ids_from_file_names() {
        assert_eq!(
            account_id_from_file_name(Path::new("/tmp/report-campaign-1234567890-2013.csv")),
            Some(1_234_567_890)
        );
        assert_eq!(
            account_id_from_file_name(Path::new("report-campaign-abc-2013.csv")),
            None
        );
        assert_eq!(account_id_from_file_name(Path::new("report.csv")), None);
    }

    #[test]
    fn filters_enabled_report_types() {
        let registry = initialize_registry().unwrap();

        assert_eq!(
            enabled_report_types(&registry, &[]).len(),
            registry.report_types().len()
        );
        assert_eq!(
            enabled_report_types(&registry, &[ReportType::GeoPerformanceReport]),
            [ReportType::GeoPerformanceReport]
        );
    }

    #[test]
    fn ingests_a_file_named_by_its_title() {
        let registry = initialize_registry().unwrap();
        let mut store =
            BatchedUpsertStore::new(MemoryBackend::new(), &registry, IdentityAssigner::new(today()))
                .with_batch_size(2);
        let path = write_temp("report-campaign-555-20130501.csv", CAMPAIGN_EXPORT);

        let context = IngestContext {
            top_account_id: Some(9),
            date_range_type: Some(DateRangeType::Yesterday),
            ..IngestContext::default()
        };

        let result = ingest_file(
            &mut store,
            &registry,
            &IngestConfig::default(),
            &context,
            &path,
            None,
            &NullProgress,
        )
        .unwrap();

        assert_eq!(result.report_type, ReportType::CampaignPerformanceReport);
        assert_eq!(result.rows_read, 3);
        assert_eq!(result.summary_rows, 1);
        assert_eq!(result.records_written, 3);
        assert_eq!(result.commits, 2);

        let rows = store
            .list_by_type(ReportType::CampaignPerformanceReport)
            .unwrap();
        let ids: Vec<&str> = rows.iter().filter_map(|r| r.id()).collect();
        assert_eq!(
            ids,
            [
                "555-42-2013-05-01---Computers",
                "555-42-2013-05-01---Mobile devices with full browsers",
                "555-43-2013-05-01---Computers",
            ]
        );

        let generic = &rows[2];
        assert_eq!(generic.dimensions().top_account_id, Some(9));
        assert_eq!(generic.dimensions().clicks, Some(0));
        assert_eq!(generic.dimensions().cost, None);
    }

    #[test]
    fn malformed_row_drops_only_its_batch() {
        let registry = initialize_registry().unwrap();
        let mut store =
            BatchedUpsertStore::new(MemoryBackend::new(), &registry, IdentityAssigner::new(today()));

        let mut contents = String::from("title\nCampaign ID,Day,Clicks,Impressions\n");
        for i in 0..120 {
            if i == 110 {
                contents.push_str("110,2013-05-01\n");
            } else {
                contents.push_str(&format!("{i},2013-05-01,3,40\n"));
            }
        }
        let path = write_temp("report-campaign-7-short.csv", &contents);

        let err = ingest_file(
            &mut store,
            &registry,
            &IngestConfig::default(),
            &IngestContext::default(),
            &path,
            Some(ReportType::CampaignPerformanceReport),
            &NullProgress,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Decode(DecodeError::MalformedRow {
                row: 110,
                expected: 4,
                actual: 2
            })
        ));
        assert_eq!(store.backend().total_records(), 100);
    }

    #[test]
    fn untitled_files_need_an_explicit_report_type() {
        let registry = initialize_registry().unwrap();
        let mut store =
            BatchedUpsertStore::new(MemoryBackend::new(), &registry, IdentityAssigner::new(today()));
        let path = write_temp("untitled.csv", "some title\nCustomer ID,Clicks\n1,2\n");

        let err = ingest_file(
            &mut store,
            &registry,
            &IngestConfig::default(),
            &IngestContext::default(),
            &path,
            None,
            &NullProgress,
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::UnknownReportType { .. }));
    }

    #[test]
    fn disabled_report_types_are_rejected() {
        let registry = initialize_registry().unwrap();
        let mut store =
            BatchedUpsertStore::new(MemoryBackend::new(), &registry, IdentityAssigner::new(today()));
        let path = write_temp("report-campaign-555-disabled.csv", CAMPAIGN_EXPORT);

        let config = IngestConfig {
            report_types: vec![ReportType::GeoPerformanceReport],
            ..IngestConfig::default()
        };

        let err = ingest_file(
            &mut store,
            &registry,
            &config,
            &IngestContext::default(),
            &path,
            None,
            &NullProgress,
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::ReportTypeDisabled { .. }));
    }

    #[test]
    fn renders_records_as_json() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let mut record = adreport_report::decode(
            schema,
            &["ExternalCustomerId", "Date", "Clicks", "Ctr"],
            &["123", "2013-05-01", "10", "0.51%"],
        )
        .unwrap();
        IdentityAssigner::new(today())
            .assign(record.as_mut())
            .unwrap();

        let json = record_to_json(schema, record.as_ref());

        assert_eq!(json["id"], "123-2013-05-01");
        assert_eq!(json["account_id"], 123);
        assert_eq!(json["day"], "2013-05-01");
        assert_eq!(json["clicks"], 10);
        assert_eq!(json["cost"], serde_json::Value::Null);
        assert!((json["ctr"].as_f64().unwrap() - 0.0051).abs() < 1e-9);
    }
}
