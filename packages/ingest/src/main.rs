#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the report ingestion tool.

use std::path::{Path, PathBuf};
use std::str::FromStr as _;
use std::time::Instant;

use adreport_cli_utils::{IndicatifProgress, MultiProgress};
use adreport_database::store::parse_column_value;
use adreport_database::{
    BatchedUpsertStore, DuckDbBackend, ListQuery, MemoryBackend, StoreBackend, paths,
};
use adreport_ingest::{enabled_report_types, ingest_file, parse_account_id, record_to_json};
use adreport_ingest_models::{IngestConfig, IngestContext, parse_report_types};
use adreport_report::{IdentityAssigner, ReportRegistry, initialize_registry};
use adreport_report_models::{DateRangeType, HeaderStyle, NaiveDate, ReportType};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "adreport_ingest", about = "Advertising report ingestion tool")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// `DuckDB` file (overrides the config and `ADREPORT_DB_PATH`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered report types
    ReportTypes {
        /// Comma-separated filter (overrides `ADREPORT_REPORT_TYPES` env var)
        #[arg(long)]
        report_types: Option<String>,
    },
    /// Print the API fields to request for a report type
    Properties {
        /// Report type (e.g., `CAMPAIGN_PERFORMANCE_REPORT`)
        report_type: String,
        /// Print one comma-separated line instead of one field per line
        #[arg(long)]
        comma: bool,
    },
    /// Ingest report export files
    Ingest(IngestArgs),
    /// Print stored rows of a report type as JSON lines
    List {
        /// Report type (e.g., `CAMPAIGN_PERFORMANCE_REPORT`)
        report_type: String,
        /// Equality filter `column=value` (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Date column to bound with `--from`/`--to`
        #[arg(long, default_value = "day")]
        date_field: String,
        /// Inclusive lower date bound
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Inclusive upper date bound
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Rows to skip
        #[arg(long, default_value = "0")]
        skip: usize,
        /// Maximum rows to print
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Remove stored rows by identity
    Remove {
        /// Report type (e.g., `CAMPAIGN_PERFORMANCE_REPORT`)
        report_type: String,
        /// Identities to remove
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Args)]
struct IngestArgs {
    /// Export files (CSV, optionally gzip-compressed)
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Report type of every file (defaults to the file's title line)
    #[arg(long)]
    report_type: Option<String>,
    /// Comma-separated report types to accept (overrides `ADREPORT_REPORT_TYPES`)
    #[arg(long)]
    report_types: Option<String>,
    /// Records per committed batch (overrides `ADREPORT_BATCH_SIZE`)
    #[arg(long)]
    batch_size: Option<usize>,
    /// Header matching: `column_headers`, `field_names`, or `detect`
    #[arg(long)]
    header_style: Option<String>,
    /// Lines above the header row
    #[arg(long)]
    title_lines: Option<usize>,
    /// Field delimiter
    #[arg(long)]
    delimiter: Option<char>,
    /// Parent account id stamped onto every row (dashes allowed)
    #[arg(long)]
    top_account_id: Option<String>,
    /// Partner id stamped onto every row
    #[arg(long)]
    partner_id: Option<i64>,
    /// Account id for rows without one (dashes allowed)
    #[arg(long)]
    account_id: Option<String>,
    /// Period the reports were requested for (e.g., `YESTERDAY`)
    #[arg(long)]
    date_range: Option<String>,
    /// Start of a `CUSTOM_DATE` period
    #[arg(long)]
    date_start: Option<NaiveDate>,
    /// End of a `CUSTOM_DATE` period
    #[arg(long)]
    date_end: Option<NaiveDate>,
    /// Decode and identify without writing to the database
    #[arg(long)]
    dry_run: bool,
}

fn parse_report_type(name: &str) -> Result<ReportType, String> {
    ReportType::from_str(name).map_err(|_| format!("Unknown report type: {name}"))
}

fn open_db(config: &IngestConfig) -> Result<DuckDbBackend, Box<dyn std::error::Error>> {
    let path = config.db_path.clone().unwrap_or_else(paths::default_db_path);
    Ok(DuckDbBackend::open(&path)?)
}

#[allow(clippy::too_many_lines)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = adreport_cli_utils::init_logger();
    let cli = Cli::parse();

    let registry = initialize_registry()?;
    let mut config = IngestConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.command {
        Commands::ReportTypes { report_types } => {
            if let Some(filter) = report_types {
                config.report_types = parse_report_types(&filter);
            }
            println!("{:<48} RECORD", "REPORT TYPE");
            println!("{}", "-".repeat(60));
            for report_type in enabled_report_types(&registry, &config.report_types) {
                let schema = registry.schema_for(report_type)?;
                println!("{:<48} {}", report_type, schema.record_name());
            }
        }
        Commands::Properties {
            report_type,
            comma,
        } => {
            let fields = registry.schema_for_name(&report_type)?.properties_to_select();
            if comma {
                println!("{}", fields.join(","));
            } else {
                for field in fields {
                    println!("{field}");
                }
            }
        }
        Commands::Ingest(args) => run_ingest(&registry, config, &args, &multi)?,
        Commands::List {
            report_type,
            filters,
            date_field,
            from,
            to,
            skip,
            limit,
        } => {
            let schema = registry.schema_for_name(&report_type)?;
            let report_type = schema.report_type();

            let mut query = ListQuery::new().skip(skip);
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            if from.is_some() || to.is_some() {
                query = query.between(&date_field, from, to);
            }
            for filter in &filters {
                let (column, value) = filter
                    .split_once('=')
                    .ok_or_else(|| format!("Filter must be column=value, got {filter:?}"))?;
                let value = parse_column_value(schema, column.trim(), value.trim())?;
                query = query.with_filter(column.trim(), value);
            }

            let store =
                BatchedUpsertStore::new(open_db(&config)?, &registry, IdentityAssigner::for_today());
            for record in store.list_by_key_range(report_type, &query)? {
                println!(
                    "{}",
                    serde_json::to_string(&record_to_json(schema, record.as_ref()))?
                );
            }
        }
        Commands::Remove { report_type, ids } => {
            let report_type = registry.schema_for_name(&report_type)?.report_type();
            let mut store =
                BatchedUpsertStore::new(open_db(&config)?, &registry, IdentityAssigner::for_today());
            let removed = store.remove_ids(report_type, &ids)?;
            println!("Removed {removed} of {} rows", ids.len());
        }
    }

    Ok(())
}

fn run_ingest(
    registry: &ReportRegistry,
    mut config: IngestConfig,
    args: &IngestArgs,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(filter) = &args.report_types {
        config.report_types = parse_report_types(filter);
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(style) = &args.header_style {
        config.header_style = HeaderStyle::from_str(style)
            .map_err(|_| format!("Unknown header style: {style}"))?;
    }
    if let Some(title_lines) = args.title_lines {
        config.title_lines = title_lines;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(top_account_id) = &args.top_account_id {
        config.top_account_id = Some(parse_account_id(top_account_id)?);
    }
    if let Some(partner_id) = args.partner_id {
        config.partner_id = Some(partner_id);
    }

    let mut context = IngestContext::from_config(&config);
    context.fallback_account_id = args
        .account_id
        .as_deref()
        .map(parse_account_id)
        .transpose()?;
    context.date_range_type = args
        .date_range
        .as_deref()
        .map(|name| {
            DateRangeType::from_str(name).map_err(|_| format!("Unknown date range: {name}"))
        })
        .transpose()?;
    context.date_start = args.date_start;
    context.date_end = args.date_end;
    context.timestamp = Some(chrono::Utc::now());

    let report_type = args
        .report_type
        .as_deref()
        .map(parse_report_type)
        .transpose()?;

    let assigner = IdentityAssigner::for_today();

    if args.dry_run {
        log::info!("Dry run: records are kept in memory only");
        let mut store = BatchedUpsertStore::new(MemoryBackend::new(), registry, assigner)
            .with_batch_size(config.batch_size);
        ingest_files(&mut store, registry, &config, &context, &args.files, report_type, multi);
        log::info!(
            "Dry run complete: {} records identified",
            store.backend().total_records()
        );
    } else {
        let mut store = BatchedUpsertStore::new(open_db(&config)?, registry, assigner)
            .with_batch_size(config.batch_size);
        ingest_files(&mut store, registry, &config, &context, &args.files, report_type, multi);
    }

    Ok(())
}

/// Ingests each file in turn. A failed file is logged and the next one is
/// attempted.
fn ingest_files<B: StoreBackend>(
    store: &mut BatchedUpsertStore<'_, B>,
    registry: &ReportRegistry,
    config: &IngestConfig,
    context: &IngestContext,
    files: &[PathBuf],
    report_type: Option<ReportType>,
    multi: &MultiProgress,
) {
    let start = Instant::now();
    let files_progress = IndicatifProgress::files_bar(multi, files.len() as u64);
    let mut ingested = 0u64;
    let mut records = 0u64;

    for path in files {
        let rows_progress = IndicatifProgress::rows_bar(multi, &file_label(path));

        match ingest_file(
            store,
            registry,
            config,
            context,
            path,
            report_type,
            rows_progress.as_ref(),
        ) {
            Ok(result) => {
                ingested += 1;
                records += result.records_written;
                rows_progress.discard();
            }
            Err(e) => {
                rows_progress.discard();
                log::error!("Failed to ingest {}: {e}", path.display());
            }
        }

        files_progress.advance(1);
    }

    files_progress.complete(&format!("Ingested {ingested}/{} files", files.len()));
    log::info!(
        "Ingestion complete: {records} records from {ingested}/{} files in {:.1}s",
        files.len(),
        start.elapsed().as_secs_f64()
    );
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
