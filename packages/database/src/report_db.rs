//! `DuckDB` report storage.
//!
//! Each record type gets its own table, `report_{record name}`, keyed by the
//! record identity. Context columns come first, followed by one column per
//! included schema field. Dates are stored as ISO-8601 text so range
//! filters compare lexically. A `_meta` table tracks commit state.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr as _;

use adreport_report::ReportSchema;
use adreport_report_models::{DateRangeType, FieldValue, NaiveDate, ReportRecord, ValueKind};
use chrono::{DateTime, Utc};
use duckdb::Connection;
use duckdb::types::Value;

use crate::StoreError;
use crate::store::{CONTEXT_COLUMNS, ListQuery, StoreBackend, column_value};

/// Rows per INSERT statement.
const CHUNK_SIZE: usize = 1_000;

/// Ids per DELETE statement.
const DELETE_CHUNK_SIZE: usize = 1_000;

/// Report storage in a single `DuckDB` file.
pub struct DuckDbBackend {
    conn: Connection,
    tables: BTreeSet<&'static str>,
}

impl std::fmt::Debug for DuckDbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbBackend")
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

impl DuckDbBackend {
    /// Opens (or creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the data directory or connection cannot be
    /// created.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        log::info!("Opening report database {}", path.display());

        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the connection cannot be created.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn,
            tables: BTreeSet::new(),
        })
    }

    /// Reads a value from the `_meta` table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT value FROM _meta WHERE key = ?")?;
        let result = stmt.query_row([key], |row| row.get(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::DuckDb(e)),
        }
    }

    /// Sets a value in the `_meta` table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the upsert fails.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<(), StoreError> {
        upsert_meta(&self.conn, key, value)
    }

    /// Number of stored rows of `schema`'s record type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub fn record_count(&self, schema: &ReportSchema) -> Result<u64, StoreError> {
        if !self.table_exists(schema)? {
            return Ok(0);
        }

        let sql = format!("SELECT COUNT(*) FROM {}", table_name(schema));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn table_exists(&self, schema: &ReportSchema) -> Result<bool, StoreError> {
        if self.tables.contains(schema.record_name()) {
            return Ok(true);
        }

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            [table_name(schema)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn ensure_table(&mut self, schema: &ReportSchema) -> Result<(), StoreError> {
        if self.tables.contains(schema.record_name()) {
            return Ok(());
        }

        let definitions = columns(schema)
            .iter()
            .map(|(name, kind)| {
                if *name == "id" {
                    "\"id\" TEXT NOT NULL PRIMARY KEY".to_owned()
                } else {
                    format!("\"{name}\" {}", sql_type(*kind))
                }
            })
            .collect::<Vec<_>>()
            .join(",\n    ");

        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {definitions}\n);",
            table_name(schema)
        ))?;

        log::debug!("Ensured table {}", table_name(schema));
        self.tables.insert(schema.record_name());

        Ok(())
    }
}

impl StoreBackend for DuckDbBackend {
    fn commit_batch(
        &mut self,
        schema: &ReportSchema,
        records: &[Box<dyn ReportRecord>],
    ) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        self.ensure_table(schema)?;

        // Keep the last occurrence of each identity; DuckDB rejects a
        // conflict target touched twice by one statement.
        let mut last_seen: BTreeMap<&str, usize> = BTreeMap::new();
        for (i, record) in records.iter().enumerate() {
            let id = record.id().ok_or_else(|| StoreError::Backend {
                message: format!("{} record has no identity", schema.record_name()),
            })?;
            last_seen.insert(id, i);
        }
        let deduped: Vec<&dyn ReportRecord> = records
            .iter()
            .enumerate()
            .filter(|(i, record)| record.id().and_then(|id| last_seen.get(id)) == Some(i))
            .map(|(_, record)| record.as_ref())
            .collect();

        if deduped.len() < records.len() {
            log::info!(
                "Deduplicated INSERT batch: {} -> {} rows ({} duplicates removed)",
                records.len(),
                deduped.len(),
                records.len() - deduped.len(),
            );
        }

        let columns = columns(schema);
        let column_list = columns
            .iter()
            .map(|(name, _)| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let updates = columns
            .iter()
            .filter(|(name, _)| *name != "id")
            .map(|(name, _)| format!("\"{name}\" = EXCLUDED.\"{name}\""))
            .collect::<Vec<_>>()
            .join(", ");
        let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));

        let tx = self.conn.transaction()?;
        let mut total_written = 0u64;

        for chunk in deduped.chunks(CHUNK_SIZE) {
            let mut sql = format!("INSERT INTO {} ({column_list}) VALUES ", table_name(schema));
            sql.push_str(&vec![row_placeholders.as_str(); chunk.len()].join(", "));
            sql.push_str(" ON CONFLICT (\"id\") DO UPDATE SET ");
            sql.push_str(&updates);

            let mut stmt = tx.prepare(&sql)?;
            let mut param_idx = 1usize;

            for record in chunk {
                for (name, _) in &columns {
                    stmt.raw_bind_parameter(param_idx, to_sql_value(column_value(*record, name)))?;
                    param_idx += 1;
                }
            }

            let rows = stmt.raw_execute()?;
            total_written += u64::try_from(rows).unwrap_or(0);
        }

        upsert_meta(&tx, "last_committed_at", &Utc::now().to_rfc3339())?;
        tx.commit()?;

        Ok(total_written)
    }

    fn delete(&mut self, schema: &ReportSchema, ids: &[String]) -> Result<u64, StoreError> {
        if ids.is_empty() || !self.table_exists(schema)? {
            return Ok(0);
        }

        let mut total = 0u64;

        for chunk in ids.chunks(DELETE_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "DELETE FROM {} WHERE \"id\" IN ({placeholders})",
                table_name(schema)
            );
            let mut stmt = self.conn.prepare(&sql)?;

            for (i, id) in chunk.iter().enumerate() {
                stmt.raw_bind_parameter(i + 1, id)?;
            }

            let rows = stmt.raw_execute()?;
            total += u64::try_from(rows).unwrap_or(0);
        }

        Ok(total)
    }

    fn list(
        &self,
        schema: &ReportSchema,
        query: &ListQuery,
    ) -> Result<Vec<Box<dyn ReportRecord>>, StoreError> {
        query.validate(schema)?;

        if !self.table_exists(schema)? {
            return Ok(Vec::new());
        }

        let columns = columns(schema);
        let column_list = columns
            .iter()
            .map(|(name, _)| format!("\"{name}\""))
            .collect::<Vec<_>>()
            .join(", ");

        let mut conditions = Vec::new();
        let mut params = Vec::new();

        for (column, value) in &query.filters {
            conditions.push(format!("\"{column}\" = ?"));
            params.push(to_sql_value(Some(value.clone())));
        }
        if let Some(column) = &query.date_field {
            if let Some(from) = query.date_from {
                conditions.push(format!("\"{column}\" >= ?"));
                params.push(to_sql_value(Some(FieldValue::Date(from))));
            }
            if let Some(to) = query.date_to {
                conditions.push(format!("\"{column}\" <= ?"));
                params.push(to_sql_value(Some(FieldValue::Date(to))));
            }
        }

        let mut sql = format!("SELECT {column_list} FROM {}", table_name(schema));
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY \"id\"");
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if query.skip > 0 {
            sql.push_str(&format!(" OFFSET {}", query.skip));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(duckdb::params_from_iter(params), |row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, (_, kind))| read_cell(row, i, *kind))
                .collect::<duckdb::Result<Vec<_>>>()
        })?;

        let mut records = Vec::new();
        for row in rows {
            let cells = row?;
            let mut record = schema.new_record();
            for ((name, kind), cell) in columns.iter().zip(cells) {
                let value = restore_value(*kind, cell)?;
                set_column(record.as_mut(), name, value)?;
            }
            records.push(record);
        }

        Ok(records)
    }
}

// ── Column mapping ──────────────────────────────────────────────────

/// Cell read back from a row, before date text is parsed.
enum Cell {
    Text(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

fn upsert_meta(conn: &Connection, key: &str, value: &str) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO _meta (key, value) VALUES (?, ?)
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        duckdb::params![key, value],
    )?;
    Ok(())
}

fn table_name(schema: &ReportSchema) -> String {
    format!("report_{}", schema.record_name())
}

/// Context columns, then included schema fields not already among them.
fn columns(schema: &ReportSchema) -> Vec<(&'static str, ValueKind)> {
    let mut columns = CONTEXT_COLUMNS.to_vec();
    columns.extend(
        schema
            .fields()
            .iter()
            .filter(|f| !CONTEXT_COLUMNS.iter().any(|(name, _)| *name == f.name))
            .map(|f| (f.name, f.kind)),
    );
    columns
}

const fn sql_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::String | ValueKind::Date | ValueKind::DateMonth => "TEXT",
        ValueKind::Integer => "BIGINT",
        ValueKind::Money | ValueKind::Percentage | ValueKind::Decimal => "DOUBLE",
        ValueKind::Boolean => "BOOLEAN",
    }
}

fn to_sql_value(value: Option<FieldValue>) -> Value {
    match value {
        Some(FieldValue::Str(s)) => Value::Text(s),
        Some(FieldValue::Int(i)) => Value::BigInt(i),
        Some(FieldValue::Decimal(d)) => Value::Double(d),
        Some(FieldValue::Bool(b)) => Value::Boolean(b),
        Some(FieldValue::Date(d)) => Value::Text(d.format("%Y-%m-%d").to_string()),
        None => Value::Null,
    }
}

fn read_cell(row: &duckdb::Row<'_>, idx: usize, kind: ValueKind) -> duckdb::Result<Option<Cell>> {
    Ok(match kind {
        ValueKind::String | ValueKind::Date | ValueKind::DateMonth => {
            row.get::<_, Option<String>>(idx)?.map(Cell::Text)
        }
        ValueKind::Integer => row.get::<_, Option<i64>>(idx)?.map(Cell::Int),
        ValueKind::Money | ValueKind::Percentage | ValueKind::Decimal => {
            row.get::<_, Option<f64>>(idx)?.map(Cell::Double)
        }
        ValueKind::Boolean => row.get::<_, Option<bool>>(idx)?.map(Cell::Bool),
    })
}

fn restore_value(kind: ValueKind, cell: Option<Cell>) -> Result<Option<FieldValue>, StoreError> {
    let Some(cell) = cell else {
        return Ok(None);
    };

    Ok(Some(match cell {
        Cell::Text(text) if kind.is_date() => {
            let date = NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|e| {
                StoreError::Backend {
                    message: format!("stored date {text:?} is invalid: {e}"),
                }
            })?;
            FieldValue::Date(date)
        }
        Cell::Text(text) => FieldValue::Str(text),
        Cell::Int(i) => FieldValue::Int(i),
        Cell::Double(d) => FieldValue::Decimal(d),
        Cell::Bool(b) => FieldValue::Bool(b),
    }))
}

/// Writes a stored column back onto a record.
fn set_column(
    record: &mut dyn ReportRecord,
    column: &str,
    value: Option<FieldValue>,
) -> Result<(), StoreError> {
    let dims = record.dimensions_mut();

    match (column, value) {
        ("id", Some(FieldValue::Str(id))) => dims.id = Some(id),
        ("account_id", Some(FieldValue::Int(i))) => dims.account_id = Some(i),
        ("top_account_id", Some(FieldValue::Int(i))) => dims.top_account_id = Some(i),
        ("partner_id", Some(FieldValue::Int(i))) => dims.partner_id = Some(i),
        ("timestamp", Some(FieldValue::Str(text))) => {
            dims.timestamp = DateTime::parse_from_rfc3339(&text)
                .ok()
                .map(|t| t.with_timezone(&Utc));
        }
        ("date_range_type", Some(FieldValue::Str(text))) => {
            dims.date_range_type = DateRangeType::from_str(&text).ok();
        }
        ("date_start", Some(FieldValue::Date(d))) => dims.date_start = Some(d),
        ("date_end", Some(FieldValue::Date(d))) => dims.date_end = Some(d),
        (column, value) if CONTEXT_COLUMNS.iter().any(|(name, _)| *name == column) => {
            if value.is_some() {
                return Err(StoreError::Backend {
                    message: format!("unexpected stored value for {column}"),
                });
            }
        }
        (column, value) => record.set_field(column, value)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use adreport_report::{IdentityAssigner, ReportRegistry, decode, initialize_registry};
    use adreport_report_models::ReportType;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2013, 5, 15).unwrap()
    }

    fn campaign_rows(registry: &ReportRegistry, rows: &[[&str; 5]]) -> Vec<Box<dyn ReportRecord>> {
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let assigner = IdentityAssigner::new(today());

        rows.iter()
            .map(|cells| {
                let mut record = decode(
                    schema,
                    &["Customer ID", "Campaign ID", "Month", "Clicks", "CTR"],
                    cells,
                )
                .unwrap();
                assigner.assign(record.as_mut()).unwrap();
                record
            })
            .collect()
    }

    #[test]
    fn stores_and_reads_back_typed_columns() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = DuckDbBackend::open_in_memory().unwrap();

        let mut rows = campaign_rows(&registry, &[["555", "42", "2013-05", "10", "12.16%"]]);
        rows[0].dimensions_mut().date_range_type = Some(DateRangeType::ThisMonth);

        assert_eq!(backend.commit_batch(schema, &rows).unwrap(), 1);
        assert_eq!(backend.record_count(schema).unwrap(), 1);

        let stored = backend.list(schema, &ListQuery::new()).unwrap();
        assert_eq!(stored.len(), 1);

        let record = &stored[0];
        assert_eq!(record.id(), Some("555-42-2013-05"));
        assert_eq!(record.dimensions().account_id, Some(555));
        assert_eq!(record.field("campaign_id"), Some(FieldValue::Int(42)));
        assert_eq!(record.dimensions().month, NaiveDate::from_ymd_opt(2013, 5, 1));
        assert_eq!(
            record.dimensions().date_range_type,
            Some(DateRangeType::ThisMonth)
        );
        assert!((record.dimensions().ctr.unwrap() - 0.1216).abs() < 1e-9);
        assert_eq!(record.dimensions().cost, None);
    }

    #[test]
    fn upserts_overwrite_by_identity() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = DuckDbBackend::open_in_memory().unwrap();

        backend
            .commit_batch(
                schema,
                &campaign_rows(&registry, &[["1", "2", "2013-05", "10", "1%"]]),
            )
            .unwrap();
        backend
            .commit_batch(
                schema,
                &campaign_rows(
                    &registry,
                    &[
                        ["1", "2", "2013-05", "20", "1%"],
                        ["1", "2", "2013-05", "30", "1%"],
                    ],
                ),
            )
            .unwrap();

        let stored = backend.list(schema, &ListQuery::new()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].dimensions().clicks, Some(30));
        assert!(backend.get_meta("last_committed_at").unwrap().is_some());
    }

    #[test]
    fn commit_timestamp_is_part_of_the_batch() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = DuckDbBackend::open_in_memory().unwrap();
        backend.conn.execute_batch("DROP TABLE _meta;").unwrap();

        let rows = campaign_rows(&registry, &[["1", "2", "2013-05", "10", "1%"]]);
        assert!(backend.commit_batch(schema, &rows).is_err());
        assert_eq!(backend.record_count(schema).unwrap(), 0);
    }

    #[test]
    fn filters_bounds_and_pages() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = DuckDbBackend::open_in_memory().unwrap();

        backend
            .commit_batch(
                schema,
                &campaign_rows(
                    &registry,
                    &[
                        ["1", "2", "2013-03", "1", "1%"],
                        ["1", "2", "2013-04", "2", "1%"],
                        ["1", "2", "2013-05", "3", "1%"],
                        ["7", "2", "2013-04", "4", "1%"],
                    ],
                ),
            )
            .unwrap();

        let query = ListQuery::month_reports(
            1,
            NaiveDate::from_ymd_opt(2013, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2013, 12, 1).unwrap(),
            0,
            1,
        );
        let page = backend.list(schema, &query).unwrap();
        let ids: Vec<&str> = page.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, ["1-2-2013-04"]);

        let query = ListQuery::month_reports(
            1,
            NaiveDate::from_ymd_opt(2013, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2013, 12, 1).unwrap(),
            1,
            1,
        );
        let page = backend.list(schema, &query).unwrap();
        let ids: Vec<&str> = page.iter().filter_map(|r| r.id()).collect();
        assert_eq!(ids, ["1-2-2013-05"]);
    }

    #[test]
    fn deletes_by_identity() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = DuckDbBackend::open_in_memory().unwrap();

        assert_eq!(backend.delete(schema, &["nothing".to_owned()]).unwrap(), 0);

        backend
            .commit_batch(
                schema,
                &campaign_rows(
                    &registry,
                    &[
                        ["1", "2", "2013-04", "1", "1%"],
                        ["1", "3", "2013-04", "1", "1%"],
                    ],
                ),
            )
            .unwrap();

        let removed = backend
            .delete(schema, &["1-2-2013-04".to_owned(), "1-9-2013-04".to_owned()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.record_count(schema).unwrap(), 1);
    }

    #[test]
    fn listing_an_unwritten_type_is_empty() {
        let registry = initialize_registry().unwrap();
        let schema = registry.schema_for(ReportType::GeoPerformanceReport).unwrap();
        let backend = DuckDbBackend::open_in_memory().unwrap();

        assert!(backend.list(schema, &ListQuery::new()).unwrap().is_empty());
        assert_eq!(backend.record_count(schema).unwrap(), 0);
    }

    #[test]
    fn meta_round_trips() {
        let backend = DuckDbBackend::open_in_memory().unwrap();
        assert_eq!(backend.get_meta("missing").unwrap(), None);

        backend.set_meta("k", "v1").unwrap();
        backend.set_meta("k", "v2").unwrap();
        assert_eq!(backend.get_meta("k").unwrap().as_deref(), Some("v2"));
    }
}
