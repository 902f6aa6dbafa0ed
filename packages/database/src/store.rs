//! Batched upsert store.
//!
//! Records are buffered and handed to the backend `batch_size` at a time.
//! Each batch is one unit of work: it commits completely or not at all, and
//! a failure stops the run with every earlier batch already committed.

use std::collections::BTreeSet;

use adreport_report::parsing;
use adreport_report::{IdentityAssigner, ReportRegistry, ReportSchema};
use adreport_report_models::{FieldValue, NaiveDate, ReportRecord, ReportType, ValueKind};

use crate::StoreError;

/// Records per committed batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Columns every stored record carries ahead of its schema fields.
pub const CONTEXT_COLUMNS: &[(&str, ValueKind)] = &[
    ("id", ValueKind::String),
    ("account_id", ValueKind::Integer),
    ("top_account_id", ValueKind::Integer),
    ("partner_id", ValueKind::Integer),
    ("timestamp", ValueKind::String),
    ("date_range_type", ValueKind::String),
    ("date_start", ValueKind::Date),
    ("date_end", ValueKind::Date),
];

/// Downstream persistence engine.
pub trait StoreBackend {
    /// Upserts `records` (all of `schema`'s type) by identity as one unit
    /// of work. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the batch cannot be written; nothing from
    /// the batch is kept in that case.
    fn commit_batch(
        &mut self,
        schema: &ReportSchema,
        records: &[Box<dyn ReportRecord>],
    ) -> Result<u64, StoreError>;

    /// Deletes rows by identity. Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the delete fails.
    fn delete(&mut self, schema: &ReportSchema, ids: &[String]) -> Result<u64, StoreError>;

    /// Lists stored rows matching `query`, ordered by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query names unknown columns or fails.
    fn list(
        &self,
        schema: &ReportSchema,
        query: &ListQuery,
    ) -> Result<Vec<Box<dyn ReportRecord>>, StoreError>;
}

/// Filters and pagination for listing stored rows.
///
/// Equality filters are ANDed; date bounds are inclusive; `skip` and
/// `limit` apply after filtering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, FieldValue)>,
    pub date_field: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Monthly rows of one account between two months, one page at a time.
    #[must_use]
    pub fn month_reports(
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        page: usize,
        amount: usize,
    ) -> Self {
        Self::new()
            .with_filter("account_id", FieldValue::Int(account_id))
            .between("month", Some(from), Some(to))
            .skip(page * amount)
            .limit(amount)
    }

    #[must_use]
    pub fn with_filter(mut self, column: &str, value: FieldValue) -> Self {
        self.filters.push((column.to_owned(), value));
        self
    }

    /// Bounds `column` to `[from, to]`; either side may be open.
    #[must_use]
    pub fn between(mut self, column: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_field = Some(column.to_owned());
        self.date_from = from;
        self.date_to = to;
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Columns referenced by the query.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .map(|(c, _)| c.as_str())
            .chain(self.date_field.as_deref())
    }

    /// Checks every referenced column exists in `schema`, and that the
    /// date bound column holds dates.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownColumn`] otherwise.
    pub fn validate(&self, schema: &ReportSchema) -> Result<(), StoreError> {
        let unknown = |column: &str| StoreError::UnknownColumn {
            record: schema.record_name(),
            column: column.to_owned(),
        };

        for column in self.columns() {
            if column_kind(schema, column).is_none() {
                return Err(unknown(column));
            }
        }

        if let Some(column) = &self.date_field {
            if !column_kind(schema, column).is_some_and(ValueKind::is_date) {
                return Err(unknown(column));
            }
        }

        Ok(())
    }

    /// Whether `record` passes the filters and date bounds.
    #[must_use]
    pub fn matches(&self, record: &dyn ReportRecord) -> bool {
        let filters_match = self
            .filters
            .iter()
            .all(|(column, value)| column_value(record, column).as_ref() == Some(value));

        if !filters_match {
            return false;
        }

        let Some(column) = &self.date_field else {
            return true;
        };

        match column_value(record, column) {
            Some(FieldValue::Date(d)) => {
                self.date_from.is_none_or(|from| d >= from) && self.date_to.is_none_or(|to| d <= to)
            }
            _ => self.date_from.is_none() && self.date_to.is_none(),
        }
    }
}

/// Kind of a stored column: a context column or an included schema field.
#[must_use]
pub fn column_kind(schema: &ReportSchema, column: &str) -> Option<ValueKind> {
    CONTEXT_COLUMNS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, kind)| *kind)
        .or_else(|| schema.field(column).map(|f| f.kind))
}

/// Value of a stored column on `record`.
#[must_use]
pub fn column_value(record: &dyn ReportRecord, column: &str) -> Option<FieldValue> {
    let dims = record.dimensions();

    match column {
        "id" => dims.id.clone().map(FieldValue::Str),
        "account_id" => dims.account_id.map(FieldValue::Int),
        "top_account_id" => dims.top_account_id.map(FieldValue::Int),
        "partner_id" => dims.partner_id.map(FieldValue::Int),
        "timestamp" => dims.timestamp.map(|t| FieldValue::Str(t.to_rfc3339())),
        "date_range_type" => dims
            .date_range_type
            .map(|t| FieldValue::Str(t.as_ref().to_owned())),
        "date_start" => dims.date_start.map(FieldValue::Date),
        "date_end" => dims.date_end.map(FieldValue::Date),
        _ => record.field(column),
    }
}

/// Parses filter text (`account_id=123`) into a value of the column's kind.
///
/// # Errors
///
/// * [`StoreError::UnknownColumn`] if the schema has no such column
/// * [`StoreError::Backend`] if the text does not parse as that kind
pub fn parse_column_value(
    schema: &ReportSchema,
    column: &str,
    raw: &str,
) -> Result<FieldValue, StoreError> {
    let kind = column_kind(schema, column).ok_or_else(|| StoreError::UnknownColumn {
        record: schema.record_name(),
        column: column.to_owned(),
    })?;

    let descriptor = adreport_report_models::FieldDescriptor::new("", kind, "", "");
    match parsing::coerce(&descriptor, raw) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => Err(StoreError::Backend {
            message: format!("empty value for {column}"),
        }),
        Err(e) => Err(StoreError::Backend {
            message: e.to_string(),
        }),
    }
}

/// Outcome of a persist call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub records_written: u64,
    pub commits: u64,
}

/// Identity-assigning, batching front end over a [`StoreBackend`].
pub struct BatchedUpsertStore<'a, B: StoreBackend> {
    backend: B,
    registry: &'a ReportRegistry,
    assigner: IdentityAssigner,
    batch_size: usize,
}

impl<'a, B: StoreBackend> BatchedUpsertStore<'a, B> {
    #[must_use]
    pub const fn new(backend: B, registry: &'a ReportRegistry, assigner: IdentityAssigner) -> Self {
        Self {
            backend,
            registry,
            assigner,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the number of records per commit (at least 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Assigns missing identities and upserts `records` in batches.
    ///
    /// A batch never mixes record types: a change of type commits the
    /// records buffered so far.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a record cannot be identified or a batch
    /// fails to commit. Batches committed before the failure stay
    /// committed; buffered records after it are dropped.
    pub fn persist<I>(&mut self, records: I) -> Result<PersistSummary, StoreError>
    where
        I: IntoIterator<Item = Box<dyn ReportRecord>>,
    {
        self.try_persist(records.into_iter().map(Ok::<_, StoreError>))
    }

    /// Like [`persist`](Self::persist), over records that are produced
    /// fallibly (decoded lazily from a file).
    ///
    /// At most one batch of records is held at a time.
    ///
    /// # Errors
    ///
    /// The first `Err` from `records` drops the batch being filled and is
    /// returned. Store failures are converted into `E`. Either way, batches
    /// committed earlier stay committed.
    pub fn try_persist<I, E>(&mut self, records: I) -> Result<PersistSummary, E>
    where
        I: IntoIterator<Item = Result<Box<dyn ReportRecord>, E>>,
        E: From<StoreError>,
    {
        let mut summary = PersistSummary::default();
        let mut buffer: Vec<Box<dyn ReportRecord>> = Vec::with_capacity(self.batch_size);

        for record in records {
            let mut record = match record {
                Ok(record) => record,
                Err(e) => {
                    if !buffer.is_empty() {
                        log::warn!(
                            "Dropping {} buffered records after {} committed batches",
                            buffer.len(),
                            summary.commits
                        );
                    }
                    return Err(e);
                }
            };

            if record.id().is_none() {
                self.assigner.assign(record.as_mut()).map_err(StoreError::from)?;
            }

            if buffer
                .first()
                .is_some_and(|first| first.report_type() != record.report_type())
            {
                self.flush(&mut buffer, &mut summary)?;
            }

            buffer.push(record);

            if buffer.len() >= self.batch_size {
                self.flush(&mut buffer, &mut summary)?;
            }
        }

        self.flush(&mut buffer, &mut summary)?;

        Ok(summary)
    }

    fn flush(
        &mut self,
        buffer: &mut Vec<Box<dyn ReportRecord>>,
        summary: &mut PersistSummary,
    ) -> Result<(), StoreError> {
        let Some(first) = buffer.first() else {
            return Ok(());
        };

        let schema = self.registry.schema_for(first.report_type())?;
        let written = self.backend.commit_batch(schema, buffer)?;

        summary.commits += 1;
        summary.records_written += buffer.len() as u64;

        log::info!(
            "Committed batch {} of {} {} records ({written} rows written, {} total)",
            summary.commits,
            buffer.len(),
            schema.record_name(),
            summary.records_written,
        );

        buffer.clear();
        Ok(())
    }

    /// Deletes the stored rows of `records`. Records without an identity
    /// are identified first (on a copy).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a record cannot be identified or the
    /// delete fails.
    pub fn remove(&mut self, records: &[Box<dyn ReportRecord>]) -> Result<u64, StoreError> {
        let mut by_type: Vec<(ReportType, Vec<String>)> = Vec::new();

        for record in records {
            let id = match record.id() {
                Some(id) => id.to_owned(),
                None => self.assigner.compute(record.clone_box().as_mut())?,
            };

            match by_type.iter_mut().find(|(t, _)| *t == record.report_type()) {
                Some((_, ids)) => ids.push(id),
                None => by_type.push((record.report_type(), vec![id])),
            }
        }

        let mut removed = 0;
        for (report_type, ids) in by_type {
            removed += self.remove_ids(report_type, &ids)?;
        }
        Ok(removed)
    }

    /// Deletes rows of `report_type` by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the report type is unknown or the delete
    /// fails.
    pub fn remove_ids(&mut self, report_type: ReportType, ids: &[String]) -> Result<u64, StoreError> {
        let schema = self.registry.schema_for(report_type)?;
        let unique: BTreeSet<&String> = ids.iter().collect();
        let ids: Vec<String> = unique.into_iter().cloned().collect();
        let removed = self.backend.delete(schema, &ids)?;

        log::info!("Removed {removed} {} records", schema.record_name());

        Ok(removed)
    }

    /// Lists every stored row of `report_type`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the report type is unknown or the query
    /// fails.
    pub fn list_by_type(
        &self,
        report_type: ReportType,
    ) -> Result<Vec<Box<dyn ReportRecord>>, StoreError> {
        self.list_by_key_range(report_type, &ListQuery::new())
    }

    /// Lists stored rows of `report_type` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the report type is unknown, the query names
    /// unknown columns, or the query fails.
    pub fn list_by_key_range(
        &self,
        report_type: ReportType,
        query: &ListQuery,
    ) -> Result<Vec<Box<dyn ReportRecord>>, StoreError> {
        let schema = self.registry.schema_for(report_type)?;
        query.validate(schema)?;
        self.backend.list(schema, query)
    }
}
