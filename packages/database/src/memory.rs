//! In-memory storage backend, used for dry runs and tests.

use std::collections::BTreeMap;

use adreport_report::ReportSchema;
use adreport_report_models::{ReportRecord, ReportType};

use crate::StoreError;
use crate::store::{ListQuery, StoreBackend};

/// Stored rows keyed by report type, then identity.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: BTreeMap<ReportType, BTreeMap<String, Box<dyn ReportRecord>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows of `report_type`.
    #[must_use]
    pub fn record_count(&self, report_type: ReportType) -> usize {
        self.tables.get(&report_type).map_or(0, BTreeMap::len)
    }

    /// Number of stored rows across all report types.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.tables.values().map(BTreeMap::len).sum()
    }
}

impl StoreBackend for MemoryBackend {
    fn commit_batch(
        &mut self,
        schema: &ReportSchema,
        records: &[Box<dyn ReportRecord>],
    ) -> Result<u64, StoreError> {
        let mut staged = Vec::with_capacity(records.len());

        for record in records {
            let id = record.id().ok_or_else(|| StoreError::Backend {
                message: format!("{} record has no identity", schema.record_name()),
            })?;
            if record.report_type() != schema.report_type() {
                return Err(StoreError::Backend {
                    message: format!(
                        "{} record in a {} batch",
                        record.info().name,
                        schema.record_name()
                    ),
                });
            }
            staged.push((id.to_owned(), record.clone()));
        }

        let table = self.tables.entry(schema.report_type()).or_default();
        let written = staged.len() as u64;
        table.extend(staged);

        Ok(written)
    }

    fn delete(&mut self, schema: &ReportSchema, ids: &[String]) -> Result<u64, StoreError> {
        let Some(table) = self.tables.get_mut(&schema.report_type()) else {
            return Ok(0);
        };

        Ok(ids.iter().filter(|id| table.remove(*id).is_some()).count() as u64)
    }

    fn list(
        &self,
        schema: &ReportSchema,
        query: &ListQuery,
    ) -> Result<Vec<Box<dyn ReportRecord>>, StoreError> {
        query.validate(schema)?;

        let Some(table) = self.tables.get(&schema.report_type()) else {
            return Ok(Vec::new());
        };

        Ok(table
            .values()
            .filter(|record| query.matches(record.as_ref()))
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use adreport_report::{IdentityAssigner, decode, initialize_registry};
    use adreport_report_models::{FieldValue, NaiveDate};

    use super::*;

    fn identified(schema: &ReportSchema, cells: &[&str]) -> Box<dyn ReportRecord> {
        let mut record = decode(
            schema,
            &["Customer ID", "Campaign ID", "Day", "Clicks"],
            cells,
        )
        .unwrap();
        IdentityAssigner::new(NaiveDate::from_ymd_opt(2013, 5, 15).unwrap())
            .assign(record.as_mut())
            .unwrap();
        record
    }

    #[test]
    fn batches_upsert_by_identity() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = MemoryBackend::new();

        backend
            .commit_batch(
                schema,
                &[
                    identified(schema, &["1", "5", "2013-05-01", "3"]),
                    identified(schema, &["1", "6", "2013-05-01", "4"]),
                ],
            )
            .unwrap();
        backend
            .commit_batch(schema, &[identified(schema, &["1", "5", "2013-05-01", "8"])])
            .unwrap();

        assert_eq!(backend.record_count(ReportType::CampaignPerformanceReport), 2);

        let rows = backend
            .list(
                schema,
                &ListQuery::new().with_filter("campaign_id", FieldValue::Int(5)),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dimensions().clicks, Some(8));
    }

    #[test]
    fn unidentified_records_reject_the_whole_batch() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = MemoryBackend::new();

        let bare = decode(schema, &["Customer ID", "Campaign ID"], &["1", "5"]).unwrap();
        let err = backend
            .commit_batch(
                schema,
                &[identified(schema, &["1", "6", "2013-05-01", "4"]), bare],
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::Backend { .. }));
        assert_eq!(backend.total_records(), 0);
    }

    #[test]
    fn deletes_only_known_ids() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();
        let mut backend = MemoryBackend::new();

        let record = identified(schema, &["1", "5", "2013-05-01", "3"]);
        let id = record.id().unwrap().to_owned();
        backend.commit_batch(schema, &[record]).unwrap();

        let removed = backend
            .delete(schema, &[id, "missing".to_owned()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(backend.total_records(), 0);
    }
}
