//! Row decoding.
//!
//! A [`ColumnPlan`] resolves a header row against a schema once, then turns
//! each data row into a record. Unknown headers are skipped, and cells that
//! fail to coerce leave their field empty without failing the row.

use adreport_report_models::{FieldDescriptor, FieldError, FieldValue, HeaderStyle, ReportRecord};

use crate::parsing;
use crate::registry::ReportSchema;

/// Errors raised while decoding rows.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The row does not have one cell per header.
    #[error("Row {row} has {actual} cells but the header has {expected}")]
    MalformedRow {
        /// Zero-based index of the data row.
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A descriptor does not match its record type.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Header row resolved against one schema.
#[derive(Debug)]
pub struct ColumnPlan<'a> {
    schema: &'a ReportSchema,
    style: HeaderStyle,
    columns: Vec<Option<&'a FieldDescriptor>>,
}

impl<'a> ColumnPlan<'a> {
    /// Matches each header cell to a schema field.
    ///
    /// Matching is exact and case-sensitive. With [`HeaderStyle::Detect`] the
    /// style that recognizes more cells wins.
    #[must_use]
    pub fn new<S: AsRef<str>>(schema: &'a ReportSchema, headers: &[S], style: HeaderStyle) -> Self {
        let style = match style {
            HeaderStyle::Detect => detect_style(schema, headers),
            explicit => explicit,
        };

        let columns = headers
            .iter()
            .map(|header| match_header(schema, header.as_ref(), style))
            .collect();

        Self {
            schema,
            style,
            columns,
        }
    }

    /// The style the header row was matched with.
    #[must_use]
    pub const fn style(&self) -> HeaderStyle {
        self.style
    }

    /// Fields matched by the header row, in column order.
    pub fn matched_fields(&self) -> impl Iterator<Item = &'a FieldDescriptor> + '_ {
        self.columns.iter().flatten().copied()
    }

    /// Decodes one data row. `row` is its index, used in errors and logs.
    ///
    /// # Errors
    ///
    /// * [`DecodeError::MalformedRow`] if the cell count differs from the
    ///   header
    /// * [`DecodeError::Field`] if a descriptor does not match its record
    ///   type
    pub fn decode_row<S: AsRef<str>>(
        &self,
        row: usize,
        cells: &[S],
    ) -> Result<Box<dyn ReportRecord>, DecodeError> {
        if cells.len() != self.columns.len() {
            return Err(DecodeError::MalformedRow {
                row,
                expected: self.columns.len(),
                actual: cells.len(),
            });
        }

        let mut record = self.schema.new_record();

        for field in self.schema.fields().iter().filter(|f| f.zero_default) {
            record.set_field(field.name, Some(FieldValue::Int(0)))?;
        }

        for (cell, column) in cells.iter().zip(&self.columns) {
            let Some(field) = column else {
                continue;
            };

            let value = match parsing::coerce(field, cell.as_ref()) {
                Ok(value) => value,
                Err(e) => {
                    log::debug!("Row {row}: {} left empty, {e}", field.name);
                    None
                }
            };

            record.set_field(field.name, value)?;
        }

        Ok(record)
    }
}

/// Decodes a single row against `schema`, detecting the header style.
///
/// # Errors
///
/// See [`ColumnPlan::decode_row`].
pub fn decode<S: AsRef<str>, T: AsRef<str>>(
    schema: &ReportSchema,
    header_row: &[S],
    data_row: &[T],
) -> Result<Box<dyn ReportRecord>, DecodeError> {
    ColumnPlan::new(schema, header_row, HeaderStyle::Detect).decode_row(0, data_row)
}

fn match_header<'a>(
    schema: &'a ReportSchema,
    header: &str,
    style: HeaderStyle,
) -> Option<&'a FieldDescriptor> {
    schema.fields().iter().find(|f| match style {
        HeaderStyle::FieldNames => f.api_field == header,
        HeaderStyle::ColumnHeaders | HeaderStyle::Detect => f.header == header,
    })
}

fn detect_style<S: AsRef<str>>(schema: &ReportSchema, headers: &[S]) -> HeaderStyle {
    let count = |style| {
        headers
            .iter()
            .filter(|h| match_header(schema, h.as_ref(), style).is_some())
            .count()
    };

    let column_headers = count(HeaderStyle::ColumnHeaders);
    let field_names = count(HeaderStyle::FieldNames);

    if field_names > column_headers {
        HeaderStyle::FieldNames
    } else {
        HeaderStyle::ColumnHeaders
    }
}

#[cfg(test)]
mod tests {
    use adreport_report_models::{NaiveDate, ReportType};

    use super::*;
    use crate::registry::initialize_registry;

    fn decimal(record: &dyn ReportRecord, field: &str) -> f64 {
        match record.field(field) {
            Some(FieldValue::Decimal(d)) => d,
            other => panic!("expected decimal in {field}, got {other:?}"),
        }
    }

    #[test]
    fn decodes_api_field_name_headers() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let record = decode(
            schema,
            &["ExternalCustomerId", "Date", "Clicks", "Impressions", "Ctr"],
            &["123", "2013-05-01", "10", "1978", "0.51%"],
        )
        .unwrap();

        let dims = record.dimensions();
        assert_eq!(dims.account_id, Some(123));
        assert_eq!(dims.day, NaiveDate::from_ymd_opt(2013, 5, 1));
        assert_eq!(dims.clicks, Some(10));
        assert_eq!(dims.impressions, Some(1978));
        assert!((dims.ctr.unwrap() - 0.0051).abs() < 1e-9);
    }

    #[test]
    fn decodes_export_headers_in_any_order() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap();

        let headers = ["Campaign", "CTR", "Customer ID", "Campaign ID", "Avg. CPC"];
        let plan = ColumnPlan::new(schema, &headers, HeaderStyle::Detect);
        assert_eq!(plan.style(), HeaderStyle::ColumnHeaders);

        let record = plan
            .decode_row(0, &["Brand", "12.16%", "555", "42", "1.05"])
            .unwrap();

        assert_eq!(record.field("campaign_name"), Some(FieldValue::from("Brand")));
        assert_eq!(record.field("campaign_id"), Some(FieldValue::Int(42)));
        assert_eq!(record.dimensions().account_id, Some(555));
        assert!((decimal(record.as_ref(), "ctr") - 0.1216).abs() < 1e-9);
        assert!((decimal(record.as_ref(), "avg_cpc") - 1.05).abs() < 1e-9);
    }

    #[test]
    fn header_matching_is_case_sensitive() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let plan = ColumnPlan::new(schema, &["clicks", "Clicks"], HeaderStyle::ColumnHeaders);
        let matched: Vec<&str> = plan.matched_fields().map(|f| f.name).collect();
        assert_eq!(matched, ["clicks"]);

        let record = plan.decode_row(0, &["7", "9"]).unwrap();
        assert_eq!(record.dimensions().clicks, Some(9));
    }

    #[test]
    fn unknown_headers_are_ignored_and_missing_fields_default() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let record = decode(schema, &["Customer ID", "Mystery"], &["9", "x"]).unwrap();
        let dims = record.dimensions();

        assert_eq!(dims.account_id, Some(9));
        assert_eq!(dims.clicks, Some(0));
        assert_eq!(dims.impressions, Some(0));
        assert_eq!(dims.avg_position, None);
        assert_eq!(dims.cost, None);
    }

    #[test]
    fn empty_cells_follow_zero_default_rules() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let record = decode(
            schema,
            &["Customer ID", "Clicks", "Impressions", "Avg. position"],
            &["9", "", "", ""],
        )
        .unwrap();

        assert_eq!(record.dimensions().clicks, Some(0));
        assert_eq!(record.dimensions().impressions, Some(0));
        assert_eq!(record.dimensions().avg_position, None);
    }

    #[test]
    fn coercion_failures_leave_the_field_empty() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let record = decode(
            schema,
            &["Customer ID", "Clicks", "Day", "Cost"],
            &["9", "lots", "not a date", "3.50"],
        )
        .unwrap();

        let dims = record.dimensions();
        assert_eq!(dims.clicks, None);
        assert_eq!(dims.day, None);
        assert!((dims.cost.unwrap() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn short_rows_are_malformed() {
        let registry = initialize_registry().unwrap();
        let schema = registry
            .schema_for(ReportType::AccountPerformanceReport)
            .unwrap();

        let plan = ColumnPlan::new(schema, &["Customer ID", "Clicks"], HeaderStyle::Detect);
        let err = plan.decode_row(4, &["9"]).unwrap_err();

        assert!(matches!(
            err,
            DecodeError::MalformedRow {
                row: 4,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn excluded_fields_are_not_decoded() {
        let registry = initialize_registry().unwrap();
        let schema = registry.schema_for(ReportType::UrlPerformanceReport).unwrap();

        let record = decode(
            schema,
            &["Customer ID", "URL", "Device"],
            &["9", "http://example.com/a", "Computers"],
        )
        .unwrap();

        assert_eq!(record.dimensions().device, None);
        assert_eq!(
            record.field("url"),
            Some(FieldValue::from("http://example.com/a"))
        );
    }
}
