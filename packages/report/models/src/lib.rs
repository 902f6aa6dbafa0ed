#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for advertising performance report ingestion.
//!
//! A report export is a table whose columns are identified by header text.
//! Each record type declares a static table of [`FieldDescriptor`]s that maps
//! one record field to its value kind, its export-column header, and the
//! API field name used when requesting the report. Record types are declared
//! with the [`report_record!`] macro and share the common [`Dimensions`]
//! value object.

mod dimensions;
mod record;
mod value;

pub use chrono::NaiveDate;
pub use dimensions::Dimensions;
pub use record::{RecordTypeInfo, ReportRecord};
pub use value::{FieldError, FieldType, FieldValue, convert_field};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How a raw cell is coerced into a typed field value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    /// Text, stored verbatim (optionally truncated).
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Monetary amount, stored at face value.
    Money,
    /// Percentage, stored as a fraction (`12.16%` becomes `0.1216`).
    Percentage,
    /// Plain decimal number.
    Decimal,
    /// `true`/`false`.
    Boolean,
    /// Calendar date.
    Date,
    /// Calendar month, normalized to the first day of the month.
    DateMonth,
}

impl ValueKind {
    /// Whether values of this kind are stored as `f64`.
    #[must_use]
    pub const fn is_decimal(self) -> bool {
        matches!(self, Self::Money | Self::Percentage | Self::Decimal)
    }

    /// Whether values of this kind are stored as dates.
    #[must_use]
    pub const fn is_date(self) -> bool {
        matches!(self, Self::Date | Self::DateMonth)
    }
}

/// Static declaration of one record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Internal field name (the struct field).
    pub name: &'static str,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Column header text used in exported report files.
    pub header: &'static str,
    /// Field name used by the reporting API when selecting columns.
    pub api_field: &'static str,
    /// Empty cells decode to `0` instead of no value.
    pub zero_default: bool,
    /// Maximum number of characters kept for string values.
    pub max_len: Option<usize>,
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(
        name: &'static str,
        kind: ValueKind,
        header: &'static str,
        api_field: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            header,
            api_field,
            zero_default: false,
            max_len: None,
        }
    }

    /// Marks an integer metric whose empty cells mean zero.
    #[must_use]
    pub const fn zero_default(mut self) -> Self {
        self.zero_default = true;
        self
    }

    /// Caps string values at `max_len` characters.
    #[must_use]
    pub const fn truncate(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// One component of a record type's composite identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPart {
    /// Field the component is read from.
    pub field: &'static str,
    /// Identity assignment fails when a required component is absent.
    pub required: bool,
    /// The value is replaced by its SHA-256 hex digest.
    pub hashed: bool,
}

impl KeyPart {
    #[must_use]
    pub const fn required(field: &'static str) -> Self {
        Self {
            field,
            required: true,
            hashed: false,
        }
    }

    #[must_use]
    pub const fn optional(field: &'static str) -> Self {
        Self {
            field,
            required: false,
            hashed: false,
        }
    }

    /// Hashes long or free-text values such as URLs.
    #[must_use]
    pub const fn hashed(mut self) -> Self {
        self.hashed = true;
        self
    }
}

/// How header cells are matched against field descriptors.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HeaderStyle {
    /// Export-column headers (`Avg. CPC`, `Click type`).
    ColumnHeaders,
    /// API field names (`AverageCpc`, `ClickType`).
    FieldNames,
    /// Whichever of the two matches more header cells; ties go to
    /// [`HeaderStyle::ColumnHeaders`].
    #[default]
    Detect,
}

/// Report definitions understood by the reporting API.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    AccountPerformanceReport,
    CampaignPerformanceReport,
    AdgroupPerformanceReport,
    KeywordsPerformanceReport,
    AdPerformanceReport,
    DestinationUrlReport,
    UrlPerformanceReport,
    BudgetPerformanceReport,
    PlacementPerformanceReport,
    GeoPerformanceReport,
    CriteriaPerformanceReport,
    CampaignNegativeKeywordsPerformanceReport,
    SearchQueryPerformanceReport,
    AdExtensionsPerformanceReport,
    ShoppingPerformanceReport,
    /// Exported by hand from the video campaigns view; the API cannot
    /// request it.
    VideoCampaignReport,
    CampaignLocationTargetReport,
    PlaceholderFeedItemReport,
    DisplayKeywordPerformanceReport,
}

/// Predefined reporting periods.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DateRangeType {
    Today,
    Yesterday,
    #[serde(rename = "LAST_7_DAYS")]
    #[strum(serialize = "LAST_7_DAYS")]
    Last7Days,
    #[serde(rename = "LAST_14_DAYS")]
    #[strum(serialize = "LAST_14_DAYS")]
    Last14Days,
    #[serde(rename = "LAST_30_DAYS")]
    #[strum(serialize = "LAST_30_DAYS")]
    Last30Days,
    LastWeek,
    ThisMonth,
    LastMonth,
    AllTime,
    CustomDate,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn report_type_uses_api_names() {
        assert_eq!(
            ReportType::CampaignPerformanceReport.as_ref(),
            "CAMPAIGN_PERFORMANCE_REPORT"
        );
        assert_eq!(
            ReportType::from_str("ADGROUP_PERFORMANCE_REPORT").unwrap(),
            ReportType::AdgroupPerformanceReport
        );
        assert!(ReportType::from_str("campaign").is_err());
    }

    #[test]
    fn date_range_numbered_variants_keep_separators() {
        assert_eq!(DateRangeType::Last7Days.to_string(), "LAST_7_DAYS");
        assert_eq!(
            DateRangeType::from_str("LAST_30_DAYS").unwrap(),
            DateRangeType::Last30Days
        );
        assert_eq!(DateRangeType::LastMonth.to_string(), "LAST_MONTH");
    }

    #[test]
    fn descriptor_builders_set_options() {
        const CLICKS: FieldDescriptor =
            FieldDescriptor::new("clicks", ValueKind::Integer, "Clicks", "Clicks").zero_default();
        const HEADLINE: FieldDescriptor =
            FieldDescriptor::new("headline", ValueKind::String, "Ad", "Headline").truncate(255);

        assert!(CLICKS.zero_default);
        assert_eq!(CLICKS.max_len, None);
        assert!(!HEADLINE.zero_default);
        assert_eq!(HEADLINE.max_len, Some(255));
    }

    #[test]
    fn header_style_parses_from_config_strings() {
        assert_eq!(
            HeaderStyle::from_str("field_names").unwrap(),
            HeaderStyle::FieldNames
        );
        assert_eq!(HeaderStyle::default(), HeaderStyle::Detect);
    }
}
