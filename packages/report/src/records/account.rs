//! Account performance report.

use adreport_report_models::{ReportType, report_record};

report_record! {
    /// One row of `ACCOUNT_PERFORMANCE_REPORT`. Identified by the account
    /// and its segments only.
    pub struct AccountRecord {
        name: "account",
        report_type: ReportType::AccountPerformanceReport,
        exclude: [],
        key: [],
        fields: {
            search_impression_share: Percentage("Search Impr. share", "SearchImpressionShare"),
            content_impression_share: Percentage("Content Impr. share", "ContentImpressionShare"),
            invalid_clicks: Integer("Invalid clicks", "InvalidClicks"),
            view_through_conversions: Integer("View-through conv.", "ViewThroughConversions").zero_default(),
            conversion_value: Money("Total conv. value", "ConversionValue"),
        },
    }
}
