//! Ad extensions performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `AD_EXTENSIONS_PERFORMANCE_REPORT`.
    ///
    /// The report has no account columns; the owning account comes from the
    /// ingestion context.
    pub struct AdExtensionRecord {
        name: "ad_extension",
        report_type: ReportType::AdExtensionsPerformanceReport,
        exclude: ["ExternalCustomerId", "AccountDescriptiveName", "AccountCurrencyCode"],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::required("ad_extension_id"),
            KeyPart::optional("ad_extension_type"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_extension_id: Integer("Ad Extension ID", "AdExtensionId"),
            ad_extension_type: String("Ad Extension Type", "AdExtensionType"),
            status: String("State", "Status"),
            approval_status: String("Status", "ApprovalStatus"),
        },
    }
}
