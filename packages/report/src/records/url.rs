//! URL performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `URL_PERFORMANCE_REPORT` (automatic placements by URL).
    pub struct UrlRecord {
        name: "url",
        report_type: ReportType::UrlPerformanceReport,
        exclude: ["AveragePosition", "Device", "ClickType"],
        key: [
            KeyPart::optional("campaign_id"),
            KeyPart::optional("ad_group_id"),
            KeyPart::required("url").hashed(),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            url: String("URL", "Url"),
            display_name: String("Domain", "DisplayName").truncate(255),
            is_auto_optimized: Boolean("Automatic placement", "IsAutoOptimized"),
        },
    }
}
