//! Ad performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `AD_PERFORMANCE_REPORT`.
    pub struct AdRecord {
        name: "ad",
        report_type: ReportType::AdPerformanceReport,
        exclude: [],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::required("ad_group_id"),
            KeyPart::required("ad_id"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            ad_id: Integer("Ad ID", "Id"),
            ad_type: String("Ad type", "AdType"),
            ad_status: String("Ad state", "Status"),
            headline: String("Ad", "Headline").truncate(255),
            description_line1: String("Description line 1", "Description1").truncate(255),
            description_line2: String("Description line 2", "Description2").truncate(255),
            display_url: String("Display URL", "DisplayUrl").truncate(255),
            approval_status: String("Approval status", "CreativeApprovalStatus"),
        },
    }
}
