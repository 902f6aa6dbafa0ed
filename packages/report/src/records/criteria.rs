//! Criteria performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `CRITERIA_PERFORMANCE_REPORT`.
    pub struct CriteriaRecord {
        name: "criteria",
        report_type: ReportType::CriteriaPerformanceReport,
        exclude: [],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::required("ad_group_id"),
            KeyPart::required("criterion_id"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            criterion_id: Integer("Criterion ID", "Id"),
            criteria: String("Keyword / Placement", "Criteria").truncate(255),
            criteria_type: String("Criteria type", "CriteriaType"),
            criterion_status: String("Criterion state", "Status"),
            max_cpc: Money("Max. CPC", "CpcBid"),
        },
    }
}
