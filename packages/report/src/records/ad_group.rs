//! Ad group performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `ADGROUP_PERFORMANCE_REPORT`.
    pub struct AdGroupRecord {
        name: "ad_group",
        report_type: ReportType::AdgroupPerformanceReport,
        exclude: [],
        key: [KeyPart::required("campaign_id"), KeyPart::required("ad_group_id")],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            ad_group_name: String("Ad group", "AdGroupName").truncate(255),
            ad_group_status: String("Ad group state", "AdGroupStatus"),
            max_cpc: Money("Default max. CPC", "CpcBid"),
        },
    }
}
