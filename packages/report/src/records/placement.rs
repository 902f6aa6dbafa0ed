//! Placement performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `PLACEMENT_PERFORMANCE_REPORT` (managed placements).
    pub struct PlacementRecord {
        name: "placement",
        report_type: ReportType::PlacementPerformanceReport,
        exclude: [],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::required("ad_group_id"),
            KeyPart::required("placement_id"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            placement_id: Integer("Placement ID", "Id"),
            placement: String("Placement", "Criteria").truncate(255),
            placement_status: String("Placement state", "Status"),
            is_negative: Boolean("Is negative", "IsNegative"),
            max_cpm: Money("Max. CPM", "CpmBid"),
        },
    }
}
