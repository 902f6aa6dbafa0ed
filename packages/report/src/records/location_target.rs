//! Campaign location target report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `CAMPAIGN_LOCATION_TARGET_REPORT`.
    pub struct CampaignLocationTargetRecord {
        name: "campaign_location_target",
        report_type: ReportType::CampaignLocationTargetReport,
        exclude: ["AveragePosition"],
        key: [KeyPart::required("campaign_id"), KeyPart::required("location_id")],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            campaign_status: String("Campaign state", "CampaignStatus"),
            location_id: Integer("Location", "Id"),
            bid_modifier: Decimal("Bid adj.", "BidModifier"),
            is_negative: Boolean("Is negative", "IsNegative"),
        },
    }
}
