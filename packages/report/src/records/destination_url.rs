//! Destination URL report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `DESTINATION_URL_REPORT`. The URL itself is too long and
    /// too free-form to sit in an identity, so only its digest does.
    pub struct DestinationUrlRecord {
        name: "destination_url",
        report_type: ReportType::DestinationUrlReport,
        exclude: [],
        key: [
            KeyPart::optional("campaign_id"),
            KeyPart::optional("ad_group_id"),
            KeyPart::required("effective_destination_url").hashed(),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            criteria_parameters: String("Criteria parameters", "CriteriaParameters").truncate(255),
            effective_destination_url: String("Destination URL", "EffectiveDestinationUrl"),
        },
    }
}
