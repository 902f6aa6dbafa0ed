//! Display keyword performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `DISPLAY_KEYWORD_PERFORMANCE_REPORT`.
    pub struct DisplayKeywordRecord {
        name: "display_keyword",
        report_type: ReportType::DisplayKeywordPerformanceReport,
        exclude: [],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::required("ad_group_id"),
            KeyPart::required("keyword_id"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            campaign_status: String("Campaign state", "CampaignStatus"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            ad_group_name: String("Ad group", "AdGroupName").truncate(255),
            ad_group_status: String("Ad group state", "AdGroupStatus"),
            keyword_id: Integer("Keyword ID", "Id"),
            keyword_text: String("Keyword", "KeywordText").truncate(255),
            is_negative: Boolean("Is negative", "IsNegative"),
            destination_url: String("Destination URL", "DestinationUrl"),
            max_cpc: Money("Max. CPC", "MaxCpc"),
            max_cpm: Money("Max. CPM", "MaxCpm"),
        },
    }
}
