//! Search query performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `SEARCH_QUERY_PERFORMANCE_REPORT`: a search term that
    /// triggered an ad. Terms are free text, so the identity carries their
    /// digest.
    pub struct SearchQueryRecord {
        name: "search_query",
        report_type: ReportType::SearchQueryPerformanceReport,
        exclude: [],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::optional("ad_group_id"),
            KeyPart::optional("creative_id"),
            KeyPart::optional("keyword_id"),
            KeyPart::optional("ad_format"),
            KeyPart::optional("query").hashed(),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            campaign_status: String("Campaign state", "CampaignStatus"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            ad_group_name: String("Ad group", "AdGroupName").truncate(255),
            ad_group_status: String("Ad group state", "AdGroupStatus"),
            creative_id: Integer("Ad ID", "CreativeId"),
            ad_format: String("Ad type", "AdFormat"),
            keyword_id: Integer("Keyword ID", "KeywordId"),
            keyword_text_matching_query: String("Keyword", "KeywordTextMatchingQuery").truncate(255),
            match_type: String("Match type", "MatchType"),
            destination_url: String("Destination URL", "DestinationUrl"),
            query: String("Search term", "Query"),
        },
    }
}
