//! Keywords performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `KEYWORDS_PERFORMANCE_REPORT`.
    pub struct KeywordRecord {
        name: "keyword",
        report_type: ReportType::KeywordsPerformanceReport,
        exclude: [],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::required("ad_group_id"),
            KeyPart::required("keyword_id"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            keyword_id: Integer("Keyword ID", "Id"),
            keyword_text: String("Keyword", "Criteria").truncate(255),
            keyword_match_type: String("Match type", "KeywordMatchType"),
            keyword_status: String("Keyword state", "Status"),
            quality_score: Integer("Quality score", "QualityScore"),
            first_page_cpc: Money("First page CPC", "FirstPageCpc"),
            max_cpc: Money("Max. CPC", "CpcBid"),
            is_negative: Boolean("Is negative", "IsNegative"),
        },
    }
}
