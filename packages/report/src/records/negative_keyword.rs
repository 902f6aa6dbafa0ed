//! Campaign negative keywords report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `CAMPAIGN_NEGATIVE_KEYWORDS_PERFORMANCE_REPORT`. These
    /// exports list criteria only, without metrics or segments.
    pub struct CampaignNegativeKeywordRecord {
        name: "campaign_negative_keyword",
        report_type: ReportType::CampaignNegativeKeywordsPerformanceReport,
        exclude: [
            "Date",
            "DayOfWeek",
            "Week",
            "Month",
            "MonthOfYear",
            "Quarter",
            "Year",
            "Device",
            "ClickType",
            "AdNetworkType1",
            "AdNetworkType2",
            "Cost",
            "Clicks",
            "Impressions",
            "Conversions",
            "Ctr",
            "AverageCpc",
            "AverageCpm",
            "AveragePosition",
        ],
        key: [KeyPart::required("campaign_id"), KeyPart::required("keyword_id")],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            keyword_id: Integer("Keyword ID", "Id"),
            keyword_text: String("Negative keyword", "Criteria").truncate(255),
            keyword_match_type: String("Match type", "KeywordMatchType"),
        },
    }
}
