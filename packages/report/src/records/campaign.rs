//! Campaign performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `CAMPAIGN_PERFORMANCE_REPORT`.
    pub struct CampaignRecord {
        name: "campaign",
        report_type: ReportType::CampaignPerformanceReport,
        exclude: [],
        key: [KeyPart::required("campaign_id")],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            campaign_status: String("Campaign state", "CampaignStatus"),
            budget: Money("Budget", "Amount"),
            budget_id: Integer("Budget ID", "BudgetId"),
            search_impression_share: Percentage("Search Impr. share", "SearchImpressionShare"),
            search_lost_is_budget: Percentage("Search Lost IS (budget)", "SearchBudgetLostImpressionShare"),
            search_lost_is_rank: Percentage("Search Lost IS (rank)", "SearchRankLostImpressionShare"),
            labels: String("Labels", "Labels").truncate(255),
        },
    }
}
