//! Budget performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `BUDGET_PERFORMANCE_REPORT`.
    ///
    /// Budget exports carry no account columns, so the owning account comes
    /// from the ingestion context.
    pub struct BudgetRecord {
        name: "budget",
        report_type: ReportType::BudgetPerformanceReport,
        exclude: [
            "ExternalCustomerId",
            "AccountDescriptiveName",
            "AccountCurrencyCode",
            "AveragePosition",
            "Ctr",
            "Device",
            "ClickType",
            "AdNetworkType1",
            "AdNetworkType2",
            "DayOfWeek",
            "MonthOfYear",
            "Quarter",
            "Week",
            "Year",
        ],
        key: [KeyPart::required("budget_id"), KeyPart::optional("associated_campaign_id")],
        fields: {
            budget_id: Integer("Budget ID", "BudgetId"),
            budget_name: String("Budget name", "BudgetName").truncate(255),
            amount: Money("Budget", "Amount"),
            budget_status: String("Budget state", "BudgetStatus"),
            delivery_method: String("Delivery method", "DeliveryMethod"),
            is_budget_explicitly_shared: Boolean("Explicitly shared", "IsBudgetExplicitlyShared"),
            associated_campaign_id: Integer("Campaign ID", "AssociatedCampaignId"),
            associated_campaign_name: String("Campaign", "AssociatedCampaignName").truncate(255),
        },
    }
}
