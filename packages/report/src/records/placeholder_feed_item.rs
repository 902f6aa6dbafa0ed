//! Placeholder feed item report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `PLACEHOLDER_FEED_ITEM_REPORT`: a feed item (sitelink,
    /// call extension, ...) served with an ad.
    pub struct PlaceholderFeedItemRecord {
        name: "placeholder_feed_item",
        report_type: ReportType::PlaceholderFeedItemReport,
        exclude: [],
        key: [
            KeyPart::optional("campaign_id"),
            KeyPart::optional("ad_group_id"),
            KeyPart::optional("ad_id"),
            KeyPart::required("feed_item_id"),
            KeyPart::required("feed_id"),
            KeyPart::optional("placeholder_type"),
            KeyPart::optional("is_self_action"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            ad_group_name: String("Ad group", "AdGroupName").truncate(255),
            ad_id: Integer("Ad ID", "AdId"),
            feed_id: Integer("Feed ID", "FeedId"),
            feed_item_id: Integer("Feed item ID", "FeedItemId"),
            status: String("Feed item status", "Status"),
            placeholder_type: Integer("Feed placeholder type", "PlaceholderType"),
            is_self_action: String("This extension vs. Other", "IsSelfAction"),
        },
    }
}
