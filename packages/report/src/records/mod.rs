//! Record type declarations, one module per report.
//!
//! Adding a report means declaring its record with
//! [`report_record!`](adreport_report_models::report_record) and listing it
//! in [`all_record_types`].

pub mod account;
pub mod ad;
pub mod ad_extension;
pub mod ad_group;
pub mod budget;
pub mod campaign;
pub mod criteria;
pub mod destination_url;
pub mod display_keyword;
pub mod geo;
pub mod keywords;
pub mod location_target;
pub mod negative_keyword;
pub mod placeholder_feed_item;
pub mod placement;
pub mod search_query;
pub mod shopping;
pub mod url;
pub mod video_campaign;

use adreport_report_models::RecordTypeInfo;

pub use account::AccountRecord;
pub use ad::AdRecord;
pub use ad_extension::AdExtensionRecord;
pub use ad_group::AdGroupRecord;
pub use budget::BudgetRecord;
pub use campaign::CampaignRecord;
pub use criteria::CriteriaRecord;
pub use destination_url::DestinationUrlRecord;
pub use display_keyword::DisplayKeywordRecord;
pub use geo::GeoRecord;
pub use keywords::KeywordRecord;
pub use location_target::CampaignLocationTargetRecord;
pub use negative_keyword::CampaignNegativeKeywordRecord;
pub use placeholder_feed_item::PlaceholderFeedItemRecord;
pub use placement::PlacementRecord;
pub use search_query::SearchQueryRecord;
pub use shopping::ShoppingRecord;
pub use url::UrlRecord;
pub use video_campaign::VideoCampaignRecord;

/// Every compiled-in record type, in registration order.
#[must_use]
pub fn all_record_types() -> Vec<RecordTypeInfo> {
    vec![
        // ── Account structure ────────────────────────────────────────
        AccountRecord::INFO,
        CampaignRecord::INFO,
        AdGroupRecord::INFO,
        KeywordRecord::INFO,
        AdRecord::INFO,
        BudgetRecord::INFO,
        CampaignNegativeKeywordRecord::INFO,
        // ── Targeting and URLs ───────────────────────────────────────
        CriteriaRecord::INFO,
        PlacementRecord::INFO,
        GeoRecord::INFO,
        DestinationUrlRecord::INFO,
        UrlRecord::INFO,
        CampaignLocationTargetRecord::INFO,
        DisplayKeywordRecord::INFO,
        // ── Queries, extensions and feeds ────────────────────────────
        SearchQueryRecord::INFO,
        AdExtensionRecord::INFO,
        PlaceholderFeedItemRecord::INFO,
        ShoppingRecord::INFO,
        VideoCampaignRecord::INFO,
    ]
}
