//! Video campaign report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `VIDEO_CAMPAIGN_REPORT`.
    ///
    /// Video exports carry campaign names but no campaign ids, so the name
    /// keys the row.
    pub struct VideoCampaignRecord {
        name: "video_campaign",
        report_type: ReportType::VideoCampaignReport,
        exclude: ["ClickType", "AveragePosition"],
        key: [KeyPart::required("campaign_name")],
        fields: {
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            campaign_status: String("Campaign state", "CampaignStatus"),
            budget: Money("Budget", "Amount"),
            thumbnail_impressions: Integer("Thumbnail Impressions", "ThumbnailImpressions"),
            video_impressions: Integer("Video Impressions", "VideoImpressions"),
            views: Integer("Views", "VideoViews"),
            view_rate: Percentage("View rate", "VideoViewRate"),
            played_to_25: Percentage("Video played to 25%", "VideoQuartile25Rate"),
            played_to_50: Percentage("Video played to 50%", "VideoQuartile50Rate"),
            played_to_75: Percentage("Video played to 75%", "VideoQuartile75Rate"),
            played_to_100: Percentage("Video played to 100%", "VideoQuartile100Rate"),
            avg_cpv: Money("Avg. CPV", "AverageCpv"),
            website_clicks: Integer("Website clicks", "WebsiteClicks"),
        },
    }
}
