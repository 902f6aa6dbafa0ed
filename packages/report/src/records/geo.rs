//! Geographic performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `GEO_PERFORMANCE_REPORT`. Locations are criterion ids;
    /// coarser rows leave the finer levels empty.
    pub struct GeoRecord {
        name: "geo",
        report_type: ReportType::GeoPerformanceReport,
        exclude: ["AveragePosition"],
        key: [
            KeyPart::required("campaign_id"),
            KeyPart::optional("ad_group_id"),
            KeyPart::required("country_territory"),
            KeyPart::optional("region"),
            KeyPart::optional("metro_area"),
            KeyPart::optional("city"),
            KeyPart::optional("location_type"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            country_territory: Integer("Country/Territory", "CountryCriteriaId"),
            region: Integer("Region", "RegionCriteriaId"),
            metro_area: Integer("Metro area", "MetroCriteriaId"),
            city: Integer("City", "CityCriteriaId"),
            location_type: String("Location type", "LocationType"),
        },
    }
}
