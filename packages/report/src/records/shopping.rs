//! Shopping performance report.

use adreport_report_models::{KeyPart, ReportType, report_record};

report_record! {
    /// One row of `SHOPPING_PERFORMANCE_REPORT`: one product offer, sliced
    /// by merchant, country and category.
    pub struct ShoppingRecord {
        name: "shopping",
        report_type: ReportType::ShoppingPerformanceReport,
        exclude: ["AveragePosition"],
        key: [
            KeyPart::optional("campaign_id"),
            KeyPart::optional("ad_group_id"),
            KeyPart::optional("merchant_id"),
            KeyPart::optional("country_criteria_id"),
            KeyPart::optional("category_l1"),
            KeyPart::optional("offer_id"),
        ],
        fields: {
            campaign_id: Integer("Campaign ID", "CampaignId"),
            campaign_name: String("Campaign", "CampaignName").truncate(255),
            ad_group_id: Integer("Ad group ID", "AdGroupId"),
            ad_group_name: String("Ad group", "AdGroupName").truncate(255),
            aggregator_id: Integer("MCA Id", "AggregatorId"),
            merchant_id: Integer("MC Id", "MerchantId"),
            store_id: Integer("Store Id", "StoreId"),
            offer_id: String("Item Id", "OfferId"),
            brand: String("Brand", "Brand").truncate(255),
            product_condition: String("Condition", "ProductCondition"),
            country_criteria_id: Integer("Country/Territory", "CountryCriteriaId"),
            language_criteria_id: Integer("Language", "LanguageCriteriaId"),
            category_l1: String("Category (1st level)", "CategoryL1"),
            category_l2: String("Category (2nd level)", "CategoryL2"),
            category_l3: String("Category (3rd level)", "CategoryL3"),
            category_l4: String("Category (4th level)", "CategoryL4"),
            category_l5: String("Category (5th level)", "CategoryL5"),
            product_type_l1: String("Product type (1st level)", "ProductTypeL1"),
            product_type_l2: String("Product type (2nd level)", "ProductTypeL2"),
            product_type_l3: String("Product type (3rd level)", "ProductTypeL3"),
            product_type_l4: String("Product type (4th level)", "ProductTypeL4"),
            product_type_l5: String("Product type (5th level)", "ProductTypeL5"),
            custom_attribute0: String("Custom label 0", "CustomAttribute0"),
            custom_attribute1: String("Custom label 1", "CustomAttribute1"),
            custom_attribute2: String("Custom label 2", "CustomAttribute2"),
            custom_attribute3: String("Custom label 3", "CustomAttribute3"),
            custom_attribute4: String("Custom label 4", "CustomAttribute4"),
            channel: String("Channel", "Channel"),
            channel_exclusivity: String("Channel Exclusivity", "ChannelExclusivity"),
        },
    }
}
