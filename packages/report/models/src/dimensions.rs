//! Columns shared by every report record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::{DateRangeType, FieldDescriptor, FieldError, FieldType as _, FieldValue, ValueKind};

/// Identity, context, segment, and core metric fields common to all
/// report types.
///
/// The context fields (`id` through `date_range_type`) are never read from
/// a report file. They are stamped by the ingestion run and the identity
/// assigner. Everything from `account_id` on is described by
/// [`Dimensions::FIELDS`] and decoded from the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dimensions {
    // ── Context ─────────────────────────────────────────────────────
    pub id: Option<String>,
    pub top_account_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub date_range_type: Option<DateRangeType>,

    // ── Account ─────────────────────────────────────────────────────
    pub account_id: Option<i64>,
    pub account_descriptive_name: Option<String>,
    pub currency_code: Option<String>,

    // ── Segments ────────────────────────────────────────────────────
    pub day: Option<NaiveDate>,
    pub day_of_week: Option<String>,
    pub week: Option<NaiveDate>,
    pub month: Option<NaiveDate>,
    pub month_of_year: Option<String>,
    pub quarter: Option<NaiveDate>,
    pub year: Option<i64>,
    pub device: Option<String>,
    pub click_type: Option<String>,
    pub ad_network: Option<String>,
    pub ad_network_partners: Option<String>,

    // ── Metrics ─────────────────────────────────────────────────────
    pub cost: Option<f64>,
    pub clicks: Option<i64>,
    pub impressions: Option<i64>,
    pub conversions: Option<i64>,
    pub ctr: Option<f64>,
    pub avg_cpc: Option<f64>,
    pub avg_cpm: Option<f64>,
    pub avg_position: Option<f64>,
}

macro_rules! dimension_fields {
    (
        $(
            $field:ident: $kind:ident($header:literal, $api:literal) $(.$option:ident($($arg:expr),*))*
        ),* $(,)?
    ) => {
        impl Dimensions {
            /// Descriptors of the shared fields, in the order they are
            /// selected from the API.
            pub const FIELDS: &'static [FieldDescriptor] = &[
                $(
                    FieldDescriptor::new(stringify!($field), ValueKind::$kind, $header, $api)
                        $(.$option($($arg),*))*,
                )*
            ];

            /// Sets a described field by name.
            ///
            /// # Errors
            ///
            /// * [`FieldError::UnknownField`] if `name` is not a shared field
            /// * [`FieldError::TypeMismatch`] if the value has the wrong type
            pub fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> Result<(), FieldError> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = crate::convert_field(name, value)?;
                            Ok(())
                        }
                    )*
                    _ => Err(FieldError::UnknownField {
                        field: name.to_owned(),
                    }),
                }
            }

            /// Reads a described field by name. Returns `None` when the
            /// field is unset or unknown.
            #[must_use]
            pub fn field(&self, name: &str) -> Option<FieldValue> {
                match name {
                    $(
                        stringify!($field) => self.$field.clone().map(|v| v.into_value()),
                    )*
                    _ => None,
                }
            }
        }
    };
}

dimension_fields! {
    account_id: Integer("Customer ID", "ExternalCustomerId"),
    account_descriptive_name: String("Account", "AccountDescriptiveName").truncate(255),
    currency_code: String("Currency", "AccountCurrencyCode"),
    day: Date("Day", "Date"),
    day_of_week: String("Day of week", "DayOfWeek"),
    week: Date("Week", "Week"),
    month: DateMonth("Month", "Month"),
    month_of_year: String("Month of Year", "MonthOfYear"),
    quarter: Date("Quarter", "Quarter"),
    year: Integer("Year", "Year"),
    device: String("Device", "Device"),
    click_type: String("Click type", "ClickType"),
    ad_network: String("Network", "AdNetworkType1"),
    ad_network_partners: String("Network (with search partners)", "AdNetworkType2"),
    cost: Money("Cost", "Cost"),
    clicks: Integer("Clicks", "Clicks").zero_default(),
    impressions: Integer("Impressions", "Impressions").zero_default(),
    conversions: Integer("Conv. (1-per-click)", "Conversions").zero_default(),
    ctr: Percentage("CTR", "Ctr"),
    avg_cpc: Money("Avg. CPC", "AverageCpc"),
    avg_cpm: Money("Avg. CPM", "AverageCpm"),
    avg_position: Decimal("Avg. position", "AveragePosition"),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_fields_round_trip_by_name() {
        let mut dims = Dimensions::default();
        dims.set_field("clicks", Some(FieldValue::Int(10))).unwrap();
        dims.set_field("device", Some(FieldValue::from("Computers")))
            .unwrap();

        assert_eq!(dims.clicks, Some(10));
        assert_eq!(dims.field("device"), Some(FieldValue::from("Computers")));
        assert_eq!(dims.field("cost"), None);
    }

    #[test]
    fn context_fields_are_not_settable_by_name() {
        let mut dims = Dimensions::default();
        let err = dims
            .set_field("id", Some(FieldValue::from("abc")))
            .unwrap_err();
        assert!(matches!(err, FieldError::UnknownField { .. }));
    }

    #[test]
    fn zero_default_marks_count_metrics_only() {
        let zeroed: Vec<&str> = Dimensions::FIELDS
            .iter()
            .filter(|f| f.zero_default)
            .map(|f| f.name)
            .collect();
        assert_eq!(zeroed, ["clicks", "impressions", "conversions"]);
    }
}
