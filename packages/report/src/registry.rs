//! Report schema registry.
//!
//! Built once at startup from [`all_record_types`] and read-only afterwards.
//! Every record declaration is validated when it is registered, so a bad
//! descriptor table fails the process at startup instead of corrupting rows
//! later.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr as _;

use adreport_report_models::{
    Dimensions, FieldDescriptor, KeyPart, RecordTypeInfo, ReportRecord, ReportType, ValueKind,
};

use crate::records::all_record_types;

/// Errors raised while building or querying the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No schema is registered for the report type.
    #[error("Unknown report type: {report_type}")]
    UnknownReportType {
        /// Requested report type, as given.
        report_type: String,
    },

    /// A different record type is already registered for the report type.
    #[error("{report_type} is already registered to {existing}, cannot register {attempted}")]
    ConflictingRegistration {
        report_type: ReportType,
        existing: &'static str,
        attempted: &'static str,
    },

    /// A record declaration is internally inconsistent.
    #[error("Malformed descriptor in {record}: {message}")]
    MalformedDescriptor {
        /// Record type name.
        record: &'static str,
        /// Description of what went wrong.
        message: String,
    },
}

/// Field layout of one report type.
#[derive(Debug, Clone)]
pub struct ReportSchema {
    report_type: ReportType,
    info: RecordTypeInfo,
    fields: Vec<FieldDescriptor>,
    excluded: BTreeSet<&'static str>,
}

impl ReportSchema {
    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Name of the record type, also used to name storage tables.
    #[must_use]
    pub const fn record_name(&self) -> &'static str {
        self.info.name
    }

    /// Included descriptors: shared fields first, then report fields, both
    /// in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// API field names left out of this report.
    #[must_use]
    pub const fn excluded(&self) -> &BTreeSet<&'static str> {
        &self.excluded
    }

    #[must_use]
    pub const fn key(&self) -> &'static [KeyPart] {
        self.info.key
    }

    /// Looks up an included descriptor by internal field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Creates an empty record of this schema's type.
    #[must_use]
    pub fn new_record(&self) -> Box<dyn ReportRecord> {
        (self.info.construct)()
    }

    /// API field names to request from the reporting API, in schema order.
    #[must_use]
    pub fn properties_to_select(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.api_field).collect()
    }
}

/// Report type to schema lookup.
#[derive(Debug, Clone, Default)]
pub struct ReportRegistry {
    schemas: HashMap<ReportType, ReportSchema>,
}

impl ReportRegistry {
    /// Creates an empty registry. Most callers want [`initialize_registry`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `info` as the record type of `report_type`.
    ///
    /// Registering the same record type again is a no-op.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::ConflictingRegistration`] if another record type
    ///   already owns `report_type`
    /// * [`RegistryError::MalformedDescriptor`] if the declaration is
    ///   inconsistent or declares a different report type
    pub fn register(
        &mut self,
        report_type: ReportType,
        info: RecordTypeInfo,
    ) -> Result<(), RegistryError> {
        if info.report_type != report_type {
            return Err(RegistryError::MalformedDescriptor {
                record: info.name,
                message: format!("declared for {}, not {report_type}", info.report_type),
            });
        }

        if let Some(existing) = self.schemas.get(&report_type) {
            if existing.info.name == info.name {
                return Ok(());
            }
            return Err(RegistryError::ConflictingRegistration {
                report_type,
                existing: existing.info.name,
                attempted: info.name,
            });
        }

        let schema = build_schema(report_type, info)?;

        log::debug!(
            "Registered {report_type} -> {} ({} fields, {} excluded)",
            info.name,
            schema.fields.len(),
            schema.excluded.len(),
        );

        self.schemas.insert(report_type, schema);
        Ok(())
    }

    /// Returns the schema of `report_type`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownReportType`] if nothing is registered.
    pub fn schema_for(&self, report_type: ReportType) -> Result<&ReportSchema, RegistryError> {
        self.schemas
            .get(&report_type)
            .ok_or_else(|| RegistryError::UnknownReportType {
                report_type: report_type.to_string(),
            })
    }

    /// Returns the schema of a report type given by its API name
    /// (`CAMPAIGN_PERFORMANCE_REPORT`).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownReportType`] if the name is not a
    /// report type or nothing is registered for it.
    pub fn schema_for_name(&self, name: &str) -> Result<&ReportSchema, RegistryError> {
        let report_type =
            ReportType::from_str(name.trim()).map_err(|_| RegistryError::UnknownReportType {
                report_type: name.to_owned(),
            })?;
        self.schema_for(report_type)
    }

    /// API field names to select for `report_type`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownReportType`] if nothing is registered.
    pub fn properties_to_select(
        &self,
        report_type: ReportType,
    ) -> Result<Vec<&'static str>, RegistryError> {
        Ok(self.schema_for(report_type)?.properties_to_select())
    }

    /// Registered report types, in sort order.
    #[must_use]
    pub fn report_types(&self) -> Vec<ReportType> {
        let mut report_types: Vec<ReportType> = self.schemas.keys().copied().collect();
        report_types.sort_unstable();
        report_types
    }

    /// Registered schemas, ordered by report type.
    pub fn schemas(&self) -> impl Iterator<Item = &ReportSchema> {
        self.report_types()
            .into_iter()
            .filter_map(move |report_type| self.schemas.get(&report_type))
    }
}

/// Builds the registry from every compiled-in record type.
///
/// # Errors
///
/// Returns [`RegistryError`] if any declaration is malformed or two record
/// types claim the same report type.
pub fn initialize_registry() -> Result<ReportRegistry, RegistryError> {
    let mut registry = ReportRegistry::new();

    for info in all_record_types() {
        registry.register(info.report_type, info)?;
    }

    log::debug!("Report registry ready with {} schemas", registry.schemas.len());

    Ok(registry)
}

fn build_schema(report_type: ReportType, info: RecordTypeInfo) -> Result<ReportSchema, RegistryError> {
    let malformed = |message: String| RegistryError::MalformedDescriptor {
        record: info.name,
        message,
    };

    let declared: Vec<FieldDescriptor> = Dimensions::FIELDS
        .iter()
        .chain(info.fields)
        .copied()
        .collect();

    // ── Descriptor consistency ──────────────────────────────────────
    let mut names = BTreeSet::new();
    let mut headers = BTreeSet::new();
    let mut api_fields = BTreeSet::new();

    for field in &declared {
        if field.name.is_empty() || field.header.is_empty() || field.api_field.is_empty() {
            return Err(malformed(format!("field {:?} has an empty name", field.name)));
        }
        if !names.insert(field.name) {
            return Err(malformed(format!("duplicate field name {}", field.name)));
        }
        if !headers.insert(field.header) {
            return Err(malformed(format!("duplicate header {:?}", field.header)));
        }
        if !api_fields.insert(field.api_field) {
            return Err(malformed(format!("duplicate API field {}", field.api_field)));
        }
        if field.zero_default && field.kind != ValueKind::Integer {
            return Err(malformed(format!("{} is zero-defaulted but not an integer", field.name)));
        }
        if field.max_len.is_some() && field.kind != ValueKind::String {
            return Err(malformed(format!("{} is truncated but not a string", field.name)));
        }
    }

    // ── Exclusions ──────────────────────────────────────────────────
    let excluded: BTreeSet<&'static str> = info.excluded.iter().copied().collect();

    if let Some(unknown) = excluded.iter().find(|e| !api_fields.contains(*e)) {
        return Err(malformed(format!("excluded field {unknown} is not declared")));
    }

    let fields: Vec<FieldDescriptor> = declared
        .into_iter()
        .filter(|f| !excluded.contains(f.api_field))
        .collect();

    // ── Identity key ────────────────────────────────────────────────
    for part in info.key {
        if !fields.iter().any(|f| f.name == part.field) {
            return Err(malformed(format!(
                "key part {} is not an included field",
                part.field
            )));
        }
    }

    Ok(ReportSchema {
        report_type,
        info,
        fields,
        excluded,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use adreport_report_models::report_record;

    use super::*;
    use crate::records::{CampaignRecord, UrlRecord};

    report_record! {
        /// Claims the campaign report under a different name.
        pub struct RivalCampaignRecord {
            name: "rival_campaign",
            report_type: ReportType::CampaignPerformanceReport,
            exclude: [],
            key: [],
            fields: {
                rival_id: Integer("Rival ID", "RivalId"),
            },
        }
    }

    report_record! {
        /// Redeclares a shared header.
        pub struct ClashingHeaderRecord {
            name: "clashing_header",
            report_type: ReportType::GeoPerformanceReport,
            exclude: [],
            key: [],
            fields: {
                other_cost: Money("Cost", "OtherCost"),
            },
        }
    }

    report_record! {
        /// Keys on a field it does not have.
        pub struct DanglingKeyRecord {
            name: "dangling_key",
            report_type: ReportType::GeoPerformanceReport,
            exclude: [],
            key: [KeyPart::required("missing_id")],
            fields: {
                present_id: Integer("Present ID", "PresentId"),
            },
        }
    }

    report_record! {
        /// Excludes a field nobody declares.
        pub struct BadExclusionRecord {
            name: "bad_exclusion",
            report_type: ReportType::GeoPerformanceReport,
            exclude: ["NoSuchField"],
            key: [],
            fields: {
                present_id: Integer("Present ID", "PresentId"),
            },
        }
    }

    #[test]
    fn loads_all_record_types() {
        let registry = initialize_registry().unwrap();
        assert_eq!(registry.report_types().len(), all_record_types().len());
    }

    #[test]
    fn record_names_are_unique() {
        let names: Vec<&str> = all_record_types().iter().map(|i| i.name).collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn properties_follow_included_descriptors() {
        let registry = initialize_registry().unwrap();

        for schema in registry.schemas() {
            let properties = schema.properties_to_select();
            let expected: Vec<&str> = Dimensions::FIELDS
                .iter()
                .chain(registry_info(schema).fields)
                .filter(|f| !schema.excluded().contains(f.api_field))
                .map(|f| f.api_field)
                .collect();

            assert_eq!(properties, expected, "{}", schema.report_type());

            let unique: BTreeSet<&str> = properties.iter().copied().collect();
            assert_eq!(unique.len(), properties.len());
        }
    }

    fn registry_info(schema: &ReportSchema) -> RecordTypeInfo {
        schema.new_record().info()
    }

    #[test]
    fn exclusions_drop_fields_from_selection() {
        let registry = initialize_registry().unwrap();
        let properties = registry
            .properties_to_select(ReportType::UrlPerformanceReport)
            .unwrap();

        assert!(!properties.contains(&"AveragePosition"));
        assert!(!properties.contains(&"Device"));
        assert!(!properties.contains(&"ClickType"));
        assert!(properties.contains(&"Url"));
        assert!(properties.contains(&"Clicks"));
    }

    #[test]
    fn shared_fields_come_first() {
        let registry = initialize_registry().unwrap();
        let properties = registry
            .properties_to_select(ReportType::CampaignPerformanceReport)
            .unwrap();

        assert_eq!(properties[0], "ExternalCustomerId");
        assert_eq!(properties.last(), Some(&"Labels"));
    }

    #[test]
    fn unknown_report_type_is_an_error() {
        let registry = ReportRegistry::new();
        let err = registry
            .schema_for(ReportType::CampaignPerformanceReport)
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownReportType { .. }));

        let registry = initialize_registry().unwrap();
        assert!(registry.schema_for_name("NOT_A_REPORT").is_err());
        assert!(registry.schema_for_name("GEO_PERFORMANCE_REPORT").is_ok());
    }

    #[test]
    fn re_registering_is_idempotent() {
        let mut registry = ReportRegistry::new();
        registry
            .register(ReportType::CampaignPerformanceReport, CampaignRecord::INFO)
            .unwrap();
        registry
            .register(ReportType::CampaignPerformanceReport, CampaignRecord::INFO)
            .unwrap();

        assert_eq!(registry.report_types(), [ReportType::CampaignPerformanceReport]);
    }

    #[test]
    fn conflicting_registration_is_rejected() {
        let mut registry = ReportRegistry::new();
        registry
            .register(ReportType::CampaignPerformanceReport, CampaignRecord::INFO)
            .unwrap();

        let err = registry
            .register(ReportType::CampaignPerformanceReport, RivalCampaignRecord::INFO)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::ConflictingRegistration {
                existing: "campaign",
                attempted: "rival_campaign",
                ..
            }
        ));
    }

    #[test]
    fn record_types_register_only_under_their_report_type() {
        let mut registry = ReportRegistry::new();
        let err = registry
            .register(ReportType::GeoPerformanceReport, CampaignRecord::INFO)
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::MalformedDescriptor {
                record: "campaign",
                ..
            }
        ));
        assert!(registry.report_types().is_empty());
    }

    #[test]
    fn malformed_declarations_are_rejected() {
        for info in [
            ClashingHeaderRecord::INFO,
            DanglingKeyRecord::INFO,
            BadExclusionRecord::INFO,
        ] {
            let mut registry = ReportRegistry::new();
            let err = registry.register(info.report_type, info).unwrap_err();
            assert!(
                matches!(err, RegistryError::MalformedDescriptor { .. }),
                "{}: {err}",
                info.name
            );
        }
    }

    #[test]
    fn query_extension_and_feed_reports_are_registered() {
        let registry = initialize_registry().unwrap();

        for name in [
            "SEARCH_QUERY_PERFORMANCE_REPORT",
            "AD_EXTENSIONS_PERFORMANCE_REPORT",
            "SHOPPING_PERFORMANCE_REPORT",
            "VIDEO_CAMPAIGN_REPORT",
            "CAMPAIGN_LOCATION_TARGET_REPORT",
            "PLACEHOLDER_FEED_ITEM_REPORT",
            "DISPLAY_KEYWORD_PERFORMANCE_REPORT",
        ] {
            assert!(registry.schema_for_name(name).is_ok(), "{name}");
        }

        let properties = registry
            .properties_to_select(ReportType::AdExtensionsPerformanceReport)
            .unwrap();
        assert!(!properties.contains(&"ExternalCustomerId"));
        assert!(properties.contains(&"AdExtensionId"));
    }

    #[test]
    fn url_schema_keeps_key_fields() {
        let registry = initialize_registry().unwrap();
        let schema = registry.schema_for(ReportType::UrlPerformanceReport).unwrap();

        assert_eq!(schema.record_name(), UrlRecord::INFO.name);
        assert!(schema.field("url").is_some());
        assert!(schema.field("device").is_none());
        assert_eq!(
            schema.field("ctr").map(|f: &FieldDescriptor| f.kind),
            Some(ValueKind::Percentage)
        );
    }
}
