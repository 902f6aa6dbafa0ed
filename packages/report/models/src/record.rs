//! The record trait and the declaration macro for record types.

use std::fmt;

use crate::{Dimensions, FieldDescriptor, FieldError, FieldValue, KeyPart, ReportType};

/// Static description of a record type, produced by [`report_record!`].
#[derive(Debug, Clone, Copy)]
pub struct RecordTypeInfo {
    /// Short snake-case name, also used to name storage tables.
    pub name: &'static str,
    /// Report this record type is decoded from.
    pub report_type: ReportType,
    /// Report-specific descriptors, in declaration order. The shared
    /// [`Dimensions::FIELDS`] precede them in a schema.
    pub fields: &'static [FieldDescriptor],
    /// API field names left out of this report.
    pub excluded: &'static [&'static str],
    /// Identity components after the account id.
    pub key: &'static [KeyPart],
    /// Creates an empty record.
    pub construct: fn() -> Box<dyn ReportRecord>,
}

/// A decoded report row.
pub trait ReportRecord: fmt::Debug + Send + Sync {
    /// Static description of the concrete record type.
    fn info(&self) -> RecordTypeInfo;

    fn dimensions(&self) -> &Dimensions;

    fn dimensions_mut(&mut self) -> &mut Dimensions;

    /// Sets a described field (shared or report-specific) by name.
    ///
    /// # Errors
    ///
    /// * [`FieldError::UnknownField`] if the record has no such field
    /// * [`FieldError::TypeMismatch`] if the value has the wrong type
    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> Result<(), FieldError>;

    /// Reads a described field by name. Returns `None` when the field is
    /// unset or unknown.
    fn field(&self, name: &str) -> Option<FieldValue>;

    fn clone_box(&self) -> Box<dyn ReportRecord>;

    fn report_type(&self) -> ReportType {
        self.info().report_type
    }

    /// The assigned identity, if any.
    fn id(&self) -> Option<&str> {
        self.dimensions().id.as_deref()
    }
}

impl Clone for Box<dyn ReportRecord> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Maps a [`ValueKind`](crate::ValueKind) variant name to the Rust type a
/// record field of that kind stores.
#[doc(hidden)]
#[macro_export]
macro_rules! __field_type {
    (String) => { ::std::string::String };
    (Integer) => { i64 };
    (Money) => { f64 };
    (Percentage) => { f64 };
    (Decimal) => { f64 };
    (Boolean) => { bool };
    (Date) => { $crate::NaiveDate };
    (DateMonth) => { $crate::NaiveDate };
}

/// Declares a report record type.
///
/// Generates a struct embedding [`Dimensions`] plus one `Option` field per
/// declared descriptor, its descriptor table, its [`RecordTypeInfo`], and a
/// [`ReportRecord`] implementation that dispatches field access by name.
///
/// ```ignore
/// report_record! {
///     /// Campaign performance rows.
///     pub struct CampaignRecord {
///         name: "campaign",
///         report_type: ReportType::CampaignPerformanceReport,
///         exclude: [],
///         key: [KeyPart::required("campaign_id")],
///         fields: {
///             campaign_id: Integer("Campaign ID", "CampaignId"),
///             campaign_name: String("Campaign", "CampaignName").truncate(255),
///         },
///     }
/// }
/// ```
#[macro_export]
macro_rules! report_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            name: $table:literal,
            report_type: $report_type:expr,
            exclude: [$($excluded:literal),* $(,)?],
            key: [$($key:expr),* $(,)?],
            fields: {
                $(
                    $(#[$field_meta:meta])*
                    $field:ident: $kind:ident($header:literal, $api:literal) $(.$option:ident($($arg:expr),*))*
                ),* $(,)?
            } $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub dims: $crate::Dimensions,
            $(
                $(#[$field_meta])*
                pub $field: ::std::option::Option<$crate::__field_type!($kind)>,
            )*
        }

        impl $name {
            pub const FIELDS: &'static [$crate::FieldDescriptor] = &[
                $(
                    $crate::FieldDescriptor::new(
                        stringify!($field),
                        $crate::ValueKind::$kind,
                        $header,
                        $api,
                    ) $(.$option($($arg),*))*,
                )*
            ];

            pub const INFO: $crate::RecordTypeInfo = $crate::RecordTypeInfo {
                name: $table,
                report_type: $report_type,
                fields: Self::FIELDS,
                excluded: &[$($excluded),*],
                key: &[$($key),*],
                construct: Self::boxed,
            };

            fn boxed() -> ::std::boxed::Box<dyn $crate::ReportRecord> {
                ::std::boxed::Box::new(Self::default())
            }
        }

        impl $crate::ReportRecord for $name {
            fn info(&self) -> $crate::RecordTypeInfo {
                Self::INFO
            }

            fn dimensions(&self) -> &$crate::Dimensions {
                &self.dims
            }

            fn dimensions_mut(&mut self) -> &mut $crate::Dimensions {
                &mut self.dims
            }

            fn set_field(
                &mut self,
                name: &str,
                value: ::std::option::Option<$crate::FieldValue>,
            ) -> ::std::result::Result<(), $crate::FieldError> {
                match name {
                    $(
                        stringify!($field) => {
                            self.$field = $crate::convert_field(name, value)?;
                            Ok(())
                        }
                    )*
                    _ => self.dims.set_field(name, value),
                }
            }

            fn field(&self, name: &str) -> ::std::option::Option<$crate::FieldValue> {
                match name {
                    $(
                        stringify!($field) => self.$field.clone().map($crate::FieldType::into_value),
                    )*
                    _ => self.dims.field(name),
                }
            }

            fn clone_box(&self) -> ::std::boxed::Box<dyn $crate::ReportRecord> {
                ::std::boxed::Box::new(self.clone())
            }
        }
    };
}
