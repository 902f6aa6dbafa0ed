//! Dynamically typed field values and their conversions.

use chrono::NaiveDate;
use serde::Serialize;

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// Name of the variant, used in type mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Bool(_) => "boolean",
            Self::Date(_) => "date",
        }
    }

    /// Text form used when the value becomes part of an identity or a
    /// stored text column. Dates are written as `YYYY-MM-DD`.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Decimal(d) => d.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Errors raised when reading or writing record fields by name.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// The record type has no field with this name.
    #[error("Unknown field: {field}")]
    UnknownField {
        /// Requested field name.
        field: String,
    },

    /// The value does not fit the field's Rust type.
    #[error("Field {field} expects {expected}, got {actual}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Type the field stores.
        expected: &'static str,
        /// Type of the supplied value.
        actual: &'static str,
    },
}

/// Rust types a record field can hold.
pub trait FieldType: Sized {
    /// Name used in type mismatch errors.
    const TYPE_NAME: &'static str;

    /// Extracts `Self` from a matching value.
    fn from_value(value: FieldValue) -> Option<Self>;

    /// Wraps `self` into a [`FieldValue`].
    fn into_value(self) -> FieldValue;
}

macro_rules! impl_field_type {
    (
        $(
            $variant:ident($ty:ty) {
                $name:literal
            }
        )*
    ) => {
        $(
            impl FieldType for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_value(self) -> FieldValue {
                    FieldValue::$variant(self)
                }
            }

            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_field_type! {
    Str(String) {
        "string"
    }
    Int(i64) {
        "integer"
    }
    Decimal(f64) {
        "decimal"
    }
    Bool(bool) {
        "boolean"
    }
    Date(NaiveDate) {
        "date"
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

/// Converts an optional value into the Rust type of the field `field`.
///
/// Integers are widened into decimal fields; any other mismatch is an error.
///
/// # Errors
///
/// Returns [`FieldError::TypeMismatch`] if the value has the wrong type.
pub fn convert_field<T: FieldType>(
    field: &str,
    value: Option<FieldValue>,
) -> Result<Option<T>, FieldError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let actual = value.type_name();
    let value = match value {
        #[allow(clippy::cast_precision_loss)]
        FieldValue::Int(i) if T::TYPE_NAME == f64::TYPE_NAME => FieldValue::Decimal(i as f64),
        other => other,
    };

    T::from_value(value)
        .map(Some)
        .ok_or_else(|| FieldError::TypeMismatch {
            field: field.to_owned(),
            expected: T::TYPE_NAME,
            actual,
        })
}
