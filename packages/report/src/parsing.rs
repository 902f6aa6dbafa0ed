//! Cell coercion for report exports.
//!
//! Exports format numbers for humans: grouping separators, trailing `%`,
//! `--` for "no data", and `< 10%` style bounds. These helpers undo that and
//! produce the typed value a [`FieldDescriptor`] asks for.

use std::num::{ParseFloatError, ParseIntError};

use adreport_report_models::{FieldDescriptor, FieldValue, ValueKind};
use chrono::{Datelike as _, NaiveDate};

/// A cell that could not be coerced into its declared kind.
#[derive(Debug, thiserror::Error)]
#[error("cannot read {value:?} as {kind}")]
pub struct CoercionError {
    /// Declared kind of the field.
    pub kind: ValueKind,
    /// Raw cell text.
    pub value: String,
}

/// Marker exports use for "no data".
const NO_DATA: &str = "--";

/// Full-date formats accepted in date cells.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%B %d, %Y", "%b %d, %Y"];

/// Month formats, parsed after prefixing the first day of the month.
const MONTH_FORMATS: &[(&str, &str)] = &[
    ("{}-01", "%Y-%m-%d"),
    ("1 {}", "%d %B %Y"),
    ("1 {}", "%d %b %Y"),
];

/// Coerces one raw cell into the value kind of `field`.
///
/// Returns `Ok(None)` for empty cells (or `Some(0)` when the field is
/// zero-defaulted).
///
/// # Errors
///
/// Returns [`CoercionError`] if a non-empty cell does not parse.
pub fn coerce(field: &FieldDescriptor, raw: &str) -> Result<Option<FieldValue>, CoercionError> {
    let fail = || CoercionError {
        kind: field.kind,
        value: raw.to_owned(),
    };

    let value = match field.kind {
        ValueKind::String => Some(FieldValue::Str(match field.max_len {
            Some(max) => truncate_chars(raw, max).to_owned(),
            None => raw.to_owned(),
        })),
        ValueKind::Integer => parse_integer(raw)
            .map_err(|_| fail())?
            .or(field.zero_default.then_some(0))
            .map(FieldValue::Int),
        ValueKind::Money | ValueKind::Decimal => {
            parse_decimal(raw).map_err(|_| fail())?.map(FieldValue::Decimal)
        }
        ValueKind::Percentage => parse_decimal(raw)
            .map_err(|_| fail())?
            .map(|v| FieldValue::Decimal(v / 100.0)),
        ValueKind::Boolean => parse_boolean(raw).map(FieldValue::Bool),
        ValueKind::Date => {
            if raw.trim().is_empty() {
                None
            } else {
                Some(FieldValue::Date(parse_date(raw).ok_or_else(fail)?))
            }
        }
        ValueKind::DateMonth => {
            if raw.trim().is_empty() {
                None
            } else {
                Some(FieldValue::Date(parse_month(raw).ok_or_else(fail)?))
            }
        }
    };

    Ok(value)
}

/// Parses a formatted decimal.
///
/// Whitespace, `%`, `<` and `>` are dropped and `--` reads as zero. When
/// both `,` and `.` occur, whichever comes last is the decimal separator;
/// a single `,` on its own is a decimal comma, several are grouping.
///
/// # Errors
///
/// Returns [`ParseFloatError`] if the cleaned text is not a number.
pub fn parse_decimal(raw: &str) -> Result<Option<f64>, ParseFloatError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '%' | '<' | '>'))
        .collect();

    if cleaned.is_empty() {
        return Ok(None);
    }
    if cleaned == NO_DATA {
        return Ok(Some(0.0));
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) if cleaned.matches(',').count() == 1 => cleaned.replace(',', "."),
        (Some(_), None) => cleaned.replace(',', ""),
        (None, _) => cleaned,
    };

    normalized.parse::<f64>().map(Some)
}

/// Parses an integer, dropping grouping commas. `--` and empty cells have
/// no value.
///
/// # Errors
///
/// Returns [`ParseIntError`] if the cleaned text is not an integer.
pub fn parse_integer(raw: &str) -> Result<Option<i64>, ParseIntError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if cleaned.is_empty() || cleaned == NO_DATA {
        return Ok(None);
    }

    cleaned.parse::<i64>().map(Some)
}

/// Case-insensitive `true`; every other non-empty value is `false`.
#[must_use]
pub fn parse_boolean(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.eq_ignore_ascii_case("true"))
}

/// Parses a full date, falling back to the month forms (first day).
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_month_only(trimmed))
}

/// Parses a month, normalized to its first day. Full dates are accepted
/// and truncated to their month.
#[must_use]
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    parse_date(raw).and_then(|d| d.with_day(1))
}

fn parse_month_only(trimmed: &str) -> Option<NaiveDate> {
    MONTH_FORMATS.iter().find_map(|(template, fmt)| {
        let candidate = template.replace("{}", trimmed);
        NaiveDate::parse_from_str(&candidate, fmt).ok()
    })
}

/// Returns the longest prefix of `s` with at most `max` characters.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    s.char_indices().nth(max).map_or(s, |(idx, _)| &s[..idx])
}
