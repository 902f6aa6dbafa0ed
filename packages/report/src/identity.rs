//! Composite record identities.
//!
//! An identity is the owning account id, the record type's key parts, a
//! date-segment suffix, and the slicing dimensions (ad network, ad network
//! with partners, device, click type), joined with `-`. Every segment has a
//! fixed position: an absent optional segment is an empty slot, and empty
//! slots at the end are dropped. The same non-empty values always produce
//! the same identity, so re-ingesting a report overwrites rows instead of
//! duplicating them.

use adreport_report_models::{Dimensions, ReportRecord};
use chrono::NaiveDate;
use sha2::{Digest as _, Sha256};

use crate::date_range;

const SEPARATOR: &str = "-";

/// Errors raised while assigning identities.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// A required identity component has no value.
    #[error("Cannot identify {record} record: {component} is missing")]
    ComponentMissing {
        /// Record type name.
        record: &'static str,
        /// Field that is missing.
        component: &'static str,
    },

    /// The record already carries an identity.
    #[error("{record} record already has identity {id}")]
    AlreadyAssigned {
        /// Record type name.
        record: &'static str,
        /// The identity already assigned.
        id: String,
    },
}

/// Computes and assigns identities relative to a fixed reference date.
#[derive(Debug, Clone, Copy)]
pub struct IdentityAssigner {
    today: NaiveDate,
}

impl IdentityAssigner {
    /// Resolves relative date ranges against `today`.
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Uses the current UTC date as the reference date.
    #[must_use]
    pub fn for_today() -> Self {
        Self::new(chrono::Utc::now().date_naive())
    }

    /// Computes the identity of `record` without storing it.
    ///
    /// Resolving the record's date range writes the resolved start, end and
    /// month back onto the record.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::ComponentMissing`] if the account id or a
    /// required key part is absent.
    pub fn compute(&self, record: &mut dyn ReportRecord) -> Result<String, IdentityError> {
        let info = record.info();
        let missing = |component| IdentityError::ComponentMissing {
            record: info.name,
            component,
        };

        let account_id = record
            .dimensions()
            .account_id
            .ok_or_else(|| missing("account_id"))?;

        let mut parts = vec![account_id.to_string()];

        for part in info.key {
            let text = record
                .field(part.field)
                .map(|v| v.to_text())
                .filter(|t| !t.is_empty());

            match text {
                Some(text) if part.hashed => parts.push(sha256_hex(&text)),
                Some(text) => parts.push(text),
                None if part.required => return Err(missing(part.field)),
                None => parts.push(String::new()),
            }
        }

        parts.push(
            self.date_suffix(record.dimensions_mut())
                .unwrap_or_default(),
        );

        let dims = record.dimensions();
        parts.extend(
            [
                &dims.ad_network,
                &dims.ad_network_partners,
                &dims.device,
                &dims.click_type,
            ]
            .into_iter()
            .map(|v| v.clone().unwrap_or_default()),
        );

        // Absent segments keep their slot; only trailing ones are dropped.
        while parts.last().is_some_and(String::is_empty) {
            parts.pop();
        }

        Ok(parts.join(SEPARATOR))
    }

    /// Computes the identity of `record` and stores it on the record.
    ///
    /// # Errors
    ///
    /// * [`IdentityError::AlreadyAssigned`] if the record has an identity
    /// * [`IdentityError::ComponentMissing`] if a required component is
    ///   absent
    pub fn assign(&self, record: &mut dyn ReportRecord) -> Result<(), IdentityError> {
        if let Some(id) = record.id() {
            return Err(IdentityError::AlreadyAssigned {
                record: record.info().name,
                id: id.to_owned(),
            });
        }

        let id = self.compute(record)?;
        record.dimensions_mut().id = Some(id);
        Ok(())
    }

    /// Picks the most specific time segment present on the record.
    fn date_suffix(&self, dims: &mut Dimensions) -> Option<String> {
        let iso = |d: NaiveDate| d.format("%Y-%m-%d").to_string();

        if let Some(day) = dims.day {
            return Some(iso(day));
        }
        if let Some(month) = dims.month {
            return Some(month.format("%Y-%m").to_string());
        }
        if let Some(day_of_week) = dims.day_of_week.as_ref().filter(|v| !v.is_empty()) {
            return Some(day_of_week.clone());
        }
        if let Some(week) = dims.week {
            return Some(iso(week));
        }
        if let Some(quarter) = dims.quarter {
            return Some(iso(quarter));
        }
        if let Some(month_of_year) = dims.month_of_year.as_ref().filter(|v| !v.is_empty()) {
            return Some(month_of_year.clone());
        }
        if let Some(year) = dims.year {
            return Some(year.to_string());
        }

        if let Some(range) = dims
            .date_range_type
            .and_then(|t| date_range::resolve(t, self.today))
        {
            dims.date_start = Some(range.start);
            dims.date_end = Some(range.end);
            if dims.month.is_none() {
                dims.month = range.month;
            }
        }

        match (dims.date_start, dims.date_end) {
            (Some(start), Some(end)) => Some(format!("{}{SEPARATOR}{}", iso(start), iso(end))),
            _ => None,
        }
    }
}

/// Lowercase hex SHA-256 digest of `text`.
#[must_use]
pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
