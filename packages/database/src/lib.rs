#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Storage for decoded report records.
//!
//! [`BatchedUpsertStore`](store::BatchedUpsertStore) assigns identities and
//! writes records in fixed-size batches through a
//! [`StoreBackend`](store::StoreBackend). Two backends ship with the crate:
//! a `DuckDB` file with one table per record type ([`report_db`]) and an
//! in-memory map used for dry runs and tests ([`memory`]).

pub mod memory;
pub mod paths;
pub mod report_db;
pub mod store;

pub use memory::MemoryBackend;
pub use report_db::DuckDbBackend;
pub use store::{
    BatchedUpsertStore, DEFAULT_BATCH_SIZE, ListQuery, PersistSummary, StoreBackend,
};

use adreport_report::{IdentityError, RegistryError};
use adreport_report_models::FieldError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record could not be identified.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// A record's report type has no schema.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A stored value does not fit its record field.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// I/O error (creating the data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A query names a column the schema does not have.
    #[error("Unknown column {column} for {record}")]
    UnknownColumn {
        /// Record type name.
        record: &'static str,
        /// Requested column.
        column: String,
    },

    /// Backend-specific failure.
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of what went wrong.
        message: String,
    },
}
