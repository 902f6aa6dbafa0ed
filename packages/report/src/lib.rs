#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report schemas, row decoding, and composite identities.
//!
//! The [`registry`] maps each [`ReportType`](adreport_report_models::ReportType)
//! to a [`ReportSchema`](registry::ReportSchema) built from the record
//! declarations in [`records`]. The [`decode`] module turns a header row and
//! data rows into typed records using the coercion rules in [`parsing`], and
//! [`identity`] assigns each record the deterministic key it is stored under.

pub mod date_range;
pub mod decode;
pub mod identity;
pub mod parsing;
pub mod reader;
pub mod records;
pub mod registry;

pub use decode::{ColumnPlan, DecodeError, decode};
pub use identity::{IdentityAssigner, IdentityError};
pub use reader::{ReaderError, ReportFile, ReportReader};
pub use registry::{RegistryError, ReportRegistry, ReportSchema, initialize_registry};
