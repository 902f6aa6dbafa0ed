//! Progress reporting for ingestion runs.
//!
//! The driver reports through [`IngestProgress`] and never renders anything
//! itself. Every method defaults to doing nothing, so an implementation only
//! overrides what it displays.

/// Receives progress from an ingestion run: the rows of one file, or the
/// files of a multi-file run.
pub trait IngestProgress: Send + Sync {
    /// The number of units (rows or files) is now known.
    fn begin(&self, _total: u64) {}

    /// The run moved to a new stage (`Storing CAMPAIGN_PERFORMANCE_REPORT`).
    fn stage(&self, _stage: &str) {}

    /// `units` more rows or files are done.
    fn advance(&self, _units: u64) {}

    /// The run finished; `summary` stays on screen.
    fn complete(&self, _summary: &str) {}

    /// The run ended and leaves nothing on screen.
    fn discard(&self) {}
}

/// Reports nothing. Used by library callers and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl IngestProgress for NullProgress {}
