#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the adreport toolchain.
//!
//! Renders ingestion progress with `indicatif` bars behind the
//! [`IngestProgress`] trait. [`init_logger`] routes `log` output through
//! `indicatif-log-bridge` so log lines and bars do not interleave.

use std::sync::Arc;
use std::time::Duration;

use adreport_ingest_models::IngestProgress;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`IngestProgress`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style to switch to once `begin()` provides a known length.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Row bar for one report file. Spins while the file is read, then
    /// counts decoded rows once [`IngestProgress::begin()`] gives the row
    /// count.
    #[must_use]
    pub fn rows_bar(multi: &MultiProgress, file_name: &str) -> Arc<dyn IngestProgress> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(file_name.to_string());
        bar.set_message("reading");

        let bar_style = ProgressStyle::with_template(
            "  {prefix} {msg} {wide_bar:.cyan/dim} {pos}/{len} rows [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Arc::new(Self { bar, bar_style })
    }

    /// File bar for a multi-file ingest (`files 2/5`).
    #[must_use]
    pub fn files_bar(multi: &MultiProgress, total: u64) -> Arc<dyn IngestProgress> {
        let bar = multi.add(ProgressBar::new(total));
        let bar_style = ProgressStyle::with_template(
            "{msg} {wide_bar:.green/dim} {pos}/{len} files [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
        bar.set_style(bar_style.clone());
        bar.set_message("Ingesting");

        Arc::new(Self { bar, bar_style })
    }
}

impl IngestProgress for IndicatifProgress {
    fn begin(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
    }

    fn stage(&self, stage: &str) {
        self.bar.set_message(stage.to_owned());
    }

    fn advance(&self, units: u64) {
        self.bar.inc(units);
    }

    fn complete(&self, summary: &str) {
        self.bar.finish_with_message(summary.to_owned());
    }

    fn discard(&self) {
        self.bar.finish_and_clear();
    }
}

/// Installs a `pretty_env_logger` logger (filtered by `RUST_LOG`) behind
/// `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] every progress bar must be added to so log
/// lines are printed above the bars.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // A logger may already be installed (tests).
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn forwards_updates_to_the_bar() {
        let progress = IndicatifProgress {
            bar: ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()),
            bar_style: ProgressStyle::default_bar(),
        };

        progress.begin(10);
        progress.advance(3);
        assert_eq!(progress.bar.length(), Some(10));
        assert_eq!(progress.bar.position(), 3);

        progress.stage("Storing");
        assert_eq!(progress.bar.message(), "Storing");

        progress.advance(4);
        progress.complete("done");
        assert_eq!(progress.bar.position(), 7);
        assert!(progress.bar.is_finished());
    }

    #[test]
    fn bars_attach_to_a_hidden_multi_progress() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let rows = IndicatifProgress::rows_bar(&multi, "campaign.csv");
        let files = IndicatifProgress::files_bar(&multi, 2);

        rows.begin(4);
        files.advance(1);
        rows.discard();
        files.complete("ingested");
    }

    #[test]
    fn init_logger_can_run_twice() {
        let _first = init_logger();
        let _second = init_logger();
    }
}
