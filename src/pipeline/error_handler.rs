//! Run errors and the single-assignment slot that keeps only the first one.

use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

use crate::RunStats;

/// The single fatal error surfaced for a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Traversal could not continue (permission, I/O, missing root).
    #[error("walk failed{}: {msg}", fmt_path(.path))]
    Walk { msg: String, path: Option<PathBuf> },
    /// `process` failed for one item.
    #[error("processing {label} failed: {msg}")]
    Item { label: String, msg: String },
    /// The text source could not be read.
    #[error("reading input failed: {0}")]
    Input(#[from] std::io::Error),
    /// A pipeline thread panicked; the run cannot vouch for its aggregate.
    #[error("{0} thread panicked")]
    Panicked(&'static str),
    /// The run was cancelled before it completed and nothing else went wrong first.
    #[error("run canceled")]
    Canceled,
}

fn fmt_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl RunError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, RunError::Canceled)
    }
}

/// First-error-wins slot. Later records are dropped, not queued.
#[derive(Debug, Default)]
pub struct FirstError {
    slot: OnceLock<RunError>,
}

impl FirstError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `err` if nothing is stored yet. Returns true when `err` won.
    pub fn record(&self, err: RunError) -> bool {
        match self.slot.set(err) {
            Ok(()) => true,
            Err(lost) => {
                log::debug!("dropping error after first: {}", lost);
                false
            }
        }
    }

    pub fn is_set(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn into_inner(self) -> Option<RunError> {
        self.slot.into_inner()
    }
}

/// Check pipeline result: if a first error was recorded, return it; otherwise log tolerated failures.
/// Call after every pipeline thread has been joined. Individual skips are listed at debug level.
pub fn check_for_first_error_or_failed_items(
    first_error: FirstError,
    stats: &RunStats,
) -> Result<(), RunError> {
    if let Some(err) = first_error.into_inner() {
        return Err(err);
    }
    if !stats.failed.is_empty() {
        log::warn!(
            "Skipped {} items that failed to process",
            stats.failed.len()
        );
        if log::log_enabled!(log::Level::Debug) {
            for (label, msg) in &stats.failed {
                log::debug!("  skipped: {}: {}", label, msg);
            }
        }
    }
    Ok(())
}
