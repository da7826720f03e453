//! Public and internal types for the tagpipe API and pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Blake3 digest of a file's contents.
pub type Digest = [u8; 32];

/// Map of path → digest for a digested tree.
///
/// Each key is a path relative to the (canonicalized) root that was walked.
pub type Digests = HashMap<PathBuf, Digest>;

/// A unit of discovered work. Consumed exactly once by exactly one worker.
pub trait WorkItem: Send {
    /// Identity the aggregate is keyed by.
    type Key;

    /// Human-readable label used in error messages and skip lists.
    fn label(&self) -> String;

    fn into_key(self) -> Self::Key;
}

/// A regular file found by the tree walker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileItem {
    /// Absolute path, used to open the file.
    pub abs: PathBuf,
    /// Path relative to the walked root, used as the aggregate key.
    pub rel: PathBuf,
}

impl WorkItem for FileItem {
    type Key = PathBuf;

    fn label(&self) -> String {
        self.rel.display().to_string()
    }

    fn into_key(self) -> PathBuf {
        self.rel
    }
}

/// One line of text from the line scanner. `number` is 1-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl WorkItem for Line {
    type Key = usize;

    fn label(&self) -> String {
        format!("line {}", self.number)
    }

    fn into_key(self) -> usize {
        self.number
    }
}

/// Result of processing one work item. `value` carries the formatted error when `process` failed.
#[derive(Debug)]
pub struct Outcome<W, T> {
    pub item: W,
    pub value: Result<T, String>,
}

/// What the merge stage does with a failed item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// First item error aborts the run and is returned to the caller.
    #[default]
    FailFast,
    /// Item errors are logged and recorded in [`RunStats::failed`]; the run continues.
    Tolerant,
}

/// Tag and how many times it was seen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Counters for a finished run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunStats {
    /// Items handed to the worker pool.
    pub dispatched: usize,
    /// Outcomes that reached the merge stage.
    pub delivered: usize,
    /// Outcomes folded into the aggregate.
    pub merged: usize,
    /// `(label, message)` for items that failed under [`ErrorPolicy::Tolerant`].
    pub failed: Vec<(String, String)>,
}

/// Successful run: the fully drained aggregate plus counters.
#[derive(Debug)]
pub struct Run<A> {
    pub aggregate: A,
    pub stats: RunStats,
}

/// Lib options for the tree and text runs.
#[derive(Clone, Debug, Default)]
pub struct PipeOpts {
    /// Worker pool size. When None, derived from rayon's thread count and the FD limit.
    pub num_workers: Option<usize>,
    /// Capacity of the item and outcome queues. When None, uses [`PipelineConsts::CHANNEL_CAP`](crate::utils::config::PipelineConsts::CHANNEL_CAP).
    pub channel_cap: Option<usize>,
    /// Use parallel walk (jwalk) instead of walkdir.
    pub parallel_walk: bool,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, e.g. `target`, `*.log`).
    pub exclude: Vec<String>,
    /// How item failures are handled.
    pub error_policy: ErrorPolicy,
}

/// Full options (CLI). Use [`PipeOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    pub pipe: PipeOpts,
    /// Tag pattern (regex). When None, uses [`DEFAULT_TAG_PATTERN`](crate::engine::matching::DEFAULT_TAG_PATTERN).
    pub pattern: Option<String>,
    /// Debug logging.
    pub verbose: bool,
    /// Emit JSON instead of plain text.
    pub json: bool,
}
