//! Tagpipe: concurrent fan-out/fan-in over directory trees with cooperative cancellation.
//!
//! A producer (tree walker or line scanner) feeds a bounded worker pool; workers run a per-item
//! computation; a single merge loop folds outcomes into an aggregate. The first fatal error wins,
//! cancels everything still running, and is the only thing the caller sees.

pub mod digest;
pub mod engine;
pub mod pipeline;
pub mod tags;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use digest::{digest_tree, process_tree};
pub use pipeline::{CancelToken, RunError, TagTally, Total};
pub use tags::{count_tags_in_text, count_tags_in_tree, tally_tags_in_tree};

/// Result alias used by the CLI and collaborators; pipeline runs return [`RunError`] directly.
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
