//! Pipeline components: cancellation, producers (walk, lines), worker pool, merge, orchestrator.

pub mod cancel;
pub mod context;
pub mod error_handler;
pub mod lines;
pub mod merge;
pub mod orchestrator;
pub mod walk;
pub mod worker;

pub use cancel::{CancelGuard, CancelToken};
pub use context::{
    Dispatcher, PipelineChannels, PipelineContext, PipelineTuning, RunCounters,
    create_pipeline_channels,
};
pub use error_handler::{FirstError, RunError, check_for_first_error_or_failed_items};
pub use lines::scan_lines;
pub use merge::{Aggregate, MergeEnd, TagTally, Total, drain_outcomes};
pub use orchestrator::run_pipeline;
pub use walk::{
    WalkContext, WalkOutcome, run_walk_loop, to_outcome_jwalk, to_outcome_walkdir,
    walk_tree_items,
};
pub use worker::{spawn_workers, worker_loop};
