//! Tag counting: over lines of a text source, or over the files of a tree.

use std::io::BufRead;
use std::path::Path;

use crate::digest::process_tree;
use crate::engine::matching::TagMatcher;
use crate::pipeline::{
    CancelToken, PipelineTuning, RunError, TagTally, Total, run_pipeline, scan_lines,
};
use crate::utils::config::WorkerThreadLimits;
use crate::{FileItem, Line, PipeOpts, Run};

/// Count lines of `reader` that carry a tag. The reader is scanned once by a single producer;
/// lines are matched by the pool (3 workers unless `opts.num_workers` says otherwise).
///
/// Matching cannot fail, so only a read error or cancellation ends the run early.
pub fn count_tags_in_text<R>(
    reader: R,
    matcher: &TagMatcher,
    opts: &PipeOpts,
    cancel: Option<&CancelToken>,
) -> Result<Run<Total>, RunError>
where
    R: BufRead + Send,
{
    let mut opts = opts.clone();
    opts.num_workers = opts
        .num_workers
        .or(Some(WorkerThreadLimits::default().text_workers));
    let tuning = PipelineTuning::from_opts(&opts);
    run_pipeline(
        &tuning,
        cancel,
        move |dispatcher| scan_lines(reader, dispatcher),
        |line: &Line| Ok(matcher.line_hit(&line.text)),
        Total::default(),
    )
}

/// Total number of tagged lines across every regular file under `root`.
pub fn count_tags_in_tree(
    root: &Path,
    matcher: &TagMatcher,
    opts: &PipeOpts,
    cancel: Option<&CancelToken>,
) -> Result<Run<Total>, RunError> {
    process_tree(
        root,
        opts,
        cancel,
        |item: &FileItem| matcher.count_lines_in_file(&item.abs),
        Total::default(),
    )
}

/// Per-tag occurrence counts across every regular file under `root`.
pub fn tally_tags_in_tree(
    root: &Path,
    matcher: &TagMatcher,
    opts: &PipeOpts,
    cancel: Option<&CancelToken>,
) -> Result<Run<TagTally>, RunError> {
    process_tree(
        root,
        opts,
        cancel,
        |item: &FileItem| matcher.tally_file(&item.abs),
        TagTally::default(),
    )
}
