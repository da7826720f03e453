//! Tree runs: digest every regular file, or apply any per-file computation.

use std::collections::HashMap;
use std::path::Path;

use crate::engine::hashing::hash_file;
use crate::pipeline::{
    Aggregate, CancelToken, PipelineTuning, RunError, WalkContext, run_pipeline, walk_tree_items,
};
use crate::{Digests, FileItem, PipeOpts, Run};

/// Walk `root` and run `process` on every regular file, folding results into `aggregate`.
///
/// The walk happens on the producer thread, `process` on the worker pool, and `aggregate` is
/// filled only by the merge loop. With [`ErrorPolicy::FailFast`](crate::ErrorPolicy::FailFast),
/// the first failure (walk or item) is returned and in-flight work is abandoned.
pub fn process_tree<T, A, F>(
    root: &Path,
    opts: &PipeOpts,
    cancel: Option<&CancelToken>,
    process: F,
    aggregate: A,
) -> Result<Run<A>, RunError>
where
    T: Send,
    A: Aggregate<std::path::PathBuf, T>,
    F: Fn(&FileItem) -> anyhow::Result<T> + Sync,
{
    let walk_ctx = WalkContext::new(root, opts)?;
    let tuning = PipelineTuning::from_opts(opts);
    log::debug!("tree run: root {}", walk_ctx.root.display());
    run_pipeline(
        &tuning,
        cancel,
        |dispatcher| walk_tree_items(&walk_ctx, dispatcher),
        process,
        aggregate,
    )
}

/// Map of relative path → blake3 digest for every regular file under `root`.
/// Fails if the walk fails or any file cannot be read; no partial map is returned.
pub fn digest_tree(
    root: &Path,
    opts: &PipeOpts,
    cancel: Option<&CancelToken>,
) -> Result<Run<Digests>, RunError> {
    process_tree(
        root,
        opts,
        cancel,
        |item: &FileItem| hash_file(&item.abs),
        HashMap::new(),
    )
}
