//! Tree walker: turns a walkdir/jwalk iterator into [`FileItem`]s handed to the dispatcher.

use std::path::{Path, PathBuf};

use log::debug;

use super::context::Dispatcher;
use super::error_handler::RunError;
use crate::engine::tools::{canonicalize_root, is_excluded, path_relative_to};
use crate::{FileItem, PipeOpts};

/// Root and filters for one walk.
#[derive(Clone, Debug)]
pub struct WalkContext {
    pub root: PathBuf,
    pub exclude: Vec<String>,
    pub follow_links: bool,
    pub parallel_walk: bool,
}

impl WalkContext {
    /// Canonicalize `root` and take walk settings from `opts`. A root that cannot be resolved
    /// is a walk error like any other traversal failure.
    pub fn new(root: &Path, opts: &PipeOpts) -> Result<Self, RunError> {
        let root = canonicalize_root(root).map_err(|e| RunError::Walk {
            msg: format!("{e:#}"),
            path: Some(root.to_path_buf()),
        })?;
        Ok(Self {
            root,
            exclude: opts.exclude.clone(),
            follow_links: opts.follow_links,
            parallel_walk: opts.parallel_walk,
        })
    }
}

/// One result from a directory walk: a path with its kind, or an error with optional path.
pub enum WalkOutcome {
    Ok { path: PathBuf, is_file: bool },
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a jwalk result into [`WalkOutcome`].
pub fn to_outcome_jwalk(r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok {
            is_file: entry.file_type().is_file(),
            path: entry.path(),
        },
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok {
            is_file: entry.file_type().is_file(),
            path: entry.into_path(),
        },
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn jwalk_iter(ctx: &WalkContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use jwalk::Parallelism;
    use std::time::Duration;
    Box::new(
        jwalk::WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .skip_hidden(false)
            .parallelism(Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_secs(60),
            })
            .into_iter()
            .map(to_outcome_jwalk),
    )
}

fn walkdir_iter(ctx: &WalkContext) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use walkdir::WalkDir;
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

/// Walk `ctx.root` (serial or parallel per `ctx.parallel_walk`) and dispatch every regular file.
pub fn walk_tree_items(
    ctx: &WalkContext,
    dispatcher: &Dispatcher<'_, FileItem>,
) -> Result<usize, RunError> {
    let iter = match ctx.parallel_walk {
        true => {
            debug!("Walking in parallel");
            jwalk_iter(ctx)
        }
        false => {
            debug!("Walking serially");
            walkdir_iter(ctx)
        }
    };
    run_walk_loop(ctx, iter, dispatcher)
}

/// Consume `iter`: skip directories and non-regular files, drop excluded paths, dispatch the rest.
/// The token is checked before each entry. The first traversal error ends the walk and is
/// returned as [`RunError::Walk`]. Returns the number of items dispatched.
pub fn run_walk_loop<I>(
    ctx: &WalkContext,
    iter: I,
    dispatcher: &Dispatcher<'_, FileItem>,
) -> Result<usize, RunError>
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        dispatcher.check_cancelled()?;
        match outcome {
            WalkOutcome::Ok { path, is_file } => {
                if !is_file {
                    continue;
                }
                let rel = item_key(&path, &ctx.root);
                if is_excluded(&rel, &ctx.exclude) {
                    continue;
                }
                dispatcher.dispatch(FileItem { abs: path, rel })?;
                count += 1;
            }
            WalkOutcome::Err { msg, path } => {
                return Err(RunError::Walk { msg, path });
            }
        }
    }
    debug!("walk: done, {} files dispatched", count);
    Ok(count)
}

/// Path relative to the root; a root that is itself a file is keyed by its file name.
fn item_key(path: &Path, root: &Path) -> PathBuf {
    match path_relative_to(path, root) {
        Some(rel) if !rel.as_os_str().is_empty() => rel,
        _ => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf()),
    }
}
