//! Load `.tagpipe.toml` from a directory (CLI only). The lib takes everything through `PipeOpts`.

use serde::Deserialize;
use std::path::Path;

use crate::utils::config::PackagePaths;
use crate::{ErrorPolicy, Opts};

#[derive(Debug, Default, Deserialize)]
pub struct TagpipeToml {
    #[serde(default)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Settings {
    workers: Option<usize>,
    channel_cap: Option<usize>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    parallel_walk: Option<bool>,
    tolerant: Option<bool>,
    pattern: Option<String>,
    verbose: Option<bool>,
}

/// Load the config file from `dir` if present. Returns None if missing, unreadable, or invalid (logged).
pub fn load_tagpipe_toml(dir: &Path) -> Option<TagpipeToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_tagpipe_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_tagpipe_toml(s: &str) -> Result<TagpipeToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($set:expr, $opts:expr, $set_field:ident => $($opts_field:ident).+) => {
        if let Some(v) = $set.$set_field.clone() {
            $opts.$($opts_field).+ = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub fn apply_file_to_opts(file: &TagpipeToml, opts: &mut Opts) {
    let set = &file.settings;
    if let Some(n) = set.workers {
        opts.pipe.num_workers = Some(n);
    }
    if let Some(n) = set.channel_cap {
        opts.pipe.channel_cap = Some(n);
    }
    apply_file_opt!(set, opts, exclude => pipe.exclude);
    apply_file_opt!(set, opts, follow_links => pipe.follow_links);
    apply_file_opt!(set, opts, parallel_walk => pipe.parallel_walk);
    if let Some(true) = set.tolerant {
        opts.pipe.error_policy = ErrorPolicy::Tolerant;
    }
    if let Some(ref p) = set.pattern {
        opts.pattern = Some(p.clone());
    }
    apply_file_opt!(set, opts, verbose => verbose);
}
