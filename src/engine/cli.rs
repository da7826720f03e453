//! CLI command handler: dispatch each subcommand to the library and print the result.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::engine::arg_parser::{Cli, Commands, CommonArgs};
use crate::engine::hashing::to_hex;
use crate::engine::matching::TagMatcher;
use crate::engine::tools::path_to_display_string;
use crate::engine::validate::is_valid_json;
use crate::pipeline::CancelToken;
use crate::utils::tagpipe_toml::{apply_file_to_opts, load_tagpipe_toml};
use crate::utils::{TimeTrack, setup_logging};
use crate::{ErrorPolicy, Opts, RunStats, digest, tags};

/// Build Opts: `.tagpipe.toml` in DIR first, then CLI flags on top.
fn setup_opts(common: &CommonArgs) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_tagpipe_toml(&common.dir) {
        apply_file_to_opts(&file, &mut opts);
    }
    if common.workers.is_some() {
        opts.pipe.num_workers = common.workers;
    }
    if !common.exclude.is_empty() {
        opts.pipe.exclude = common.exclude.clone();
    }
    opts.pipe.follow_links |= common.follow_links;
    opts.pipe.parallel_walk |= common.parallel_walk;
    if common.tolerant {
        opts.pipe.error_policy = ErrorPolicy::Tolerant;
    }
    opts.verbose |= common.verbose;
    setup_logging(opts.verbose);
    opts
}

/// Token closed on Ctrl+C, so an interrupted run unwinds instead of being killed mid-write.
fn interrupt_token() -> Result<CancelToken> {
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        handler_token.cancel();
    })
    .context("set Ctrl+C handler")?;
    Ok(token)
}

fn log_stats(stats: &RunStats) {
    debug!(
        "dispatched {}, delivered {}, merged {}, failed {}",
        stats.dispatched,
        stats.delivered,
        stats.merged,
        stats.failed.len()
    );
}

fn open_text(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Run the selected subcommand.
pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Digest { common, json } => {
            let mut opts = setup_opts(common);
            opts.json = *json;
            let cancel = interrupt_token()?;
            let _t = TimeTrack::new("digest");
            let run = digest::digest_tree(&common.dir, &opts.pipe, Some(&cancel))?;
            log_stats(&run.stats);
            let sorted: BTreeMap<String, String> = run
                .aggregate
                .iter()
                .map(|(path, d)| (path_to_display_string(path), to_hex(d)))
                .collect();
            if opts.json {
                println!("{}", serde_json::to_string_pretty(&sorted)?);
            } else {
                for (path, hex) in &sorted {
                    println!("{}  {}", hex, path);
                }
            }
        }
        Commands::Tags {
            common,
            pattern,
            tally,
        } => {
            let mut opts = setup_opts(common);
            if pattern.is_some() {
                opts.pattern = pattern.clone();
            }
            let matcher = TagMatcher::from_pattern(opts.pattern.as_deref())?;
            let cancel = interrupt_token()?;
            let _t = TimeTrack::new("tags");
            if *tally {
                let run =
                    tags::tally_tags_in_tree(&common.dir, &matcher, &opts.pipe, Some(&cancel))?;
                log_stats(&run.stats);
                for tc in run.aggregate.sorted() {
                    println!("{:>8}  {}", tc.count, tc.tag);
                }
            } else {
                let run =
                    tags::count_tags_in_tree(&common.dir, &matcher, &opts.pipe, Some(&cancel))?;
                log_stats(&run.stats);
                println!("{}", run.aggregate.0);
            }
        }
        Commands::Lines {
            file,
            pattern,
            workers,
            verbose,
        } => {
            setup_logging(*verbose);
            let matcher = TagMatcher::from_pattern(pattern.as_deref())?;
            let opts = crate::PipeOpts {
                num_workers: *workers,
                ..Default::default()
            };
            let reader = open_text(file)?;
            let cancel = interrupt_token()?;
            let _t = TimeTrack::new("lines");
            let run = tags::count_tags_in_text(reader, &matcher, &opts, Some(&cancel))?;
            log_stats(&run.stats);
            println!("{}", run.aggregate.0);
        }
        Commands::Validate { file } => {
            setup_logging(false);
            let text = std::fs::read_to_string(file)
                .with_context(|| format!("read {}", file.display()))?;
            if !is_valid_json(&text) {
                bail!("{} is not valid JSON", file.display());
            }
            info!("{} is valid JSON", file.display());
        }
    }
    Ok(())
}
