use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Concurrent digest and tag counting over directory trees.
#[derive(Clone, Debug, Parser)]
#[command(name = "tagpipe", version)]
#[command(about = "Digest files or count tags across a directory tree with a bounded worker pool.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Print a blake3 digest for every regular file under DIR.
    Digest {
        #[command(flatten)]
        common: CommonArgs,

        /// Print a JSON object (path → hex digest) instead of `digest  path` lines.
        #[arg(long)]
        json: bool,
    },
    /// Count tagged lines (or, with --tally, each tag) across every regular file under DIR.
    Tags {
        #[command(flatten)]
        common: CommonArgs,

        /// Tag pattern (regex). Default: a run of ASCII letters.
        #[arg(long)]
        pattern: Option<String>,

        /// Report per-tag counts, ascending, instead of a tagged-line total.
        #[arg(long)]
        tally: bool,
    },
    /// Count tagged lines of a single text file (or `-` for stdin).
    Lines {
        /// Text file to scan.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Tag pattern (regex). Default: a run of ASCII letters.
        #[arg(long)]
        pattern: Option<String>,

        /// Worker count. Default: 3.
        #[arg(long, short = 'w')]
        workers: Option<usize>,

        /// Verbose output.
        #[arg(long, short = 'v')]
        verbose: bool,
    },
    /// Exit non-zero unless FILE is a well-formed JSON document.
    Validate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Flags shared by the tree commands.
#[derive(Clone, Debug, Args)]
pub struct CommonArgs {
    /// Directory to walk. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Worker count. Default: available threads, capped by the FD limit.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links.
    #[arg(long, short = 'f')]
    pub follow_links: bool,

    /// Walk with jwalk (parallel) instead of walkdir.
    #[arg(long, short = 'p')]
    pub parallel_walk: bool,

    /// Skip files that fail to process instead of aborting on the first one.
    #[arg(long, short = 't')]
    pub tolerant: bool,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
