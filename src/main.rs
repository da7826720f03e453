//! Tagpipe CLI: digest files or count tags across a directory tree.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use tagpipe::engine::arg_parser::Cli;
use tagpipe::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    // Optional .env with RUST_LOG and friends; absence is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
