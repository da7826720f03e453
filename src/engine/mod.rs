//! Engine module: per-item computations, CLI parsing and command handling

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod matching;
pub mod tools;
pub mod validate;

// Re-export commonly used functions
pub use arg_parser::{Cli, Commands, CommonArgs};
pub use cli::handle_run;
pub use hashing::{hash_bytes, hash_file, to_hex};
pub use matching::{DEFAULT_TAG_PATTERN, TagMatcher};
pub use tools::{glob_match, is_excluded, path_relative_to, path_to_display_string, trim_line_ending};
pub use validate::is_valid_json;
