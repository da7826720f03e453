//! Line scanner: the producer for text mode.
//!
//! The reader is scanned once, front to back. Each line is dispatched as a [`Line`]; the queue is
//! closed when the caller drops the dispatcher after this returns.

use std::io::BufRead;

use log::debug;

use super::context::Dispatcher;
use super::error_handler::RunError;
use crate::Line;
use crate::engine::tools::trim_line_ending;

/// Read `reader` to the end and dispatch each line. Line terminators (`\n`, `\r\n`) are stripped
/// and invalid UTF-8 is replaced; only a failed read ends the scan early.
/// Returns the number of lines dispatched.
pub fn scan_lines<R: BufRead>(
    mut reader: R,
    dispatcher: &Dispatcher<'_, Line>,
) -> Result<usize, RunError> {
    let mut count = 0_usize;
    let mut buf = Vec::new();
    loop {
        dispatcher.check_cancelled()?;
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        count += 1;
        dispatcher.dispatch(Line {
            number: count,
            text: String::from_utf8_lossy(trim_line_ending(&buf)).into_owned(),
        })?;
    }
    debug!("lines: done, {} lines dispatched", count);
    Ok(count)
}
