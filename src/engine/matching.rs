//! Tag matching: which lines carry a tag, and which tags they carry.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::tools::trim_line_ending;

/// Default tag: a run of ASCII letters.
pub const DEFAULT_TAG_PATTERN: &str = "[A-Za-z]+";

/// Compiled tag pattern. Stateless after construction, so one instance is shared by all workers.
#[derive(Clone, Debug)]
pub struct TagMatcher {
    re: Regex,
}

impl TagMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).with_context(|| format!("invalid tag pattern {pattern:?}"))?;
        Ok(Self { re })
    }

    /// Build from an optional pattern, falling back to [`DEFAULT_TAG_PATTERN`].
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self> {
        Self::new(pattern.unwrap_or(DEFAULT_TAG_PATTERN))
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }

    pub fn is_match(&self, line: &str) -> bool {
        self.re.is_match(line)
    }

    /// 1 when the line carries at least one tag, else 0.
    pub fn line_hit(&self, line: &str) -> u64 {
        u64::from(self.is_match(line))
    }

    /// Count lines of `path` that carry a tag. Non-UTF-8 bytes are replaced, not rejected, so
    /// only I/O fails.
    pub fn count_lines_in_file(&self, path: &Path) -> Result<u64> {
        let file =
            std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        let mut hits = 0;
        for line in BufReader::new(file).split(b'\n') {
            let line = line.with_context(|| format!("read {}", path.display()))?;
            hits += self.line_hit(&String::from_utf8_lossy(trim_line_ending(&line)));
        }
        Ok(hits)
    }

    /// Every tag occurrence in `text`, counted per tag.
    pub fn tally(&self, text: &str) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for m in self.re.find_iter(text) {
            *counts.entry(m.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// [`Self::tally`] over a whole file. Non-UTF-8 bytes are replaced, not rejected.
    pub fn tally_file(&self, path: &Path) -> Result<HashMap<String, usize>> {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        Ok(self.tally(&String::from_utf8_lossy(&bytes)))
    }
}
