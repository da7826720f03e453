//! Path and filter utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Strip a trailing `\n` or `\r\n` from a raw line.
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Render a relative path with forward slashes, for stable output across platforms.
pub fn path_to_display_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// True if `rel` (a path relative to the walk root) is excluded: any component, or the whole
/// path, matches one of `exclude_patterns`.
pub fn is_excluded(rel: &Path, exclude_patterns: &[String]) -> bool {
    if exclude_patterns.is_empty() {
        return false;
    }
    let rel_str = path_to_display_string(rel);
    exclude_patterns.iter().any(|pattern| {
        glob_match(pattern, &rel_str)
            || rel
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .any(|name| glob_match(pattern, name))
    })
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    // Backtracking matcher: remember the last '*' and where the text was when we hit it.
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Canonicalize the walk root so relative keys are computed against a stable absolute path.
pub fn canonicalize_root(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("canonicalize root {}", path.display()))
}
