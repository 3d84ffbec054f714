//! Include-pattern prefilter.
//!
//! The configured pattern selects directories under the project root; only
//! sources up to [`INCLUDE_DEPTH`] levels below those directories are
//! considered for test lookup.

use glob::{glob_with, MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const INCLUDE_DEPTH: usize = 3;
pub const INCLUDE_EXTENSIONS: [&str; 2] = ["js", "jsx"];

#[derive(Debug, Clone, Default)]
pub struct IncludeFilter {
    files: HashSet<PathBuf>,
}

impl IncludeFilter {
    /// Resolve `pattern` against `root` and enumerate the eligible files.
    pub fn resolve(pattern: &str, root: &Path) -> Self {
        let mut files = HashSet::new();

        for dir in matching_dirs(pattern, root) {
            for depth in 1..=INCLUDE_DEPTH {
                for extension in INCLUDE_EXTENSIONS {
                    let mut file_pattern = Pattern::escape(&dir.to_string_lossy());
                    for _ in 1..depth {
                        file_pattern.push_str("/*");
                    }
                    file_pattern.push_str("/*.");
                    file_pattern.push_str(extension);
                    files.extend(glob_files(&file_pattern));
                }
            }
        }

        debug!("Include pattern {} resolved to {} files", pattern, files.len());
        Self { files }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Directories under `root` matching any expansion of `pattern`.
pub fn matching_dirs(pattern: &str, root: &Path) -> Vec<PathBuf> {
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut dirs = Vec::new();

    for expanded in expand_braces(pattern) {
        let relative = expanded.trim_start_matches('/');
        let full = if relative.is_empty() {
            escaped_root.clone()
        } else {
            format!("{}/{}", escaped_root, relative)
        };
        for path in glob_paths(&full) {
            if path.is_dir() && !dirs.contains(&path) {
                dirs.push(path);
            }
        }
    }

    dirs
}

fn glob_paths(pattern: &str) -> Vec<PathBuf> {
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    match glob_with(pattern, options) {
        Ok(paths) => paths.filter_map(Result::ok).collect(),
        Err(e) => {
            warn!("Invalid glob pattern {}: {}", pattern, e);
            Vec::new()
        }
    }
}

fn glob_files(pattern: &str) -> Vec<PathBuf> {
    glob_paths(pattern)
        .into_iter()
        .filter(|p| p.is_file())
        .collect()
}

/// Expand `{a,b}` alternatives, including nested groups.
///
/// Unbalanced braces are kept literally.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some((open, close)) = first_group(pattern) else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut expanded = Vec::new();

    for alternative in split_alternatives(&pattern[open + 1..close]) {
        let candidate = format!("{}{}{}", prefix, alternative, suffix);
        expanded.extend(expand_braces(&candidate));
    }

    expanded
}

fn first_group(pattern: &str) -> Option<(usize, usize)> {
    let open = pattern.find('{')?;
    let mut depth = 0;
    for (offset, c) in pattern[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((open, open + offset));
                }
            }
            _ => {}
        }
    }
    None
}

fn split_alternatives(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}
