//! Classification of changed paths by extension and suffix.

use crate::config::SelectorConfig;
use std::path::{Component, Path, PathBuf};

/// Extensions worth looking at; anything else is ignored.
pub const RECOGNIZED_EXTENSIONS: [&str; 3] = ["js", "jsx", "snap"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A spec file; it is its own affected test.
    TestSpec,
    /// A snapshot artifact belonging to a spec.
    Snapshot,
    /// Ordinary source eligible for test lookup.
    Source,
    /// Directory or unrecognized extension.
    Ignored,
}

/// A changed path after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub path: PathBuf,
    pub extension: Option<String>,
    pub kind: PathKind,
}

#[derive(Debug, Clone)]
pub struct PathClassifier {
    spec_suffix: String,
    snapshot_suffix: String,
}

impl PathClassifier {
    pub fn new(spec_suffix: impl Into<String>, snapshot_suffix: impl Into<String>) -> Self {
        Self {
            spec_suffix: spec_suffix.into(),
            snapshot_suffix: snapshot_suffix.into(),
        }
    }

    pub fn from_config(config: &SelectorConfig) -> Self {
        Self::new(&config.spec_suffix, &config.snapshot_suffix)
    }

    /// Classify by name only; the filesystem is not consulted.
    pub fn kind_of(&self, path: &Path) -> PathKind {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return PathKind::Ignored;
        };
        if !RECOGNIZED_EXTENSIONS.contains(&extension) {
            return PathKind::Ignored;
        }

        let name = path.to_string_lossy();
        if name.ends_with(&self.spec_suffix) {
            PathKind::TestSpec
        } else if name.ends_with(&self.snapshot_suffix) {
            PathKind::Snapshot
        } else {
            PathKind::Source
        }
    }

    /// Classify a path, skipping directories.
    pub fn classify(&self, path: &Path) -> ChangedPath {
        let kind = if path.is_dir() {
            PathKind::Ignored
        } else {
            self.kind_of(path)
        };

        ChangedPath {
            path: path.to_path_buf(),
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_string()),
            kind,
        }
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default())
    }
}

/// Suite identifier of a spec or snapshot file: its base name up to the
/// first `.`.
pub fn suite_id_for_test_file(path: &Path) -> String {
    let name = base_name(path);
    match name.find('.') {
        Some(dot) => name[..dot].to_string(),
        None => name,
    }
}

/// Suite identifier of a located spec file: its base name without the spec
/// suffix.
pub fn suite_id_for_located(path: &Path, spec_suffix: &str) -> String {
    let name = base_name(path);
    match name.strip_suffix(spec_suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolve `path` against `root` and normalize `.` and `..` lexically.
///
/// The file may no longer exist (deleted in the change), so nothing here
/// touches the filesystem.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}
