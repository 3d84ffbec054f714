use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// A changed path and the suite it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedTestEntry {
    pub path: PathBuf,
    pub suite: String,
}

/// Triggering path to suite identifier, one entry per path.
#[derive(Debug, Clone, Default)]
pub struct AffectedTestSet {
    entries: Vec<AffectedTestEntry>,
    index: HashMap<PathBuf, usize>,
}

impl AffectedTestSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path -> suite`. Recording the same path again replaces its
    /// suite.
    pub fn record(&mut self, path: impl Into<PathBuf>, suite: impl Into<String>) {
        let path = path.into();
        let suite = suite.into();
        match self.index.get(&path) {
            Some(&i) => self.entries[i].suite = suite,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push(AffectedTestEntry { path, suite });
            }
        }
    }

    pub fn suite_for(&self, path: &Path) -> Option<&str> {
        self.index.get(path).map(|&i| self.entries[i].suite.as_str())
    }

    pub fn entries(&self) -> &[AffectedTestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct suite identifiers in first-seen order.
    pub fn suite_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.suite.as_str()))
            .map(|e| e.suite.clone())
            .collect()
    }
}
