//! Statement ranges to per-line coverage markers.
//!
//! Each covered file maps to a string with one character per source line:
//! [`COVERED`] for lines inside a statement range, [`UNCOVERED`] otherwise.
//! Ranges are `[start.line, end.line)` with 1-based line numbers.

use crate::types::{FileCoverage, RawReport};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const COVERED: char = 'C';
pub const UNCOVERED: char = 'U';

/// File path (as keyed in the report) to its line marker string.
pub type CoverageMap = BTreeMap<String, String>;

pub struct CoverageMapper {
    root: PathBuf,
}

impl CoverageMapper {
    /// Relative coverage keys are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build markers for every file in the report's coverage map.
    ///
    /// Files that cannot be read are skipped with a warning; the rest of the
    /// map is still produced.
    pub fn map(&self, report: &RawReport) -> CoverageMap {
        let mut reports = CoverageMap::new();
        let Some(coverage_map) = &report.coverage_map else {
            return reports;
        };

        for (file, coverage) in coverage_map {
            match self.line_count(file) {
                Ok(line_count) => {
                    reports.insert(file.clone(), line_markers(line_count, coverage));
                }
                Err(e) => warn!("Skipping coverage for {}: {}", file, e),
            }
        }

        reports
    }

    fn line_count(&self, file: &str) -> std::io::Result<usize> {
        let path = Path::new(file);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).lines().count())
    }
}

/// Marker string for a file of `line_count` lines.
///
/// Range lines beyond the end of the file are ignored.
pub fn line_markers(line_count: usize, coverage: &FileCoverage) -> String {
    let mut markers = vec![UNCOVERED; line_count];

    for range in coverage.statement_map.values() {
        let start = range.start.line.max(1);
        let end = range.end.line.min(line_count + 1);
        for line in start..end {
            markers[line - 1] = COVERED;
        }
    }

    markers.into_iter().collect()
}

/// Number of lines marked covered.
pub fn covered_lines(markers: &str) -> usize {
    markers.chars().filter(|c| *c == COVERED).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Position, StatementRange};
    use std::io::Write;

    fn range(start: usize, end: usize) -> StatementRange {
        StatementRange {
            start: Position {
                line: start,
                column: None,
            },
            end: Position {
                line: end,
                column: None,
            },
        }
    }

    fn coverage(ranges: &[(usize, usize)]) -> FileCoverage {
        FileCoverage {
            statement_map: ranges
                .iter()
                .enumerate()
                .map(|(i, (s, e))| (i.to_string(), range(*s, *e)))
                .collect(),
        }
    }

    #[test]
    fn test_end_line_is_exclusive() {
        assert_eq!(line_markers(6, &coverage(&[(2, 4)])), "UCCUUU");
    }

    #[test]
    fn test_overlapping_ranges() {
        assert_eq!(line_markers(5, &coverage(&[(1, 3), (2, 5)])), "CCCCU");
    }

    #[test]
    fn test_single_line_statement_covers_nothing() {
        assert_eq!(line_markers(3, &coverage(&[(2, 2)])), "UUU");
    }

    #[test]
    fn test_range_past_end_of_file() {
        assert_eq!(line_markers(3, &coverage(&[(2, 10)])), "UCC");
        assert_eq!(line_markers(0, &coverage(&[(1, 2)])), "");
    }

    #[test]
    fn test_map_reads_line_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("Foo.js")).unwrap();
        write!(file, "import x from 'x';\n\nexport function foo() {{\n  return x;\n}}\n").unwrap();

        let absolute = dir.path().join("Foo.js").display().to_string();
        let mut coverage_map = BTreeMap::new();
        coverage_map.insert(absolute.clone(), coverage(&[(3, 5)]));
        coverage_map.insert("Foo.js".to_string(), coverage(&[(1, 2)]));
        coverage_map.insert("Missing.js".to_string(), coverage(&[(1, 2)]));

        let report = RawReport {
            coverage_map: Some(coverage_map),
            ..Default::default()
        };

        let map = CoverageMapper::new(dir.path()).map(&report);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&absolute], "UUCCU");
        assert_eq!(map["Foo.js"], "CUUUU");
        assert!(!map.contains_key("Missing.js"));
        assert_eq!(covered_lines(&map[&absolute]), 2);
    }

    #[test]
    fn test_map_without_coverage() {
        let report = RawReport::default();
        assert!(CoverageMapper::new("/").map(&report).is_empty());
    }
}
