//! Wire types for the runner's `--json` report.
//!
//! Only the fields the normalizer and coverage mapper consume are modelled;
//! everything else in the payload is ignored on decode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status token the runner uses for a passing suite or assertion.
pub const PASSED: &str = "passed";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    #[serde(default)]
    pub num_total_tests: u64,
    #[serde(default)]
    pub num_total_test_suites: u64,
    #[serde(default)]
    pub test_results: Vec<SuiteRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_map: Option<BTreeMap<String, FileCoverage>>,
}

impl RawReport {
    /// True when the runner executed nothing at all.
    pub fn is_empty(&self) -> bool {
        self.num_total_tests == 0 && self.num_total_test_suites == 0
    }
}

/// One executed test file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteRecord {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub assertion_results: Vec<AssertionRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionRecord {
    pub full_name: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCoverage {
    #[serde(default)]
    pub statement_map: BTreeMap<String, StatementRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRange {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}
