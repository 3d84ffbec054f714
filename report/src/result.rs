use crate::coverage::CoverageMap;
use crate::types::{AssertionRecord, RawReport, SuiteRecord, PASSED};
use serde::{Deserialize, Serialize};

/// Detail line prefix for a passing assertion.
pub const PASS_MARKER: &str = " [+] ";
/// Detail line prefix for any other assertion status.
pub const FAIL_MARKER: &str = " [!] ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Pass,
    Fail,
}

impl TestStatus {
    pub fn from_runner(status: &str) -> Self {
        if status == PASSED {
            TestStatus::Pass
        } else {
            TestStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
        }
    }
}

/// Normalized outcome of one executed suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_seconds: f64,
    pub detail_lines: Vec<String>,
    pub failure_message: String,
    /// Run-wide line coverage, identical on every result of a run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageMap>,
}

impl TestResult {
    pub fn from_suite(suite: &SuiteRecord) -> Self {
        Self {
            name: suite.name.clone(),
            status: TestStatus::from_runner(&suite.status),
            duration_seconds: (suite.end_time - suite.start_time) as f64 / 1000.0,
            detail_lines: suite.assertion_results.iter().map(detail_line).collect(),
            failure_message: suite.message.clone(),
            coverage: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Pass
    }
}

fn detail_line(assertion: &AssertionRecord) -> String {
    let marker = if assertion.status == PASSED {
        PASS_MARKER
    } else {
        FAIL_MARKER
    };
    format!("{}{}", marker, assertion.full_name)
}

/// One result per suite record, in report order.
pub fn normalize_results(report: &RawReport) -> Vec<TestResult> {
    report.test_results.iter().map(TestResult::from_suite).collect()
}

/// Attach the same coverage map to every result.
pub fn attach_coverage(results: &mut [TestResult], coverage: &CoverageMap) {
    for result in results {
        result.coverage = Some(coverage.clone());
    }
}
