pub mod coverage;
pub mod parser;
pub mod result;
pub mod types;

pub use coverage::{covered_lines, line_markers, CoverageMap, CoverageMapper, COVERED, UNCOVERED};
pub use parser::{
    decode_report, locate_report_start, parse_report, ReportError, ReportResult,
    REPORT_START_MARKER,
};
pub use result::{attach_coverage, normalize_results, TestResult, TestStatus};
pub use types::{
    AssertionRecord, FileCoverage, Position, RawReport, StatementRange, SuiteRecord, PASSED,
};

pub mod prelude {
    pub use crate::coverage::*;
    pub use crate::parser::*;
    pub use crate::result::*;
    pub use crate::types::*;
}
