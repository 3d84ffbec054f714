//! Extraction of the JSON report from runner stdout.
//!
//! With coverage enabled the runner prints a text coverage table ahead of the
//! report, so decoding is split in two steps: [`locate_report_start`] finds
//! where the report object begins and [`decode_report`] decodes from there to
//! the end of the stream.

use crate::types::RawReport;
use thiserror::Error;

/// Token every report object starts with: an opening brace followed by its
/// first quoted key. Banner text never contains this sequence.
pub const REPORT_START_MARKER: &str = "{\"";

#[derive(Error, Debug)]
pub enum ReportError {
    /// No report start marker anywhere in stdout.
    #[error("Runner output does not contain a JSON report")]
    MissingReport,

    /// The report was found but is not valid JSON for the expected shape.
    #[error("Runner output contains an invalid JSON report: {0}")]
    Decode(#[from] serde_json::Error),

    /// The report counts zero tests and zero suites.
    #[error("No tests to run.")]
    NoEffect,
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Byte offset of the report object within `stdout`, if there is one.
pub fn locate_report_start(stdout: &str) -> Option<usize> {
    stdout.find(REPORT_START_MARKER)
}

/// Decode a report that starts at the beginning of `payload`.
pub fn decode_report(payload: &str) -> ReportResult<RawReport> {
    Ok(serde_json::from_str(payload)?)
}

/// Locate, decode and sanity check the report in `stdout`.
///
/// A report with zero tests and zero suites is reported as
/// [`ReportError::NoEffect`] so callers can tell "ran nothing" apart from
/// "everything passed".
pub fn parse_report(stdout: &str) -> ReportResult<RawReport> {
    let start = locate_report_start(stdout).ok_or(ReportError::MissingReport)?;
    if start > 0 {
        tracing::debug!("Skipping {} bytes of output before the report", start);
    }

    let report = decode_report(&stdout[start..])?;
    if report.is_empty() {
        return Err(ReportError::NoEffect);
    }

    Ok(report)
}
