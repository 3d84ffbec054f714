use report::ReportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectorError {
    /// Nothing to run or nothing was run. Callers treat this as a no-op.
    #[error("{reason}")]
    NoEffect { reason: String },

    /// The runner produced no decodable report.
    #[error("JSON command '{command}' did not produce a valid JSON object on stdout ({reason}): {stdout}")]
    MalformedReport {
        command: String,
        stdout: String,
        stderr: String,
        reason: String,
    },

    /// The runner process could not be started.
    #[error("Failed to start runner '{command}': {reason}")]
    RunnerSpawn { command: String, reason: String },

    /// The runner was killed after the configured timeout.
    #[error("Runner '{command}' timed out after {timeout_secs}s")]
    RunnerTimeout { command: String, timeout_secs: u64 },

    /// Invalid config file, override or project root.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// JSON output could not be produced.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Change discovery from git failed.
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Filesystem or process I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SelectorError {
    pub fn no_effect() -> Self {
        SelectorError::NoEffect {
            reason: "No tests to run.".to_string(),
        }
    }

    pub fn is_no_effect(&self) -> bool {
        matches!(self, SelectorError::NoEffect { .. })
    }

    /// Map a report failure, keeping the full runner context for diagnosis.
    pub fn from_report(error: ReportError, command: &str, stdout: &str, stderr: &str) -> Self {
        match error {
            ReportError::NoEffect => SelectorError::no_effect(),
            other => SelectorError::MalformedReport {
                command: command.to_string(),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

pub type SelectorResult<T> = Result<T, SelectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_effect_display() {
        let error = SelectorError::no_effect();
        assert!(error.is_no_effect());
        assert_eq!(error.to_string(), "No tests to run.");
    }

    #[test]
    fn test_from_report_keeps_context() {
        let error = SelectorError::from_report(
            ReportError::MissingReport,
            "jest --json Foo",
            "PASS Foo",
            "warning: something",
        );

        match error {
            SelectorError::MalformedReport {
                command,
                stdout,
                stderr,
                ..
            } => {
                assert_eq!(command, "jest --json Foo");
                assert_eq!(stdout, "PASS Foo");
                assert_eq!(stderr, "warning: something");
            }
            other => panic!("unexpected error: {other}"),
        }

        let error = SelectorError::from_report(ReportError::NoEffect, "jest", "", "");
        assert!(error.is_no_effect());
    }
}
