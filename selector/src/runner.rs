//! Invocation of the external test runner.

use crate::config::SelectorConfig;
use crate::error::{SelectorError, SelectorResult};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

pub const JSON_FLAG: &str = "--json";
pub const COVERAGE_FLAG: &str = "--coverage";

/// A fully resolved runner command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl RunnerCommand {
    /// `<bin> --json <suite>... [--coverage]`, run from `root`.
    pub fn build(config: &SelectorConfig, root: &Path, suites: &[String]) -> Self {
        let mut args = vec![JSON_FLAG.to_string()];
        args.extend(suites.iter().cloned());
        if config.coverage_enabled() {
            args.push(COVERAGE_FLAG.to_string());
        }

        Self {
            program: config.runner_bin(root),
            args,
            working_dir: root.to_path_buf(),
        }
    }

    pub fn suites(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .map(String::as_str)
            .filter(|a| *a != JSON_FLAG && *a != COVERAGE_FLAG)
    }

    pub fn has_coverage(&self) -> bool {
        self.args.iter().any(|a| a == COVERAGE_FLAG)
    }
}

impl fmt::Display for RunnerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured outcome of one runner process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunnerOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn run(&self, command: &RunnerCommand) -> SelectorResult<RunnerOutput>;
}

/// Spawns the runner as a child process and waits for it.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl TestRunner for ProcessRunner {
    async fn run(&self, command: &RunnerCommand) -> SelectorResult<RunnerOutput> {
        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = process.output();

        let output = match self.timeout {
            Some(limit) => timeout(limit, output)
                .await
                .map_err(|_| SelectorError::RunnerTimeout {
                    command: command.to_string(),
                    timeout_secs: limit.as_secs(),
                })?,
            None => output.await,
        }
        .map_err(|e| SelectorError::RunnerSpawn {
            command: command.to_string(),
            reason: e.to_string(),
        })?;

        Ok(RunnerOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
