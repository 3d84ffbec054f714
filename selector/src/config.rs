use crate::error::{SelectorError, SelectorResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the project root when none is given explicitly.
pub const DEFAULT_CONFIG_FILE: &str = ".selector.toml";
/// Section of the config file holding the engine settings.
pub const CONFIG_SECTION: &str = "jest";
pub const DEFAULT_TEST_DIRS: [&str; 2] = ["tests", "Tests"];
pub const DEFAULT_SPEC_SUFFIX: &str = ".spec.js";
pub const DEFAULT_SNAPSHOT_SUFFIX: &str = ".js.snap";
pub const DEFAULT_RUNNER_BIN: &str = "node_modules/.bin/jest";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    /// Brace/glob pattern, relative to the project root, of directories whose
    /// sources are eligible for test lookup.
    pub include: Option<String>,
    /// Directory names searched for spec files.
    #[serde(rename = "test.dirs", alias = "test_dirs")]
    pub test_dirs: Vec<String>,
    /// `None` means "use the default", which is enabled.
    pub coverage: Option<bool>,
    /// Runner binary; relative paths resolve against the project root.
    pub bin: Option<PathBuf>,
    pub spec_suffix: String,
    pub snapshot_suffix: String,
    pub timeout_secs: Option<u64>,
    /// Skip selection and let the runner execute everything.
    pub run_all: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            include: None,
            test_dirs: DEFAULT_TEST_DIRS.iter().map(|d| d.to_string()).collect(),
            coverage: None,
            bin: None,
            spec_suffix: DEFAULT_SPEC_SUFFIX.to_string(),
            snapshot_suffix: DEFAULT_SNAPSHOT_SUFFIX.to_string(),
            timeout_secs: None,
            run_all: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    jest: Option<SelectorConfig>,
}

impl SelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    pub fn with_test_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_coverage(mut self, coverage: bool) -> Self {
        self.coverage = Some(coverage);
        self
    }

    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = Some(bin.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn with_run_all(mut self, run_all: bool) -> Self {
        self.run_all = run_all;
        self
    }

    /// Only an explicit `false` turns coverage off.
    pub fn coverage_enabled(&self) -> bool {
        self.coverage != Some(false)
    }

    /// Configured test directory names, or the defaults when none are set.
    pub fn search_dir_names(&self) -> Vec<String> {
        if self.test_dirs.is_empty() {
            DEFAULT_TEST_DIRS.iter().map(|d| d.to_string()).collect()
        } else {
            self.test_dirs.clone()
        }
    }

    pub fn runner_bin(&self, root: &Path) -> PathBuf {
        match &self.bin {
            Some(bin) if bin.is_absolute() => bin.clone(),
            Some(bin) => root.join(bin),
            None => root.join(DEFAULT_RUNNER_BIN),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(include) = &self.include {
            if include.trim().is_empty() {
                return Err("Include pattern cannot be empty".to_string());
            }
            if include.matches('{').count() != include.matches('}').count() {
                return Err(format!("Unbalanced braces in include pattern: {}", include));
            }
        }

        if self.test_dirs.iter().any(|d| d.trim().is_empty()) {
            return Err("Test directory names cannot be empty".to_string());
        }

        if self.spec_suffix.is_empty() || self.snapshot_suffix.is_empty() {
            return Err("Spec and snapshot suffixes cannot be empty".to_string());
        }

        if self.timeout_secs == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Parse the `[jest]` section of a TOML document.
    pub fn from_toml_str(source: &str) -> SelectorResult<Self> {
        let file: ConfigFile = toml::from_str(source).map_err(|e| SelectorError::Config {
            message: e.to_string(),
        })?;
        Ok(file.jest.unwrap_or_default())
    }

    /// Load configuration for a project.
    ///
    /// An explicit path must exist. Without one, `<root>/.selector.toml` is
    /// used when present and the defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> SelectorResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = root.join(DEFAULT_CONFIG_FILE);
                if !path.is_file() {
                    tracing::debug!("No {} in {}, using defaults", DEFAULT_CONFIG_FILE, root.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        let source = fs::read_to_string(&path).map_err(|e| SelectorError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&source)?;
        config
            .validate()
            .map_err(|message| SelectorError::Config { message })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
