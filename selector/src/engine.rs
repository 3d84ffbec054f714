//! The run-scoped selection and execution pipeline.
//!
//! A [`SelectionContext`] owns everything one run needs: the project root,
//! the configuration and the affected test set being accumulated. Nothing is
//! shared between runs.

use crate::affected::AffectedTestSet;
use crate::classify::{
    resolve_path, suite_id_for_located, suite_id_for_test_file, PathClassifier, PathKind,
};
use crate::config::SelectorConfig;
use crate::error::{SelectorError, SelectorResult};
use crate::include::IncludeFilter;
use crate::locator::TestLocator;
use crate::runner::{RunnerCommand, TestRunner};
use report::{attach_coverage, normalize_results, parse_report, CoverageMapper, TestResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct SelectionContext {
    root: PathBuf,
    config: SelectorConfig,
    classifier: PathClassifier,
    locator: TestLocator,
    affected: AffectedTestSet,
}

impl SelectionContext {
    pub fn new(root: impl Into<PathBuf>, config: SelectorConfig) -> SelectorResult<Self> {
        config
            .validate()
            .map_err(|message| SelectorError::Config { message })?;

        let root = root.into();
        let root = root.canonicalize().map_err(|e| SelectorError::Config {
            message: format!("project root {}: {}", root.display(), e),
        })?;

        let classifier = PathClassifier::from_config(&config);
        let locator = TestLocator::new(
            root.clone(),
            config.search_dir_names(),
            config.spec_suffix.clone(),
        );

        Ok(Self {
            root,
            config,
            classifier,
            locator,
            affected: AffectedTestSet::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn affected(&self) -> &AffectedTestSet {
        &self.affected
    }

    /// Map every changed path to the suite it affects.
    ///
    /// Each call starts from an empty affected set. Fails with
    /// [`SelectorError::NoEffect`] when nothing was recorded.
    pub fn select<P: AsRef<Path>>(&mut self, paths: &[P]) -> SelectorResult<&AffectedTestSet> {
        self.affected = AffectedTestSet::new();
        let include = self
            .config
            .include
            .as_deref()
            .map(|pattern| IncludeFilter::resolve(pattern, &self.root));

        for path in paths {
            let path = resolve_path(path.as_ref(), &self.root);
            let changed = self.classifier.classify(&path);

            match changed.kind {
                PathKind::Ignored => {
                    debug!("Ignoring {}", path.display());
                }
                PathKind::TestSpec | PathKind::Snapshot => {
                    let suite = suite_id_for_test_file(&path);
                    debug!("{} is a test file for suite {}", path.display(), suite);
                    self.affected.record(path, suite);
                }
                PathKind::Source => {
                    // Include scoping applies to sources only, never to test files.
                    if let Some(filter) = &include {
                        if !filter.contains(&path) {
                            debug!("{} is outside the include pattern", path.display());
                            continue;
                        }
                    }

                    let extension = changed.extension.as_deref().unwrap_or_default();
                    let Some(test) = self.locator.locate(&path, extension) else {
                        debug!("No test found for {}", path.display());
                        continue;
                    };
                    if !test.exists() {
                        continue;
                    }

                    let suite = suite_id_for_located(&test, &self.config.spec_suffix);
                    debug!("{} -> {} ({})", path.display(), suite, test.display());
                    self.affected.record(path, suite);
                }
            }
        }

        if self.affected.is_empty() {
            return Err(SelectorError::no_effect());
        }

        Ok(&self.affected)
    }

    /// Runner command for the current affected set.
    pub fn command(&self) -> RunnerCommand {
        RunnerCommand::build(&self.config, &self.root, &self.affected.suite_ids())
    }

    /// Select, run the runner once and normalize its report.
    pub async fn run<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
        runner: &dyn TestRunner,
    ) -> SelectorResult<Vec<TestResult>> {
        if self.config.run_all {
            info!("Running all tests");
            self.affected = AffectedTestSet::new();
        } else {
            self.select(paths)?;
        }

        let command = self.command();
        info!("Running {}", command);
        let output = runner.run(&command).await?;
        if !output.success() {
            warn!("Runner exited with {:?}", output.exit_code);
        }

        let report = parse_report(&output.stdout).map_err(|e| {
            SelectorError::from_report(e, &command.to_string(), &output.stdout, &output.stderr)
        })?;

        let mut results = normalize_results(&report);
        if self.config.coverage_enabled() {
            let coverage = CoverageMapper::new(&self.root).map(&report);
            attach_coverage(&mut results, &coverage);
        }

        info!(
            "{} suites, {} failed",
            results.len(),
            results.iter().filter(|r| !r.is_pass()).count()
        );
        Ok(results)
    }
}
