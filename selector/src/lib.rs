pub mod affected;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod git;
pub mod include;
pub mod locator;
pub mod runner;

pub use affected::{AffectedTestEntry, AffectedTestSet};
pub use classify::{
    resolve_path, suite_id_for_located, suite_id_for_test_file, ChangedPath, PathClassifier,
    PathKind,
};
pub use config::SelectorConfig;
pub use engine::SelectionContext;
pub use error::{SelectorError, SelectorResult};
pub use include::{expand_braces, IncludeFilter};
pub use locator::TestLocator;
pub use runner::{ProcessRunner, RunnerCommand, RunnerOutput, TestRunner};
