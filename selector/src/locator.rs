//! Naming-convention lookup of the spec file for a source file.
//!
//! Search locations are the configured test directory names at the project
//! root, first as-is and then [`MAX_SUBDIR_DEPTH`] levels of subdirectories
//! deep:
//!
//! ```text
//! tests, Tests, tests/*, tests/*/*, ..., Tests/*, Tests/*/*, ...
//! ```
//!
//! Within each location two names are tried in order: `*<file name>` and
//! `*<file stem>.spec.js`. The first match inside the root that is not the
//! source file itself wins. Glob results are sorted, so ties resolve
//! alphabetically within a single location and pattern.

use glob::{glob_with, MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MAX_SUBDIR_DEPTH: usize = 4;

#[derive(Debug, Clone)]
pub struct TestLocator {
    root: PathBuf,
    canonical_root: PathBuf,
    test_dirs: Vec<String>,
    spec_suffix: String,
}

impl TestLocator {
    pub fn new(
        root: impl Into<PathBuf>,
        test_dirs: Vec<String>,
        spec_suffix: impl Into<String>,
    ) -> Self {
        let root = root.into();
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.clone());
        Self {
            root,
            canonical_root,
            test_dirs,
            spec_suffix: spec_suffix.into(),
        }
    }

    /// Search locations relative to the root, in lookup order.
    pub fn search_locations(&self) -> Vec<String> {
        let mut locations = self.test_dirs.clone();
        for dir in &self.test_dirs {
            let mut nested = dir.trim_end_matches('/').to_string();
            for _ in 0..MAX_SUBDIR_DEPTH {
                nested.push_str("/*");
                locations.push(nested.clone());
            }
        }
        locations
    }

    /// Candidate file name patterns for `path`, in lookup order.
    pub fn candidate_names(&self, path: &Path, extension: &str) -> Vec<String> {
        let Some(file) = path.file_name().map(|f| f.to_string_lossy().into_owned()) else {
            return Vec::new();
        };

        let mut candidates = vec![format!("*{}", Pattern::escape(&file))];
        let stem = file
            .strip_suffix(extension)
            .map(|s| s.trim_end_matches('.'))
            .unwrap_or(&file);
        let spec_name = format!("{}{}", stem, self.spec_suffix);
        if spec_name != file {
            candidates.push(format!("*{}", Pattern::escape(&spec_name)));
        }
        candidates
    }

    /// Find the spec file for `path`, if any.
    pub fn locate(&self, path: &Path, extension: &str) -> Option<PathBuf> {
        let original = path.to_string_lossy().to_lowercase();
        let escaped_root = Pattern::escape(&self.root.to_string_lossy());
        let candidates = self.candidate_names(path, extension);
        let options = MatchOptions {
            require_literal_leading_dot: true,
            ..MatchOptions::new()
        };

        for location in self.search_locations() {
            for candidate in &candidates {
                let pattern = format!("{}/{}/{}", escaped_root, location, candidate);
                let Ok(matches) = glob_with(&pattern, options) else {
                    debug!("Skipping invalid search pattern {}", pattern);
                    continue;
                };

                for found in matches.filter_map(Result::ok) {
                    let Ok(canonical) = found.canonicalize() else {
                        debug!("Located {} no longer exists", found.display());
                        continue;
                    };
                    if !canonical.starts_with(&self.canonical_root) {
                        debug!("Rejecting {} outside the project root", found.display());
                        continue;
                    }
                    if found.to_string_lossy().to_lowercase() == original
                        || canonical.to_string_lossy().to_lowercase() == original
                    {
                        continue;
                    }
                    if !canonical.is_file() {
                        continue;
                    }

                    debug!("Located {} for {}", found.display(), path.display());
                    return Some(found);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();
        path
    }

    fn locator(root: &Path) -> TestLocator {
        TestLocator::new(
            root,
            vec!["tests".to_string(), "Tests".to_string()],
            ".spec.js",
        )
    }

    #[test]
    fn test_search_location_order() {
        let locations = locator(Path::new("/repo")).search_locations();
        assert_eq!(
            locations,
            vec![
                "tests",
                "Tests",
                "tests/*",
                "tests/*/*",
                "tests/*/*/*",
                "tests/*/*/*/*",
                "Tests/*",
                "Tests/*/*",
                "Tests/*/*/*",
                "Tests/*/*/*/*",
            ]
        );
    }

    #[test]
    fn test_candidate_names() {
        let locator = locator(Path::new("/repo"));
        assert_eq!(
            locator.candidate_names(Path::new("/repo/src/Foo.jsx"), "jsx"),
            vec!["*Foo.jsx", "*Foo.spec.js"]
        );
        assert_eq!(
            locator.candidate_names(Path::new("/repo/src/[id].js"), "js"),
            vec!["*[[]id[]].js", "*[[]id[]].spec.js"]
        );
    }

    #[test]
    fn test_locates_spec_in_tests_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/components/Button.js");
        let spec = touch(root, "tests/components/Button.spec.js");

        let found = locator(root).locate(&source, "js").unwrap();
        assert_eq!(found, spec);
    }

    #[test]
    fn test_shallow_location_wins() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/Button.js");
        touch(root, "Tests/deep/nested/Button.spec.js");
        let shallow = touch(root, "tests/Button.spec.js");

        assert_eq!(locator(root).locate(&source, "js").unwrap(), shallow);
    }

    #[test]
    fn test_name_match_before_spec_suffix_match() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/Button.js");
        let mirror = touch(root, "tests/Button.js");
        touch(root, "tests/Button.spec.js");

        assert_eq!(locator(root).locate(&source, "js").unwrap(), mirror);
    }

    #[test]
    fn test_never_returns_the_source_itself() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "tests/helpers/render.js");

        assert_eq!(locator(root).locate(&source, "js"), None);

        let differently_cased = root.join("TESTS/helpers/render.js");
        assert_eq!(locator(root).locate(&differently_cased, "js"), None);
    }

    #[test]
    fn test_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/Button.js");
        touch(root, "tests/a/b/c/d/e/Button.spec.js");

        assert_eq!(locator(root).locate(&source, "js"), None);

        let reachable = touch(root, "tests/a/b/c/d/Button.spec.js");
        assert_eq!(locator(root).locate(&source, "js").unwrap(), reachable);
    }

    #[test]
    fn test_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/Lonely.js");
        touch(root, "tests/Other.spec.js");

        assert_eq!(locator(root).locate(&source, "js"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_paths_escaping_the_root() {
        let outside = tempfile::tempdir().unwrap();
        touch(outside.path(), "Button.spec.js");

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/Button.js");
        fs::create_dir_all(root.join("tests")).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("tests/linked")).unwrap();

        assert_eq!(locator(root).locate(&source, "js"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_spec_is_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let source = touch(root, "src/Button.js");
        fs::create_dir_all(root.join("tests")).unwrap();
        std::os::unix::fs::symlink(
            root.join("removed/Button.spec.js"),
            root.join("tests/Button.spec.js"),
        )
        .unwrap();

        assert_eq!(locator(root).locate(&source, "js"), None);

        let spec = touch(root, "tests/nested/Button.spec.js");
        assert_eq!(locator(root).locate(&source, "js").unwrap(), spec);
    }
}
