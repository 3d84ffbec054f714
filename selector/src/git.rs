//! Changed-path discovery from a git working copy.
//!
//! Paths are returned relative to the repository workdir, in the order git
//! reports them.

use git2::{Delta, DiffOptions, Repository, Status, StatusOptions};
use std::path::{Path, PathBuf};

use crate::error::SelectorResult;

/// Files with index or working-tree changes, both sides of a rename
/// included. Ignored files are skipped.
pub fn working_copy_changes(repo_path: impl AsRef<Path>) -> SelectorResult<Vec<PathBuf>> {
    let repo = Repository::discover(repo_path.as_ref())?;
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);

    let mut paths = Vec::new();
    for entry in repo.statuses(Some(&mut options))?.iter() {
        let status = entry.status();
        if status.is_empty() || status.contains(Status::IGNORED) {
            continue;
        }

        let before = paths.len();
        for delta in [entry.head_to_index(), entry.index_to_workdir()]
            .into_iter()
            .flatten()
        {
            for file in [delta.old_file(), delta.new_file()] {
                if let Some(path) = file.path() {
                    push_unique(&mut paths, path.to_path_buf());
                }
            }
        }
        if paths.len() > before {
            continue;
        }

        match entry.path() {
            Some(path) => push_unique(&mut paths, PathBuf::from(path)),
            None => tracing::warn!("Skipping non UTF-8 path in git status"),
        }
    }

    Ok(paths)
}

/// Files changed between `base` and the working tree, index included.
pub fn changes_since(repo_path: impl AsRef<Path>, base: &str) -> SelectorResult<Vec<PathBuf>> {
    let repo = Repository::discover(repo_path.as_ref())?;
    let tree = repo.revparse_single(base)?.peel_to_tree()?;

    let mut options = DiffOptions::new();
    options.include_untracked(true).recurse_untracked_dirs(true);
    let diff = repo.diff_tree_to_workdir_with_index(Some(&tree), Some(&mut options))?;

    let mut paths = Vec::new();
    for delta in diff.deltas() {
        if delta.status() == Delta::Unmodified || delta.status() == Delta::Ignored {
            continue;
        }
        for file in [delta.old_file(), delta.new_file()] {
            if let Some(path) = file.path() {
                push_unique(&mut paths, path.to_path_buf());
            }
        }
    }

    Ok(paths)
}

/// Workdir root of the repository containing `path`, if any.
pub fn repository_root(path: impl AsRef<Path>) -> Option<PathBuf> {
    Repository::discover(path.as_ref())
        .ok()
        .and_then(|repo| repo.workdir().map(Path::to_path_buf))
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectorError;
    use git2::Signature;
    use std::fs;

    fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let signature = Signature::now("Test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap();
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_working_copy_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        write(dir.path(), "src/Button.js", "export default 1;\n");
        write(dir.path(), "src/Form.js", "export default 2;\n");
        write(dir.path(), ".gitignore", "build/\n");
        commit_all(&repo, "initial");

        write(dir.path(), "src/Button.js", "export default 3;\n");
        write(dir.path(), "src/New.js", "export default 4;\n");
        write(dir.path(), "build/out.js", "ignored\n");

        let mut changes = working_copy_changes(dir.path()).unwrap();
        changes.sort();
        assert_eq!(
            changes,
            vec![PathBuf::from("src/Button.js"), PathBuf::from("src/New.js")]
        );
    }

    #[test]
    fn test_changes_since() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        write(dir.path(), "src/Button.js", "export default 1;\n");
        commit_all(&repo, "initial");

        write(dir.path(), "src/Form.js", "export default 2;\n");
        commit_all(&repo, "add form");
        write(dir.path(), "src/Button.js", "export default 3;\n");

        let mut changes = changes_since(dir.path(), "HEAD~1").unwrap();
        changes.sort();
        assert_eq!(
            changes,
            vec![PathBuf::from("src/Button.js"), PathBuf::from("src/Form.js")]
        );
    }

    #[test]
    fn test_changes_since_includes_both_sides_of_a_rename() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        write(dir.path(), "src/Button.js", "export default 1;\n");
        write(dir.path(), "src/Form.js", "export default 2;\n");
        commit_all(&repo, "initial");

        fs::rename(dir.path().join("src/Button.js"), dir.path().join("src/Toggle.js")).unwrap();

        let mut changes = changes_since(dir.path(), "HEAD").unwrap();
        changes.sort();
        assert_eq!(
            changes,
            vec![PathBuf::from("src/Button.js"), PathBuf::from("src/Toggle.js")]
        );
    }

    #[test]
    fn test_working_copy_includes_both_sides_of_a_staged_rename() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        write(dir.path(), "src/Button.js", "export default 1;\n");
        commit_all(&repo, "initial");

        fs::rename(dir.path().join("src/Button.js"), dir.path().join("src/Toggle.js")).unwrap();
        let mut index = repo.index().unwrap();
        index.remove_path(Path::new("src/Button.js")).unwrap();
        index.add_path(Path::new("src/Toggle.js")).unwrap();
        index.write().unwrap();

        let mut changes = working_copy_changes(dir.path()).unwrap();
        changes.sort();
        assert_eq!(
            changes,
            vec![PathBuf::from("src/Button.js"), PathBuf::from("src/Toggle.js")]
        );
    }

    #[test]
    fn test_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            working_copy_changes(dir.path()),
            Err(SelectorError::Git(_))
        ));
        assert_eq!(repository_root(dir.path()), None);
    }
}
