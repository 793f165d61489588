//! Find git repositories under a set of search roots.

use std::path::{Path, PathBuf};

use briefcase_core::RepositorySnapshot;
use walkdir::WalkDir;

use crate::inspect::{absolute_path, inspect};
use crate::runner::CommandRunner;

/// How deep below a search root a `.git` directory may sit.
pub const MAX_DEPTH: usize = 3;

/// Conventional project folders under the home directory.
pub fn default_search_roots(home: &Path) -> Vec<PathBuf> {
    ["Documents", "Desktop", "Projects", "Code", "Development"]
        .iter()
        .map(|dir| home.join(dir))
        .collect()
}

/// Working trees whose `.git` directory is at most [`MAX_DEPTH`] below `root`.
/// Unreadable entries are skipped.
pub fn find_git_dirs(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).max_depth(MAX_DEPTH).into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else {
            continue;
        };
        if entry.file_type().is_dir() && entry.file_name() == ".git" {
            if let Some(parent) = entry.path().parent() {
                found.push(parent.to_path_buf());
            }
            walker.skip_current_dir();
        }
    }
    found
}

/// Snapshot of `cwd` (when it is a repository) followed by every repository found
/// under `roots`, deduplicated by path.
pub async fn discover_repositories(
    runner: &dyn CommandRunner,
    cwd: &Path,
    roots: &[PathBuf],
    home: Option<&Path>,
) -> Vec<RepositorySnapshot> {
    let mut repos: Vec<RepositorySnapshot> = Vec::new();

    let current = inspect(runner, cwd, home).await;
    if current.is_git_repository {
        repos.push(current);
    }

    let roots = roots.to_vec();
    let candidates = tokio::task::spawn_blocking(move || {
        roots
            .iter()
            .filter(|root| root.is_dir())
            .flat_map(|root| find_git_dirs(root))
            .collect::<Vec<_>>()
    })
    .await
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "repository scan aborted");
        Vec::new()
    });

    for candidate in candidates {
        let path = absolute_path(&candidate).to_string_lossy().into_owned();
        if repos.iter().any(|r| r.path == path) {
            continue;
        }
        let snapshot = inspect(runner, &candidate, home).await;
        if snapshot.is_git_repository {
            repos.push(snapshot);
        }
    }

    tracing::debug!(count = repos.len(), "discovered repositories");
    repos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::MockRunner;

    fn fake_repo(path: &Path) {
        std::fs::create_dir_all(path.join(".git").join("objects")).unwrap();
    }

    #[test]
    fn finds_repositories_within_depth() {
        let root = tempfile::tempdir().unwrap();
        fake_repo(&root.path().join("a"));
        fake_repo(&root.path().join("group").join("b"));
        fake_repo(&root.path().join("x").join("y").join("z").join("too-deep"));

        let mut found = find_git_dirs(root.path());
        found.sort();
        assert_eq!(
            found,
            vec![root.path().join("a"), root.path().join("group").join("b")]
        );
    }

    #[test]
    fn missing_root_yields_nothing() {
        let root = tempfile::tempdir().unwrap();
        assert!(find_git_dirs(&root.path().join("absent")).is_empty());
    }

    #[test]
    fn default_roots_live_under_home() {
        let roots = default_search_roots(Path::new("/home/dev"));
        assert_eq!(roots.len(), 5);
        assert!(roots.contains(&PathBuf::from("/home/dev/Projects")));
    }

    #[tokio::test]
    async fn current_directory_comes_first_and_is_not_duplicated() {
        let root = tempfile::tempdir().unwrap();
        let app = root.path().join("app");
        fake_repo(&app);
        fake_repo(&root.path().join("lib"));

        let runner = MockRunner::new();
        runner.respond("git", "main\n");

        let repos = discover_repositories(&runner, &app, &[root.path().to_path_buf()], None).await;
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name, "app");
        assert_eq!(repos[1].name, "lib");
    }

    #[tokio::test]
    async fn non_repository_cwd_is_omitted() {
        let root = tempfile::tempdir().unwrap();
        let runner = MockRunner::new();
        runner.fail("git", "fatal: not a git repository");

        let repos = discover_repositories(&runner, root.path(), &[], None).await;
        assert!(repos.is_empty());
    }
}
