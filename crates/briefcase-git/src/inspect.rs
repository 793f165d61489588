//! Repository snapshots.
//!
//! Every probe is best-effort: a failing `git` invocation degrades that one field to
//! its default and never fails the snapshot as a whole.

use std::path::{Path, PathBuf};

use briefcase_core::RepositorySnapshot;

use crate::runner::CommandRunner;

/// Absolute form of `path`; falls back to the input when it cannot be resolved.
pub fn absolute_path(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// GitHub Desktop keeps its repository list in this database.
pub fn github_desktop_db(home: &Path) -> PathBuf {
    home.join("Library")
        .join("Application Support")
        .join("GitHub Desktop")
        .join("databases")
        .join("main.db")
}

pub async fn inspect(
    runner: &dyn CommandRunner,
    path: &Path,
    home: Option<&Path>,
) -> RepositorySnapshot {
    let abs = absolute_path(path);
    let name = abs
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let shown = abs.to_string_lossy().into_owned();

    if let Err(e) = runner.run("git", &["rev-parse", "--git-dir"], &abs).await {
        tracing::debug!(path = %shown, error = %e, "not a git repository");
        return RepositorySnapshot::not_a_repository(shown, name);
    }

    let (remote, branch, status, last_commit) = tokio::join!(
        runner.run("git", &["remote", "get-url", "origin"], &abs),
        runner.run("git", &["branch", "--show-current"], &abs),
        runner.run("git", &["status", "--porcelain"], &abs),
        runner.run("git", &["log", "-1", "--oneline"], &abs),
    );

    let remote_url = match remote {
        Ok(out) => Some(out.stdout.trim().to_string()).filter(|s| !s.is_empty()),
        Err(e) => {
            tracing::debug!(path = %shown, error = %e, "no origin remote");
            None
        }
    };

    let current_branch = match branch {
        Ok(out) if !out.stdout.trim().is_empty() => out.stdout.trim().to_string(),
        Ok(_) => "unknown".to_string(),
        Err(e) => {
            tracing::debug!(path = %shown, error = %e, "branch probe failed");
            "unknown".to_string()
        }
    };

    let (has_changes, status_text) = match status {
        Ok(out) => {
            let text = out.stdout.trim_end().to_string();
            (!text.trim().is_empty(), text)
        }
        Err(e) => {
            tracing::debug!(path = %shown, error = %e, "status probe failed");
            (false, "unknown".to_string())
        }
    };

    let last_commit_summary = match last_commit {
        Ok(out) => out.stdout.trim().to_string(),
        Err(_) => "No commits".to_string(),
    };

    RepositorySnapshot {
        path: shown,
        name,
        is_git_repository: true,
        remote_url,
        current_branch: Some(current_branch),
        has_uncommitted_changes: Some(has_changes),
        raw_status_text: Some(status_text),
        last_commit_summary: Some(last_commit_summary),
        github_desktop: Some(home.is_some_and(|h| github_desktop_db(h).exists())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{MockRunner, ProcessRunner};
    use tokio::process::Command;

    async fn git(dir: &Path, args: &[&str]) {
        let _ = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await;
    }

    #[tokio::test]
    async fn non_git_directory() {
        let dir = tempfile::tempdir().unwrap();
        let snap = inspect(&ProcessRunner, dir.path(), None).await;
        assert!(!snap.is_git_repository);
        assert!(snap.remote_url.is_none());
        assert!(snap.current_branch.is_none());
        assert!(snap.raw_status_text.is_none());
        assert!(snap.has_uncommitted_changes.is_none());
        assert!(snap.last_commit_summary.is_none());
        assert!(snap.github_desktop.is_none());
        assert!(!snap.name.is_empty());
    }

    #[tokio::test]
    async fn missing_directory_is_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        let snap = inspect(&ProcessRunner, &gone, None).await;
        assert!(!snap.is_git_repository);
        assert_eq!(snap.name, "does-not-exist");
    }

    #[tokio::test]
    async fn real_repository_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-b", "main"]).await;
        git(dir.path(), &["config", "user.email", "test@test.com"]).await;
        git(dir.path(), &["config", "user.name", "Test"]).await;
        std::fs::write(dir.path().join("README"), "hi").unwrap();
        git(dir.path(), &["add", "."]).await;
        git(dir.path(), &["commit", "-m", "init"]).await;
        std::fs::write(dir.path().join("dirty.txt"), "x").unwrap();

        let snap = inspect(&ProcessRunner, dir.path(), None).await;
        assert!(snap.is_git_repository);
        assert_eq!(snap.current_branch.as_deref(), Some("main"));
        assert_eq!(snap.has_uncommitted_changes, Some(true));
        assert!(snap.raw_status_text.unwrap().contains("dirty.txt"));
        assert!(snap.last_commit_summary.unwrap().ends_with("init"));
        assert!(snap.remote_url.is_none());
        assert_eq!(snap.github_desktop, Some(false));
    }

    #[tokio::test]
    async fn probes_degrade_independently() {
        let runner = MockRunner::new();
        runner.respond("git rev-parse", ".git\n");
        runner.fail("git remote", "No such remote 'origin'");
        runner.fail("git branch", "fatal");
        runner.respond("git status", "");
        runner.fail("git log", "does not have any commits yet");

        let dir = tempfile::tempdir().unwrap();
        let snap = inspect(&runner, dir.path(), Some(dir.path())).await;
        assert!(snap.is_git_repository);
        assert!(snap.remote_url.is_none());
        assert_eq!(snap.current_branch.as_deref(), Some("unknown"));
        assert_eq!(snap.has_uncommitted_changes, Some(false));
        assert_eq!(snap.raw_status_text.as_deref(), Some(""));
        assert_eq!(snap.last_commit_summary.as_deref(), Some("No commits"));
    }

    #[tokio::test]
    async fn status_failure_is_unknown() {
        let runner = MockRunner::new();
        runner.respond("git rev-parse", ".git\n");
        runner.respond("git remote", "git@github.com:acme/app.git\n");
        runner.respond("git branch", "feature/x\n");
        runner.fail("git status", "index locked");
        runner.respond("git log", "abc123 init\n");

        let dir = tempfile::tempdir().unwrap();
        let snap = inspect(&runner, dir.path(), None).await;
        assert_eq!(
            snap.remote_url.as_deref(),
            Some("git@github.com:acme/app.git")
        );
        assert_eq!(snap.current_branch.as_deref(), Some("feature/x"));
        assert_eq!(snap.raw_status_text.as_deref(), Some("unknown"));
        assert_eq!(snap.has_uncommitted_changes, Some(false));
        assert_eq!(snap.last_commit_summary.as_deref(), Some("abc123 init"));
    }

    #[tokio::test]
    async fn github_desktop_database_is_detected() {
        let home = tempfile::tempdir().unwrap();
        let db = github_desktop_db(home.path());
        std::fs::create_dir_all(db.parent().unwrap()).unwrap();
        std::fs::write(&db, b"").unwrap();

        let runner = MockRunner::new();
        runner.respond("git", "");
        let repo = tempfile::tempdir().unwrap();
        let snap = inspect(&runner, repo.path(), Some(home.path())).await;
        assert_eq!(snap.github_desktop, Some(true));
    }
}
