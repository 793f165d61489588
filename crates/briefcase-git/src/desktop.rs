//! Presence and process probes for GitHub Desktop and the Cursor editor.
//!
//! All probes are best-effort and return plain status structs; nothing here fails.

use std::path::{Path, PathBuf};

use briefcase_core::RepositorySnapshot;
use serde::Serialize;

use crate::inspect::inspect;
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopTool {
    GithubDesktop,
    Cursor,
}

impl DesktopTool {
    pub fn name(self) -> &'static str {
        match self {
            DesktopTool::GithubDesktop => "GitHub Desktop",
            DesktopTool::Cursor => "Cursor",
        }
    }

    /// Install locations checked in order; the first existing one wins.
    pub fn candidate_paths(self, home: Option<&Path>) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = match self {
            DesktopTool::GithubDesktop => vec![
                "/Applications/GitHub Desktop.app/Contents/MacOS/GitHub Desktop".into(),
                "/Applications/GitHub Desktop.app".into(),
                "/usr/local/bin/github-desktop".into(),
            ],
            DesktopTool::Cursor => vec![
                "/Applications/Cursor.app/Contents/MacOS/Cursor".into(),
                "/usr/local/bin/cursor".into(),
                "/opt/homebrew/bin/cursor".into(),
            ],
        };
        if let Some(home) = home {
            paths.push(match self {
                DesktopTool::GithubDesktop => home.join("Applications").join("GitHub Desktop.app"),
                DesktopTool::Cursor => home.join(".local").join("bin").join("cursor"),
            });
        }
        paths
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DesktopStatus {
    pub installed: bool,
    pub running: bool,
    pub version: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CursorStatus {
    #[serde(flatten)]
    pub desktop: DesktopStatus,
    pub accessible: bool,
    pub current_project: Option<String>,
    pub git_context: Option<RepositorySnapshot>,
}

/// Lines of `ps aux`, minus any grep processes. Empty when `ps` is unavailable.
async fn process_lines(runner: &dyn CommandRunner, cwd: &Path) -> Vec<String> {
    match runner.run("ps", &["aux"], cwd).await {
        Ok(out) => out
            .stdout
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.contains("grep"))
            .map(str::to_string)
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "process listing unavailable");
            Vec::new()
        }
    }
}

fn is_main_cursor_process(line: &str) -> bool {
    line.contains("/Applications/Cursor.app/Contents/MacOS/Cursor")
        && !line.contains("Helper")
        && !line.contains("Renderer")
}

fn first_existing(tool: DesktopTool, home: Option<&Path>) -> Option<PathBuf> {
    tool.candidate_paths(home).into_iter().find(|p| match tool {
        DesktopTool::GithubDesktop => p.exists(),
        DesktopTool::Cursor => p.is_file(),
    })
}

/// Binary to ask for a version: app bundles resolve to their main executable.
fn version_binary(tool: DesktopTool, path: &Path) -> PathBuf {
    if path.extension().is_some_and(|e| e == "app") {
        path.join("Contents").join("MacOS").join(tool.name())
    } else {
        path.to_path_buf()
    }
}

pub async fn probe_desktop_tool(
    runner: &dyn CommandRunner,
    tool: DesktopTool,
    home: Option<&Path>,
    cwd: &Path,
) -> DesktopStatus {
    let processes = process_lines(runner, cwd).await;
    probe_with_processes(runner, tool, home, cwd, &processes).await
}

async fn probe_with_processes(
    runner: &dyn CommandRunner,
    tool: DesktopTool,
    home: Option<&Path>,
    cwd: &Path,
    processes: &[String],
) -> DesktopStatus {
    let mut status = DesktopStatus::default();

    if let Some(path) = first_existing(tool, home) {
        status.installed = true;
        status.path = Some(path.to_string_lossy().into_owned());
    }

    status.running = match tool {
        DesktopTool::GithubDesktop => processes
            .iter()
            .any(|l| l.to_lowercase().contains("github desktop")),
        DesktopTool::Cursor => processes.iter().any(|l| is_main_cursor_process(l)),
    };

    if tool == DesktopTool::GithubDesktop {
        if let Some(path) = status.path.as_deref() {
            let binary = version_binary(tool, Path::new(path));
            let binary = binary.to_string_lossy();
            if let Ok(out) = runner.run(&binary, &["--version"], cwd).await {
                status.version = Some(out.stdout.trim().to_string()).filter(|v| !v.is_empty());
            }
        }
    }

    tracing::debug!(
        tool = tool.name(),
        installed = status.installed,
        running = status.running,
        "desktop probe"
    );
    status
}

/// Cursor status plus the project it has open and that project's git snapshot.
///
/// With no detectable project, the git context falls back to `default_cwd` as long as
/// any Cursor process is around.
pub async fn probe_cursor(
    runner: &dyn CommandRunner,
    home: Option<&Path>,
    default_cwd: &Path,
) -> CursorStatus {
    let processes = process_lines(runner, default_cwd).await;
    let desktop =
        probe_with_processes(runner, DesktopTool::Cursor, home, default_cwd, &processes).await;
    let any_process = processes
        .iter()
        .any(|l| l.to_lowercase().contains("cursor"));

    let mut current_project = None;
    if desktop.running {
        let script = r#"tell application "Cursor" to get path of front document"#;
        if let Ok(out) = runner.run("osascript", &["-e", script], default_cwd).await {
            let text = out.stdout.trim();
            if !text.is_empty() && !text.contains("error") {
                current_project = Some(text.to_string());
            }
        }
    }

    let accessible = any_process || desktop.running;
    let git_context = match current_project.as_deref() {
        Some(project) => Some(inspect(runner, Path::new(project), home).await),
        None if accessible => Some(inspect(runner, default_cwd, home).await),
        None => None,
    };

    CursorStatus {
        desktop,
        accessible,
        current_project,
        git_context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::MockRunner;

    const PS_CURSOR: &str = "\
USER  PID  COMMAND
dev   101  /Applications/Cursor.app/Contents/MacOS/Cursor
dev   102  /Applications/Cursor.app/Contents/Frameworks/Cursor Helper (Renderer).app
";

    #[test]
    fn main_process_excludes_helpers() {
        assert!(is_main_cursor_process(
            "dev 1 /Applications/Cursor.app/Contents/MacOS/Cursor --foo"
        ));
        assert!(!is_main_cursor_process(
            "dev 1 /Applications/Cursor.app/Contents/MacOS/Cursor Helper"
        ));
    }

    #[test]
    fn app_bundles_resolve_to_executable() {
        let bin = version_binary(
            DesktopTool::GithubDesktop,
            Path::new("/Applications/GitHub Desktop.app"),
        );
        assert_eq!(
            bin,
            PathBuf::from("/Applications/GitHub Desktop.app/Contents/MacOS/GitHub Desktop")
        );
        let cli = version_binary(DesktopTool::Cursor, Path::new("/usr/local/bin/cursor"));
        assert_eq!(cli, PathBuf::from("/usr/local/bin/cursor"));
    }

    #[tokio::test]
    async fn github_desktop_running_from_process_list() {
        let runner = MockRunner::new();
        runner.respond(
            "ps aux",
            "dev 1 /Applications/GitHub Desktop.app/Contents/MacOS/GitHub Desktop\n",
        );
        let dir = tempfile::tempdir().unwrap();

        let status =
            probe_desktop_tool(&runner, DesktopTool::GithubDesktop, Some(dir.path()), dir.path())
                .await;
        assert!(status.running);
    }

    #[tokio::test]
    async fn installed_from_home_location() {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join(".local").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("cursor"), b"#!/bin/sh\n").unwrap();

        let runner = MockRunner::new();
        runner.fail("ps", "no ps");
        let status =
            probe_desktop_tool(&runner, DesktopTool::Cursor, Some(home.path()), home.path()).await;
        assert!(status.installed);
        assert!(!status.running);
    }

    #[tokio::test]
    async fn cursor_with_open_project() {
        let runner = MockRunner::new();
        runner.respond("ps aux", PS_CURSOR);
        runner.respond("osascript", "/work/app\n");
        runner.respond("git rev-parse", ".git");
        runner.respond("git", "main\n");
        let dir = tempfile::tempdir().unwrap();

        let status = probe_cursor(&runner, None, dir.path()).await;
        assert!(status.desktop.running);
        assert!(status.accessible);
        assert_eq!(status.current_project.as_deref(), Some("/work/app"));
        assert!(status.git_context.unwrap().is_git_repository);
    }

    #[tokio::test]
    async fn cursor_helpers_only_is_accessible_without_project() {
        let runner = MockRunner::new();
        runner.respond(
            "ps aux",
            "dev 9 /Applications/Cursor.app/Contents/Frameworks/Cursor Helper.app\n",
        );
        runner.fail("git", "fatal: not a git repository");
        let dir = tempfile::tempdir().unwrap();

        let status = probe_cursor(&runner, None, dir.path()).await;
        assert!(!status.desktop.running);
        assert!(status.accessible);
        assert!(status.current_project.is_none());
        assert!(!runner.calls().iter().any(|c| c.starts_with("osascript")));
        let ctx = status.git_context.unwrap();
        assert!(!ctx.is_git_repository);
    }

    #[tokio::test]
    async fn no_cursor_at_all() {
        let runner = MockRunner::new();
        runner.respond("ps aux", "dev 1 /usr/bin/zsh\n");
        let dir = tempfile::tempdir().unwrap();

        let status = probe_cursor(&runner, None, dir.path()).await;
        assert!(!status.accessible);
        assert!(status.git_context.is_none());
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["running"], false);
        assert_eq!(json["accessible"], false);
        assert!(json["gitContext"].is_null());
    }
}
