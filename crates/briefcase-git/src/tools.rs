//! Developer tool availability and installation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::desktop::probe_cursor;
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ToolChecks {
    pub uv: bool,
    pub pnpm: bool,
    pub gh: bool,
    pub git: bool,
    pub cursor: bool,
}

/// True when `which <tool>` succeeds.
pub async fn tool_on_path(runner: &dyn CommandRunner, tool: &str, cwd: &Path) -> bool {
    runner.run("which", &[tool], cwd).await.is_ok()
}

pub async fn system_check(
    runner: &dyn CommandRunner,
    home: Option<&Path>,
    cwd: &Path,
) -> ToolChecks {
    let (uv, pnpm, gh, git) = tokio::join!(
        tool_on_path(runner, "uv", cwd),
        tool_on_path(runner, "pnpm", cwd),
        tool_on_path(runner, "gh", cwd),
        tool_on_path(runner, "git", cwd),
    );
    let cursor = probe_cursor(runner, home, cwd).await.accessible;
    ToolChecks {
        uv,
        pnpm,
        gh,
        git,
        cursor,
    }
}

/// Package-manager invocation that installs `tool`, if it is one we know.
pub fn install_command(tool: &str) -> Option<(&'static str, &'static [&'static str])> {
    match tool {
        "uv" => Some(("sh", &["-c", "curl -LsSf https://astral.sh/uv/install.sh | sh"])),
        "pnpm" => Some(("npm", &["install", "-g", "pnpm"])),
        "gh" => Some(("brew", &["install", "gh"])),
        _ => None,
    }
}

/// Install each tool in turn. Unknown tools and failed installs map to `false`.
pub async fn install_tools(
    runner: &dyn CommandRunner,
    tools: &[String],
    cwd: &Path,
) -> BTreeMap<String, bool> {
    let mut results = BTreeMap::new();
    for tool in tools {
        let ok = match install_command(tool) {
            Some((program, args)) => match runner.run(program, args, cwd).await {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(tool = %tool, error = %e, "install failed");
                    false
                }
            },
            None => {
                tracing::warn!(tool = %tool, "no installer known");
                false
            }
        };
        results.insert(tool.clone(), ok);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::MockRunner;

    #[tokio::test]
    async fn checks_each_tool() {
        let runner = MockRunner::new();
        runner.respond("which git", "/usr/bin/git\n");
        runner.respond("which gh", "/usr/local/bin/gh\n");
        runner.fail("which", "");
        runner.respond("ps aux", "dev 1 /bin/zsh\n");
        let dir = tempfile::tempdir().unwrap();

        let checks = system_check(&runner, None, dir.path()).await;
        assert_eq!(
            checks,
            ToolChecks {
                uv: false,
                pnpm: false,
                gh: true,
                git: true,
                cursor: false,
            }
        );
    }

    #[tokio::test]
    async fn install_reports_per_tool() {
        let runner = MockRunner::new();
        runner.respond("npm install", "");
        runner.fail("brew", "brew: command not found");
        let dir = tempfile::tempdir().unwrap();

        let tools = vec!["pnpm".to_string(), "gh".to_string(), "cargo".to_string()];
        let results = install_tools(&runner, &tools, dir.path()).await;
        assert_eq!(results.get("pnpm"), Some(&true));
        assert_eq!(results.get("gh"), Some(&false));
        assert_eq!(results.get("cargo"), Some(&false));
        assert!(!runner.calls().iter().any(|c| c.contains("cargo")));
    }

    #[test]
    fn uv_installs_through_shell() {
        let (program, args) = install_command("uv").unwrap();
        assert_eq!(program, "sh");
        assert!(args[1].contains("astral.sh/uv"));
        assert!(install_command("node").is_none());
    }
}
