//! External command execution.
//!
//! Everything Briefcase learns about a repository, and every side effect it has on
//! one, goes through a [`CommandRunner`]. Arguments are passed as an argv vector,
//! never through a shell, so commit messages and PR bodies need no quoting.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;

/// Longest stderr excerpt kept in a [`CommandError`].
const MAX_STDERR: usize = 2000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

impl CommandError {
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Failed { stderr, .. } => Some(stderr),
            CommandError::Spawn { .. } => None,
        }
    }
}

/// Runs one external program to completion in a working directory.
#[async_trait::async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> Result<CommandOutput, CommandError>;
}

/// Render a command the way a user would type it, for logs and error messages.
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Truncate a string to at most `max` bytes on a valid UTF-8 char boundary.
fn truncate_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Spawns real child processes via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait::async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
    ) -> Result<CommandOutput, CommandError> {
        tracing::debug!(command = %command_line(program, args), cwd = %cwd.display(), "spawning");

        let output = tokio::process::Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(CommandOutput { stdout, stderr })
        } else {
            Err(CommandError::Failed {
                command: command_line(program, args),
                code: output.status.code().unwrap_or(-1),
                stderr: truncate_str(stderr.trim(), MAX_STDERR).to_string(),
            })
        }
    }
}

/// Scripted runner for tests. Responses are keyed by command-line prefix; the
/// longest matching prefix wins. Unscripted commands fail.
pub struct MockRunner {
    responses: Mutex<HashMap<String, Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Succeed with `stdout` for commands starting with `prefix`.
    pub fn respond(&self, prefix: &str, stdout: &str) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(prefix.to_string(), Ok(stdout.to_string()));
        self
    }

    /// Fail with `stderr` for commands starting with `prefix`.
    pub fn fail(&self, prefix: &str, stderr: &str) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(prefix.to_string(), Err(stderr.to_string()));
        self
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait::async_trait]
impl CommandRunner for MockRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        _cwd: &Path,
    ) -> Result<CommandOutput, CommandError> {
        let line = command_line(program, args);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.clone());

        let scripted = {
            let responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
            responses
                .iter()
                .filter(|(prefix, _)| line.starts_with(prefix.as_str()))
                .max_by_key(|(prefix, _)| prefix.len())
                .map(|(_, response)| response.clone())
        };

        match scripted {
            Some(Ok(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            }),
            Some(Err(stderr)) => Err(CommandError::Failed {
                command: line,
                code: 1,
                stderr,
            }),
            None => Err(CommandError::Failed {
                command: line,
                code: 127,
                stderr: "no scripted response".to_string(),
            }),
        }
    }
}
