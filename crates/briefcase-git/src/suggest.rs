//! Read the working tree's changes and turn them into a commit suggestion.

use std::path::Path;

use briefcase_core::analysis::{classify, ChangeAnalysis, ChangeSet, Classification};
use briefcase_core::{synthesize, RepositorySnapshot, WorkflowPlan};
use serde::Serialize;

use crate::inspect::inspect;
use crate::runner::{CommandError, CommandRunner};

pub const NO_CHANGES_MESSAGE: &str = "No changes detected. Please stage or make changes first.";

/// Extra git output returned alongside a suggestion.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitContext {
    pub staged_files: Vec<String>,
    pub unstaged_files: Vec<String>,
    pub branch_info: String,
    pub recent_commits: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSuggestion {
    #[serde(flatten)]
    pub plan: WorkflowPlan,
    pub analysis: ChangeAnalysis,
    pub repository: RepositorySnapshot,
    pub context: CommitContext,
}

#[derive(Debug, Clone)]
pub enum Suggestion {
    Ready(Box<CommitSuggestion>),
    /// Nothing staged or modified.
    NoChanges { repository: RepositorySnapshot },
    /// The diff itself could not be read.
    Failed { message: String },
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Staged diff, falling back to the unstaged one, plus both file lists.
///
/// File lists are only fetched when there is a diff to describe.
pub async fn read_change_set(
    runner: &dyn CommandRunner,
    cwd: &Path,
) -> Result<ChangeSet, CommandError> {
    let mut diff = runner.run("git", &["diff", "--cached"], cwd).await?.stdout;
    if diff.trim().is_empty() {
        diff = runner.run("git", &["diff"], cwd).await?.stdout;
    }
    if diff.trim().is_empty() {
        return Ok(ChangeSet {
            diff,
            ..ChangeSet::default()
        });
    }

    let staged = runner
        .run("git", &["diff", "--cached", "--name-only"], cwd)
        .await?;
    let unstaged = runner.run("git", &["diff", "--name-only"], cwd).await?;

    Ok(ChangeSet {
        diff,
        staged_files: non_empty_lines(&staged.stdout),
        unstaged_files: non_empty_lines(&unstaged.stdout),
    })
}

/// Branch tracking info and recent history. Either degrades to empty.
async fn read_history(runner: &dyn CommandRunner, cwd: &Path) -> (String, String) {
    let (branches, log) = tokio::join!(
        runner.run("git", &["branch", "-vv"], cwd),
        runner.run("git", &["log", "--oneline", "-5"], cwd),
    );
    (
        branches.map(|o| o.stdout).unwrap_or_default(),
        log.map(|o| o.stdout).unwrap_or_default(),
    )
}

pub async fn suggest_commit(
    runner: &dyn CommandRunner,
    cwd: &Path,
    home: Option<&Path>,
) -> Suggestion {
    let repository = inspect(runner, cwd, home).await;

    let change_set = match read_change_set(runner, cwd).await {
        Ok(changes) => changes,
        Err(e) => {
            tracing::warn!(cwd = %cwd.display(), error = %e, "could not read diff");
            return Suggestion::Failed {
                message: format!("Failed to generate intelligent commit: {e}"),
            };
        }
    };

    let analysis = match classify(&change_set) {
        Classification::Empty => return Suggestion::NoChanges { repository },
        Classification::Analyzed(analysis) => analysis,
    };

    let (branch_info, recent_commits) = read_history(runner, cwd).await;
    let plan = synthesize(&analysis, &repository);
    tracing::info!(
        branch = %plan.branch_name,
        change_type = plan.change_type.as_str(),
        files = change_set.staged_files.len() + change_set.unstaged_files.len(),
        "synthesized commit plan"
    );

    Suggestion::Ready(Box::new(CommitSuggestion {
        plan,
        analysis,
        repository,
        context: CommitContext {
            staged_files: change_set.staged_files,
            unstaged_files: change_set.unstaged_files,
            branch_info,
            recent_commits,
        },
    }))
}
