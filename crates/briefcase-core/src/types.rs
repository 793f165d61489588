//! Data model shared between the planner and the executor.

use serde::{Deserialize, Serialize};

/// Branch name (e.g. "main", "feature/add-export")
pub type BranchName = String;

/// Point-in-time read of one working tree.
///
/// Every git-derived field is `None` when `is_git_repository` is false.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySnapshot {
    pub path: String,
    pub name: String,
    pub is_git_repository: bool,
    pub remote_url: Option<String>,
    pub current_branch: Option<BranchName>,
    pub has_uncommitted_changes: Option<bool>,
    pub raw_status_text: Option<String>,
    pub last_commit_summary: Option<String>,
    /// Whether GitHub Desktop's local database is present for this user.
    pub github_desktop: Option<bool>,
}

impl RepositorySnapshot {
    /// Snapshot for a path that is not inside a git working tree.
    pub fn not_a_repository(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            is_git_repository: false,
            remote_url: None,
            current_branch: None,
            has_uncommitted_changes: None,
            raw_status_text: None,
            last_commit_summary: None,
            github_desktop: None,
        }
    }

    /// True when the snapshot is on a branch work should not land on directly.
    pub fn is_on_default_branch(&self) -> bool {
        matches!(self.current_branch.as_deref(), Some("main" | "master"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Bugfix,
    Feature,
    Test,
    Style,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Bugfix => "bugfix",
            ChangeType::Feature => "feature",
            ChangeType::Test => "test",
            ChangeType::Style => "style",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Squash,
    Merge,
}

impl MergeStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::Squash => "squash",
            MergeStrategy::Merge => "merge",
        }
    }
}

/// Concrete plan for turning the working tree into a pull request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPlan {
    pub title: String,
    pub description: String,
    pub branch_name: BranchName,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub merge_strategy: MergeStrategy,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowStep {
    CreateBranch,
    Commit,
    Push,
    CreatePr,
}

impl WorkflowStep {
    /// Execution order. Fixed; never reordered.
    pub const ORDER: [WorkflowStep; 4] = [
        WorkflowStep::CreateBranch,
        WorkflowStep::Commit,
        WorkflowStep::Push,
        WorkflowStep::CreatePr,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::CreateBranch => "create-branch",
            WorkflowStep::Commit => "commit",
            WorkflowStep::Push => "push",
            WorkflowStep::CreatePr => "create-pr",
        }
    }
}

/// Payload recorded alongside a step outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StepDetail {
    Branch { branch: String },
    Message { message: String },
    Title { title: String },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowStepResult {
    pub step: WorkflowStep,
    pub success: bool,
    #[serde(flatten)]
    pub detail: StepDetail,
}

impl WorkflowStepResult {
    pub fn succeeded(step: WorkflowStep, detail: StepDetail) -> Self {
        Self {
            step,
            success: true,
            detail,
        }
    }

    pub fn failed(step: WorkflowStep, error: impl Into<String>) -> Self {
        Self {
            step,
            success: false,
            detail: StepDetail::Error {
                error: error.into(),
            },
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.detail {
            StepDetail::Error { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_repository_has_no_git_fields() {
        let snap = RepositorySnapshot::not_a_repository("/tmp/x", "x");
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["isGitRepository"], false);
        assert!(json["remoteUrl"].is_null());
        assert!(json["currentBranch"].is_null());
        assert!(json["rawStatusText"].is_null());
        assert!(json["hasUncommittedChanges"].is_null());
        assert!(!snap.is_on_default_branch());
    }

    #[test]
    fn step_result_serializes_flat() {
        let ok = WorkflowStepResult::succeeded(
            WorkflowStep::CreateBranch,
            StepDetail::Branch {
                branch: "feature/x".into(),
            },
        );
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["step"], "create-branch");
        assert_eq!(json["success"], true);
        assert_eq!(json["branch"], "feature/x");

        let bad = WorkflowStepResult::failed(WorkflowStep::CreatePr, "gh missing");
        let json = serde_json::to_value(&bad).unwrap();
        assert_eq!(json["step"], "create-pr");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "gh missing");
        assert_eq!(bad.error(), Some("gh missing"));
    }

    #[test]
    fn plan_type_field_is_renamed() {
        let plan = WorkflowPlan {
            title: "t".into(),
            description: "d".into(),
            branch_name: "test/add-tests".into(),
            change_type: ChangeType::Test,
            merge_strategy: MergeStrategy::Squash,
            recommendations: vec![],
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["type"], "test");
        assert_eq!(json["mergeStrategy"], "squash");
        assert_eq!(json["branchName"], "test/add-tests");
    }
}
