//! Best-effort branch → commit → push → pull-request workflow.
//!
//! The steps always run in order and each records its own outcome. A step never looks at
//! earlier results: a failed commit still attempts the push and the PR so the caller sees
//! exactly which operations went through.

use std::path::Path;

use briefcase_core::{StepDetail, WorkflowPlan, WorkflowStep, WorkflowStepResult};

use crate::runner::{CommandError, CommandRunner};

/// Optional pull-request settings.
#[derive(Debug, Clone, Default)]
pub struct PullRequestOptions {
    pub reviewers: Vec<String>,
}

/// A caller-specified run. Commit and pull request may carry different text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSpec {
    pub branch_name: String,
    /// Checked out before the new branch is created; `None` branches from `HEAD`.
    pub base_branch: Option<String>,
    pub commit_title: String,
    pub commit_description: String,
    pub pr_title: String,
    pub pr_description: String,
    /// When false the create-pr step is left out of the results entirely.
    pub open_pr: bool,
}

impl FlowSpec {
    pub fn commit_message(&self) -> String {
        format!("{}\n\n{}", self.commit_title, self.commit_description)
    }
}

impl From<&WorkflowPlan> for FlowSpec {
    fn from(plan: &WorkflowPlan) -> Self {
        Self {
            branch_name: plan.branch_name.clone(),
            base_branch: None,
            commit_title: plan.title.clone(),
            commit_description: plan.description.clone(),
            pr_title: plan.title.clone(),
            pr_description: plan.description.clone(),
            open_pr: true,
        }
    }
}

pub struct WorkflowExecutor<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> WorkflowExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Run every step of a synthesized plan. Always returns one result per step, in
    /// execution order.
    pub async fn execute(
        &self,
        plan: &WorkflowPlan,
        cwd: &Path,
        pr: &PullRequestOptions,
    ) -> Vec<WorkflowStepResult> {
        self.execute_flow(&FlowSpec::from(plan), cwd, pr).await
    }

    /// Run a caller-specified flow. The PR step is skipped when `flow.open_pr` is false.
    pub async fn execute_flow(
        &self,
        flow: &FlowSpec,
        cwd: &Path,
        pr: &PullRequestOptions,
    ) -> Vec<WorkflowStepResult> {
        let mut results = Vec::with_capacity(WorkflowStep::ORDER.len());

        for step in WorkflowStep::ORDER {
            if step == WorkflowStep::CreatePr && !flow.open_pr {
                tracing::debug!(branch = %flow.branch_name, "pull request disabled");
                continue;
            }
            tracing::info!(step = step.as_str(), branch = %flow.branch_name, "workflow step");
            let result = match self.run_step(step, flow, cwd, pr).await {
                Ok(detail) => WorkflowStepResult::succeeded(step, detail),
                Err(e) => {
                    tracing::warn!(step = step.as_str(), error = %e, "workflow step failed");
                    WorkflowStepResult::failed(step, e.to_string())
                }
            };
            results.push(result);
        }

        results
    }

    async fn run_step(
        &self,
        step: WorkflowStep,
        flow: &FlowSpec,
        cwd: &Path,
        pr: &PullRequestOptions,
    ) -> Result<StepDetail, CommandError> {
        let branch = flow.branch_name.clone();
        match step {
            WorkflowStep::CreateBranch => {
                self.create_branch(&branch, flow.base_branch.as_deref(), cwd).await?;
                Ok(StepDetail::Branch { branch })
            }
            WorkflowStep::Commit => {
                self.commit_all(&flow.commit_message(), cwd).await?;
                Ok(StepDetail::Message {
                    message: flow.commit_title.clone(),
                })
            }
            WorkflowStep::Push => {
                self.push_branch(&branch, cwd).await?;
                Ok(StepDetail::Branch { branch })
            }
            WorkflowStep::CreatePr => {
                self.create_pull_request(&branch, &flow.pr_title, &flow.pr_description, pr, cwd)
                    .await?;
                Ok(StepDetail::Title {
                    title: flow.pr_title.clone(),
                })
            }
        }
    }

    /// `git checkout -b <branch>`, after checking out `base` when one is given.
    pub async fn create_branch(
        &self,
        branch: &str,
        base: Option<&str>,
        cwd: &Path,
    ) -> Result<(), CommandError> {
        if let Some(base) = base {
            self.runner.run("git", &["checkout", base], cwd).await?;
        }
        self.runner.run("git", &["checkout", "-b", branch], cwd).await?;
        Ok(())
    }

    /// Stage everything and commit. Nothing is committed if staging fails.
    pub async fn commit_all(&self, message: &str, cwd: &Path) -> Result<(), CommandError> {
        self.runner.run("git", &["add", "."], cwd).await?;
        self.runner.run("git", &["commit", "-m", message], cwd).await?;
        Ok(())
    }

    pub async fn push_branch(&self, branch: &str, cwd: &Path) -> Result<(), CommandError> {
        self.runner.run("git", &["push", "origin", branch], cwd).await?;
        Ok(())
    }

    /// Open a pull request with `gh`. Returns what `gh` printed (usually the PR URL).
    pub async fn create_pull_request(
        &self,
        branch: &str,
        title: &str,
        body: &str,
        pr: &PullRequestOptions,
        cwd: &Path,
    ) -> Result<String, CommandError> {
        let reviewers = pr.reviewers.join(",");
        let mut args = vec!["pr", "create", "--title", title, "--body", body, "--head", branch];
        if !pr.reviewers.is_empty() {
            args.extend(["--reviewer", reviewers.as_str()]);
        }
        let out = self.runner.run("gh", &args, cwd).await?;
        Ok(out.stdout.trim().to_string())
    }
}
