//! Portable description of a branch/commit/PR run, with the literal commands a
//! person would type to reproduce it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Tools every automation run expects on `PATH`.
pub const REQUIREMENTS: &[&str] = &["uv", "pnpm", "gh", "git"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BranchData {
    /// Branch category, e.g. "feature" or "bugfix".
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl BranchData {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitData {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRequest {
    pub branch_data: BranchData,
    pub commit_data: CommitData,
    #[serde(default)]
    pub github_data: Value,
    #[serde(default)]
    pub system_check: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchemaMetadata {
    pub version: String,
    pub generated: String,
    pub project: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchemaSystem {
    pub tools: Value,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SchemaAutomation {
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AutomationSchema {
    pub metadata: SchemaMetadata,
    pub system: SchemaSystem,
    pub branch: BranchData,
    pub commit: CommitData,
    pub github: Value,
    pub automation: SchemaAutomation,
}

/// Build the schema. `generated` is the caller's RFC 3339 timestamp.
pub fn automation_schema(request: SchemaRequest, generated: &str) -> AutomationSchema {
    let branch = request.branch_data.full_name();
    let commit = &request.commit_data;
    let commands = vec![
        format!("git checkout -b {branch}"),
        "git add .".to_string(),
        format!("git commit -m \"{}\"", commit.title),
        format!("git push origin {branch}"),
        format!(
            "gh pr create --title \"{}\" --body \"{}\"",
            commit.title, commit.description
        ),
    ];

    AutomationSchema {
        metadata: SchemaMetadata {
            version: SCHEMA_VERSION.to_string(),
            generated: generated.to_string(),
            project: "Briefcase".to_string(),
        },
        system: SchemaSystem {
            tools: request.system_check,
            requirements: REQUIREMENTS.iter().map(|s| s.to_string()).collect(),
        },
        branch: request.branch_data,
        commit: request.commit_data,
        github: request.github_data,
        automation: SchemaAutomation { commands },
    }
}
