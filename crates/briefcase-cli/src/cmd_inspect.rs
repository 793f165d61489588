use std::path::Path;

use briefcase_git::suggest::NO_CHANGES_MESSAGE;
use briefcase_git::{inspect, suggest_commit, ProcessRunner, Suggestion};

pub fn inspect_repo(path: &Path) -> anyhow::Result<()> {
    let home = dirs::home_dir();
    let snapshot = tokio::runtime::Runtime::new()?
        .block_on(inspect(&ProcessRunner, path, home.as_deref()));
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Print the plan for the pending changes in `path`. Nothing is committed.
pub fn suggest(path: &Path) -> anyhow::Result<()> {
    let home = dirs::home_dir();
    let suggestion = tokio::runtime::Runtime::new()?
        .block_on(suggest_commit(&ProcessRunner, path, home.as_deref()));
    println!("{}", render(suggestion)?);
    Ok(())
}

fn render(suggestion: Suggestion) -> anyhow::Result<String> {
    match suggestion {
        Suggestion::Ready(s) => Ok(serde_json::to_string_pretty(&*s)?),
        Suggestion::NoChanges { .. } => Ok(NO_CHANGES_MESSAGE.to_string()),
        Suggestion::Failed { message } => anyhow::bail!(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use briefcase_core::RepositorySnapshot;

    #[test]
    fn no_changes_renders_message() {
        let out = render(Suggestion::NoChanges {
            repository: RepositorySnapshot::not_a_repository("/w", "w"),
        })
        .unwrap();
        assert_eq!(out, NO_CHANGES_MESSAGE);
    }

    #[test]
    fn failure_is_an_error() {
        let err = render(Suggestion::Failed {
            message: "Failed to generate intelligent commit: boom".into(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
