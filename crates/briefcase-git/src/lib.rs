//! Git, GitHub CLI and desktop-tool integration for Briefcase.
//!
//! All external programs are reached through [`runner::CommandRunner`], so every
//! component here can be driven by [`runner::MockRunner`] in tests.

pub mod desktop;
pub mod discover;
pub mod executor;
pub mod inspect;
pub mod runner;
pub mod suggest;
pub mod tools;

pub use executor::{FlowSpec, PullRequestOptions, WorkflowExecutor};
pub use inspect::inspect;
pub use runner::{CommandError, CommandOutput, CommandRunner, MockRunner, ProcessRunner};
pub use suggest::{suggest_commit, CommitSuggestion, Suggestion};
