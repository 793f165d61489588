pub mod analysis;
pub mod schema;
pub mod synth;
pub mod types;

pub use analysis::{classify, ChangeAnalysis, ChangeSet, Classification};
pub use synth::synthesize;
pub use types::*;
