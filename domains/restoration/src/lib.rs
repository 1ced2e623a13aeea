//! Restoration domain: job state machine and flow orchestration

pub mod domain;
pub mod flow;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{PendingSubmission, RestorationMode, SourceImage};
pub use domain::state::{JobEvent, JobState, JobStateMachine};
pub use flow::{PollPolicy, ProgressFn, RestorationFlow, SubmitOutcome};
