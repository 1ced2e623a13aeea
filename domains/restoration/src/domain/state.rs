//! Restoration job state machine
//!
//! Defines the valid states of a restoration job, the events that drive
//! it, and the transition table. Succeeded and Failed are terminal: a
//! manual retry is a new job, not a transition out of Failed.

use relume_common::StateError;

/// Restoration job states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    Idle,
    AwaitingCredential,
    Processing,
    Succeeded,
    Failed,
}

impl JobState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [JobState] {
        match self {
            Self::Idle => &[Self::Processing, Self::AwaitingCredential],
            Self::AwaitingCredential => &[Self::Processing],
            Self::Processing => &[Self::Succeeded, Self::Failed, Self::AwaitingCredential],
            Self::Succeeded => &[],
            Self::Failed => &[],
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingCredential => write!(f, "awaiting_credential"),
            Self::Processing => write!(f, "processing"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Events that trigger restoration state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// A submission with a credential present starts processing
    Submit,
    /// No credential is configured; park the submission
    CredentialMissing,
    /// A credential was supplied for a parked submission
    CredentialSupplied,
    /// The remote call produced a usable result
    Success,
    /// The remote call failed (non-credential class)
    Failure,
    /// The remote call rejected the credential; park and wait for a new one
    CredentialRejected,
}

impl std::fmt::Display for JobEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Submit => write!(f, "submit"),
            Self::CredentialMissing => write!(f, "credential_missing"),
            Self::CredentialSupplied => write!(f, "credential_supplied"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::CredentialRejected => write!(f, "credential_rejected"),
        }
    }
}

/// Restoration job state machine
pub struct JobStateMachine;

impl JobStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(current: JobState, event: JobEvent) -> Result<JobState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            // From Idle
            (JobState::Idle, JobEvent::Submit) => JobState::Processing,
            (JobState::Idle, JobEvent::CredentialMissing) => JobState::AwaitingCredential,

            // From AwaitingCredential
            (JobState::AwaitingCredential, JobEvent::CredentialSupplied) => JobState::Processing,

            // From Processing
            (JobState::Processing, JobEvent::Success) => JobState::Succeeded,
            (JobState::Processing, JobEvent::Failure) => JobState::Failed,
            (JobState::Processing, JobEvent::CredentialRejected) => JobState::AwaitingCredential,

            // Invalid transitions
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: JobState, event: &JobEvent) -> bool {
        Self::transition(current, event.clone()).is_ok()
    }
}
