//! Common error types and handling for Relume

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Relume application
///
/// The restoration flow catches every remote failure at its boundary and
/// classifies it into one of these variants; nothing propagates past the
/// orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient energy: need {required}, have {available}")]
    InsufficientCredit { required: u32, available: u32 },

    #[error("Credential rejected: {0}")]
    CredentialInvalid(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the error code for surfacing to the UI layer
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::InsufficientCredit { .. } => "INSUFFICIENT_ENERGY",
            Error::CredentialInvalid(_) => "CREDENTIAL_INVALID",
            Error::Service(_) => "SERVICE_ERROR",
            Error::EmptyResult(_) => "EMPTY_RESULT",
            Error::Timeout(_) => "TIMEOUT",
            Error::Conflict(_) => "CONFLICT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this failure class should be retried with a fresh credential
    pub fn is_credential(&self) -> bool {
        matches!(self, Error::CredentialInvalid(_))
    }

    /// Whether this failure is a transient remote condition the user may
    /// simply retry. Empty results and polling timeouts are treated as
    /// transient per the error policy.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Service(_) | Error::EmptyResult(_) | Error::Timeout(_)
        )
    }
}
