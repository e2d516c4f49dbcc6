//! Waitlist errors

use thiserror::Error;

/// Why a submission did not go through
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    // Validation errors
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    // Flow errors
    #[error("A submission is already in flight")]
    AlreadySubmitting,

    #[error("The waitlist form was already submitted")]
    AlreadySubmitted,

    // Delivery errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Endpoint rejected the submission with status {0}")]
    Rejected(u16),
}

impl SubmitError {
    /// Rejected by validation before anything was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::MissingField(_) | SubmitError::InvalidEmail)
    }
}

/// Result type for waitlist operations
pub type SubmitResult<T> = Result<T, SubmitError>;
