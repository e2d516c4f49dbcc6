//! Stage errors

use thiserror::Error;

use pulse_core::PulseError;
use pulse_waitlist::SubmitError;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Waitlist modal is closed")]
    ModalClosed,

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Pulse(#[from] PulseError),
}

/// Result type for stage operations
pub type StageResult<T> = Result<T, StageError>;
