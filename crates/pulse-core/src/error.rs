//! Error types for the hero stage

use thiserror::Error;

use crate::Actor;

/// Core stage errors
#[derive(Error, Debug)]
pub enum PulseError {
    // Asset errors
    #[error("No poses configured for the {0} actor")]
    EmptyPoseList(Actor),

    #[error("Unknown pose {index} for the {actor} actor")]
    UnknownPose { actor: Actor, index: usize },

    #[error("Asset load failed: {0}")]
    AssetLoad(String),

    #[error("Malformed animation payload: {0}")]
    MalformedPayload(String),

    // Lifecycle errors
    #[error("Stage is not mounted")]
    NotMounted,
}

/// Result type for stage operations
pub type PulseResult<T> = Result<T, PulseError>;
