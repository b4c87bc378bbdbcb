//! Error types shared by the engine, the session store and the API.
//!
//! Degenerate geometry (collinear triples, shared-y breakpoints) is handled
//! inside the sweep and never reaches this layer.

use crate::session::SessionId;
use thiserror::Error;

/// Errors surfaced to callers of the core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VoronoiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid step: {0}")]
    InvalidStep(#[from] StepError),

    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Why a navigation or session operation was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("already at the first checkpoint")]
    AtStart,

    #[error("unknown or expired session {0}")]
    UnknownSession(SessionId),

    #[error("construction is not completed yet")]
    NotCompleted,
}

impl VoronoiError {
    /// Stable short code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidStep(StepError::AtStart) => "AT_START",
            Self::InvalidStep(StepError::UnknownSession(_)) => "UNKNOWN_SESSION",
            Self::InvalidStep(StepError::NotCompleted) => "NOT_COMPLETED",
            Self::ResourceExhausted(_) => "RESOURCE_EXHAUSTED",
            Self::Config(_) => "CONFIG",
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, VoronoiError>;
