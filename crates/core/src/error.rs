//! Error type for the wind-trails engine
//!
//! Only load, configuration and buffer plumbing can fail. Sampling outside the
//! data is a value ([`crate::grid::WindSample::NoData`]), never an error.

use crate::core_types::LevelId;
use thiserror::Error;

/// Errors surfaced by field loading, configuration and buffer serialization
#[derive(Debug, Error)]
pub enum WindError {
    /// A level payload is malformed (missing arrays, bad axes, non-JSON)
    #[error("invalid payload for level {level}: {message}")]
    Schema { level: LevelId, message: String },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A level name that is not one of `surface`, `850`, `700`, `500`
    #[error("unknown wind level '{0}'")]
    UnknownLevel(String),

    /// Caller-provided output buffer has the wrong length
    #[error("buffer length mismatch: expected {expected} scalars, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// A level was submitted that the load never requested
    #[error("level {level} was not requested by load generation {generation}")]
    UnexpectedLevel { level: LevelId, generation: u64 },

    /// No pending load with this generation (already installed, discarded or abandoned)
    #[error("no pending load for generation {0}")]
    UnknownGeneration(u64),

    /// The field provider could not deliver a level
    #[error("provider failed for level {level}: {message}")]
    Provider { level: LevelId, message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = WindError> = std::result::Result<T, E>;
