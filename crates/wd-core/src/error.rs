//! Error types for WaveDesk

use thiserror::Error;

use crate::{ClipId, LabelKey};

/// Core error type
#[derive(Error, Debug)]
pub enum WdError {
    #[error("Invalid time range: start {start} must be before end {end}")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("Track index {0} out of range")]
    TrackOutOfRange(usize),

    #[error("Clip {0} not found")]
    ClipNotFound(ClipId),

    #[error("Label {0} not found")]
    LabelNotFound(LabelKey),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type WdResult<T> = Result<T, WdError>;
