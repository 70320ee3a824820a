//! Error types for the biopulse system.
//!
//! One unified [`BiopulseError`] covers the three places the system can
//! actually fail: the sample source boundary, session export, and the
//! webhook upload. The pipeline itself never errors — transient numeric
//! degeneracies (undersized buffers, flat ranges, zero time deltas) are
//! handled by skipping the dependent computation for that tick.

use thiserror::Error;

/// A specialized `Result` type for biopulse operations.
pub type Result<T> = std::result::Result<T, BiopulseError>;

/// Top-level error type for the biopulse system.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BiopulseError {
    /// The sample source failed or disconnected.
    #[error("Sample source error: {message}")]
    Source {
        /// Description of the source failure
        message: String,
    },

    /// Session CSV export failed.
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    /// Filesystem error during export.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Webhook delivery failed. Caught and logged at the collaborator
    /// boundary; never propagated into the pipeline.
    #[error("Upload error: {message}")]
    Upload {
        /// Description of the upload failure
        message: String,
    },

    /// An operation was invoked in the wrong state.
    #[error("Invalid state: expected {expected}, found {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },
}

impl BiopulseError {
    /// Creates a new source error.
    #[must_use]
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Creates a new upload error.
    #[must_use]
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    /// Creates a new invalid state error.
    #[must_use]
    pub fn invalid_state(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns `true` if retrying the operation could succeed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Upload { .. } => true,
            Self::Source { .. } | Self::Export(_) | Self::Io(_) | Self::InvalidState { .. } => {
                false
            }
        }
    }
}
