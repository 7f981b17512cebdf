//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors that can occur during ICC operations.
#[derive(Debug, Error)]
pub enum IccError {
    /// Failed to load profile from file.
    #[error("failed to load profile: {0}")]
    LoadFailed(String),

    /// Failed to create or serialize a profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),

    /// Invalid profile data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// Source and destination row counts differ.
    #[error("row mismatch: source has {src} rows, destination {dst}")]
    RowMismatch {
        /// Source rows.
        src: usize,
        /// Destination rows.
        dst: usize,
    },

    /// Buffer error from scanbuf-core.
    #[error(transparent)]
    Core(#[from] scanbuf_core::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
