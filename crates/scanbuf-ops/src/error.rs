//! Error types for buffer operations.

use thiserror::Error;

/// Error type for buffer operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Streaming rescale was cancelled between tiles.
    #[error("cancelled after {rows_written} rows in {tiles} tiles")]
    Cancelled {
        /// Rows written to the last directory before stopping.
        rows_written: usize,
        /// Tiles completed across all frames.
        tiles: usize,
    },

    /// Buffer error.
    #[error(transparent)]
    Core(#[from] scanbuf_core::Error),

    /// Container error.
    #[error(transparent)]
    Io(#[from] scanbuf_io::IoError),

    /// Color management error.
    #[error(transparent)]
    Icc(#[from] scanbuf_icc::IccError),
}

/// Result type for buffer operations.
pub type OpsResult<T> = Result<T, OpsError>;
