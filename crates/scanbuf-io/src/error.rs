//! Error types for container I/O.

use std::io;
use thiserror::Error;

/// Result type for container operations.
pub type IoResult<T> = Result<T, IoError>;

/// Container I/O error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File could not be opened, created, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Not a container file, or its structure is broken.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Compressed strip data could not be decoded.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Data could not be written in the requested layout.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// File uses a feature this codec does not read.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A count or offset in the file overflows or points outside it.
    #[error("malformed file: {0}")]
    Malformed(String),

    /// Requested directory does not exist.
    #[error("directory {index} out of range ({count} in file)")]
    DirectoryOutOfRange {
        /// Requested index.
        index: usize,
        /// Directories in the file.
        count: usize,
    },

    /// A directory field disagrees with the buffer it should fill.
    #[error("field mismatch in {field}: buffer has {expected}, file has {actual}")]
    FieldMismatch {
        /// Field name.
        field: &'static str,
        /// Buffer value.
        expected: u64,
        /// File value.
        actual: u64,
    },

    /// Streaming write was stopped before the directory was complete.
    #[error("directory incomplete: {written} of {expected} rows written")]
    Incomplete {
        /// Rows written.
        written: usize,
        /// Rows declared.
        expected: usize,
    },

    /// Buffer error from scanbuf-core.
    #[error(transparent)]
    Core(#[from] scanbuf_core::Error),
}

impl From<tiff::TiffError> for IoError {
    fn from(err: tiff::TiffError) -> Self {
        match err {
            tiff::TiffError::IoError(e) => Self::Io(e),
            tiff::TiffError::FormatError(e) => Self::InvalidFile(e.to_string()),
            tiff::TiffError::UnsupportedError(e) => Self::UnsupportedFormat(e.to_string()),
            tiff::TiffError::LimitsExceeded => Self::Malformed("field exceeds decoder limits".into()),
            other => Self::DecodeError(other.to_string()),
        }
    }
}

impl IoError {
    /// Creates an [`IoError::InvalidFile`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFile(msg.into())
    }

    /// Creates an [`IoError::Malformed`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Creates an [`IoError::FieldMismatch`].
    pub fn mismatch(field: &'static str, expected: impl Into<u64>, actual: impl Into<u64>) -> Self {
        Self::FieldMismatch {
            field,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
