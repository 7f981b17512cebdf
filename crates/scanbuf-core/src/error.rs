//! Error types for scanbuf-core operations.
//!
//! The [`Error`] enum covers the failure modes of buffer construction,
//! profile parsing and pixel conversion. Allocation failure is *not* an
//! error here: [`PixelBuffer::new`](crate::PixelBuffer::new) returns a buffer
//! in the invalid state instead, and callers check
//! [`is_valid`](crate::PixelBuffer::is_valid).
//!
//! # Usage
//!
//! ```rust
//! use scanbuf_core::{Error, Result};
//!
//! fn check_frame(frame: usize, frames: usize) -> Result<()> {
//!     if frame >= frames {
//!         return Err(Error::FrameOutOfRange { frame, frames });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in buffer and conversion operations.
///
/// # Categories
///
/// - **Shape errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`DimensionMismatch`](Error::DimensionMismatch), [`FrameOutOfRange`](Error::FrameOutOfRange)
/// - **Buffer state**: [`InvalidBuffer`](Error::InvalidBuffer)
/// - **Profile errors**: [`InvalidProfile`](Error::InvalidProfile), [`ChannelMismatch`](Error::ChannelMismatch)
/// - **Capability errors**: [`Unsupported`](Error::Unsupported)
#[derive(Debug, Error)]
pub enum Error {
    /// Requested dimensions are zero or overflow the size product.
    #[error("invalid dimensions: {rows}x{cols}x{channels} ({reason})")]
    InvalidDimensions {
        /// Requested rows
        rows: usize,
        /// Requested columns
        cols: usize,
        /// Requested channels
        channels: usize,
        /// Why the shape was rejected
        reason: String,
    },

    /// Operation was given a buffer whose allocation failed.
    ///
    /// Any buffer produced by a failed [`PixelBuffer::new`](crate::PixelBuffer::new)
    /// is in this state; operations that need pixel memory refuse it.
    #[error("buffer is not allocated")]
    InvalidBuffer,

    /// Two buffers must share a shape but do not.
    #[error("dimension mismatch: {a_rows}x{a_cols} vs {b_rows}x{b_cols}")]
    DimensionMismatch {
        /// First buffer rows
        a_rows: usize,
        /// First buffer columns
        a_cols: usize,
        /// Second buffer rows
        b_rows: usize,
        /// Second buffer columns
        b_cols: usize,
    },

    /// Frame index past the end of the buffer.
    #[error("frame {frame} out of range for {frames} frames")]
    FrameOutOfRange {
        /// Requested frame
        frame: usize,
        /// Frames in the buffer
        frames: usize,
    },

    /// Profile blob failed header validation.
    #[error("invalid color profile: {0}")]
    InvalidProfile(String),

    /// Profile channel count disagrees with the buffer.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch {
        /// Channels required
        expected: usize,
        /// Channels provided
        got: usize,
    },

    /// The named operation exists but has no implementation.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(
        rows: usize,
        cols: usize,
        channels: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDimensions {
            rows,
            cols,
            channels,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error from `(rows, cols)` pairs.
    #[inline]
    pub fn dimension_mismatch(a: (usize, usize), b: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            a_rows: a.0,
            a_cols: a.1,
            b_rows: b.0,
            b_cols: b.1,
        }
    }

    /// Creates an [`Error::Unsupported`] error.
    #[inline]
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported(what.into())
    }

    /// Returns `true` for shape-related errors.
    #[inline]
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::DimensionMismatch { .. } | Self::FrameOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch() {
        let err = Error::dimension_mismatch((100, 100), (200, 50));
        let msg = err.to_string();
        assert!(msg.contains("100x100"));
        assert!(msg.contains("200x50"));
        assert!(err.is_shape_error());
    }

    #[test]
    fn test_unsupported() {
        let err = Error::unsupported("error diffusion");
        assert!(err.to_string().contains("error diffusion"));
        assert!(!err.is_shape_error());
    }
}
