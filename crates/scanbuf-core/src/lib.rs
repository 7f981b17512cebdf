//! # scanbuf-core
//!
//! Pixel buffers for scanned and acquired imagery.
//!
//! This crate provides the foundation the rest of the workspace builds on:
//!
//! - [`PixelBuffer`] - Aligned multi-frame sample arena with stride accessors
//! - [`SharedBuffer`] - Copy-on-write handle for buffers passed by value
//! - [`SampleKind`], [`Sample`] - The three sample depths (u8, u16, f32)
//! - [`ColorProfile`] - Embedded ICC blob with channel-count and photometric tables
//! - [`FrameMetadata`] - Per-frame tag, anchor, elapsed time, XML and parent name
//! - [`convert`] - Depth conversion, inversion and binarization
//! - [`kernel`] - Element-wise loops, scalar or wide-lane
//!
//! ## Example
//!
//! ```rust
//! use scanbuf_core::{PixelBuffer, SampleKind};
//!
//! let mut buf = PixelBuffer::new(100, 100, 3, SampleKind::U8, 1);
//! buf.data_mut().fill(10);
//!
//! let inverted = buf.invert()?;
//! assert!(inverted.data().iter().all(|&v| v == 245));
//!
//! let float = buf.to_f32()?;
//! assert!((float.samples::<f32>().unwrap()[0] - 10.0 / 255.0).abs() < 1e-6);
//! # Ok::<(), scanbuf_core::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! scanbuf-core (this crate)
//!    ^
//!    +-- scanbuf-icc (lcms2 transforms, standard profiles, catalog)
//!    +-- scanbuf-io  (multi-directory container codec)
//!    +-- scanbuf-ops (resampling, geometry, preview)
//! ```
//!
//! ## Feature Flags
//!
//! - `simd` - Wide-lane kernels via `wide` (enabled by default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod convert;
pub mod error;
pub mod format;
pub mod kernel;
pub mod metadata;
pub mod profile;
pub mod shared;

pub use buffer::{PixelBuffer, default_photometric};
pub use convert::BinaryMethod;
pub use error::{Error, Result};
pub use format::{Sample, SampleKind};
pub use metadata::{FrameMetadata, Resolution, UNDEFINED_TAG};
pub use profile::{ColorProfile, channel_count_of, photometric, photometric_tag_of};
pub use shared::SharedBuffer;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::convert::BinaryMethod;
    pub use crate::error::{Error, Result};
    pub use crate::format::{Sample, SampleKind};
    pub use crate::metadata::{FrameMetadata, Resolution};
    pub use crate::profile::ColorProfile;
    pub use crate::shared::SharedBuffer;
}
