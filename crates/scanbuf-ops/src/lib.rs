//! # scanbuf-ops
//!
//! Operations on scanbuf pixel buffers.
//!
//! # Modules
//!
//! - [`resample`] - Separable rescaling with tiled output
//! - [`stream`] - Rescale straight into a container file, cancellable between tiles
//! - [`geometry`] - Crop, flips, quarter turns and transpose
//! - [`channel`] - Channel extraction and sample counts
//! - [`preview`] - Downsized RGB rasters for display
//! - [`compose`] - Concatenation and centered overlay
//! - [`filter`] - Minimum filter and peak envelope
//! - [`lookup`] - Table-driven conversion to float
//! - [`stretch`] - Dithered duplication to a fractional width
//!
//! # Common Operations
//!
//! ## Rescale
//!
//! ```rust
//! use scanbuf_core::{PixelBuffer, SampleKind};
//! use scanbuf_ops::{Algorithm, AspectMode, rescale};
//!
//! let buf = PixelBuffer::new(300, 400, 3, SampleKind::U8, 1);
//! let small = rescale(&buf, 100, 100, AspectMode::KeepFit, Algorithm::Cubic)?;
//! assert_eq!((small.rows(), small.cols()), (75, 100));
//! # Ok::<(), scanbuf_ops::OpsError>(())
//! ```
//!
//! ## Stream to disk
//!
//! ```rust,no_run
//! use scanbuf_ops::{Algorithm, AspectMode, CancelToken, rescale_to_disk};
//! # let buf = scanbuf_core::PixelBuffer::new(8, 8, 1, scanbuf_core::SampleKind::U16, 1);
//!
//! let cancel = CancelToken::new();
//! let report = rescale_to_disk(&buf, "out.tif", 4000, 6000, AspectMode::Ignore, Algorithm::Lanczos3, &cancel)?;
//! println!("{} tiles, peak {} bytes", report.tiles, report.peak_tile_bytes);
//! # Ok::<(), scanbuf_ops::OpsError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod channel;
pub mod compose;
pub mod filter;
pub mod geometry;
pub mod lookup;
pub mod preview;
pub mod resample;
pub mod stream;
pub mod stretch;

pub use channel::{count_nonzero, extract_channel};
pub use compose::{Orientation, concat, superimpose};
pub use error::{OpsError, OpsResult};
pub use filter::{min_area_filter, peak_envelope};
pub use geometry::{crop, flip_left_right, flip_up_down, rotate90, rotate180, transpose, unrotate90};
pub use lookup::convert_to_float_by_table;
pub use preview::{RgbRaster, preview};
pub use resample::{
    Algorithm, AspectMode, ResamplePlan, Scratch, SourceWindow, convert_resolution, rescale, target_size,
};
pub use stream::{CancelToken, RescaleReport, Tile, TileProgress, rescale_to_disk, rescale_to_disk_with};
pub use stretch::stretch;
