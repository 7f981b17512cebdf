//! Downsized RGB rasters for display.

use scanbuf_core::{Error, PixelBuffer, SampleKind, photometric};
use scanbuf_icc::{Intent, convert_to_profile, srgb_profile};
use tracing::debug;

use crate::resample::{Algorithm, AspectMode, rescale};
use crate::{OpsError, OpsResult};

/// Packed 8-bit RGB pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbRaster {
    /// Height in pixels.
    pub rows: usize,
    /// Width in pixels.
    pub cols: usize,
    /// `rows * cols * 3` bytes.
    pub pixels: Vec<u8>,
}

impl RgbRaster {
    /// One pixel, `None` when out of range.
    pub fn rgb(&self, row: usize, col: usize) -> Option<[u8; 3]> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let i = (row * self.cols + col) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    /// A 3-channel 8-bit buffer carrying the sRGB profile.
    pub fn to_buffer(&self) -> OpsResult<PixelBuffer> {
        let mut out = PixelBuffer::try_new(self.rows, self.cols, 3, SampleKind::U8, 1)?;
        out.frame_mut(0).copy_from_slice(&self.pixels);
        out.attach_profile(Some(srgb_profile()?));
        Ok(out)
    }
}

/// Renders frame 0 of `buffer` no larger than `max_rows x max_cols`.
///
/// Shrinking keeps the aspect ratio and averages areas; smaller images are
/// not enlarged. Buffers with a profile go through an sRGB conversion.
/// Without one, gray is replicated (inverted for white-is-zero) and wider
/// buffers show their first three channels.
pub fn preview(buffer: &PixelBuffer, max_cols: usize, max_rows: usize) -> OpsResult<RgbRaster> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if max_cols == 0 || max_rows == 0 {
        return Err(OpsError::InvalidDimensions(format!("preview bound {max_rows}x{max_cols}")));
    }

    let mut frame = buffer.frame_at(0)?;
    if frame.rows() > max_rows || frame.cols() > max_cols {
        frame = rescale(&frame, max_rows, max_cols, AspectMode::KeepFit, Algorithm::Super)?;
    }
    let mut frame = frame.to_u8()?;
    if frame.profile().is_some() {
        frame = convert_to_profile(&frame, &srgb_profile()?, Intent::Perceptual)?;
    }
    debug!(rows = frame.rows(), cols = frame.cols(), channels = frame.channels(), "preview");

    let (rows, cols, channels) = (frame.rows(), frame.cols(), frame.channels());
    let invert = channels == 1 && frame.photometric() == photometric::MIN_IS_WHITE;
    let mut pixels = Vec::with_capacity(rows * cols * 3);
    for row in 0..rows {
        for px in frame.scan_line(row, 0).chunks_exact(channels) {
            match channels {
                1 | 2 => {
                    let v = if invert { u8::MAX - px[0] } else { px[0] };
                    pixels.extend_from_slice(&[v, v, v]);
                }
                _ => pixels.extend_from_slice(&px[..3]),
            }
        }
    }
    Ok(RgbRaster { rows, cols, pixels })
}
