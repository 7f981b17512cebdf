//! Geometric transforms of whole buffers.
//!
//! Every transform moves whole pixels, so it works on any sample kind and
//! applies to every frame. Profile and frame metadata are carried; quarter
//! turns swap the horizontal and vertical resolution.
//!
//! # Operations
//!
//! - [`crop`] - Region of interest, zero-filled outside the source
//! - [`flip_left_right`], [`flip_up_down`] - Mirrors
//! - [`rotate90`] - Quarter turn counterclockwise
//! - [`unrotate90`] - Quarter turn clockwise
//! - [`rotate180`] - Half turn
//! - [`transpose`] - Swap rows and columns

use scanbuf_core::{Error, PixelBuffer, Resolution};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Builds a `rows x cols` buffer whose pixel `(r, c)` is source pixel
/// `source(r, c)`.
fn remap<F>(buffer: &PixelBuffer, rows: usize, cols: usize, swap_axes: bool, source: F) -> OpsResult<PixelBuffer>
where
    F: Fn(usize, usize) -> (usize, usize),
{
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    let mut out = PixelBuffer::try_new(rows, cols, buffer.channels(), buffer.kind(), buffer.frames())?;
    out.copy_metadata_from(buffer);
    if swap_axes {
        let res = buffer.resolution();
        out.set_resolution(Resolution { x: res.y, y: res.x });
    }

    let px = buffer.channels() * buffer.bytes_per_sample();
    for frame in 0..buffer.frames() {
        for r in 0..rows {
            let dst = out.scan_line_mut(r, frame);
            for c in 0..cols {
                let (sr, sc) = source(r, c);
                let from = &buffer.scan_line(sr, frame)[sc * px..(sc + 1) * px];
                dst[c * px..(c + 1) * px].copy_from_slice(from);
            }
        }
    }
    Ok(out)
}

/// Cuts a `rows x cols` region whose top-left corner sits at
/// `(top, left)` in the source.
///
/// The origin may be negative and the region may extend past the source;
/// uncovered pixels are zero.
pub fn crop(buffer: &PixelBuffer, top: isize, left: isize, rows: usize, cols: usize) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if rows == 0 || cols == 0 {
        return Err(OpsError::InvalidDimensions(format!("crop of {rows}x{cols}")));
    }
    trace!(top, left, rows, cols, "crop");
    let mut out = PixelBuffer::try_new(rows, cols, buffer.channels(), buffer.kind(), buffer.frames())?;
    out.copy_metadata_from(buffer);

    // Overlap of the region with the source, in source coordinates.
    let r0 = top.max(0);
    let r1 = (top + rows as isize).min(buffer.rows() as isize);
    let c0 = left.max(0);
    let c1 = (left + cols as isize).min(buffer.cols() as isize);
    if r0 >= r1 || c0 >= c1 {
        return Ok(out);
    }

    let px = buffer.channels() * buffer.bytes_per_sample();
    let (dc, len) = ((c0 - left) as usize * px, (c1 - c0) as usize * px);
    for frame in 0..buffer.frames() {
        for sr in r0..r1 {
            let src = &buffer.scan_line(sr as usize, frame)[c0 as usize * px..][..len];
            out.scan_line_mut((sr - top) as usize, frame)[dc..dc + len].copy_from_slice(src);
        }
    }
    Ok(out)
}

/// Mirrors columns.
pub fn flip_left_right(buffer: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let w = buffer.cols();
    remap(buffer, buffer.rows(), w, false, |r, c| (r, w - 1 - c))
}

/// Mirrors rows.
pub fn flip_up_down(buffer: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let h = buffer.rows();
    remap(buffer, h, buffer.cols(), false, |r, c| (h - 1 - r, c))
}

/// Rotates a quarter turn counterclockwise.
///
/// The source's top-right corner becomes the top-left corner.
pub fn rotate90(buffer: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let w = buffer.cols();
    remap(buffer, w, buffer.rows(), true, |r, c| (c, w - 1 - r))
}

/// Rotates a quarter turn clockwise, undoing [`rotate90`].
pub fn unrotate90(buffer: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let h = buffer.rows();
    remap(buffer, buffer.cols(), h, true, |r, c| (h - 1 - c, r))
}

/// Rotates a half turn.
pub fn rotate180(buffer: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let (h, w) = (buffer.rows(), buffer.cols());
    remap(buffer, h, w, false, |r, c| (h - 1 - r, w - 1 - c))
}

/// Swaps rows and columns.
pub fn transpose(buffer: &PixelBuffer) -> OpsResult<PixelBuffer> {
    remap(buffer, buffer.cols(), buffer.rows(), true, |r, c| (c, r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanbuf_core::SampleKind;

    /// 2 rows x 3 cols, one channel, values 1..=6 row-major.
    fn small() -> PixelBuffer {
        let mut buf = PixelBuffer::new(2, 3, 1, SampleKind::U16, 1);
        buf.samples_mut::<u16>().unwrap().copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        buf.set_resolution(Resolution { x: 300.0, y: 150.0 });
        buf
    }

    fn values(buf: &PixelBuffer) -> Vec<u16> {
        buf.samples::<u16>().unwrap().to_vec()
    }

    #[test]
    fn test_flips() {
        assert_eq!(values(&flip_left_right(&small()).unwrap()), vec![3, 2, 1, 6, 5, 4]);
        assert_eq!(values(&flip_up_down(&small()).unwrap()), vec![4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_quarter_turns() {
        let ccw = rotate90(&small()).unwrap();
        assert_eq!((ccw.rows(), ccw.cols()), (3, 2));
        assert_eq!(values(&ccw), vec![3, 6, 2, 5, 1, 4]);
        assert_eq!(ccw.resolution(), Resolution { x: 150.0, y: 300.0 });

        let cw = unrotate90(&small()).unwrap();
        assert_eq!(values(&cw), vec![4, 1, 5, 2, 6, 3]);

        assert_eq!(unrotate90(&ccw).unwrap(), small());
    }

    #[test]
    fn test_half_turn_and_transpose() {
        assert_eq!(values(&rotate180(&small()).unwrap()), vec![6, 5, 4, 3, 2, 1]);
        let t = transpose(&small()).unwrap();
        assert_eq!(values(&t), vec![1, 4, 2, 5, 3, 6]);
        assert_eq!(transpose(&t).unwrap(), small());
    }

    #[test]
    fn test_crop_inside_and_outside() {
        let inner = crop(&small(), 0, 1, 2, 2).unwrap();
        assert_eq!(values(&inner), vec![2, 3, 5, 6]);

        let shifted = crop(&small(), -1, -1, 3, 3).unwrap();
        assert_eq!(values(&shifted), vec![0, 0, 0, 0, 1, 2, 0, 4, 5]);

        let outside = crop(&small(), 10, 10, 2, 2).unwrap();
        assert!(values(&outside).iter().all(|&v| v == 0));
        assert_eq!(outside.resolution(), small().resolution());
    }

    #[test]
    fn test_multi_frame_and_metadata() {
        let mut buf = PixelBuffer::new(2, 2, 3, SampleKind::U8, 2);
        for (i, v) in buf.data_mut().iter_mut().enumerate() {
            *v = i as u8;
        }
        buf.frame_meta_mut(1).unwrap().tag = "back".into();
        let out = rotate180(&buf).unwrap();
        assert_eq!(out.frame_meta(1).unwrap().tag, "back");
        // Last pixel of frame 1 becomes its first.
        assert_eq!(&out.frame(1)[..3], &buf.frame(1)[9..12]);
        assert_eq!(rotate180(&out).unwrap(), buf);
    }
}
