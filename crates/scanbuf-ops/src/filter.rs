//! Neighbourhood filters.
//!
//! # Operations
//!
//! - [`min_area_filter`] - Minimum over a square window
//! - [`peak_envelope`] - Rolling-ball upper envelope of 16-bit height scans

use scanbuf_core::{Error, PixelBuffer, Sample, SampleKind};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Replaces every sample by the minimum of its channel over the
/// `(2 * radius + 1)` square around it.
///
/// The window is clamped at the borders. Radius 0 is a copy.
pub fn min_area_filter(buffer: &PixelBuffer, radius: usize) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    trace!(radius, kind = %buffer.kind(), "min area filter");
    let mut out = buffer.clone();
    if radius == 0 {
        return Ok(out);
    }
    for frame in 0..buffer.frames() {
        match buffer.kind() {
            SampleKind::U8 => min_frame::<u8>(buffer, &mut out, frame, radius)?,
            SampleKind::U16 => min_frame::<u16>(buffer, &mut out, frame, radius)?,
            SampleKind::F32 => min_frame::<f32>(buffer, &mut out, frame, radius)?,
        }
    }
    Ok(out)
}

fn min_frame<T: Sample>(src: &PixelBuffer, out: &mut PixelBuffer, frame: usize, radius: usize) -> OpsResult<()> {
    let (rows, cols, ch) = (src.rows(), src.cols(), src.channels());
    let from = src.frame_samples::<T>(frame).ok_or(Error::InvalidBuffer)?;
    let to = out.frame_samples_mut::<T>(frame).ok_or(Error::InvalidBuffer)?;
    let line = cols * ch;

    // Rows first into `across`, then columns of `across` into the output.
    let mut across = vec![T::default(); from.len()];
    for r in 0..rows {
        for c in 0..cols {
            let (lo, hi) = (c.saturating_sub(radius), (c + radius).min(cols - 1));
            for k in 0..ch {
                let mut m = from[r * line + lo * ch + k];
                for cc in lo + 1..=hi {
                    let v = from[r * line + cc * ch + k];
                    if v < m {
                        m = v;
                    }
                }
                across[r * line + c * ch + k] = m;
            }
        }
    }
    for r in 0..rows {
        let (lo, hi) = (r.saturating_sub(radius), (r + radius).min(rows - 1));
        for i in 0..line {
            let mut m = across[lo * line + i];
            for rr in lo + 1..=hi {
                let v = across[rr * line + i];
                if v < m {
                    m = v;
                }
            }
            to[r * line + i] = m;
        }
    }
    Ok(())
}

/// Upper envelope traced by a ball of `radius` rolled over each row.
///
/// Samples are heights: column `c` sits at `c * dx`, value `v` at `v * dy`.
/// Only single-channel 16-bit buffers are accepted. Samples at 0 or 65535
/// mark missing data; they neither support the ball nor change.
pub fn peak_envelope(buffer: &PixelBuffer, dx: f32, dy: f32, radius: f32) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if buffer.channels() != 1 || buffer.kind() != SampleKind::U16 {
        return Err(OpsError::InvalidParameter(format!(
            "peak envelope needs one 16-bit channel, got {} of {}",
            buffer.channels(),
            buffer.kind()
        )));
    }
    if !(dx > 0.0 && dy > 0.0 && radius >= 0.0) {
        return Err(OpsError::InvalidParameter(format!("dx {dx}, dy {dy}, radius {radius}")));
    }
    let reach = (radius / dx).floor() as usize;
    trace!(dx, dy, radius, reach, "peak envelope");

    let cols = buffer.cols();
    let mut out = buffer.clone();
    let mut centers = vec![0f32; cols];
    let mut lower = vec![0f32; cols];
    for frame in 0..buffer.frames() {
        for row in 0..buffer.rows() {
            let line = buffer.row_samples::<u16>(row, frame).ok_or(Error::InvalidBuffer)?;

            // Highest ball center above each column resting on some sample.
            centers.fill(-1e6);
            for (c, &v) in line.iter().enumerate() {
                if v == 0 || v == u16::MAX {
                    continue;
                }
                let y = v as f32 * dy;
                for p in c.saturating_sub(reach)..=(c + reach).min(cols - 1) {
                    let d = p.abs_diff(c) as f32 * dx;
                    let center = y + (radius * radius - d * d).max(0.0).sqrt();
                    if center > centers[p] {
                        centers[p] = center;
                    }
                }
            }

            // Lowest point of any ball over each column.
            lower.fill(1e6);
            for (c, &center) in centers.iter().enumerate() {
                if center < -1e5 {
                    continue;
                }
                for p in c.saturating_sub(reach)..=(c + reach).min(cols - 1) {
                    let d = p.abs_diff(c) as f32 * dx;
                    let y = center - (radius * radius - d * d).max(0.0).sqrt();
                    if y < lower[p] {
                        lower[p] = y;
                    }
                }
            }

            let start = row * cols;
            let dst = &mut out.frame_samples_mut::<u16>(frame).ok_or(Error::InvalidBuffer)?[start..start + cols];
            for (v, &y) in dst.iter_mut().zip(&lower) {
                if *v != 0 && *v != u16::MAX {
                    *v = (y / dy).round().clamp(0.0, 65535.0) as u16;
                }
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_area_filter() {
        let mut buf = PixelBuffer::new(3, 4, 2, SampleKind::U8, 1);
        for (i, v) in buf.samples_mut::<u8>().unwrap().iter_mut().enumerate() {
            *v = 100 + i as u8;
        }
        buf.samples_mut::<u8>().unwrap()[2 * 8 + 3 * 2 + 1] = 3;

        let out = min_area_filter(&buf, 1).unwrap();
        let s = out.samples::<u8>().unwrap();
        // Channel 0 of pixel (1, 1) sees (0, 0).
        assert_eq!(s[8 + 2], 100);
        // Channel 1 of every pixel in reach of (2, 3) sees the 3.
        assert_eq!(s[8 + 2 * 2 + 1], 3);
        assert_eq!(s[2 * 8 + 2 * 2 + 1], 3);
        assert_eq!(s[1], 101);
        // Channels stay apart.
        assert_eq!(s[2 * 8 + 3 * 2], 100 + 8 + 4);
    }

    #[test]
    fn test_min_area_filter_float_frames() {
        let mut buf = PixelBuffer::new(2, 2, 1, SampleKind::F32, 2);
        buf.frame_samples_mut::<f32>(1).unwrap().copy_from_slice(&[0.5, 0.25, 0.75, 1.0]);
        let out = min_area_filter(&buf, 5).unwrap();
        assert!(out.frame_samples::<f32>(0).unwrap().iter().all(|&v| v == 0.0));
        assert!(out.frame_samples::<f32>(1).unwrap().iter().all(|&v| v == 0.25));
        assert_eq!(min_area_filter(&buf, 0).unwrap().samples::<f32>(), buf.samples::<f32>());
    }

    #[test]
    fn test_peak_envelope_bridges_dip() {
        let mut buf = PixelBuffer::new(1, 7, 1, SampleKind::U16, 1);
        buf.samples_mut::<u16>().unwrap().copy_from_slice(&[100, 100, 50, 100, 100, 0, 65535]);
        let out = peak_envelope(&buf, 1.0, 1.0, 2.0).unwrap();
        let s = out.samples::<u16>().unwrap();
        assert!((99..=100).contains(&s[2]), "{s:?}");
        for (o, i) in s.iter().zip(buf.samples::<u16>().unwrap()) {
            assert!(o >= i);
        }
        assert_eq!(&s[5..], &[0, 65535]);
    }

    #[test]
    fn test_peak_envelope_rejects_other_formats() {
        let buf = PixelBuffer::new(1, 4, 1, SampleKind::U8, 1);
        assert!(matches!(peak_envelope(&buf, 1.0, 1.0, 2.0), Err(OpsError::InvalidParameter(_))));
        let buf = PixelBuffer::new(1, 4, 3, SampleKind::U16, 1);
        assert!(peak_envelope(&buf, 1.0, 1.0, 2.0).is_err());
        let buf = PixelBuffer::new(1, 4, 1, SampleKind::U16, 1);
        assert!(peak_envelope(&buf, 0.0, 1.0, 2.0).is_err());
    }
}
