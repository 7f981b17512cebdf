//! Placing one buffer next to or on top of another.
//!
//! The second operand is brought to the first one's sample kind, and to its
//! color profile when the channel counts disagree, before any pixel moves.
//! The result carries the first operand's metadata.
//!
//! # Operations
//!
//! - [`concat`] - Side by side or stacked, gap and padding in white
//! - [`superimpose`] - Centered paste, clipped to the background

use scanbuf_core::{Error, PixelBuffer, Sample, SampleKind};
use scanbuf_icc::{Intent, convert_to_profile};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Direction in which [`concat`] joins two buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Second buffer to the right of the first.
    #[default]
    Horizontal,
    /// Second buffer below the first.
    Vertical,
}

/// Brings `other` to `like`'s kind and channel count.
fn conform(other: &PixelBuffer, like: &PixelBuffer) -> OpsResult<PixelBuffer> {
    if !other.is_valid() || !like.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    let mut out = if other.channels() == like.channels() {
        other.clone()
    } else {
        let profile = like.profile().ok_or_else(|| {
            OpsError::InvalidParameter(format!(
                "cannot map {} channels onto {} without a target profile",
                other.channels(),
                like.channels()
            ))
        })?;
        convert_to_profile(other, profile, Intent::Perceptual)?
    };
    if out.channels() != like.channels() {
        return Err(OpsError::InvalidParameter(format!(
            "{} channels do not convert to {}",
            out.channels(),
            like.channels()
        )));
    }
    if out.kind() != like.kind() {
        out = out.to_kind(like.kind())?;
    }
    Ok(out)
}

/// Copies frame `src_frame` of `src` into frame `dst_frame` of `dst` with its
/// top-left corner at `(top, left)`, dropping whatever falls outside `dst`.
fn blit(dst: &mut PixelBuffer, dst_frame: usize, src: &PixelBuffer, src_frame: usize, top: isize, left: isize) {
    let r0 = top.max(0);
    let r1 = (top + src.rows() as isize).min(dst.rows() as isize);
    let c0 = left.max(0);
    let c1 = (left + src.cols() as isize).min(dst.cols() as isize);
    if r0 >= r1 || c0 >= c1 {
        return;
    }
    let px = src.channels() * src.bytes_per_sample();
    let from = (c0 - left) as usize * px;
    let len = (c1 - c0) as usize * px;
    for r in r0..r1 {
        let line = &src.scan_line((r - top) as usize, src_frame)[from..from + len];
        dst.scan_line_mut(r as usize, dst_frame)[c0 as usize * px..][..len].copy_from_slice(line);
    }
}

fn fill_white(buffer: &mut PixelBuffer) {
    fn full<T: Sample>(buffer: &mut PixelBuffer) {
        buffer.fill(T::MAX);
    }
    match buffer.kind() {
        SampleKind::U8 => full::<u8>(buffer),
        SampleKind::U16 => full::<u16>(buffer),
        SampleKind::F32 => full::<f32>(buffer),
    }
}

/// Joins `b` to the right of or below `a`, `gap` pixels apart.
///
/// Both must hold the same number of frames. The gap and the uncovered part
/// of the shorter side are full-scale samples.
pub fn concat(a: &PixelBuffer, b: &PixelBuffer, orientation: Orientation, gap: usize) -> OpsResult<PixelBuffer> {
    let b = conform(b, a)?;
    if a.frames() != b.frames() {
        return Err(OpsError::InvalidDimensions(format!(
            "cannot join {} frames with {}",
            a.frames(),
            b.frames()
        )));
    }
    let (rows, cols, at) = match orientation {
        Orientation::Horizontal => {
            (a.rows().max(b.rows()), a.cols() + gap + b.cols(), (0, (a.cols() + gap) as isize))
        }
        Orientation::Vertical => (a.rows() + gap + b.rows(), a.cols().max(b.cols()), ((a.rows() + gap) as isize, 0)),
    };
    trace!(?orientation, gap, rows, cols, "concat");

    let mut out = PixelBuffer::try_new(rows, cols, a.channels(), a.kind(), a.frames())?;
    out.copy_metadata_from(a);
    fill_white(&mut out);
    for frame in 0..a.frames() {
        blit(&mut out, frame, a, frame, 0, 0);
        blit(&mut out, frame, &b, frame, at.0, at.1);
    }
    Ok(out)
}

/// Pastes `fg` centered over `bg`.
///
/// `fg` either has one frame, pasted onto every frame of `bg`, or as many
/// frames as `bg`. Parts of `fg` outside `bg` are dropped.
pub fn superimpose(bg: &PixelBuffer, fg: &PixelBuffer) -> OpsResult<PixelBuffer> {
    let fg = conform(fg, bg)?;
    if fg.frames() != 1 && fg.frames() != bg.frames() {
        return Err(OpsError::InvalidDimensions(format!(
            "cannot paste {} frames over {}",
            fg.frames(),
            bg.frames()
        )));
    }
    let top = (bg.rows() as isize - fg.rows() as isize) / 2;
    let left = (bg.cols() as isize - fg.cols() as isize) / 2;
    trace!(top, left, "superimpose");

    let mut out = bg.clone();
    for frame in 0..bg.frames() {
        let from = if fg.frames() == 1 { 0 } else { frame };
        blit(&mut out, frame, &fg, from, top, left);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanbuf_icc::{gray_profile, srgb_profile};

    fn gray(rows: usize, cols: usize, value: u8) -> PixelBuffer {
        let mut buf = PixelBuffer::new(rows, cols, 1, SampleKind::U8, 1);
        buf.fill(value);
        buf
    }

    #[test]
    fn test_concat_horizontal_pads_white() {
        let out = concat(&gray(2, 2, 10), &gray(3, 1, 20), Orientation::Horizontal, 0).unwrap();
        assert_eq!((out.rows(), out.cols()), (3, 3));
        assert_eq!(out.samples::<u8>().unwrap(), &[10, 10, 20, 10, 10, 20, 255, 255, 20]);
    }

    #[test]
    fn test_concat_gap_is_white() {
        let out = concat(&gray(1, 1, 1), &gray(1, 1, 2), Orientation::Horizontal, 2).unwrap();
        assert_eq!(out.samples::<u8>().unwrap(), &[1, 255, 255, 2]);
        let out = concat(&gray(1, 2, 1), &gray(1, 1, 2), Orientation::Vertical, 1).unwrap();
        assert_eq!(out.samples::<u8>().unwrap(), &[1, 1, 255, 255, 2, 255]);
    }

    #[test]
    fn test_concat_vertical_converts_depth() {
        let mut b = PixelBuffer::new(1, 2, 1, SampleKind::F32, 1);
        b.fill(1.0f32);
        let out = concat(&gray(1, 2, 7), &b, Orientation::Vertical, 0).unwrap();
        assert_eq!(out.kind(), SampleKind::U8);
        assert_eq!(out.samples::<u8>().unwrap(), &[7, 7, 255, 255]);
    }

    #[test]
    fn test_concat_float_padding_is_one() {
        let mut a = PixelBuffer::new(1, 1, 1, SampleKind::F32, 1);
        a.fill(0.25f32);
        let b = PixelBuffer::new(2, 1, 1, SampleKind::F32, 1);
        let out = concat(&a, &b, Orientation::Horizontal, 0).unwrap();
        assert_eq!(out.samples::<f32>().unwrap(), &[0.25, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_concat_rejects_frame_mismatch() {
        let b = PixelBuffer::new(2, 2, 1, SampleKind::U8, 2);
        assert!(matches!(
            concat(&gray(2, 2, 0), &b, Orientation::Horizontal, 0),
            Err(OpsError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_concat_maps_channels_through_profile() {
        let mut a = gray(1, 1, 0);
        assert!(a.attach_profile(Some(gray_profile().unwrap())));
        let mut b = PixelBuffer::new(1, 1, 3, SampleKind::U8, 1);
        assert!(b.attach_profile(Some(srgb_profile().unwrap())));
        b.fill(255u8);
        let out = concat(&a, &b, Orientation::Horizontal, 0).unwrap();
        assert_eq!(out.channels(), 1);
        assert!(out.samples::<u8>().unwrap()[1] > 250);

        assert!(matches!(
            concat(&gray(1, 1, 0), &b, Orientation::Horizontal, 0),
            Err(OpsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_superimpose_centers_and_clips() {
        let out = superimpose(&gray(4, 4, 0), &gray(2, 2, 9)).unwrap();
        let s = out.samples::<u8>().unwrap();
        assert_eq!(&s[4..8], &[0, 9, 9, 0]);
        assert_eq!(&s[8..12], &[0, 9, 9, 0]);
        assert_eq!(s.iter().filter(|&&v| v == 9).count(), 4);

        // Larger foreground: only its middle survives, row 0 included.
        let out = superimpose(&gray(1, 1, 0), &gray(3, 3, 5)).unwrap();
        assert_eq!(out.samples::<u8>().unwrap(), &[5]);
    }

    #[test]
    fn test_superimpose_single_frame_on_every_frame() {
        let bg = PixelBuffer::new(2, 2, 1, SampleKind::U8, 3);
        let out = superimpose(&bg, &gray(2, 2, 4)).unwrap();
        assert!(out.samples::<u8>().unwrap().iter().all(|&v| v == 4));

        let fg = PixelBuffer::new(2, 2, 1, SampleKind::U8, 2);
        assert!(superimpose(&bg, &fg).is_err());
    }
}
