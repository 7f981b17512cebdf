//! Profile-to-profile conversion of pixel buffers.
//!
//! A [`ColorTransform`] is built for one (source profile, destination
//! profile, formats, intent) combination, applied, then dropped. Nothing is
//! cached: the intent may change between calls and a reused transform would
//! silently keep the old one.
//!
//! # Format descriptors
//!
//! Each side is described to lcms2 by a packed word:
//!
//! | Field | Bits | Value |
//! |-------|------|-------|
//! | color space | 16.. | any (0) |
//! | channels | 3..7 | `channels % 16` |
//! | bytes | 0..3 | `bytes % 8` |
//! | flavor | 13 | set for white-is-zero gray |
//! | float | 22 | set for f32 samples |

use lcms2::{PixelFormat, Transform as LcmsTransform};
use scanbuf_core::{ColorProfile, PixelBuffer, SampleKind, photometric};
use tracing::{debug, trace, warn};

use crate::{IccError, IccResult, Intent, Profile};

const FLAVOR_BIT: u32 = 1 << 13;
const FLOAT_BIT: u32 = 1 << 22;

/// One side of a transform: sample layout plus photometric interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    /// Samples per pixel.
    pub channels: usize,
    /// Sample depth.
    pub kind: SampleKind,
    /// Photometric tag; white-is-zero gray sets the flavor bit.
    pub photometric: u16,
}

impl FormatSpec {
    /// Layout of an existing buffer.
    pub fn of(buffer: &PixelBuffer) -> Self {
        Self {
            channels: buffer.channels(),
            kind: buffer.kind(),
            photometric: buffer.photometric(),
        }
    }

    /// Layout a buffer would have after taking on `profile` at depth `kind`.
    pub fn for_profile(profile: &ColorProfile, kind: SampleKind) -> Self {
        Self {
            channels: profile.channels() as usize,
            kind,
            photometric: profile.photometric(),
        }
    }

    /// Packed lcms2 descriptor.
    pub fn packed(&self) -> u32 {
        let mut word = ((self.channels as u32 % 16) << 3) | (self.kind.bytes() as u32 % 8);
        if self.channels == 1 && self.photometric == photometric::MIN_IS_WHITE {
            word |= FLAVOR_BIT;
        }
        if self.kind.is_float() {
            word |= FLOAT_BIT;
        }
        word
    }

    fn bytes_per_pixel(&self) -> usize {
        self.channels * self.kind.bytes()
    }
}

/// A built transform between two buffer layouts.
pub struct ColorTransform {
    inner: LcmsTransform<u8, u8>,
    src: FormatSpec,
    dst: FormatSpec,
}

/// Builds a transform, or `None` when either profile is missing or lcms2
/// refuses the combination.
///
/// `None` means "conversion unavailable": callers skip the conversion or
/// fall back to an identity copy.
pub fn build_transform(
    src_profile: Option<&ColorProfile>,
    dst_profile: Option<&ColorProfile>,
    src: FormatSpec,
    dst: FormatSpec,
    intent: Intent,
) -> Option<ColorTransform> {
    let (Some(src_profile), Some(dst_profile)) = (src_profile, dst_profile) else {
        debug!("transform unavailable: missing profile");
        return None;
    };
    let opened = Profile::from_blob(src_profile).and_then(|s| Profile::from_blob(dst_profile).map(|d| (s, d)));
    let (src_lcms, dst_lcms) = match opened {
        Ok(pair) => pair,
        Err(err) => {
            debug!(%err, "transform unavailable: profile did not parse");
            return None;
        }
    };

    trace!(
        src = format_args!("{:#x}", src.packed()),
        dst = format_args!("{:#x}", dst.packed()),
        ?intent,
        "build transform"
    );
    match LcmsTransform::new(
        &src_lcms.inner,
        PixelFormat(src.packed()),
        &dst_lcms.inner,
        PixelFormat(dst.packed()),
        intent.into(),
    ) {
        Ok(inner) => Some(ColorTransform { inner, src, dst }),
        Err(err) => {
            debug!(%err, "transform refused by color engine");
            None
        }
    }
}

impl ColorTransform {
    /// Source layout.
    pub fn src_format(&self) -> FormatSpec {
        self.src
    }

    /// Destination layout.
    pub fn dst_format(&self) -> FormatSpec {
        self.dst
    }

    /// Converts `src` into `dst`, one scan line at a time.
    ///
    /// Runs `dst.rows()` lines of `dst.cols()` pixels for each frame both
    /// buffers have. Row counts must match; the layouts are whatever the
    /// transform was built for.
    pub fn apply(&self, src: &PixelBuffer, dst: &mut PixelBuffer) -> IccResult<()> {
        if !src.is_valid() || !dst.is_valid() {
            return Err(scanbuf_core::Error::InvalidBuffer.into());
        }
        if src.rows() != dst.rows() {
            return Err(IccError::RowMismatch { src: src.rows(), dst: dst.rows() });
        }
        let cols = dst.cols();
        let src_len = cols * self.src.bytes_per_pixel();
        let dst_len = cols * self.dst.bytes_per_pixel();
        if src_len > src.row_stride() || dst_len > dst.row_stride() {
            return Err(scanbuf_core::Error::dimension_mismatch((src.rows(), src.cols()), (dst.rows(), dst.cols())).into());
        }

        for frame in 0..src.frames().min(dst.frames()) {
            for row in 0..dst.rows() {
                let input = &src.scan_line(row, frame)[..src_len];
                let output = &mut dst.scan_line_mut(row, frame)[..dst_len];
                self.inner.transform_pixels(input, output);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ColorTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorTransform")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish_non_exhaustive()
    }
}

/// Converts a buffer into `profile`'s color space at the same depth.
///
/// The result has `profile`'s channel count and carries `profile`. When no
/// transform can be built (source has no profile, or the engine refuses)
/// the source is returned unchanged as an identity copy, source profile
/// included, and a warning is logged.
pub fn convert_to_profile(buffer: &PixelBuffer, profile: &ColorProfile, intent: Intent) -> IccResult<PixelBuffer> {
    let channels = profile.channels() as usize;
    if channels == 0 {
        return Err(IccError::InvalidProfile(format!(
            "color space '{}' has no channel mapping",
            profile.color_space_name()
        )));
    }
    if !buffer.is_valid() {
        return Err(scanbuf_core::Error::InvalidBuffer.into());
    }

    let dst_format = FormatSpec::for_profile(profile, buffer.kind());
    let Some(transform) = build_transform(buffer.profile(), Some(profile), FormatSpec::of(buffer), dst_format, intent)
    else {
        warn!(
            target_space = %profile.color_space_name(),
            has_source_profile = buffer.profile().is_some(),
            "color conversion unavailable, keeping pixels unchanged"
        );
        return Ok(buffer.clone());
    };

    let mut out = buffer.alloc_like(channels, buffer.kind())?;
    transform.apply(buffer, &mut out)?;
    out.attach_profile(Some(profile.clone()));
    Ok(out)
}
