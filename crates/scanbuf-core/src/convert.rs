//! Depth conversion and per-sample arithmetic.
//!
//! Every operation returns a new buffer of the same rows, columns, channels
//! and frames, carrying the source's profile, photometric tag, resolution
//! and frame metadata. Profile semantics do not depend on sample depth.
//!
//! | From | To | Rule |
//! |------|----|------|
//! | u8 | f32 | `v / 255` |
//! | u16 | f32 | `v / 65535` |
//! | u8 | u16 | `v << 8` |
//! | u16 | u8 | `v >> 8` |
//! | f32 | u8 | `round(v * 255)`, saturating |
//! | f32 | u16 | `round(v * 65535)`, clamped |
//!
//! The element loops live in [`kernel`](crate::kernel).

use rand::Rng;
use tracing::trace;

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::format::{Sample, SampleKind};
use crate::kernel;

/// Halftoning method for [`PixelBuffer::to_binary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinaryMethod {
    /// Per-sample comparison against uniform random thresholds.
    #[default]
    WhiteNoise,
    /// Error diffusion. Not implemented.
    ErrorDiffusion,
    /// Frequency-modulated screen. Not implemented.
    FmScreen,
    /// Amplitude-modulated screen. Not implemented.
    AmScreen,
    /// Green-noise screen. Not implemented.
    GreenNoiseScreen,
}

impl BinaryMethod {
    /// Display name, as accepted by `FromStr`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::WhiteNoise => "white noise",
            Self::ErrorDiffusion => "error diffusion",
            Self::FmScreen => "fm screen",
            Self::AmScreen => "am screen",
            Self::GreenNoiseScreen => "green noise screen",
        }
    }
}

impl std::str::FromStr for BinaryMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "whitenoise" => Ok(Self::WhiteNoise),
            "errordiffusion" => Ok(Self::ErrorDiffusion),
            "fmscreen" => Ok(Self::FmScreen),
            "amscreen" => Ok(Self::AmScreen),
            "greennoisescreen" => Ok(Self::GreenNoiseScreen),
            _ => Err(format!("unknown binarization method '{s}'")),
        }
    }
}

fn view<T: Sample>(buf: &PixelBuffer) -> Result<&[T]> {
    buf.samples::<T>().ok_or(Error::InvalidBuffer)
}

fn view_mut<T: Sample>(buf: &mut PixelBuffer) -> Result<&mut [T]> {
    buf.samples_mut::<T>().ok_or(Error::InvalidBuffer)
}

impl PixelBuffer {
    /// Converts to another sample kind. Same kind is a plain copy.
    pub fn to_kind(&self, kind: SampleKind) -> Result<PixelBuffer> {
        if !self.is_valid() {
            return Err(Error::InvalidBuffer);
        }
        trace!(from = %self.kind(), to = %kind, frames = self.frames(), "convert depth");
        let mut out = self.alloc_like(self.channels(), kind)?;

        use SampleKind::*;
        match (self.kind(), kind) {
            (U8, U8) | (U16, U16) | (F32, F32) => out.data_mut().copy_from_slice(self.data()),
            (U8, U16) => kernel::u8_to_u16(view(self)?, view_mut(&mut out)?),
            (U8, F32) => kernel::u8_to_f32(view(self)?, view_mut(&mut out)?),
            (U16, U8) => kernel::u16_to_u8(view(self)?, view_mut(&mut out)?),
            (U16, F32) => kernel::u16_to_f32(view(self)?, view_mut(&mut out)?),
            (F32, U8) => kernel::f32_to_u8(view(self)?, view_mut(&mut out)?),
            (F32, U16) => kernel::f32_to_u16(view(self)?, view_mut(&mut out)?),
        }
        Ok(out)
    }

    /// Converts to 8-bit samples.
    pub fn to_u8(&self) -> Result<PixelBuffer> {
        self.to_kind(SampleKind::U8)
    }

    /// Converts to 16-bit samples.
    pub fn to_u16(&self) -> Result<PixelBuffer> {
        self.to_kind(SampleKind::U16)
    }

    /// Converts to float samples in [0, 1].
    pub fn to_f32(&self) -> Result<PixelBuffer> {
        self.to_kind(SampleKind::F32)
    }

    /// Returns a copy with every sample replaced by `max - sample`.
    pub fn invert(&self) -> Result<PixelBuffer> {
        if !self.is_valid() {
            return Err(Error::InvalidBuffer);
        }
        let mut out = self.clone();
        match self.kind() {
            SampleKind::U8 => kernel::invert_u8(view_mut(&mut out)?),
            SampleKind::U16 => kernel::invert_u16(view_mut(&mut out)?),
            SampleKind::F32 => kernel::invert_f32(view_mut(&mut out)?),
        }
        Ok(out)
    }

    /// Halftones to an 8-bit buffer of full-scale (255) and zero samples.
    ///
    /// With [`BinaryMethod::WhiteNoise`] each sample is compared against a
    /// threshold drawn uniformly from its native range (0..=255,
    /// 0..=65535 or [0, 1)); samples above the threshold become 255.
    /// The remaining methods return [`Error::Unsupported`].
    pub fn to_binary<R: Rng>(&self, method: BinaryMethod, rng: &mut R) -> Result<PixelBuffer> {
        if !self.is_valid() {
            return Err(Error::InvalidBuffer);
        }
        if method != BinaryMethod::WhiteNoise {
            return Err(Error::unsupported(format!("binarization by {}", method.name())));
        }
        let mut out = self.alloc_like(self.channels(), SampleKind::U8)?;
        let row_len = self.cols() * self.channels();

        match self.kind() {
            SampleKind::U8 => {
                let mut th = vec![0u8; row_len];
                for (src, dst) in view::<u8>(self)?.chunks(row_len).zip(view_mut::<u8>(&mut out)?.chunks_mut(row_len)) {
                    th.iter_mut().for_each(|t| *t = rng.gen_range(0..=u8::MAX));
                    kernel::threshold_u8(src, &th, dst);
                }
            }
            SampleKind::U16 => {
                let mut th = vec![0u16; row_len];
                for (src, dst) in view::<u16>(self)?.chunks(row_len).zip(view_mut::<u8>(&mut out)?.chunks_mut(row_len)) {
                    th.iter_mut().for_each(|t| *t = rng.gen_range(0..=u16::MAX));
                    kernel::threshold_u16(src, &th, dst);
                }
            }
            SampleKind::F32 => {
                let mut th = vec![0f32; row_len];
                for (src, dst) in view::<f32>(self)?.chunks(row_len).zip(view_mut::<u8>(&mut out)?.chunks_mut(row_len)) {
                    th.iter_mut().for_each(|t| *t = rng.gen_range(0.0..1.0));
                    kernel::threshold_f32(src, &th, dst);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{signature, synthetic_profile};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn gradient_u8() -> PixelBuffer {
        let mut buf = PixelBuffer::new(4, 64, 1, SampleKind::U8, 2);
        for (i, v) in buf.data_mut().iter_mut().enumerate() {
            *v = i as u8;
        }
        buf
    }

    #[test]
    fn test_u8_round_trip_through_f32() {
        let src = gradient_u8();
        let back = src.to_f32().unwrap().to_u8().unwrap();
        assert_eq!(back.data(), src.data());
    }

    #[test]
    fn test_u8_idempotent() {
        let src = gradient_u8().to_u16().unwrap();
        let once = src.to_u8().unwrap();
        let twice = once.to_u8().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_f32_in_unit_range() {
        let f = gradient_u8().to_f32().unwrap();
        assert!(f.samples::<f32>().unwrap().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_u16_to_f32_scale() {
        let mut buf = PixelBuffer::new(1, 2, 1, SampleKind::U16, 1);
        buf.samples_mut::<u16>().unwrap().copy_from_slice(&[65535, 32768]);
        let f = buf.to_f32().unwrap();
        let s = f.samples::<f32>().unwrap();
        assert_eq!(s[0], 1.0);
        assert_abs_diff_eq!(s[1], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_conversion_keeps_profile_and_metadata() {
        let mut buf = PixelBuffer::new(2, 2, 3, SampleKind::U8, 1);
        assert!(buf.attach_profile(Some(synthetic_profile(signature::RGB))));
        buf.frame_meta_mut(0).unwrap().tag = "scan".into();
        let out = buf.to_u16().unwrap();
        assert_eq!(out.profile(), buf.profile());
        assert_eq!(out.frame_meta(0).unwrap().tag, "scan");
    }

    #[test]
    fn test_invert_involution() {
        let src = gradient_u8();
        let inv = src.invert().unwrap();
        assert_eq!(inv.data()[0], 255);
        assert_eq!(inv.invert().unwrap(), src);

        let f = src.to_f32().unwrap();
        let ff = f.invert().unwrap().invert().unwrap();
        for (a, b) in f.samples::<f32>().unwrap().iter().zip(ff.samples::<f32>().unwrap()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_white_noise_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut buf = PixelBuffer::new(8, 8, 1, SampleKind::U16, 1);
        let bin = buf.to_binary(BinaryMethod::WhiteNoise, &mut rng).unwrap();
        assert_eq!(bin.kind(), SampleKind::U8);
        assert!(bin.data().iter().all(|&v| v == 0));

        buf.fill(u16::MAX);
        let bin = buf.to_binary(BinaryMethod::WhiteNoise, &mut rng).unwrap();
        // A threshold of exactly 65535 is possible but vanishingly rare for 64 draws.
        assert!(bin.data().iter().filter(|&&v| v == 255).count() >= 63);
        assert!(bin.data().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_white_noise_density_tracks_level() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut buf = PixelBuffer::new(100, 100, 1, SampleKind::F32, 1);
        buf.fill(0.25f32);
        let bin = buf.to_binary(BinaryMethod::WhiteNoise, &mut rng).unwrap();
        let on = bin.data().iter().filter(|&&v| v == 255).count() as f32 / 10_000.0;
        assert!((on - 0.25).abs() < 0.03, "density {on}");
    }

    #[test]
    fn test_other_methods_unsupported() {
        let mut rng = StdRng::seed_from_u64(1);
        let buf = gradient_u8();
        let err = buf.to_binary(BinaryMethod::ErrorDiffusion, &mut rng).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn test_method_names() {
        assert_eq!("white noise".parse::<BinaryMethod>(), Ok(BinaryMethod::WhiteNoise));
        assert_eq!("Green-Noise-Screen".parse::<BinaryMethod>(), Ok(BinaryMethod::GreenNoiseScreen));
        assert!("bayer".parse::<BinaryMethod>().is_err());
    }
}
