//! Sample depths.
//!
//! A buffer stores one of three sample kinds, chosen at runtime and
//! carried as [`SampleKind`]. Algorithms that touch samples are written once,
//! generic over [`Sample`], and dispatched on the kind at the outer call so
//! hot loops never branch on depth.
//!
//! ```rust
//! use scanbuf_core::SampleKind;
//!
//! assert_eq!(SampleKind::U16.bytes(), 2);
//! assert_eq!(SampleKind::from_bits(32, true), Some(SampleKind::F32));
//! ```

use bytemuck::Pod;

/// Sample depth of a [`PixelBuffer`](crate::PixelBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleKind {
    /// 8-bit unsigned integer, [0, 255].
    #[default]
    U8,
    /// 16-bit unsigned integer, [0, 65535].
    U16,
    /// 32-bit IEEE float, nominally [0, 1].
    F32,
}

impl SampleKind {
    /// Bytes per sample.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    /// Bits per sample.
    #[inline]
    pub const fn bits(self) -> u16 {
        (self.bytes() * 8) as u16
    }

    /// Whether samples are IEEE floats.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    /// Full-scale value: 255, 65535 or 1.0.
    #[inline]
    pub const fn max_value(self) -> f32 {
        match self {
            Self::U8 => 255.0,
            Self::U16 => 65535.0,
            Self::F32 => 1.0,
        }
    }

    /// Kind for a byte width, as stored in the sample size field.
    ///
    /// Four bytes always means float; there is no 32-bit integer kind.
    #[inline]
    pub const fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            1 => Some(Self::U8),
            2 => Some(Self::U16),
            4 => Some(Self::F32),
            _ => None,
        }
    }

    /// Kind for a container's bits-per-sample and sample-format pair.
    pub const fn from_bits(bits: u16, float: bool) -> Option<Self> {
        match (bits, float) {
            (8, false) => Some(Self::U8),
            (16, false) => Some(Self::U16),
            (32, true) => Some(Self::F32),
            _ => None,
        }
    }

    /// Short lowercase name, used by the CLI and in log fields.
    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::F32 => "f32",
        }
    }
}

impl std::fmt::Display for SampleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SampleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "u8" | "8" | "uchar" => Ok(Self::U8),
            "u16" | "16" | "ushort" => Ok(Self::U16),
            "f32" | "32" | "float" => Ok(Self::F32),
            other => Err(format!("unknown sample kind '{other}'")),
        }
    }
}

/// A storable sample type: `u8`, `u16` or `f32`.
///
/// Values are handled in their *raw* range (0..=255, 0..=65535, 0.0..=1.0);
/// normalization happens only in the depth converters.
pub trait Sample: Pod + Copy + Default + PartialOrd + Send + Sync + 'static {
    /// Runtime tag for this type.
    const KIND: SampleKind;

    /// Full-scale value in the raw range.
    const MAX: Self;

    /// Raw value widened to `f32`.
    fn to_raw_f32(self) -> f32;

    /// Raw `f32` narrowed back, rounding and clamping integers to their range.
    fn from_raw_f32(v: f32) -> Self;
}

impl Sample for u8 {
    const KIND: SampleKind = SampleKind::U8;
    const MAX: Self = u8::MAX;

    #[inline]
    fn to_raw_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_raw_f32(v: f32) -> Self {
        v.round().clamp(0.0, 255.0) as u8
    }
}

impl Sample for u16 {
    const KIND: SampleKind = SampleKind::U16;
    const MAX: Self = u16::MAX;

    #[inline]
    fn to_raw_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_raw_f32(v: f32) -> Self {
        v.round().clamp(0.0, 65535.0) as u16
    }
}

impl Sample for f32 {
    const KIND: SampleKind = SampleKind::F32;
    const MAX: Self = 1.0;

    #[inline]
    fn to_raw_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_raw_f32(v: f32) -> Self {
        v
    }
}
