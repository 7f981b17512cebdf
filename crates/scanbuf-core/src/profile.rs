//! Embedded color profile blobs.
//!
//! A [`ColorProfile`] is an opaque ICC byte blob. The only thing this crate
//! reads from it is the color-space signature in the fixed header, which
//! yields the channel count a buffer must have to carry the profile and the
//! photometric classification the container writer records.
//!
//! Building and applying transforms lives in `scanbuf-icc`.
//!
//! # Signature table
//!
//! | Channels | Signatures |
//! |----------|------------|
//! | 1 | `GRAY`, `MCH1`, `1CLR`, `nmcl` |
//! | 2 | `MCH2`, `2CLR` |
//! | 3 | `XYZ `, `Lab `, `Luv `, `YCbr`, `Yxy `, `RGB `, `HSV `, `HLS `, `CMY `, `MCH3`, `3CLR` |
//! | 4 | `CMYK`, `MCH4`, `4CLR`, `LuvK` |
//! | 5..=15 | `MCH5`..`MCHF`, `5CLR`..`FCLR` |
//!
//! Anything else has zero channels and is rejected by
//! [`PixelBuffer::attach_profile`](crate::PixelBuffer::attach_profile).

use crate::error::{Error, Result};

/// Photometric interpretation values, as stored in the container's
/// photometric field.
pub mod photometric {
    /// Gray, zero is white.
    pub const MIN_IS_WHITE: u16 = 0;
    /// Gray, zero is black.
    pub const MIN_IS_BLACK: u16 = 1;
    /// Red, green, blue.
    pub const RGB: u16 = 2;
    /// Ink separations (CMYK and N-color).
    pub const SEPARATED: u16 = 5;
    /// Luma and chroma.
    pub const YCBCR: u16 = 6;
    /// CIE L*a*b*, ICC encoding.
    pub const ICC_LAB: u16 = 9;
}

/// ICC header length.
pub const HEADER_LEN: usize = 128;

const COLOR_SPACE_OFFSET: usize = 16;
const MAGIC_OFFSET: usize = 36;
const MAGIC: &[u8; 4] = b"acsp";

/// Color-space signatures used by the channel and photometric tables.
pub mod signature {
    #![allow(missing_docs)]

    pub const XYZ: u32 = 0x5859_5A20;
    pub const LAB: u32 = 0x4C61_6220;
    pub const LUV: u32 = 0x4C75_7620;
    pub const YCBR: u32 = 0x5943_6272;
    pub const YXY: u32 = 0x5978_7920;
    pub const RGB: u32 = 0x5247_4220;
    pub const GRAY: u32 = 0x4752_4159;
    pub const HSV: u32 = 0x4853_5620;
    pub const HLS: u32 = 0x484C_5320;
    pub const CMYK: u32 = 0x434D_594B;
    pub const CMY: u32 = 0x434D_5920;
    pub const NAMED: u32 = 0x6E6D_636C;
    pub const LUVK: u32 = 0x4C75_764B;

    /// `MCHn` for n in 1..=15 (hex digit suffix).
    pub const fn mch(n: u32) -> u32 {
        0x4D43_4800 | hex_digit(n)
    }

    /// `nCLR` for n in 1..=15 (hex digit prefix).
    pub const fn nclr(n: u32) -> u32 {
        (hex_digit(n) << 24) | 0x0043_4C52
    }

    const fn hex_digit(n: u32) -> u32 {
        if n < 10 { b'0' as u32 + n } else { b'A' as u32 + n - 10 }
    }
}

/// Channel count implied by a color-space signature, 0 when unknown.
pub fn channel_count_of_signature(sig: u32) -> u32 {
    use signature::*;
    match sig {
        GRAY | NAMED => 1,
        XYZ | LAB | LUV | YCBR | YXY | RGB | HSV | HLS | CMY => 3,
        CMYK | LUVK => 4,
        _ => (1..=15)
            .find(|&n| sig == mch(n) || sig == nclr(n))
            .unwrap_or(0),
    }
}

/// Photometric interpretation implied by a color-space signature, 0 when
/// there is no natural mapping.
pub fn photometric_of_signature(sig: u32) -> u16 {
    use signature::*;
    match sig {
        LAB => photometric::ICC_LAB,
        YCBR => photometric::YCBCR,
        RGB => photometric::RGB,
        GRAY | NAMED => photometric::MIN_IS_BLACK,
        CMYK | CMY => photometric::SEPARATED,
        _ if sig == mch(3) || sig == nclr(3) => photometric::RGB,
        _ if sig == mch(1) || sig == nclr(1) => photometric::MIN_IS_BLACK,
        _ if (4..=15).any(|n| sig == mch(n) || sig == nclr(n)) => photometric::SEPARATED,
        _ => 0,
    }
}

/// An ICC profile held as bytes.
///
/// Equality is byte equality, which is what the container round trip
/// preserves.
#[derive(Clone, PartialEq, Eq)]
pub struct ColorProfile {
    bytes: Vec<u8>,
}

impl ColorProfile {
    /// Wraps a blob after checking the header length and the `acsp` magic.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidProfile(format!(
                "{} bytes is shorter than the {HEADER_LEN} byte header",
                bytes.len()
            )));
        }
        if &bytes[MAGIC_OFFSET..MAGIC_OFFSET + 4] != MAGIC {
            return Err(Error::InvalidProfile("missing 'acsp' signature".into()));
        }
        Ok(Self { bytes })
    }

    /// Raw profile bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the profile, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Color-space signature from the header.
    pub fn color_space(&self) -> u32 {
        let b = &self.bytes[COLOR_SPACE_OFFSET..COLOR_SPACE_OFFSET + 4];
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Color-space signature as four ASCII characters.
    pub fn color_space_name(&self) -> String {
        self.color_space()
            .to_be_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }

    /// Number of channels this profile describes, in `[0, 15]`.
    pub fn channels(&self) -> u32 {
        channel_count_of_signature(self.color_space())
    }

    /// Photometric classification, 0 when none applies.
    pub fn photometric(&self) -> u16 {
        photometric_of_signature(self.color_space())
    }
}

impl std::fmt::Debug for ColorProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorProfile")
            .field("color_space", &self.color_space_name())
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Channel count of an optional profile; `None` counts as zero.
pub fn channel_count_of(profile: Option<&ColorProfile>) -> u32 {
    profile.map_or(0, ColorProfile::channels)
}

/// Photometric tag of an optional profile; `None` counts as zero.
pub fn photometric_tag_of(profile: Option<&ColorProfile>) -> u16 {
    profile.map_or(0, ColorProfile::photometric)
}

/// Minimal well-formed header for a signature, used by tests across the
/// workspace that need a profile without a color engine.
#[doc(hidden)]
pub fn synthetic_profile(sig: u32) -> ColorProfile {
    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[0..4].copy_from_slice(&(HEADER_LEN as u32).to_be_bytes());
    bytes[COLOR_SPACE_OFFSET..COLOR_SPACE_OFFSET + 4].copy_from_slice(&sig.to_be_bytes());
    bytes[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(MAGIC);
    ColorProfile { bytes }
}
