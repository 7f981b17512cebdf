//! # scanbuf-icc
//!
//! Color management for scanbuf pixel buffers, built on Little CMS 2.
//!
//! # Features
//!
//! - Convert a [`PixelBuffer`](scanbuf_core::PixelBuffer) into another profile's color space
//! - Build one-shot transforms between arbitrary channel counts and depths
//! - Generate standard gray, sRGB and Lab profiles as embeddable blobs
//! - Discover installed profiles with [`ProfileCatalog`]
//!
//! # Example
//!
//! ```rust
//! use scanbuf_core::{PixelBuffer, SampleKind};
//! use scanbuf_icc::{Intent, convert_to_profile, gray_profile, srgb_profile};
//!
//! let mut rgb = PixelBuffer::new(8, 8, 3, SampleKind::U8, 1);
//! assert!(rgb.attach_profile(Some(srgb_profile()?)));
//!
//! let gray = convert_to_profile(&rgb, &gray_profile()?, Intent::Perceptual)?;
//! assert_eq!(gray.channels(), 1);
//! # Ok::<(), scanbuf_icc::IccError>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod catalog;
mod error;
mod profile;
mod standard;
mod transform;

pub use catalog::{CatalogEntry, ProfileCatalog};
pub use error::{IccError, IccResult};
pub use profile::Profile;
pub use standard::{default_profile_for, gray_profile, lab_profile, srgb_profile};
pub use transform::{ColorTransform, FormatSpec, build_transform, convert_to_profile};

/// Rendering intent for color transformations.
///
/// Determines how out-of-gamut colors are handled during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Intent {
    /// Compresses the source gamut to fit the destination.
    ///
    /// Best for photographic images.
    #[default]
    Perceptual,

    /// Clips out-of-gamut colors, maps media white to media white.
    RelativeColorimetric,

    /// Maintains saturation at the expense of accuracy.
    Saturation,

    /// Clips out-of-gamut colors without white point adaptation.
    AbsoluteColorimetric,
}

impl From<Intent> for lcms2::Intent {
    fn from(intent: Intent) -> Self {
        match intent {
            Intent::Perceptual => lcms2::Intent::Perceptual,
            Intent::RelativeColorimetric => lcms2::Intent::RelativeColorimetric,
            Intent::Saturation => lcms2::Intent::Saturation,
            Intent::AbsoluteColorimetric => lcms2::Intent::AbsoluteColorimetric,
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "perceptual" => Ok(Self::Perceptual),
            "relative" | "relativecolorimetric" => Ok(Self::RelativeColorimetric),
            "saturation" => Ok(Self::Saturation),
            "absolute" | "absolutecolorimetric" => Ok(Self::AbsoluteColorimetric),
            _ => Err(format!("unknown rendering intent '{s}'")),
        }
    }
}
