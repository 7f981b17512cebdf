//! Built-in profiles.
//!
//! Buffers loaded without an embedded profile, extracted channels and
//! display previews need a profile to carry. These are generated by lcms2
//! on demand and returned as blobs.

use lcms2::{CIExyY, Profile as LcmsProfile, ToneCurve};
use scanbuf_core::ColorProfile;

use crate::{IccError, IccResult, Profile};

/// Linear gray, D50 white.
pub fn gray_profile() -> IccResult<ColorProfile> {
    let curve = ToneCurve::new(1.0);
    let inner = LcmsProfile::new_gray(&CIExyY::d50(), &curve).map_err(|e| IccError::CreateFailed(e.to_string()))?;
    Profile { inner }.to_blob()
}

/// IEC 61966-2-1 sRGB.
pub fn srgb_profile() -> IccResult<ColorProfile> {
    Profile {
        inner: LcmsProfile::new_srgb(),
    }
    .to_blob()
}

/// CIE L*a*b* v4, D50.
pub fn lab_profile() -> IccResult<ColorProfile> {
    let inner = LcmsProfile::new_lab4_context(lcms2::GlobalContext::new(), &CIExyY::d50())
        .map_err(|e| IccError::CreateFailed(e.to_string()))?;
    Profile { inner }.to_blob()
}

/// Profile assumed for a profile-less buffer of `channels` channels:
/// gray for one, sRGB for three, none otherwise.
pub fn default_profile_for(channels: usize) -> IccResult<Option<ColorProfile>> {
    match channels {
        1 => gray_profile().map(Some),
        3 => srgb_profile().map(Some),
        _ => Ok(None),
    }
}
