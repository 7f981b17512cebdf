//! lcms2 profile handle.

use std::path::Path;

use lcms2::Profile as LcmsProfile;
use scanbuf_core::ColorProfile;

use crate::{IccError, IccResult};

/// An opened ICC profile, ready to take part in a transform.
///
/// [`ColorProfile`] is the blob a buffer carries; `Profile` is the parsed
/// form the color engine needs. Convert between them with
/// [`from_blob`](Profile::from_blob) and [`to_blob`](Profile::to_blob).
///
/// # Example
///
/// ```rust
/// use scanbuf_icc::{Profile, srgb_profile};
///
/// let blob = srgb_profile().unwrap();
/// let opened = Profile::from_blob(&blob).unwrap();
/// assert!(!opened.description().is_empty());
/// ```
pub struct Profile {
    pub(crate) inner: LcmsProfile,
}

impl Profile {
    /// Loads a profile from an `.icc` or `.icm` file.
    pub fn from_file(path: &Path) -> IccResult<Self> {
        let inner = LcmsProfile::new_file(path)
            .map_err(|e| IccError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self { inner })
    }

    /// Parses raw ICC bytes.
    pub fn from_icc(data: &[u8]) -> IccResult<Self> {
        let inner = LcmsProfile::new_icc(data).map_err(|e| IccError::InvalidProfile(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Opens the blob a buffer carries.
    pub fn from_blob(blob: &ColorProfile) -> IccResult<Self> {
        Self::from_icc(blob.as_bytes())
    }

    /// Serializes back to a blob a buffer can carry.
    pub fn to_blob(&self) -> IccResult<ColorProfile> {
        let bytes = self.inner.icc().map_err(|e| IccError::CreateFailed(e.to_string()))?;
        ColorProfile::from_bytes(bytes).map_err(|e| IccError::InvalidProfile(e.to_string()))
    }

    /// Profile description, empty when the profile has none.
    pub fn description(&self) -> String {
        self.inner
            .info(lcms2::InfoType::Description, lcms2::Locale::none())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("description", &self.description())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_round_trip() {
        let srgb = Profile { inner: LcmsProfile::new_srgb() };
        let blob = srgb.to_blob().unwrap();
        assert_eq!(blob.channels(), 3);
        let reopened = Profile::from_blob(&blob).unwrap();
        assert_eq!(reopened.description(), srgb.description());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(Profile::from_icc(&[0u8; 16]).is_err());
        assert!(Profile::from_file(Path::new("/nonexistent/profile.icc")).is_err());
    }
}
