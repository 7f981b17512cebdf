//! Optional YAML settings file.
//!
//! ```yaml
//! intent: relative colorimetric
//! algorithm: lanczos
//! log_level: info
//! profiles:
//!   rgb: /usr/share/color/icc/AdobeRGB1998.icc
//!   cmyk: /usr/share/color/icc/ISOcoated_v2.icc
//! profile_dirs:
//!   - /opt/profiles
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use scanbuf_core::ColorProfile;
use scanbuf_icc::{Intent, Profile, gray_profile, srgb_profile};
use scanbuf_ops::Algorithm;
use serde::Deserialize;

/// Settings read from `--config`. Command-line flags win over these.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Rendering intent name.
    pub intent: Option<String>,
    /// Default rescale algorithm name.
    pub algorithm: Option<String>,
    /// Log level used when neither `RUST_LOG` nor `-v` is given.
    pub log_level: Option<String>,
    /// Working-space profiles.
    pub profiles: DefaultProfiles,
    /// Searched in addition to the platform profile directories.
    pub profile_dirs: Vec<PathBuf>,
}

/// Profile files per color space.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultProfiles {
    pub rgb: Option<PathBuf>,
    pub gray: Option<PathBuf>,
    pub cmyk: Option<PathBuf>,
}

/// Target color space named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Space {
    Gray,
    Rgb,
    Cmyk,
}

impl Config {
    /// Reads `path`, or returns defaults when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parses YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Flag value, else configured value, else the default intent.
    pub fn intent(&self, flag: Option<&str>) -> Result<Intent> {
        match flag.or(self.intent.as_deref()) {
            Some(name) => name.parse().map_err(|e: String| anyhow!(e)),
            None => Ok(Intent::default()),
        }
    }

    /// Flag value, else configured value, else the default algorithm.
    pub fn algorithm(&self, flag: Option<&str>) -> Result<Algorithm> {
        match flag.or(self.algorithm.as_deref()) {
            Some(name) => name.parse().map_err(|e: String| anyhow!(e)),
            None => Ok(Algorithm::default()),
        }
    }

    /// Configured profile for `space`, or the built-in gray and sRGB ones.
    pub fn profile_for(&self, space: Space) -> Result<ColorProfile> {
        let path = match space {
            Space::Gray => &self.profiles.gray,
            Space::Rgb => &self.profiles.rgb,
            Space::Cmyk => &self.profiles.cmyk,
        };
        match (path, space) {
            (Some(path), _) => read_profile(path),
            (None, Space::Gray) => Ok(gray_profile()?),
            (None, Space::Rgb) => Ok(srgb_profile()?),
            (None, Space::Cmyk) => Err(anyhow!("no CMYK profile configured (profiles.cmyk)")),
        }
    }
}

/// Reads an ICC file into an embeddable profile.
pub fn read_profile(path: &Path) -> Result<ColorProfile> {
    Profile::from_file(path)
        .and_then(|p| p.to_blob())
        .with_context(|| format!("Failed to read profile: {}", path.display()))
}
