//! Installed profile discovery.
//!
//! [`ProfileCatalog`] is built once by whoever needs to offer profile
//! choices (a settings screen, the CLI `profiles` command) and passed down
//! from there. Buffer conversion never consults it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use scanbuf_core::ColorProfile;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::{IccResult, Profile};

/// One installed profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// File location.
    pub path: PathBuf,
    /// Description tag, or the file stem when the profile has none.
    pub description: String,
    /// Channel count from the color-space signature.
    pub channels: u32,
}

impl CatalogEntry {
    /// Reads the profile bytes from disk.
    pub fn load(&self) -> IccResult<ColorProfile> {
        Profile::from_file(&self.path)?.to_blob()
    }
}

/// Installed profiles grouped by channel count.
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    by_channels: BTreeMap<u32, Vec<CatalogEntry>>,
}

impl ProfileCatalog {
    /// Scans directories recursively for `.icc` and `.icm` files.
    ///
    /// Missing directories, unreadable files and profiles whose color space
    /// has no channel mapping are skipped.
    pub fn scan<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut catalog = Self::default();
        for dir in dirs {
            catalog.scan_dir(dir.as_ref());
        }
        for entries in catalog.by_channels.values_mut() {
            entries.sort_by(|a, b| a.description.cmp(&b.description));
        }
        debug!(profiles = catalog.len(), "profile catalog built");
        catalog
    }

    /// Scans the platform's standard profile directories.
    pub fn scan_default() -> Self {
        Self::scan(Self::default_dirs())
    }

    /// Platform profile directories, plus `~/Profiles`.
    pub fn default_dirs() -> Vec<PathBuf> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from);
        let mut dirs = Vec::new();

        if cfg!(target_os = "windows") {
            dirs.push(PathBuf::from("C:/Windows/System32/spool/drivers/color"));
        } else if cfg!(target_os = "macos") {
            dirs.push(PathBuf::from("/System/Library/ColorSync/Profiles"));
            dirs.push(PathBuf::from("/Library/ColorSync/Profiles"));
            if let Some(home) = &home {
                dirs.push(home.join("Library/ColorSync/Profiles"));
            }
        } else {
            if let Some(home) = &home {
                dirs.push(home.join(".local/share/color/icc"));
            }
            dirs.push(PathBuf::from("/usr/share/color/icc"));
        }
        if let Some(home) = home {
            dirs.push(home.join("Profiles"));
        }
        dirs
    }

    fn scan_dir(&mut self, dir: &Path) {
        if !dir.is_dir() {
            trace!(dir = %dir.display(), "profile directory not readable");
            return;
        }
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() && is_profile_file(entry.path()) {
                self.add_file(entry.into_path());
            }
        }
    }

    fn add_file(&mut self, path: PathBuf) {
        let opened = Profile::from_file(&path).and_then(|p| p.to_blob().map(|blob| (p, blob)));
        let (profile, blob) = match opened {
            Ok(pair) => pair,
            Err(err) => {
                trace!(path = %path.display(), %err, "skipping profile");
                return;
            }
        };
        let channels = blob.channels();
        if channels == 0 {
            trace!(path = %path.display(), space = %blob.color_space_name(), "skipping profile without channel mapping");
            return;
        }
        let mut description = profile.description();
        if description.is_empty() {
            description = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        self.by_channels.entry(channels).or_default().push(CatalogEntry {
            path,
            description,
            channels,
        });
    }

    /// Profiles with `channels` channels.
    pub fn with_channels(&self, channels: u32) -> &[CatalogEntry] {
        self.by_channels.get(&channels).map_or(&[], Vec::as_slice)
    }

    /// Channel counts present, ascending.
    pub fn channel_counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_channels.keys().copied()
    }

    /// Every entry, grouped by ascending channel count.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.by_channels.values().flatten()
    }

    /// First entry whose description contains `needle`, case-insensitively.
    pub fn find(&self, needle: &str) -> Option<&CatalogEntry> {
        let needle = needle.to_lowercase();
        self.iter().find(|e| e.description.to_lowercase().contains(&needle))
    }

    /// Total profiles.
    pub fn len(&self) -> usize {
        self.by_channels.values().map(Vec::len).sum()
    }

    /// Whether no profiles were found.
    pub fn is_empty(&self) -> bool {
        self.by_channels.is_empty()
    }
}

fn is_profile_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("icc") || e.eq_ignore_ascii_case("icm"))
}
