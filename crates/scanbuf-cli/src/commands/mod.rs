//! CLI command implementations

pub mod binarize;
pub mod channel;
pub mod convert;
pub mod crop;
pub mod info;
pub mod invert;
pub mod preview;
pub mod profiles;
pub mod rescale;
pub mod rotate;

use anyhow::{Context, Result};
use scanbuf_core::PixelBuffer;
use std::path::Path;

/// Loads every directory of a container as frames of one buffer.
pub fn load_buffer(path: &Path) -> Result<PixelBuffer> {
    scanbuf_io::load(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Saves a buffer, one directory per frame.
pub fn save_buffer(path: &Path, buffer: &PixelBuffer) -> Result<()> {
    scanbuf_io::save(buffer, path).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Short shape description.
pub fn describe(buffer: &PixelBuffer) -> String {
    format!(
        "{}x{} {}ch {} x{}",
        buffer.cols(),
        buffer.rows(),
        buffer.channels(),
        buffer.kind(),
        buffer.frames()
    )
}

/// Byte count in binary units, one decimal above 1 KiB.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
