//! Container info command.
//!
//! Prints the directory chain. Pixels are decoded only for directories
//! with an embedded profile, or for sample counts under `--all`.

use crate::InfoArgs;
use anyhow::{Context, Result};
use scanbuf_icc::Profile;
use scanbuf_io::{ContainerReader, DirectoryInfo, tags};
use std::fs;
use std::path::Path;

/// Runs the info command.
pub fn run(args: InfoArgs, verbose: bool) -> Result<()> {
    for (n, path) in args.input.iter().enumerate() {
        if n > 0 {
            println!();
        }
        print_container(path, args.all, verbose)?;
    }
    Ok(())
}

fn print_container(path: &Path, all: bool, verbose: bool) -> Result<()> {
    let size = fs::metadata(path)?.len();
    let mut reader = ContainerReader::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
    let count = reader.directory_count();

    println!("{}", path.display());
    println!("  File size:   {}", super::format_size(size));
    println!("  Directories: {count}");
    if verbose || all {
        println!("  Layout:      {:?}-endian, {} offsets", reader.endian(), if reader.is_big() { "64-bit" } else { "32-bit" });
    }

    for index in 0..count {
        let info = reader.probe(index)?;
        print_directory(&info);
        if info.has_profile || all {
            let buffer = reader.read_directory(index)?;
            if let Some(profile) = buffer.profile() {
                let description = Profile::from_blob(profile).map(|p| p.description()).unwrap_or_default();
                println!("    Profile:     {} ({})", description, profile.color_space_name());
            }
            if all {
                println!("    Non-zero:    {}", scanbuf_ops::count_nonzero(&buffer, 0)?);
            }
        }
        if all && !info.meta.xml.is_empty() {
            println!("    XML:");
            for line in String::from_utf8_lossy(&info.meta.xml).lines() {
                println!("      {line}");
            }
        }
    }
    Ok(())
}

fn print_directory(info: &DirectoryInfo) {
    let kind = info
        .kind()
        .map_or_else(|| format!("unsupported ({} bits)", info.bits_per_sample), |k| k.to_string());
    let compression = match info.compression {
        tags::COMPRESSION_NONE => "none".to_string(),
        tags::COMPRESSION_LZW => "lzw".to_string(),
        other => other.to_string(),
    };
    println!("  [{}] {}x{} {}ch {}", info.index, info.cols, info.rows, info.channels, kind);
    println!("    Compression: {compression}, photometric {}", info.photometric);
    println!(
        "    Resolution:  {}x{} dpi, profile {}",
        info.resolution.x,
        info.resolution.y,
        if info.has_profile { "embedded" } else { "none" }
    );
    let meta = &info.meta;
    if !meta.tag.is_empty() {
        println!("    Tag:         {}", meta.tag);
    }
    if meta.has_anchor() {
        println!("    Anchor:      ({}, {})", meta.anchor.0, meta.anchor.1);
    }
    if meta.elapsed != 0 {
        println!("    Elapsed:     {}", meta.elapsed);
    }
    if let Some(parent) = &meta.parent_name {
        println!("    Parent:      {parent}");
    }
}
