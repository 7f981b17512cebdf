//! # scanbuf-io
//!
//! Multi-directory container files for [`PixelBuffer`]s.
//!
//! Files are TIFF, encoded and decoded with the `tiff` crate: one directory
//! per frame, LZW strips with horizontal differencing for integer samples,
//! the ICC profile embedded, and frame metadata carried in description,
//! page-name, position, XML and capture fields. Payloads over 100 MB switch
//! to 64-bit (BigTIFF) offsets.
//!
//! # Example
//!
//! ```rust,no_run
//! use scanbuf_core::{PixelBuffer, SampleKind};
//!
//! let mut buf = PixelBuffer::new(100, 100, 3, SampleKind::U8, 1);
//! buf.fill(10u8);
//! scanbuf_io::save(&buf, "scan.tif")?;
//!
//! let back = scanbuf_io::load("scan.tif")?;
//! assert_eq!(back.data(), buf.data());
//! # Ok::<(), scanbuf_io::IoError>(())
//! ```
//!
//! Streaming output goes through [`ContainerWriter::begin_directory`]; a
//! [`ContainerReader`] gives per-directory access and reader options.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod exif;
mod reader;
pub mod tags;
mod writer;

use std::path::Path;

use scanbuf_core::PixelBuffer;
use tracing::trace;

pub use error::{IoError, IoResult};
pub use exif::Endian;
pub use reader::{ContainerReader, DirectoryInfo, ReadOptions};
pub use writer::{ContainerWriter, DirectorySpec, DirectoryWriter};

/// Writes every frame of `buffer`, one directory each.
pub fn save<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> IoResult<()> {
    save_objects(std::slice::from_ref(buffer), path)
}

/// Writes several buffers into one file, their frames in order.
pub fn save_objects<P: AsRef<Path>>(buffers: &[PixelBuffer], path: P) -> IoResult<()> {
    let payload: u64 = buffers.iter().map(|b| b.len_bytes() as u64).sum();
    trace!(path = %path.as_ref().display(), objects = buffers.len(), payload, "save");
    let mut writer = ContainerWriter::create_for_payload(path, payload)?;
    for buffer in buffers {
        writer.write_buffer(buffer)?;
    }
    writer.finish()?;
    Ok(())
}

/// Reads every directory and stacks them as frames of one buffer.
///
/// All directories must share rows, columns, channels and depth. Profile
/// and resolution come from the first.
pub fn load<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let mut parts = load_objects(path)?;
    match parts.len() {
        0 => Err(IoError::invalid("no directories")),
        1 => Ok(parts.remove(0)),
        _ => Ok(PixelBuffer::stack(&parts)?),
    }
}

/// Reads one directory as a single-frame buffer.
pub fn load_directory<P: AsRef<Path>>(path: P, index: usize) -> IoResult<PixelBuffer> {
    ContainerReader::open(path)?.read_directory(index)
}

/// Reads every directory as its own buffer.
pub fn load_objects<P: AsRef<Path>>(path: P) -> IoResult<Vec<PixelBuffer>> {
    ContainerReader::open(path)?.read_all()
}

/// Fills `buffer` from `buffer.frames()` directories starting at `first`.
///
/// See [`ContainerReader::read_into`].
pub fn load_into<P: AsRef<Path>>(buffer: &mut PixelBuffer, path: P, first: usize) -> IoResult<()> {
    ContainerReader::open(path)?.read_into(buffer, first)
}

/// Directories in a file.
pub fn directory_count<P: AsRef<Path>>(path: P) -> IoResult<usize> {
    Ok(ContainerReader::open(path)?.directory_count())
}

/// Summarizes one directory without decoding pixels.
pub fn probe<P: AsRef<Path>>(path: P, index: usize) -> IoResult<DirectoryInfo> {
    ContainerReader::open(path)?.probe(index)
}
