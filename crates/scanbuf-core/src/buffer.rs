//! Multi-frame pixel buffer.
//!
//! [`PixelBuffer`] owns a 16-byte-aligned, zero-initialized byte arena holding
//! `frames × rows × cols × channels` samples of one [`SampleKind`], stored
//! frame after frame, row after row, channels interleaved.
//!
//! # Memory Layout
//!
//! ```text
//! frame 0: row 0 [c0 c1 .. cN][c0 c1 .. cN] ...   <- row_stride bytes
//!          row 1 ...
//! frame 1: ...                                    <- frame_stride bytes apart
//! padding: 128 zero bytes for wide-lane tail reads
//! ```
//!
//! # Allocation Failure
//!
//! Construction never panics. If the size product overflows or the allocator
//! refuses, the failure is logged and the buffer is left *invalid*:
//! [`is_valid`](PixelBuffer::is_valid) is false and every byte view is empty.
//! [`PixelBuffer::try_new`] turns the same condition into an [`Error`].
//!
//! # Ownership
//!
//! `Clone` is a deep copy. Share a buffer through
//! [`SharedBuffer`](crate::SharedBuffer) to get copy-on-write behavior.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use tracing::error;

use crate::error::{Error, Result};
use crate::format::{Sample, SampleKind};
use crate::metadata::{FrameMetadata, Resolution};
use crate::profile::{ColorProfile, photometric};

/// Extra zeroed bytes after the last frame.
pub const PADDING: usize = 128;

/// Arena alignment unit.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
struct Block([u8; 16]);

const BLOCK: usize = std::mem::size_of::<Block>();

/// Frames of pixel samples plus the profile and metadata that travel with them.
#[derive(Clone)]
pub struct PixelBuffer {
    rows: usize,
    cols: usize,
    channels: usize,
    kind: SampleKind,
    frames: usize,
    row_stride: usize,
    frame_stride: usize,
    arena: Vec<Block>,
    valid: bool,
    profile: Option<ColorProfile>,
    photometric: u16,
    resolution: Resolution,
    frame_meta: Vec<FrameMetadata>,
    filename: Option<PathBuf>,
}

impl PixelBuffer {
    /// Allocates a zeroed buffer.
    ///
    /// On overflow, zero dimensions or allocator refusal the result is
    /// invalid rather than an error; see the module docs.
    pub fn new(rows: usize, cols: usize, channels: usize, kind: SampleKind, frames: usize) -> Self {
        let mut buf = Self {
            rows,
            cols,
            channels,
            kind,
            frames,
            row_stride: 0,
            frame_stride: 0,
            arena: Vec::new(),
            valid: false,
            profile: None,
            photometric: default_photometric(channels),
            resolution: Resolution::default(),
            frame_meta: Vec::new(),
            filename: None,
        };

        let Some((row_stride, frame_stride, total)) = layout(rows, cols, channels, kind, frames) else {
            error!(rows, cols, channels, frames, kind = %kind, "pixel buffer size overflows or is empty");
            return buf;
        };

        let blocks = total.div_ceil(BLOCK);
        let mut arena = Vec::new();
        if let Err(err) = arena.try_reserve_exact(blocks) {
            error!(bytes = total, %err, "pixel buffer allocation failed");
            return buf;
        }
        arena.resize(blocks, Block::zeroed());

        buf.row_stride = row_stride;
        buf.frame_stride = frame_stride;
        buf.arena = arena;
        buf.valid = true;
        buf.frame_meta = vec![FrameMetadata::default(); frames];
        buf
    }

    /// Like [`new`](Self::new), but reports failure as an error.
    pub fn try_new(rows: usize, cols: usize, channels: usize, kind: SampleKind, frames: usize) -> Result<Self> {
        if layout(rows, cols, channels, kind, frames).is_none() {
            return Err(Error::invalid_dimensions(
                rows,
                cols,
                channels,
                format!("{frames} frame(s) of {kind} do not fit in memory"),
            ));
        }
        let buf = Self::new(rows, cols, channels, kind, frames);
        if buf.is_valid() { Ok(buf) } else { Err(Error::InvalidBuffer) }
    }

    /// Allocates a buffer with the same rows, columns and frames, a different
    /// channel count or kind, and every piece of metadata copied across.
    ///
    /// The profile is carried only when `channels` still matches it.
    pub fn alloc_like(&self, channels: usize, kind: SampleKind) -> Result<Self> {
        let mut out = Self::try_new(self.rows, self.cols, channels, kind, self.frames)?;
        out.copy_metadata_from(self);
        Ok(out)
    }

    /// Copies profile, photometric tag, resolution, frame metadata and file
    /// name from another buffer.
    ///
    /// A profile whose channel count disagrees with this buffer is dropped.
    pub fn copy_metadata_from(&mut self, other: &PixelBuffer) {
        if other.channels == self.channels {
            self.profile = other.profile.clone();
            self.photometric = other.photometric;
        }
        self.resolution = other.resolution;
        self.filename = other.filename.clone();
        for (dst, src) in self.frame_meta.iter_mut().zip(&other.frame_meta) {
            dst.clone_from(src);
        }
    }

    // === Shape ===

    /// Whether pixel memory was allocated.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Rows per frame.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample kind.
    #[inline]
    pub fn kind(&self) -> SampleKind {
        self.kind
    }

    /// Bytes per sample.
    #[inline]
    pub fn bytes_per_sample(&self) -> usize {
        self.kind.bytes()
    }

    /// Frame count.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Bytes per row, `cols * channels * bytes`.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Bytes per frame, `row_stride * rows`.
    #[inline]
    pub fn frame_stride(&self) -> usize {
        self.frame_stride
    }

    /// Nominal size in bytes, all frames, no padding.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        if self.valid { self.frame_stride * self.frames } else { 0 }
    }

    /// Whether two buffers agree on rows, columns, channels, kind and frames.
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.channels == other.channels
            && self.kind == other.kind
            && self.frames == other.frames
    }

    // === Bytes ===

    /// All frames as bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        let len = self.len_bytes();
        &bytemuck::cast_slice::<Block, u8>(&self.arena)[..len]
    }

    /// All frames as mutable bytes.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        let len = self.len_bytes();
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.arena)[..len]
    }

    /// Nominal bytes followed by the zeroed padding, for wide-lane tails.
    pub fn padded_data(&self) -> &[u8] {
        let len = if self.valid { self.len_bytes() + PADDING } else { 0 };
        &bytemuck::cast_slice::<Block, u8>(&self.arena)[..len]
    }

    /// One frame as bytes.
    ///
    /// # Panics
    ///
    /// Panics if `frame >= frames()`.
    #[inline]
    pub fn frame(&self, frame: usize) -> &[u8] {
        assert!(frame < self.frames, "frame {frame} out of range");
        let start = frame * self.frame_stride;
        &self.data()[start..start + self.frame_stride]
    }

    /// One frame as mutable bytes.
    ///
    /// # Panics
    ///
    /// Panics if `frame >= frames()`.
    #[inline]
    pub fn frame_mut(&mut self, frame: usize) -> &mut [u8] {
        assert!(frame < self.frames, "frame {frame} out of range");
        let start = frame * self.frame_stride;
        let len = self.frame_stride;
        &mut self.data_mut()[start..start + len]
    }

    /// One row of one frame as bytes.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `frame` is out of range.
    #[inline]
    pub fn scan_line(&self, row: usize, frame: usize) -> &[u8] {
        assert!(row < self.rows, "row {row} out of range");
        let start = row * self.row_stride;
        &self.frame(frame)[start..start + self.row_stride]
    }

    /// One row of one frame as mutable bytes.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `frame` is out of range.
    #[inline]
    pub fn scan_line_mut(&mut self, row: usize, frame: usize) -> &mut [u8] {
        assert!(row < self.rows, "row {row} out of range");
        let start = row * self.row_stride;
        let len = self.row_stride;
        &mut self.frame_mut(frame)[start..start + len]
    }

    /// Bytes of one pixel, `None` when out of range or invalid.
    pub fn pixel(&self, col: usize, row: usize, frame: usize) -> Option<&[u8]> {
        if !self.valid || col >= self.cols || row >= self.rows || frame >= self.frames {
            return None;
        }
        let px = self.channels * self.kind.bytes();
        let start = frame * self.frame_stride + row * self.row_stride + col * px;
        Some(&self.data()[start..start + px])
    }

    // === Typed views ===

    /// All samples typed, `None` when `T` is not this buffer's kind.
    pub fn samples<T: Sample>(&self) -> Option<&[T]> {
        if T::KIND != self.kind {
            return None;
        }
        bytemuck::try_cast_slice(self.data()).ok()
    }

    /// All samples typed and mutable, `None` when `T` is not this buffer's kind.
    pub fn samples_mut<T: Sample>(&mut self) -> Option<&mut [T]> {
        if T::KIND != self.kind {
            return None;
        }
        bytemuck::try_cast_slice_mut(self.data_mut()).ok()
    }

    /// Samples of one frame.
    pub fn frame_samples<T: Sample>(&self, frame: usize) -> Option<&[T]> {
        if T::KIND != self.kind || frame >= self.frames {
            return None;
        }
        bytemuck::try_cast_slice(self.frame(frame)).ok()
    }

    /// Mutable samples of one frame.
    pub fn frame_samples_mut<T: Sample>(&mut self, frame: usize) -> Option<&mut [T]> {
        if T::KIND != self.kind || frame >= self.frames {
            return None;
        }
        bytemuck::try_cast_slice_mut(self.frame_mut(frame)).ok()
    }

    /// Samples of one row.
    pub fn row_samples<T: Sample>(&self, row: usize, frame: usize) -> Option<&[T]> {
        if T::KIND != self.kind || row >= self.rows || frame >= self.frames {
            return None;
        }
        bytemuck::try_cast_slice(self.scan_line(row, frame)).ok()
    }

    /// Sets every sample to `value`. Returns false when `T` is the wrong kind.
    pub fn fill<T: Sample>(&mut self, value: T) -> bool {
        match self.samples_mut::<T>() {
            Some(s) => {
                s.fill(value);
                true
            }
            None => false,
        }
    }

    // === Profile ===

    /// Attached color profile.
    #[inline]
    pub fn profile(&self) -> Option<&ColorProfile> {
        self.profile.as_ref()
    }

    /// Attaches, replaces or clears the color profile.
    ///
    /// Returns false and leaves the buffer untouched when the profile's
    /// channel count is zero or differs from [`channels`](Self::channels).
    /// `None` always succeeds and resets the photometric tag to the
    /// channel-count default.
    pub fn attach_profile(&mut self, profile: Option<ColorProfile>) -> bool {
        match profile {
            None => {
                self.profile = None;
                self.photometric = default_photometric(self.channels);
                true
            }
            Some(p) => {
                let n = p.channels() as usize;
                if n == 0 || n != self.channels {
                    return false;
                }
                self.photometric = p.photometric();
                self.profile = Some(p);
                true
            }
        }
    }

    /// Photometric interpretation written to containers.
    #[inline]
    pub fn photometric(&self) -> u16 {
        self.photometric
    }

    /// Overrides the photometric interpretation, for files without a profile.
    pub fn set_photometric(&mut self, tag: u16) {
        self.photometric = tag;
    }

    // === Metadata ===

    /// Physical resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Sets physical resolution.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
    }

    /// Metadata of every frame.
    #[inline]
    pub fn frame_metadata(&self) -> &[FrameMetadata] {
        &self.frame_meta
    }

    /// Metadata of one frame.
    pub fn frame_meta(&self, frame: usize) -> Option<&FrameMetadata> {
        self.frame_meta.get(frame)
    }

    /// Mutable metadata of one frame.
    pub fn frame_meta_mut(&mut self, frame: usize) -> Option<&mut FrameMetadata> {
        self.frame_meta.get_mut(frame)
    }

    /// Source file, when loaded from or saved to disk.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Records the source file.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    // === Frames ===

    /// Copies one frame into a new single-frame buffer.
    pub fn frame_at(&self, frame: usize) -> Result<PixelBuffer> {
        if !self.valid {
            return Err(Error::InvalidBuffer);
        }
        if frame >= self.frames {
            return Err(Error::FrameOutOfRange { frame, frames: self.frames });
        }
        let mut out = Self::try_new(self.rows, self.cols, self.channels, self.kind, 1)?;
        out.profile = self.profile.clone();
        out.photometric = self.photometric;
        out.resolution = self.resolution;
        out.filename = self.filename.clone();
        out.frame_meta[0] = self.frame_meta[frame].clone();
        out.data_mut().copy_from_slice(self.frame(frame));
        Ok(out)
    }

    /// Stacks single- or multi-frame buffers of equal shape into one.
    ///
    /// Profile, photometric tag and resolution come from the first part.
    pub fn stack(parts: &[PixelBuffer]) -> Result<PixelBuffer> {
        let first = parts.first().ok_or(Error::InvalidBuffer)?;
        let mut frames = 0;
        for part in parts {
            if !part.valid {
                return Err(Error::InvalidBuffer);
            }
            if part.rows != first.rows || part.cols != first.cols {
                return Err(Error::dimension_mismatch((first.rows, first.cols), (part.rows, part.cols)));
            }
            if part.channels != first.channels {
                return Err(Error::ChannelMismatch { expected: first.channels, got: part.channels });
            }
            if part.kind != first.kind {
                return Err(Error::unsupported(format!("stacking {} onto {}", part.kind, first.kind)));
            }
            frames += part.frames;
        }

        let mut out = Self::try_new(first.rows, first.cols, first.channels, first.kind, frames)?;
        out.profile = first.profile.clone();
        out.photometric = first.photometric;
        out.resolution = first.resolution;
        out.filename = first.filename.clone();
        let mut offset = 0;
        let mut meta = Vec::with_capacity(frames);
        for part in parts {
            let len = part.len_bytes();
            out.data_mut()[offset..offset + len].copy_from_slice(part.data());
            offset += len;
            meta.extend(part.frame_meta.iter().cloned());
        }
        out.frame_meta = meta;
        Ok(out)
    }
}

impl PartialEq for PixelBuffer {
    /// Shape, samples, profile bytes, resolution and frame metadata.
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(other)
            && self.valid == other.valid
            && self.data() == other.data()
            && self.profile == other.profile
            && self.resolution == other.resolution
            && self.frame_meta == other.frame_meta
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("channels", &self.channels)
            .field("kind", &self.kind)
            .field("frames", &self.frames)
            .field("valid", &self.valid)
            .field("profile", &self.profile)
            .field("photometric", &self.photometric)
            .finish_non_exhaustive()
    }
}

/// Row stride, frame stride and padded arena size, or `None` on overflow or
/// an empty shape.
fn layout(
    rows: usize,
    cols: usize,
    channels: usize,
    kind: SampleKind,
    frames: usize,
) -> Option<(usize, usize, usize)> {
    if rows == 0 || cols == 0 || channels == 0 || frames == 0 {
        return None;
    }
    let row_stride = cols.checked_mul(channels)?.checked_mul(kind.bytes())?;
    let frame_stride = row_stride.checked_mul(rows)?;
    let total = frame_stride.checked_mul(frames)?.checked_add(PADDING)?;
    // Vec<Block> cannot exceed isize::MAX bytes.
    (total <= isize::MAX as usize - BLOCK).then_some((row_stride, frame_stride, total))
}

/// Photometric tag used when no profile is attached.
pub fn default_photometric(channels: usize) -> u16 {
    match channels {
        3 => photometric::RGB,
        4 => photometric::SEPARATED,
        _ => photometric::MIN_IS_BLACK,
    }
}
