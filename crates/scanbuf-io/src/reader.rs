//! Container reading on top of the `tiff` decoder.
//!
//! The decoder handles both byte orders, classic and 64-bit offsets,
//! uncompressed or LZW strips, and the horizontal predictor. Samples come
//! back in native order and are placed into the buffer row by row; planar
//! files are interleaved on the way in.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use scanbuf_core::{ColorProfile, FrameMetadata, PixelBuffer, Resolution, SampleKind, UNDEFINED_TAG, default_photometric};
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tracing::{debug, trace, warn};

use crate::exif::{self, Endian, Header};
use crate::tags::{self, field};
use crate::{IoError, IoResult};

type FileDecoder = Decoder<BufReader<File>>;

/// Reader behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Attach the standard gray or sRGB profile to 1- or 3-channel images
    /// that carry no profile of their own.
    pub assign_default_profile: bool,
}

/// Summary of one directory, read without decoding pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryInfo {
    /// Position in the directory chain.
    pub index: usize,
    /// Rows.
    pub rows: usize,
    /// Columns.
    pub cols: usize,
    /// Samples per pixel.
    pub channels: usize,
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Sample format field (1 unsigned, 3 float).
    pub sample_format: u16,
    /// Compression field.
    pub compression: u16,
    /// Photometric field.
    pub photometric: u16,
    /// Whether an ICC profile is embedded.
    pub has_profile: bool,
    /// Frame metadata as it would be loaded.
    pub meta: FrameMetadata,
    /// Physical resolution in dots per inch.
    pub resolution: Resolution,
}

impl DirectoryInfo {
    /// Decodable sample kind, if any.
    pub fn kind(&self) -> Option<SampleKind> {
        match self.sample_format {
            tags::SAMPLE_FORMAT_UINT => SampleKind::from_bits(self.bits_per_sample, false),
            tags::SAMPLE_FORMAT_IEEEFP => SampleKind::from_bits(self.bits_per_sample, true),
            _ => None,
        }
    }
}

// === Field access on the current directory ===

fn value(d: &mut FileDecoder, code: u16) -> IoResult<Option<Value>> {
    Ok(d.find_tag(field(code))?)
}

fn uint(d: &mut FileDecoder, code: u16) -> IoResult<Option<u64>> {
    value(d, code)?.map(|v| v.into_u64().map_err(IoError::from)).transpose()
}

fn uints(d: &mut FileDecoder, code: u16) -> IoResult<Vec<u64>> {
    Ok(value(d, code)?.map(Value::into_u64_vec).transpose()?.unwrap_or_default())
}

fn bytes(d: &mut FileDecoder, code: u16) -> IoResult<Option<Vec<u8>>> {
    Ok(value(d, code)?.map(Value::into_u8_vec).transpose()?)
}

fn ascii(d: &mut FileDecoder, code: u16) -> IoResult<Option<String>> {
    let text = match value(d, code)? {
        Some(Value::Ascii(s)) => s,
        Some(other) => return Err(IoError::invalid(format!("field {code} is not text: {other:?}"))),
        None => return Ok(None),
    };
    Ok(Some(text.trim_end_matches('\0').to_owned()))
}

fn real(d: &mut FileDecoder, code: u16) -> IoResult<Option<f64>> {
    let v = match value(d, code)? {
        Some(Value::Rational(n, q)) => (q != 0).then(|| n as f64 / q as f64),
        Some(Value::RationalBig(n, q)) => (q != 0).then(|| n as f64 / q as f64),
        Some(Value::Float(f)) => Some(f as f64),
        Some(Value::Double(f)) => Some(f),
        Some(other) => other.into_u64().ok().map(|v| v as f64),
        None => None,
    };
    Ok(v)
}

/// Shape fields compared by [`ContainerReader::read_into`].
#[derive(Debug, Clone, Copy)]
struct Shape {
    cols: u64,
    rows: u64,
    channels: u64,
    bits: u64,
    format: u64,
}

impl Shape {
    fn of(d: &mut FileDecoder) -> IoResult<Self> {
        let cols = uint(d, tags::IMAGE_WIDTH)?.ok_or_else(|| IoError::invalid("missing image width"))?;
        let rows = uint(d, tags::IMAGE_LENGTH)?.ok_or_else(|| IoError::invalid("missing image length"))?;
        let channels = uint(d, tags::SAMPLES_PER_PIXEL)?.unwrap_or(1);
        let bits = uints(d, tags::BITS_PER_SAMPLE)?;
        let bits_first = bits.first().copied().unwrap_or(1);
        if bits.iter().any(|&b| b != bits_first) {
            return Err(IoError::UnsupportedFormat(format!("mixed bits per sample {bits:?}")));
        }
        let formats = uints(d, tags::SAMPLE_FORMAT)?;
        let format = formats.first().copied().unwrap_or(tags::SAMPLE_FORMAT_UINT as u64);
        Ok(Self { cols, rows, channels, bits: bits_first, format })
    }

    fn of_buffer(buffer: &PixelBuffer) -> Self {
        let format = if buffer.kind().is_float() { tags::SAMPLE_FORMAT_IEEEFP } else { tags::SAMPLE_FORMAT_UINT };
        Self {
            cols: buffer.cols() as u64,
            rows: buffer.rows() as u64,
            channels: buffer.channels() as u64,
            bits: buffer.kind().bits() as u64,
            format: format as u64,
        }
    }

    fn compare(&self, file: &Self) -> IoResult<()> {
        let pairs = [
            ("width", self.cols, file.cols),
            ("rows", self.rows, file.rows),
            ("channels", self.channels, file.channels),
            ("bits per sample", self.bits, file.bits),
            ("sample format", self.format, file.format),
        ];
        for (field, expected, actual) in pairs {
            if expected != actual {
                return Err(IoError::mismatch(field, expected, actual));
            }
        }
        Ok(())
    }

    fn kind(&self) -> IoResult<SampleKind> {
        let float = match u16::try_from(self.format) {
            Ok(tags::SAMPLE_FORMAT_UINT) => false,
            Ok(tags::SAMPLE_FORMAT_IEEEFP) => true,
            _ => return Err(IoError::UnsupportedFormat(format!("sample format {}", self.format))),
        };
        u16::try_from(self.bits)
            .ok()
            .and_then(|b| SampleKind::from_bits(b, float))
            .ok_or_else(|| IoError::UnsupportedFormat(format!("{} bits per sample, float = {float}", self.bits)))
    }
}

/// Strip layout of the current directory.
#[derive(Debug)]
struct Strips {
    rows: usize,
    cols: usize,
    channels: usize,
    kind: SampleKind,
    planar: bool,
    rows_per_strip: usize,
}

impl Strips {
    fn of(d: &mut FileDecoder) -> IoResult<Self> {
        let shape = Shape::of(d)?;
        let kind = shape.kind()?;
        let (rows, cols, channels) = (shape.rows as usize, shape.cols as usize, shape.channels as usize);
        if rows == 0 || cols == 0 || channels == 0 {
            return Err(IoError::invalid(format!("empty image {rows}x{cols}x{channels}")));
        }
        if value(d, tags::STRIP_OFFSETS)?.is_none() {
            return Err(IoError::UnsupportedFormat("no strip offsets (tiled layout?)".into()));
        }
        let planar = match uint(d, tags::PLANAR_CONFIGURATION)?.unwrap_or(1) {
            1 => false,
            2 => true,
            p => return Err(IoError::UnsupportedFormat(format!("planar configuration {p}"))),
        };
        let rows_per_strip = uint(d, tags::ROWS_PER_STRIP)?.map_or(rows, |r| (r.min(rows as u64) as usize).max(1));
        Ok(Self { rows, cols, channels, kind, planar, rows_per_strip })
    }
}

/// Random-access reader of a container file.
pub struct ContainerReader {
    /// `None` for a container without directories.
    decoder: Option<FileDecoder>,
    /// Second handle for the capture sub-directories.
    raw: File,
    header: Header,
    count: usize,
    options: ReadOptions,
    path: PathBuf,
}

impl ContainerReader {
    /// Opens `path` and walks its directory chain.
    pub fn open<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        trace!(path = %path.display(), "open container");
        let mut raw = File::open(path)?;
        let header = Header::read(&mut raw)?;

        let (decoder, count) = if header.first_directory == 0 {
            (None, 0)
        } else {
            let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?.with_limits(Limits::unlimited());
            let mut count = 1;
            while decoder.more_images() {
                decoder.next_image()?;
                count += 1;
            }
            (Some(decoder), count)
        };
        debug!(directories = count, big = header.big, endian = ?header.endian, "container opened");
        Ok(Self { decoder, raw, header, count, options: ReadOptions::default(), path: path.to_path_buf() })
    }

    /// Replaces the reader options.
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Directories in the file.
    pub fn directory_count(&self) -> usize {
        self.count
    }

    /// Byte order of the file.
    pub fn endian(&self) -> Endian {
        self.header.endian
    }

    /// Whether the file uses 64-bit offsets.
    pub fn is_big(&self) -> bool {
        self.header.big
    }

    /// Positions the decoder on directory `index`.
    fn select(&mut self, index: usize) -> IoResult<&mut FileDecoder> {
        let count = self.count;
        let decoder = match self.decoder.as_mut() {
            Some(d) if index < count => d,
            _ => return Err(IoError::DirectoryOutOfRange { index, count }),
        };
        decoder.seek_to_image(index)?;
        Ok(decoder)
    }

    /// Whether directory `index` carries field `code`.
    pub fn has_field(&mut self, index: usize, code: u16) -> IoResult<bool> {
        let d = self.select(index)?;
        Ok(value(d, code)?.is_some())
    }

    /// Text of field `code` in directory `index`.
    pub fn ascii_field(&mut self, index: usize, code: u16) -> IoResult<Option<String>> {
        let d = self.select(index)?;
        ascii(d, code)
    }

    /// Summarizes directory `index`.
    pub fn probe(&mut self, index: usize) -> IoResult<DirectoryInfo> {
        let d = self.select(index)?;
        let shape = Shape::of(d)?;
        let channels = shape.channels as usize;
        let compression = uint(d, tags::COMPRESSION)?.unwrap_or(1) as u16;
        let photometric = photometric_of(d, channels)?;
        let has_profile = value(d, tags::ICC_PROFILE)?.is_some();
        let resolution = resolution_of(d)?;
        let meta = self.frame_metadata(index)?;
        Ok(DirectoryInfo {
            index,
            rows: shape.rows as usize,
            cols: shape.cols as usize,
            channels,
            bits_per_sample: shape.bits as u16,
            sample_format: shape.format as u16,
            compression,
            photometric,
            has_profile,
            meta,
            resolution,
        })
    }

    /// Decodes directory `index` into a single-frame buffer.
    pub fn read_directory(&mut self, index: usize) -> IoResult<PixelBuffer> {
        let d = self.select(index)?;
        let strips = Strips::of(d)?;
        let mut buffer = PixelBuffer::try_new(strips.rows, strips.cols, strips.channels, strips.kind, 1)?;
        decode_strips(d, &strips, &mut buffer, 0)?;
        let resolution = resolution_of(d)?;

        self.apply_color(index, &mut buffer)?;
        buffer.set_resolution(resolution);
        let meta = self.frame_metadata(index)?;
        if let Some(slot) = buffer.frame_meta_mut(0) {
            *slot = meta;
        }
        buffer.set_filename(self.path.clone());
        trace!(index, rows = strips.rows, cols = strips.cols, channels = strips.channels, kind = %strips.kind, "directory decoded");
        Ok(buffer)
    }

    /// Decodes every directory, one buffer each.
    pub fn read_all(&mut self) -> IoResult<Vec<PixelBuffer>> {
        (0..self.directory_count()).map(|i| self.read_directory(i)).collect()
    }

    /// Fills an existing buffer from `buffer.frames()` consecutive
    /// directories starting at `first`.
    ///
    /// Width, rows, channels, bits per sample and sample format of every
    /// directory are checked first; a mismatch is reported as
    /// [`IoError::FieldMismatch`] and the buffer is left untouched. Pixels
    /// and frame metadata are replaced only after all directories decoded.
    /// The buffer keeps its profile and resolution.
    pub fn read_into(&mut self, buffer: &mut PixelBuffer, first: usize) -> IoResult<()> {
        if !buffer.is_valid() {
            return Err(scanbuf_core::Error::InvalidBuffer.into());
        }
        let frames = buffer.frames();
        let count = self.directory_count();
        let end = match first.checked_add(frames) {
            Some(end) if end <= count => end,
            _ => return Err(IoError::DirectoryOutOfRange { index: first.saturating_add(frames - 1), count }),
        };

        let expected = Shape::of_buffer(buffer);
        for i in first..end {
            let d = self.select(i)?;
            expected.compare(&Shape::of(d)?)?;
        }

        let mut staging = PixelBuffer::try_new(buffer.rows(), buffer.cols(), buffer.channels(), buffer.kind(), frames)?;
        let mut metas = Vec::with_capacity(frames);
        for (frame, i) in (first..end).enumerate() {
            let d = self.select(i)?;
            let strips = Strips::of(d)?;
            decode_strips(d, &strips, &mut staging, frame)?;
            metas.push(self.frame_metadata(i)?);
        }

        buffer.data_mut().copy_from_slice(staging.data());
        for (frame, meta) in metas.into_iter().enumerate() {
            if let Some(slot) = buffer.frame_meta_mut(frame) {
                *slot = meta;
            }
        }
        debug!(first, frames, "buffer filled from container");
        Ok(())
    }

    /// Profile and photometric interpretation.
    fn apply_color(&mut self, index: usize, buffer: &mut PixelBuffer) -> IoResult<()> {
        let channels = buffer.channels();
        let d = self.select(index)?;
        let file_photometric = photometric_of(d, channels)?;

        if let Some(icc) = bytes(d, tags::ICC_PROFILE)? {
            match ColorProfile::from_bytes(icc) {
                Ok(profile) => {
                    let space = profile.color_space_name();
                    if buffer.attach_profile(Some(profile)) {
                        return Ok(());
                    }
                    warn!(%space, channels, "embedded profile does not match channel count, ignored");
                }
                Err(err) => warn!(%err, "embedded profile unreadable, ignored"),
            }
        }

        if self.options.assign_default_profile {
            match scanbuf_icc::default_profile_for(channels) {
                Ok(Some(profile)) => {
                    buffer.attach_profile(Some(profile));
                }
                Ok(None) => {}
                Err(err) => warn!(%err, "default profile unavailable"),
            }
        }
        buffer.set_photometric(file_photometric);
        Ok(())
    }

    fn frame_metadata(&mut self, index: usize) -> IoResult<FrameMetadata> {
        let d = self.select(index)?;
        let mut meta = FrameMetadata::default();

        meta.tag = ascii(d, tags::IMAGE_DESCRIPTION)?
            .filter(|t| t != UNDEFINED_TAG)
            .unwrap_or_default();
        meta.parent_name = ascii(d, tags::PAGE_NAME)?;

        let x = real(d, tags::X_POSITION)?;
        let y = real(d, tags::Y_POSITION)?;
        let position = |v: Option<f64>| v.map_or(-1, |v| v.round() as i32);
        meta.anchor = (position(x), position(y));

        // Only whole lines are kept.
        if let Some(xml) = bytes(d, tags::XML_PACKET)? {
            if let Some(end) = xml.iter().rposition(|&b| b == b'\n') {
                meta.xml = xml[..=end].to_vec();
            }
        }

        if let Some(offset) = uint(d, tags::EXIF_IFD)? {
            match exif::read_ascii(&mut self.raw, &self.header, offset, tags::SUB_SEC_TIME) {
                Ok(text) => meta.elapsed = text.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
                Err(err) => warn!(%err, offset, "capture sub-directory unreadable"),
            }
        }
        Ok(meta)
    }
}

fn decode_strips(d: &mut FileDecoder, s: &Strips, buffer: &mut PixelBuffer, frame: usize) -> IoResult<()> {
    let bps = s.kind.bytes();
    let (planes, samples_per_row) = if s.planar { (s.channels, s.cols) } else { (1, s.cols * s.channels) };
    let row_bytes = samples_per_row * bps;
    let strips_per_plane = s.rows.div_ceil(s.rows_per_strip);

    for plane in 0..planes {
        for strip in 0..strips_per_plane {
            let chunk = u32::try_from(plane * strips_per_plane + strip)
                .map_err(|_| IoError::malformed("strip index exceeds 32 bits"))?;
            let first_row = strip * s.rows_per_strip;
            let n = s.rows_per_strip.min(s.rows - first_row);

            let decoded = d.read_chunk(chunk)?;
            let data: &[u8] = match (&decoded, s.kind) {
                (DecodingResult::U8(v), SampleKind::U8) => v,
                (DecodingResult::U16(v), SampleKind::U16) => bytemuck::cast_slice(v),
                (DecodingResult::F32(v), SampleKind::F32) => bytemuck::cast_slice(v),
                _ => return Err(IoError::DecodeError(format!("strip {chunk} decoded to an unexpected sample type"))),
            };
            if data.len() < n * row_bytes {
                return Err(IoError::DecodeError(format!(
                    "strip {chunk} holds {} bytes, {} needed",
                    data.len(),
                    n * row_bytes
                )));
            }

            for (i, row) in data.chunks_exact(row_bytes).take(n).enumerate() {
                let dst = buffer.scan_line_mut(first_row + i, frame);
                if s.planar {
                    let pixel = s.channels * bps;
                    for (c, sample) in row.chunks_exact(bps).enumerate() {
                        let at = c * pixel + plane * bps;
                        dst[at..at + bps].copy_from_slice(sample);
                    }
                } else {
                    dst[..row_bytes].copy_from_slice(row);
                }
            }
        }
    }
    Ok(())
}

fn photometric_of(d: &mut FileDecoder, channels: usize) -> IoResult<u16> {
    Ok(uint(d, tags::PHOTOMETRIC)?.map_or(default_photometric(channels), |p| p as u16))
}

fn resolution_of(d: &mut FileDecoder) -> IoResult<Resolution> {
    let unit = uint(d, tags::RESOLUTION_UNIT)?;
    let scale = if unit == Some(tags::RESUNIT_CENTIMETER as u64) { 2.54 } else { 1.0 };
    let axis = |v: Option<f64>| v.filter(|v| *v > 0.0).map_or(Resolution::default().x, |v| (v * scale) as f32);
    let x = real(d, tags::X_RESOLUTION)?;
    let y = real(d, tags::Y_RESOLUTION)?;
    Ok(Resolution { x: axis(x), y: axis(y) })
}
