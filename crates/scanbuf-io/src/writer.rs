//! Container writing on top of the `tiff` encoder.
//!
//! Every directory is LZW-compressed. Integer images with 1, 3 or 4
//! channels also get horizontal differencing; float images and unusual
//! channel counts are written as a flat run of samples, with the layout
//! fields rewritten afterwards. Rows are grouped into strips of about
//! [`STRIP_BYTES`], and the image encoder is only opened once the first
//! row arrives, so a directory that never receives a row is not recorded.

use std::borrow::Cow;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use scanbuf_core::{
    ColorProfile, FrameMetadata, PixelBuffer, Resolution, SampleKind, default_photometric, photometric,
};
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{
    Compression, ImageEncoder, Rational, TiffEncoder, TiffKind, TiffKindBig, TiffKindStandard, TiffValue,
};
use tiff::tags::{Predictor, ResolutionUnit, Type};
use tracing::{debug, trace, warn};

use crate::tags::{self, field};
use crate::{IoError, IoResult, exif};

/// Denominator of written resolution rationals.
const RESOLUTION_DENOMINATOR: u32 = 10_000;

/// Target uncompressed size of one strip.
pub const STRIP_BYTES: usize = 64 * 1024;

/// Everything a directory records besides its strips.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySpec {
    /// Rows declared for the directory.
    pub rows: usize,
    /// Columns.
    pub cols: usize,
    /// Samples per pixel.
    pub channels: usize,
    /// Sample depth.
    pub kind: SampleKind,
    /// Photometric tag of a profile-less buffer.
    pub photometric: u16,
    /// Embedded profile.
    pub profile: Option<ColorProfile>,
    /// Physical resolution.
    pub resolution: Resolution,
    /// Frame metadata.
    pub meta: FrameMetadata,
}

impl DirectorySpec {
    /// Describes one frame of `buffer`.
    pub fn for_frame(buffer: &PixelBuffer, frame: usize) -> Self {
        Self {
            rows: buffer.rows(),
            cols: buffer.cols(),
            channels: buffer.channels(),
            kind: buffer.kind(),
            photometric: buffer.photometric(),
            profile: buffer.profile().cloned(),
            resolution: buffer.resolution(),
            meta: buffer.frame_meta(frame).cloned().unwrap_or_default(),
        }
    }

    /// Bytes in one unpadded row.
    pub fn row_bytes(&self) -> usize {
        self.cols * self.channels * self.kind.bytes()
    }

    /// Rows grouped into one strip.
    pub fn strip_rows(&self) -> usize {
        (STRIP_BYTES / self.row_bytes().max(1)).clamp(1, self.rows.max(1))
    }

    /// Photometric value written to the file.
    pub fn photometric_tag(&self) -> u16 {
        match &self.profile {
            Some(p) if p.photometric() != 0 => p.photometric(),
            Some(_) => default_photometric(self.channels),
            None => self.photometric,
        }
    }

    /// Channels beyond those the photometric interpretation accounts for.
    pub fn extra_samples(&self) -> usize {
        let base = match self.photometric_tag() {
            photometric::MIN_IS_WHITE | photometric::MIN_IS_BLACK => 1,
            photometric::RGB | photometric::YCBCR | photometric::ICC_LAB => 3,
            _ => self.channels,
        };
        self.channels.saturating_sub(base)
    }

    fn check(&self) -> IoResult<()> {
        if self.rows == 0 || self.cols == 0 || self.channels == 0 {
            return Err(IoError::EncodeError(format!(
                "empty directory {}x{}x{}",
                self.rows, self.cols, self.channels
            )));
        }
        let flat_cols = self.cols.checked_mul(self.channels).unwrap_or(usize::MAX);
        if self.channels > u16::MAX as usize || flat_cols > u32::MAX as usize || self.rows > u32::MAX as usize {
            return Err(IoError::EncodeError(format!(
                "directory {}x{}x{} exceeds field range",
                self.rows, self.cols, self.channels
            )));
        }
        Ok(())
    }

    fn layout(&self) -> Layout {
        if self.kind.is_float() {
            return Layout::Flat;
        }
        match self.channels {
            1 => Layout::Gray,
            3 => Layout::Rgb,
            4 if self.photometric_tag() == photometric::SEPARATED => Layout::Cmyk,
            4 => Layout::Rgba,
            _ => Layout::Flat,
        }
    }
}

/// How samples are handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Gray,
    Rgb,
    Rgba,
    Cmyk,
    /// One sample per encoder pixel, `cols * channels` wide.
    Flat,
}

impl Layout {
    fn predictor(self) -> Predictor {
        match self {
            Self::Flat => Predictor::None,
            _ => Predictor::Horizontal,
        }
    }
}

/// Raw bytes written with the UNDEFINED field type.
struct UndefinedBytes<'a>(&'a [u8]);

impl TiffValue for UndefinedBytes<'_> {
    const BYTE_LEN: u8 = 1;
    const FIELD_TYPE: Type = Type::UNDEFINED;

    fn count(&self) -> usize {
        self.0.len()
    }

    fn data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.0)
    }
}

enum Encoder<W: Write + Seek> {
    Classic(TiffEncoder<W, TiffKindStandard>),
    Big(TiffEncoder<W, TiffKindBig>),
}

impl<W: Write + Seek> Encoder<W> {
    fn with_predictor(self, predictor: Predictor) -> Self {
        match self {
            Self::Classic(e) => Self::Classic(e.with_predictor(predictor)),
            Self::Big(e) => Self::Big(e.with_predictor(predictor)),
        }
    }

    fn open<'a>(&'a mut self, spec: &DirectorySpec) -> IoResult<Box<dyn StripSink + 'a>> {
        match self {
            Self::Classic(e) => open_kind(e, spec, false),
            Self::Big(e) => open_kind(e, spec, true),
        }
    }
}

fn open_kind<'a, W, K>(
    enc: &'a mut TiffEncoder<W, K>,
    spec: &DirectorySpec,
    big: bool,
) -> IoResult<Box<dyn StripSink + 'a>>
where
    W: Write + Seek + 'a,
    K: TiffKind + 'a,
{
    use SampleKind::{F32, U8, U16};
    match (spec.layout(), spec.kind) {
        (Layout::Gray, U8) => Strips::<W, colortype::Gray8, K>::open(enc, spec, 1, big),
        (Layout::Gray, U16) => Strips::<W, colortype::Gray16, K>::open(enc, spec, 1, big),
        (Layout::Rgb, U8) => Strips::<W, colortype::RGB8, K>::open(enc, spec, 1, big),
        (Layout::Rgb, U16) => Strips::<W, colortype::RGB16, K>::open(enc, spec, 1, big),
        (Layout::Rgba, U8) => Strips::<W, colortype::RGBA8, K>::open(enc, spec, 1, big),
        (Layout::Rgba, U16) => Strips::<W, colortype::RGBA16, K>::open(enc, spec, 1, big),
        (Layout::Cmyk, U8) => Strips::<W, colortype::CMYK8, K>::open(enc, spec, 1, big),
        (Layout::Cmyk, U16) => Strips::<W, colortype::CMYK16, K>::open(enc, spec, 1, big),
        (_, U8) => Strips::<W, colortype::Gray8, K>::open(enc, spec, spec.channels, big),
        (_, U16) => Strips::<W, colortype::Gray16, K>::open(enc, spec, spec.channels, big),
        (_, F32) => Strips::<W, colortype::Gray32Float, K>::open(enc, spec, spec.channels, big),
    }
}

/// Receives the rows of one open directory.
trait StripSink {
    /// Appends one unpadded row.
    fn push_row(&mut self, row: &[u8]) -> IoResult<()>;

    /// Writes the directory, recording `rows` rows.
    fn close(self: Box<Self>, rows: usize, elapsed: u64) -> IoResult<()>;
}

struct Strips<'a, W: Write + Seek + 'a, C: ColorType, K: TiffKind + 'a> {
    image: ImageEncoder<'a, W, C, K>,
    /// Rows waiting for a full strip.
    pending: Vec<C::Inner>,
    pending_rows: usize,
    strip_rows: usize,
    row_samples: usize,
    declared: usize,
    strips: usize,
    big: bool,
}

impl<'a, W, C, K> Strips<'a, W, C, K>
where
    W: Write + Seek + 'a,
    C: ColorType + 'a,
    C::Inner: Pod,
    [C::Inner]: TiffValue,
    K: TiffKind + 'a,
{
    /// Opens the image; `widen` is 1 for typed layouts and the channel
    /// count for flat ones.
    fn open(
        enc: &'a mut TiffEncoder<W, K>,
        spec: &DirectorySpec,
        widen: usize,
        big: bool,
    ) -> IoResult<Box<dyn StripSink + 'a>> {
        let width = (spec.cols * widen) as u32;
        let strip_rows = spec.strip_rows();
        let mut image = enc.new_image::<C>(width, spec.rows as u32)?;
        image.rows_per_strip(strip_rows as u32)?;

        let rational = |v: f32| Rational {
            n: (v.max(0.0) * RESOLUTION_DENOMINATOR as f32).round() as u32,
            d: RESOLUTION_DENOMINATOR,
        };
        image.resolution_unit(ResolutionUnit::Inch);
        image.x_resolution(rational(spec.resolution.x));
        image.y_resolution(rational(spec.resolution.y));
        write_fields(&mut image, spec)?;

        let row_samples = spec.cols * spec.channels;
        Ok(Box::new(Self {
            image,
            pending: Vec::with_capacity(row_samples * strip_rows),
            pending_rows: 0,
            strip_rows,
            row_samples,
            declared: spec.rows,
            strips: 0,
            big,
        }))
    }

    fn flush(&mut self) -> IoResult<()> {
        self.image.write_strip(&self.pending)?;
        self.pending.clear();
        self.pending_rows = 0;
        self.strips += 1;
        Ok(())
    }
}

impl<'a, W, C, K> StripSink for Strips<'a, W, C, K>
where
    W: Write + Seek + 'a,
    C: ColorType + 'a,
    C::Inner: Pod,
    [C::Inner]: TiffValue,
    K: TiffKind + 'a,
{
    fn push_row(&mut self, row: &[u8]) -> IoResult<()> {
        let at = self.pending.len();
        self.pending.resize(at + self.row_samples, C::Inner::zeroed());
        bytemuck::cast_slice_mut::<C::Inner, u8>(&mut self.pending[at..]).copy_from_slice(row);
        self.pending_rows += 1;

        let remaining = self.declared - self.strips * self.strip_rows;
        if self.pending_rows == self.strip_rows.min(remaining) {
            self.flush()?;
        }
        Ok(())
    }

    fn close(self: Box<Self>, rows: usize, elapsed: u64) -> IoResult<()> {
        let mut this = *self;
        if this.pending_rows > 0 {
            // A short final strip is padded to the size the encoder
            // expects; the recorded length hides the padding.
            let remaining = this.declared - this.strips * this.strip_rows;
            let samples = this.strip_rows.min(remaining) * this.row_samples;
            this.pending.resize(samples, C::Inner::zeroed());
            this.flush()?;
        }

        let big = this.big;
        let dir = this.image.encoder();
        if elapsed != 0 {
            let value = exif::elapsed_value(elapsed);
            let value_at = if exif::fits_inline(&value, big) {
                None
            } else {
                Some(dir.write_data(UndefinedBytes(&value))?)
            };
            let sub = exif::encode_directory(&value, value_at, big)?;
            let at = dir.write_data(UndefinedBytes(&sub))?;
            if big {
                dir.write_tag(field(tags::EXIF_IFD), at)?;
            } else {
                let at = u32::try_from(at)
                    .map_err(|_| IoError::EncodeError("classic container would exceed 4 GiB".into()))?;
                dir.write_tag(field(tags::EXIF_IFD), at)?;
            }
        }
        dir.write_tag(field(tags::IMAGE_LENGTH), rows as u32)?;
        this.image.finish()?;
        Ok(())
    }
}

/// Layout and metadata fields. Layout fields written by the encoder are
/// overwritten so flat and relabelled images describe the real samples.
fn write_fields<W, C, K>(image: &mut ImageEncoder<'_, W, C, K>, spec: &DirectorySpec) -> IoResult<()>
where
    W: Write + Seek,
    C: ColorType,
    K: TiffKind,
{
    let ch = spec.channels;
    let format = if spec.kind.is_float() { tags::SAMPLE_FORMAT_IEEEFP } else { tags::SAMPLE_FORMAT_UINT };
    let dir = image.encoder();

    dir.write_tag(field(tags::NEW_SUBFILE_TYPE), tags::SUBFILE_PAGE)?;
    dir.write_tag(field(tags::IMAGE_WIDTH), spec.cols as u32)?;
    dir.write_tag(field(tags::SAMPLES_PER_PIXEL), ch as u16)?;
    dir.write_tag(field(tags::BITS_PER_SAMPLE), &vec![spec.kind.bits(); ch][..])?;
    dir.write_tag(field(tags::SAMPLE_FORMAT), &vec![format; ch][..])?;
    dir.write_tag(field(tags::PHOTOMETRIC), spec.photometric_tag())?;
    dir.write_tag(field(tags::IMAGE_DESCRIPTION), spec.meta.tag_or_default())?;
    dir.write_tag(field(tags::ORIENTATION), tags::ORIENTATION_TOP_LEFT)?;
    dir.write_tag(field(tags::PLANAR_CONFIGURATION), tags::PLANAR_CONTIG)?;
    let extra = spec.extra_samples();
    if extra > 0 {
        dir.write_tag(field(tags::EXTRA_SAMPLES), &vec![tags::EXTRASAMPLE_UNSPECIFIED; extra][..])?;
    }
    if let Some(name) = &spec.meta.parent_name {
        dir.write_tag(field(tags::PAGE_NAME), name.as_str())?;
    }
    if spec.meta.has_anchor() {
        let (x, y) = spec.meta.anchor;
        dir.write_tag(field(tags::X_POSITION), Rational { n: x.max(0) as u32, d: 1 })?;
        dir.write_tag(field(tags::Y_POSITION), Rational { n: y.max(0) as u32, d: 1 })?;
    }
    if !spec.meta.xml.is_empty() {
        dir.write_tag(field(tags::XML_PACKET), &spec.meta.xml[..])?;
    }
    if let Some(p) = &spec.profile {
        dir.write_tag(field(tags::ICC_PROFILE), UndefinedBytes(p.as_bytes()))?;
    }
    Ok(())
}

/// Sequential writer of a container file.
pub struct ContainerWriter<W: Write + Seek> {
    encoder: Option<Encoder<W>>,
    predictor: Predictor,
    big: bool,
    directories: usize,
}

impl ContainerWriter<File> {
    /// Creates `path`, truncating any existing file.
    ///
    /// The file is not buffered, so a failed write surfaces at the call
    /// that caused it.
    pub fn create<P: AsRef<Path>>(path: P, big: bool) -> IoResult<Self> {
        let file = File::create(path.as_ref())?;
        trace!(path = %path.as_ref().display(), big, "create container");
        Self::new(file, big)
    }

    /// Creates `path`, choosing 64-bit offsets when `payload` raw bytes
    /// exceed the classic threshold.
    pub fn create_for_payload<P: AsRef<Path>>(path: P, payload: u64) -> IoResult<Self> {
        Self::create(path, payload > tags::BIG_THRESHOLD)
    }
}

impl<W: Write + Seek> ContainerWriter<W> {
    /// Writes the header to `out`, which must be positioned at its start.
    pub fn new(out: W, big: bool) -> IoResult<Self> {
        let encoder = if big {
            Encoder::Big(TiffEncoder::new_big(out)?.with_compression(Compression::Lzw))
        } else {
            Encoder::Classic(TiffEncoder::new(out)?.with_compression(Compression::Lzw))
        };
        Ok(Self { encoder: Some(encoder), predictor: Predictor::None, big, directories: 0 })
    }

    /// Whether 64-bit offsets are in use.
    pub fn is_big(&self) -> bool {
        self.big
    }

    /// Directories completed so far.
    pub fn directories(&self) -> usize {
        self.directories
    }

    /// Writes every frame of `buffer`, one directory each.
    pub fn write_buffer(&mut self, buffer: &PixelBuffer) -> IoResult<()> {
        if !buffer.is_valid() {
            return Err(scanbuf_core::Error::InvalidBuffer.into());
        }
        for frame in 0..buffer.frames() {
            let mut dir = self.begin_directory(DirectorySpec::for_frame(buffer, frame))?;
            for row in 0..buffer.rows() {
                dir.write_row(buffer.scan_line(row, frame))?;
            }
            dir.finish()?;
        }
        Ok(())
    }

    /// Starts a directory whose rows are supplied incrementally.
    pub fn begin_directory(&mut self, spec: DirectorySpec) -> IoResult<DirectoryWriter<'_, W>> {
        spec.check()?;
        let predictor = spec.layout().predictor();
        if predictor != self.predictor {
            let encoder = self.encoder.take().ok_or_else(|| IoError::EncodeError("container closed".into()))?;
            self.encoder = Some(encoder.with_predictor(predictor));
            self.predictor = predictor;
        }
        let encoder = self.encoder.as_mut().ok_or_else(|| IoError::EncodeError("container closed".into()))?;
        Ok(DirectoryWriter {
            stage: Stage::Pending(encoder),
            directories: &mut self.directories,
            spec,
            rows_written: 0,
        })
    }

    /// Ends the container. Every completed directory is already on disk.
    pub fn finish(mut self) -> IoResult<()> {
        self.encoder.take();
        debug!(directories = self.directories, big = self.big, "container closed");
        Ok(())
    }
}

enum Stage<'a, W: Write + Seek> {
    /// No row yet; the image encoder is not open.
    Pending(&'a mut Encoder<W>),
    Open(Box<dyn StripSink + 'a>),
    Closed,
}

/// Streams the rows of one directory.
///
/// Dropping the writer before [`finish`](Self::finish) records the rows
/// written so far, as [`finish_partial`](Self::finish_partial) would.
pub struct DirectoryWriter<'a, W: Write + Seek> {
    stage: Stage<'a, W>,
    directories: &'a mut usize,
    spec: DirectorySpec,
    rows_written: usize,
}

impl<W: Write + Seek> DirectoryWriter<'_, W> {
    /// Directory description.
    pub fn spec(&self) -> &DirectorySpec {
        &self.spec
    }

    /// Rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Appends one row of native-order samples.
    ///
    /// Bytes past [`DirectorySpec::row_bytes`] are ignored, so padded scan
    /// lines can be passed directly.
    pub fn write_row(&mut self, row: &[u8]) -> IoResult<()> {
        let len = self.spec.row_bytes();
        if row.len() < len {
            return Err(IoError::EncodeError(format!("row of {} bytes, expected {len}", row.len())));
        }
        if self.rows_written == self.spec.rows {
            return Err(IoError::EncodeError(format!("directory already holds {} rows", self.spec.rows)));
        }
        if let Stage::Pending(_) = self.stage {
            if let Stage::Pending(encoder) = std::mem::replace(&mut self.stage, Stage::Closed) {
                self.stage = Stage::Open(encoder.open(&self.spec)?);
            }
        }
        match &mut self.stage {
            Stage::Open(sink) => sink.push_row(&row[..len])?,
            _ => return Err(IoError::EncodeError("directory closed".into())),
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Appends consecutive unpadded rows.
    pub fn write_rows(&mut self, rows: &[u8]) -> IoResult<()> {
        let len = self.spec.row_bytes();
        if rows.len() % len != 0 {
            return Err(IoError::EncodeError(format!("{} bytes is not a whole number of rows", rows.len())));
        }
        for row in rows.chunks_exact(len) {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Writes the directory.
    ///
    /// When fewer rows than declared were written, the directory is still
    /// recorded with the rows it has, and [`IoError::Incomplete`] is
    /// returned.
    pub fn finish(mut self) -> IoResult<()> {
        let (written, expected) = (self.rows_written, self.spec.rows);
        self.close()?;
        if written != expected {
            return Err(IoError::Incomplete { written, expected });
        }
        Ok(())
    }

    /// Writes the directory with however many rows were written, and
    /// returns that count. Nothing is recorded when no row was written.
    pub fn finish_partial(mut self) -> IoResult<usize> {
        if self.rows_written == 0 {
            debug!("partial directory empty, not recorded");
        }
        self.close()
    }

    fn close(&mut self) -> IoResult<usize> {
        let rows = self.rows_written;
        if let Stage::Open(sink) = std::mem::replace(&mut self.stage, Stage::Closed) {
            sink.close(rows, u64::from(self.spec.meta.elapsed))?;
            *self.directories += 1;
            trace!(directory = *self.directories - 1, rows, "directory written");
        }
        Ok(rows)
    }
}

impl<W: Write + Seek> Drop for DirectoryWriter<'_, W> {
    fn drop(&mut self) {
        if let Stage::Open(_) = self.stage {
            if let Err(err) = self.close() {
                warn!(%err, rows = self.rows_written, "directory dropped unfinished and could not be closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanbuf_core::profile::{signature, synthetic_profile};
    use std::io::Cursor;

    fn header(bytes: &[u8]) -> exif::Header {
        exif::Header::read(&mut Cursor::new(bytes.to_vec())).unwrap()
    }

    #[test]
    fn test_header_written() {
        let mut out = Cursor::new(Vec::new());
        ContainerWriter::new(&mut out, false).unwrap().finish().unwrap();
        let h = header(out.get_ref());
        assert!(!h.big);
        assert_eq!(h.endian, exif::Endian::native());
        assert_eq!(h.first_directory, 0);

        let mut out = Cursor::new(Vec::new());
        ContainerWriter::new(&mut out, true).unwrap().finish().unwrap();
        assert!(header(out.get_ref()).big);
    }

    #[test]
    fn test_first_directory_linked() {
        let mut buf = PixelBuffer::new(2, 3, 1, SampleKind::U8, 1);
        buf.fill(5u8);
        let mut out = Cursor::new(Vec::new());
        let mut w = ContainerWriter::new(&mut out, false).unwrap();
        w.write_buffer(&buf).unwrap();
        assert_eq!(w.directories(), 1);
        w.finish().unwrap();
        let first = header(out.get_ref()).first_directory as usize;
        assert!(first > 8 && first < out.get_ref().len());
    }

    #[test]
    fn test_photometric_rules() {
        let mut buf = PixelBuffer::new(1, 1, 4, SampleKind::U8, 1);
        assert_eq!(DirectorySpec::for_frame(&buf, 0).photometric_tag(), photometric::SEPARATED);
        assert_eq!(DirectorySpec::for_frame(&buf, 0).layout(), Layout::Cmyk);

        assert!(buf.attach_profile(Some(synthetic_profile(signature::mch(4)))));
        assert_eq!(DirectorySpec::for_frame(&buf, 0).photometric_tag(), photometric::SEPARATED);

        // XYZ has no photometric mapping; the channel count decides.
        let mut xyz = PixelBuffer::new(1, 1, 3, SampleKind::F32, 1);
        assert!(xyz.attach_profile(Some(synthetic_profile(signature::XYZ))));
        let spec = DirectorySpec::for_frame(&xyz, 0);
        assert_eq!(spec.photometric_tag(), photometric::RGB);
        assert_eq!(spec.layout(), Layout::Flat);

        let mut gray = PixelBuffer::new(1, 1, 2, SampleKind::U8, 1);
        gray.set_photometric(photometric::MIN_IS_WHITE);
        let spec = DirectorySpec::for_frame(&gray, 0);
        assert_eq!(spec.photometric_tag(), photometric::MIN_IS_WHITE);
        assert_eq!(spec.extra_samples(), 1);
        assert_eq!(spec.layout(), Layout::Flat);
    }

    #[test]
    fn test_strip_rows() {
        let narrow = DirectorySpec::for_frame(&PixelBuffer::new(100_000, 10, 1, SampleKind::U8, 1), 0);
        assert_eq!(narrow.strip_rows(), STRIP_BYTES / 10);
        let wide = DirectorySpec::for_frame(&PixelBuffer::new(50, 40_000, 3, SampleKind::U16, 1), 0);
        assert_eq!(wide.strip_rows(), 1);
        let short = DirectorySpec::for_frame(&PixelBuffer::new(3, 4, 1, SampleKind::U8, 1), 0);
        assert_eq!(short.strip_rows(), 3);
    }

    #[test]
    fn test_streaming_limits() {
        let buf = PixelBuffer::new(2, 4, 1, SampleKind::U16, 1);
        let mut out = Cursor::new(Vec::new());
        let mut w = ContainerWriter::new(&mut out, false).unwrap();
        let mut dir = w.begin_directory(DirectorySpec::for_frame(&buf, 0)).unwrap();
        assert!(dir.write_row(&[0u8; 4]).is_err());
        dir.write_rows(&[0u8; 16]).unwrap();
        assert!(dir.write_row(&[0u8; 8]).is_err());
        dir.finish().unwrap();
        assert_eq!(w.directories(), 1);
    }

    #[test]
    fn test_incomplete_and_partial() {
        let buf = PixelBuffer::new(5, 2, 1, SampleKind::U8, 1);
        let mut out = Cursor::new(Vec::new());
        let mut w = ContainerWriter::new(&mut out, false).unwrap();

        let mut dir = w.begin_directory(DirectorySpec::for_frame(&buf, 0)).unwrap();
        dir.write_row(&[1, 2]).unwrap();
        assert!(matches!(dir.finish(), Err(IoError::Incomplete { written: 1, expected: 5 })));
        assert_eq!(w.directories(), 1);

        let mut dir = w.begin_directory(DirectorySpec::for_frame(&buf, 0)).unwrap();
        dir.write_rows(&[1, 2, 3, 4]).unwrap();
        assert_eq!(dir.finish_partial().unwrap(), 2);
        assert_eq!(w.directories(), 2);

        let dir = w.begin_directory(DirectorySpec::for_frame(&buf, 0)).unwrap();
        assert_eq!(dir.finish_partial().unwrap(), 0);
        assert_eq!(w.directories(), 2);

        let mut dir = w.begin_directory(DirectorySpec::for_frame(&buf, 0)).unwrap();
        dir.write_row(&[9, 9]).unwrap();
        drop(dir);
        assert_eq!(w.directories(), 3);
    }
}
