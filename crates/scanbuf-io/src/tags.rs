//! Field tags and enumerated values.
//!
//! Codes are kept as plain numbers so the capture sub-directory, which
//! the `tiff` encoder does not write, can share them with the main
//! directories. [`field`] maps a code onto the `tiff` crate's tag.

use tiff::tags::Tag;

/// The `tiff` tag for `code`, known or not.
pub fn field(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

// === Tags ===

/// Subfile kind, 2 = one page of a multi-page file.
pub const NEW_SUBFILE_TYPE: u16 = 254;
/// Columns.
pub const IMAGE_WIDTH: u16 = 256;
/// Rows in this directory.
pub const IMAGE_LENGTH: u16 = 257;
/// Bits per sample, one value per channel.
pub const BITS_PER_SAMPLE: u16 = 258;
/// Compression scheme.
pub const COMPRESSION: u16 = 259;
/// Photometric interpretation.
pub const PHOTOMETRIC: u16 = 262;
/// Free-text description; carries the frame tag.
pub const IMAGE_DESCRIPTION: u16 = 270;
/// Byte offset of each strip.
pub const STRIP_OFFSETS: u16 = 273;
/// Orientation, 1 = top-left.
pub const ORIENTATION: u16 = 274;
/// Channels.
pub const SAMPLES_PER_PIXEL: u16 = 277;
/// Rows per strip.
pub const ROWS_PER_STRIP: u16 = 278;
/// Compressed byte count of each strip.
pub const STRIP_BYTE_COUNTS: u16 = 279;
/// Horizontal resolution.
pub const X_RESOLUTION: u16 = 282;
/// Vertical resolution.
pub const Y_RESOLUTION: u16 = 283;
/// 1 = interleaved, 2 = one plane per channel.
pub const PLANAR_CONFIGURATION: u16 = 284;
/// Page name; carries the parent name.
pub const PAGE_NAME: u16 = 285;
/// Horizontal anchor.
pub const X_POSITION: u16 = 286;
/// Vertical anchor.
pub const Y_POSITION: u16 = 287;
/// Resolution unit.
pub const RESOLUTION_UNIT: u16 = 296;
/// Differencing predictor.
pub const PREDICTOR: u16 = 317;
/// Meaning of channels beyond the photometric ones.
pub const EXTRA_SAMPLES: u16 = 338;
/// 1 = unsigned integer, 3 = IEEE float.
pub const SAMPLE_FORMAT: u16 = 339;
/// XML side channel.
pub const XML_PACKET: u16 = 700;
/// Offset of the capture sub-directory.
pub const EXIF_IFD: u16 = 34665;
/// Embedded ICC profile.
pub const ICC_PROFILE: u16 = 34675;
/// Elapsed time, ASCII decimal, inside the capture sub-directory.
pub const SUB_SEC_TIME: u16 = 37520;

// === Values ===

/// Page of a multi-page file.
pub const SUBFILE_PAGE: u32 = 2;
/// Uncompressed strips.
pub const COMPRESSION_NONE: u16 = 1;
/// LZW strips.
pub const COMPRESSION_LZW: u16 = 5;
/// Top-left origin.
pub const ORIENTATION_TOP_LEFT: u16 = 1;
/// Interleaved channels.
pub const PLANAR_CONTIG: u16 = 1;
/// One plane per channel.
pub const PLANAR_SEPARATE: u16 = 2;
/// No predictor.
pub const PREDICTOR_NONE: u16 = 1;
/// Horizontal differencing.
pub const PREDICTOR_HORIZONTAL: u16 = 2;
/// Unsigned integer samples.
pub const SAMPLE_FORMAT_UINT: u16 = 1;
/// IEEE float samples.
pub const SAMPLE_FORMAT_IEEEFP: u16 = 3;
/// Resolution in dots per inch.
pub const RESUNIT_INCH: u16 = 2;
/// Resolution in dots per centimeter.
pub const RESUNIT_CENTIMETER: u16 = 3;
/// Extra channel of unspecified meaning.
pub const EXTRASAMPLE_UNSPECIFIED: u16 = 0;

// === Layout ===

/// Little-endian byte order mark.
pub const MAGIC_LE: [u8; 2] = *b"II";
/// Big-endian byte order mark.
pub const MAGIC_BE: [u8; 2] = *b"MM";
/// Classic version, 32-bit offsets.
pub const VERSION_CLASSIC: u16 = 42;
/// BigTIFF version, 64-bit offsets.
pub const VERSION_BIG: u16 = 43;
/// Payloads above this many bytes are written with 64-bit offsets.
pub const BIG_THRESHOLD: u64 = 100_000_000;
