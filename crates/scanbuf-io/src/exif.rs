//! File header sniffing and the capture sub-directory.
//!
//! The sub-directory holds a single ASCII entry, the elapsed capture time.
//! The `tiff` encoder only writes top-level directories, so this one is
//! encoded here and handed over as raw bytes. On the way back it is parsed
//! directly, with every count and offset checked against the file length.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian, WriteBytesExt};

use crate::{IoError, IoResult, tags};

const TYPE_ASCII: u16 = 2;

/// Byte order of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// `II`.
    Little,
    /// `MM`.
    Big,
}

impl Endian {
    /// Byte order the encoder writes on this machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") { Self::Big } else { Self::Little }
    }

    fn u16(self, b: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(b),
            Self::Big => BigEndian::read_u16(b),
        }
    }

    fn u32(self, b: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(b),
            Self::Big => BigEndian::read_u32(b),
        }
    }

    fn u64(self, b: &[u8]) -> u64 {
        match self {
            Self::Little => LittleEndian::read_u64(b),
            Self::Big => BigEndian::read_u64(b),
        }
    }
}

/// File header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Byte order.
    pub endian: Endian,
    /// 64-bit offsets.
    pub big: bool,
    /// Offset of the first directory, 0 when there is none.
    pub first_directory: u64,
}

impl Header {
    /// Reads the header at the start of `r`.
    pub fn read<R: Read + Seek>(r: &mut R) -> IoResult<Self> {
        r.seek(SeekFrom::Start(0))?;
        let mut head = [0u8; 16];
        let mut got = 0;
        while got < head.len() {
            match r.read(&mut head[got..])? {
                0 => break,
                n => got += n,
            }
        }
        if got < 8 {
            return Err(IoError::invalid("file too short for a header"));
        }
        let endian = match [head[0], head[1]] {
            tags::MAGIC_LE => Endian::Little,
            tags::MAGIC_BE => Endian::Big,
            m => return Err(IoError::invalid(format!("bad byte order mark {m:02x?}"))),
        };
        match endian.u16(&head[2..4]) {
            tags::VERSION_CLASSIC => Ok(Self { endian, big: false, first_directory: endian.u32(&head[4..8]) as u64 }),
            tags::VERSION_BIG if got == head.len() => {
                if endian.u16(&head[4..6]) != 8 {
                    return Err(IoError::UnsupportedFormat("offset size other than 8".into()));
                }
                Ok(Self { endian, big: true, first_directory: endian.u64(&head[8..16]) })
            }
            v => Err(IoError::invalid(format!("bad version {v}"))),
        }
    }

    fn slot(&self) -> u64 {
        if self.big { 8 } else { 4 }
    }
}

/// Value of the elapsed-time entry, NUL-terminated.
pub fn elapsed_value(elapsed: u64) -> Vec<u8> {
    let mut value = elapsed.to_string().into_bytes();
    value.push(0);
    value
}

/// Whether `value` fits in the entry itself.
pub fn fits_inline(value: &[u8], big: bool) -> bool {
    value.len() <= if big { 8 } else { 4 }
}

/// Encodes a one-entry sub-directory in native byte order.
///
/// `value_at` is where `value` was written when it does not fit inline.
pub fn encode_directory(value: &[u8], value_at: Option<u64>, big: bool) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(32);
    let mut slot = vec![0u8; if big { 8 } else { 4 }];
    match value_at {
        None if fits_inline(value, big) => slot[..value.len()].copy_from_slice(value),
        None => return Err(IoError::EncodeError("sub-directory value needs an offset".into())),
        Some(at) if big => NativeEndian::write_u64(&mut slot, at),
        Some(at) => {
            let at = u32::try_from(at).map_err(|_| IoError::EncodeError("sub-directory value past 4 GiB".into()))?;
            NativeEndian::write_u32(&mut slot, at);
        }
    }

    if big {
        out.write_u64::<NativeEndian>(1)?;
        out.write_u16::<NativeEndian>(tags::SUB_SEC_TIME)?;
        out.write_u16::<NativeEndian>(TYPE_ASCII)?;
        out.write_u64::<NativeEndian>(value.len() as u64)?;
        out.extend_from_slice(&slot);
        out.write_u64::<NativeEndian>(0)?;
    } else {
        out.write_u16::<NativeEndian>(1)?;
        out.write_u16::<NativeEndian>(tags::SUB_SEC_TIME)?;
        out.write_u16::<NativeEndian>(TYPE_ASCII)?;
        out.write_u32::<NativeEndian>(value.len() as u32)?;
        out.extend_from_slice(&slot);
        out.write_u32::<NativeEndian>(0)?;
    }
    Ok(out)
}

/// Reads ASCII entry `tag` of the sub-directory at `offset`.
pub fn read_ascii<R: Read + Seek>(r: &mut R, header: &Header, offset: u64, tag: u16) -> IoResult<Option<String>> {
    let len = r.seek(SeekFrom::End(0))?;
    let slot = header.slot();
    let (count_len, entry_len) = if header.big { (8u64, 20u64) } else { (2, 12) };

    let table = offset
        .checked_add(count_len)
        .filter(|&end| end <= len)
        .ok_or_else(|| IoError::malformed(format!("sub-directory at {offset} outside a {len}-byte file")))?;
    r.seek(SeekFrom::Start(offset))?;
    let mut raw = [0u8; 8];
    r.read_exact(&mut raw[..count_len as usize])?;
    let count = if header.big { header.endian.u64(&raw) } else { header.endian.u16(&raw) as u64 };

    let end = count
        .checked_mul(entry_len)
        .and_then(|n| n.checked_add(table))
        .filter(|&end| end <= len)
        .ok_or_else(|| IoError::malformed(format!("{count} entries at {offset} run past a {len}-byte file")))?;
    let mut entries = vec![0u8; (end - table) as usize];
    r.read_exact(&mut entries)?;

    for entry in entries.chunks_exact(entry_len as usize) {
        let e = header.endian;
        if e.u16(&entry[0..2]) != tag {
            continue;
        }
        if e.u16(&entry[2..4]) != TYPE_ASCII {
            return Ok(None);
        }
        let (n, value) = if header.big {
            (e.u64(&entry[4..12]), &entry[12..20])
        } else {
            (e.u32(&entry[4..8]) as u64, &entry[8..12])
        };
        let bytes = if n <= slot {
            value[..n as usize].to_vec()
        } else {
            let at = if header.big { e.u64(value) } else { e.u32(value) as u64 };
            at.checked_add(n)
                .filter(|&stop| stop <= len)
                .ok_or_else(|| IoError::malformed(format!("{n}-byte value at {at} runs past a {len}-byte file")))?;
            r.seek(SeekFrom::Start(at))?;
            let mut bytes = vec![0u8; n as usize];
            r.read_exact(&mut bytes)?;
            bytes
        };
        let text = String::from_utf8_lossy(&bytes);
        return Ok(Some(text.trim_end_matches('\0').to_owned()));
    }
    Ok(None)
}
