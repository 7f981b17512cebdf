//! Table-driven conversion to floating point.

use scanbuf_core::{Error, PixelBuffer, Sample, SampleKind};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Converts integer samples to `f32` by indexing `table` with each raw value.
///
/// 8-bit buffers need at least 256 entries and 16-bit buffers 65536. Float
/// buffers are copied unchanged. Metadata is carried.
pub fn convert_to_float_by_table(buffer: &PixelBuffer, table: &[f32]) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    let needed = match buffer.kind() {
        SampleKind::U8 => 1 << 8,
        SampleKind::U16 => 1 << 16,
        SampleKind::F32 => return Ok(buffer.clone()),
    };
    if table.len() < needed {
        return Err(OpsError::InvalidParameter(format!(
            "{} samples need a {needed}-entry table, got {}",
            buffer.kind(),
            table.len()
        )));
    }
    trace!(kind = %buffer.kind(), entries = table.len(), "convert by table");

    let mut out = buffer.alloc_like(buffer.channels(), SampleKind::F32)?;
    let dst = out.samples_mut::<f32>().ok_or(Error::InvalidBuffer)?;
    match buffer.kind() {
        SampleKind::U8 => map(buffer.samples::<u8>().ok_or(Error::InvalidBuffer)?, table, dst),
        SampleKind::U16 => map(buffer.samples::<u16>().ok_or(Error::InvalidBuffer)?, table, dst),
        SampleKind::F32 => {}
    }
    Ok(out)
}

fn map<T: Sample + Into<usize>>(src: &[T], table: &[f32], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = table[s.into()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanbuf_icc::gray_profile;

    #[test]
    fn test_u8_through_table() {
        let mut buf = PixelBuffer::new(1, 3, 1, SampleKind::U8, 2);
        buf.samples_mut::<u8>().unwrap().copy_from_slice(&[0, 1, 255, 10, 20, 30]);
        assert!(buf.attach_profile(Some(gray_profile().unwrap())));
        let table: Vec<f32> = (0..256).map(|v| v as f32 * 0.5).collect();

        let out = convert_to_float_by_table(&buf, &table).unwrap();
        assert_eq!(out.kind(), SampleKind::F32);
        assert_eq!(out.frames(), 2);
        assert_eq!(out.samples::<f32>().unwrap(), &[0.0, 0.5, 127.5, 5.0, 10.0, 15.0]);
        assert_eq!(out.profile(), buf.profile());
    }

    #[test]
    fn test_u16_needs_full_table() {
        let mut buf = PixelBuffer::new(1, 2, 1, SampleKind::U16, 1);
        buf.samples_mut::<u16>().unwrap().copy_from_slice(&[65535, 300]);
        assert!(matches!(
            convert_to_float_by_table(&buf, &[0.0; 256]),
            Err(OpsError::InvalidParameter(_))
        ));

        let table: Vec<f32> = (0..65536).map(|v| -(v as f32)).collect();
        let out = convert_to_float_by_table(&buf, &table).unwrap();
        assert_eq!(out.samples::<f32>().unwrap(), &[-65535.0, -300.0]);
    }

    #[test]
    fn test_float_is_copied() {
        let mut buf = PixelBuffer::new(1, 2, 1, SampleKind::F32, 1);
        buf.fill(0.75f32);
        let out = convert_to_float_by_table(&buf, &[]).unwrap();
        assert_eq!(out.samples::<f32>().unwrap(), &[0.75, 0.75]);
    }
}
