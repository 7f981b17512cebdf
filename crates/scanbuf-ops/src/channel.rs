//! Channel extraction and sample statistics.

use scanbuf_core::{Error, PixelBuffer, Sample, SampleKind};
use scanbuf_icc::gray_profile;
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Copies channel `channel` of every frame into a one-channel buffer.
///
/// The result carries the standard gray profile along with the source's
/// resolution and frame metadata.
pub fn extract_channel(buffer: &PixelBuffer, channel: usize) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if channel >= buffer.channels() {
        return Err(OpsError::InvalidParameter(format!(
            "channel {channel} of a {}-channel buffer",
            buffer.channels()
        )));
    }
    trace!(channel, channels = buffer.channels(), "extract channel");

    let mut out = PixelBuffer::try_new(buffer.rows(), buffer.cols(), 1, buffer.kind(), buffer.frames())?;
    out.copy_metadata_from(buffer);
    out.attach_profile(Some(gray_profile()?));

    let bps = buffer.bytes_per_sample();
    let px = buffer.channels() * bps;
    let offset = channel * bps;
    for frame in 0..buffer.frames() {
        for row in 0..buffer.rows() {
            let src = buffer.scan_line(row, frame);
            let dst = out.scan_line_mut(row, frame);
            for (d, s) in dst.chunks_exact_mut(bps).zip(src.chunks_exact(px)) {
                d.copy_from_slice(&s[offset..offset + bps]);
            }
        }
    }
    Ok(out)
}

/// Number of samples in `frame` that are not zero.
pub fn count_nonzero(buffer: &PixelBuffer, frame: usize) -> OpsResult<usize> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if frame >= buffer.frames() {
        return Err(OpsError::InvalidParameter(format!(
            "frame {frame} of {}",
            buffer.frames()
        )));
    }
    fn count<T: Sample + PartialEq + Default>(buffer: &PixelBuffer, frame: usize) -> OpsResult<usize> {
        let zero = T::default();
        let samples = buffer.frame_samples::<T>(frame).ok_or(Error::InvalidBuffer)?;
        Ok(samples.iter().filter(|&&v| v != zero).count())
    }
    match buffer.kind() {
        SampleKind::U8 => count::<u8>(buffer, frame),
        SampleKind::U16 => count::<u16>(buffer, frame),
        SampleKind::F32 => count::<f32>(buffer, frame),
    }
}
