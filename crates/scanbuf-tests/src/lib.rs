//! Integration tests for scanbuf crates.
//!
//! End-to-end checks that run buffers through the container codec, color
//! conversion and operations together. The fixtures are public so other
//! crates' tests can build the same inputs.

use rand::Rng;
use scanbuf_core::{FrameMetadata, PixelBuffer, Resolution, SampleKind};

#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenario;

/// Buffer whose samples step through the full range of `kind`.
pub fn gradient(rows: usize, cols: usize, channels: usize, kind: SampleKind, frames: usize) -> PixelBuffer {
    let mut buf = PixelBuffer::new(rows, cols, channels, kind, frames);
    let n = rows * cols * channels * frames;
    match kind {
        SampleKind::U8 => {
            for (i, v) in buf.samples_mut::<u8>().into_iter().flatten().enumerate() {
                *v = (i * 255 / n.max(2).saturating_sub(1)) as u8;
            }
        }
        SampleKind::U16 => {
            for (i, v) in buf.samples_mut::<u16>().into_iter().flatten().enumerate() {
                *v = (i * 65535 / n.max(2).saturating_sub(1)) as u16;
            }
        }
        SampleKind::F32 => {
            for (i, v) in buf.samples_mut::<f32>().into_iter().flatten().enumerate() {
                *v = i as f32 / n.max(2).saturating_sub(1) as f32;
            }
        }
    }
    buf
}

/// Buffer of uniformly random samples.
pub fn noise<R: Rng>(rng: &mut R, rows: usize, cols: usize, channels: usize, kind: SampleKind, frames: usize) -> PixelBuffer {
    let mut buf = PixelBuffer::new(rows, cols, channels, kind, frames);
    match kind {
        SampleKind::U8 => rng.fill(buf.data_mut()),
        SampleKind::U16 => buf.samples_mut::<u16>().into_iter().flatten().for_each(|v| *v = rng.r#gen()),
        SampleKind::F32 => buf.samples_mut::<f32>().into_iter().flatten().for_each(|v| *v = rng.r#gen()),
    }
    buf
}

/// Fills every frame's metadata with distinct, container-safe values.
pub fn tag_frames(buf: &mut PixelBuffer) {
    buf.set_resolution(Resolution { x: 600.0, y: 300.0 });
    for i in 0..buf.frames() {
        if let Some(meta) = buf.frame_meta_mut(i) {
            *meta = FrameMetadata {
                tag: format!("frame {i}"),
                anchor: (10 * i as i32, 20 * i as i32 + 1),
                elapsed: 250 + i as u32,
                xml: format!("<frame index=\"{i}\"/>\n").into_bytes(),
                parent_name: Some("batch".into()),
            };
        }
    }
}
