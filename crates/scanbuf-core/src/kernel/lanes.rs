//! Wide-lane kernels, 8 floats or shorts and 16 bytes per step.
//!
//! Tails go through the scalar kernels. Float-to-integer rounding stays
//! scalar so ties round away from zero in both implementations.

use wide::{f32x8, u16x8, u8x16, CmpGt};

use super::scalar;

pub use scalar::{threshold_u16, threshold_u8, u16_to_u8, u8_to_u16};

/// Lane form of [`scalar::u8_to_f32`].
pub fn u8_to_f32(src: &[u8], dst: &mut [f32]) {
    let n = src.len().min(dst.len());
    let (src, dst) = (&src[..n], &mut dst[..n]);
    let scale = f32x8::splat(255.0);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (s8, d8) in (&mut s).zip(&mut d) {
        let v = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| s8[i] as f32));
        d8.copy_from_slice(&(v / scale).to_array());
    }
    scalar::u8_to_f32(s.remainder(), d.into_remainder());
}

/// Lane form of [`scalar::u16_to_f32`].
pub fn u16_to_f32(src: &[u16], dst: &mut [f32]) {
    let n = src.len().min(dst.len());
    let (src, dst) = (&src[..n], &mut dst[..n]);
    let scale = f32x8::splat(65535.0);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (s8, d8) in (&mut s).zip(&mut d) {
        let v = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| s8[i] as f32));
        d8.copy_from_slice(&(v / scale).to_array());
    }
    scalar::u16_to_f32(s.remainder(), d.into_remainder());
}

/// Lane form of [`scalar::f32_to_u8`].
pub fn f32_to_u8(src: &[f32], dst: &mut [u8]) {
    let n = src.len().min(dst.len());
    let (src, dst) = (&src[..n], &mut dst[..n]);
    let scale = f32x8::splat(255.0);
    let lo = f32x8::splat(0.0);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (s8, d8) in (&mut s).zip(&mut d) {
        let v = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| s8[i]));
        let out = (v * scale).max(lo).min(scale).to_array();
        for (o, x) in d8.iter_mut().zip(out) {
            *o = x.round() as u8;
        }
    }
    scalar::f32_to_u8(s.remainder(), d.into_remainder());
}

/// Lane form of [`scalar::f32_to_u16`].
pub fn f32_to_u16(src: &[f32], dst: &mut [u16]) {
    let n = src.len().min(dst.len());
    let (src, dst) = (&src[..n], &mut dst[..n]);
    let scale = f32x8::splat(65535.0);
    let lo = f32x8::splat(0.0);
    let mut s = src.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for (s8, d8) in (&mut s).zip(&mut d) {
        let v = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| s8[i]));
        let out = (v * scale).max(lo).min(scale).to_array();
        for (o, x) in d8.iter_mut().zip(out) {
            *o = x.round() as u16;
        }
    }
    scalar::f32_to_u16(s.remainder(), d.into_remainder());
}

/// Lane form of [`scalar::invert_u8`].
pub fn invert_u8(data: &mut [u8]) {
    let full = u8x16::splat(u8::MAX);
    let mut chunks = data.chunks_exact_mut(16);
    for c in &mut chunks {
        let v = u8x16::new(std::array::from_fn(|i| c[i]));
        c.copy_from_slice(&(full - v).to_array());
    }
    scalar::invert_u8(chunks.into_remainder());
}

/// Lane form of [`scalar::invert_u16`].
pub fn invert_u16(data: &mut [u16]) {
    let full = u16x8::splat(u16::MAX);
    let mut chunks = data.chunks_exact_mut(8);
    for c in &mut chunks {
        let v = u16x8::new(std::array::from_fn(|i| c[i]));
        c.copy_from_slice(&(full - v).to_array());
    }
    scalar::invert_u16(chunks.into_remainder());
}

/// Lane form of [`scalar::invert_f32`].
pub fn invert_f32(data: &mut [f32]) {
    let one = f32x8::splat(1.0);
    let mut chunks = data.chunks_exact_mut(8);
    for c in &mut chunks {
        let v = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| c[i]));
        c.copy_from_slice(&(one - v).to_array());
    }
    scalar::invert_f32(chunks.into_remainder());
}

/// Lane form of [`scalar::threshold_f32`].
pub fn threshold_f32(src: &[f32], thresholds: &[f32], dst: &mut [u8]) {
    let n = src.len().min(thresholds.len()).min(dst.len());
    let (src, thresholds, dst) = (&src[..n], &thresholds[..n], &mut dst[..n]);
    let mut s = src.chunks_exact(8);
    let mut t = thresholds.chunks_exact(8);
    let mut d = dst.chunks_exact_mut(8);
    for ((s8, t8), d8) in (&mut s).zip(&mut t).zip(&mut d) {
        let v = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| s8[i]));
        let th = f32x8::from(std::array::from_fn::<f32, 8, _>(|i| t8[i]));
        let bits = v.cmp_gt(th).move_mask();
        for (i, o) in d8.iter_mut().enumerate() {
            *o = if bits & (1 << i) != 0 { 255 } else { 0 };
        }
    }
    scalar::threshold_f32(s.remainder(), t.remainder(), d.into_remainder());
}
