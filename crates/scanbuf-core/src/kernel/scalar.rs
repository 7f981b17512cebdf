//! Portable reference kernels.

/// `v / 255`.
pub fn u8_to_f32(src: &[u8], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s as f32 / 255.0;
    }
}

/// `v / 65535`.
pub fn u16_to_f32(src: &[u16], dst: &mut [f32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s as f32 / 65535.0;
    }
}

/// `round(v * 255)`, saturating.
pub fn f32_to_u8(src: &[f32], dst: &mut [u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = (s * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// `round(v * 65535)`, clamped.
pub fn f32_to_u16(src: &[f32], dst: &mut [u16]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = (s * 65535.0).round().clamp(0.0, 65535.0) as u16;
    }
}

/// `v << 8`.
pub fn u8_to_u16(src: &[u8], dst: &mut [u16]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = (s as u16) << 8;
    }
}

/// `v >> 8`.
pub fn u16_to_u8(src: &[u16], dst: &mut [u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = (s >> 8) as u8;
    }
}

/// `255 - v` in place.
pub fn invert_u8(data: &mut [u8]) {
    for v in data {
        *v = u8::MAX - *v;
    }
}

/// `65535 - v` in place.
pub fn invert_u16(data: &mut [u16]) {
    for v in data {
        *v = u16::MAX - *v;
    }
}

/// `1 - v` in place.
pub fn invert_f32(data: &mut [f32]) {
    for v in data {
        *v = 1.0 - *v;
    }
}

/// 255 where `src > threshold`, else 0.
pub fn threshold_u8(src: &[u8], thresholds: &[u8], dst: &mut [u8]) {
    for ((d, &s), &t) in dst.iter_mut().zip(src).zip(thresholds) {
        *d = if s > t { 255 } else { 0 };
    }
}

/// 255 where `src > threshold`, else 0.
pub fn threshold_u16(src: &[u16], thresholds: &[u16], dst: &mut [u8]) {
    for ((d, &s), &t) in dst.iter_mut().zip(src).zip(thresholds) {
        *d = if s > t { 255 } else { 0 };
    }
}

/// 255 where `src > threshold`, else 0.
pub fn threshold_f32(src: &[f32], thresholds: &[f32], dst: &mut [u8]) {
    for ((d, &s), &t) in dst.iter_mut().zip(src).zip(thresholds) {
        *d = if s > t { 255 } else { 0 };
    }
}
