//! Element-wise kernels behind the depth converter.
//!
//! Each operation (convert, invert, threshold) is one function over plain
//! slices. Two implementations exist: [`scalar`] and, with the `simd`
//! feature, a lane implementation built on `wide`. The feature picks which
//! one is re-exported here, and both must produce identical output.
//!
//! Callers pass equal-length slices; the kernels process
//! `min(src.len(), dst.len())` elements.

pub mod scalar;

#[cfg(feature = "simd")]
mod lanes;

#[cfg(feature = "simd")]
pub use lanes::*;

#[cfg(not(feature = "simd"))]
pub use scalar::*;

#[cfg(test)]
mod tests {
    use super::*;

    // Lengths chosen to leave lane remainders.
    const LEN: usize = 37;

    #[test]
    fn test_u8_to_f32_matches_scalar() {
        let src: Vec<u8> = (0..LEN).map(|i| (i * 7) as u8).collect();
        let mut a = vec![0.0; LEN];
        let mut b = vec![0.0; LEN];
        u8_to_f32(&src, &mut a);
        scalar::u8_to_f32(&src, &mut b);
        assert_eq!(a, b);
        assert_eq!(a[1], 7.0 / 255.0);
    }

    #[test]
    fn test_f32_to_u16_clamps() {
        let src = [-0.5, 0.0, 0.5, 1.0, 2.0];
        let mut dst = [0u16; 5];
        f32_to_u16(&src, &mut dst);
        assert_eq!(dst, [0, 0, 32768, 65535, 65535]);
    }

    #[test]
    fn test_f32_to_u8_matches_scalar() {
        let src: Vec<f32> = (0..LEN).map(|i| i as f32 / (LEN - 1) as f32).collect();
        let mut a = vec![0u8; LEN];
        let mut b = vec![0u8; LEN];
        f32_to_u8(&src, &mut a);
        scalar::f32_to_u8(&src, &mut b);
        assert_eq!(a, b);
        assert_eq!(a[LEN - 1], 255);
    }

    #[test]
    fn test_shifts() {
        let mut wide16 = [0u16; 3];
        u8_to_u16(&[0, 1, 255], &mut wide16);
        assert_eq!(wide16, [0, 256, 65280]);
        let mut narrow = [0u8; 3];
        u16_to_u8(&[0, 511, 65535], &mut narrow);
        assert_eq!(narrow, [0, 1, 255]);
    }

    #[test]
    fn test_invert_is_involution() {
        let orig: Vec<u8> = (0..LEN as u8).collect();
        let mut v = orig.clone();
        invert_u8(&mut v);
        assert_eq!(v[3], 252);
        invert_u8(&mut v);
        assert_eq!(v, orig);

        let orig16: Vec<u16> = (0..LEN as u16).map(|i| i * 1000).collect();
        let mut v16 = orig16.clone();
        invert_u16(&mut v16);
        invert_u16(&mut v16);
        assert_eq!(v16, orig16);

        let mut f = vec![0.25f32; LEN];
        invert_f32(&mut f);
        assert!(f.iter().all(|&x| x == 0.75));
    }

    #[test]
    fn test_threshold_f32_matches_scalar() {
        let src: Vec<f32> = (0..LEN).map(|i| i as f32 / LEN as f32).collect();
        let thresholds = vec![0.5f32; LEN];
        let mut a = vec![9u8; LEN];
        let mut b = vec![9u8; LEN];
        threshold_f32(&src, &thresholds, &mut a);
        scalar::threshold_f32(&src, &thresholds, &mut b);
        assert_eq!(a, b);
        assert!(a.iter().all(|&x| x == 0 || x == 255));
        assert_eq!(a[0], 0);
        assert_eq!(a[LEN - 1], 255);
    }
}
