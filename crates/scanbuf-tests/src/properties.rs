//! Randomized checks of the invariants every buffer should satisfy.
//!
//! Each test draws a handful of shapes from a fixed seed so failures
//! reproduce.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scanbuf_core::{PixelBuffer, SampleKind};
use scanbuf_icc::{gray_profile, srgb_profile};
use scanbuf_ops::{Algorithm, AspectMode, flip_left_right, rescale, rotate180, transpose};
use tempfile::tempdir;

use crate::{noise, tag_frames};

const KINDS: [SampleKind; 3] = [SampleKind::U8, SampleKind::U16, SampleKind::F32];

/// Channel counts with a standard TIFF photometric layout.
const STORED_CHANNELS: [usize; 4] = [1, 3, 4, 3];

fn shape(rng: &mut StdRng) -> (usize, usize, usize, usize) {
    (rng.gen_range(1..40), rng.gen_range(1..40), rng.gen_range(1..6), rng.gen_range(1..4))
}

#[test]
fn test_save_load_is_identity() {
    let dir = tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(0x5ca9);
    for round in 0..12 {
        let (rows, cols, _, frames) = shape(&mut rng);
        let channels = STORED_CHANNELS[round % STORED_CHANNELS.len()];
        let kind = KINDS[round % 3];
        let mut buf = noise(&mut rng, rows, cols, channels, kind, frames);
        tag_frames(&mut buf);
        if channels == 3 {
            assert!(buf.attach_profile(Some(srgb_profile().unwrap())));
        }

        let path = dir.path().join(format!("round{round}.tif"));
        scanbuf_io::save(&buf, &path).unwrap();
        let back = scanbuf_io::load(&path).unwrap();
        assert_eq!(back.data(), buf.data(), "round {round}: {rows}x{cols}x{channels} {kind}");
        assert_eq!(back.frame_metadata(), buf.frame_metadata());
        assert_eq!(back.profile(), buf.profile());
        assert_eq!(back.resolution(), buf.resolution());
    }
}

#[test]
fn test_depth_conversions() {
    let mut rng = StdRng::seed_from_u64(11);
    for kind in KINDS {
        let (rows, cols, channels, frames) = shape(&mut rng);
        let buf = noise(&mut rng, rows, cols, channels, kind, frames);

        let once = buf.to_u8().unwrap();
        assert_eq!(once.to_u8().unwrap(), once);

        let unit = once.to_f32().unwrap();
        assert!(unit.samples::<f32>().unwrap().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

#[test]
fn test_invert_twice() {
    let mut rng = StdRng::seed_from_u64(12);
    for kind in KINDS {
        let (rows, cols, channels, frames) = shape(&mut rng);
        let buf = noise(&mut rng, rows, cols, channels, kind, frames);
        let twice = buf.invert().unwrap().invert().unwrap();
        match kind {
            SampleKind::F32 => {
                for (a, b) in buf.samples::<f32>().unwrap().iter().zip(twice.samples::<f32>().unwrap()) {
                    assert!((a - b).abs() < 1e-6);
                }
            }
            _ => assert_eq!(twice, buf),
        }
    }
}

#[test]
fn test_profile_channel_count_guard() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..8 {
        let channels = rng.gen_range(1..6);
        let mut buf = PixelBuffer::new(2, 2, channels, SampleKind::U8, 1);
        let accepted = buf.attach_profile(Some(srgb_profile().unwrap()));
        assert_eq!(accepted, channels == 3);

        let before = buf.profile().cloned();
        if channels != 1 {
            assert!(!buf.attach_profile(Some(gray_profile().unwrap())));
            assert_eq!(buf.profile().cloned(), before);
        }
    }
}

#[test]
fn test_rescale_shapes() {
    let mut rng = StdRng::seed_from_u64(14);
    for _ in 0..10 {
        let (rows, cols) = (rng.gen_range(2..80), rng.gen_range(2..80));
        let buf = noise(&mut rng, rows, cols, 2, SampleKind::U16, 1);
        let (r, c) = (rng.gen_range(1..60), rng.gen_range(1..60));

        let exact = rescale(&buf, r, c, AspectMode::Ignore, Algorithm::Cubic).unwrap();
        assert_eq!((exact.rows(), exact.cols()), (r, c));

        let fit = rescale(&buf, r, c, AspectMode::KeepFit, Algorithm::Linear).unwrap();
        assert!(fit.rows() <= r.max(1) && fit.cols() <= c.max(1));
        // Aspect error of under one pixel on the derived axis.
        let ideal_cols = fit.rows() as f64 * cols as f64 / rows as f64;
        let ideal_rows = fit.cols() as f64 * rows as f64 / cols as f64;
        assert!(
            (fit.cols() as f64 - ideal_cols).abs() < 1.0 || (fit.rows() as f64 - ideal_rows).abs() < 1.0,
            "{rows}x{cols} -> {}x{}",
            fit.rows(),
            fit.cols()
        );
    }
}

#[test]
fn test_geometry_involutions() {
    let mut rng = StdRng::seed_from_u64(15);
    for kind in KINDS {
        let (rows, cols, channels, frames) = shape(&mut rng);
        let buf = noise(&mut rng, rows, cols, channels, kind, frames);
        assert_eq!(flip_left_right(&flip_left_right(&buf).unwrap()).unwrap(), buf);
        assert_eq!(rotate180(&rotate180(&buf).unwrap()).unwrap(), buf);
        assert_eq!(transpose(&transpose(&buf).unwrap()).unwrap(), buf);
    }
}
