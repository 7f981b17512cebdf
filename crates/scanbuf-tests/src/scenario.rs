//! End-to-end pipelines across the workspace crates.

use approx::assert_abs_diff_eq;
use scanbuf_core::{PixelBuffer, SampleKind, photometric};
use scanbuf_icc::{Intent, convert_to_profile, gray_profile, srgb_profile};
use scanbuf_io::{ContainerReader, ReadOptions};
use scanbuf_ops::{
    Algorithm, AspectMode, CancelToken, crop, extract_channel, preview, rescale, rescale_to_disk, rotate90, unrotate90,
};
use tempfile::tempdir;

use crate::{gradient, tag_frames};

/// Filled 100x100 RGB8 buffer through invert, float conversion and disk.
#[test]
fn test_fill_invert_float_and_save() {
    let dir = tempdir().unwrap();
    let mut buf = PixelBuffer::new(100, 100, 3, SampleKind::U8, 1);
    assert!(buf.fill(10u8));

    let inverted = buf.invert().unwrap();
    assert!(inverted.data().iter().all(|&v| v == 245));
    let float = buf.to_f32().unwrap();
    assert!(float.samples::<f32>().unwrap().iter().all(|&v| (v - 10.0 / 255.0).abs() < 1e-6));

    for (name, b) in [("plain", &buf), ("inverted", &inverted), ("float", &float)] {
        let path = dir.path().join(format!("{name}.tif"));
        scanbuf_io::save(b, &path).unwrap();
        let back = scanbuf_io::load(&path).unwrap();
        assert_eq!(back.data(), b.data(), "{name}");
        assert_eq!(back.kind(), b.kind());
    }
}

#[test]
fn test_scan_pipeline() {
    let dir = tempdir().unwrap();
    let mut scan = gradient(120, 80, 3, SampleKind::U16, 2);
    assert!(scan.attach_profile(Some(srgb_profile().unwrap())));
    tag_frames(&mut scan);
    let raw = dir.path().join("raw.tif");
    scanbuf_io::save(&scan, &raw).unwrap();

    let loaded = scanbuf_io::load(&raw).unwrap();
    let rotated = rotate90(&loaded).unwrap();
    let small = rescale(&rotated, 40, 60, AspectMode::KeepFit, Algorithm::Super).unwrap();
    let gray = convert_to_profile(&small, &gray_profile().unwrap(), Intent::Perceptual).unwrap();
    let out = dir.path().join("gray.tif");
    scanbuf_io::save(&gray, &out).unwrap();

    let back = scanbuf_io::load(&out).unwrap();
    assert_eq!((back.rows(), back.cols(), back.channels(), back.frames()), (40, 60, 1, 2));
    assert_eq!(back.profile().unwrap().channels(), 1);
    assert_eq!(back.frame_meta(1).unwrap(), scan.frame_meta(1).unwrap());
    // Quarter turn swapped the axes' densities.
    assert_eq!((back.resolution().x, back.resolution().y), (300.0, 600.0));
}

#[test]
fn test_rotation_round_trip_on_disk() {
    let dir = tempdir().unwrap();
    let mut buf = gradient(7, 11, 4, SampleKind::F32, 3);
    tag_frames(&mut buf);
    let path = dir.path().join("rot.tif");
    scanbuf_io::save(&rotate90(&buf).unwrap(), &path).unwrap();
    let back = unrotate90(&scanbuf_io::load(&path).unwrap()).unwrap();
    assert_eq!(back.data(), buf.data());
    assert_eq!(back.resolution(), buf.resolution());
}

#[test]
fn test_stream_then_crop() {
    let dir = tempdir().unwrap();
    let src = gradient(50, 50, 1, SampleKind::U8, 1);
    let path = dir.path().join("big.tif");
    let report =
        rescale_to_disk(&src, &path, 200, 200, AspectMode::Ignore, Algorithm::Linear, &CancelToken::new()).unwrap();
    assert_eq!(report.tiles, 1);

    let big = scanbuf_io::load(&path).unwrap();
    let corner = crop(&big, -10, -10, 20, 20).unwrap();
    let samples = corner.samples::<u8>().unwrap();
    assert!(samples[..10 * 20].iter().all(|&v| v == 0));
    assert_eq!(samples[10 * 20 + 10], big.samples::<u8>().unwrap()[0]);
}

#[test]
fn test_default_profile_policy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bare.tif");
    scanbuf_io::save(&gradient(4, 4, 1, SampleKind::U8, 1), &path).unwrap();

    assert!(scanbuf_io::load(&path).unwrap().profile().is_none());
    let mut reader = ContainerReader::open(&path)
        .unwrap()
        .with_options(ReadOptions { assign_default_profile: true });
    let assigned = reader.read_directory(0).unwrap();
    assert_eq!(assigned.profile().unwrap().channels(), 1);
    assert_eq!(assigned.photometric(), photometric::MIN_IS_BLACK);
}

#[test]
fn test_load_into_reuses_buffer() {
    let dir = tempdir().unwrap();
    let mut source = gradient(6, 6, 3, SampleKind::U16, 4);
    tag_frames(&mut source);
    let path = dir.path().join("frames.tif");
    scanbuf_io::save(&source, &path).unwrap();

    let mut target = PixelBuffer::new(6, 6, 3, SampleKind::U16, 2);
    assert!(target.attach_profile(Some(srgb_profile().unwrap())));
    scanbuf_io::load_into(&mut target, &path, 2).unwrap();
    assert_eq!(target.frame(0), source.frame(2));
    assert_eq!(target.frame(1), source.frame(3));
    assert_eq!(target.frame_meta(0).unwrap().tag, "frame 2");
    assert!(target.profile().is_some());
}

#[test]
fn test_channel_and_preview() {
    let mut buf = gradient(30, 40, 3, SampleKind::F32, 1);
    assert!(buf.attach_profile(Some(srgb_profile().unwrap())));
    let red = extract_channel(&buf, 0).unwrap();
    assert_eq!(red.channels(), 1);
    assert_abs_diff_eq!(red.samples::<f32>().unwrap()[1], buf.samples::<f32>().unwrap()[3]);

    let raster = preview(&red, 20, 20).unwrap();
    assert_eq!((raster.rows, raster.cols), (15, 20));
    // Gray previews are neutral.
    let [r, g, b] = raster.rgb(7, 7).unwrap();
    assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
}
