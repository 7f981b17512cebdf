use std::path::PathBuf;

use scanbuf_core::{FrameMetadata, PixelBuffer, Resolution, SampleKind, photometric};
use scanbuf_io::{
    ContainerReader, ContainerWriter, Endian, IoError, load, load_directory, load_into, load_objects, save, save_objects,
};
use tempfile::TempDir;

fn scratch(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn gradient(rows: usize, cols: usize, channels: usize, kind: SampleKind, frames: usize) -> PixelBuffer {
    let mut buf = PixelBuffer::new(rows, cols, channels, kind, frames);
    match kind {
        SampleKind::U8 => {
            for (i, v) in buf.samples_mut::<u8>().unwrap().iter_mut().enumerate() {
                *v = (i * 7 % 256) as u8;
            }
        }
        SampleKind::U16 => {
            for (i, v) in buf.samples_mut::<u16>().unwrap().iter_mut().enumerate() {
                *v = (i * 977 % 65536) as u16;
            }
        }
        SampleKind::F32 => {
            for (i, v) in buf.samples_mut::<f32>().unwrap().iter_mut().enumerate() {
                *v = (i as f32 * 0.013).sin() * 1.5;
            }
        }
    }
    buf
}

fn reader_endian(path: &std::path::Path) -> Endian {
    ContainerReader::open(path).unwrap().endian()
}

fn full_meta(tag: &str) -> FrameMetadata {
    FrameMetadata {
        tag: tag.into(),
        anchor: (120, 48),
        elapsed: 3250,
        xml: b"<scan>\n  <lamp on=\"1\"/>\n</scan>\n".to_vec(),
        parent_name: Some("batch-7".into()),
    }
}

#[test]
fn scenario_invert_and_float_survive() {
    let dir = TempDir::new().unwrap();
    let mut buf = PixelBuffer::new(100, 100, 3, SampleKind::U8, 1);
    buf.fill(10u8);
    let inverted = buf.invert().unwrap();
    let float = buf.to_f32().unwrap();

    for (name, b) in [("plain.tif", &buf), ("inverted.tif", &inverted), ("float.tif", &float)] {
        let path = scratch(&dir, name);
        save(b, &path).expect("save");
        let back = load(&path).expect("load");
        assert_eq!(&back, b, "{name}");
    }
    let back = load(scratch(&dir, "inverted.tif")).unwrap();
    assert!(back.data().iter().all(|&v| v == 245));
    let back = load(scratch(&dir, "float.tif")).unwrap();
    assert!(back.samples::<f32>().unwrap().iter().all(|&v| (v - 0.0392).abs() < 1e-4));
}

#[test]
fn every_kind_round_trips_with_metadata() {
    let dir = TempDir::new().unwrap();
    for kind in [SampleKind::U8, SampleKind::U16, SampleKind::F32] {
        let mut buf = gradient(17, 23, 3, kind, 1);
        assert!(buf.attach_profile(Some(scanbuf_icc::srgb_profile().unwrap())));
        buf.set_resolution(Resolution { x: 600.0, y: 300.5 });
        *buf.frame_meta_mut(0).unwrap() = full_meta("front");

        let path = scratch(&dir, &format!("{kind}.tif"));
        save(&buf, &path).unwrap();
        let back = load(&path).unwrap();
        assert_eq!(back, buf, "{kind}");
        assert_eq!(back.filename(), Some(path.as_path()));
    }
}

#[test]
fn float_bits_are_exact() {
    let dir = TempDir::new().unwrap();
    let mut buf = PixelBuffer::new(2, 3, 1, SampleKind::F32, 1);
    buf.samples_mut::<f32>()
        .unwrap()
        .copy_from_slice(&[0.1, -0.0, f32::MIN_POSITIVE, 1.0e-30, 7.25, f32::MAX]);
    let path = scratch(&dir, "bits.tif");
    save(&buf, &path).unwrap();
    assert_eq!(load(&path).unwrap().data(), buf.data());
}

#[test]
fn frames_become_directories() {
    let dir = TempDir::new().unwrap();
    let mut buf = gradient(8, 5, 1, SampleKind::U16, 3);
    for (i, tag) in ["a", "b", ""].iter().enumerate() {
        buf.frame_meta_mut(i).unwrap().tag = (*tag).into();
    }
    let path = scratch(&dir, "frames.tif");
    save(&buf, &path).unwrap();

    assert_eq!(scanbuf_io::directory_count(&path).unwrap(), 3);
    let back = load(&path).unwrap();
    assert_eq!(back, buf);

    let second = load_directory(&path, 1).unwrap();
    assert_eq!(second.frames(), 1);
    assert_eq!(second.frame_meta(0).unwrap().tag, "b");
    assert_eq!(second.data(), buf.frame(1));

    // An empty tag is stored as the placeholder text and read back empty.
    let mut reader = ContainerReader::open(&path).unwrap();
    assert_eq!(reader.ascii_field(2, scanbuf_io::tags::IMAGE_DESCRIPTION).unwrap().as_deref(), Some("not defined"));
    assert_eq!(reader.probe(2).unwrap().meta.tag, "");
}

#[test]
fn objects_of_different_shapes() {
    let dir = TempDir::new().unwrap();
    let a = gradient(4, 4, 1, SampleKind::U8, 1);
    let b = gradient(6, 2, 3, SampleKind::F32, 2);
    let path = scratch(&dir, "objects.tif");
    save_objects(&[a.clone(), b.clone()], &path).unwrap();

    let objects = load_objects(&path).unwrap();
    assert_eq!(objects.len(), 3);
    assert_eq!(objects[0], a);
    assert_eq!(objects[1].data(), b.frame(0));
    assert_eq!(objects[2].data(), b.frame(1));

    assert!(matches!(load(&path), Err(IoError::Core(_))));
}

#[test]
fn xml_keeps_whole_lines_only() {
    let dir = TempDir::new().unwrap();
    let mut buf = gradient(2, 2, 1, SampleKind::U8, 2);
    buf.frame_meta_mut(0).unwrap().xml = b"<a/>\n<b".to_vec();
    buf.frame_meta_mut(1).unwrap().xml = b"<no-newline/>".to_vec();
    let path = scratch(&dir, "xml.tif");
    save(&buf, &path).unwrap();

    let back = load(&path).unwrap();
    assert_eq!(back.frame_meta(0).unwrap().xml, b"<a/>\n");
    assert!(back.frame_meta(1).unwrap().xml.is_empty());
}

#[test]
fn anchor_only_when_set() {
    let dir = TempDir::new().unwrap();
    let mut buf = gradient(2, 2, 1, SampleKind::U8, 2);
    buf.frame_meta_mut(1).unwrap().anchor = (12, 34);
    let path = scratch(&dir, "anchor.tif");
    save(&buf, &path).unwrap();

    let mut reader = ContainerReader::open(&path).unwrap();
    assert!(!reader.has_field(0, scanbuf_io::tags::X_POSITION).unwrap());
    assert!(reader.has_field(1, scanbuf_io::tags::X_POSITION).unwrap());
    let back = reader.read_all().unwrap();
    assert_eq!(back[0].frame_meta(0).unwrap().anchor, (-1, -1));
    assert_eq!(back[1].frame_meta(0).unwrap().anchor, (12, 34));
}

#[test]
fn white_is_zero_gray_keeps_photometric() {
    let dir = TempDir::new().unwrap();
    let mut buf = gradient(3, 3, 1, SampleKind::U8, 1);
    buf.set_photometric(photometric::MIN_IS_WHITE);
    let path = scratch(&dir, "miniswhite.tif");
    save(&buf, &path).unwrap();
    assert_eq!(load(&path).unwrap().photometric(), photometric::MIN_IS_WHITE);
}

#[test]
fn load_into_replaces_pixels_and_metadata() {
    let dir = TempDir::new().unwrap();
    let mut src = gradient(5, 5, 3, SampleKind::U8, 3);
    *src.frame_meta_mut(2).unwrap() = full_meta("third");
    let path = scratch(&dir, "into.tif");
    save(&src, &path).unwrap();

    let mut target = PixelBuffer::new(5, 5, 3, SampleKind::U8, 2);
    load_into(&mut target, &path, 1).unwrap();
    assert_eq!(target.frame(0), src.frame(1));
    assert_eq!(target.frame(1), src.frame(2));
    assert_eq!(target.frame_meta(1).unwrap(), &full_meta("third"));

    let mut wrong = PixelBuffer::new(5, 5, 1, SampleKind::U8, 1);
    let before = wrong.clone();
    assert!(matches!(
        load_into(&mut wrong, &path, 0),
        Err(IoError::FieldMismatch { field: "channels", expected: 1, actual: 3 })
    ));
    assert_eq!(wrong, before);
}

#[test]
fn big_offsets_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut buf = gradient(9, 11, 4, SampleKind::U16, 2);
    *buf.frame_meta_mut(0).unwrap() = full_meta("big");
    let path = scratch(&dir, "big.tif");

    let mut writer = ContainerWriter::create(&path, true).unwrap();
    writer.write_buffer(&buf).unwrap();
    writer.finish().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let version = match reader_endian(&path) {
        Endian::Little => [b'I', b'I', 43, 0],
        Endian::Big => [b'M', b'M', 0, 43],
    };
    assert_eq!(&bytes[..4], &version);
    let reader = ContainerReader::open(&path).unwrap();
    assert!(reader.is_big());
    assert_eq!(load(&path).unwrap(), buf);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(load(scratch(&dir, "absent.tif")), Err(IoError::Io(_))));
}

#[test]
fn tall_image_groups_rows_into_strips() {
    let dir = TempDir::new().unwrap();
    let buf = gradient(70_000, 3, 1, SampleKind::U8, 1);
    let path = scratch(&dir, "tall.tif");
    save(&buf, &path).unwrap();
    assert_eq!(load(&path).unwrap(), buf);
}

#[test]
fn partial_strip_is_trimmed_on_read() {
    let dir = TempDir::new().unwrap();
    let buf = gradient(50_000, 2, 1, SampleKind::U16, 1);
    let path = scratch(&dir, "partial.tif");

    let mut writer = ContainerWriter::create(&path, false).unwrap();
    let mut d = writer.begin_directory(scanbuf_io::DirectorySpec::for_frame(&buf, 0)).unwrap();
    for row in 0..40_001 {
        d.write_row(buf.scan_line(row, 0)).unwrap();
    }
    assert_eq!(d.finish_partial().unwrap(), 40_001);
    writer.finish().unwrap();

    let back = load(&path).unwrap();
    assert_eq!(back.rows(), 40_001);
    assert_eq!(back.data(), &buf.data()[..back.len_bytes()]);
}

/// Big-endian, uncompressed, planar RGB, two rows per strip.
fn planar_big_endian_file() -> Vec<u8> {
    let (rows, cols, channels, rps) = (3usize, 2usize, 3usize, 2usize);
    let value = |r: usize, c: usize, ch: usize| (1000 * ch + 10 * r + c) as u16;

    let mut file = Vec::new();
    file.extend_from_slice(b"MM");
    file.extend_from_slice(&42u16.to_be_bytes());
    file.extend_from_slice(&0u32.to_be_bytes());

    let mut offsets = Vec::new();
    let mut counts = Vec::new();
    for plane in 0..channels {
        for first in (0..rows).step_by(rps) {
            offsets.push(file.len() as u32);
            let start = file.len();
            for r in first..(first + rps).min(rows) {
                for c in 0..cols {
                    file.extend_from_slice(&value(r, c, plane).to_be_bytes());
                }
            }
            counts.push((file.len() - start) as u32);
        }
    }

    let ifd_at = file.len() as u32;
    file[4..8].copy_from_slice(&ifd_at.to_be_bytes());
    let entries = 10u16;
    let extra = ifd_at + 2 + 12 * entries as u32 + 4;
    let strips = offsets.len() as u32;

    let short = |v: u16| {
        let mut s = v.to_be_bytes().to_vec();
        s.extend_from_slice(&[0, 0]);
        s
    };
    let mut dir: Vec<(u16, u16, u32, Vec<u8>)> = vec![
        (256, 3, 1, short(cols as u16)),
        (257, 3, 1, short(rows as u16)),
        (258, 3, 3, (extra + 8 * strips).to_be_bytes().to_vec()),
        (259, 3, 1, short(1)),
        (262, 3, 1, short(2)),
        (273, 4, strips, extra.to_be_bytes().to_vec()),
        (277, 3, 1, short(channels as u16)),
        (278, 3, 1, short(rps as u16)),
        (279, 4, strips, (extra + 4 * strips).to_be_bytes().to_vec()),
        (284, 3, 1, short(2)),
    ];
    file.extend_from_slice(&entries.to_be_bytes());
    for (tag, ty, count, value) in dir.drain(..) {
        file.extend_from_slice(&tag.to_be_bytes());
        file.extend_from_slice(&ty.to_be_bytes());
        file.extend_from_slice(&count.to_be_bytes());
        file.extend_from_slice(&value);
    }
    file.extend_from_slice(&0u32.to_be_bytes());
    for o in &offsets {
        file.extend_from_slice(&o.to_be_bytes());
    }
    for c in &counts {
        file.extend_from_slice(&c.to_be_bytes());
    }
    for _ in 0..channels {
        file.extend_from_slice(&16u16.to_be_bytes());
    }
    file
}

#[test]
fn reads_foreign_big_endian_planar_layout() {
    let dir = TempDir::new().unwrap();
    let path = scratch(&dir, "planar-be.tif");
    std::fs::write(&path, planar_big_endian_file()).unwrap();
    assert_eq!(reader_endian(&path), Endian::Big);

    let buf = load(&path).unwrap();
    assert_eq!((buf.rows(), buf.cols(), buf.channels(), buf.kind()), (3, 2, 3, SampleKind::U16));
    assert_eq!(buf.resolution(), Resolution::default());
    assert_eq!(buf.frame_meta(0).unwrap(), &FrameMetadata::default());
    for r in 0..3 {
        let row = buf.row_samples::<u16>(r, 0).unwrap();
        for c in 0..2 {
            for ch in 0..3 {
                assert_eq!(row[c * 3 + ch], (1000 * ch + 10 * r + c) as u16, "r{r} c{c} ch{ch}");
            }
        }
    }
}
