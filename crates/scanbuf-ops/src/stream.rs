//! Rescaling straight to a container file, one tile at a time.
//!
//! Only one destination tile is ever resident: it is resampled from the
//! source rows its [`SourceWindow`](crate::SourceWindow) names, appended to
//! the open directory, then reused for the next tile.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scanbuf_core::{Error, PixelBuffer, Sample, SampleKind};
use scanbuf_io::{ContainerWriter, DirectorySpec};
use tracing::{debug, info, trace};

use crate::resample::{Algorithm, AspectMode, ResamplePlan, Scratch, target_size, tile_rows};
use crate::{OpsError, OpsResult};

/// Cooperative cancellation flag, shared between the caller and a running
/// operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A run of destination rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// First destination row.
    pub start: usize,
    /// Rows in the tile.
    pub rows: usize,
}

/// Splits `rows` destination rows into tiles of at most `tile_rows`.
pub fn generate_tiles(rows: usize, tile_rows: usize) -> Vec<Tile> {
    let step = tile_rows.max(1);
    (0..rows)
        .step_by(step)
        .map(|start| Tile { start, rows: step.min(rows - start) })
        .collect()
}

/// Outcome of a streamed rescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RescaleReport {
    /// Destination rows per frame.
    pub rows: usize,
    /// Destination columns.
    pub cols: usize,
    /// Directories written.
    pub frames: usize,
    /// Tiles written across all frames.
    pub tiles: usize,
    /// Destination rows per full tile.
    pub tile_rows: usize,
    /// Largest tile buffer held, in bytes.
    pub peak_tile_bytes: usize,
}

/// Progress after one tile has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileProgress {
    /// Frame being written.
    pub frame: usize,
    /// The tile just written.
    pub tile: Tile,
    /// Tiles written across all frames so far.
    pub tiles_done: usize,
    /// Rows of the current frame on disk.
    pub rows_done: usize,
}

/// Rescales every frame of `buffer` into a new container at `path`, each
/// frame becoming one directory.
///
/// `cancel` is polled before every tile. On cancellation the current
/// directory is closed with the rows written so far, the file is flushed,
/// and [`OpsError::Cancelled`] is returned.
pub fn rescale_to_disk<P: AsRef<Path>>(
    buffer: &PixelBuffer,
    path: P,
    rows: usize,
    cols: usize,
    aspect: AspectMode,
    algorithm: Algorithm,
    cancel: &CancelToken,
) -> OpsResult<RescaleReport> {
    rescale_to_disk_with(buffer, path, rows, cols, aspect, algorithm, cancel, |_| {})
}

/// [`rescale_to_disk`], calling `progress` after every tile.
#[allow(clippy::too_many_arguments)]
pub fn rescale_to_disk_with<P, F>(
    buffer: &PixelBuffer,
    path: P,
    rows: usize,
    cols: usize,
    aspect: AspectMode,
    algorithm: Algorithm,
    cancel: &CancelToken,
    mut progress: F,
) -> OpsResult<RescaleReport>
where
    P: AsRef<Path>,
    F: FnMut(&TileProgress),
{
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if rows == 0 || cols == 0 {
        return Err(OpsError::InvalidDimensions(format!("requested {rows}x{cols}")));
    }
    let (dst_rows, dst_cols) = target_size(buffer.rows(), buffer.cols(), rows, cols, aspect);
    let plan = ResamplePlan::new(buffer.rows(), buffer.cols(), dst_rows, dst_cols, algorithm)?;

    let payload = (dst_rows * dst_cols * buffer.channels() * buffer.kind().bytes() * buffer.frames()) as u64;
    let mut writer = ContainerWriter::create_for_payload(path.as_ref(), payload)?;
    let mut report = RescaleReport {
        rows: dst_rows,
        cols: dst_cols,
        tile_rows: tile_rows(dst_cols).min(dst_rows),
        ..Default::default()
    };
    info!(
        path = %path.as_ref().display(),
        dst = format_args!("{dst_rows}x{dst_cols}"),
        frames = buffer.frames(),
        tile_rows = report.tile_rows,
        "streaming rescale"
    );

    let outcome = match buffer.kind() {
        SampleKind::U8 => stream_frames::<u8, _, _>(&plan, buffer, &mut writer, cancel, &mut report, &mut progress),
        SampleKind::U16 => stream_frames::<u16, _, _>(&plan, buffer, &mut writer, cancel, &mut report, &mut progress),
        SampleKind::F32 => stream_frames::<f32, _, _>(&plan, buffer, &mut writer, cancel, &mut report, &mut progress),
    };
    writer.finish()?;
    outcome?;
    debug!(tiles = report.tiles, peak_tile_bytes = report.peak_tile_bytes, "streaming rescale done");
    Ok(report)
}

fn stream_frames<T, W, F>(
    plan: &ResamplePlan,
    src: &PixelBuffer,
    writer: &mut ContainerWriter<W>,
    cancel: &CancelToken,
    report: &mut RescaleReport,
    progress: &mut F,
) -> OpsResult<()>
where
    T: Sample,
    W: std::io::Write + std::io::Seek,
    F: FnMut(&TileProgress),
{
    let (dst_rows, dst_cols) = plan.dst_size();
    let line = dst_cols * src.channels();
    let mut tile = vec![T::default(); report.tile_rows * line];
    let mut scratch = Scratch::new();

    for frame in 0..src.frames() {
        let mut spec = DirectorySpec::for_frame(src, frame);
        spec.rows = dst_rows;
        spec.cols = dst_cols;
        let mut dir = writer.begin_directory(spec)?;

        for t in generate_tiles(dst_rows, report.tile_rows) {
            if cancel.is_cancelled() {
                let rows_written = dir.finish_partial()?;
                debug!(frame, rows_written, "streaming rescale cancelled");
                return Err(OpsError::Cancelled { rows_written, tiles: report.tiles });
            }
            let window = plan.source_window(t.start..t.start + t.rows);
            trace!(
                frame,
                start = t.start,
                rows = t.rows,
                src_start = window.start,
                src_end = window.end,
                touches_top = window.touches_top,
                touches_bottom = window.touches_bottom,
                "tile"
            );
            let samples = &mut tile[..t.rows * line];
            plan.resample(src, frame, t.start..t.start + t.rows, samples, &mut scratch)?;
            dir.write_rows(bytemuck::cast_slice::<T, u8>(samples))?;

            report.tiles += 1;
            report.peak_tile_bytes = report.peak_tile_bytes.max(std::mem::size_of_val(samples));
            progress(&TileProgress { frame, tile: t, tiles_done: report.tiles, rows_done: dir.rows_written() });
        }
        dir.finish()?;
        report.frames += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_tiles() {
        let tiles = generate_tiles(10, 4);
        assert_eq!(
            tiles,
            vec![Tile { start: 0, rows: 4 }, Tile { start: 4, rows: 4 }, Tile { start: 8, rows: 2 }]
        );
        assert!(generate_tiles(0, 4).is_empty());
        assert_eq!(generate_tiles(3, 0).len(), 3);
    }

    #[test]
    fn test_token_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cancelled.tif");
        let mut buf = PixelBuffer::new(20, 20, 1, SampleKind::U8, 2);
        buf.fill(1u8);
        let token = CancelToken::new();
        token.cancel();

        let err = rescale_to_disk(&buf, &path, 10, 10, AspectMode::Ignore, Algorithm::Linear, &token).unwrap_err();
        assert!(matches!(err, OpsError::Cancelled { rows_written: 0, tiles: 0 }));
        // The file is still a valid, empty container.
        assert_eq!(scanbuf_io::directory_count(&path).unwrap(), 0);
    }
}
