//! Size change by dithered pixel duplication.
//!
//! Growing an axis repeats source pixels at evenly spread positions; the
//! repeat boundary shifts from line to line following a bit-reversed
//! sequence, so the duplicates do not line up into visible seams. Shrinking
//! an axis crops it. A fractional column count is met on average: each row
//! gets the floor or the ceiling of it, with the rounding error carried to
//! the next row, and the shorter rows end in zero pixels.

use scanbuf_core::{Error, PixelBuffer};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Index mapping along one axis.
#[derive(Debug, Clone)]
struct Dither {
    /// Output pixels per inserted pixel, 0 when nothing is inserted.
    stretch: f64,
    /// Fractional positions of the repeat boundary, cycled across lines.
    offsets: Vec<f64>,
}

impl Dither {
    fn new(target: usize, source: usize) -> Self {
        let inserted = target as f64 - source as f64;
        let stretch = target as f64 / inserted;
        let len = if inserted > 0.0 { stretch.floor() as i64 - 1 } else { 0 };
        if len <= 0 {
            return Self { stretch: 0.0, offsets: vec![0.0] };
        }

        let mut points: Vec<(f64, u16)> = (0..len)
            .map(|n| ((n as f64 + 0.5) / (len + 1) as f64, (n as u16).reverse_bits()))
            .collect();
        points.sort_by_key(|&(_, order)| order);
        Self { stretch, offsets: points.into_iter().map(|(x, _)| x).collect() }
    }

    fn offset(&self, line: usize) -> f64 {
        self.offsets[line % self.offsets.len()]
    }

    /// Source index of output index `i` for a boundary at `offset`.
    fn map(&self, i: usize, offset: f64) -> usize {
        if self.stretch <= 1.0 {
            return i;
        }
        let ratio = i as f64 / self.stretch;
        let mut deleted = ratio.floor() as usize;
        if ratio - ratio.floor() > offset {
            deleted += 1;
        }
        i.saturating_sub(deleted)
    }
}

/// Resizes to `rows` by `cols` by duplicating or cropping pixels.
///
/// The output is `cols.ceil()` wide. Every frame is mapped the same way.
pub fn stretch(buffer: &PixelBuffer, rows: usize, cols: f64) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if rows == 0 || !(cols.is_finite() && cols > 0.0) {
        return Err(OpsError::InvalidDimensions(format!("stretch to {rows}x{cols}")));
    }
    let width = cols.ceil() as usize;
    trace!(rows, cols, from_rows = buffer.rows(), from_cols = buffer.cols(), "stretch");

    let mut out = PixelBuffer::try_new(rows, width, buffer.channels(), buffer.kind(), buffer.frames())?;
    out.copy_metadata_from(buffer);

    let down = Dither::new(rows, buffer.rows());
    // Rows are either the floor or the ceiling of `cols` wide.
    let narrow = Dither::new(cols.floor() as usize, buffer.cols());
    let wide = Dither::new(width, buffer.cols());
    let (last_row, last_col) = (buffer.rows() - 1, buffer.cols() - 1);
    let px = buffer.channels() * buffer.bytes_per_sample();

    let mut error = 0.0;
    for row in 0..rows {
        let local = (cols + error).floor() as usize;
        error += cols - local as f64;
        let across = if local == width { &wide } else { &narrow };
        let offset = across.offset(row);

        for col in 0..local.min(width) {
            let src_row = down.map(row, down.offset(col)).min(last_row);
            let src_col = across.map(col, offset).min(last_col);
            for frame in 0..buffer.frames() {
                let from = &buffer.scan_line(src_row, frame)[src_col * px..(src_col + 1) * px];
                out.scan_line_mut(row, frame)[col * px..(col + 1) * px].copy_from_slice(from);
            }
        }
    }
    Ok(out)
}
