//! Separable resampling with precomputed tap tables.
//!
//! A [`ResamplePlan`] is built once per (source size, destination size,
//! algorithm). Each axis gets a table of `(source index, weight)` taps per
//! destination index; indices are clamped into the source, so edges are
//! replicated. Rows are produced in tiles. Each source row goes through the
//! horizontal pass once and waits in a small ring until the last
//! destination row that reads it has been accumulated.
//!
//! # Algorithms
//!
//! | Algorithm | Kernel | Support |
//! |-----------|--------|---------|
//! | [`Algorithm::Nearest`] | point sample | 0.5 |
//! | [`Algorithm::Linear`] | tent | 1 |
//! | [`Algorithm::Cubic`] | cubic B-spline (B=1, C=0) | 2 |
//! | [`Algorithm::Lanczos3`] | windowed sinc | 3 |
//! | [`Algorithm::Super`] | area average | ratio |
//!
//! Filter support widens by the reduction ratio when shrinking.

use std::ops::Range;

use scanbuf_core::{Error, PixelBuffer, Resolution, Sample, SampleKind};
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Destination samples per tile.
pub const TILE_SAMPLES: usize = 1_000_000;

/// Destination rows per tile for a given destination width.
pub fn tile_rows(dst_cols: usize) -> usize {
    (TILE_SAMPLES / dst_cols.max(1)).max(1)
}

/// Resampling kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Nearest source pixel.
    Nearest,
    /// Linear interpolation.
    Linear,
    /// Cubic B-spline. Smooth, slightly soft.
    #[default]
    Cubic,
    /// Lanczos, three lobes.
    Lanczos3,
    /// Area averaging when shrinking, nearest when enlarging.
    Super,
}

impl Algorithm {
    /// Support radius at unit scale.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Self::Nearest | Self::Super => 0.5,
            Self::Linear => 1.0,
            Self::Cubic => 2.0,
            Self::Lanczos3 => 3.0,
        }
    }

    /// Kernel value at distance `x`.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Self::Nearest | Self::Super => box_weight(x),
            Self::Linear => tent_weight(x),
            Self::Cubic => cubic_weight(x),
            Self::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }

    /// Lower-case name, as accepted by `FromStr`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Cubic => "cubic",
            Self::Lanczos3 => "lanczos3",
            Self::Super => "super",
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "point" => Ok(Self::Nearest),
            "linear" | "bilinear" => Ok(Self::Linear),
            "cubic" | "bicubic" => Ok(Self::Cubic),
            "lanczos" | "lanczos3" => Ok(Self::Lanczos3),
            "super" | "area" | "box" => Ok(Self::Super),
            other => Err(format!("unknown resampling algorithm '{other}'")),
        }
    }
}

#[inline]
fn box_weight(x: f32) -> f32 {
    if x.abs() < 0.5 { 1.0 } else { 0.0 }
}

#[inline]
fn tent_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Mitchell-Netravali family at B=1, C=0.
#[inline]
fn cubic_weight(x: f32) -> f32 {
    const B: f32 = 1.0;
    const C: f32 = 0.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// How the requested size relates to the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMode {
    /// Use the requested size as is.
    #[default]
    Ignore,
    /// Largest size inside the request that keeps the aspect ratio.
    KeepFit,
    /// Smallest size covering the request that keeps the aspect ratio.
    KeepFill,
}

impl std::str::FromStr for AspectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "ignore" | "stretch" => Ok(Self::Ignore),
            "fit" | "keepfit" => Ok(Self::KeepFit),
            "fill" | "keepfill" => Ok(Self::KeepFill),
            other => Err(format!("unknown aspect mode '{other}'")),
        }
    }
}

/// Output `(rows, cols)` for a request under `aspect`.
///
/// ```rust
/// use scanbuf_ops::{AspectMode, target_size};
///
/// // 1080x1920 into a 640x640 box.
/// assert_eq!(target_size(1080, 1920, 640, 640, AspectMode::KeepFit), (360, 640));
/// assert_eq!(target_size(1080, 1920, 640, 640, AspectMode::KeepFill), (640, 1138));
/// ```
pub fn target_size(src_rows: usize, src_cols: usize, rows: usize, cols: usize, aspect: AspectMode) -> (usize, usize) {
    let scale = |pick: fn(f64, f64) -> f64| {
        let lambda = pick(cols as f64 / src_cols as f64, rows as f64 / src_rows as f64);
        let r = ((src_rows as f64 * lambda).round() as usize).max(1);
        let c = ((src_cols as f64 * lambda).round() as usize).max(1);
        (r, c)
    };
    match aspect {
        AspectMode::Ignore => (rows, cols),
        AspectMode::KeepFit => scale(f64::min),
        AspectMode::KeepFill => scale(f64::max),
    }
}

/// Tap table for one axis.
#[derive(Debug, Clone)]
pub struct AxisPlan {
    starts: Vec<usize>,
    indices: Vec<u32>,
    weights: Vec<f32>,
    border: usize,
}

impl AxisPlan {
    fn new(src: usize, dst: usize, algorithm: Algorithm) -> Self {
        let scale = src as f64 / dst as f64;
        let last = src as isize - 1;
        let mut plan = Self {
            starts: Vec::with_capacity(dst + 1),
            indices: Vec::new(),
            weights: Vec::new(),
            border: 0,
        };
        plan.starts.push(0);

        let mut taps: Vec<(u32, f32)> = Vec::new();
        let mut reach = (0isize, last);
        for i in 0..dst {
            taps.clear();
            let nearest = (((i as f64 + 0.5) * scale).floor() as isize).clamp(0, last) as u32;

            match algorithm {
                Algorithm::Nearest => taps.push((nearest, 1.0)),
                Algorithm::Super if scale <= 1.0 => taps.push((nearest, 1.0)),
                Algorithm::Super => {
                    let lo = i as f64 * scale;
                    let hi = lo + scale;
                    for s in lo.floor() as usize..(hi.ceil() as usize).min(src) {
                        let w = (hi.min(s as f64 + 1.0) - lo.max(s as f64)) as f32;
                        if w > 0.0 {
                            taps.push((s as u32, w));
                        }
                    }
                }
                _ => {
                    let fscale = scale.max(1.0);
                    let support = algorithm.support() as f64 * fscale;
                    let center = (i as f64 + 0.5) * scale - 0.5;
                    let left = (center - support).floor() as isize;
                    let right = (center + support).ceil() as isize;
                    for s in left..=right {
                        let w = algorithm.weight(((s as f64 - center) / fscale) as f32);
                        if w == 0.0 {
                            continue;
                        }
                        reach = (reach.0.min(s), reach.1.max(s));
                        let idx = s.clamp(0, last) as u32;
                        match taps.last_mut() {
                            Some((prev, acc)) if *prev == idx => *acc += w,
                            _ => taps.push((idx, w)),
                        }
                    }
                }
            }

            let sum: f32 = taps.iter().map(|t| t.1).sum();
            if sum.abs() < 1e-8 {
                taps.clear();
                taps.push((nearest, 1.0));
            } else {
                taps.iter_mut().for_each(|t| t.1 /= sum);
            }
            for &(idx, w) in &taps {
                plan.indices.push(idx);
                plan.weights.push(w);
            }
            plan.starts.push(plan.indices.len());
        }

        plan.border = (-reach.0).max(reach.1 - last).max(0) as usize;
        plan
    }

    /// Source indices and weights for destination index `i`.
    #[inline]
    pub fn taps(&self, i: usize) -> (&[u32], &[f32]) {
        let range = self.starts[i]..self.starts[i + 1];
        (&self.indices[range.clone()], &self.weights[range])
    }

    /// Destination length.
    pub fn len(&self) -> usize {
        self.starts.len() - 1
    }

    /// Whether the axis has no destination samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source samples the kernel reaches past either edge.
    pub fn border(&self) -> usize {
        self.border
    }

    /// Smallest and one-past-largest source index used by `dst`.
    fn span(&self, dst: Range<usize>) -> (usize, usize) {
        let used = &self.indices[self.starts[dst.start]..self.starts[dst.end]];
        let lo = used.iter().copied().min().unwrap_or(0) as usize;
        let hi = used.iter().copied().max().map_or(0, |v| v as usize + 1);
        (lo, hi)
    }
}

/// Source rows a run of destination rows reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceWindow {
    /// First source row.
    pub start: usize,
    /// One past the last source row.
    pub end: usize,
    /// The window starts at the first source row.
    pub touches_top: bool,
    /// The window ends at the last source row.
    pub touches_bottom: bool,
}

impl SourceWindow {
    /// Rows in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Precomputed taps for one resize.
#[derive(Debug, Clone)]
pub struct ResamplePlan {
    src_rows: usize,
    src_cols: usize,
    algorithm: Algorithm,
    rows: AxisPlan,
    cols: AxisPlan,
}

impl ResamplePlan {
    /// Builds the tap tables.
    pub fn new(src_rows: usize, src_cols: usize, dst_rows: usize, dst_cols: usize, algorithm: Algorithm) -> OpsResult<Self> {
        if src_rows == 0 || src_cols == 0 || dst_rows == 0 || dst_cols == 0 {
            return Err(OpsError::InvalidDimensions(format!(
                "{src_rows}x{src_cols} -> {dst_rows}x{dst_cols}"
            )));
        }
        if src_rows > u32::MAX as usize || src_cols > u32::MAX as usize {
            return Err(OpsError::InvalidDimensions(format!("source {src_rows}x{src_cols} too large")));
        }
        let plan = Self {
            src_rows,
            src_cols,
            algorithm,
            rows: AxisPlan::new(src_rows, dst_rows, algorithm),
            cols: AxisPlan::new(src_cols, dst_cols, algorithm),
        };
        trace!(
            src = format_args!("{src_rows}x{src_cols}"),
            dst = format_args!("{dst_rows}x{dst_cols}"),
            algorithm = algorithm.name(),
            border = plan.border(),
            "resample plan"
        );
        Ok(plan)
    }

    /// Source `(rows, cols)`.
    pub fn src_size(&self) -> (usize, usize) {
        (self.src_rows, self.src_cols)
    }

    /// Destination `(rows, cols)`.
    pub fn dst_size(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// Kernel.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Vertical tap table.
    pub fn row_taps(&self) -> &AxisPlan {
        &self.rows
    }

    /// Horizontal tap table.
    pub fn col_taps(&self) -> &AxisPlan {
        &self.cols
    }

    /// Rows the vertical kernel reaches past the top or bottom edge, served
    /// by replicating the edge row.
    pub fn border(&self) -> usize {
        self.rows.border()
    }

    /// Source rows needed for destination rows `dst`.
    pub fn source_window(&self, dst: Range<usize>) -> SourceWindow {
        let (start, end) = self.rows.span(dst);
        SourceWindow {
            start,
            end,
            touches_top: start == 0,
            touches_bottom: end == self.src_rows,
        }
    }

    /// Resamples destination rows `dst` of `frame` into `out`, which holds
    /// `dst.len()` rows of `dst_cols * channels` samples.
    ///
    /// Source rows pass through the horizontal kernel one at a time and are
    /// kept in `scratch` only while a following destination row still
    /// reads them, so memory is bounded by the kernel overlap rather than
    /// by the source window.
    pub fn resample<T: Sample>(
        &self,
        src: &PixelBuffer,
        frame: usize,
        dst: Range<usize>,
        out: &mut [T],
        scratch: &mut Scratch,
    ) -> OpsResult<()> {
        if src.rows() != self.src_rows || src.cols() != self.src_cols || src.kind() != T::KIND {
            return Err(OpsError::InvalidParameter(format!(
                "plan for {}x{} used on {}x{} {}",
                self.src_rows,
                self.src_cols,
                src.rows(),
                src.cols(),
                src.kind()
            )));
        }
        let ch = src.channels();
        let line = self.cols.len() * ch;
        if dst.end > self.rows.len() || out.len() < dst.len() * line {
            return Err(OpsError::InvalidParameter(format!(
                "rows {dst:?} into {} samples, plan has {} rows of {line}",
                out.len(),
                self.rows.len()
            )));
        }
        if dst.is_empty() {
            return Ok(());
        }

        let slots = self.ring_slots(dst.clone(), line);
        let Scratch { ring, keys, acc } = scratch;
        ring.clear();
        ring.resize(slots * line, 0.0);
        keys.clear();
        keys.resize(slots, usize::MAX);
        acc.clear();
        acc.resize(line, 0.0);

        for (k, y) in dst.enumerate() {
            acc.fill(0.0);
            let (idx, w) = self.rows.taps(y);
            for (&s, &wt) in idx.iter().zip(w) {
                let s = s as usize;
                let slot = s % slots;
                let held = &mut ring[slot * line..(slot + 1) * line];
                if keys[slot] != s {
                    let row = src.row_samples::<T>(s, frame).ok_or(Error::InvalidBuffer)?;
                    self.horizontal(row, ch, held);
                    keys[slot] = s;
                }
                for (a, &v) in acc.iter_mut().zip(held.iter()) {
                    *a += v * wt;
                }
            }
            for (o, &a) in out[k * line..(k + 1) * line].iter_mut().zip(acc.iter()) {
                *o = T::from_raw_f32(a);
            }
        }
        Ok(())
    }

    /// Ring size for `dst`: the most source rows two neighboring
    /// destination rows share, capped at a tile's worth of samples.
    fn ring_slots(&self, dst: Range<usize>, line: usize) -> usize {
        let mut slots = 1;
        for y in dst.start + 1..dst.end {
            let (_, prev_end) = self.rows.span(y - 1..y);
            let (next_start, _) = self.rows.span(y..y + 1);
            slots = slots.max(prev_end.saturating_sub(next_start));
        }
        slots.min((TILE_SAMPLES / line.max(1)).max(1))
    }

    /// One source row through the horizontal kernel.
    fn horizontal<T: Sample>(&self, row: &[T], ch: usize, out: &mut [f32]) {
        out.fill(0.0);
        for x in 0..self.cols.len() {
            let (idx, w) = self.cols.taps(x);
            let acc = &mut out[x * ch..(x + 1) * ch];
            for (&s, &wt) in idx.iter().zip(w) {
                let px = &row[s as usize * ch..(s as usize + 1) * ch];
                for (a, &v) in acc.iter_mut().zip(px) {
                    *a += v.to_raw_f32() * wt;
                }
            }
        }
    }
}

/// Working memory for [`ResamplePlan::resample`], reused across tiles.
#[derive(Debug, Default)]
pub struct Scratch {
    /// Horizontally resampled source rows.
    ring: Vec<f32>,
    /// Source row held by each ring slot.
    keys: Vec<usize>,
    /// One destination row being accumulated.
    acc: Vec<f32>,
}

impl Scratch {
    /// Empty scratch space.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resizes every frame of `buffer`.
///
/// The result carries the source profile, photometric tag, resolution and
/// frame metadata.
pub fn rescale(
    buffer: &PixelBuffer,
    rows: usize,
    cols: usize,
    aspect: AspectMode,
    algorithm: Algorithm,
) -> OpsResult<PixelBuffer> {
    if !buffer.is_valid() {
        return Err(Error::InvalidBuffer.into());
    }
    if rows == 0 || cols == 0 {
        return Err(OpsError::InvalidDimensions(format!("requested {rows}x{cols}")));
    }
    let (dst_rows, dst_cols) = target_size(buffer.rows(), buffer.cols(), rows, cols, aspect);
    let plan = ResamplePlan::new(buffer.rows(), buffer.cols(), dst_rows, dst_cols, algorithm)?;
    debug!(
        src = format_args!("{}x{}", buffer.rows(), buffer.cols()),
        dst = format_args!("{dst_rows}x{dst_cols}"),
        ?aspect,
        algorithm = algorithm.name(),
        "rescale"
    );

    let mut out = PixelBuffer::try_new(dst_rows, dst_cols, buffer.channels(), buffer.kind(), buffer.frames())?;
    out.copy_metadata_from(buffer);
    let mut scratch = Scratch::new();
    for frame in 0..buffer.frames() {
        match buffer.kind() {
            SampleKind::U8 => resample_frame::<u8>(&plan, buffer, frame, &mut out, &mut scratch)?,
            SampleKind::U16 => resample_frame::<u16>(&plan, buffer, frame, &mut out, &mut scratch)?,
            SampleKind::F32 => resample_frame::<f32>(&plan, buffer, frame, &mut out, &mut scratch)?,
        }
    }
    Ok(out)
}

/// Resizes so the physical size stays the same at a new resolution.
///
/// Sizes are `round(cols / x * x_dpi)` by `round(rows / y * y_dpi)`, at
/// least one pixel, using nearest-neighbor sampling. The result carries
/// the new resolution.
pub fn convert_resolution(buffer: &PixelBuffer, x_dpi: f32, y_dpi: f32) -> OpsResult<PixelBuffer> {
    if !(x_dpi > 0.0 && y_dpi > 0.0) {
        return Err(OpsError::InvalidParameter(format!("resolution {x_dpi}x{y_dpi}")));
    }
    let res = buffer.resolution();
    if !(res.x > 0.0 && res.y > 0.0) {
        return Err(OpsError::InvalidParameter(format!("source resolution {}x{}", res.x, res.y)));
    }
    let cols = ((buffer.cols() as f64 / res.x as f64 * x_dpi as f64).round() as usize).max(1);
    let rows = ((buffer.rows() as f64 / res.y as f64 * y_dpi as f64).round() as usize).max(1);
    let mut out = rescale(buffer, rows, cols, AspectMode::Ignore, Algorithm::Nearest)?;
    out.set_resolution(Resolution { x: x_dpi, y: y_dpi });
    Ok(out)
}

fn resample_frame<T: Sample>(
    plan: &ResamplePlan,
    src: &PixelBuffer,
    frame: usize,
    out: &mut PixelBuffer,
    scratch: &mut Scratch,
) -> OpsResult<()> {
    let (dst_rows, dst_cols) = plan.dst_size();
    let line = dst_cols * src.channels();
    let step = tile_rows(dst_cols);
    let samples = out.frame_samples_mut::<T>(frame).ok_or(Error::InvalidBuffer)?;
    for start in (0..dst_rows).step_by(step) {
        let end = (start + step).min(dst_rows);
        plan.resample(src, frame, start..end, &mut samples[start * line..end * line], scratch)?;
    }
    Ok(())
}
