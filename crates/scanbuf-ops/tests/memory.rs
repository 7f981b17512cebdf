//! Allocation profile of an extreme downscale.
//!
//! Runs in its own binary so the counting allocator sees nothing but this
//! test.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use scanbuf_core::{PixelBuffer, SampleKind};
use scanbuf_ops::{Algorithm, AspectMode, rescale};

struct Counting;

static ARMED: AtomicBool = AtomicBool::new(false);
static LIVE: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);
static LARGEST: AtomicUsize = AtomicUsize::new(0);

fn record(size: usize) {
    let live = LIVE.fetch_add(size, Ordering::SeqCst) + size;
    if ARMED.load(Ordering::SeqCst) {
        PEAK.fetch_max(live, Ordering::SeqCst);
        LARGEST.fetch_max(size, Ordering::SeqCst);
    }
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        LIVE.fetch_sub(layout.size(), Ordering::SeqCst);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let out = unsafe { System.realloc(ptr, layout, new_size) };
        if !out.is_null() {
            LIVE.fetch_sub(layout.size(), Ordering::SeqCst);
            record(new_size);
        }
        out
    }
}

#[global_allocator]
static ALLOCATOR: Counting = Counting;

/// Live bytes when counting starts.
fn arm() -> usize {
    let base = LIVE.load(Ordering::SeqCst);
    PEAK.store(base, Ordering::SeqCst);
    LARGEST.store(0, Ordering::SeqCst);
    ARMED.store(true, Ordering::SeqCst);
    base
}

/// Largest single allocation and peak live bytes since [`arm`].
fn disarm() -> (usize, usize) {
    ARMED.store(false, Ordering::SeqCst);
    (LARGEST.load(Ordering::SeqCst), PEAK.load(Ordering::SeqCst))
}

#[test]
fn downscale_memory_is_independent_of_source_height() {
    let mut src = PixelBuffer::new(40_000, 100, 1, SampleKind::U8, 1);
    for (i, v) in src.data_mut().iter_mut().enumerate() {
        *v = (i % 251) as u8;
    }
    let source_bytes = src.len_bytes();

    let base = arm();
    let out = rescale(&src, 10, 100, AspectMode::Ignore, Algorithm::Super).unwrap();
    let (largest, peak) = disarm();

    assert_eq!((out.rows(), out.cols()), (10, 100));
    // Each output row averages 4000 source rows of the same ramp.
    let first = out.row_samples::<u8>(0, 0).unwrap();
    assert!(first.iter().all(|&v| v > 0 && v < 251));

    assert!(largest < source_bytes / 8, "largest allocation {largest} bytes for a {source_bytes}-byte source");
    let growth = peak - base;
    assert!(growth < source_bytes / 4, "peak growth {growth} bytes for a {source_bytes}-byte source");
}
