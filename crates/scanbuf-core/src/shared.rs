//! Copy-on-write buffer handle.
//!
//! [`PixelBuffer`] clones deeply. Large images that are passed around by
//! value but rarely modified go through [`SharedBuffer`] instead: clones share
//! one allocation, and the first mutation through
//! [`make_mut`](SharedBuffer::make_mut) duplicates it if anyone else still
//! holds a reference.
//!
//! ```rust
//! use scanbuf_core::{PixelBuffer, SampleKind, SharedBuffer};
//!
//! let a = SharedBuffer::new(PixelBuffer::new(4, 4, 1, SampleKind::U8, 1));
//! let mut b = a.clone();
//! assert!(a.ptr_eq(&b));
//!
//! b.make_mut().data_mut()[0] = 7;
//! assert!(!a.ptr_eq(&b));
//! assert_eq!(a.data()[0], 0);
//! ```

use std::ops::Deref;
use std::sync::Arc;

use crate::buffer::PixelBuffer;

/// Reference-counted [`PixelBuffer`] with copy-on-write mutation.
#[derive(Clone, Debug)]
pub struct SharedBuffer {
    inner: Arc<PixelBuffer>,
}

impl SharedBuffer {
    /// Wraps an owned buffer.
    pub fn new(buffer: PixelBuffer) -> Self {
        Self {
            inner: Arc::new(buffer),
        }
    }

    /// Exclusive access, duplicating the buffer first if it is shared.
    #[inline]
    pub fn make_mut(&mut self) -> &mut PixelBuffer {
        Arc::make_mut(&mut self.inner)
    }

    /// Whether this handle is the only one.
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Whether two handles point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Unwraps the buffer, copying only if other handles remain.
    pub fn into_inner(self) -> PixelBuffer {
        Arc::try_unwrap(self.inner).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl Deref for SharedBuffer {
    type Target = PixelBuffer;

    #[inline]
    fn deref(&self) -> &PixelBuffer {
        &self.inner
    }
}

impl From<PixelBuffer> for SharedBuffer {
    fn from(buffer: PixelBuffer) -> Self {
        Self::new(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleKind;

    #[test]
    fn test_unique_mutation_does_not_copy() {
        let mut a = SharedBuffer::new(PixelBuffer::new(2, 2, 1, SampleKind::U8, 1));
        assert!(a.is_unique());
        let before = a.data().as_ptr();
        a.make_mut().data_mut()[1] = 3;
        assert_eq!(a.data().as_ptr(), before);
    }

    #[test]
    fn test_shared_mutation_copies() {
        let a = SharedBuffer::new(PixelBuffer::new(2, 2, 1, SampleKind::U16, 1));
        let mut b = a.clone();
        assert!(!a.is_unique());
        b.make_mut().fill(500u16);
        assert!(a.samples::<u16>().unwrap().iter().all(|&v| v == 0));
        assert!(b.samples::<u16>().unwrap().iter().all(|&v| v == 500));
        assert!(a.is_unique() && b.is_unique());
    }

    #[test]
    fn test_into_inner() {
        let a = SharedBuffer::new(PixelBuffer::new(1, 1, 1, SampleKind::U8, 1));
        let b = a.clone();
        let owned = a.into_inner();
        assert_eq!(&owned, &*b);
    }
}
