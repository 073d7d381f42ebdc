//! Reference counting smart pointer
//!
//! Hot path operations are always inlined.
//! Thread-safe atomic refcounting for concurrent access.

use super::header::{HeapCell, ObjectHeader};
use crate::logging::trace;
use core::marker::PhantomData;
use core::ops::Deref;
use core::ptr::NonNull;
use std::sync::atomic::{fence, Ordering};

/// Reference counted pointer to a heap cell
///
/// Cloning bumps the count in the cell header; dropping the last clone frees
/// the cell. The engine's only mutation of shared values is `clone`.
pub struct RefCount<T> {
    ptr: NonNull<HeapCell<T>>,
    _marker: PhantomData<HeapCell<T>>,
}

impl<T> RefCount<T> {
    /// Allocate a new cell with a count of one
    #[inline]
    pub fn new(value: T, flags: u32) -> Self {
        let cell = Box::new(HeapCell {
            header: ObjectHeader::new(flags),
            value,
        });
        let ptr = NonNull::from(Box::leak(cell));

        trace!(event = "refcount_new", address = ?ptr.as_ptr(), count = 1);

        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    fn header(&self) -> &ObjectHeader {
        unsafe { &self.ptr.as_ref().header }
    }

    /// Increment reference count (hot path, always inlined)
    #[inline(always)]
    fn inc(&self) {
        let old = self.header().refcount.fetch_add(1, Ordering::Relaxed);

        // Overflow detection in debug builds
        debug_assert!(old < u32::MAX, "refcount overflow");
    }

    /// Get current reference count
    #[inline]
    pub fn count(&self) -> u32 {
        self.header().refcount()
    }

    /// Address of the cell; this is what native code receives
    #[inline]
    pub fn as_repr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Destroy cell and free memory (cold path)
    #[cold]
    unsafe fn destroy(&mut self) {
        trace!(event = "refcount_destroy", address = ?self.ptr.as_ptr(), count = 0);
        drop(Box::from_raw(self.ptr.as_ptr()));
    }
}

impl<T> Clone for RefCount<T> {
    #[inline]
    fn clone(&self) -> Self {
        self.inc();
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for RefCount<T> {
    #[inline]
    fn drop(&mut self) {
        let old = self.header().refcount.fetch_sub(1, Ordering::Release);

        debug_assert!(old > 0, "refcount underflow");

        if old == 1 {
            // Synchronize with all previous decrements
            fence(Ordering::Acquire);
            unsafe { self.destroy() };
        }
    }
}

impl<T> Deref for RefCount<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &self.ptr.as_ref().value }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for RefCount<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        (**self).fmt(f)
    }
}

// RefCount is thread-safe with atomic refcounting
unsafe impl<T: Send + Sync> Send for RefCount<T> {}
unsafe impl<T: Send + Sync> Sync for RefCount<T> {}
