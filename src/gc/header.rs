//! Object metadata - layout of heap cells handed to native code
//!
//! Design: every heap value lives in a `#[repr(C)]` cell whose first field is
//! the header, so the representation pointer passed to a native routine
//! points straight at the reference count.

use std::sync::atomic::{AtomicU32, Ordering};

/// Object header (8 bytes) - prefixed before every heap payload
#[repr(C, align(8))]
pub struct ObjectHeader {
    pub refcount: AtomicU32,
    pub flags: u32,
}

impl ObjectHeader {
    /// Create header for new object (count starts at one owner)
    #[inline]
    pub const fn new(flags: u32) -> Self {
        Self {
            refcount: AtomicU32::new(1),
            flags,
        }
    }

    /// Current reference count
    #[inline]
    pub fn refcount(&self) -> u32 {
        self.refcount.load(Ordering::Acquire)
    }

    /// Read the header at a representation pointer.
    ///
    /// # Safety
    /// `repr` must be the representation pointer of a live heap value.
    #[inline]
    pub unsafe fn from_repr<'a>(repr: usize) -> &'a ObjectHeader {
        &*(repr as *const ObjectHeader)
    }
}

/// Header flag: cell holds a boxed double
pub const KIND_FLOAT: u32 = 1;
/// Header flag: cell holds a sequence
pub const KIND_SEQUENCE: u32 = 2;

/// Heap cell: header followed by payload
#[repr(C)]
pub struct HeapCell<T> {
    pub header: ObjectHeader,
    pub value: T,
}
