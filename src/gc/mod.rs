//! Heap cells - reference counted storage behind boxed values
//!
//! Allocation and collection belong to the embedding interpreter; this is
//! the slice of it the call engine touches: a header-prefixed cell and an
//! atomic count that argument claims bump.

mod header;
mod refcount;

#[cfg(test)]
mod tests;

pub use header::{HeapCell, ObjectHeader, KIND_FLOAT, KIND_SEQUENCE};
pub use refcount::RefCount;
