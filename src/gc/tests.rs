//! Tests for reference counted heap cells

use super::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_refcount_new() {
    let rc = RefCount::new(2.5f64, KIND_FLOAT);
    assert_eq!(rc.count(), 1);
    assert_eq!(*rc, 2.5);
}

#[test]
fn test_refcount_clone_and_drop() {
    let rc1 = RefCount::new(vec![1u8, 2, 3], KIND_SEQUENCE);
    assert_eq!(rc1.count(), 1);

    let rc2 = rc1.clone();
    assert_eq!(rc1.count(), 2);
    assert_eq!(rc1.as_repr(), rc2.as_repr());

    drop(rc2);
    assert_eq!(rc1.count(), 1);
}

#[test]
fn test_repr_points_at_header() {
    let rc = RefCount::new(7.0f64, KIND_FLOAT);
    let _extra = rc.clone();
    let header = unsafe { ObjectHeader::from_repr(rc.as_repr()) };
    assert_eq!(header.refcount(), 2);
    assert_eq!(header.flags, KIND_FLOAT);
}

#[test]
fn test_refcount_across_threads() {
    let rc = Arc::new(RefCount::new(0.0f64, KIND_FLOAT));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let rc = Arc::clone(&rc);
            thread::spawn(move || {
                for _ in 0..1000 {
                    let claim = (*rc).clone();
                    drop(claim);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(rc.count(), 1);
}
