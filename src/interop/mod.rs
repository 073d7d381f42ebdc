//! Interoperability - call native routines from interpreted code
//!
//! Design: validate the whole call shape, marshal every argument, then make
//! exactly one typed native call and box its result.
//!
//! Architecture:
//! - `types.rs` - type codes, return classes, raw results
//! - `abi.rs` - per-target register budgets and argument classification
//! - `marshal.rs` - tagged values to integer/float/stack slots
//! - `stubs.rs` - arity-specialized typed call stubs
//! - `call.rs` - stub selection for the host ABI
//! - `result.rs` - raw results to tagged values
//! - `registry.rs` - routine descriptor table
//! - `engine.rs` - `call_native` entry point

mod abi;
mod call;
mod engine;
mod error;
mod marshal;
mod registry;
mod result;
mod stubs;
mod types;

pub use abi::{AbiModel, AbiParams, CallingConvention, ClassifierState, Placement};
pub use call::{FunctionCall, MAX_ARGS};
pub use engine::{call_native, CallEngine};
pub use error::{CallError, DefineError};
pub use marshal::{float_to_word, marshal_args, MarshalBuffer};
pub use registry::{define_c_routine, routines, RoutineDescriptor, RoutineTable};
pub use result::{box_result, box_signed, box_unsigned};
pub use types::*;

use std::sync::atomic::{AtomicUsize, Ordering};

static CALLS_MADE: AtomicUsize = AtomicUsize::new(0);
static FATAL_ERRORS: AtomicUsize = AtomicUsize::new(0);
static PROMOTED_RESULTS: AtomicUsize = AtomicUsize::new(0);

/// Initialize interop subsystem
pub fn init() {
    crate::logging::debug!(
        host_abi = ?AbiParams::host(),
        max_args = MAX_ARGS,
        "interop initialized"
    );
}

/// Get interop statistics
pub fn stats() -> InteropStats {
    InteropStats {
        calls_made: CALLS_MADE.load(Ordering::Relaxed),
        fatal_errors: FATAL_ERRORS.load(Ordering::Relaxed),
        promoted_results: PROMOTED_RESULTS.load(Ordering::Relaxed),
    }
}

/// Interop statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteropStats {
    /// Native routines entered and returned from
    pub calls_made: usize,
    /// Calls rejected before reaching native code
    pub fatal_errors: usize,
    /// Integer results boxed as doubles
    pub promoted_results: usize,
}

#[inline]
pub(crate) fn record_call() {
    CALLS_MADE.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_fatal() {
    FATAL_ERRORS.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_promotion() {
    PROMOTED_RESULTS.fetch_add(1, Ordering::Relaxed);
}
