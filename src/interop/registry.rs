//! Routine descriptor table
//!
//! Descriptors are immutable once defined and are only ever appended, so an
//! index handed out by `define` stays valid for the life of the table.
//! Calls clone the `Arc` and release the lock before marshaling.

use super::abi::CallingConvention;
use super::call::MAX_ARGS;
use super::error::{CallError, DefineError};
use super::types::{ReturnClass, TypeCode};
use crate::logging::debug;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;

/// A bound native routine
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDescriptor {
    name: String,
    address: usize,
    convention: CallingConvention,
    params: SmallVec<[TypeCode; 8]>,
    return_code: u32,
}

impl RoutineDescriptor {
    /// Bind a native entry point.
    ///
    /// The return code is kept raw: codes outside the known set are legal
    /// and handled when the result is boxed.
    ///
    /// # Safety
    /// `address` must be the entry point of a routine whose native signature
    /// matches `convention`, `params` and `return_code` for as long as the
    /// descriptor can be called.
    pub unsafe fn new(
        name: impl Into<String>,
        address: usize,
        convention: CallingConvention,
        params: &[u32],
        return_code: u32,
    ) -> Result<Self, DefineError> {
        let name = name.into();
        if address == 0 {
            return Err(DefineError::NullAddress { name });
        }
        if params.len() > MAX_ARGS {
            return Err(DefineError::TooManyParams {
                name,
                count: params.len(),
                max: MAX_ARGS,
            });
        }

        let mut types = SmallVec::with_capacity(params.len());
        for (position, &code) in params.iter().enumerate() {
            match TypeCode::from_raw(code) {
                Some(ty) => types.push(ty),
                None => {
                    return Err(DefineError::InvalidArgType {
                        name,
                        position: position + 1,
                        code,
                    })
                }
            }
        }

        Ok(Self {
            name,
            address,
            convention,
            params: types,
            return_code,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn address(&self) -> usize {
        self.address
    }

    #[inline]
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    #[inline]
    pub fn params(&self) -> &[TypeCode] {
        &self.params
    }

    /// Raw return code; 0 for a procedure
    #[inline]
    pub fn return_code(&self) -> u32 {
        self.return_code
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the routine produces a value
    #[inline]
    pub fn is_function(&self) -> bool {
        self.return_code != 0
    }

    #[inline]
    pub fn return_class(&self) -> ReturnClass {
        ReturnClass::of(self.return_code)
    }
}

/// Append-only table of routine descriptors
#[derive(Debug, Default)]
pub struct RoutineTable {
    routines: RwLock<Vec<Arc<RoutineDescriptor>>>,
}

impl RoutineTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor, returning its routine number
    pub fn define(&self, descriptor: RoutineDescriptor) -> usize {
        let mut routines = self.routines.write();
        let index = routines.len();
        debug!(
            function = descriptor.name(),
            index,
            arity = descriptor.arity(),
            return_code = descriptor.return_code(),
            "routine defined"
        );
        routines.push(Arc::new(descriptor));
        index
    }

    /// Look up a routine number
    pub fn resolve(&self, index: usize) -> Result<Arc<RoutineDescriptor>, CallError> {
        self.routines
            .read()
            .get(index)
            .cloned()
            .ok_or(CallError::BadRoutineNumber(index))
    }

    pub fn len(&self) -> usize {
        self.routines.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static ROUTINES: Lazy<RoutineTable> = Lazy::new(RoutineTable::new);

/// Process-wide routine table
#[inline]
pub fn routines() -> &'static RoutineTable {
    &ROUTINES
}

/// Bind a routine in the process-wide table
///
/// # Safety
/// See [`RoutineDescriptor::new`].
pub unsafe fn define_c_routine(
    name: impl Into<String>,
    address: usize,
    convention: CallingConvention,
    params: &[u32],
    return_code: u32,
) -> Result<usize, DefineError> {
    let descriptor = RoutineDescriptor::new(name, address, convention, params, return_code)?;
    Ok(routines().define(descriptor))
}
