//! Call engine - validation, marshaling, dispatch and boxing for one call

use super::abi::AbiParams;
use super::call::FunctionCall;
use super::error::CallError;
use super::marshal::marshal_args;
use super::registry::{routines, RoutineDescriptor, RoutineTable};
use super::result::box_result;
use crate::config::UnknownReturn;
use crate::logging::{debug_span, log_ffi_call, log_ffi_error, log_ffi_return};
use crate::objects::Value;

/// Executes `c_func`/`c_proc` calls against a routine table
#[derive(Debug, Clone, Copy)]
pub struct CallEngine<'t> {
    table: &'t RoutineTable,
    unknown_return: UnknownReturn,
}

impl<'t> CallEngine<'t> {
    pub fn new(table: &'t RoutineTable) -> Self {
        Self {
            table,
            unknown_return: UnknownReturn::default(),
        }
    }

    /// Policy for return codes outside the known set
    pub fn with_unknown_return(mut self, policy: UnknownReturn) -> Self {
        self.unknown_return = policy;
        self
    }

    /// Call a routine by number.
    ///
    /// `is_function` is true at a `c_func` site and false at a `c_proc`
    /// site. Every error is raised before the routine is entered.
    pub fn call_native(
        &self,
        is_function: bool,
        routine_ref: &Value,
        arg_list: &Value,
    ) -> Result<Value, CallError> {
        let result = self.dispatch(is_function, routine_ref, arg_list);
        if let Err(err) = &result {
            super::record_fatal();
            log_ffi_error(err.routine().unwrap_or("c_proc/c_func"), &err.to_string());
        }
        result
    }

    fn dispatch(
        &self,
        is_function: bool,
        routine_ref: &Value,
        arg_list: &Value,
    ) -> Result<Value, CallError> {
        let index = routine_index(routine_ref)?;
        let routine = self.table.resolve(index)?;
        let name = routine.name();

        let span = debug_span!("native_call", function = name, index);
        let _enter = span.enter();

        let args = validate(&routine, is_function, arg_list)?;
        log_ffi_call(name, args.len());

        let abi = AbiParams::host().ok_or(CallError::UnsupportedArchitecture)?;
        let buffer = marshal_args(name, routine.params(), args, abi)?;

        let call = FunctionCall::new(
            name,
            routine.address(),
            routine.convention(),
            routine.return_class(),
        );
        // SAFETY: the binder vouched for address and signature when it
        // created the descriptor, and the buffer follows its parameter types
        let raw = unsafe { call.call(&buffer)? };
        drop(buffer);

        super::record_call();
        log_ffi_return(name);
        box_result(raw, routine.return_code(), name, self.unknown_return)
    }
}

/// Routine number from an interpreter value
fn routine_index(routine_ref: &Value) -> Result<usize, CallError> {
    match routine_ref {
        Value::Int(i) if *i >= 0 => Ok(*i as usize),
        Value::Float(d) if **d >= 0.0 && d.fract() == 0.0 && **d <= usize::MAX as f64 => {
            Ok(**d as usize)
        }
        _ => Err(CallError::BadRoutineRef),
    }
}

/// Call-shape checks, in reporting order
fn validate<'v>(
    routine: &RoutineDescriptor,
    is_function: bool,
    arg_list: &'v Value,
) -> Result<&'v [Value], CallError> {
    let name = || routine.name().to_string();

    match (is_function, routine.is_function()) {
        (true, false) => return Err(CallError::NoReturnValue { name: name() }),
        (false, true) => return Err(CallError::ReturnsValue { name: name() }),
        _ => {}
    }

    let args = arg_list
        .as_slice()
        .ok_or_else(|| CallError::ArgListNotSequence { name: name() })?;

    if args.len() != routine.arity() {
        return Err(CallError::ArgCount {
            name: name(),
            expected: routine.arity(),
            got: args.len(),
        });
    }
    Ok(args)
}

/// Call through the process-wide table with the installed configuration
pub fn call_native(
    is_function: bool,
    routine_ref: &Value,
    arg_list: &Value,
) -> Result<Value, CallError> {
    CallEngine::new(routines())
        .with_unknown_return(crate::config().calls.unknown_return)
        .call_native(is_function, routine_ref, arg_list)
}
