//! End-to-end calls through the process-wide routine table

use callc::interop::{self, C_DOUBLE, C_INT, C_LONG, C_LONGLONG, C_POINTER, E_OBJECT};
use callc::{call_native, define_c_routine, CallError, CallingConvention, Value};
use proptest::prelude::*;

extern "C" fn scale(x: f64, factor: i32) -> f64 {
    x * factor as f64
}

extern "C" fn address_of(repr: usize) -> usize {
    repr
}

extern "C" fn sum3(a: i64, b: i64, c: i64) -> i64 {
    a + b + c
}

extern "system" fn sum3_system(a: i64, b: i64, c: i64) -> i64 {
    a + b + c
}

fn define(name: &str, address: usize, params: &[u32], ret: u32) -> Value {
    let index =
        unsafe { define_c_routine(name, address, CallingConvention::Cdecl, params, ret) }.unwrap();
    Value::Int(index as i64)
}

#[test]
fn test_call_through_global_table() {
    let f = define("scale", scale as *const () as usize, &[C_DOUBLE, C_INT], C_DOUBLE);
    let result = call_native(
        true,
        &f,
        &Value::sequence(vec![Value::float(1.25), Value::Int(4)]),
    )
    .unwrap();
    assert_eq!(result.as_f64(), Some(5.0));
    assert!(interop::stats().calls_made >= 1);
}

#[test]
fn test_stdcall_descriptor_is_callable() {
    let index = unsafe {
        define_c_routine(
            "sum3_system",
            sum3_system as *const () as usize,
            CallingConvention::Stdcall,
            &[C_LONGLONG; 3],
            C_LONGLONG,
        )
    }
    .unwrap();

    let result = call_native(
        true,
        &Value::Int(index as i64),
        &Value::sequence(vec![Value::Int(1), Value::Int(-2), Value::Int(40)]),
    )
    .unwrap();
    assert_eq!(result, Value::Int(39));
}

#[test]
fn test_object_representation_round_trip() {
    let f = define("address_of", address_of as *const () as usize, &[E_OBJECT], C_POINTER);
    let seq = Value::string("payload");

    let result = call_native(true, &f, &Value::sequence(vec![seq.clone()])).unwrap();
    assert_eq!(result.as_f64(), Some(seq.repr_word() as f64));
}

#[cfg(unix)]
#[test]
fn test_libc_labs() {
    let f = define("labs", libc::labs as *const () as usize, &[C_LONG], C_LONG);

    let result = call_native(true, &f, &Value::sequence(vec![Value::Int(-42)])).unwrap();
    assert_eq!(result, Value::Int(42));

    let result = call_native(true, &f, &Value::sequence(vec![Value::float(-7.9)])).unwrap();
    assert_eq!(result, Value::Int(7));
}

#[test]
fn test_errors_are_reported_before_the_call() {
    let f = define("sum3", sum3 as *const () as usize, &[C_LONGLONG; 3], C_LONGLONG);

    let err = call_native(false, &f, &Value::sequence(vec![])).unwrap_err();
    assert_eq!(err, CallError::ReturnsValue { name: "sum3".to_string() });
    assert!(interop::stats().fatal_errors >= 1);
}

proptest! {
    #[test]
    fn prop_wrong_arity_is_fatal(given in 0usize..=15) {
        prop_assume!(given != 3);
        let f = define("sum3", sum3 as *const () as usize, &[C_LONGLONG; 3], C_LONGLONG);
        let args = Value::sequence((0..given as i64).map(Value::Int).collect());

        let err = call_native(true, &f, &args).unwrap_err();
        prop_assert_eq!(
            err.to_string(),
            format!("C routine sum3() needs 3 arguments, not {}", given)
        );
    }

    #[test]
    fn prop_inline_sums_stay_inline(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let f = define("sum3", sum3 as *const () as usize, &[C_LONGLONG; 3], C_LONGLONG);
        let args = Value::sequence(vec![Value::Int(a), Value::Int(b), Value::Int(0)]);

        let result = call_native(true, &f, &args).unwrap();
        prop_assert!(result.is_int());
        prop_assert_eq!(result, Value::Int(a + b));
    }
}
