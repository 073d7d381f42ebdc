//! Native call benchmarks
//!
//! Measures marshaling alone and full calls through the engine.

use callc::interop::{
    marshal_args, AbiParams, CallEngine, CallingConvention, RoutineDescriptor, RoutineTable,
    TypeCode, C_DOUBLE, C_INT, C_LONGLONG,
};
use callc::Value;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

extern "C" fn add_i32(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

#[allow(clippy::too_many_arguments)]
extern "C" fn sum_mixed(
    a: i64,
    x: f64,
    b: i64,
    y: f64,
    c: i64,
    z: f64,
    d: i64,
    w: f64,
    e: i64,
    v: f64,
    f: i64,
    u: f64,
) -> f64 {
    (a + b + c + d + e + f) as f64 + x + y + z + w + v + u
}

fn define(table: &RoutineTable, name: &str, address: usize, params: &[u32], ret: u32) -> Value {
    let descriptor =
        unsafe { RoutineDescriptor::new(name, address, CallingConvention::Cdecl, params, ret) }
            .unwrap();
    Value::Int(table.define(descriptor) as i64)
}

fn mixed_args(n: usize) -> (Vec<TypeCode>, Vec<Value>) {
    (0..n)
        .map(|i| {
            if i % 2 == 0 {
                (TypeCode::LongLong, Value::Int(i as i64))
            } else {
                (TypeCode::Double, Value::float(i as f64 + 0.5))
            }
        })
        .unzip()
}

fn bench_marshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("marshal");
    let abi = AbiParams::host().unwrap_or(AbiParams::SYSV64);

    for size in [2, 8, 15].iter() {
        group.bench_with_input(BenchmarkId::new("mixed", size), size, |b, &size| {
            let (params, values) = mixed_args(size);
            b.iter(|| marshal_args("bench", black_box(&params), black_box(&values), abi))
        });
    }

    group.finish();
}

fn bench_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_native");
    let table = RoutineTable::new();
    let engine = CallEngine::new(&table);

    let add = define(&table, "add_i32", add_i32 as *const () as usize, &[C_INT, C_INT], C_INT);
    let add_args = Value::sequence(vec![Value::Int(20), Value::Int(22)]);
    group.bench_function("add_i32", |b| {
        b.iter(|| engine.call_native(true, black_box(&add), black_box(&add_args)))
    });

    let params = [C_LONGLONG, C_DOUBLE].repeat(6);
    let mixed = define(&table, "sum_mixed", sum_mixed as *const () as usize, &params, C_DOUBLE);
    let (_, values) = mixed_args(12);
    let mixed_list = Value::sequence(values);
    group.bench_function("sum_mixed_12", |b| {
        b.iter(|| engine.call_native(true, black_box(&mixed), black_box(&mixed_list)))
    });

    group.finish();
}

criterion_group!(benches, bench_marshal, bench_call);
criterion_main!(benches);
