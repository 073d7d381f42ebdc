//! Result boxing - raw native results to tagged values

use super::error::CallError;
use super::types::{RawResult, TypeCode};
use crate::config::UnknownReturn;
use crate::logging::{log_promotion, warn};
use crate::objects::{Value, MAX_INLINE, MIN_INLINE};

/// Box a raw native result according to the declared return code.
///
/// Floating results are always boxed. Integer results are sign- or
/// zero-extended from their declared width and stay inline when they fit
/// the inline range; otherwise they are promoted to a boxed double, which
/// loses low-order bits past 2^53.
pub fn box_result(
    raw: RawResult,
    code: u32,
    name: &str,
    unknown: UnknownReturn,
) -> Result<Value, CallError> {
    if code == 0 {
        return Ok(Value::NEUTRAL);
    }

    let Some(ty) = TypeCode::from_raw(code) else {
        return match unknown {
            UnknownReturn::Void => {
                warn!(function = name, code, "unknown return type, result discarded");
                Ok(Value::NEUTRAL)
            }
            UnknownReturn::Fatal => Err(CallError::UnknownReturnType {
                name: name.to_string(),
                code,
            }),
        };
    };

    let word = match raw {
        RawResult::Double(d) => return Ok(Value::float(d)),
        RawResult::Float(f) => return Ok(Value::float(f64::from(f))),
        RawResult::Word(word) => word,
    };

    let bits = ty.size() * 8;
    Ok(if ty.is_unsigned() {
        box_unsigned(zero_extend(word, bits), name)
    } else {
        box_signed(sign_extend(word, bits), name)
    })
}

/// Inline if in range, else a boxed double
pub fn box_signed(val: i64, name: &str) -> Value {
    if (MIN_INLINE..=MAX_INLINE).contains(&val) {
        Value::Int(val)
    } else {
        log_promotion(name, "signed");
        super::record_promotion();
        Value::float(val as f64)
    }
}

/// Inline if in range, else a boxed double
pub fn box_unsigned(val: u64, name: &str) -> Value {
    if val <= MAX_INLINE as u64 {
        Value::Int(val as i64)
    } else {
        log_promotion(name, "unsigned");
        super::record_promotion();
        Value::float(val as f64)
    }
}

#[inline]
fn sign_extend(word: u64, bits: usize) -> i64 {
    let shift = 64 - bits as u32;
    ((word << shift) as i64) >> shift
}

#[inline]
fn zero_extend(word: u64, bits: usize) -> u64 {
    if bits >= 64 {
        word
    } else {
        word & ((1u64 << bits) - 1)
    }
}
