//! Argument marshaling - tagged values to native slots
//!
//! Design: one left-to-right pass over (value, type code) pairs. Each value is
//! reduced to a native word or floating bit pattern and classified into the
//! integer registers, floating registers or overflow stack of the target ABI.
//! The buffer records layout in memory order, so the first declared argument
//! lands in the first register or the lowest stack word, which is exactly
//! what a right-to-left push produces for both cdecl and stdcall.

use super::abi::{AbiModel, AbiParams, ClassifierState, Placement};
use super::error::{expected_shape, CallError, ShapeError};
use super::types::{Category, TypeCode};
use crate::logging::trace;
use crate::objects::Value;
use smallvec::SmallVec;

/// Call-scoped argument storage
///
/// Holds the co-ownership claims on pass-through arguments; dropping the
/// buffer after the native call returns releases them.
#[derive(Debug)]
pub struct MarshalBuffer {
    abi: AbiParams,
    int_regs: SmallVec<[u64; 8]>,
    /// Bit patterns; a float occupies the low 32 bits
    float_regs: SmallVec<[u64; 8]>,
    stack: SmallVec<[u64; 16]>,
    state: ClassifierState,
    placements: SmallVec<[Placement; 16]>,
    claims: SmallVec<[Value; 4]>,
}

impl MarshalBuffer {
    /// Empty buffer for an ABI
    pub fn new(abi: AbiParams) -> Self {
        Self {
            abi,
            int_regs: SmallVec::from_elem(0, abi.int_regs),
            float_regs: SmallVec::from_elem(0, abi.float_regs),
            stack: SmallVec::new(),
            state: ClassifierState::new(),
            placements: SmallVec::new(),
            claims: SmallVec::new(),
        }
    }

    #[inline]
    pub fn abi(&self) -> &AbiParams {
        &self.abi
    }

    /// Integer register slots (all of them, unused ones zero)
    #[inline]
    pub fn int_regs(&self) -> &[u64] {
        &self.int_regs
    }

    /// Floating register slots as bit patterns
    #[inline]
    pub fn float_regs(&self) -> &[u64] {
        &self.float_regs
    }

    /// Overflow area in call order; every argument in the packed model
    #[inline]
    pub fn stack(&self) -> &[u64] {
        &self.stack
    }

    #[inline]
    pub fn state(&self) -> &ClassifierState {
        &self.state
    }

    /// First slot of each argument, in declared order
    #[inline]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Heap arguments kept alive for the duration of the call
    #[inline]
    pub fn claims(&self) -> &[Value] {
        &self.claims
    }

    /// Integer-class word
    pub fn push_word(&mut self, word: u64) -> Placement {
        match self.abi.model {
            AbiModel::Packed32 => self.push_stack(&[word & 0xFFFF_FFFF]),
            AbiModel::Registers => match self.state.next_int(&self.abi) {
                Placement::IntRegister(i) => {
                    self.int_regs[i] = word;
                    Placement::IntRegister(i)
                }
                Placement::Stack(at) => self.store_stack(at, word),
                Placement::FloatRegister(_) => unreachable!("integer classified as float"),
            },
        }
    }

    /// 8-byte integer; two words in the packed model
    pub fn push_wide(&mut self, word: u64) -> Placement {
        match self.abi.model {
            AbiModel::Packed32 => self.push_stack(&split_words(word)),
            AbiModel::Registers => self.push_word(word),
        }
    }

    /// 8-byte double
    pub fn push_double(&mut self, val: f64) -> Placement {
        let bits = val.to_bits();
        match self.abi.model {
            // Low word at the lower address: the high word is pushed first
            AbiModel::Packed32 => self.push_stack(&split_words(bits)),
            AbiModel::Registers => self.push_float_bits(bits),
        }
    }

    /// 4-byte float
    pub fn push_float(&mut self, val: f32) -> Placement {
        let bits = u64::from(val.to_bits());
        match self.abi.model {
            AbiModel::Packed32 => self.push_stack(&[bits]),
            AbiModel::Registers => self.push_float_bits(bits),
        }
    }

    /// Keep a heap argument alive until the buffer is dropped
    #[inline]
    pub fn claim(&mut self, value: &Value) {
        if !value.is_int() {
            self.claims.push(value.clone());
        }
    }

    fn push_float_bits(&mut self, bits: u64) -> Placement {
        match self.state.next_float(&self.abi) {
            Placement::FloatRegister(i) => {
                self.float_regs[i] = bits;
                Placement::FloatRegister(i)
            }
            Placement::Stack(at) => self.store_stack(at, bits),
            Placement::IntRegister(_) => unreachable!("float classified as integer"),
        }
    }

    fn push_stack(&mut self, words: &[u64]) -> Placement {
        let placement = self.state.push_stack(words.len());
        self.stack.extend_from_slice(words);
        placement
    }

    fn store_stack(&mut self, at: usize, word: u64) -> Placement {
        debug_assert_eq!(at, self.stack.len());
        self.stack.push(word);
        Placement::Stack(at)
    }
}

/// Low word first
#[inline]
fn split_words(bits: u64) -> [u64; 2] {
    [bits & 0xFFFF_FFFF, bits >> 32]
}

/// Convert a double to an integer word.
///
/// Non-negative values truncate to `u64`. Negative values truncate toward
/// zero as a signed integer and are reinterpreted as unsigned, so -1.5
/// becomes `u64::MAX`. Out-of-range values saturate; NaN becomes zero.
#[inline]
pub fn float_to_word(val: f64) -> u64 {
    if val < 0.0 {
        val as i64 as u64
    } else {
        val as u64
    }
}

/// Numeric word of an atom
#[inline]
fn integer_word(value: &Value) -> Result<u64, ShapeError> {
    match value {
        Value::Int(i) => Ok(*i as u64),
        Value::Float(d) => Ok(float_to_word(**d)),
        Value::Seq(_) => Err(ShapeError::NotAnAtom),
    }
}

/// Numeric value of an atom as a double
#[inline]
fn floating_value(value: &Value) -> Result<f64, ShapeError> {
    value.as_f64().ok_or(ShapeError::NotAnAtom)
}

/// Check a value against a pass-through marker
pub(crate) fn check_shape(ty: TypeCode, value: &Value) -> Result<(), ShapeError> {
    match value {
        Value::Int(_) if ty == TypeCode::ESequence => Err(ShapeError::IntegerForSequence),
        Value::Int(_) => Ok(()),
        Value::Seq(_) if !matches!(ty, TypeCode::ESequence | TypeCode::EObject) => {
            Err(ShapeError::SequenceForAtom)
        }
        Value::Seq(_) => Ok(()),
        Value::Float(_) if ty == TypeCode::ESequence => Err(ShapeError::AtomForSequence),
        Value::Float(_) => Ok(()),
    }
}

/// Marshal one argument into the buffer
pub(crate) fn marshal_arg(
    buffer: &mut MarshalBuffer,
    ty: TypeCode,
    value: &Value,
) -> Result<Placement, ShapeError> {
    let placement = match ty.category() {
        Category::Floating => {
            let val = floating_value(value)?;
            if ty == TypeCode::Double {
                buffer.push_double(val)
            } else {
                buffer.push_float(val as f32)
            }
        }
        Category::Integer => {
            let word = integer_word(value)?;
            if ty.size() == 8 {
                buffer.push_wide(word)
            } else {
                buffer.push_word(word)
            }
        }
        Category::PassThrough => {
            check_shape(ty, value)?;
            buffer.claim(value);
            buffer.push_word(value.repr_word())
        }
    };
    buffer.placements.push(placement);
    Ok(placement)
}

/// Marshal a full argument list against its declared parameter types.
///
/// On a shape error the partially filled buffer is dropped, releasing any
/// claims already taken; nothing reaches native code.
pub fn marshal_args(
    name: &str,
    params: &[TypeCode],
    args: &[Value],
    abi: AbiParams,
) -> Result<MarshalBuffer, CallError> {
    debug_assert_eq!(params.len(), args.len());

    let mut buffer = MarshalBuffer::new(abi);
    for (position, (&ty, value)) in params.iter().zip(args).enumerate() {
        let placement = marshal_arg(&mut buffer, ty, value).map_err(|err| {
            trace!(
                function = name,
                position = position + 1,
                ty = ty.name(),
                expected = expected_shape(ty),
                found = ?value.object_type(),
                "argument rejected"
            );
            err.for_routine(name, position + 1)
        })?;
        trace!(
            function = name,
            position = position + 1,
            ty = ty.name(),
            placement = ?placement,
            "argument marshaled"
        );
    }
    Ok(buffer)
}
