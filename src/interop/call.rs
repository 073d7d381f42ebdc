//! Native routine invocation
//!
//! Picks the stub whose literal signature matches the marshaled layout and
//! performs the call. Return values come back raw; boxing happens later.

use super::abi::{AbiParams, CallingConvention};
use super::error::CallError;
use super::marshal::MarshalBuffer;
use super::stubs;
use super::types::{RawResult, ReturnClass};

#[cfg(all(target_arch = "x86_64", windows))]
use super::abi::Placement;

/// Maximum declared parameters per routine
pub const MAX_ARGS: usize = stubs::MAX_TABLE_ARITY;

/// Resolved call: address, convention and result register
#[derive(Debug, Clone, Copy)]
pub struct FunctionCall<'a> {
    name: &'a str,
    address: usize,
    convention: CallingConvention,
    ret: ReturnClass,
}

impl<'a> FunctionCall<'a> {
    /// Create function call descriptor
    #[inline]
    pub fn new(
        name: &'a str,
        address: usize,
        convention: CallingConvention,
        ret: ReturnClass,
    ) -> Self {
        Self {
            name,
            address,
            convention,
            ret,
        }
    }

    /// Call the routine with a marshaled buffer
    ///
    /// # Safety
    /// Caller must ensure:
    /// - `address` is the entry point of a routine with the C ABI
    /// - The buffer was marshaled against that routine's declared parameters
    /// - The calling convention matches the routine
    pub unsafe fn call(&self, buffer: &MarshalBuffer) -> Result<RawResult, CallError> {
        match AbiParams::host() {
            Some(host) if *buffer.abi() == host => self.call_impl(buffer),
            Some(_) => Err(CallError::ForeignAbi),
            None => Err(CallError::UnsupportedArchitecture),
        }
    }

    #[inline]
    pub fn convention(&self) -> CallingConvention {
        self.convention
    }

    #[inline]
    pub fn return_class(&self) -> ReturnClass {
        self.ret
    }

    fn too_many(&self, words: usize, max: usize) -> CallError {
        CallError::TooManyWords {
            name: self.name.to_string(),
            words,
            max,
        }
    }

    /// 32-bit x86: all arguments are stack words
    #[cfg(target_arch = "x86")]
    unsafe fn call_impl(&self, buffer: &MarshalBuffer) -> Result<RawResult, CallError> {
        use smallvec::SmallVec;

        let words: SmallVec<[u32; 16]> = buffer.stack().iter().map(|&w| w as u32).collect();
        let stdcall = self.convention().effective() == CallingConvention::Stdcall;

        let result = match (stdcall, self.ret) {
            (false, ReturnClass::Word) => {
                stubs::cdecl_word(self.address, &words).map(|w| RawResult::Word(u64::from(w)))
            }
            (false, ReturnClass::Wide) => {
                stubs::cdecl_wide(self.address, &words).map(RawResult::Word)
            }
            (false, ReturnClass::Float) => {
                stubs::cdecl_float(self.address, &words).map(RawResult::Float)
            }
            (false, ReturnClass::Double) => {
                stubs::cdecl_double(self.address, &words).map(RawResult::Double)
            }
            (true, ReturnClass::Word) => {
                stubs::stdcall_word(self.address, &words).map(|w| RawResult::Word(u64::from(w)))
            }
            (true, ReturnClass::Wide) => {
                stubs::stdcall_wide(self.address, &words).map(RawResult::Word)
            }
            (true, ReturnClass::Float) => {
                stubs::stdcall_float(self.address, &words).map(RawResult::Float)
            }
            (true, ReturnClass::Double) => {
                stubs::stdcall_double(self.address, &words).map(RawResult::Double)
            }
        };
        result.ok_or_else(|| self.too_many(words.len(), stubs::MAX_TABLE_ARITY))
    }

    /// System V x86-64 and AArch64
    #[cfg(any(all(target_arch = "x86_64", not(windows)), target_arch = "aarch64"))]
    unsafe fn call_impl(&self, buffer: &MarshalBuffer) -> Result<RawResult, CallError> {
        let mut regs: stubs::IntRegs = [0; stubs::INT_REGS];
        regs.copy_from_slice(buffer.int_regs());
        let floats = float_registers::<{ stubs::FLOAT_REGS }>(buffer);
        let stack = buffer.stack();

        let result = match self.ret {
            ReturnClass::Word | ReturnClass::Wide => {
                stubs::call_word(self.address, &regs, stack, &floats).map(RawResult::Word)
            }
            ReturnClass::Float => {
                stubs::call_float(self.address, &regs, stack, &floats).map(RawResult::Float)
            }
            ReturnClass::Double => {
                stubs::call_double(self.address, &regs, stack, &floats).map(RawResult::Double)
            }
        };
        result.ok_or_else(|| self.too_many(stack.len(), stubs::MAX_TABLE_ARITY))
    }

    /// Windows x64: positions 0-3 in registers, the rest on the stack
    #[cfg(all(target_arch = "x86_64", windows))]
    unsafe fn call_impl(&self, buffer: &MarshalBuffer) -> Result<RawResult, CallError> {
        let mut regs: stubs::IntRegs = [0; stubs::INT_REGS];
        regs.copy_from_slice(buffer.int_regs());
        let floats = float_registers::<{ stubs::FLOAT_REGS }>(buffer);

        let mask = buffer.placements().iter().fold(0u8, |mask, p| match p {
            Placement::FloatRegister(i) => mask | (1 << i),
            _ => mask,
        });

        let words = buffer.stack();
        if words.len() > stubs::STACK_WORDS {
            return Err(self.too_many(words.len(), stubs::STACK_WORDS));
        }
        let mut stack: stubs::StackWords = [0; stubs::STACK_WORDS];
        stack[..words.len()].copy_from_slice(words);

        let result = match self.ret {
            ReturnClass::Word | ReturnClass::Wide => {
                stubs::call_word(self.address, &regs, &floats, mask, &stack).map(RawResult::Word)
            }
            ReturnClass::Float => {
                stubs::call_float(self.address, &regs, &floats, mask, &stack).map(RawResult::Float)
            }
            ReturnClass::Double => stubs::call_double(self.address, &regs, &floats, mask, &stack)
                .map(RawResult::Double),
        };
        result.ok_or_else(|| self.too_many(words.len(), stubs::STACK_WORDS))
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
    unsafe fn call_impl(&self, _buffer: &MarshalBuffer) -> Result<RawResult, CallError> {
        Err(CallError::UnsupportedArchitecture)
    }
}

/// Floating register slots as doubles; a float keeps its bits in the low half
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
#[inline]
fn float_registers<const N: usize>(buffer: &MarshalBuffer) -> [f64; N] {
    let mut floats = [0.0; N];
    for (slot, &bits) in floats.iter_mut().zip(buffer.float_regs()) {
        *slot = f64::from_bits(bits);
    }
    floats
}
