//! Typed call stubs
//!
//! Each arm casts the routine address to a function pointer with a literal
//! parameter list and performs exactly one call. Tables are generated per
//! target from `arity_table!`; nothing here is generic over arity.

#![allow(clippy::too_many_arguments)]

use core::mem;

/// Expands a stub macro with the arity rows 0..=15
macro_rules! arity_table {
    ($stub:ident!($($head:tt)*)) => {
        $stub!($($head)*;
            0 => [],
            1 => [0],
            2 => [0, 1],
            3 => [0, 1, 2],
            4 => [0, 1, 2, 3],
            5 => [0, 1, 2, 3, 4],
            6 => [0, 1, 2, 3, 4, 5],
            7 => [0, 1, 2, 3, 4, 5, 6],
            8 => [0, 1, 2, 3, 4, 5, 6, 7],
            9 => [0, 1, 2, 3, 4, 5, 6, 7, 8],
            10 => [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            11 => [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
            12 => [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            13 => [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
            14 => [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
            15 => [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14],
        );
    };
}

/// Highest row in `arity_table!`
pub const MAX_TABLE_ARITY: usize = 15;

// ============================================================================
// 32-bit x86: every argument is a stack word
// ============================================================================

#[cfg(target_arch = "x86")]
mod packed {
    use super::mem;

    macro_rules! word32 {
        ($i:literal) => {
            u32
        };
    }

    macro_rules! word_stub {
        ($name:ident, $abi:tt, $ret:ty; $($n:literal => [$($i:literal),*]),* $(,)?) => {
            pub(crate) unsafe fn $name(address: usize, words: &[u32]) -> Option<$ret> {
                Some(match words.len() {
                    $($n => {
                        let routine: unsafe extern $abi fn($(word32!($i)),*) -> $ret =
                            mem::transmute(address);
                        routine($(words[$i]),*)
                    })*
                    _ => return None,
                })
            }
        };
    }

    arity_table!(word_stub!(cdecl_word, "C", u32));
    arity_table!(word_stub!(cdecl_wide, "C", u64));
    arity_table!(word_stub!(cdecl_float, "C", f32));
    arity_table!(word_stub!(cdecl_double, "C", f64));
    arity_table!(word_stub!(stdcall_word, "stdcall", u32));
    arity_table!(word_stub!(stdcall_wide, "stdcall", u64));
    arity_table!(word_stub!(stdcall_float, "stdcall", f32));
    arity_table!(word_stub!(stdcall_double, "stdcall", f64));
}

#[cfg(target_arch = "x86")]
pub(crate) use packed::*;

// ============================================================================
// SysV x86-64 and AArch64: independent register files, shared overflow area
// ============================================================================

#[cfg(any(all(target_arch = "x86_64", not(windows)), target_arch = "aarch64"))]
mod classified {
    use super::mem;

    #[cfg(target_arch = "x86_64")]
    pub(crate) const INT_REGS: usize = 6;
    #[cfg(target_arch = "aarch64")]
    pub(crate) const INT_REGS: usize = 8;
    pub(crate) const FLOAT_REGS: usize = 8;

    pub(crate) type IntRegs = [u64; INT_REGS];
    pub(crate) type FloatRegs = [f64; FLOAT_REGS];

    macro_rules! word {
        ($i:literal) => {
            u64
        };
    }

    // Integer registers, then the overflow words, then the floating
    // registers. Floating parameters never compete with integer ones for
    // registers, so placing them last leaves the stack words in order.
    #[cfg(target_arch = "x86_64")]
    macro_rules! classified_fn {
        ($ret:ty; $($stack:ty,)*) => {
            unsafe extern "C" fn(
                u64, u64, u64, u64, u64, u64,
                $($stack,)*
                f64, f64, f64, f64, f64, f64, f64, f64,
            ) -> $ret
        };
    }

    #[cfg(target_arch = "x86_64")]
    macro_rules! classified_call {
        ($f:ident, $r:ident, $x:ident; $($stack:expr,)*) => {
            $f(
                $r[0], $r[1], $r[2], $r[3], $r[4], $r[5],
                $($stack,)*
                $x[0], $x[1], $x[2], $x[3], $x[4], $x[5], $x[6], $x[7],
            )
        };
    }

    #[cfg(target_arch = "aarch64")]
    macro_rules! classified_fn {
        ($ret:ty; $($stack:ty,)*) => {
            unsafe extern "C" fn(
                u64, u64, u64, u64, u64, u64, u64, u64,
                $($stack,)*
                f64, f64, f64, f64, f64, f64, f64, f64,
            ) -> $ret
        };
    }

    #[cfg(target_arch = "aarch64")]
    macro_rules! classified_call {
        ($f:ident, $r:ident, $x:ident; $($stack:expr,)*) => {
            $f(
                $r[0], $r[1], $r[2], $r[3], $r[4], $r[5], $r[6], $r[7],
                $($stack,)*
                $x[0], $x[1], $x[2], $x[3], $x[4], $x[5], $x[6], $x[7],
            )
        };
    }

    macro_rules! classified_stub {
        ($name:ident, $ret:ty; $($n:literal => [$($i:literal),*]),* $(,)?) => {
            pub(crate) unsafe fn $name(
                address: usize,
                regs: &IntRegs,
                stack: &[u64],
                floats: &FloatRegs,
            ) -> Option<$ret> {
                Some(match stack.len() {
                    $($n => {
                        let routine: classified_fn!($ret; $(word!($i),)*) =
                            mem::transmute(address);
                        classified_call!(routine, regs, floats; $(stack[$i],)*)
                    })*
                    _ => return None,
                })
            }
        };
    }

    arity_table!(classified_stub!(call_word, u64));
    arity_table!(classified_stub!(call_float, f32));
    arity_table!(classified_stub!(call_double, f64));
}

#[cfg(any(all(target_arch = "x86_64", not(windows)), target_arch = "aarch64"))]
pub(crate) use classified::*;

// ============================================================================
// Windows x64: four positional registers, each integer or floating
// ============================================================================

#[cfg(all(target_arch = "x86_64", windows))]
mod positional {
    use super::mem;

    pub(crate) const INT_REGS: usize = 4;
    pub(crate) const FLOAT_REGS: usize = 4;
    /// Overflow words always passed; the caller cleans the stack
    pub(crate) const STACK_WORDS: usize = super::MAX_TABLE_ARITY - INT_REGS;

    pub(crate) type IntRegs = [u64; INT_REGS];
    pub(crate) type FloatRegs = [f64; FLOAT_REGS];
    pub(crate) type StackWords = [u64; STACK_WORDS];

    macro_rules! slot_ty {
        (i) => {
            u64
        };
        (f) => {
            f64
        };
    }

    macro_rules! slot {
        (i, $r:ident, $x:ident, $k:tt) => {
            $r[$k]
        };
        (f, $r:ident, $x:ident, $k:tt) => {
            $x[$k]
        };
    }

    /// Bit N of the mask set: register position N holds a floating value
    macro_rules! mask_table {
        ($stub:ident!($($head:tt)*)) => {
            $stub!($($head)*;
                0 => (i, i, i, i),
                1 => (f, i, i, i),
                2 => (i, f, i, i),
                3 => (f, f, i, i),
                4 => (i, i, f, i),
                5 => (f, i, f, i),
                6 => (i, f, f, i),
                7 => (f, f, f, i),
                8 => (i, i, i, f),
                9 => (f, i, i, f),
                10 => (i, f, i, f),
                11 => (f, f, i, f),
                12 => (i, i, f, f),
                13 => (f, i, f, f),
                14 => (i, f, f, f),
                15 => (f, f, f, f),
            );
        };
    }

    macro_rules! positional_stub {
        ($name:ident, $ret:ty; $($mask:literal => ($a:ident, $b:ident, $c:ident, $d:ident)),* $(,)?) => {
            pub(crate) unsafe fn $name(
                address: usize,
                regs: &IntRegs,
                floats: &FloatRegs,
                mask: u8,
                stack: &StackWords,
            ) -> Option<$ret> {
                Some(match mask {
                    $($mask => {
                        let routine: unsafe extern "C" fn(
                            slot_ty!($a), slot_ty!($b), slot_ty!($c), slot_ty!($d),
                            u64, u64, u64, u64, u64, u64, u64, u64, u64, u64, u64,
                        ) -> $ret = mem::transmute(address);
                        routine(
                            slot!($a, regs, floats, 0),
                            slot!($b, regs, floats, 1),
                            slot!($c, regs, floats, 2),
                            slot!($d, regs, floats, 3),
                            stack[0], stack[1], stack[2], stack[3], stack[4], stack[5],
                            stack[6], stack[7], stack[8], stack[9], stack[10],
                        )
                    })*
                    _ => return None,
                })
            }
        };
    }

    mask_table!(positional_stub!(call_word, u64));
    mask_table!(positional_stub!(call_float, f32));
    mask_table!(positional_stub!(call_double, f64));
}

#[cfg(all(target_arch = "x86_64", windows))]
pub(crate) use positional::*;
