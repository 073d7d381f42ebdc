//! Type codes for native routine signatures
//!
//! Codes keep their historical numeric values so descriptors built by an
//! existing binder can be read unchanged: the high byte is the kind, the low
//! byte the width in bytes.

use core::ffi::c_long;

pub const C_CHAR: u32 = 0x0100_0001;
pub const C_UCHAR: u32 = 0x0200_0001;
pub const C_SHORT: u32 = 0x0100_0002;
pub const C_USHORT: u32 = 0x0200_0002;
pub const C_INT: u32 = 0x0100_0004;
pub const C_UINT: u32 = 0x0200_0004;
pub const C_LONG: u32 = 0x0100_0008;
pub const C_ULONG: u32 = 0x0200_0008;
pub const C_POINTER: u32 = 0x0300_0001;
pub const C_LONGLONG: u32 = 0x0300_0002;
pub const C_FLOAT: u32 = 0x0300_0004;
pub const C_DOUBLE: u32 = 0x0300_0008;
pub const E_INTEGER: u32 = 0x0600_0004;
pub const E_ATOM: u32 = 0x0700_0004;
pub const E_SEQUENCE: u32 = 0x0800_0004;
pub const E_OBJECT: u32 = 0x0900_0004;

/// Parameter or return type of a native routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeCode {
    Char = C_CHAR,
    UChar = C_UCHAR,
    Short = C_SHORT,
    UShort = C_USHORT,
    Int = C_INT,
    UInt = C_UINT,
    Long = C_LONG,
    ULong = C_ULONG,
    Pointer = C_POINTER,
    LongLong = C_LONGLONG,
    Float = C_FLOAT,
    Double = C_DOUBLE,
    /// Pass-through: inline integer or atom representation
    EInteger = E_INTEGER,
    /// Pass-through: any atom
    EAtom = E_ATOM,
    /// Pass-through: sequence only
    ESequence = E_SEQUENCE,
    /// Pass-through: anything
    EObject = E_OBJECT,
}

/// How an argument of a given type travels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Integer register / stack word
    Integer,
    /// Floating register (or raw bits on the stack)
    Floating,
    /// Representation pointer after a shape check
    PassThrough,
}

impl TypeCode {
    pub const ALL: [TypeCode; 16] = [
        Self::Char,
        Self::UChar,
        Self::Short,
        Self::UShort,
        Self::Int,
        Self::UInt,
        Self::Long,
        Self::ULong,
        Self::Pointer,
        Self::LongLong,
        Self::Float,
        Self::Double,
        Self::EInteger,
        Self::EAtom,
        Self::ESequence,
        Self::EObject,
    ];

    /// Decode a raw code
    pub fn from_raw(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| ty.raw() == code)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Width in bytes of the native value
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::Char | Self::UChar => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong => core::mem::size_of::<c_long>(),
            Self::LongLong | Self::Double => 8,
            Self::Pointer
            | Self::EInteger
            | Self::EAtom
            | Self::ESequence
            | Self::EObject => core::mem::size_of::<usize>(),
        }
    }

    #[inline]
    pub const fn category(self) -> Category {
        match self {
            Self::Float | Self::Double => Category::Floating,
            Self::EInteger | Self::EAtom | Self::ESequence | Self::EObject => {
                Category::PassThrough
            }
            _ => Category::Integer,
        }
    }

    /// Check if type is floating point
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self.category(), Category::Floating)
    }

    /// Unsigned kinds zero-extend on return
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            Self::UChar | Self::UShort | Self::UInt | Self::ULong | Self::Pointer
        )
    }

    /// Name used by the binder, for diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Char => "C_CHAR",
            Self::UChar => "C_UCHAR",
            Self::Short => "C_SHORT",
            Self::UShort => "C_USHORT",
            Self::Int => "C_INT",
            Self::UInt => "C_UINT",
            Self::Long => "C_LONG",
            Self::ULong => "C_ULONG",
            Self::Pointer => "C_POINTER",
            Self::LongLong => "C_LONGLONG",
            Self::Float => "C_FLOAT",
            Self::Double => "C_DOUBLE",
            Self::EInteger => "E_INTEGER",
            Self::EAtom => "E_ATOM",
            Self::ESequence => "E_SEQUENCE",
            Self::EObject => "E_OBJECT",
        }
    }
}

impl core::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which result register the dispatcher reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnClass {
    /// Integer register (also used for procedures and unknown codes)
    Word,
    /// 8-byte integer; differs from `Word` only on 32-bit targets
    Wide,
    Float,
    Double,
}

impl ReturnClass {
    /// Classify a raw return code
    pub fn of(code: u32) -> Self {
        match TypeCode::from_raw(code) {
            Some(TypeCode::Float) => Self::Float,
            Some(TypeCode::Double) => Self::Double,
            Some(ty) if ty.size() == 8 => Self::Wide,
            _ => Self::Word,
        }
    }
}

/// Raw native result, read from the register class the return code names
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawResult {
    Word(u64),
    Float(f32),
    Double(f64),
}
