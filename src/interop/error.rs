//! Call errors
//!
//! Every `CallError` is fatal for the interpreted program: the embedder
//! reports it and unwinds. None of them is raised after the native routine
//! has been entered.

use super::types::TypeCode;
use core::fmt;

/// Fatal native call errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Routine reference is not a non-negative integer
    BadRoutineRef,
    /// Index past the end of the routine table
    BadRoutineNumber(usize),
    /// Function call site, procedure descriptor
    NoReturnValue { name: String },
    /// Procedure call site, function descriptor
    ReturnsValue { name: String },
    ArgListNotSequence { name: String },
    ArgCount { name: String, expected: usize, got: usize },
    /// Sequence given for a numeric parameter
    NotAnAtom { name: String, position: usize },
    IntegerForSequence { name: String, position: usize },
    SequenceForAtom { name: String, position: usize },
    AtomForSequence { name: String, position: usize },
    /// Marshaled arguments exceed the stub table
    TooManyWords { name: String, words: usize, max: usize },
    /// Buffer classified for another target's ABI
    ForeignAbi,
    UnsupportedArchitecture,
    /// Return code outside the known set, when configured as fatal
    UnknownReturnType { name: String, code: u32 },
}

impl CallError {
    /// Routine display name, when the error concerns a resolved routine
    pub fn routine(&self) -> Option<&str> {
        match self {
            Self::NoReturnValue { name }
            | Self::ReturnsValue { name }
            | Self::ArgListNotSequence { name }
            | Self::ArgCount { name, .. }
            | Self::NotAnAtom { name, .. }
            | Self::IntegerForSequence { name, .. }
            | Self::SequenceForAtom { name, .. }
            | Self::AtomForSequence { name, .. }
            | Self::TooManyWords { name, .. }
            | Self::UnknownReturnType { name, .. } => Some(name),
            Self::BadRoutineRef
            | Self::BadRoutineNumber(_)
            | Self::ForeignAbi
            | Self::UnsupportedArchitecture => None,
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRoutineRef => {
                write!(f, "c_proc/c_func: routine number must be a non-negative integer")
            }
            Self::BadRoutineNumber(index) => {
                write!(f, "c_proc/c_func: bad routine number ({})", index)
            }
            Self::NoReturnValue { name } => write!(f, "{} does not return a value", name),
            Self::ReturnsValue { name } => write!(f, "{} returns a value", name),
            Self::ArgListNotSequence { name } => {
                write!(f, "c_proc/c_func: argument list for {} must be a sequence", name)
            }
            Self::ArgCount { name, expected, got } => write!(
                f,
                "C routine {}() needs {} argument{}, not {}",
                name,
                expected,
                if *expected == 1 { "" } else { "s" },
                got
            ),
            Self::NotAnAtom { name, position } => write!(
                f,
                "{}: arguments to C routines must be atoms (argument {})",
                name, position
            ),
            Self::IntegerForSequence { name, position } => write!(
                f,
                "{}: passing an integer where a sequence is required (argument {})",
                name, position
            ),
            Self::SequenceForAtom { name, position } => write!(
                f,
                "{}: passing a sequence where an atom is required (argument {})",
                name, position
            ),
            Self::AtomForSequence { name, position } => write!(
                f,
                "{}: passing an atom where a sequence is required (argument {})",
                name, position
            ),
            Self::TooManyWords { name, words, max } => write!(
                f,
                "C routine {}() needs {} argument words, at most {} are supported",
                name, words, max
            ),
            Self::ForeignAbi => write!(f, "arguments were marshaled for another target's ABI"),
            Self::UnsupportedArchitecture => {
                write!(f, "native calls are not supported on this architecture")
            }
            Self::UnknownReturnType { name, code } => {
                write!(f, "{} was defined with an unknown return type ({:#010x})", name, code)
            }
        }
    }
}

impl std::error::Error for CallError {}

/// Descriptor creation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineError {
    NullAddress { name: String },
    InvalidArgType { name: String, position: usize, code: u32 },
    TooManyParams { name: String, count: usize, max: usize },
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullAddress { name } => write!(f, "{}: routine address is null", name),
            Self::InvalidArgType { name, position, code } => write!(
                f,
                "{}: argument {} was defined using an invalid argument type ({:#010x})",
                name, position, code
            ),
            Self::TooManyParams { name, count, max } => write!(
                f,
                "{}: {} parameters declared, at most {} are supported",
                name, count, max
            ),
        }
    }
}

impl std::error::Error for DefineError {}

/// Shape mismatch for a pass-through parameter, before the routine name is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShapeError {
    NotAnAtom,
    IntegerForSequence,
    SequenceForAtom,
    AtomForSequence,
}

impl ShapeError {
    pub(crate) fn for_routine(self, name: &str, position: usize) -> CallError {
        let name = name.to_string();
        match self {
            Self::NotAnAtom => CallError::NotAnAtom { name, position },
            Self::IntegerForSequence => CallError::IntegerForSequence { name, position },
            Self::SequenceForAtom => CallError::SequenceForAtom { name, position },
            Self::AtomForSequence => CallError::AtomForSequence { name, position },
        }
    }
}

/// Expected shape for a pass-through marker, for messages
pub(crate) fn expected_shape(ty: TypeCode) -> &'static str {
    match ty {
        TypeCode::ESequence => "sequence",
        TypeCode::EObject => "object",
        TypeCode::EInteger => "integer",
        _ => "atom",
    }
}
