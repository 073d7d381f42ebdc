//! Object system - the tagged values the call engine reads
//!
//! Design: a closed variant instead of scattered shape checks:
//! - Small ints inline (61-bit signed, same range on every host)
//! - Boxed doubles for fractional values and ints outside the inline range
//! - Sequences for argument lists and buffer/string arguments
//! - Reference counting for deterministic cleanup

use crate::gc::{RefCount, KIND_FLOAT, KIND_SEQUENCE};
use std::fmt;

/// Largest integer stored inline
pub const MAX_INLINE: i64 = (1i64 << 60) - 1;
/// Smallest integer stored inline
pub const MIN_INLINE: i64 = -(1i64 << 60);

/// Interpreter value
#[derive(Clone)]
pub enum Value {
    /// Inline integer; keep within `MIN_INLINE..=MAX_INLINE`
    Int(i64),
    /// Heap-held double
    Float(RefCount<f64>),
    /// Ordered sequence of values
    Seq(RefCount<Vec<Value>>),
}

/// Coarse value kind, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Integer,
    Atom,
    Sequence,
}

impl Value {
    /// Value returned by procedures; never inspected by the caller
    pub const NEUTRAL: Value = Value::Int(0);

    /// Create integer, boxing it when outside the inline range
    #[inline]
    pub fn int(val: i64) -> Self {
        if (MIN_INLINE..=MAX_INLINE).contains(&val) {
            Value::Int(val)
        } else {
            Value::float(val as f64)
        }
    }

    /// Box a double
    #[inline]
    pub fn float(val: f64) -> Self {
        Value::Float(RefCount::new(val, KIND_FLOAT))
    }

    /// Create sequence
    pub fn sequence(items: Vec<Value>) -> Self {
        Value::Seq(RefCount::new(items, KIND_SEQUENCE))
    }

    /// Sequence of character codes
    pub fn string(text: &str) -> Self {
        Value::sequence(text.chars().map(|c| Value::Int(c as i64)).collect())
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Integer or boxed double
    #[inline]
    pub fn is_atom(&self) -> bool {
        !self.is_sequence()
    }

    #[inline]
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Seq(_))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Value::Int(_) => ObjectType::Integer,
            Value::Float(_) => ObjectType::Atom,
            Value::Seq(_) => ObjectType::Sequence,
        }
    }

    /// Numeric value of an atom
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(d) => Some(**d),
            Value::Seq(_) => None,
        }
    }

    /// Elements of a sequence
    #[inline]
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Length of a sequence
    pub fn len(&self) -> Option<usize> {
        self.as_slice().map(<[Value]>::len)
    }

    /// Native representation: the integer itself, or the heap cell address
    #[inline]
    pub fn repr_word(&self) -> u64 {
        match self {
            Value::Int(i) => *i as u64,
            Value::Float(cell) => cell.as_repr() as u64,
            Value::Seq(cell) => cell.as_repr() as u64,
        }
    }

    /// Reference count of a heap value
    pub fn refcount(&self) -> Option<u32> {
        match self {
            Value::Int(_) => None,
            Value::Float(cell) => Some(cell.count()),
            Value::Seq(cell) => Some(cell.count()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Seq(a), Value::Seq(b)) => a.as_slice() == b.as_slice(),
            (Value::Seq(_), _) | (_, Value::Seq(_)) => false,
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(d) => write!(f, "Float({:?})", **d),
            Value::Seq(items) => f.debug_list().entries(items.iter()).finish(),
        }
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::int(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::float(val)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::sequence(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_inline_range() {
        assert!(Value::int(MAX_INLINE).is_int());
        assert!(Value::int(MIN_INLINE).is_int());
        assert!(!Value::int(MAX_INLINE + 1).is_int());
        assert_eq!(Value::int(MAX_INLINE + 1).as_f64(), Some(1152921504606846976.0));
        assert!(!Value::int(MIN_INLINE - 1).is_int());
    }

    #[test]
    fn test_classification() {
        let seq = Value::sequence(vec![Value::Int(1), Value::float(2.5)]);
        assert!(seq.is_sequence());
        assert!(!seq.is_atom());
        assert_eq!(seq.len(), Some(2));
        assert_eq!(seq.object_type(), ObjectType::Sequence);

        let d = Value::float(2.5);
        assert!(d.is_atom());
        assert!(!d.is_int());
        assert_eq!(d.object_type(), ObjectType::Atom);
        assert_eq!(d.len(), None);
    }

    #[test]
    fn test_equality_mixes_int_and_float() {
        assert_eq!(Value::Int(3), Value::float(3.0));
        assert_ne!(Value::Int(3), Value::string("\u{3}"));
        assert_eq!(Value::string("ab"), Value::sequence(vec![Value::Int(97), Value::Int(98)]));
    }

    #[test]
    fn test_repr_word() {
        assert_eq!(Value::Int(-1).repr_word(), u64::MAX);

        let seq = Value::string("x");
        let repr = seq.repr_word();
        assert_ne!(repr, 0);
        let clone = seq.clone();
        assert_eq!(clone.repr_word(), repr);
        assert_eq!(seq.refcount(), Some(2));
    }
}
