use std::fmt;

use crate::runtime::gc::GcHandle;

/// Tagged runtime value.
///
/// ## Memory Model
///
/// `Nil` and `Integer` are immediates: they live entirely inside the tagged
/// reference and own no heap storage. Every other kind of object lives on the
/// [`GcHeap`](crate::runtime::gc::GcHeap) and is referred to through a
/// [`GcHandle`]. Copying a `Value` never copies the object it points at.
///
/// Equality on `Value` is `eq` equality: immediates compare by value, heap
/// objects compare by identity (handle), never structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// The empty list / false.
    Nil,
    /// Fixnum stored directly in the tagged reference.
    Integer(i64),
    /// Reference to a heap-allocated object.
    Gc(GcHandle),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Gc(handle) => write!(f, "#<object {}>", handle.index()),
        }
    }
}

impl Value {
    /// Returns `true` for values that own no heap storage.
    pub fn is_immediate(&self) -> bool {
        !matches!(self, Value::Gc(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the heap handle for heap-backed values.
    pub fn as_handle(&self) -> Option<GcHandle> {
        match self {
            Value::Gc(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<GcHandle> for Value {
    fn from(handle: GcHandle) -> Self {
        Value::Gc(handle)
    }
}
