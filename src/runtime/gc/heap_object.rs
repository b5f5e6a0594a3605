use std::fmt;

use serde::Serialize;

use crate::runtime::{
    bool_vector::BoolVector, buffer::Buffer, char_table::CharTable, gc::GcHandle,
    hash_table::HashTable, value::Value,
};

/// Objects that live on the GC-managed heap.
#[derive(Debug, Clone)]
pub enum HeapObject {
    /// Boxed double.
    Float(f64),
    /// UTF-8 character string.
    String(Box<str>),
    /// General vector.
    Vector(Vec<Value>),
    /// Cons cell.
    Cons { car: Value, cdr: Value },
    /// Symbol, interned or not.
    Symbol(Symbol),
    /// Byte-compiled function; its slots are laid out like a vector.
    CompiledFunction(Vec<Value>),
    Buffer(Buffer),
    HashTable(HashTable),
    CharTable(CharTable),
    BoolVector(BoolVector),
    /// Top-level UI container.
    Frame(Frame),
    /// Built-in primitive routine.
    Subr(Subr),
    /// Position inside a buffer.
    Marker(Marker),
    /// Buffer region with properties.
    Overlay(Overlay),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    /// Handle of the name string.
    pub name: GcHandle,
    pub value: Value,
    pub function: Value,
    pub plist: Value,
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy)]
pub struct Subr {
    pub name: &'static str,
    pub min_args: u16,
    /// `None` for `&rest` primitives.
    pub max_args: Option<u16>,
}

#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub buffer: Option<GcHandle>,
    pub charpos: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Overlay {
    pub buffer: Option<GcHandle>,
    pub start: usize,
    pub end: usize,
    pub plist: Value,
}

/// Classification of heap object variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Float = 0,
    String = 1,
    Vector = 2,
    Cons = 3,
    Symbol = 4,
    CompiledFunction = 5,
    Buffer = 6,
    HashTable = 7,
    CharTable = 8,
    BoolVector = 9,
    Frame = 10,
    Subr = 11,
    Marker = 12,
    Overlay = 13,
}

impl ObjectKind {
    pub fn from_object(obj: &HeapObject) -> Self {
        match obj {
            HeapObject::Float(_) => ObjectKind::Float,
            HeapObject::String(_) => ObjectKind::String,
            HeapObject::Vector(_) => ObjectKind::Vector,
            HeapObject::Cons { .. } => ObjectKind::Cons,
            HeapObject::Symbol(_) => ObjectKind::Symbol,
            HeapObject::CompiledFunction(_) => ObjectKind::CompiledFunction,
            HeapObject::Buffer(_) => ObjectKind::Buffer,
            HeapObject::HashTable(_) => ObjectKind::HashTable,
            HeapObject::CharTable(_) => ObjectKind::CharTable,
            HeapObject::BoolVector(_) => ObjectKind::BoolVector,
            HeapObject::Frame(_) => ObjectKind::Frame,
            HeapObject::Subr(_) => ObjectKind::Subr,
            HeapObject::Marker(_) => ObjectKind::Marker,
            HeapObject::Overlay(_) => ObjectKind::Overlay,
        }
    }

    /// User-visible type label; expected to remain stable.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Float => "float",
            ObjectKind::String => "string",
            ObjectKind::Vector => "vector",
            ObjectKind::Cons => "cons",
            ObjectKind::Symbol => "symbol",
            ObjectKind::CompiledFunction => "compiled-function",
            ObjectKind::Buffer => "buffer",
            ObjectKind::HashTable => "hash-table",
            ObjectKind::CharTable => "char-table",
            ObjectKind::BoolVector => "bool-vector",
            ObjectKind::Frame => "frame",
            ObjectKind::Subr => "subr",
            ObjectKind::Marker => "marker",
            ObjectKind::Overlay => "overlay",
        }
    }

    /// All variants for iteration.
    pub const ALL: [ObjectKind; 14] = [
        ObjectKind::Float,
        ObjectKind::String,
        ObjectKind::Vector,
        ObjectKind::Cons,
        ObjectKind::Symbol,
        ObjectKind::CompiledFunction,
        ObjectKind::Buffer,
        ObjectKind::HashTable,
        ObjectKind::CharTable,
        ObjectKind::BoolVector,
        ObjectKind::Frame,
        ObjectKind::Subr,
        ObjectKind::Marker,
        ObjectKind::Overlay,
    ];
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl HeapObject {
    pub fn kind(&self) -> ObjectKind {
        ObjectKind::from_object(self)
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().label()
    }

    /// Calls `f` on every value this object references directly.
    ///
    /// Used by the collector's mark phase. Heap handles that are stored
    /// outside a `Value` (symbol names, marker buffers) are reported as
    /// `Value::Gc`.
    pub fn for_each_reference(&self, mut f: impl FnMut(Value)) {
        match self {
            HeapObject::Cons { car, cdr } => {
                f(*car);
                f(*cdr);
            }
            HeapObject::Vector(slots) | HeapObject::CompiledFunction(slots) => {
                slots.iter().copied().for_each(f);
            }
            HeapObject::Symbol(symbol) => {
                f(Value::Gc(symbol.name));
                f(symbol.value);
                f(symbol.function);
                f(symbol.plist);
            }
            HeapObject::Buffer(buffer) => {
                for (symbol, value) in buffer.locals() {
                    f(*symbol);
                    f(*value);
                }
            }
            HeapObject::HashTable(table) => {
                for (key, value) in table.iter() {
                    f(*key);
                    f(*value);
                }
            }
            HeapObject::CharTable(table) => {
                table.stored_values().into_iter().for_each(&mut f);
                f(table.parent());
            }
            HeapObject::Marker(marker) => {
                if let Some(buffer) = marker.buffer {
                    f(Value::Gc(buffer));
                }
            }
            HeapObject::Overlay(overlay) => {
                if let Some(buffer) = overlay.buffer {
                    f(Value::Gc(buffer));
                }
                f(overlay.plist);
            }
            HeapObject::Float(_)
            | HeapObject::String(_)
            | HeapObject::BoolVector(_)
            | HeapObject::Frame(_)
            | HeapObject::Subr(_) => {}
        }
    }
}
