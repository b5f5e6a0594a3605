//! Per-kind size dispatch.

use crate::{
    memsize::{
        error::SizeError,
        estimate::SizeEstimate,
        layout::{
            ARRAY, ARRAY_SLOT, FLOAT, LayoutTable, MISC, PAIR, STRING_BYTE, STRING_HEADER, SYMBOL,
        },
        opaque::{bool_vector_overhead, buffer_overhead, char_table_overhead, hash_table_overhead},
        visited::VisitedSet,
    },
    runtime::{
        gc::{GcHandle, GcHeap, HeapObject},
        value::Value,
    },
};

/// Size estimator bound to one heap and one layout table.
///
/// A `Sizer` holds no traversal state. Every traversal threads its own
/// [`VisitedSet`] through the recursion, so one `Sizer` can serve any number
/// of independent or nested traversals.
#[derive(Clone, Copy)]
pub struct Sizer<'h> {
    heap: &'h GcHeap,
    layout: &'h LayoutTable,
}

impl<'h> Sizer<'h> {
    /// Sizer using the process-wide layout table.
    pub fn new(heap: &'h GcHeap) -> Self {
        Self::with_layout(heap, LayoutTable::global())
    }

    pub fn with_layout(heap: &'h GcHeap, layout: &'h LayoutTable) -> Self {
        Self { heap, layout }
    }

    pub fn heap(&self) -> &'h GcHeap {
        self.heap
    }

    pub fn layout(&self) -> &'h LayoutTable {
        self.layout
    }

    /// Total size of `value` and everything it reaches, in a fresh traversal.
    pub fn object_size(&self, value: Value) -> Result<SizeEstimate, SizeError> {
        let mut visited = VisitedSet::new();
        self.object_size_in(value, &mut visited)
    }

    /// Total size of `value`, continuing the traversal that owns `visited`.
    ///
    /// Objects already in `visited` cost nothing; every object charged here is
    /// added to it.
    pub fn object_size_in(
        &self,
        value: Value,
        visited: &mut VisitedSet,
    ) -> Result<SizeEstimate, SizeError> {
        match value {
            Value::Nil | Value::Integer(_) => Ok(SizeEstimate::ZERO),
            Value::Gc(handle) => {
                visited.charge_once(handle, |visited| self.size_object(handle, visited))
            }
        }
    }

    /// Storage owned by the object itself, excluding anything it references.
    pub fn own_size(&self, handle: GcHandle) -> Result<SizeEstimate, SizeError> {
        self.own_size_of(self.heap.get(handle))
    }

    fn size_object(
        &self,
        handle: GcHandle,
        visited: &mut VisitedSet,
    ) -> Result<SizeEstimate, SizeError> {
        let object = self.heap.get(handle);
        let own = self.own_size_of(object)?;
        Ok(own + self.children_size(object, visited)?)
    }

    fn own_size_of(&self, object: &HeapObject) -> Result<SizeEstimate, SizeError> {
        let layout = self.layout;
        let size = match object {
            HeapObject::Float(_) => SizeEstimate::exact(layout.lookup(FLOAT)?),
            HeapObject::String(text) => SizeEstimate::exact(
                layout.lookup(STRING_HEADER)? + layout.lookup(STRING_BYTE)? * text.len() as u64,
            ),
            // Compiled functions are laid out like vectors.
            HeapObject::Vector(slots) | HeapObject::CompiledFunction(slots) => SizeEstimate::exact(
                layout.lookup(ARRAY)? + layout.lookup(ARRAY_SLOT)? * slots.len() as u64,
            ),
            HeapObject::Cons { .. } => SizeEstimate::exact(layout.lookup(PAIR)?),
            HeapObject::Symbol(_) => SizeEstimate::exact(layout.lookup(SYMBOL)?),
            HeapObject::Buffer(buffer) => SizeEstimate::approximate(buffer_overhead(buffer)),
            HeapObject::HashTable(table) => {
                SizeEstimate::approximate(hash_table_overhead(layout, table)?)
            }
            HeapObject::CharTable(_) => SizeEstimate::approximate(char_table_overhead(layout)?),
            HeapObject::BoolVector(bits) => {
                SizeEstimate::approximate(bool_vector_overhead(layout, bits)?)
            }
            HeapObject::Frame(_) | HeapObject::Subr(_) => {
                log::warn!("size estimate requested for a {} object", object.type_name());
                return Err(SizeError::UnsupportedKind {
                    kind: object.kind(),
                });
            }
            HeapObject::Marker(_) | HeapObject::Overlay(_) => {
                SizeEstimate::approximate(layout.lookup(MISC)?)
            }
        };
        if !size.is_exact() {
            log::trace!("approximate {} estimate: {}", object.type_name(), size);
        }
        Ok(size)
    }

    fn children_size(
        &self,
        object: &HeapObject,
        visited: &mut VisitedSet,
    ) -> Result<SizeEstimate, SizeError> {
        match object {
            HeapObject::Vector(slots) | HeapObject::CompiledFunction(slots) => {
                self.sum_values(slots.iter().copied(), visited)
            }
            HeapObject::Cons { car, cdr } => self.list_tail_size(*car, *cdr, visited),
            HeapObject::Symbol(symbol) => Ok(self.object_size_in(symbol.plist, visited)?
                + self.object_size_in(Value::Gc(symbol.name), visited)?),
            HeapObject::Buffer(buffer) => self.sum_values(
                buffer
                    .locals()
                    .iter()
                    .flat_map(|(symbol, value)| [*symbol, *value]),
                visited,
            ),
            HeapObject::HashTable(table) => self.sum_values(
                table.iter().flat_map(|(key, value)| [*key, *value]),
                visited,
            ),
            HeapObject::CharTable(table) => {
                let values = self.sum_values(table.stored_values().into_iter(), visited)?;
                Ok(values + self.object_size_in(table.parent(), visited)?)
            }
            // Leaves, and the default estimate which does not look inside.
            HeapObject::Float(_)
            | HeapObject::String(_)
            | HeapObject::BoolVector(_)
            | HeapObject::Marker(_)
            | HeapObject::Overlay(_)
            | HeapObject::Frame(_)
            | HeapObject::Subr(_) => Ok(SizeEstimate::ZERO),
        }
    }

    /// Charges the car of a cons, then walks its cdr chain.
    ///
    /// Consecutive unvisited cons cells along the cdr are charged in a loop
    /// rather than by recursion, in the same order recursion would visit
    /// them, so the totals are identical. The walk stops at the first tail
    /// that is not an unvisited cons and charges that tail normally.
    fn list_tail_size(
        &self,
        car: Value,
        cdr: Value,
        visited: &mut VisitedSet,
    ) -> Result<SizeEstimate, SizeError> {
        let pair = self.layout.lookup(PAIR)?;
        let mut total = self.object_size_in(car, visited)?;
        let mut tail = cdr;

        while let Value::Gc(handle) = tail {
            let HeapObject::Cons { car, cdr } = self.heap.get(handle) else {
                break;
            };
            if !visited.insert(handle) {
                return Ok(total + VisitedSet::PLACEHOLDER);
            }
            total += SizeEstimate::exact(pair) + self.object_size_in(*car, visited)?;
            tail = *cdr;
        }

        Ok(total + self.object_size_in(tail, visited)?)
    }

    fn sum_values(
        &self,
        values: impl Iterator<Item = Value>,
        visited: &mut VisitedSet,
    ) -> Result<SizeEstimate, SizeError> {
        let mut total = SizeEstimate::ZERO;
        for value in values {
            total += self.object_size_in(value, visited)?;
        }
        Ok(total)
    }
}
