use std::collections::HashMap;

use crate::runtime::{
    error::RuntimeError,
    gc::{
        gc_handle::GcHandle,
        heap_entry::HeapEntry,
        heap_object::{HeapObject, Symbol},
        heap_stats::HeapStats,
    },
    value::Value,
};

/// Stop-the-world mark-and-sweep heap.
///
/// Every non-immediate object is allocated here and addressed by a
/// [`GcHandle`]. Slots freed by a collection are reused through a free list,
/// so a handle is only meaningful while its object is reachable.
/// Interned symbols are kept in the obarray and are always treated as roots.
pub struct GcHeap {
    entries: Vec<Option<HeapEntry>>,
    free_list: Vec<u32>,
    obarray: HashMap<Box<str>, GcHandle>,
    total_collections: usize,
    total_allocations: usize,
}

impl Default for GcHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHeap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            obarray: HashMap::new(),
            total_collections: 0,
            total_allocations: 0,
        }
    }

    /// Allocates a new heap object and returns a stable handle to it.
    ///
    /// Freed slots are reused through the internal free-list before growing
    /// the storage vector.
    pub fn alloc(&mut self, object: HeapObject) -> GcHandle {
        self.total_allocations += 1;

        let entry = HeapEntry {
            object,
            marked: false,
        };

        if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(entry);
            GcHandle(idx)
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Some(entry));
            GcHandle(idx)
        }
    }

    pub fn alloc_value(&mut self, object: HeapObject) -> Value {
        Value::Gc(self.alloc(object))
    }

    /// Returns an immutable reference to a live object by handle.
    ///
    /// Panics if the handle points to a free slot or is out of bounds.
    pub fn get(&self, handle: GcHandle) -> &HeapObject {
        &self.entries[handle.0 as usize]
            .as_ref()
            .expect("GcHeap::get: invalid or free handle")
            .object
    }

    /// Mutable counterpart of [`Self::get`]; panics on the same conditions.
    pub fn get_mut(&mut self, handle: GcHandle) -> &mut HeapObject {
        &mut self.entries[handle.0 as usize]
            .as_mut()
            .expect("GcHeap::get_mut: invalid or free handle")
            .object
    }

    /// Returns the number of currently live heap entries.
    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    /// Returns the total number of allocations performed by this heap.
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Returns the total number of completed GC cycles.
    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    // -- Constructors --

    pub fn float(&mut self, value: f64) -> Value {
        self.alloc_value(HeapObject::Float(value))
    }

    pub fn string(&mut self, text: &str) -> Value {
        self.alloc_value(HeapObject::String(text.into()))
    }

    pub fn vector(&mut self, slots: Vec<Value>) -> Value {
        self.alloc_value(HeapObject::Vector(slots))
    }

    pub fn cons(&mut self, car: Value, cdr: Value) -> Value {
        self.alloc_value(HeapObject::Cons { car, cdr })
    }

    /// Builds a proper list of `items`, allocating one cons per element.
    pub fn list(&mut self, items: &[Value]) -> Value {
        items
            .iter()
            .rev()
            .fold(Value::Nil, |tail, item| self.cons(*item, tail))
    }

    /// Returns the interned symbol called `name`, creating it on first use.
    pub fn intern(&mut self, name: &str) -> Value {
        if let Some(handle) = self.obarray.get(name) {
            return Value::Gc(*handle);
        }
        let Value::Gc(handle) = self.make_symbol(name) else {
            unreachable!("make_symbol always allocates");
        };
        self.obarray.insert(name.into(), handle);
        Value::Gc(handle)
    }

    pub fn intern_soft(&self, name: &str) -> Option<Value> {
        self.obarray.get(name).map(|handle| Value::Gc(*handle))
    }

    /// Allocates a fresh, uninterned symbol.
    pub fn make_symbol(&mut self, name: &str) -> Value {
        let name = self.alloc(HeapObject::String(name.into()));
        self.alloc_value(HeapObject::Symbol(Symbol {
            name,
            value: Value::Nil,
            function: Value::Nil,
            plist: Value::Nil,
        }))
    }

    // -- Accessors and mutators --

    /// Runtime type label of any value.
    pub fn type_name(&self, value: &Value) -> &'static str {
        match value {
            Value::Nil => "symbol",
            Value::Integer(_) => "integer",
            Value::Gc(handle) => self.get(*handle).type_name(),
        }
    }

    pub fn car(&self, cell: Value) -> Result<Value, RuntimeError> {
        match cell {
            Value::Nil => Ok(Value::Nil),
            _ => self.cons_parts(cell).map(|(car, _)| car),
        }
    }

    pub fn cdr(&self, cell: Value) -> Result<Value, RuntimeError> {
        match cell {
            Value::Nil => Ok(Value::Nil),
            _ => self.cons_parts(cell).map(|(_, cdr)| cdr),
        }
    }

    pub fn set_car(&mut self, cell: Value, value: Value) -> Result<(), RuntimeError> {
        let handle = self.expect_handle(cell, "cons")?;
        match self.get_mut(handle) {
            HeapObject::Cons { car, .. } => {
                *car = value;
                Ok(())
            }
            other => Err(wrong_type("cons", other)),
        }
    }

    pub fn set_cdr(&mut self, cell: Value, value: Value) -> Result<(), RuntimeError> {
        let handle = self.expect_handle(cell, "cons")?;
        match self.get_mut(handle) {
            HeapObject::Cons { cdr, .. } => {
                *cdr = value;
                Ok(())
            }
            other => Err(wrong_type("cons", other)),
        }
    }

    pub fn aset(&mut self, vector: Value, index: usize, value: Value) -> Result<(), RuntimeError> {
        let handle = self.expect_handle(vector, "vector")?;
        match self.get_mut(handle) {
            HeapObject::Vector(slots) | HeapObject::CompiledFunction(slots) => {
                let len = slots.len();
                let slot = slots
                    .get_mut(index)
                    .ok_or(RuntimeError::IndexOutOfRange { index, len })?;
                *slot = value;
                Ok(())
            }
            other => Err(wrong_type("vector", other)),
        }
    }

    pub fn symbol_name(&self, symbol: Value) -> Result<&str, RuntimeError> {
        let name = self.symbol(symbol)?.name;
        match self.get(name) {
            HeapObject::String(text) => Ok(&**text),
            other => Err(wrong_type("string", other)),
        }
    }

    pub fn set_symbol_value(&mut self, symbol: Value, value: Value) -> Result<(), RuntimeError> {
        self.symbol_mut(symbol)?.value = value;
        Ok(())
    }

    pub fn symbol_value(&self, symbol: Value) -> Result<Value, RuntimeError> {
        Ok(self.symbol(symbol)?.value)
    }

    /// Reads `prop` from the symbol's property list.
    pub fn get_prop(&self, symbol: Value, prop: Value) -> Result<Value, RuntimeError> {
        let mut cursor = self.symbol(symbol)?.plist;
        while let Ok((key, rest)) = self.cons_parts(cursor) {
            let Ok((value, next)) = self.cons_parts(rest) else {
                break;
            };
            if key == prop {
                return Ok(value);
            }
            cursor = next;
        }
        Ok(Value::Nil)
    }

    /// Sets `prop` on the symbol's property list, consing a new pair of
    /// cells onto the front when the property is not present yet.
    pub fn put(&mut self, symbol: Value, prop: Value, value: Value) -> Result<(), RuntimeError> {
        let plist = self.symbol(symbol)?.plist;
        let mut cursor = plist;
        while let Ok((key, rest)) = self.cons_parts(cursor) {
            let Ok((_, next)) = self.cons_parts(rest) else {
                break;
            };
            if key == prop {
                return self.set_car(rest, value);
            }
            cursor = next;
        }
        let tail = self.cons(value, plist);
        let plist = self.cons(prop, tail);
        self.symbol_mut(symbol)?.plist = plist;
        Ok(())
    }

    pub fn hash_table_put(
        &mut self,
        table: Value,
        key: Value,
        value: Value,
    ) -> Result<Option<Value>, RuntimeError> {
        let handle = self.expect_handle(table, "hash-table")?;
        match self.get_mut(handle) {
            HeapObject::HashTable(table) => Ok(table.put(key, value)),
            other => Err(wrong_type("hash-table", other)),
        }
    }

    /// Looks `c` up in a char-table, following the parent chain while the
    /// result is `nil`.
    pub fn char_table_get(&self, table: Value, c: u32) -> Result<Value, RuntimeError> {
        let mut current = table;
        while !current.is_nil() {
            let handle = self.expect_handle(current, "char-table")?;
            let chars = match self.get(handle) {
                HeapObject::CharTable(chars) => chars,
                other => return Err(wrong_type("char-table", other)),
            };
            let found = chars.lookup(c);
            if !found.is_nil() {
                return Ok(found);
            }
            current = chars.parent();
        }
        Ok(Value::Nil)
    }

    fn cons_parts(&self, cell: Value) -> Result<(Value, Value), RuntimeError> {
        let handle = self.expect_handle(cell, "cons")?;
        match self.get(handle) {
            HeapObject::Cons { car, cdr } => Ok((*car, *cdr)),
            other => Err(wrong_type("cons", other)),
        }
    }

    fn symbol(&self, symbol: Value) -> Result<&Symbol, RuntimeError> {
        let handle = self.expect_handle(symbol, "symbol")?;
        match self.get(handle) {
            HeapObject::Symbol(symbol) => Ok(symbol),
            other => Err(wrong_type("symbol", other)),
        }
    }

    fn symbol_mut(&mut self, symbol: Value) -> Result<&mut Symbol, RuntimeError> {
        let handle = self.expect_handle(symbol, "symbol")?;
        match self.get_mut(handle) {
            HeapObject::Symbol(symbol) => Ok(symbol),
            other => Err(wrong_type("symbol", other)),
        }
    }

    fn expect_handle(&self, value: Value, expected: &'static str) -> Result<GcHandle, RuntimeError> {
        value.as_handle().ok_or_else(|| RuntimeError::WrongType {
            expected,
            found: self.type_name(&value),
        })
    }

    // -- Statistics and collection --

    /// Returns per-kind layout costs and live usage.
    pub fn stats(&self) -> HeapStats {
        HeapStats::gather(
            self.entries.iter().flatten().map(|entry| &entry.object),
            self.free_list.len(),
        )
    }

    /// Runs a full stop-the-world mark-and-sweep collection.
    ///
    /// `roots` plus every interned symbol form the root set. Returns the
    /// allocator statistics after the sweep.
    pub fn collect(&mut self, roots: &[Value]) -> HeapStats {
        let mut worklist: Vec<Value> = Vec::with_capacity(roots.len() + self.obarray.len());
        worklist.extend_from_slice(roots);
        worklist.extend(self.obarray.values().map(|handle| Value::Gc(*handle)));

        while let Some(value) = worklist.pop() {
            if let Value::Gc(handle) = value {
                self.mark_handle(handle, &mut worklist);
            }
        }

        let live_before = self.live_count();
        self.sweep();
        let live_after = self.live_count();
        self.total_collections += 1;

        log::debug!(
            "gc cycle {}: {} live before, {} collected",
            self.total_collections,
            live_before,
            live_before.saturating_sub(live_after)
        );

        self.stats()
    }

    fn mark_handle(&mut self, handle: GcHandle, worklist: &mut Vec<Value>) {
        let idx = handle.index() as usize;

        // Mark first so cycles/shared nodes are visited once.
        match self.entries.get_mut(idx).and_then(|entry| entry.as_mut()) {
            Some(entry) if !entry.marked => entry.marked = true,
            _ => return,
        }

        if let Some(entry) = self.entries[idx].as_ref() {
            entry.object.for_each_reference(|child| worklist.push(child));
        }
    }

    fn sweep(&mut self) {
        for (i, slot) in self.entries.iter_mut().enumerate() {
            if let Some(entry) = slot {
                if entry.marked {
                    entry.marked = false;
                } else {
                    *slot = None;
                    self.free_list.push(i as u32);
                }
            }
        }
    }
}

fn wrong_type(expected: &'static str, found: &HeapObject) -> RuntimeError {
    RuntimeError::WrongType {
        expected,
        found: found.type_name(),
    }
}
