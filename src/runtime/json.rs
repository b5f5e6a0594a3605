//! Building heap objects from JSON documents.

use serde_json::Value as Json;

use crate::runtime::{
    gc::{GcHeap, HeapObject},
    hash_table::HashTable,
    value::Value,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Build proper lists instead of vectors for JSON arrays.
    pub arrays_as_lists: bool,
}

/// Allocates `json` on `heap` and returns the root value.
///
/// - `null` and `false` become `nil`, `true` becomes the symbol `t`
/// - integers that fit in an `i64` become fixnums, other numbers floats
/// - strings become fresh strings (never shared, even when equal)
/// - arrays become vectors, or lists with [`ImportOptions::arrays_as_lists`]
/// - objects become hash tables keyed by strings
pub fn from_json(heap: &mut GcHeap, json: &Json, options: ImportOptions) -> Value {
    match json {
        Json::Null | Json::Bool(false) => Value::Nil,
        Json::Bool(true) => heap.intern("t"),
        Json::Number(number) => match number.as_i64() {
            Some(v) => Value::Integer(v),
            None => heap.float(number.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(text) => heap.string(text),
        Json::Array(items) => {
            let values: Vec<Value> = items
                .iter()
                .map(|item| from_json(heap, item, options))
                .collect();
            if options.arrays_as_lists {
                heap.list(&values)
            } else {
                heap.vector(values)
            }
        }
        Json::Object(fields) => {
            let mut table = HashTable::with_capacity(fields.len());
            for (key, item) in fields {
                let key = heap.string(key);
                let value = from_json(heap, item, options);
                table.put(key, value);
            }
            heap.alloc_value(HeapObject::HashTable(table))
        }
    }
}
