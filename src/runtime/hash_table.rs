use std::collections::HashMap;

use crate::runtime::value::Value;

/// Initial allocated capacity of a table created without a size hint.
pub const DEFAULT_HASH_TABLE_SIZE: usize = 8;

/// `eq`-keyed associative table.
///
/// Keys compare by identity for heap objects and by value for immediates.
/// Entries keep insertion order. `capacity` models the table's allocated
/// slot count: it only grows (doubling when full) and is what the memory
/// estimator charges for, independent of how many entries are live.
#[derive(Debug, Clone)]
pub struct HashTable {
    entries: Vec<(Value, Value)>,
    index: HashMap<Value, usize>,
    capacity: usize,
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HashTable {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HASH_TABLE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts or replaces the value stored under `key`.
    ///
    /// Returns the previous value, if any.
    pub fn put(&mut self, key: Value, value: Value) -> Option<Value> {
        if let Some(&slot) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[slot].1, value));
        }
        if self.entries.len() == self.capacity {
            self.capacity *= 2;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let slot = self.index.remove(key)?;
        let (_, value) = self.entries.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocated slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }
}
