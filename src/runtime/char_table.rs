use crate::runtime::{error::RuntimeError, value::Value};

/// Largest valid character code.
pub const MAX_CHAR: u32 = 0x3F_FFFF;

/// Table mapping character codes to values.
///
/// Assignments are kept as inclusive ranges; a later assignment shadows an
/// earlier one where they overlap. A lookup that finds nothing (or `nil`)
/// falls back to the table's default, and then to its parent table, which is
/// resolved through the heap (see `GcHeap::char_table_get`).
#[derive(Debug, Clone)]
pub struct CharTable {
    purpose: Value,
    default: Value,
    parent: Value,
    ranges: Vec<(u32, u32, Value)>,
    extras: Vec<Value>,
}

impl CharTable {
    pub fn new(purpose: Value, default: Value, extra_slots: usize) -> Self {
        Self {
            purpose,
            default,
            parent: Value::Nil,
            ranges: Vec::new(),
            extras: vec![Value::Nil; extra_slots],
        }
    }

    pub fn purpose(&self) -> Value {
        self.purpose
    }

    pub fn default_value(&self) -> Value {
        self.default
    }

    pub fn set_default(&mut self, value: Value) {
        self.default = value;
    }

    pub fn parent(&self) -> Value {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Value) {
        self.parent = parent;
    }

    pub fn set(&mut self, c: u32, value: Value) -> Result<(), RuntimeError> {
        self.set_range(c, c, value)
    }

    pub fn set_range(&mut self, from: u32, to: u32, value: Value) -> Result<(), RuntimeError> {
        if to > MAX_CHAR {
            return Err(RuntimeError::InvalidCharacter(to));
        }
        if from > to {
            return Err(RuntimeError::InvalidCharacter(from));
        }
        self.ranges.push((from, to, value));
        Ok(())
    }

    /// Looks `c` up in this table only: ranges, then the default.
    pub fn lookup(&self, c: u32) -> Value {
        let assigned = self
            .ranges
            .iter()
            .rev()
            .find(|(from, to, _)| (*from..=*to).contains(&c))
            .map(|(_, _, value)| *value)
            .unwrap_or(Value::Nil);
        if assigned.is_nil() {
            self.default
        } else {
            assigned
        }
    }

    pub fn extra(&self, n: usize) -> Result<Value, RuntimeError> {
        self.extras
            .get(n)
            .copied()
            .ok_or(RuntimeError::IndexOutOfRange {
                index: n,
                len: self.extras.len(),
            })
    }

    pub fn set_extra(&mut self, n: usize, value: Value) -> Result<(), RuntimeError> {
        let len = self.extras.len();
        let slot = self
            .extras
            .get_mut(n)
            .ok_or(RuntimeError::IndexOutOfRange { index: n, len })?;
        *slot = value;
        Ok(())
    }

    /// Every value the table itself stores, excluding the parent link.
    ///
    /// Values shadowed by later range assignments are no longer reachable
    /// through lookups and are skipped.
    pub fn stored_values(&self) -> Vec<Value> {
        let mut values = vec![self.purpose, self.default];
        for (i, (from, to, value)) in self.ranges.iter().enumerate() {
            let shadowed = self.ranges[i + 1..]
                .iter()
                .any(|(f, t, _)| *f <= *from && *to <= *t);
            if !shadowed {
                values.push(*value);
            }
        }
        values.extend(self.extras.iter().copied());
        values
    }
}
