//! Own-storage estimates for containers whose internal layout is not fully
//! inspectable.
//!
//! The header multipliers below are rough: each approximates the container's
//! fixed internal struct as a number of value-sized slots. Every figure
//! computed here is reported as approximate.

use crate::{
    memsize::{
        error::SizeError,
        layout::{ARRAY_SLOT, LayoutTable},
    },
    runtime::{bool_vector::BoolVector, buffer::Buffer, hash_table::HashTable},
};

/// Fixed hash-table header, in slots.
pub const HASH_TABLE_HEADER_SLOTS: u64 = 10;

/// Fixed char-table header, in slots. Char-tables carry a much wider struct
/// (sub-table pointers per character block) than hash tables.
pub const CHAR_TABLE_HEADER_SLOTS: u64 = 64;

/// Fixed bool-vector header, in slots.
pub const BOOL_VECTOR_HEADER_SLOTS: u64 = 2;

/// Header plus one slot per allocated entry, live or not.
pub fn hash_table_overhead(layout: &LayoutTable, table: &HashTable) -> Result<u64, SizeError> {
    let slot = layout.lookup(ARRAY_SLOT)?;
    Ok(HASH_TABLE_HEADER_SLOTS * slot + table.capacity() as u64 * slot)
}

pub fn char_table_overhead(layout: &LayoutTable) -> Result<u64, SizeError> {
    Ok(CHAR_TABLE_HEADER_SLOTS * layout.lookup(ARRAY_SLOT)?)
}

/// Header plus the packed bits, rounded up to whole bytes.
pub fn bool_vector_overhead(layout: &LayoutTable, bits: &BoolVector) -> Result<u64, SizeError> {
    Ok(BOOL_VECTOR_HEADER_SLOTS * layout.lookup(ARRAY_SLOT)? + bits.len().div_ceil(8) as u64)
}

/// Accessible text span plus the gap.
pub fn buffer_overhead(buffer: &Buffer) -> u64 {
    (buffer.zv() - buffer.begv() + buffer.gap_size()) as u64
}
