//! Memory footprint estimation.
//!
//! [`object_size`] sums the storage of a value and everything it
//! transitively references. Each heap object is charged at most once per
//! traversal (see [`VisitedSet`]), which keeps the walk finite on cyclic
//! graphs and bills shared substructure once. Per-kind byte costs come from
//! the [`LayoutTable`], filled from the runtime's own allocator statistics.
//!
//! Totals are [`SizeEstimate::Exact`] for graphs built only from kinds with
//! a fixed layout and [`SizeEstimate::Approximate`] as soon as a buffer, hash
//! table, char-table, bool-vector or unrecognised object contributes.

pub mod dispatch;
pub mod error;
pub mod estimate;
pub mod layout;
pub mod opaque;
pub mod report;
pub mod visited;

pub use dispatch::Sizer;
pub use error::SizeError;
pub use estimate::SizeEstimate;
pub use layout::LayoutTable;
pub use report::SizeReport;
pub use visited::VisitedSet;

use crate::runtime::{gc::GcHeap, value::Value};

/// Estimates the memory footprint of `value` in a fresh traversal.
///
/// `nil` and fixnums are immediates and cost nothing, so the `nil` ending a
/// proper list adds no bytes.
pub fn object_size(heap: &GcHeap, value: Value) -> Result<SizeEstimate, SizeError> {
    Sizer::new(heap).object_size(value)
}

/// Estimates `value` inside an enclosing traversal, sharing its visited set.
pub fn object_size_with(
    heap: &GcHeap,
    value: Value,
    visited: &mut VisitedSet,
) -> Result<SizeEstimate, SizeError> {
    Sizer::new(heap).object_size_in(value, visited)
}
