//! Managed object system measured by the estimator.
//!
//! # Identity
//! Immediates (`nil`, fixnums) carry no storage and have no identity beyond
//! their value. Every other object lives on the [`gc::GcHeap`] and is named
//! by a [`gc::GcHandle`]; handle equality is object identity. Object graphs
//! may be cyclic (`set_cdr` can point a cell at itself), so anything that
//! walks the heap must track visited handles.
pub mod bool_vector;
pub mod buffer;
pub mod char_table;
pub mod error;
pub mod gc;
pub mod hash_table;
pub mod json;
pub mod value;

pub use error::RuntimeError;
