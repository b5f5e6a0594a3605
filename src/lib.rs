pub mod memsize;
pub mod runtime;

pub use memsize::{SizeError, SizeEstimate, object_size, object_size_with};
