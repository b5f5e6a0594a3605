pub mod gc_handle;
pub mod gc_heap;
pub mod heap_entry;
pub mod heap_object;
pub mod heap_stats;

pub use gc_handle::GcHandle;
pub use gc_heap::GcHeap;
pub use heap_object::{HeapObject, ObjectKind};
pub use heap_stats::{HeapStats, KindStat};
