use serde::Serialize;

/// Handle into the GC heap.
///
/// A `GcHandle` is a lightweight, copyable slot index that refers to a
/// heap-allocated object. Handles are the identity of heap objects: two
/// objects are the same object exactly when their handles are equal, which
/// makes the handle the key used for at-most-once size accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GcHandle(pub(crate) u32);

impl GcHandle {
    /// Returns the raw heap slot index backing this handle.
    pub fn index(self) -> u32 {
        self.0
    }

    #[cfg(test)]
    pub fn new_for_test(index: u32) -> Self {
        Self(index)
    }
}
