//! At-most-once accounting for one traversal.

use std::collections::HashSet;

use crate::{memsize::estimate::SizeEstimate, runtime::gc::GcHandle};

/// Handles already charged during the current traversal.
///
/// Membership is permanent for the life of the set. A repeat visit is worth
/// [`VisitedSet::PLACEHOLDER`], never the object's real cost: shared and
/// cyclic substructure is billed once, to the first path that reaches it.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<GcHandle>,
}

impl VisitedSet {
    /// Value returned for an object that was already charged.
    pub const PLACEHOLDER: SizeEstimate = SizeEstimate::ZERO;

    pub fn new() -> Self {
        Self::default()
    }

    /// Charges `handle` unless it was charged before.
    ///
    /// The handle is recorded before `compute` runs, so a reference from the
    /// object back to itself (directly or through a cycle) resolves to the
    /// placeholder instead of recursing forever.
    pub fn charge_once<E, F>(&mut self, handle: GcHandle, compute: F) -> Result<SizeEstimate, E>
    where
        F: FnOnce(&mut VisitedSet) -> Result<SizeEstimate, E>,
    {
        if !self.seen.insert(handle) {
            return Ok(Self::PLACEHOLDER);
        }
        compute(self)
    }

    /// Records `handle` directly; returns `false` if it was already charged.
    pub(crate) fn insert(&mut self, handle: GcHandle) -> bool {
        self.seen.insert(handle)
    }

    pub fn contains(&self, handle: GcHandle) -> bool {
        self.seen.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Charged handles in ascending slot order.
    pub fn handles(&self) -> Vec<GcHandle> {
        let mut handles: Vec<GcHandle> = self.seen.iter().copied().collect();
        handles.sort();
        handles
    }
}
