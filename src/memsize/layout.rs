//! Per-kind storage costs.
//!
//! The process-wide table is filled exactly once, on first use, from the
//! allocator statistics the runtime reports about itself, so the numbers
//! match the build (pointer width, value tagging) rather than being
//! hard-coded. It is read-only afterwards and can be shared freely.

use std::{collections::BTreeMap, sync::LazyLock};

use serde::{Deserialize, Serialize};

use crate::{
    memsize::error::SizeError,
    runtime::gc::{GcHeap, HeapStats},
};

pub use crate::runtime::gc::heap_stats::{
    ARRAY, ARRAY_SLOT, FLOAT, MISC, PAIR, STRING_BYTE, STRING_HEADER, SYMBOL,
};

static LAYOUT: LazyLock<LayoutTable> = LazyLock::new(LayoutTable::bootstrap);

/// Mapping from layout kind name to bytes per instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutTable {
    sizes: BTreeMap<String, u64>,
}

impl LayoutTable {
    /// The process-wide table, bootstrapped on first access.
    pub fn global() -> &'static LayoutTable {
        &LAYOUT
    }

    /// Queries a fresh heap's allocator statistics.
    pub fn bootstrap() -> Self {
        let table = Self::from_stats(&GcHeap::new().stats());
        log::debug!("layout table bootstrapped: {:?}", table.sizes);
        table
    }

    pub fn from_stats(stats: &HeapStats) -> Self {
        Self::from_entries(
            stats
                .kinds
                .iter()
                .map(|stat| (stat.name, stat.size as u64)),
        )
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            sizes: entries
                .into_iter()
                .map(|(name, size)| (name.into(), size))
                .collect(),
        }
    }

    /// Bytes per instance of `name`.
    ///
    /// A missing name means the table and the dispatcher disagree about the
    /// kind set; callers propagate the error rather than guessing.
    pub fn lookup(&self, name: &str) -> Result<u64, SizeError> {
        self.sizes
            .get(name)
            .copied()
            .ok_or_else(|| SizeError::MissingLayoutConstant {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.sizes.iter().map(|(name, size)| (name.as_str(), *size))
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== Layout Constants ===\n");
        for (name, size) in self.iter() {
            out.push_str(&format!("{:<16} {:>6}\n", name, size));
        }
        out
    }
}
