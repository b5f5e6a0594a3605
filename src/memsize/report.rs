//! Multi-root size reports.
//!
//! All roots of a report share one traversal, so an object reachable from
//! several roots is billed to the first root that reaches it and the root
//! totals add up to the size of the whole graph. The per-kind breakdown is
//! built afterwards from the handles the traversal recorded, charging each
//! object its own storage only.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    memsize::{
        dispatch::Sizer, error::SizeError, estimate::SizeEstimate, visited::VisitedSet,
    },
    runtime::{gc::ObjectKind, value::Value},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RootTotal {
    pub name: String,
    pub size: SizeEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindTotal {
    pub kind: ObjectKind,
    pub count: usize,
    pub bytes: SizeEstimate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeReport {
    pub roots: Vec<RootTotal>,
    pub kinds: Vec<KindTotal>,
    pub total: SizeEstimate,
}

impl SizeReport {
    pub fn build<S: AsRef<str>>(sizer: &Sizer<'_>, roots: &[(S, Value)]) -> Result<Self, SizeError> {
        let mut visited = VisitedSet::new();
        let mut root_totals = Vec::with_capacity(roots.len());
        let mut total = SizeEstimate::ZERO;

        for (name, value) in roots {
            let size = sizer.object_size_in(*value, &mut visited)?;
            total += size;
            root_totals.push(RootTotal {
                name: name.as_ref().to_string(),
                size,
            });
        }

        let mut by_kind: BTreeMap<ObjectKind, (usize, SizeEstimate)> = BTreeMap::new();
        for handle in visited.handles() {
            let kind = sizer.heap().get(handle).kind();
            let own = sizer.own_size(handle)?;
            let entry = by_kind.entry(kind).or_default();
            entry.0 += 1;
            entry.1 += own;
        }

        log::debug!(
            "size report: {} roots, {} objects, total {}",
            roots.len(),
            visited.len(),
            total
        );

        Ok(Self {
            roots: root_totals,
            kinds: by_kind
                .into_iter()
                .map(|(kind, (count, bytes))| KindTotal { kind, count, bytes })
                .collect(),
            total,
        })
    }

    pub fn object_count(&self) -> usize {
        self.kinds.iter().map(|k| k.count).sum()
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== Size Report ===\n");
        out.push_str(&format!("{:<20} {:>12}\n", "Root", "Bytes"));
        out.push_str(&"-".repeat(33));
        out.push('\n');
        for root in &self.roots {
            out.push_str(&format!("{:<20} {:>12}\n", root.name, root.size.to_string()));
        }
        out.push_str(&"-".repeat(33));
        out.push('\n');
        out.push_str(&format!("{:<20} {:>12}\n", "TOTAL", self.total.to_string()));

        out.push('\n');
        out.push_str(&format!("{:<20} {:>8} {:>12}\n", "Kind", "Count", "Bytes"));
        out.push_str(&"-".repeat(42));
        out.push('\n');
        for kind in &self.kinds {
            out.push_str(&format!(
                "{:<20} {:>8} {:>12}\n",
                kind.kind.label(),
                kind.count,
                kind.bytes.to_string()
            ));
        }
        out
    }
}
