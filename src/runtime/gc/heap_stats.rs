//! Allocator statistics reported by the heap.
//!
//! Every entry pairs a layout kind name with the per-instance byte cost of
//! that kind in this build, as laid out in memory by the runtime itself.
//! The costs therefore follow the target's pointer width.

use std::mem::size_of;

use serde::Serialize;

use super::heap_object::{HeapObject, Marker, Overlay, Symbol};
use crate::runtime::value::Value;

pub const PAIR: &str = "pair";
pub const SYMBOL: &str = "symbol";
pub const STRING_HEADER: &str = "string-header";
pub const STRING_BYTE: &str = "string-byte";
pub const ARRAY: &str = "array";
pub const ARRAY_SLOT: &str = "array-slot";
pub const FLOAT: &str = "float";
pub const MISC: &str = "misc";

/// Per-instance cost and live usage for one layout kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindStat {
    pub name: &'static str,
    /// Bytes per instance.
    pub size: usize,
    /// Live instances (live bytes for `string-byte`, live slots for
    /// `array-slot`).
    pub used: usize,
}

/// Point-in-time allocator summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeapStats {
    pub kinds: Vec<KindStat>,
    pub live_objects: usize,
    pub free_slots: usize,
}

#[derive(Default)]
struct Usage {
    pairs: usize,
    symbols: usize,
    strings: usize,
    string_bytes: usize,
    arrays: usize,
    array_slots: usize,
    floats: usize,
    misc: usize,
}

impl HeapStats {
    pub(crate) fn gather<'a>(
        objects: impl Iterator<Item = &'a HeapObject>,
        free_slots: usize,
    ) -> Self {
        let mut usage = Usage::default();
        let mut live_objects = 0;

        for object in objects {
            live_objects += 1;
            match object {
                HeapObject::Cons { .. } => usage.pairs += 1,
                HeapObject::Symbol(_) => usage.symbols += 1,
                HeapObject::String(text) => {
                    usage.strings += 1;
                    usage.string_bytes += text.len();
                }
                HeapObject::Vector(slots) | HeapObject::CompiledFunction(slots) => {
                    usage.arrays += 1;
                    usage.array_slots += slots.len();
                }
                HeapObject::Float(_) => usage.floats += 1,
                HeapObject::Marker(_) | HeapObject::Overlay(_) => usage.misc += 1,
                HeapObject::Buffer(_)
                | HeapObject::HashTable(_)
                | HeapObject::CharTable(_)
                | HeapObject::BoolVector(_)
                | HeapObject::Frame(_)
                | HeapObject::Subr(_) => {}
            }
        }

        let kinds = vec![
            KindStat {
                name: PAIR,
                size: size_of::<[Value; 2]>(),
                used: usage.pairs,
            },
            KindStat {
                name: SYMBOL,
                size: size_of::<Symbol>(),
                used: usage.symbols,
            },
            KindStat {
                name: STRING_HEADER,
                size: size_of::<Box<str>>(),
                used: usage.strings,
            },
            KindStat {
                name: STRING_BYTE,
                size: size_of::<u8>(),
                used: usage.string_bytes,
            },
            KindStat {
                name: ARRAY,
                size: size_of::<Vec<Value>>(),
                used: usage.arrays,
            },
            KindStat {
                name: ARRAY_SLOT,
                size: size_of::<Value>(),
                used: usage.array_slots,
            },
            KindStat {
                name: FLOAT,
                size: size_of::<f64>(),
                used: usage.floats,
            },
            KindStat {
                name: MISC,
                size: size_of::<Marker>().max(size_of::<Overlay>()),
                used: usage.misc,
            },
        ];

        Self {
            kinds,
            live_objects,
            free_slots,
        }
    }

    /// Per-instance byte cost of the named kind.
    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.kinds
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.size)
    }

    pub fn used(&self, name: &str) -> Option<usize> {
        self.kinds
            .iter()
            .find(|stat| stat.name == name)
            .map(|stat| stat.used)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== Heap Stats ===\n");
        out.push_str(&format!("Live objects:       {}\n", self.live_objects));
        out.push_str(&format!("Free slots:         {}\n", self.free_slots));
        out.push('\n');
        out.push_str(&format!("{:<16} {:>6} {:>10}\n", "Kind", "Size", "Used"));
        out.push_str(&"-".repeat(34));
        out.push('\n');
        for stat in &self.kinds {
            out.push_str(&format!(
                "{:<16} {:>6} {:>10}\n",
                stat.name, stat.size, stat.used
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_heap_reports_every_kind() {
        let stats = HeapStats::gather(std::iter::empty(), 0);
        for name in [
            PAIR,
            SYMBOL,
            STRING_HEADER,
            STRING_BYTE,
            ARRAY,
            ARRAY_SLOT,
            FLOAT,
            MISC,
        ] {
            assert!(stats.size_of(name).is_some(), "missing {}", name);
            assert_eq!(stats.used(name), Some(0));
        }
        assert_eq!(stats.size_of("no-such-kind"), None);
    }

    #[test]
    fn test_sizes_follow_value_layout() {
        let stats = HeapStats::gather(std::iter::empty(), 0);
        let slot = size_of::<Value>();
        assert_eq!(stats.size_of(ARRAY_SLOT), Some(slot));
        assert_eq!(stats.size_of(PAIR), Some(2 * slot));
        assert_eq!(stats.size_of(STRING_BYTE), Some(1));
        assert_eq!(stats.size_of(FLOAT), Some(8));
    }

    #[test]
    fn test_usage_counts() {
        let objects = [
            HeapObject::String("héllo".into()),
            HeapObject::String("ab".into()),
            HeapObject::Vector(vec![Value::Nil; 3]),
            HeapObject::CompiledFunction(vec![Value::Nil; 2]),
            HeapObject::Cons {
                car: Value::Nil,
                cdr: Value::Nil,
            },
        ];
        let stats = HeapStats::gather(objects.iter(), 4);
        assert_eq!(stats.used(STRING_HEADER), Some(2));
        assert_eq!(stats.used(STRING_BYTE), Some(8));
        assert_eq!(stats.used(ARRAY), Some(2));
        assert_eq!(stats.used(ARRAY_SLOT), Some(5));
        assert_eq!(stats.used(PAIR), Some(1));
        assert_eq!(stats.live_objects, 5);
        assert_eq!(stats.free_slots, 4);
    }

    #[test]
    fn test_render_lists_kinds() {
        let stats = HeapStats::gather(std::iter::empty(), 0);
        let report = stats.render();
        assert!(report.contains("Heap Stats"));
        assert!(report.contains("string-header"));
        assert!(report.contains("array-slot"));
    }
}
