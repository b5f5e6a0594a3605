use memsize::memsize::{
    LayoutTable, SizeError, SizeEstimate, Sizer, VisitedSet,
    layout::{ARRAY, ARRAY_SLOT, FLOAT, MISC, PAIR, STRING_BYTE, STRING_HEADER, SYMBOL},
    object_size, object_size_with,
    opaque::{CHAR_TABLE_HEADER_SLOTS, HASH_TABLE_HEADER_SLOTS},
};
use memsize::runtime::{
    bool_vector::BoolVector,
    buffer::Buffer,
    char_table::CharTable,
    gc::{
        GcHeap, HeapObject, ObjectKind,
        heap_object::{Frame, Marker, Subr},
    },
    hash_table::HashTable,
    value::Value,
};

fn constant(name: &str) -> u64 {
    LayoutTable::global()
        .lookup(name)
        .unwrap_or_else(|err| panic!("{}", err))
}

fn exact(value: Value, heap: &GcHeap) -> u64 {
    match object_size(heap, value) {
        Ok(SizeEstimate::Exact(bytes)) => bytes,
        other => panic!("expected exact estimate, got {:?}", other),
    }
}

fn string_size(text: &str) -> u64 {
    constant(STRING_HEADER) + constant(STRING_BYTE) * text.len() as u64
}

#[test]
fn test_float_costs_one_float() {
    let mut heap = GcHeap::new();
    let f = heap.float(3.25);
    assert_eq!(exact(f, &heap), constant(FLOAT));
}

#[test]
fn test_immediates_are_free() {
    let heap = GcHeap::new();
    assert_eq!(object_size(&heap, Value::Integer(42)), Ok(SizeEstimate::ZERO));
    assert_eq!(object_size(&heap, Value::Nil), Ok(SizeEstimate::ZERO));
}

#[test]
fn test_string_counts_bytes_not_characters() {
    let mut heap = GcHeap::new();
    let ascii = heap.string("abcdefg");
    let multibyte = heap.string("abcdéfg");

    assert_eq!(exact(ascii, &heap), string_size("abcdefg"));
    assert_eq!(exact(multibyte, &heap), string_size("abcdéfg"));
    assert!(exact(multibyte, &heap) > exact(ascii, &heap));
}

#[test]
fn test_list_terminator_is_free() {
    let mut heap = GcHeap::new();
    let text = heap.string("end");
    let list = heap.list(&[text]);
    assert_eq!(exact(list, &heap), constant(PAIR) + string_size("end"));
}

#[test]
fn test_vector_of_fixnums() {
    let mut heap = GcHeap::new();
    let v = heap.vector(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    assert_eq!(exact(v, &heap), constant(ARRAY) + 3 * constant(ARRAY_SLOT));
}

#[test]
fn test_shared_child_is_charged_once() {
    let mut heap = GcHeap::new();
    let a = heap.string("xyz");
    let b = heap.string("xyz");
    let aliased = heap.cons(a, a);
    let distinct = heap.cons(a, b);

    let aliased_size = exact(aliased, &heap);
    let distinct_size = exact(distinct, &heap);
    assert_eq!(aliased_size, constant(PAIR) + string_size("xyz"));
    assert_eq!(distinct_size - aliased_size, exact(b, &heap));
}

#[test]
fn test_self_referential_cons_terminates() {
    let mut heap = GcHeap::new();
    let car = heap.string("head");
    let cell = heap.cons(car, Value::Nil);
    heap.set_cdr(cell, cell).unwrap();

    assert_eq!(exact(cell, &heap), constant(PAIR) + string_size("head"));
}

#[test]
fn test_self_referential_cons_with_fixnum_car() {
    let mut heap = GcHeap::new();
    let cell = heap.cons(Value::Integer(1), Value::Nil);
    heap.set_cdr(cell, cell).unwrap();

    assert_eq!(exact(cell, &heap), constant(PAIR));
}

#[test]
fn test_circular_list_charges_each_cell_once() {
    let mut heap = GcHeap::new();
    let list = heap.list(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    let last = heap.cdr(heap.cdr(list).unwrap()).unwrap();
    heap.set_cdr(last, list).unwrap();

    assert_eq!(exact(list, &heap), 3 * constant(PAIR));
}

#[test]
fn test_mutual_vector_cycle() {
    let mut heap = GcHeap::new();
    let a = heap.vector(vec![Value::Nil]);
    let b = heap.vector(vec![a]);
    heap.aset(a, 0, b).unwrap();

    let one = constant(ARRAY) + constant(ARRAY_SLOT);
    assert_eq!(exact(a, &heap), 2 * one);
    assert_eq!(exact(b, &heap), 2 * one);
}

#[test]
fn test_repeated_calls_agree() {
    let mut heap = GcHeap::new();
    let name = heap.string("shared");
    let inner = heap.list(&[name, name, Value::Integer(7)]);
    let root = heap.vector(vec![inner, name, inner]);

    let first = object_size(&heap, root);
    let second = object_size(&heap, root);
    assert_eq!(first, second);
    assert!(first.is_ok());
}

#[test]
fn test_long_list_does_not_exhaust_the_stack() {
    let mut heap = GcHeap::new();
    let items: Vec<Value> = (0..200_000).map(Value::Integer).collect();
    let list = heap.list(&items);

    assert_eq!(exact(list, &heap), 200_000 * constant(PAIR));
}

#[test]
fn test_deep_car_nesting() {
    let mut heap = GcHeap::new();
    let mut value = Value::Nil;
    for _ in 0..1_000 {
        value = heap.cons(value, Value::Nil);
    }
    assert_eq!(exact(value, &heap), 1_000 * constant(PAIR));
}

#[test]
fn test_interned_symbol_charges_name() {
    let mut heap = GcHeap::new();
    let sym = heap.intern("foo");
    assert_eq!(exact(sym, &heap), constant(SYMBOL) + string_size("foo"));
}

#[test]
fn test_symbol_value_and_function_are_not_charged() {
    let mut heap = GcHeap::new();
    let sym = heap.intern("bar");
    let before = exact(sym, &heap);

    let big = heap.vector(vec![Value::Nil; 100]);
    heap.set_symbol_value(sym, big).unwrap();
    assert_eq!(exact(sym, &heap), before);
}

#[test]
fn test_symbol_plist_is_charged() {
    let mut heap = GcHeap::new();
    let sym = heap.intern("baz");
    let prop = heap.intern("p");
    let before = exact(sym, &heap);

    heap.put(sym, prop, Value::Integer(1)).unwrap();
    assert_eq!(
        exact(sym, &heap),
        before + 2 * constant(PAIR) + constant(SYMBOL) + string_size("p")
    );
}

#[test]
fn test_compiled_function_sized_like_vector() {
    let mut heap = GcHeap::new();
    let text = heap.string("code");
    let slots = vec![text, Value::Integer(0), Value::Nil];
    let function = heap.alloc_value(HeapObject::CompiledFunction(slots.clone()));
    let vector = heap.vector(slots);

    let sizer = Sizer::new(&heap);
    let mut visited = VisitedSet::new();
    let function_size = sizer.object_size_in(function, &mut visited).unwrap();
    let mut visited = VisitedSet::new();
    let vector_size = sizer.object_size_in(vector, &mut visited).unwrap();
    assert_eq!(function_size, vector_size);
}

#[test]
fn test_unsupported_kinds_fail() {
    let mut heap = GcHeap::new();
    let frame = heap.alloc_value(HeapObject::Frame(Frame {
        name: "F1".to_string(),
        width: 80,
        height: 24,
    }));
    let subr = heap.alloc_value(HeapObject::Subr(Subr {
        name: "car",
        min_args: 1,
        max_args: Some(1),
    }));

    assert_eq!(
        object_size(&heap, frame),
        Err(SizeError::UnsupportedKind {
            kind: ObjectKind::Frame
        })
    );
    assert_eq!(
        object_size(&heap, subr),
        Err(SizeError::UnsupportedKind {
            kind: ObjectKind::Subr
        })
    );
}

#[test]
fn test_unsupported_kind_aborts_enclosing_traversal() {
    let mut heap = GcHeap::new();
    let frame = heap.alloc_value(HeapObject::Frame(Frame {
        name: "F1".to_string(),
        width: 80,
        height: 24,
    }));
    let holder = heap.vector(vec![Value::Integer(1), frame]);

    let err = object_size(&heap, holder).unwrap_err();
    assert_eq!(err.to_string(), "cannot estimate the size of a frame object");
}

#[test]
fn test_hash_table_is_approximate() {
    let mut heap = GcHeap::new();
    let table = heap.alloc_value(HeapObject::HashTable(HashTable::new()));
    let size = object_size(&heap, table).unwrap();

    assert!(!size.is_exact());
    let slot = constant(ARRAY_SLOT);
    assert_eq!(
        size.bytes(),
        HASH_TABLE_HEADER_SLOTS * slot + HashTable::new().capacity() as u64 * slot
    );
}

#[test]
fn test_hash_table_entries_are_charged() {
    let mut heap = GcHeap::new();
    let table = heap.alloc_value(HeapObject::HashTable(HashTable::new()));
    let empty = object_size(&heap, table).unwrap().bytes();

    let key = heap.string("key");
    let value = heap.float(1.0);
    heap.hash_table_put(table, key, value).unwrap();

    let filled = object_size(&heap, table).unwrap().bytes();
    assert_eq!(filled, empty + string_size("key") + constant(FLOAT));
}

fn char_table_overhead() -> u64 {
    CHAR_TABLE_HEADER_SLOTS * constant(ARRAY_SLOT)
}

#[test]
fn test_char_table_charges_values_extras_and_parent() {
    let mut heap = GcHeap::new();
    let shared = heap.string("word");

    let parent = heap.alloc_value(HeapObject::CharTable(CharTable::new(
        Value::Nil,
        shared,
        0,
    )));

    let mut child = CharTable::new(Value::Nil, Value::Nil, 1);
    child.set_range('a' as u32, 'z' as u32, shared).unwrap();
    child.set_extra(0, Value::Integer(5)).unwrap();
    child.set_parent(parent);
    let child = heap.alloc_value(HeapObject::CharTable(child));

    let size = object_size(&heap, child).unwrap();
    assert!(!size.is_exact());
    assert_eq!(size.bytes(), 2 * char_table_overhead() + string_size("word"));
}

#[test]
fn test_char_table_skips_shadowed_range_values() {
    let mut heap = GcHeap::new();
    let hidden = heap.string("hidden");
    let visible = heap.string("visible");

    let mut table = CharTable::new(Value::Nil, Value::Nil, 0);
    table.set('q' as u32, hidden).unwrap();
    table.set_range('a' as u32, 'z' as u32, visible).unwrap();
    let table = heap.alloc_value(HeapObject::CharTable(table));

    assert_eq!(
        object_size(&heap, table).unwrap().bytes(),
        char_table_overhead() + string_size("visible")
    );
}

#[test]
fn test_char_table_self_parent_terminates() {
    let mut heap = GcHeap::new();
    let table = heap.alloc_value(HeapObject::CharTable(CharTable::new(
        Value::Nil,
        Value::Nil,
        0,
    )));
    let Value::Gc(handle) = table else {
        unreachable!();
    };
    match heap.get_mut(handle) {
        HeapObject::CharTable(chars) => chars.set_parent(table),
        other => panic!("expected char-table, got {}", other.type_name()),
    }

    assert_eq!(
        object_size(&heap, table),
        Ok(SizeEstimate::approximate(char_table_overhead()))
    );
}

#[test]
fn test_approximate_part_makes_total_approximate() {
    let mut heap = GcHeap::new();
    let bits = heap.alloc_value(HeapObject::BoolVector(BoolVector::new(20, false)));
    let text = heap.string("abc");
    let root = heap.vector(vec![text, bits]);

    let size = object_size(&heap, root).unwrap();
    assert!(!size.is_exact());
    assert!(matches!(
        object_size(&heap, text),
        Ok(SizeEstimate::Exact(_))
    ));
}

#[test]
fn test_buffer_charges_text_gap_and_locals() {
    let mut heap = GcHeap::new();
    let mut buffer = Buffer::new("*scratch*");
    buffer.insert(0, "hello").unwrap();
    let sym = heap.intern("fill-column");
    buffer.set_local(sym, Value::Integer(70));
    let text_and_gap = (buffer.len_bytes() + buffer.gap_size()) as u64;

    let handle = heap.alloc_value(HeapObject::Buffer(buffer));
    let size = object_size(&heap, handle).unwrap();
    assert!(!size.is_exact());
    assert_eq!(
        size.bytes(),
        text_and_gap + constant(SYMBOL) + string_size("fill-column")
    );
}

#[test]
fn test_marker_uses_misc_without_recursing() {
    let mut heap = GcHeap::new();
    let Value::Gc(buffer) = heap.alloc_value(HeapObject::Buffer(Buffer::new("b"))) else {
        unreachable!();
    };
    let marker = heap.alloc_value(HeapObject::Marker(Marker {
        buffer: Some(buffer),
        charpos: 1,
    }));

    assert_eq!(
        object_size(&heap, marker),
        Ok(SizeEstimate::approximate(constant(MISC)))
    );
}

#[test]
fn test_nested_call_shares_visited_set() {
    let mut heap = GcHeap::new();
    let shared = heap.string("shared");
    let holder = heap.vector(vec![shared]);

    let mut visited = VisitedSet::new();
    let first = object_size_with(&heap, shared, &mut visited).unwrap();
    assert_eq!(first, SizeEstimate::exact(string_size("shared")));

    let again = object_size_with(&heap, shared, &mut visited).unwrap();
    assert_eq!(again, SizeEstimate::ZERO);

    let rest = object_size_with(&heap, holder, &mut visited).unwrap();
    assert_eq!(
        rest,
        SizeEstimate::exact(constant(ARRAY) + constant(ARRAY_SLOT))
    );
}

#[test]
fn test_missing_layout_constant_is_reported() {
    let mut heap = GcHeap::new();
    let f = heap.float(1.0);
    let layout = LayoutTable::from_entries([(PAIR, 16)]);
    let sizer = Sizer::with_layout(&heap, &layout);

    assert_eq!(
        sizer.object_size(f),
        Err(SizeError::MissingLayoutConstant {
            name: FLOAT.to_string()
        })
    );
}

#[test]
fn test_global_layout_matches_heap_stats() {
    let stats = GcHeap::new().stats();
    let layout = LayoutTable::global();
    for stat in &stats.kinds {
        assert_eq!(layout.lookup(stat.name), Ok(stat.size as u64));
    }
    assert_eq!(layout.len(), stats.kinds.len());
}

#[test]
fn test_collection_does_not_change_surviving_size() {
    let mut heap = GcHeap::new();
    let keep = heap.list(&[Value::Integer(1), Value::Integer(2)]);
    let _garbage = heap.vector(vec![Value::Nil; 8]);
    let before = exact(keep, &heap);

    heap.collect(&[keep]);
    assert_eq!(exact(keep, &heap), before);
}
