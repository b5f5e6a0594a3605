use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use memsize::memsize::{SizeReport, Sizer, object_size};
use memsize::runtime::gc::GcHeap;
use memsize::runtime::value::Value;

fn bench_long_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_size/list");

    for &size in &[100, 1_000, 10_000] {
        let mut heap = GcHeap::new();
        let items: Vec<Value> = (0..size as i64).map(Value::Integer).collect();
        let list = heap.list(&items);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(object_size(&heap, black_box(list))));
        });
    }

    group.finish();
}

fn bench_wide_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_size/vector_of_strings");

    for &size in &[100, 1_000, 10_000] {
        let mut heap = GcHeap::new();
        let slots: Vec<Value> = (0..size)
            .map(|i| heap.string(&format!("item-{}", i)))
            .collect();
        let vector = heap.vector(slots);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(object_size(&heap, black_box(vector))));
        });
    }

    group.finish();
}

fn bench_shared_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_size/shared_report");

    for &size in &[100, 1_000] {
        let mut heap = GcHeap::new();
        let shared = heap.string("shared");
        let roots: Vec<(String, Value)> = (0..size)
            .map(|i| {
                let cell = heap.cons(shared, Value::Integer(i as i64));
                (format!("root-{}", i), heap.vector(vec![cell, shared]))
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let sizer = Sizer::new(&heap);
            b.iter(|| black_box(SizeReport::build(&sizer, black_box(roots.as_slice()))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_long_list, bench_wide_vector, bench_shared_graph);
criterion_main!(benches);
