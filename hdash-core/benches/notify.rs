//! Benchmarks for state writes fanning out to bound text nodes.
//!
//! Run with: cargo bench -p hdash-core --bench notify

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hdash_core::dom::{shared, Document};
use hdash_core::{Engine, EngineConfig};
use std::hint::black_box;

/// An engine whose root holds `nodes` paragraphs, each interpolating
/// `count` and `label`.
fn mount(nodes: usize) -> Engine {
    let mut document = Document::new();
    let app = document.create_element("div");
    document.set_attribute(app, "id", "app").unwrap();
    document.append_child(document.root(), app).unwrap();
    for _ in 0..nodes {
        let p = document.create_element("p");
        let text = document.create_text("{ label }: { count }");
        document.append_child(app, p).unwrap();
        document.append_child(p, text).unwrap();
    }

    Engine::new(
        shared(document),
        "#app",
        EngineConfig::new().value("count", 0).value("label", "n"),
    )
    .unwrap()
}

fn bench_keyed_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify/keyed");

    for nodes in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(nodes as u64));
        let engine = mount(nodes);
        let mut n = 0_i64;
        group.bench_with_input(BenchmarkId::new("set", nodes), &(), |b, _| {
            b.iter(|| {
                n += 1;
                engine.state().set("count", black_box(n)).unwrap();
            })
        });
    }

    group.finish();
}

fn bench_unchanged_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("notify/unchanged");

    for nodes in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(nodes as u64));
        let engine = mount(nodes);
        group.bench_with_input(BenchmarkId::new("set", nodes), &(), |b, _| {
            b.iter(|| engine.state().set("label", black_box("n")).unwrap())
        });
    }

    group.finish();
}

fn bench_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("mount");

    for nodes in [10, 100, 1_000] {
        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::from_parameter(nodes), &nodes, |b, &nodes| {
            b.iter(|| black_box(mount(nodes)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_keyed_write, bench_unchanged_write, bench_mount);
criterion_main!(benches);
