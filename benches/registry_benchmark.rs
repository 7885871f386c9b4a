//! Registry benchmark: Measure handle allocate/release churn.
//!
//! Target: < 20ns per allocate + release pair

use casement::actor::HandleRegistry;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn allocate_release_single(c: &mut Criterion) {
    let mut registry = HandleRegistry::new();

    c.bench_function("registry_alloc_release_single", |b| {
        b.iter(|| {
            let handle = registry.allocate(black_box(7_u64));
            if let Some(handle) = handle {
                black_box(registry.release(handle));
            }
        });
    });
}

fn allocate_release_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_churn");

    for live in [16_usize, 256, 4096] {
        let mut registry = HandleRegistry::new();
        let handles: Vec<_> = (0..live).filter_map(|i| registry.allocate(i)).collect();

        group.bench_with_input(BenchmarkId::from_parameter(live), &handles, |b, handles| {
            let mut next = 0;
            b.iter(|| {
                // Release one slot in the middle of the table and refill it.
                let handle = handles[next % handles.len()];
                let value = registry.release(handle);
                if let Some(value) = value {
                    black_box(registry.allocate(value));
                }
                next += 1;
            });
        });
    }

    group.finish();
}

fn lookup_hit(c: &mut Criterion) {
    let mut registry = HandleRegistry::new();
    let handles: Vec<_> = (0..1024_u32).filter_map(|i| registry.allocate(i)).collect();

    c.bench_function("registry_lookup_1024", |b| {
        b.iter(|| {
            for handle in &handles {
                black_box(registry.lookup(*handle));
            }
        });
    });
}

criterion_group!(benches, allocate_release_single, allocate_release_churn, lookup_hit);
criterion_main!(benches);
