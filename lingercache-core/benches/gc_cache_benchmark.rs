use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lingercache_core::{Facet, GcCache};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_add_instance(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_instance");

    for facets in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::new("shared_instance", facets),
            facets,
            |b, &facets| {
                b.iter(|| {
                    let cache: GcCache<usize, u64> = GcCache::new();
                    let instance = Arc::new(42u64);
                    let handles: Vec<_> = (0..facets).map(Facet::new).collect();
                    for facet in &handles {
                        cache.add_instance(facet, Arc::clone(&instance));
                    }
                    black_box(cache.reference_count(&instance));
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("distinct_instances", facets),
            facets,
            |b, &facets| {
                b.iter(|| {
                    let cache: GcCache<usize, u64> = GcCache::new();
                    let handles: Vec<_> = (0..facets).map(Facet::new).collect();
                    for (i, facet) in handles.iter().enumerate() {
                        cache.add_instance(facet, Arc::new(i as u64));
                    }
                    black_box(cache.len());
                });
            },
        );
    }

    group.finish();
}

fn bench_duplicate_registration(c: &mut Criterion) {
    let cache: GcCache<usize, u64> = GcCache::new();
    let instance = Arc::new(7u64);
    let facet = Facet::new(0);
    cache.add_instance(&facet, Arc::clone(&instance));

    c.bench_function("duplicate_registration", |b| {
        b.iter(|| cache.add_instance(black_box(&facet), Arc::clone(&instance)));
    });
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_dead_instances");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("all_dead", size), size, |b, &size| {
            b.iter(|| {
                let cache: GcCache<usize, u64> = GcCache::new();
                for i in 0..size {
                    cache.add_instance(&Facet::new(i), Arc::new(i as u64));
                }
                black_box(cache.get_dead_instances(Duration::ZERO));
            });
        });

        group.bench_with_input(BenchmarkId::new("all_live", size), size, |b, &size| {
            let cache: GcCache<usize, u64> = GcCache::new();
            let handles: Vec<_> = (0..size).map(Facet::new).collect();
            for (i, facet) in handles.iter().enumerate() {
                cache.add_instance(facet, Arc::new(i as u64));
            }
            b.iter(|| black_box(cache.get_dead_instances(Duration::ZERO)));
        });
    }

    group.finish();
}

fn bench_concurrent_link_drop(c: &mut Criterion) {
    c.bench_function("concurrent_link_drop_4_threads", |b| {
        b.iter(|| {
            let cache: Arc<GcCache<usize, u64>> = Arc::new(GcCache::new());
            let instance = Arc::new(1u64);
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let cache = Arc::clone(&cache);
                    let instance = Arc::clone(&instance);
                    thread::spawn(move || {
                        for i in 0..250 {
                            let facet = Facet::new(t * 250 + i);
                            cache.add_instance(&facet, Arc::clone(&instance));
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            black_box(cache.get_dead_instances(Duration::ZERO));
        });
    });
}

criterion_group!(
    benches,
    bench_add_instance,
    bench_duplicate_registration,
    bench_sweep,
    bench_concurrent_link_drop
);
criterion_main!(benches);
