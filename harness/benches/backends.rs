//! Compares the backends on add, exact lookup and longest-prefix lookup.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use echt::{Backend, BackendKind, Config, NoopSink};
use echt_harness::{Dataset, DatasetSpec};
use rand::rngs::StdRng;
use rand::SeedableRng;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn dataset(size: usize) -> Dataset {
    Dataset::synthetic(DatasetSpec {
        size,
        ..DatasetSpec::default()
    })
}

fn loaded(kind: BackendKind, dataset: &Dataset) -> Box<dyn Backend> {
    let mut backend = kind.build(&Config::default());
    backend.bulk_load(dataset.entries(), &mut NoopSink);
    backend
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for size in SIZES.iter() {
        let dataset = dataset(*size);

        for kind in BackendKind::ALL {
            group.bench_with_input(BenchmarkId::new(kind.name(), size), size, |b, _| {
                b.iter(|| {
                    let mut backend = kind.build(&Config::default());
                    for entry in dataset.entries() {
                        backend.add(&entry.name, &entry.values);
                    }
                    black_box(backend)
                });
            });
        }
    }

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    for size in SIZES.iter() {
        let dataset = dataset(*size);
        let mut rng = StdRng::seed_from_u64(1);
        let mut queries = dataset.sample(1_000, &mut rng);
        queries.extend(dataset.negatives(1_000, &mut rng));

        for kind in BackendKind::ALL {
            let backend = loaded(kind, &dataset);
            group.bench_with_input(BenchmarkId::new(kind.name(), size), size, |b, _| {
                b.iter(|| {
                    let mut found = 0usize;
                    for query in queries.iter() {
                        if let Some(values) = backend.get(query) {
                            found += values.len();
                        }
                    }
                    black_box(found)
                });
            });
        }
    }

    group.finish();
}

fn bench_lpm(c: &mut Criterion) {
    let mut group = c.benchmark_group("lpm");

    for size in SIZES.iter() {
        let dataset = dataset(*size);
        let mut rng = StdRng::seed_from_u64(2);
        let mut queries = dataset.lpm_queries(1_000, &mut rng);
        queries.extend(dataset.negatives(1_000, &mut rng));

        for kind in BackendKind::ALL {
            let backend = loaded(kind, &dataset);
            group.bench_with_input(BenchmarkId::new(kind.name(), size), size, |b, _| {
                b.iter(|| {
                    let mut matched = 0usize;
                    for query in queries.iter() {
                        if let Some(hit) = backend.longest_prefix_match(query) {
                            matched += hit.prefix.len();
                        }
                    }
                    black_box(matched)
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_add, bench_get, bench_lpm);
criterion_main!(benches);
