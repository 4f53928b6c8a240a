//! Benchmarks for by-segment draining versus pass-through.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use queryflow::prelude::*;
use queryflow::testing::{by_segment_query, fixture_timestamp, plain_query, values};
use std::sync::Arc;

type Row = ResultElement<u64>;

fn chain(rows: usize) -> BoxedQueryRunner<Row> {
    let items = values(&(0..rows as u64).collect::<Vec<_>>());
    let scan = FnQueryRunner::new("scan", move |_query: Arc<Query>, _response: ResponseContext| {
        sequence::simple(items.clone())
    });
    RunnerChain::<Row>::new(scan)
        .by_segment("seg-bench", fixture_timestamp())
        .build()
}

fn by_segment_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("by_segment");

    for rows in [10, 1_000, 100_000] {
        let runner = chain(rows);
        let plain = Arc::new(plain_query());
        let flagged = Arc::new(by_segment_query());

        group.bench_with_input(BenchmarkId::new("pass_through", rows), &rows, |b, _| {
            b.to_async(&runtime).iter(|| async {
                let output = runner.run(Arc::clone(&plain), ResponseContext::new());
                black_box(sequence::to_list(output).await.unwrap())
            });
        });

        group.bench_with_input(BenchmarkId::new("envelope", rows), &rows, |b, _| {
            b.to_async(&runtime).iter(|| async {
                let output = runner.run(Arc::clone(&flagged), ResponseContext::new());
                black_box(sequence::to_list(output).await.unwrap())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, by_segment_benchmark);
criterion_main!(benches);
