//! Benchmarks for the cross-run aggregator.

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use evoplot::pipeline::{Bootstrap, Series, aggregate};
use evoplot::schema::BootstrapConfig;

fn synthetic_series(runs: usize, steps: usize) -> BTreeMap<String, Series> {
    (0..runs)
        .map(|run| {
            let series: Series = (0..steps)
                .map(|step| {
                    let step = step as f64;
                    (step * 100.0, (step * 0.01).sin() + run as f64 * 0.001)
                })
                .collect();
            (run.to_string(), series)
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for (runs, steps) in [(4, 100), (20, 500), (50, 2000)] {
        let series = synthetic_series(runs, steps);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", runs, steps)),
            &series,
            |b, series| {
                b.iter(|| aggregate(black_box(series), None));
            },
        );
    }

    group.finish();
}

fn bench_aggregate_with_ci(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_ci");

    let series = synthetic_series(20, 100);
    for resamples in [100, 1000] {
        let config = BootstrapConfig {
            resamples,
            confidence: 0.95,
            seed: Some(42),
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(resamples),
            &config,
            |b, config| {
                let mut bootstrap = Bootstrap::new(config);
                b.iter(|| aggregate(black_box(&series), Some(&mut bootstrap)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_aggregate_with_ci);
criterion_main!(benches);
