//! Criterion benchmarks for pool evaluation.
//!
//! Run with: `cargo bench -p quantpulse-runner`
//!
//! Measures a full evaluation cycle (indicators, classification, anomaly,
//! cross-section, store updates) over synthetic pools of increasing size,
//! sequential vs rayon.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quantpulse_core::collaborators::InMemorySeverityStore;
use quantpulse_runner::{evaluate_pool, synthetic_pool, EngineConfig, SyntheticSpec};

fn symbols(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("SYM{i:03}")).collect()
}

fn bench_evaluate_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate_pool");
    let spec = SyntheticSpec {
        bars: 252,
        ..SyntheticSpec::default()
    };

    for size in [5, 25, 100] {
        let pool = match synthetic_pool(&symbols(size), &spec, 42) {
            Ok(pool) => pool,
            Err(e) => panic!("synthetic pool: {e}"),
        };
        for parallel in [false, true] {
            let mut config = EngineConfig::default();
            config.engine.parallel = parallel;
            let label = if parallel { "rayon" } else { "sequential" };

            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    let store = InMemorySeverityStore::new();
                    let _ = evaluate_pool(black_box(&pool), &config, &HashMap::new(), &store);
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_pool);
criterion_main!(benches);
