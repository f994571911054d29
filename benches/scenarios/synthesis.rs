//! Benchmarks for offline loop synthesis.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopmix::{generate_loop, InstrumentType};

pub fn bench_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synthesis");
    group.sample_size(10);

    for instrument in InstrumentType::ALL {
        group.bench_with_input(
            BenchmarkId::new("one_cycle", instrument),
            &instrument,
            |b, &instrument| {
                b.iter(|| generate_loop(black_box(instrument), instrument.cycle_seconds(), 48_000))
            },
        );
    }

    group.finish();
}
