//! Benchmarks for the three EQ stages.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopmix::dsp::filter::SVFilter;
use loopmix::graph::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_eq(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/eq");
    let ctx = RenderCtx::from_freq(48_000.0, 0.0, 1.0);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut high = SVFilter::high_shelf(10_000.0, 6.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("high_shelf", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                high.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        let mut mid = SVFilter::bell(1_000.0, 1.0, -4.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("bell", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                mid.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // all three stages, as one strip side runs them
        let mut chain = [
            SVFilter::high_shelf(10_000.0, 3.0),
            SVFilter::bell(1_000.0, 1.0, -2.0),
            SVFilter::low_shelf(100.0, 5.0),
        ];
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("three_band", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for stage in chain.iter_mut() {
                    stage.render(black_box(&mut buffer), black_box(&ctx));
                }
            })
        });

        // 0 dB stages pass through untouched
        let mut flat = SVFilter::low_shelf(100.0, 0.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("flat", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                flat.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
