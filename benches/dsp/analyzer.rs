//! Benchmarks for the meter analyser.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopmix::{dsp::analyzer::Analyzer, AnalyzerConfig};

use crate::BLOCK_SIZES;

pub fn bench_analyzer(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/analyzer");
    let config = AnalyzerConfig::default();

    for &size in BLOCK_SIZES {
        let left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();

        let mut analyzer = Analyzer::new(&config);
        group.bench_with_input(BenchmarkId::new("push_analyse", size), &size, |b, _| {
            b.iter(|| {
                analyzer.push(black_box(&left));
                black_box(analyzer.analyse());
            })
        });

        let mut analyzer = Analyzer::new(&config);
        group.bench_with_input(BenchmarkId::new("downmix_analyse", size), &size, |b, _| {
            b.iter(|| {
                analyzer.push_downmix(black_box(&left), black_box(&right));
                black_box(analyzer.analyse());
            })
        });
    }

    group.finish();
}
