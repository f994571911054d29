//! Benchmarks for the render path and loop synthesis.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Strip primitives (EQ stages, analyser)
//!   - scenarios/*  Voice graphs, full engine blocks, offline loop bounces

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_eq,
    dsp::bench_analyzer,
    scenarios::bench_voices,
    scenarios::bench_engine,
    scenarios::bench_synthesis,
);
criterion_main!(benches);
