//! Benchmarks for channel strip primitives.

mod analyzer;
mod eq;

pub use analyzer::bench_analyzer;
pub use eq::bench_eq;
