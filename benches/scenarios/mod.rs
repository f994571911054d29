//! Scenario benchmarks.
//!
//! Voice graphs as the bouncer renders them, the engine rendering a full
//! four-channel session, and whole-loop synthesis.

mod engine;
mod synthesis;
mod voices;

pub use engine::bench_engine;
pub use synthesis::bench_synthesis;
pub use voices::bench_voices;
