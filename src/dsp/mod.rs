//! Low-level DSP primitives used by the graph nodes, the voices and the
//! channel strips.
//!
//! Everything here is allocation-free once constructed, so it is safe to run
//! inside the render callback.

/// Constant, modulated and ramped gain.
pub mod amplify;
/// Spectrum snapshot and 0-100 meter level.
pub mod analyzer;
/// ADSR and percussive envelopes.
pub mod envelope;
/// State-variable filter with pass, shelf and bell responses.
pub mod filter;
/// Oscillator waveforms and seeded noise.
pub mod oscillator;
/// Equal-power stereo panner.
pub mod pan;

pub use envelope::EnvelopeState;
