//! Composable building blocks for the loop voices.
//!
//! Graph nodes wrap the DSP primitives with note events, modulation, and
//! block rendering. The `extensions` module adds the fluent helpers the
//! voices are written with.

/// Multiply two signals together (envelope or gain curve).
pub mod amplify;
/// Envelope generator node.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.mix()`, etc.).
pub mod extensions;
/// State-variable filter node.
pub mod filter;
/// Low frequency oscillators for parameter and gain modulation.
pub mod lfo;
/// Linear mixing for parallel graphs.
pub mod mix;
/// Connect modulation sources to node parameters.
pub mod modulate;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators and noise sources.
pub mod oscillator;
/// Serial chaining of two nodes (source → effect).
pub mod through;

pub use extensions::NodeExt;
pub use node::{midi_note_to_freq, GraphNode, Modulatable, RenderCtx};
