//! Snare drum voice.
//!
//! A decaying triangle tone for the drum head plus high-passed noise for the
//! wires. The noise decays a little slower than the tone, which gives the
//! snare its tail.

use crate::graph::{
    envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode, GraphNode,
};

/// Create a snare drum voice. `seed` picks the noise sequence for this hit.
pub fn snare(seed: u64) -> impl GraphNode {
    let body = OscNode::triangle()
        .with_frequency(185.0)
        .amplify(EnvNode::percussive(0.001, 28.0));

    let rattle = OscNode::noise(seed)
        .through(FilterNode::highpass(2_000.0))
        .amplify(EnvNode::percussive(0.001, 22.0));

    body.mix(rattle, 0.6)
}
