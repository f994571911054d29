//! Closed hi-hat voice.
//!
//! A tight burst of high-passed noise. Velocity sets the accent level.

use crate::graph::{
    envelope::EnvNode, extensions::NodeExt, filter::FilterNode, oscillator::OscNode, GraphNode,
};

/// Create a closed hi-hat voice. `seed` picks the noise sequence for this hit.
pub fn hihat(seed: u64) -> impl GraphNode {
    OscNode::noise(seed)
        .through(FilterNode::highpass(7_000.0))
        .amplify(EnvNode::percussive(0.001, 60.0))
}
