//! Pad voice - one note of a sustained chord.
//!
//! A sine with a soft octave partial, a slow amplitude LFO, and a 400 ms
//! attack. Chords are built by triggering three of these together.

use crate::graph::{
    envelope::EnvNode, extensions::NodeExt, lfo::LfoNode, oscillator::OscNode, GraphNode,
};

/// Release time of a pad note in seconds.
pub const PAD_RELEASE: f32 = 0.5;

/// Create a pad voice. Responds to note pitch.
pub fn pad() -> impl GraphNode {
    OscNode::sine()
        .mix(OscNode::sine().with_ratio(2.0), 0.2)
        .amplify(LfoNode::sine(0.5).with_range(0.7, 1.0))
        .amplify(EnvNode::adsr(0.4, 0.3, 0.8, PAD_RELEASE))
}
