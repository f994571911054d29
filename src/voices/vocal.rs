//! Vocal voice.
//!
//! An "ooh" approximation: three sine partials at f, 2f and 3f weighted
//! 0.6 / 0.3 / 0.1 act as a crude formant. Each partial carries the same
//! 5.5 Hz vibrato (±20 cents), and a slow gain curve adds a breathing swell.

use crate::graph::{
    envelope::EnvNode,
    extensions::NodeExt,
    filter::FilterNode,
    lfo::LfoNode,
    oscillator::{OscNode, OscParam},
    GraphNode,
};

/// Release time of a vocal note in seconds.
pub const VOCAL_RELEASE: f32 = 0.1;

const VIBRATO_RATE: f32 = 5.5;
const VIBRATO_CENTS: f32 = 20.0;

fn partial(ratio: f32) -> impl GraphNode {
    OscNode::sine()
        .with_ratio(ratio)
        .modulate(LfoNode::sine(VIBRATO_RATE), OscParam::Detune, VIBRATO_CENTS)
}

/// Create a vocal voice. Responds to note pitch.
pub fn vocal() -> impl GraphNode {
    partial(1.0)
        .mix(partial(2.0), 0.3 / 0.9)
        .mix(partial(3.0), 0.1)
        .amplify(LfoNode::sine(1.5).with_range(0.8, 1.0))
        .amplify(EnvNode::adsr(0.06, 0.1, 0.85, VOCAL_RELEASE))
        .through(FilterNode::lowpass(3_000.0))
}
