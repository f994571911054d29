//! Kick drum voice.
//!
//! A 50 Hz sine body whose pitch starts 90 Hz higher and falls within a few
//! tens of milliseconds, plus a short band-passed noise click for the beater.
//!
//! # How It Works
//!
//! 1. Sine body, phase restarted at every hit so the hit starts at 0.0
//! 2. Percussive envelope drives the pitch drop through `OscParam::Frequency`
//! 3. Slower percussive envelope shapes the body amplitude
//! 4. Noise click through a band-pass, decaying in ~40 ms

use crate::graph::{
    envelope::EnvNode,
    extensions::NodeExt,
    filter::FilterNode,
    oscillator::{OscNode, OscParam},
    GraphNode,
};

/// Create a kick drum voice. The note pitch is ignored.
pub fn kick(seed: u64) -> impl GraphNode {
    let body = OscNode::sine()
        .with_frequency(50.0)
        .modulate(EnvNode::percussive(0.0005, 35.0), OscParam::Frequency, 90.0)
        .amplify(EnvNode::percussive(0.002, 9.0));

    let click = OscNode::noise(seed)
        .through(FilterNode::bandpass(3_000.0))
        .amplify(EnvNode::percussive(0.001, 120.0));

    body.mix(click, 0.15)
}
