//! Bass voice.
//!
//! A harmonic stack of sines on the note pitch: fundamental, octave and fifth
//! weighted 0.6 / 0.25 / 0.15. A 2 Hz gain LFO pulses the note once per beat
//! at 120 BPM.
//!
//! # How It Works
//!
//! 1. Three sines at f, 2f and 1.5f, phases aligned at note-on
//! 2. Beat pulse: gain swings between 0.75 and 1.0
//! 3. ADSR with a 10 ms attack and 150 ms release, so every note begins and
//!    ends at silence
//! 4. Low-pass takes the edge off the upper partials

use crate::graph::{
    envelope::EnvNode, extensions::NodeExt, filter::FilterNode, lfo::LfoNode,
    oscillator::OscNode, GraphNode,
};

/// Release time of a bass note in seconds.
pub const BASS_RELEASE: f32 = 0.15;

/// Create a bass voice. Responds to note pitch.
pub fn bass() -> impl GraphNode {
    OscNode::sine()
        .mix(OscNode::sine().with_ratio(2.0), 0.25 / 0.85)
        .mix(OscNode::sine().with_ratio(1.5), 0.15)
        .amplify(LfoNode::sine(2.0).with_range(0.75, 1.0))
        .amplify(EnvNode::adsr(0.01, 0.3, 0.7, BASS_RELEASE))
        .through(FilterNode::lowpass(900.0))
}
