use crate::{
    dsp::filter::SVFilter,
    graph::node::{GraphNode, RenderCtx},
};

/*
Filter Node
===========

Wraps the state-variable filter for use inside voice graphs. The loop voices
use the pass responses to carve noise and harmonics:

  Highpass   Hi-hat noise above ~7 kHz, snare rattle above ~2 kHz.
  Lowpass    Takes the edge off the bass and vocal stacks.
  Bandpass   Kick click band.

Example usage:
  let hat = OscNode::noise(3).through(FilterNode::highpass(7_000.0));

The EQ responses (shelves, bell) are driven directly by the channel strip and
do not go through this node.
*/

pub struct FilterNode {
    filter: SVFilter,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::lowpass(cutoff_hz),
        }
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::highpass(cutoff_hz),
        }
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self {
            filter: SVFilter::bandpass(cutoff_hz),
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }

    /// Clear the integrator state so every hit starts from rest.
    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.filter.reset();
    }
}
