use crate::{
    dsp::amplify::multiply_in_place,
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a modulator (envelope, gain LFO, ring modulation).
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    pub fn new(signal: N, modulator: M) -> Self {
        Self {
            signal,
            modulator,
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        // no allocation: slice the preallocated scratch
        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.modulator.render_block(frames, ctx);

        multiply_in_place(out, frames);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
        self.modulator.note_off(ctx);
    }

    /// An envelope on either side ends the product.
    fn is_active(&self) -> bool {
        self.signal.is_active() && self.modulator.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{envelope::EnvNode, extensions::NodeExt, oscillator::OscNode};

    #[test]
    fn envelope_gates_oscillator() {
        let ctx = RenderCtx::from_freq(48_000.0, 220.0, 1.0);
        let mut voice = OscNode::sine().amplify(EnvNode::percussive(0.001, 200.0));

        let mut buffer = vec![0.0; 512];
        voice.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|&s| s == 0.0), "silent before note_on");

        voice.note_on(&ctx);
        voice.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().any(|&s| s.abs() > 0.1));
        assert!(voice.is_active());
    }

    #[test]
    fn inactive_once_envelope_finishes() {
        let ctx = RenderCtx::from_freq(48_000.0, 220.0, 1.0);
        let mut voice = OscNode::sine().amplify(EnvNode::percussive(0.001, 400.0));
        voice.note_on(&ctx);

        let mut buffer = vec![0.0; 1024];
        for _ in 0..48 {
            voice.render_block(&mut buffer, &ctx);
        }
        assert!(!voice.is_active());
    }
}
