use crate::{
    dsp::envelope::{Envelope, EnvelopeState},
    graph::node::{GraphNode, RenderCtx},
};

/// Envelope generator as a graph node.
///
/// Renders the envelope level scaled by the note velocity, so it is normally
/// used as the modulator side of `.amplify()`:
///
/// ```ignore
/// let hat = OscNode::noise(7)
///     .through(FilterNode::highpass(7_000.0))
///     .amplify(EnvNode::percussive(0.001, 60.0));
/// ```
pub struct EnvNode {
    env: Envelope,
}

impl EnvNode {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            env: Envelope::adsr(attack, decay, sustain, release),
        }
    }

    /// Attack ramp (seconds) then exponential decay at `decay_rate` (1/s).
    pub fn percussive(attack: f32, decay_rate: f32) -> Self {
        Self {
            env: Envelope::percussive(attack, decay_rate),
        }
    }

    pub fn state(&self) -> EnvelopeState {
        self.env.state()
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx);
        if ctx.velocity != 1.0 {
            for sample in out.iter_mut() {
                *sample *= ctx.velocity;
            }
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.env.note_on();
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.env.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.env.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_triggered() {
        let mut env = EnvNode::adsr(0.01, 0.05, 0.5, 0.1);
        let ctx = RenderCtx::from_freq(48_000.0, 440.0, 1.0);
        let mut buffer = vec![1.0; 64];
        env.render_block(&mut buffer, &ctx);

        assert!(!env.is_active());
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn velocity_scales_level() {
        let ctx_full = RenderCtx::from_freq(48_000.0, 440.0, 1.0);
        let ctx_soft = RenderCtx::from_freq(48_000.0, 440.0, 0.5);
        let mut full = EnvNode::percussive(0.001, 30.0);
        let mut soft = EnvNode::percussive(0.001, 30.0);
        full.note_on(&ctx_full);
        soft.note_on(&ctx_soft);

        let mut a = vec![0.0; 256];
        let mut b = vec![0.0; 256];
        full.render_block(&mut a, &ctx_full);
        soft.render_block(&mut b, &ctx_soft);

        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x * 0.5 - y).abs() < 1e-6);
        }
    }

    #[test]
    fn release_returns_to_silence() {
        let ctx = RenderCtx::from_freq(1_000.0, 440.0, 1.0);
        let mut env = EnvNode::adsr(0.01, 0.01, 0.5, 0.02);
        env.note_on(&ctx);
        let mut buffer = vec![0.0; 40];
        env.render_block(&mut buffer, &ctx);
        env.note_off(&ctx);
        env.render_block(&mut buffer, &ctx);

        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(buffer[39], 0.0);
    }
}
