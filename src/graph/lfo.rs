use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

A sub-audio oscillator that moves a parameter or an amplitude over time. It
ignores the note pitch and always runs at its own rate.

Output is bipolar [-1, +1] by default, which suits `.modulate()` depth:

  // Vibrato: ±20 cents at 5.5 Hz
  OscNode::sine().modulate(LfoNode::sine(5.5), OscParam::Detune, 20.0)

`.with_range(min, max)` maps the swing onto [min, max] instead. That turns the
LFO into a gain curve for `.amplify()`:

  // Beat pulse: gain swings between 0.7 and 1.0 twice a second
  bass.amplify(LfoNode::sine(2.0).with_range(0.7, 1.0))

The phase restarts at note-on, so a note-scoped LFO sounds identical every
time the note is rendered.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32,
    offset: f32,
    scale: f32,
}

impl LfoNode {
    fn new(osc: OscillatorBlock, frequency: f32) -> Self {
        Self {
            osc,
            frequency,
            offset: 0.0,
            scale: 1.0,
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(OscillatorBlock::sine(), frequency)
    }

    /// Map the [-1, +1] swing onto [min, max].
    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        self.scale = 0.5 * (max - min);
        self.offset = min + self.scale;
        self
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let lfo_ctx = RenderCtx::from_freq(ctx.sample_rate, self.frequency, 1.0);
        self.osc.render(out, &lfo_ctx);

        if self.scale != 1.0 || self.offset != 0.0 {
            for sample in out.iter_mut() {
                *sample = self.offset + *sample * self.scale;
            }
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(48_000.0, 440.0, 1.0)
    }

    #[test]
    fn default_swing_is_bipolar() {
        let mut lfo = LfoNode::sine(5.0);
        let mut buffer = vec![0.0; 48_000];
        lfo.render_block(&mut buffer, &ctx());
        assert!(buffer.iter().all(|&s| (-1.0..=1.0).contains(&s)));
        assert!(buffer.iter().any(|&s| s < -0.99));
        assert!(buffer.iter().any(|&s| s > 0.99));
    }

    #[test]
    fn range_maps_swing() {
        let mut lfo = LfoNode::sine(2.0).with_range(0.7, 1.0);
        let mut buffer = vec![0.0; 48_000];
        lfo.render_block(&mut buffer, &ctx());

        let min = buffer.iter().cloned().fold(f32::MAX, f32::min);
        let max = buffer.iter().cloned().fold(f32::MIN, f32::max);
        assert!((min - 0.7).abs() < 1e-3, "min {min}");
        assert!((max - 1.0).abs() < 1e-3, "max {max}");
        // phase 0 sits at the centre of the range
        assert!((buffer[0] - 0.85).abs() < 1e-6);
    }

    #[test]
    fn ignores_note_frequency() {
        let mut a = LfoNode::sine(5.0);
        let mut b = LfoNode::sine(5.0);
        let mut buffer_a = vec![0.0; 512];
        let mut buffer_b = vec![0.0; 512];
        a.render_block(&mut buffer_a, &RenderCtx::from_freq(48_000.0, 440.0, 1.0));
        b.render_block(&mut buffer_b, &RenderCtx::from_freq(48_000.0, 880.0, 1.0));
        assert_eq!(buffer_a, buffer_b);
    }

    #[test]
    fn note_on_restarts_phase() {
        let mut lfo = LfoNode::sine(5.0);
        let mut first = vec![0.0; 300];
        lfo.render_block(&mut first, &ctx());
        lfo.note_on(&ctx());
        let mut second = vec![0.0; 300];
        lfo.render_block(&mut second, &ctx());
        assert_eq!(first, second);
    }
}
