use crate::dsp::oscillator::OscillatorBlock;
use crate::graph::node::{GraphNode, Modulatable, RenderCtx};

/*
Audio Oscillator
================

The raw material of every loop voice.

  Sine       Fundamental only. Kick body, bass and pad partials, vocal partials.
  Triangle   Weak odd harmonics. Snare body.
  Noise      No pitch. Snare rattle, hi-hats, kick click.

Pitch comes from one of two places:

  - the note being played (`ctx.frequency`), optionally multiplied by a
    partial ratio: `.with_ratio(2.0)` is the octave, `.with_ratio(1.5)` the fifth
  - a fixed frequency set with `.with_frequency(hz)`, for drums

Partials of one note are separate oscillators with different ratios. Their
phases all restart at note-on, so a stack of partials always starts from 0.0
and sums coherently.

Example usage:
  // Bass harmonic stack: fundamental + octave + fifth
  let stack = OscNode::sine()
      .mix(OscNode::sine().with_ratio(2.0), 0.3)
      .mix(OscNode::sine().with_ratio(1.5), 0.2);

  // Vibrato: a sub-audio LFO swings the detune ±20 cents
  let voice = OscNode::sine().modulate(LfoNode::sine(5.5), OscParam::Detune, 20.0);
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, `ctx.frequency` is ignored.
    base_frequency: Option<f32>,
    /// Fixed frequency after modulation.
    current_frequency: f32,
    /// Multiplier on the note frequency.
    ratio: f32,
    /// Detune in cents after modulation (100 cents = 1 semitone). Rests at 0.
    current_detune: f32,
}

/// Parameters that can be modulated on an oscillator
#[derive(Clone, Copy, Debug)]
pub enum OscParam {
    /// Fixed frequency in Hz (only for `with_frequency` oscillators)
    Frequency,
    /// Detune in cents
    Detune,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            base_frequency: None,
            current_frequency: 440.0,
            ratio: 1.0,
            current_detune: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    /// White noise from a seeded generator; equal seeds render equal noise.
    pub fn noise(seed: u64) -> Self {
        Self::new(OscillatorBlock::noise().with_seed(seed))
    }

    /// Use a fixed frequency regardless of the note pitch.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.base_frequency = Some(freq);
        self.current_frequency = freq;
        self
    }

    /// Play `ratio` × the note frequency (partials of a harmonic stack).
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.ratio = ratio;
        self
    }

    #[cfg(test)]
    pub(crate) fn current_frequency(&self) -> f32 {
        self.current_frequency
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let base_freq = match self.base_frequency {
            Some(_) => self.current_frequency,
            None => ctx.frequency * self.ratio,
        };

        let final_freq = if self.current_detune != 0.0 {
            base_freq * 2.0_f32.powf(self.current_detune / 1200.0)
        } else {
            base_freq
        };

        let modified_ctx = RenderCtx {
            frequency: final_freq,
            ..*ctx
        };
        self.osc.render(out, &modified_ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
        if let Some(base) = self.base_frequency {
            self.current_frequency = base;
        }
        self.current_detune = 0.0;
    }
}

impl Modulatable for OscNode {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            OscParam::Frequency => self.base_frequency.unwrap_or(440.0),
            OscParam::Detune => 0.0,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        match param {
            OscParam::Frequency => {
                self.current_frequency = (base + modulation).clamp(20.0, 20_000.0);
            }
            OscParam::Detune => {
                self.current_detune = (base + modulation).clamp(-200.0, 200.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_note(sample_rate, 69, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        assert!((buffer[sample_index] - expected).abs() < 1e-4);
    }

    #[test]
    fn ratio_scales_note_frequency() {
        let ctx = RenderCtx::from_freq(48_000.0, 100.0, 1.0);
        let mut fundamental = OscNode::sine();
        let mut octave = OscNode::sine().with_ratio(2.0);
        let mut a = vec![0.0f32; 480];
        let mut b = vec![0.0f32; 480];
        fundamental.render_block(&mut a, &ctx);
        octave.render_block(&mut b, &ctx);

        // the octave peaks at a quarter of its own period
        assert!((b[60] - a[120]).abs() < 1e-3);
        assert!((b[60] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn note_on_restarts_phase() {
        let ctx = RenderCtx::from_freq(48_000.0, 330.0, 1.0);
        let mut osc = OscNode::sine();
        let mut buffer = vec![0.0f32; 77];
        osc.render_block(&mut buffer, &ctx);

        osc.note_on(&ctx);
        osc.render_block(&mut buffer, &ctx);
        assert_eq!(buffer[0], 0.0);
    }

    #[test]
    fn detune_modulation_does_not_accumulate() {
        let mut osc = OscNode::sine();
        for _ in 0..10 {
            let base = osc.get_param(OscParam::Detune);
            osc.apply_modulation(OscParam::Detune, base, 10.0);
        }
        assert_eq!(osc.get_param(OscParam::Detune), 0.0);
        assert_eq!(osc.current_detune, 10.0);

        osc.note_on(&RenderCtx::from_freq(48_000.0, 440.0, 1.0));
        assert_eq!(osc.current_detune, 0.0);
    }
}
