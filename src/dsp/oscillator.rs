use std::f32::consts::TAU;

use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Triangle,
    Noise,
}

/// Phase-accumulating oscillator. Phase is kept in `[0, 1)`.
///
/// Noise draws from a seeded generator so two blocks built with the same seed
/// render identical samples.
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
    rng: StdRng,
}

const DEFAULT_NOISE_SEED: u64 = 0x5EED_1005;

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            rng: StdRng::seed_from_u64(DEFAULT_NOISE_SEED),
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn noise() -> Self {
        Self::new(OscillatorWaveform::Noise)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Restart the cycle at phase zero (sine and triangle start at 0.0).
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    fn sample_at(&mut self, phase: f32) -> f32 {
        match self.waveform {
            OscillatorWaveform::Sine => (TAU * phase).sin(),
            OscillatorWaveform::Triangle => {
                // 0 → 1 → 0 → -1 → 0 over one cycle
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }
            OscillatorWaveform::Noise => self.rng.gen_range(-1.0..=1.0),
        }
    }

    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let increment = ctx.frequency / ctx.sample_rate;
        for sample in out.iter_mut() {
            *sample = self.sample_at(self.phase);
            self.phase += increment;
            self.phase -= self.phase.floor();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(freq: f32) -> RenderCtx {
        RenderCtx::from_freq(48_000.0, freq, 1.0)
    }

    #[test]
    fn every_waveform_stays_in_unit_range() {
        for waveform in [
            OscillatorWaveform::Sine,
            OscillatorWaveform::Triangle,
            OscillatorWaveform::Noise,
        ] {
            let mut osc = OscillatorBlock::new(waveform);
            let mut buffer = vec![0.0; 1024];
            osc.render(&mut buffer, &ctx(440.0));
            assert!(
                buffer.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{waveform:?} left [-1, 1]"
            );
        }
    }

    #[test]
    fn seeded_noise_is_repeatable() {
        let mut a = OscillatorBlock::noise().with_seed(42);
        let mut b = OscillatorBlock::noise().with_seed(42);
        let mut buf_a = vec![0.0; 256];
        let mut buf_b = vec![0.0; 256];
        a.render(&mut buf_a, &ctx(0.0));
        b.render(&mut buf_b, &ctx(0.0));
        assert_eq!(buf_a, buf_b);
    }

    #[test]
    fn triangle_starts_at_zero_and_peaks_at_quarter_cycle() {
        let mut osc = OscillatorBlock::triangle();
        // 1 kHz at 48 kHz → 48 samples per cycle
        let mut buffer = vec![0.0; 48];
        osc.render(&mut buffer, &ctx(1_000.0));
        assert_eq!(buffer[0], 0.0);
        assert!((buffer[12] - 1.0).abs() < 1e-4);
        assert!((buffer[36] + 1.0).abs() < 1e-4);
    }
}
