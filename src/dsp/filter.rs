use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
| type              | passes / shapes                | used by                 |
| ----------------- | ------------------------------ | ----------------------- |
| low-pass          | below cutoff                   | kick body, bass warmth  |
| high-pass         | above cutoff                   | hi-hat noise            |
| band-pass         | around cutoff                  | snare rattle            |
| low-shelf         | gain below the corner          | channel EQ low band     |
| high-shelf        | gain above the corner          | channel EQ high band    |
| bell (peaking)    | gain around the centre         | channel EQ mid band     |

Every response comes out of the same two-integrator state-variable core. The
core produces a band-pass (v1) and a low-pass (v2) tap for each input sample
(v0) and the response is a linear mix of the three:

    out = m0·v0 + m1·v1 + m2·v2

With A = 10^(gain_db / 40):

    bell        g = tan(πf/fs)       k = 1/(Q·A)   m = (1,  k(A²-1), 0)
    low-shelf   g = tan(πf/fs)/√A    k = 1/Q       m = (1,  k(A-1),  A²-1)
    high-shelf  g = tan(πf/fs)·√A    k = 1/Q       m = (A², k(1-A)A, 1-A²)

At 0 dB every EQ mix collapses to m = (1, 0, 0), so a flat EQ band passes
the signal through untouched.
*/

/// Shelves use a slope of 1, which is Q = 1/√2.
pub const SHELF_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Damping of the pass responses (Q = 0.5, no resonant peak).
const PASS_K: f32 = 2.0;

/// Corner frequencies are kept below this fraction of the sample rate.
const MAX_CUTOFF_RATIO: f32 = 0.45;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    LowShelf,
    HighShelf,
    Bell,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
}

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    g: f32,
    k: f32,
    m0: f32,
    m1: f32,
    m2: f32,
}

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32,
    ic2eq: f32,

    pub cutoff_hz: f32,
    /// Quality factor for the EQ responses.
    pub q: f32,
    pub gain_db: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            q: SHELF_Q,
            gain_db: 0.0,
            filter_type,
        }
    }

    fn with_cutoff(filter_type: FilterType, cutoff_hz: f32) -> Self {
        Self {
            cutoff_hz,
            ..Self::new(filter_type)
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::with_cutoff(FilterType::LowPass, cutoff_hz)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::with_cutoff(FilterType::HighPass, cutoff_hz)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::with_cutoff(FilterType::BandPass, cutoff_hz)
    }

    pub fn low_shelf(corner_hz: f32, gain_db: f32) -> Self {
        Self {
            gain_db,
            ..Self::with_cutoff(FilterType::LowShelf, corner_hz)
        }
    }

    pub fn high_shelf(corner_hz: f32, gain_db: f32) -> Self {
        Self {
            gain_db,
            ..Self::with_cutoff(FilterType::HighShelf, corner_hz)
        }
    }

    pub fn bell(center_hz: f32, q: f32, gain_db: f32) -> Self {
        Self {
            q: q.max(0.05),
            gain_db,
            ..Self::with_cutoff(FilterType::Bell, center_hz)
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    fn coefficients(&self, sample_rate: f32) -> Coefficients {
        let cutoff = self.cutoff_hz.clamp(1.0, sample_rate * MAX_CUTOFF_RATIO);
        let g = (PI * cutoff / sample_rate).tan();
        let a = 10.0_f32.powf(self.gain_db / 40.0);

        match self.filter_type {
            FilterType::LowPass => Coefficients { g, k: PASS_K, m0: 0.0, m1: 0.0, m2: 1.0 },
            FilterType::BandPass => Coefficients { g, k: PASS_K, m0: 0.0, m1: 1.0, m2: 0.0 },
            FilterType::HighPass => Coefficients { g, k: PASS_K, m0: 1.0, m1: -PASS_K, m2: -1.0 },
            FilterType::Bell => {
                let k = 1.0 / (self.q * a);
                Coefficients {
                    g,
                    k,
                    m0: 1.0,
                    m1: k * (a * a - 1.0),
                    m2: 0.0,
                }
            }
            FilterType::LowShelf => {
                let k = 1.0 / self.q;
                Coefficients {
                    g: g / a.sqrt(),
                    k,
                    m0: 1.0,
                    m1: k * (a - 1.0),
                    m2: a * a - 1.0,
                }
            }
            FilterType::HighShelf => {
                let k = 1.0 / self.q;
                Coefficients {
                    g: g * a.sqrt(),
                    k,
                    m0: a * a,
                    m1: k * (1.0 - a) * a,
                    m2: 1.0 - a * a,
                }
            }
        }
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let c = self.coefficients(ctx.sample_rate);

        for sample in buffer.iter_mut() {
            let input = *sample;
            let outputs = self.next_sample(input, c.k, c.g);
            *sample = c.m0 * input + c.m1 * outputs.bandpass + c.m2 * outputs.lowpass;
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn set_gain_db(&mut self, gain_db: f32) {
        self.gain_db = gain_db;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::GraphNode;
    use crate::graph::oscillator::OscNode;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len() / 2;
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    /// Steady-state peak of a unit sine at `freq` after passing `filter`.
    fn sine_response(filter: &mut SVFilter, freq: f32) -> f32 {
        filter.reset();
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, freq, 1.0);
        let mut osc = OscNode::sine();
        let mut buffer = vec![0.0f32; 8192];
        osc.render_block(&mut buffer, &ctx);
        filter.render(&mut buffer, &ctx);
        peak_after_transient(&buffer)
    }

    #[test]
    fn test_lowpass_basic() {
        let mut filter = SVFilter::lowpass(500.0);
        let mut buffer = vec![1.0; 128];
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);

        filter.render(&mut buffer, &ctx);
        assert!(buffer[127] > 0.99);
    }

    #[test]
    fn test_highpass_basic() {
        let mut filter = SVFilter::highpass(500.0);
        let mut buffer = vec![1.0; 128];
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);

        filter.render(&mut buffer, &ctx);
        assert!(buffer[127] < 0.001);
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let mut filter = SVFilter::bandpass(1_000.0);

        let pass_peak = sine_response(&mut filter, 1_000.0);
        let off_peak = sine_response(&mut filter, 200.0);
        assert!(
            pass_peak > off_peak * 2.0,
            "pass_peak={pass_peak}, off_peak={off_peak}"
        );
    }

    #[test]
    fn flat_eq_bands_pass_signal_unchanged() {
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);
        let input: Vec<f32> = (0..256).map(|i| ((i * 7919) % 200) as f32 / 100.0 - 1.0).collect();

        for mut filter in [
            SVFilter::low_shelf(100.0, 0.0),
            SVFilter::bell(1_000.0, 1.0, 0.0),
            SVFilter::high_shelf(10_000.0, 0.0),
        ] {
            let mut buffer = input.clone();
            filter.render(&mut buffer, &ctx);
            assert_eq!(buffer, input, "{:?} altered the signal", filter.filter_type());
        }
    }

    #[test]
    fn low_shelf_boosts_lows_and_leaves_highs() {
        let mut filter = SVFilter::low_shelf(100.0, 12.0);
        let low = sine_response(&mut filter, 30.0);
        let high = sine_response(&mut filter, 5_000.0);

        // +12 dB ≈ ×3.98
        assert!(low > 3.3, "low band gain {low}");
        assert!((high - 1.0).abs() < 0.05, "high band gain {high}");
    }

    #[test]
    fn high_shelf_cuts_highs_and_leaves_lows() {
        let mut filter = SVFilter::high_shelf(10_000.0, -12.0);
        let high = sine_response(&mut filter, 20_000.0);
        let low = sine_response(&mut filter, 200.0);

        assert!(high < 0.35, "high band gain {high}");
        assert!((low - 1.0).abs() < 0.05, "low band gain {low}");
    }

    #[test]
    fn bell_boosts_only_around_center() {
        let mut filter = SVFilter::bell(1_000.0, 1.0, 6.0);
        let center = sine_response(&mut filter, 1_000.0);
        let far = sine_response(&mut filter, 50.0);

        // +6 dB ≈ ×2.0 at the centre
        assert!((center - 2.0).abs() < 0.1, "centre gain {center}");
        assert!((far - 1.0).abs() < 0.1, "far gain {far}");
    }

    #[test]
    fn cutoff_above_nyquist_stays_stable() {
        let mut filter = SVFilter::high_shelf(10_000.0, 12.0);
        let ctx = RenderCtx::from_freq(8_000.0, 440.0, 1.0);
        let mut buffer = vec![0.5f32; 1024];
        filter.render(&mut buffer, &ctx);
        assert!(buffer.iter().all(|s| s.is_finite()));
    }
}
