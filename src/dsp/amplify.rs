//! Gain primitives: constant gain, signal × modulator, and block-ramped gain.

/*
Gain Stages
===========

    output[i] = signal[i] × gain[i]

Three forms are used in the mixer:

  constant      One factor for the whole block (bus master scaling).
  modulated     A control signal per sample (envelope × oscillator, pulse LFO).
  ramped        The factor moves linearly from its previous value to the new
                target across one block. A fader jump from 0.36 to 1.0 then
                lands as a short slope instead of a step, which would click.

Gain is not restricted to [0, 1]. The channel gain formula can go negative
(-20 dB gain with the fader down gives -1.0), which inverts the polarity.
*/

#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

#[inline]
pub fn multiply_in_place(signal: &mut [f32], modulator: &[f32]) {
    debug_assert_eq!(signal.len(), modulator.len());

    for (s, &m) in signal.iter_mut().zip(modulator.iter()) {
        *s *= m;
    }
}

/// Block-rate gain with a linear ramp toward the latest target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRamp {
    current: f32,
    target: f32,
}

impl GainRamp {
    pub fn new(gain: f32) -> Self {
        Self {
            current: gain,
            target: gain,
        }
    }

    pub fn set_target(&mut self, gain: f32) {
        self.target = gain;
    }

    /// Jump straight to the target (used when a feed restarts from silence).
    pub fn snap(&mut self) {
        self.current = self.target;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Apply the same ramp to both sides of a stereo block.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        let len = left.len().min(right.len());
        if len == 0 {
            return;
        }

        if self.current == self.target {
            apply_gain(left, self.current);
            apply_gain(right, self.current);
            return;
        }

        let step = (self.target - self.current) / len as f32;
        for (i, (l, r)) in left.iter_mut().zip(right.iter_mut()).enumerate() {
            let gain = self.current + step * (i + 1) as f32;
            *l *= gain;
            *r *= gain;
        }
        self.current = self.target;
    }
}
