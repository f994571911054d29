//! Equal-power stereo panner for a stereo input.

/*
Stereo Panning
==============

pan ∈ [-1, 1]:  -1 = hard left, 0 = centre, +1 = hard right.

For a stereo input the panner folds one side into the other rather than just
attenuating it, so a hard-panned signal keeps its full content:

    pan <= 0:  x = pan + 1
               L' = L + R·cos(x·π/2)
               R' =     R·sin(x·π/2)

    pan > 0:   x = pan
               L' =     L·cos(x·π/2)
               R' = R + L·sin(x·π/2)

At centre (pan = 0) both branches give L' = L and R' = R, so a centred strip
is transparent. The gains follow the equal-power (sin/cos) law, which keeps
perceived loudness constant across the sweep.
*/

use std::f32::consts::FRAC_PI_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoPanner {
    pan: f32,
}

impl Default for StereoPanner {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl StereoPanner {
    pub fn new(pan: f32) -> Self {
        Self {
            pan: pan.clamp(-1.0, 1.0),
        }
    }

    pub fn pan(&self) -> f32 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: f32) {
        self.pan = pan.clamp(-1.0, 1.0);
    }

    #[inline]
    pub fn process_frame(&self, left: f32, right: f32) -> (f32, f32) {
        if self.pan <= 0.0 {
            let x = (self.pan + 1.0) * FRAC_PI_2;
            (left + right * x.cos(), right * x.sin())
        } else {
            let x = self.pan * FRAC_PI_2;
            (left * x.cos(), right + left * x.sin())
        }
    }

    pub fn render(&self, left: &mut [f32], right: &mut [f32]) {
        if self.pan == 0.0 {
            return;
        }
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_frame(*l, *r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_is_transparent() {
        let panner = StereoPanner::new(0.0);
        let (l, r) = panner.process_frame(0.3, -0.7);
        assert!((l - 0.3).abs() < 1e-6);
        assert!((r + 0.7).abs() < 1e-6);
    }

    #[test]
    fn hard_left_folds_right_into_left() {
        let panner = StereoPanner::new(-1.0);
        let (l, r) = panner.process_frame(0.5, 0.5);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);
    }

    #[test]
    fn hard_right_folds_left_into_right() {
        let panner = StereoPanner::new(1.0);
        let (l, r) = panner.process_frame(0.5, 0.5);
        assert!(l.abs() < 1e-6);
        assert!((r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn values_outside_range_are_clamped() {
        assert_eq!(StereoPanner::new(3.0).pan(), 1.0);
        assert_eq!(StereoPanner::new(-3.0).pan(), -1.0);
    }
}
