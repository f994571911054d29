use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Envelopes
=========

Two shapes cover every voice in the loop library:

  ADSR          Linear attack, decay to a sustain level, hold, linear release.
                Melodic notes (bass, vocal, pad) use it so every note starts
                and ends at exactly 0.0. A loop made of such notes is silent at
                its seam, which is what keeps it click-free.

  Percussive    Short linear attack, then exponential decay:

                    level(t) = exp(-rate * t)

                `rate` is in 1/seconds. A hit with rate 40 falls to -60 dB in
                about 170 ms. The attack (1-3 ms) removes the step a hit would
                otherwise introduce at its onset.

  Level
    1.0 ┐  ADSR              1.0 ┐  Percussive
        │  ╱╲____                │ ╱╲
        │ ╱      ╲               │╱  ╲_
    0.0 └╱────────╲─→        0.0 └─────╲____──→


Both are state machines driven one sample at a time:

    Idle ─note_on→ Attack ─→ Decay ─→ Sustain ─note_off→ Release ─→ Idle

The percussive shape has no sustain. Its decay runs until the level drops
below SILENCE_FLOOR, then the envelope goes idle on its own.
*/

/// Levels below this are treated as silence by the percussive decay.
const SILENCE_FLOOR: f32 = 1.0e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    Adsr {
        decay_time: f32,
        sustain_level: f32,
        release_time: f32,
    },
    Percussive {
        decay_rate: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    shape: Shape,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::with_shape(
            attack,
            Shape::Adsr {
                decay_time: decay.max(MIN_TIME),
                sustain_level: sustain.clamp(0.0, 1.0),
                release_time: release.max(MIN_TIME),
            },
        )
    }

    /// Attack ramp followed by exponential decay at `decay_rate` (1/s).
    pub fn percussive(attack: f32, decay_rate: f32) -> Self {
        Self::with_shape(
            attack,
            Shape::Percussive {
                decay_rate: decay_rate.max(0.0),
            },
        )
    }

    fn with_shape(attack: f32, shape: Shape) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            shape,
            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Retrigger from zero.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Start releasing from the current level. Percussive envelopes ignore
    /// the gate and keep decaying.
    pub fn note_off(&mut self, ctx: &RenderCtx) {
        let Shape::Adsr { release_time, .. } = self.shape else {
            return;
        };
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (release_time * ctx.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        match (self.stage, self.shape) {
            (EnvelopeState::Idle, _) => {
                self.level = 0.0;
            }

            (EnvelopeState::Attack, _) => {
                self.level += 1.0 / (self.attack_time * ctx.sample_rate);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            (
                EnvelopeState::Decay,
                Shape::Adsr {
                    decay_time,
                    sustain_level,
                    ..
                },
            ) => {
                let decrement = (1.0 - sustain_level) / (decay_time * ctx.sample_rate);
                self.level -= decrement;
                if self.level <= sustain_level {
                    self.level = sustain_level;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            (EnvelopeState::Decay, Shape::Percussive { decay_rate }) => {
                self.level *= (-decay_rate / ctx.sample_rate).exp();
                if self.level < SILENCE_FLOOR {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }

            (EnvelopeState::Sustain, Shape::Adsr { sustain_level, .. }) => {
                self.level = sustain_level;
            }

            (EnvelopeState::Release, _) => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);
                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }

            // percussive envelopes never enter sustain
            (EnvelopeState::Sustain, Shape::Percussive { .. }) => {
                self.stage = EnvelopeState::Decay;
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0)
    }

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = ctx();
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(0.01, 0.1, 0.7, 0.2);
        env.note_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(0.01, 0.05, sustain, 0.2);
        env.note_on();
        render_samples(&mut env, ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 0.05);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);
        env.note_on();
        render_samples(&mut env, 20);

        env.note_off(&ctx());
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn percussive_decay_is_exponential_and_self_terminates() {
        let mut env = Envelope::percussive(0.001, 20.0);
        env.note_on();
        render_samples(&mut env, 1);
        let peak = env.level();

        // 50 ms at rate 20/s → factor e^-1
        render_samples(&mut env, 50);
        let expected = peak * (-1.0f32).exp();
        assert!((env.level() - expected).abs() < 0.01, "got {}", env.level());

        render_samples(&mut env, 2_000);
        assert!(!env.is_active());
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn percussive_ignores_note_off() {
        let mut env = Envelope::percussive(0.001, 10.0);
        env.note_on();
        render_samples(&mut env, 5);
        env.note_off(&ctx());
        assert_eq!(env.state(), EnvelopeState::Decay);
    }
}
