use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Playing,
}

/// Snapshot returned to callers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportState {
    pub is_playing: bool,
    pub elapsed_seconds: u32,
    pub max_duration: u32,
}

/*
Transport
=========

            play                 play (pause, keeps elapsed)
  Stopped ────────→ Playing ─────────────────────────→ Stopped
     ↑                 │
     └─── stop ────────┤  elapsed = 0
     └─── auto-stop ───┘  elapsed reaches max_duration, elapsed = 0

  rewind   elapsed = 0, state unchanged

The clock does not keep time itself. `advance` is fed wall-clock deltas by
the update loop; only whole seconds count, and only while playing.
*/

#[derive(Debug, Clone)]
pub struct TransportClock {
    state: PlayState,
    elapsed: u32,
    max_duration: u32,
    pending: Duration,
}

impl TransportClock {
    pub fn new(max_duration: u32) -> Self {
        Self {
            state: PlayState::Stopped,
            elapsed: 0,
            max_duration: max_duration.max(1),
            pending: Duration::ZERO,
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed
    }

    pub fn max_duration(&self) -> u32 {
        self.max_duration
    }

    pub fn snapshot(&self) -> TransportState {
        TransportState {
            is_playing: self.is_playing(),
            elapsed_seconds: self.elapsed,
            max_duration: self.max_duration,
        }
    }

    /// Toggle between playing and paused. Returns the new state.
    pub fn play(&mut self) -> PlayState {
        self.state = match self.state {
            PlayState::Stopped => PlayState::Playing,
            PlayState::Playing => PlayState::Stopped,
        };
        self.pending = Duration::ZERO;
        self.state
    }

    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.elapsed = 0;
        self.pending = Duration::ZERO;
    }

    pub fn rewind(&mut self) {
        self.elapsed = 0;
        self.pending = Duration::ZERO;
    }

    /// Jump to `seconds`, clamped below `max_duration`.
    pub fn seek(&mut self, seconds: u32) {
        self.elapsed = seconds.min(self.max_duration - 1);
        self.pending = Duration::ZERO;
    }

    /// Count `dt` towards the clock. Returns true when this call auto-stopped.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.pending += dt;
        while self.pending >= Duration::from_secs(1) {
            self.pending -= Duration::from_secs(1);
            self.elapsed += 1;
            if self.elapsed >= self.max_duration {
                self.stop();
                return true;
            }
        }
        false
    }
}
