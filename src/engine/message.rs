/// Everything the render path needs to know about one strip's controls.
///
/// `gain` is the final linear gain: the channel gain formula with mute and
/// solo already folded in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripSettings {
    pub eq_high_db: f32,
    pub eq_mid_db: f32,
    pub eq_low_db: f32,
    pub gain: f32,
    /// Pan position in [-1, 1].
    pub pan: f32,
}

impl Default for StripSettings {
    fn default() -> Self {
        Self {
            eq_high_db: 0.0,
            eq_mid_db: 0.0,
            eq_low_db: 0.0,
            gain: 0.0,
            pan: 0.0,
        }
    }
}

/// Control → render messages, delivered over a wait-free ring buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineMessage {
    /// Begin feeding the strip's loop from its start. No-op if already feeding.
    StartFeed { slot: usize },
    /// Silence the strip. No-op if idle.
    StopFeed { slot: usize },
    /// Tear down the current feed and start over from the loop start.
    RestartFeed { slot: usize },
    Configure { slot: usize, settings: StripSettings },
    /// Linear master gain (master volume / 100).
    MasterGain(f32),
}
