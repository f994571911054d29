use std::sync::Arc;

use crate::{
    engine::{EngineMessage, StripSettings},
    mixer::{
        channel::Channel,
        params::{effective_gain, pan_value, ChannelParam, ChannelParameters},
    },
    synth::LoopBuffer,
};

/// Whether a strip's loop is currently flowing into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Idle,
    Feeding,
}

/// Control-side half of one channel.
///
/// Holds the parameters by value and the slot index of the matching
/// `StripGraph` in the engine. Every mutation that changes what the render
/// path hears marks the strip dirty; the session drains dirty strips into the
/// engine queue.
#[derive(Debug)]
pub struct ChannelStrip {
    channel: Channel,
    slot: usize,
    params: ChannelParameters,
    buffer: Arc<LoopBuffer>,
    feed: FeedState,
    /// Feed transition not yet accepted by the queue.
    pending_feed: Option<EngineMessage>,
    settings_dirty: bool,
    /// Queue sequence number of the last `Configure` pushed for this strip.
    configure_seq: Option<u64>,
}

impl ChannelStrip {
    pub fn new(channel: Channel, slot: usize, buffer: Arc<LoopBuffer>) -> Self {
        Self {
            channel,
            slot,
            params: ChannelParameters::default(),
            buffer,
            feed: FeedState::Idle,
            pending_feed: None,
            settings_dirty: true,
            configure_seq: None,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn parameters(&self) -> &ChannelParameters {
        &self.params
    }

    pub fn buffer(&self) -> &Arc<LoopBuffer> {
        &self.buffer
    }

    pub fn feed_state(&self) -> FeedState {
        self.feed
    }

    pub fn is_feeding(&self) -> bool {
        self.feed == FeedState::Feeding
    }

    /// Store a clamped value; returns the stored value.
    pub fn set_parameter(&mut self, param: ChannelParam, value: f32) -> f32 {
        let before = self.params.get(param);
        let stored = self.params.set(param, value);
        if stored != before {
            self.settings_dirty = true;
        }
        stored
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.params.muted = muted;
        self.settings_dirty = true;
    }

    pub fn set_solo(&mut self, solo: bool) {
        self.params.solo = solo;
        self.settings_dirty = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.settings_dirty = true;
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.settings_dirty || self.pending_feed.is_some()
    }

    /// Linear gain the render path should apply, given bus state.
    pub fn effective_gain(&self, audible: bool, master_volume: u8) -> f32 {
        effective_gain(self.params.gain_db, self.params.volume, master_volume, !audible)
    }

    pub(crate) fn settings(&self, audible: bool, master_volume: u8) -> StripSettings {
        StripSettings {
            eq_high_db: self.params.eq_high_db,
            eq_mid_db: self.params.eq_mid_db,
            eq_low_db: self.params.eq_low_db,
            gain: self.effective_gain(audible, master_volume),
            pan: pan_value(self.params.pan),
        }
    }

    /// Idle → Feeding. Returns false when already feeding.
    pub(crate) fn start_feed(&mut self) -> bool {
        if self.feed == FeedState::Feeding {
            return false;
        }
        self.feed = FeedState::Feeding;
        self.pending_feed = Some(EngineMessage::StartFeed { slot: self.slot });
        true
    }

    /// Feeding → Idle. Returns false when already idle.
    pub(crate) fn stop_feed(&mut self) -> bool {
        if self.feed == FeedState::Idle {
            return false;
        }
        self.feed = FeedState::Idle;
        self.pending_feed = Some(EngineMessage::StopFeed { slot: self.slot });
        true
    }

    /// Tear down and start again. Always ends Feeding.
    pub(crate) fn restart_feed(&mut self) {
        self.feed = FeedState::Feeding;
        self.pending_feed = Some(EngineMessage::RestartFeed { slot: self.slot });
    }

    /// Whether a `Configure` for this strip is still waiting in the queue.
    /// `drained` is the number of messages the render side has taken so far.
    pub(crate) fn configure_queued(&self, drained: u64) -> bool {
        self.configure_seq.is_some_and(|seq| seq > drained)
    }

    /// Hand out the messages that bring the engine up to date, settings first.
    /// Call `acknowledge` for each one the queue accepted.
    ///
    /// Settings are held back while an earlier `Configure` is still queued, so
    /// a strip never has more than one in flight.
    pub(crate) fn pending_messages(&self, audible: bool, master_volume: u8, drained: u64) -> [Option<EngineMessage>; 2] {
        let send_settings = self.settings_dirty && !self.configure_queued(drained);
        let configure = send_settings.then(|| EngineMessage::Configure {
            slot: self.slot,
            settings: self.settings(audible, master_volume),
        });
        [configure, self.pending_feed]
    }

    /// Record that the queue accepted `msg` as message number `seq`.
    pub(crate) fn acknowledge(&mut self, msg: &EngineMessage, seq: u64) {
        match msg {
            EngineMessage::Configure { .. } => {
                self.settings_dirty = false;
                self.configure_seq = Some(seq);
            }
            _ => self.pending_feed = None,
        }
    }
}
