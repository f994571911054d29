use std::{collections::HashMap, sync::Arc, time::Duration};

use rtrb::{Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::{
    config::MixerConfig,
    engine::{AudioBackend, EngineMessage, MeterBank, MixEngine},
    error::{MixerError, Result},
    mixer::{
        bus::{is_audible, solo_active, MasterState, MixBus},
        channel::{validate_catalog, Channel, ChannelId},
        params::{ChannelParam, ChannelParameters},
        strip::ChannelStrip,
        transport::{PlayState, TransportClock, TransportState},
    },
    synth::{InstrumentType, LoopBuffer, LoopSource, ProceduralSource},
};

/*
Session
=======

One mixer session: a catalog of channel strips, the bus, the transport, and
the audio context they play through.

  control side                              render side (backend)
  ────────────                              ─────────────────────
  Session ── EngineMessage (rtrb) ────────→  MixEngine
     ↑                                          │
     └──────── MeterBank (atomics) ←────────────┘

The session is the only writer of parameters and the only producer on the
queue. It never waits on the render side: when the queue is full the strip
stays dirty and is re-sent at the start of the next control call. A strip
keeps at most one `Configure` in the queue; newer settings wait until the
render side has taken it.

The audio context is opened lazily by the first `play`. Until then the
engine is held here, nothing drains the queue, and nothing is pushed: every
strip simply stays dirty until the context opens.
*/

pub struct Session {
    config: MixerConfig,
    strips: Vec<ChannelStrip>,
    index: HashMap<ChannelId, usize>,
    bus: MixBus,
    transport: TransportClock,
    tx: Producer<EngineMessage>,
    /// Present until the backend takes it on the first play.
    engine: Option<MixEngine>,
    backend: Box<dyn AudioBackend>,
    master_dirty: bool,
    /// Messages pushed so far.
    sent: u64,
    /// Queue sequence number of the last `MasterGain` pushed.
    master_seq: Option<u64>,
    /// Set while updates are being deferred for lack of queue space.
    backlogged: bool,
}

impl Session {
    /// Create a session whose loops come from the built-in synthesizer.
    pub fn new(catalog: &[Channel], config: MixerConfig, backend: Box<dyn AudioBackend>) -> Result<Self> {
        Self::with_source(catalog, config, backend, &ProceduralSource)
    }

    /// Create a session that loads its loops from `source`.
    ///
    /// Every loop is produced here, before anything can play; a channel whose
    /// loop cannot be produced fails the whole session.
    pub fn with_source(
        catalog: &[Channel],
        config: MixerConfig,
        backend: Box<dyn AudioBackend>,
        source: &dyn LoopSource,
    ) -> Result<Self> {
        config.validate()?;
        validate_catalog(catalog)?;

        let mut cache: HashMap<InstrumentType, Arc<LoopBuffer>> = HashMap::new();
        let mut strips = Vec::with_capacity(catalog.len());
        let mut index = HashMap::with_capacity(catalog.len());

        for (slot, channel) in catalog.iter().enumerate() {
            let buffer = match cache.get(&channel.instrument) {
                Some(buffer) => buffer.clone(),
                None => {
                    let buffer = source
                        .load(channel.instrument, config.loop_seconds, config.sample_rate)
                        .map_err(|err| {
                            MixerError::invalid_config(format!(
                                "channel {} ({}): {err}",
                                channel.id, channel.instrument
                            ))
                        })?;
                    let buffer = Arc::new(buffer);
                    cache.insert(channel.instrument, buffer.clone());
                    buffer
                }
            };
            index.insert(channel.id, slot);
            strips.push(ChannelStrip::new(channel.clone(), slot, buffer));
        }

        let (tx, rx) = RingBuffer::new(config.queue_capacity);
        let meters = Arc::new(MeterBank::new(strips.len()));
        let buffers = strips.iter().map(|strip| strip.buffer().clone()).collect();
        let engine = MixEngine::new(buffers, &config, rx, meters.clone());

        info!(
            channels = strips.len(),
            sample_rate = config.sample_rate,
            backend = backend.name(),
            "session created"
        );

        Ok(Self {
            bus: MixBus::new(config.master_volume, meters),
            transport: TransportClock::new(config.max_duration_secs),
            config,
            strips,
            index,
            tx,
            engine: Some(engine),
            backend,
            master_dirty: true,
            sent: 0,
            master_seq: None,
            backlogged: false,
        })
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.strips.iter().map(ChannelStrip::channel)
    }

    pub fn strip(&self, id: ChannelId) -> Result<&ChannelStrip> {
        let slot = self.slot(id)?;
        Ok(&self.strips[slot])
    }

    pub fn is_context_open(&self) -> bool {
        self.engine.is_none() && self.backend.is_open()
    }

    fn slot(&self, id: ChannelId) -> Result<usize> {
        self.index.get(&id).copied().ok_or(MixerError::UnknownChannel(id))
    }

    fn audible(&self, slot: usize) -> bool {
        is_audible(self.strips[slot].parameters(), solo_active(&self.strips))
    }

    // -----------------------------------------------------------------------
    // Parameters
    // -----------------------------------------------------------------------

    /// Set one parameter. Returns the stored (clamped) value.
    pub fn set_channel_parameter(&mut self, id: ChannelId, param: ChannelParam, value: f32) -> Result<f32> {
        let slot = self.slot(id)?;
        let stored = self.strips[slot].set_parameter(param, value);
        debug!(channel = id, %param, requested = value, stored, "parameter set");
        self.flush();
        Ok(stored)
    }

    pub fn set_channel_mute(&mut self, id: ChannelId, muted: bool) -> Result<()> {
        let slot = self.slot(id)?;
        self.strips[slot].set_muted(muted);
        debug!(channel = id, muted, "mute set");
        self.flush();
        Ok(())
    }

    /// Solo changes the audibility of every strip, so all are re-sent.
    pub fn set_channel_solo(&mut self, id: ChannelId, solo: bool) -> Result<()> {
        let slot = self.slot(id)?;
        self.strips[slot].set_solo(solo);
        for strip in &mut self.strips {
            strip.mark_dirty();
        }
        debug!(channel = id, solo, "solo set");
        self.flush();
        Ok(())
    }

    /// Master fader. Feeds into every strip's gain and the bus gain.
    pub fn set_master_volume(&mut self, volume: f32) -> u8 {
        let stored = self.bus.set_volume(volume);
        for strip in &mut self.strips {
            strip.mark_dirty();
        }
        self.master_dirty = true;
        debug!(requested = volume, stored, "master volume set");
        self.flush();
        stored
    }

    pub fn channel_parameters(&self, id: ChannelId) -> Result<ChannelParameters> {
        Ok(*self.strip(id)?.parameters())
    }

    /// Whether the channel currently reaches the bus (mute and solo applied).
    pub fn is_channel_audible(&self, id: ChannelId) -> Result<bool> {
        let slot = self.slot(id)?;
        Ok(self.audible(slot))
    }

    /// The linear gain the channel's gain stage is set to.
    pub fn effective_gain(&self, id: ChannelId) -> Result<f32> {
        let slot = self.slot(id)?;
        Ok(self.strips[slot].effective_gain(self.audible(slot), self.bus.volume()))
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Start playing, or pause when already playing.
    ///
    /// The first call opens the audio context. If the context cannot be
    /// opened or resumed the call fails with `Unavailable` and nothing
    /// changes.
    pub fn play(&mut self) -> Result<TransportState> {
        self.flush();
        if self.transport.is_playing() {
            self.transport.play();
            debug!(elapsed = self.transport.elapsed_seconds(), "transport paused");
            self.stop_feeds();
            return Ok(self.transport.snapshot());
        }

        self.ensure_context()?;
        if self.transport.play() == PlayState::Playing {
            debug!(elapsed = self.transport.elapsed_seconds(), "transport playing");
            for strip in &mut self.strips {
                if strip.start_feed() {
                    debug!(channel = strip.channel().id, "feed started");
                }
            }
            self.flush();
        }
        Ok(self.transport.snapshot())
    }

    pub fn stop(&mut self) -> TransportState {
        self.flush();
        self.transport.stop();
        debug!("transport stopped");
        self.stop_feeds();
        self.transport.snapshot()
    }

    pub fn rewind(&mut self) -> TransportState {
        self.flush();
        self.transport.rewind();
        debug!("transport rewound");
        self.transport.snapshot()
    }

    /// Jump the clock, clamped below the maximum duration.
    pub fn seek(&mut self, seconds: u32) -> TransportState {
        self.flush();
        self.transport.seek(seconds);
        self.transport.snapshot()
    }

    /// Tick the clock by wall-clock `dt`. Reaching the maximum duration stops
    /// every feed.
    pub fn advance(&mut self, dt: Duration) -> TransportState {
        self.flush();
        if self.transport.advance(dt) {
            info!(max = self.transport.max_duration(), "transport reached max duration");
            self.stop_feeds();
        }
        self.transport.snapshot()
    }

    pub fn get_transport_state(&self) -> TransportState {
        self.transport.snapshot()
    }

    /// Restart one channel's loop from its beginning. No-op while stopped.
    pub fn retrigger_channel(&mut self, id: ChannelId) -> Result<()> {
        let slot = self.slot(id)?;
        self.flush();
        if !self.transport.is_playing() {
            return Ok(());
        }
        if self.backend.is_suspended() {
            return Err(MixerError::unavailable("audio context is suspended"));
        }
        self.strips[slot].restart_feed();
        debug!(channel = id, "feed restarted");
        self.flush();
        Ok(())
    }

    fn stop_feeds(&mut self) {
        for strip in &mut self.strips {
            if strip.stop_feed() {
                debug!(channel = strip.channel().id, "feed stopped");
            }
        }
        self.flush();
    }

    fn ensure_context(&mut self) -> Result<()> {
        if let Some(engine) = self.engine.take() {
            if let Err(err) = self.backend.open(engine) {
                warn!(backend = self.backend.name(), error = %err.error, "audio context failed to open");
                self.engine = Some(err.engine);
                return Err(err.error);
            }
            info!(backend = self.backend.name(), "audio context opened");
            self.flush();
            return Ok(());
        }
        if self.backend.is_suspended() {
            self.backend.resume()?;
            info!(backend = self.backend.name(), "audio context resumed");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Meters
    // -----------------------------------------------------------------------

    /// 0-100. Exactly 0 while stopped, idle, muted, or silenced by solo.
    pub fn get_channel_level(&self, id: ChannelId) -> Result<f32> {
        let slot = self.slot(id)?;
        let strip = &self.strips[slot];
        if !self.transport.is_playing() || !strip.is_feeding() || !self.audible(slot) {
            return Ok(0.0);
        }
        Ok(self.bus.meters().channel_level(slot))
    }

    /// (left, right), each 0-100. Exactly 0 while stopped.
    pub fn get_master_levels(&self) -> (f32, f32) {
        self.bus.levels(self.transport.is_playing())
    }

    pub fn master_state(&self) -> MasterState {
        self.bus.state(self.transport.is_playing())
    }

    // -----------------------------------------------------------------------
    // Queue
    // -----------------------------------------------------------------------

    /// Messages the render side has taken off the queue so far.
    fn drained(&self) -> u64 {
        let queued = self.config.queue_capacity.saturating_sub(self.tx.slots());
        self.sent.saturating_sub(queued as u64)
    }

    fn push(&mut self, msg: EngineMessage) -> Option<u64> {
        self.tx.push(msg).ok()?;
        self.sent += 1;
        Some(self.sent)
    }

    /// Push every outstanding change to the render path. Does nothing until
    /// the context is open.
    fn flush(&mut self) {
        if self.engine.is_some() {
            return;
        }
        let drained = self.drained();
        let mut deferred = false;

        let master_queued = self.master_seq.is_some_and(|seq| seq > drained);
        if self.master_dirty && !master_queued {
            match self.push(EngineMessage::MasterGain(self.bus.master_gain())) {
                Some(seq) => {
                    self.master_dirty = false;
                    self.master_seq = Some(seq);
                }
                None => deferred = true,
            }
        }

        let solo = solo_active(&self.strips);
        let master_volume = self.bus.volume();
        for slot in 0..self.strips.len() {
            if !self.strips[slot].is_dirty() {
                continue;
            }
            let strip = &self.strips[slot];
            let pending = strip.pending_messages(is_audible(strip.parameters(), solo), master_volume, drained);
            for msg in pending.into_iter().flatten() {
                match self.push(msg) {
                    Some(seq) => self.strips[slot].acknowledge(&msg, seq),
                    None => {
                        deferred = true;
                        break;
                    }
                }
            }
        }

        if deferred && !self.backlogged {
            warn!(capacity = self.config.queue_capacity, "engine queue full, deferring updates");
        } else if !deferred && self.backlogged {
            debug!("engine queue backlog cleared");
        }
        self.backlogged = deferred;
    }

    /// Tear the session down. Releases the audio context.
    pub fn close(self) {}
}

impl Drop for Session {
    fn drop(&mut self) {
        self.backend.close();
        self.bus.meters().clear();
        info!(backend = self.backend.name(), "session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{OfflineBackend, OfflineHandle},
        error::ErrorKind,
        mixer::channel::default_catalog,
        synth::BufferSource,
    };

    fn config() -> MixerConfig {
        MixerConfig::new().sample_rate(8_000).loop_seconds(2.0)
    }

    fn session() -> (Session, OfflineHandle) {
        let (backend, handle) = OfflineBackend::new();
        let session = Session::new(&default_catalog(), config(), Box::new(backend)).unwrap();
        (session, handle)
    }

    #[test]
    fn context_opens_on_first_play_only() {
        let (mut session, handle) = session();
        assert!(!handle.is_open());
        session.play().unwrap();
        assert!(handle.is_open());
        assert!(session.is_context_open());
    }

    #[test]
    fn unknown_channel_leaves_state_alone() {
        let (mut session, _) = session();
        let err = session.set_channel_parameter(99, ChannelParam::GainDb, 3.0).unwrap_err();
        assert_eq!(err, MixerError::UnknownChannel(99));
        for channel in session.channels() {
            assert_eq!(
                session.channel_parameters(channel.id).unwrap(),
                ChannelParameters::default()
            );
        }
    }

    #[test]
    fn play_pause_resume_feeds() {
        let (mut session, _) = session();
        session.play().unwrap();
        assert!(session.strip(1).unwrap().is_feeding());

        let state = session.play().unwrap();
        assert!(!state.is_playing);
        assert!(session.channels().all(|c| !session.strip(c.id).unwrap().is_feeding()));
    }

    #[test]
    fn retrigger_is_a_no_op_while_stopped() {
        let (mut session, _) = session();
        session.retrigger_channel(1).unwrap();
        assert!(!session.strip(1).unwrap().is_feeding());
    }

    #[test]
    fn retrigger_fails_while_suspended() {
        let (mut session, handle) = session();
        session.play().unwrap();
        handle.suspend();
        let err = session.retrigger_channel(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn tiny_queue_delivers_state_eventually() {
        let (backend, handle) = OfflineBackend::new();
        let config = config().queue_capacity(2);
        let mut session = Session::new(&default_catalog(), config, Box::new(backend)).unwrap();
        session.play().unwrap();
        // each render drains the queue, each control call refills it
        for _ in 0..8 {
            handle.render_frames(64, 64);
            session.rewind();
        }
        assert!(session.strips.iter().all(|strip| !strip.is_dirty()));
        assert!(!session.master_dirty);
    }

    #[test]
    fn nothing_is_queued_before_the_context_opens() {
        let (mut session, _) = session();
        for i in 0..session.config.queue_capacity + 100 {
            session.set_channel_parameter(1, ChannelParam::GainDb, (i % 7) as f32).unwrap();
        }
        assert_eq!(session.sent, 0);
        assert!(session.strips.iter().all(ChannelStrip::is_dirty));
    }

    #[test]
    fn settings_wait_for_the_queued_configure() {
        let (mut session, handle) = session();
        session.play().unwrap();
        let sent = session.sent;

        // nothing has rendered, so strip 1's first configure is still queued
        for i in 0..session.config.queue_capacity * 2 {
            session.set_channel_parameter(1, ChannelParam::GainDb, (i % 7) as f32 + 1.0).unwrap();
        }
        assert_eq!(session.sent, sent);
        assert!(session.strip(1).unwrap().is_dirty());
        assert!(!session.backlogged);

        handle.render_frames(64, 64);
        session.rewind();
        assert_eq!(session.sent, sent + 1);
        assert!(!session.strip(1).unwrap().is_dirty());
    }

    #[test]
    fn missing_stems_are_configuration_errors() {
        let (backend, _) = OfflineBackend::new();
        let err = Session::with_source(&default_catalog(), config(), Box::new(backend), &BufferSource::new("empty"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn shared_instruments_share_a_buffer() {
        let catalog = vec![
            Channel::new(1, InstrumentType::Pad, "Pad A"),
            Channel::new(2, InstrumentType::Pad, "Pad B"),
        ];
        let (backend, _) = OfflineBackend::new();
        let session = Session::new(&catalog, config(), Box::new(backend)).unwrap();
        assert!(Arc::ptr_eq(
            session.strip(1).unwrap().buffer(),
            session.strip(2).unwrap().buffer()
        ));
    }

    #[test]
    fn close_releases_the_context() {
        let (mut session, handle) = session();
        session.play().unwrap();
        session.close();
        assert!(!handle.is_open());
    }
}
