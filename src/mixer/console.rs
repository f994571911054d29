use std::{collections::HashMap, fmt, time::Duration};

use crate::{
    config::MixerConfig,
    engine::{AudioBackend, CpalBackend},
    error::{MixerError, Result},
    mixer::{
        bus::MasterState,
        channel::{Channel, ChannelId},
        params::{ChannelParam, ChannelParameters},
        session::Session,
        transport::TransportState,
    },
    synth::{LoopSource, ProceduralSource},
};

/// Opaque reference to a session owned by a `Console`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(u64);

impl SessionHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionHandle({})", self.0)
    }
}

type BackendFactory = Box<dyn FnMut() -> Box<dyn AudioBackend>>;

/// Handle-based control surface over any number of sessions.
///
/// Every call naming a handle that was never issued, or was closed, fails
/// with `UnknownSession` and touches nothing.
pub struct Console {
    config: MixerConfig,
    sessions: HashMap<SessionHandle, Session>,
    next: u64,
    backends: BackendFactory,
    source: Box<dyn LoopSource>,
}

impl Console {
    /// Sessions play through the host's default output device.
    pub fn new(config: MixerConfig) -> Self {
        Self::with_backends(config, || -> Box<dyn AudioBackend> { Box::new(CpalBackend::new()) })
    }

    /// Sessions get their audio context from `factory`, one call per session.
    pub fn with_backends(config: MixerConfig, factory: impl FnMut() -> Box<dyn AudioBackend> + 'static) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            next: 1,
            backends: Box::new(factory),
            source: Box::new(ProceduralSource),
        }
    }

    pub fn with_source(mut self, source: impl LoopSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn create_session(&mut self, catalog: &[Channel]) -> Result<SessionHandle> {
        let backend = (self.backends)();
        let session = Session::with_source(catalog, self.config.clone(), backend, self.source.as_ref())?;
        let handle = SessionHandle(self.next);
        self.next += 1;
        self.sessions.insert(handle, session);
        Ok(handle)
    }

    pub fn close_session(&mut self, handle: SessionHandle) -> Result<()> {
        self.sessions
            .remove(&handle)
            .map(Session::close)
            .ok_or(MixerError::UnknownSession(handle))
    }

    pub fn session(&self, handle: SessionHandle) -> Result<&Session> {
        self.sessions.get(&handle).ok_or(MixerError::UnknownSession(handle))
    }

    pub fn session_mut(&mut self, handle: SessionHandle) -> Result<&mut Session> {
        self.sessions.get_mut(&handle).ok_or(MixerError::UnknownSession(handle))
    }

    /// Set a parameter by name (`gain_db`, `eq_high_db`, `pan`, ...).
    /// Returns the stored (clamped) value.
    pub fn set_channel_parameter(
        &mut self,
        handle: SessionHandle,
        channel: ChannelId,
        name: &str,
        value: f32,
    ) -> Result<f32> {
        let session = self.session_mut(handle)?;
        let param: ChannelParam = name.parse()?;
        session.set_channel_parameter(channel, param, value)
    }

    pub fn set_channel_mute(&mut self, handle: SessionHandle, channel: ChannelId, muted: bool) -> Result<()> {
        self.session_mut(handle)?.set_channel_mute(channel, muted)
    }

    pub fn set_channel_solo(&mut self, handle: SessionHandle, channel: ChannelId, solo: bool) -> Result<()> {
        self.session_mut(handle)?.set_channel_solo(channel, solo)
    }

    pub fn set_master_volume(&mut self, handle: SessionHandle, volume: f32) -> Result<u8> {
        Ok(self.session_mut(handle)?.set_master_volume(volume))
    }

    pub fn play(&mut self, handle: SessionHandle) -> Result<TransportState> {
        self.session_mut(handle)?.play()
    }

    pub fn stop(&mut self, handle: SessionHandle) -> Result<TransportState> {
        Ok(self.session_mut(handle)?.stop())
    }

    pub fn rewind(&mut self, handle: SessionHandle) -> Result<TransportState> {
        Ok(self.session_mut(handle)?.rewind())
    }

    pub fn advance(&mut self, handle: SessionHandle, dt: Duration) -> Result<TransportState> {
        Ok(self.session_mut(handle)?.advance(dt))
    }

    pub fn retrigger_channel(&mut self, handle: SessionHandle, channel: ChannelId) -> Result<()> {
        self.session_mut(handle)?.retrigger_channel(channel)
    }

    pub fn get_channel_level(&self, handle: SessionHandle, channel: ChannelId) -> Result<f32> {
        self.session(handle)?.get_channel_level(channel)
    }

    pub fn get_master_levels(&self, handle: SessionHandle) -> Result<(f32, f32)> {
        Ok(self.session(handle)?.get_master_levels())
    }

    pub fn get_transport_state(&self, handle: SessionHandle) -> Result<TransportState> {
        Ok(self.session(handle)?.get_transport_state())
    }

    pub fn channel_parameters(&self, handle: SessionHandle, channel: ChannelId) -> Result<ChannelParameters> {
        self.session(handle)?.channel_parameters(channel)
    }

    pub fn master_state(&self, handle: SessionHandle) -> Result<MasterState> {
        Ok(self.session(handle)?.master_state())
    }
}
