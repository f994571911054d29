use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use crate::{
    engine::MixEngine,
    error::{MixerError, Result},
};

/*
Audio Backends
==============

A backend is the "audio context" of a session: it owns the `MixEngine` once
opened and calls `process` from its render path.

  open     Take ownership of the engine and start rendering. Called once, on
           the first play. On failure the engine is handed back inside
           `OpenError` so the session can try again later.
  resume   Restart a suspended context.
  close    Stop rendering and drop the engine.

  CpalBackend      The host's output device.
  OfflineBackend   No device. Blocks are pulled by hand through its
                   `OfflineHandle`, which makes sessions testable.
*/

/// `open` failed. Carries the engine back to the caller.
pub struct OpenError {
    pub error: MixerError,
    pub engine: MixEngine,
}

impl fmt::Debug for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenError").field("error", &self.error).finish_non_exhaustive()
    }
}

pub trait AudioBackend {
    fn name(&self) -> &str;

    fn open(&mut self, engine: MixEngine) -> std::result::Result<(), OpenError>;

    fn is_open(&self) -> bool;

    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<()>;

    fn close(&mut self);
}

fn lock_engine(slot: &Mutex<Option<MixEngine>>) -> MutexGuard<'_, Option<MixEngine>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Offline
// ---------------------------------------------------------------------------

#[derive(Default)]
struct OfflineShared {
    engine: Mutex<Option<MixEngine>>,
    suspended: AtomicBool,
    refuse_open: AtomicBool,
    refuse_resume: AtomicBool,
}

/// A backend without a device; see `OfflineHandle`.
pub struct OfflineBackend {
    shared: Arc<OfflineShared>,
}

/// Pulls audio from an `OfflineBackend` and simulates device trouble.
#[derive(Clone)]
pub struct OfflineHandle {
    shared: Arc<OfflineShared>,
}

impl OfflineBackend {
    pub fn new() -> (Self, OfflineHandle) {
        let shared = Arc::new(OfflineShared::default());
        (
            Self {
                shared: shared.clone(),
            },
            OfflineHandle { shared },
        )
    }
}

impl AudioBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn open(&mut self, engine: MixEngine) -> std::result::Result<(), OpenError> {
        if self.shared.refuse_open.load(Ordering::Relaxed) {
            return Err(OpenError {
                error: MixerError::unavailable("offline device refused to open"),
                engine,
            });
        }
        *lock_engine(&self.shared.engine) = Some(engine);
        self.shared.suspended.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_open(&self) -> bool {
        lock_engine(&self.shared.engine).is_some()
    }

    fn is_suspended(&self) -> bool {
        self.shared.suspended.load(Ordering::Relaxed)
    }

    fn resume(&mut self) -> Result<()> {
        if self.shared.refuse_resume.load(Ordering::Relaxed) {
            return Err(MixerError::unavailable("offline device refused to resume"));
        }
        self.shared.suspended.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn close(&mut self) {
        lock_engine(&self.shared.engine).take();
    }
}

impl OfflineHandle {
    /// Render one block. Writes silence and returns false when the context is
    /// not open or is suspended.
    pub fn render(&self, left: &mut [f32], right: &mut [f32]) -> bool {
        let mut engine = lock_engine(&self.shared.engine);
        match engine.as_mut() {
            Some(engine) if !self.shared.suspended.load(Ordering::Relaxed) => {
                engine.process(left, right);
                true
            }
            _ => {
                left.fill(0.0);
                right.fill(0.0);
                false
            }
        }
    }

    /// Render `frames` frames in blocks of `block` and return both sides.
    pub fn render_frames(&self, frames: usize, block: usize) -> (Vec<f32>, Vec<f32>) {
        let mut left = vec![0.0; frames];
        let mut right = vec![0.0; frames];
        let block = block.max(1);
        for (l, r) in left.chunks_mut(block).zip(right.chunks_mut(block)) {
            self.render(l, r);
        }
        (left, right)
    }

    pub fn is_open(&self) -> bool {
        lock_engine(&self.shared.engine).is_some()
    }

    /// Simulate the host suspending the context.
    pub fn suspend(&self) {
        self.shared.suspended.store(true, Ordering::Relaxed);
    }

    pub fn refuse_open(&self, refuse: bool) {
        self.shared.refuse_open.store(refuse, Ordering::Relaxed);
    }

    pub fn refuse_resume(&self, refuse: bool) {
        self.shared.refuse_resume.store(refuse, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// cpal
// ---------------------------------------------------------------------------

/// Output through the host audio device.
///
/// The stream runs at the session's sample rate; a device that cannot do that
/// rate fails to open with `Unavailable`.
#[derive(Default)]
pub struct CpalBackend {
    device_name: Option<String>,
    stream: Option<cpal::Stream>,
    suspended: bool,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the output device with this name instead of the default one.
    pub fn with_device(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    fn find_device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        match &self.device_name {
            None => host
                .default_output_device()
                .ok_or_else(|| MixerError::unavailable("no default output device available")),
            Some(wanted) => host
                .output_devices()
                .map_err(|err| MixerError::unavailable(err.to_string()))?
                .find(|device| device.name().is_ok_and(|name| &name == wanted))
                .ok_or_else(|| MixerError::unavailable(format!("no output device named `{wanted}`"))),
        }
    }

    fn build_stream(&self, shared: Arc<Mutex<Option<MixEngine>>>, sample_rate: u32) -> Result<cpal::Stream> {
        let device = self.find_device()?;
        let default = device
            .default_output_config()
            .map_err(|err| MixerError::unavailable(err.to_string()))?;
        if default.sample_format() != cpal::SampleFormat::F32 {
            return Err(MixerError::unavailable(format!(
                "device sample format {:?} is not supported",
                default.sample_format()
            )));
        }

        let channels = default.channels() as usize;
        let config = cpal::StreamConfig {
            channels: default.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let name = device.name().unwrap_or_default();
        info!(
            device = %name,
            sample_rate,
            channels,
            "opening output stream"
        );

        device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    // never block the device thread; a contended lock renders silence
                    match shared.try_lock() {
                        Ok(mut guard) => match guard.as_mut() {
                            Some(engine) => engine.process_interleaved(data, channels),
                            None => data.fill(0.0),
                        },
                        Err(_) => data.fill(0.0),
                    }
                },
                |err| warn!(error = %err, "audio stream error"),
                None,
            )
            .map_err(|err| MixerError::unavailable(err.to_string()))
    }
}

impl AudioBackend for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn open(&mut self, engine: MixEngine) -> std::result::Result<(), OpenError> {
        // the stream renders silence until the engine is installed
        let shared = Arc::new(Mutex::new(None));

        let started = self
            .build_stream(shared.clone(), engine.sample_rate())
            .and_then(|stream| {
                stream
                    .play()
                    .map_err(|err| MixerError::unavailable(err.to_string()))?;
                Ok(stream)
            });

        match started {
            Ok(stream) => {
                *lock_engine(&shared) = Some(engine);
                self.stream = Some(stream);
                self.suspended = false;
                Ok(())
            }
            Err(error) => Err(OpenError { error, engine }),
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<()> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| MixerError::unavailable("output stream is not open"))?;
        stream
            .play()
            .map_err(|err| MixerError::unavailable(err.to_string()))?;
        self.suspended = false;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                warn!(error = %err, "failed to pause output stream");
            }
        }
        self.suspended = false;
    }
}
