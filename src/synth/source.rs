use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{MixerError, Result},
    synth::{generate_loop, InstrumentType, LoopBuffer},
};

/*
Loop Sources
============

A session asks a `LoopSource` for one buffer per channel when it is created.
Buffers from anywhere other than the built-in synthesizer are checked with
`LoopBuffer::validate_for` before they are used.

  ProceduralSource   Always succeeds (for a valid length and sample rate).
  BufferSource       Serves pre-made buffers by instrument, e.g. decoded files.
  FallbackSource     Tries a list of sources in order, and synthesizes the
                     loop if every one of them fails.

  let source = FallbackSource::new()
      .with(BufferSource::new("stems").insert(InstrumentType::Drum, drums))
      .with(remote_stems);
*/

pub trait LoopSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    fn load(
        &self,
        instrument: InstrumentType,
        duration_seconds: f32,
        sample_rate: u32,
    ) -> Result<LoopBuffer>;
}

/// Synthesizes every loop with `generate_loop`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralSource;

impl LoopSource for ProceduralSource {
    fn name(&self) -> &str {
        "procedural"
    }

    fn load(
        &self,
        instrument: InstrumentType,
        duration_seconds: f32,
        sample_rate: u32,
    ) -> Result<LoopBuffer> {
        generate_loop(instrument, duration_seconds, sample_rate)
    }
}

/// Serves caller-supplied buffers. Instruments without a buffer are unavailable.
#[derive(Debug, Clone, Default)]
pub struct BufferSource {
    name: String,
    buffers: HashMap<InstrumentType, LoopBuffer>,
}

impl BufferSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffers: HashMap::new(),
        }
    }

    pub fn insert(mut self, instrument: InstrumentType, buffer: LoopBuffer) -> Self {
        self.buffers.insert(instrument, buffer);
        self
    }
}

impl LoopSource for BufferSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(
        &self,
        instrument: InstrumentType,
        _duration_seconds: f32,
        sample_rate: u32,
    ) -> Result<LoopBuffer> {
        let buffer = self
            .buffers
            .get(&instrument)
            .ok_or_else(|| MixerError::unavailable(format!("no {instrument} buffer")))?;
        buffer.validate_for(sample_rate)?;
        Ok(buffer.clone())
    }
}

/// Ordered chain of sources ending in procedural synthesis.
#[derive(Default)]
pub struct FallbackSource {
    sources: Vec<Box<dyn LoopSource>>,
}

impl FallbackSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl LoopSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl LoopSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback"
    }

    fn load(
        &self,
        instrument: InstrumentType,
        duration_seconds: f32,
        sample_rate: u32,
    ) -> Result<LoopBuffer> {
        for source in &self.sources {
            let loaded = source
                .load(instrument, duration_seconds, sample_rate)
                .and_then(|buffer| buffer.validate_for(sample_rate).map(|()| buffer));

            match loaded {
                Ok(buffer) => {
                    debug!(source = source.name(), %instrument, "loop loaded");
                    return Ok(buffer);
                }
                Err(err) => {
                    debug!(source = source.name(), %instrument, error = %err, "loop source failed");
                }
            }
        }

        debug!(%instrument, "falling back to procedural synthesis");
        ProceduralSource.load(instrument, duration_seconds, sample_rate)
    }
}
