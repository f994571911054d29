use crate::error::{MixerError, Result};

/// Every loop buffer is stereo.
pub const CHANNEL_COUNT: usize = 2;

/// A fixed-length, seamlessly repeatable stereo sample buffer.
///
/// Immutable once built; strips share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopBuffer {
    sample_rate: u32,
    channels: [Vec<f32>; CHANNEL_COUNT],
}

impl LoopBuffer {
    /// Duplicate a mono render onto both channels.
    pub(crate) fn from_mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: [samples.clone(), samples],
        }
    }

    /// Build a buffer from externally supplied channel data.
    ///
    /// Fails with `InvalidConfiguration` unless both channels are non-empty,
    /// equally long, and hold finite samples in [-1, 1].
    pub fn from_channels(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        let buffer = Self {
            sample_rate,
            channels: [left, right],
        };
        buffer.check_contents()?;
        Ok(buffer)
    }

    /// Build a buffer from interleaved frames. Only stereo data is accepted.
    pub fn from_interleaved(data: &[f32], channel_count: usize, sample_rate: u32) -> Result<Self> {
        if channel_count != CHANNEL_COUNT {
            return Err(MixerError::invalid_config(format!(
                "loop buffers are stereo, got {channel_count} channel(s)"
            )));
        }
        if data.len() % CHANNEL_COUNT != 0 {
            return Err(MixerError::invalid_config("interleaved data ends mid-frame"));
        }

        let (left, right) = data.chunks_exact(CHANNEL_COUNT).map(|f| (f[0], f[1])).unzip();
        Self::from_channels(left, right, sample_rate)
    }

    fn check_contents(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MixerError::invalid_config("loop buffer sample rate must be non-zero"));
        }
        let [left, right] = &self.channels;
        if left.is_empty() {
            return Err(MixerError::invalid_config("loop buffer is empty"));
        }
        if left.len() != right.len() {
            return Err(MixerError::invalid_config(format!(
                "channel lengths differ ({} vs {})",
                left.len(),
                right.len()
            )));
        }
        let in_range = |s: &f32| s.is_finite() && (-1.0..=1.0).contains(s);
        if !left.iter().chain(right.iter()).all(in_range) {
            return Err(MixerError::invalid_config("loop buffer holds samples outside [-1, 1]"));
        }
        Ok(())
    }

    /// Check the buffer can be played at `sample_rate` without resampling.
    pub fn validate_for(&self, sample_rate: u32) -> Result<()> {
        self.check_contents()?;
        if self.sample_rate != sample_rate {
            return Err(MixerError::invalid_config(format!(
                "loop buffer is {} Hz, session runs at {sample_rate} Hz",
                self.sample_rate
            )));
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        CHANNEL_COUNT
    }

    /// Length in sample frames.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration_seconds(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn left(&self) -> &[f32] {
        &self.channels[0]
    }

    pub fn right(&self) -> &[f32] {
        &self.channels[1]
    }
}
