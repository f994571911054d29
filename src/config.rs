//! Session configuration.
//!
//! Built with chained setters, validated once when a session is created.
//!
//! ```ignore
//! let config = MixerConfig::new()
//!     .sample_rate(44_100)
//!     .loop_seconds(8.0)
//!     .master_volume(80);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{MixerError, Result},
    synth::MAX_LOOP_SECONDS,
};

/// Spectrum analyser settings shared by every channel tap and the master bus.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    /// FFT length in samples (power of two). Produces `fft_size / 2` bins.
    pub fft_size: usize,
    /// Per-bin smoothing time constant in `[0, 1)`.
    pub smoothing: f32,
    /// Magnitude mapped to byte value 0.
    pub min_db: f32,
    /// Magnitude mapped to byte value 255.
    pub max_db: f32,
    /// Multiplier applied to the normalised average before clamping to 100.
    pub sensitivity: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing: 0.8,
            min_db: -100.0,
            max_db: -30.0,
            sensitivity: 1.2,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MixerConfig {
    pub sample_rate: u32,
    /// Requested loop length; rounded per instrument to whole pattern cycles.
    pub loop_seconds: f32,
    /// Transport auto-stop point.
    pub max_duration_secs: u32,
    /// Initial master fader position (0-100).
    pub master_volume: u8,
    /// Capacity of the control → render message queue.
    pub queue_capacity: usize,
    pub analyzer: AnalyzerConfig,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            loop_seconds: 8.0,
            max_duration_secs: 180,
            master_volume: 80,
            queue_capacity: 1024,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl MixerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn loop_seconds(mut self, seconds: f32) -> Self {
        self.loop_seconds = seconds;
        self
    }

    pub fn max_duration_secs(mut self, seconds: u32) -> Self {
        self.max_duration_secs = seconds;
        self
    }

    pub fn master_volume(mut self, volume: u8) -> Self {
        self.master_volume = volume.min(100);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MixerError::invalid_config("sample rate must be positive"));
        }
        if !self.loop_seconds.is_finite() || self.loop_seconds <= 0.0 {
            return Err(MixerError::invalid_config(format!(
                "loop length must be a positive number of seconds, got {}",
                self.loop_seconds
            )));
        }
        if self.loop_seconds > MAX_LOOP_SECONDS {
            return Err(MixerError::invalid_config(format!(
                "loop length {} s exceeds the {MAX_LOOP_SECONDS} s limit",
                self.loop_seconds
            )));
        }
        if self.max_duration_secs == 0 {
            return Err(MixerError::invalid_config("max duration must be at least one second"));
        }
        if self.queue_capacity == 0 {
            return Err(MixerError::invalid_config("queue capacity must be positive"));
        }

        let analyzer = &self.analyzer;
        if analyzer.fft_size < 32 || !analyzer.fft_size.is_power_of_two() {
            return Err(MixerError::invalid_config(format!(
                "fft size must be a power of two >= 32, got {}",
                analyzer.fft_size
            )));
        }
        if !(0.0..1.0).contains(&analyzer.smoothing) {
            return Err(MixerError::invalid_config("analyser smoothing must be in [0, 1)"));
        }
        if analyzer.min_db >= analyzer.max_db {
            return Err(MixerError::invalid_config("analyser min_db must be below max_db"));
        }
        if !analyzer.sensitivity.is_finite() || analyzer.sensitivity <= 0.0 {
            return Err(MixerError::invalid_config("analyser sensitivity must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MixerConfig::default().validate().is_ok());
    }

    #[test]
    fn master_volume_setter_clamps() {
        assert_eq!(MixerConfig::new().master_volume(250).master_volume, 100);
    }

    #[test]
    fn rejects_bad_loop_length() {
        for seconds in [0.0, -1.0, f32::NAN, f32::INFINITY, 1.0e30, MAX_LOOP_SECONDS * 2.0] {
            let err = MixerConfig::new().loop_seconds(seconds).validate().unwrap_err();
            assert!(matches!(err, MixerError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn rejects_non_power_of_two_fft() {
        let analyzer = AnalyzerConfig {
            fft_size: 300,
            ..AnalyzerConfig::default()
        };
        assert!(MixerConfig::new().analyzer(analyzer).validate().is_err());
    }

    #[test]
    fn rejects_inverted_db_range() {
        let analyzer = AnalyzerConfig {
            min_db: -30.0,
            max_db: -100.0,
            ..AnalyzerConfig::default()
        };
        assert!(MixerConfig::new().analyzer(analyzer).validate().is_err());
    }
}
