//! The loop synthesizer.
//!
//! `generate_loop` bounces an instrument's pattern to a stereo `LoopBuffer`
//! whose length is a whole number of pattern cycles. Output is deterministic:
//! the same instrument, duration and sample rate always give the same samples.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MixerError, Result};

pub(crate) mod bounce;
mod buffer;
mod source;

pub use buffer::{LoopBuffer, CHANNEL_COUNT};
pub use source::{BufferSource, FallbackSource, LoopSource, ProceduralSource};

/// Sample rates `generate_loop` accepts.
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=384_000;

/// Longest loop `generate_loop` will render, before rounding to whole cycles.
pub const MAX_LOOP_SECONDS: f32 = 600.0;

/// Upper bound on the frames of one rendered loop.
pub const MAX_LOOP_FRAMES: usize = 1 << 26;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentType {
    Drum,
    Bass,
    Vocal,
    Pad,
}

impl InstrumentType {
    pub const ALL: [InstrumentType; 4] = [
        InstrumentType::Drum,
        InstrumentType::Bass,
        InstrumentType::Vocal,
        InstrumentType::Pad,
    ];

    /// Length of one full pattern cycle.
    pub fn cycle_seconds(self) -> f32 {
        match self {
            InstrumentType::Drum => 2.0,
            InstrumentType::Bass => 8.0,
            InstrumentType::Vocal => 4.0,
            InstrumentType::Pad => 8.0,
        }
    }

    /// Whole cycles closest to `requested` seconds, at least one.
    pub fn cycles_for(self, requested: f32) -> usize {
        (requested / self.cycle_seconds()).round().max(1.0) as usize
    }

    /// The loop length `generate_loop` actually renders for `requested`.
    pub fn loop_seconds(self, requested: f32) -> f32 {
        self.cycles_for(requested) as f32 * self.cycle_seconds()
    }

    /// Scalar applied to the summed voices before clamping.
    fn headroom(self) -> f32 {
        match self {
            InstrumentType::Drum => 0.5,
            InstrumentType::Bass => 0.7,
            InstrumentType::Vocal => 0.6,
            InstrumentType::Pad => 0.3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentType::Drum => "drum",
            InstrumentType::Bass => "bass",
            InstrumentType::Vocal => "vocal",
            InstrumentType::Pad => "pad",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drum" | "drums" => Ok(InstrumentType::Drum),
            "bass" => Ok(InstrumentType::Bass),
            "vocal" | "vocals" => Ok(InstrumentType::Vocal),
            "pad" | "pads" => Ok(InstrumentType::Pad),
            other => Err(MixerError::invalid_config(format!(
                "unknown instrument type `{other}`"
            ))),
        }
    }
}

/// Render a seamless stereo loop for `instrument`.
///
/// `duration_seconds` is rounded to the nearest whole number of pattern
/// cycles (minimum one). Fails with `InvalidConfiguration` for a non-finite
/// or non-positive duration, a duration above `MAX_LOOP_SECONDS`, a sample
/// rate outside `SAMPLE_RATE_RANGE`, or a loop longer than `MAX_LOOP_FRAMES`.
pub fn generate_loop(
    instrument: InstrumentType,
    duration_seconds: f32,
    sample_rate: u32,
) -> Result<LoopBuffer> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(MixerError::invalid_config(format!(
            "loop duration must be a positive number of seconds, got {duration_seconds}"
        )));
    }
    if duration_seconds > MAX_LOOP_SECONDS {
        return Err(MixerError::invalid_config(format!(
            "loop duration {duration_seconds} s exceeds the {MAX_LOOP_SECONDS} s limit"
        )));
    }
    if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
        return Err(MixerError::invalid_config(format!(
            "sample rate {sample_rate} Hz is outside {}..={} Hz",
            SAMPLE_RATE_RANGE.start(),
            SAMPLE_RATE_RANGE.end()
        )));
    }

    let cycles = instrument.cycles_for(duration_seconds);
    let cycle_frames = bounce::seconds_to_frames(instrument.cycle_seconds(), sample_rate);
    match cycle_frames.checked_mul(cycles) {
        Some(frames) if frames <= MAX_LOOP_FRAMES => {}
        _ => {
            return Err(MixerError::invalid_config(format!(
                "{cycles} cycles of {instrument} at {sample_rate} Hz exceed {MAX_LOOP_FRAMES} frames"
            )))
        }
    }
    let mut samples = bounce::bounce(instrument, cycles, sample_rate);

    let headroom = instrument.headroom();
    for sample in samples.iter_mut() {
        *sample = (*sample * headroom).clamp(-1.0, 1.0);
    }

    Ok(LoopBuffer::from_mono(samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn durations_round_to_whole_cycles() {
        assert_eq!(InstrumentType::Drum.loop_seconds(8.0), 8.0);
        assert_eq!(InstrumentType::Drum.loop_seconds(4.9), 4.0);
        assert_eq!(InstrumentType::Vocal.loop_seconds(7.0), 8.0);
        assert_eq!(InstrumentType::Bass.loop_seconds(1.0), 8.0);
        assert_eq!(InstrumentType::Pad.loop_seconds(19.0), 16.0);
    }

    #[test]
    fn buffer_length_matches_rounded_duration() {
        let buffer = generate_loop(InstrumentType::Vocal, 5.0, 8_000).unwrap();
        assert_eq!(buffer.frames(), 4 * 8_000);
        assert_eq!(buffer.duration_seconds(), 4.0);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.left(), buffer.right());
    }

    #[test]
    fn invalid_inputs_are_configuration_errors() {
        for duration in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = generate_loop(InstrumentType::Pad, duration, 48_000).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        }
        let err = generate_loop(InstrumentType::Pad, 8.0, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn oversized_loops_are_refused_before_rendering() {
        for duration in [1.0e30, f32::MAX, 1.0e6, MAX_LOOP_SECONDS + 1.0] {
            let err = generate_loop(InstrumentType::Drum, duration, 8_000).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration, "{duration}");
        }
        // within the time limit but too many frames at the top sample rate
        let err = generate_loop(InstrumentType::Pad, MAX_LOOP_SECONDS, 384_000).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn instrument_names_parse() {
        for instrument in InstrumentType::ALL {
            assert_eq!(instrument.as_str().parse::<InstrumentType>().unwrap(), instrument);
        }
        assert!("theremin".parse::<InstrumentType>().is_err());
    }
}
