use std::{fmt, ops::RangeInclusive, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MixerError;

/*
Channel Parameters
==================

  gain_db                  [-20, 20]
  eq_high/mid/low_db       [-12, 12]
  pan                      [-100, 100]
  volume                   0-100, whole steps

Out-of-range values are clamped to the nearest bound and the clamped value is
what gets stored (and returned). NaN has no nearest bound and is ignored.

Gain mapping
------------

    effective_gain = muted ? 0 : gain_db / 20 + volume / 100 · master / 100 · 0.6

The two terms add. gain_db = 20 with the fader at 0 gives exactly 1.0, and
gain_db = -20 with the fader at 0 gives -1.0 (inverted polarity).

    pan_value = pan / 100
*/

pub const GAIN_DB_RANGE: RangeInclusive<f32> = -20.0..=20.0;
pub const EQ_DB_RANGE: RangeInclusive<f32> = -12.0..=12.0;
pub const PAN_RANGE: RangeInclusive<f32> = -100.0..=100.0;
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=100.0;

/// Share of full scale the volume × master term can contribute.
pub const FADER_SCALE: f32 = 0.6;

#[inline]
pub fn effective_gain(gain_db: f32, volume: u8, master_volume: u8, muted: bool) -> f32 {
    if muted {
        return 0.0;
    }
    gain_db / 20.0 + (volume as f32 / 100.0) * (master_volume as f32 / 100.0) * FADER_SCALE
}

/// [-100, 100] → [-1, 1]
#[inline]
pub fn pan_value(pan: f32) -> f32 {
    pan / 100.0
}

/// [-1, 1] → [-100, 100]
#[inline]
pub fn unmap_pan(value: f32) -> f32 {
    value * 100.0
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelParam {
    GainDb,
    EqHighDb,
    EqMidDb,
    EqLowDb,
    Pan,
    Volume,
}

impl ChannelParam {
    pub const ALL: [ChannelParam; 6] = [
        ChannelParam::GainDb,
        ChannelParam::EqHighDb,
        ChannelParam::EqMidDb,
        ChannelParam::EqLowDb,
        ChannelParam::Pan,
        ChannelParam::Volume,
    ];

    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            ChannelParam::GainDb => GAIN_DB_RANGE,
            ChannelParam::EqHighDb | ChannelParam::EqMidDb | ChannelParam::EqLowDb => EQ_DB_RANGE,
            ChannelParam::Pan => PAN_RANGE,
            ChannelParam::Volume => VOLUME_RANGE,
        }
    }

    /// Clamp into range. Volume is also rounded to a whole step.
    pub fn clamp(self, value: f32) -> f32 {
        let value = match self {
            ChannelParam::Volume => value.round(),
            _ => value,
        };
        value.clamp(*self.range().start(), *self.range().end())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelParam::GainDb => "gain_db",
            ChannelParam::EqHighDb => "eq_high_db",
            ChannelParam::EqMidDb => "eq_mid_db",
            ChannelParam::EqLowDb => "eq_low_db",
            ChannelParam::Pan => "pan",
            ChannelParam::Volume => "volume",
        }
    }
}

impl fmt::Display for ChannelParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelParam {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gain_db" | "gain" => Ok(ChannelParam::GainDb),
            "eq_high_db" | "high" => Ok(ChannelParam::EqHighDb),
            "eq_mid_db" | "mid" => Ok(ChannelParam::EqMidDb),
            "eq_low_db" | "low" => Ok(ChannelParam::EqLowDb),
            "pan" => Ok(ChannelParam::Pan),
            "volume" => Ok(ChannelParam::Volume),
            _ => Err(MixerError::UnknownParameter(s.to_string())),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelParameters {
    pub gain_db: f32,
    pub eq_high_db: f32,
    pub eq_mid_db: f32,
    pub eq_low_db: f32,
    pub pan: f32,
    pub volume: u8,
    pub muted: bool,
    pub solo: bool,
}

impl Default for ChannelParameters {
    fn default() -> Self {
        Self {
            gain_db: 0.0,
            eq_high_db: 0.0,
            eq_mid_db: 0.0,
            eq_low_db: 0.0,
            pan: 0.0,
            volume: 75,
            muted: false,
            solo: false,
        }
    }
}

impl ChannelParameters {
    pub fn get(&self, param: ChannelParam) -> f32 {
        match param {
            ChannelParam::GainDb => self.gain_db,
            ChannelParam::EqHighDb => self.eq_high_db,
            ChannelParam::EqMidDb => self.eq_mid_db,
            ChannelParam::EqLowDb => self.eq_low_db,
            ChannelParam::Pan => self.pan,
            ChannelParam::Volume => self.volume as f32,
        }
    }

    /// Store a clamped value and return what was stored.
    pub fn set(&mut self, param: ChannelParam, value: f32) -> f32 {
        if value.is_nan() {
            return self.get(param);
        }
        let value = param.clamp(value);
        match param {
            ChannelParam::GainDb => self.gain_db = value,
            ChannelParam::EqHighDb => self.eq_high_db = value,
            ChannelParam::EqMidDb => self.eq_mid_db = value,
            ChannelParam::EqLowDb => self.eq_low_db = value,
            ChannelParam::Pan => self.pan = value,
            ChannelParam::Volume => self.volume = value as u8,
        }
        value
    }
}
