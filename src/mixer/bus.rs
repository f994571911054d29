use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    engine::MeterBank,
    mixer::{params::ChannelParameters, ChannelStrip},
};

/// Master section as seen from the control side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterState {
    pub volume: u8,
    pub left_meter: f32,
    pub right_meter: f32,
}

/// Solo overrides mute: with any strip soloed, only soloed strips are heard.
#[inline]
pub fn is_audible(params: &ChannelParameters, solo_active: bool) -> bool {
    if solo_active {
        params.solo
    } else {
        !params.muted
    }
}

pub fn solo_active(strips: &[ChannelStrip]) -> bool {
    strips.iter().any(|strip| strip.parameters().solo)
}

/// Control half of the mixing bus: master fader and published master meters.
#[derive(Debug)]
pub struct MixBus {
    volume: u8,
    meters: Arc<MeterBank>,
}

impl MixBus {
    pub fn new(volume: u8, meters: Arc<MeterBank>) -> Self {
        Self {
            volume: volume.min(100),
            meters,
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Clamp, round and store. Returns the stored fader position.
    pub fn set_volume(&mut self, volume: f32) -> u8 {
        if !volume.is_nan() {
            self.volume = volume.round().clamp(0.0, 100.0) as u8;
        }
        self.volume
    }

    /// Linear gain applied after the sum.
    pub fn master_gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }

    pub fn meters(&self) -> &Arc<MeterBank> {
        &self.meters
    }

    /// Master meter levels; exactly zero unless `playing`.
    pub fn levels(&self, playing: bool) -> (f32, f32) {
        if playing {
            self.meters.master_levels()
        } else {
            (0.0, 0.0)
        }
    }

    pub fn state(&self, playing: bool) -> MasterState {
        let (left_meter, right_meter) = self.levels(playing);
        MasterState {
            volume: self.volume,
            left_meter,
            right_meter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(muted: bool, solo: bool) -> ChannelParameters {
        ChannelParameters {
            muted,
            solo,
            ..ChannelParameters::default()
        }
    }

    #[test]
    fn solo_silences_everything_else() {
        assert!(!is_audible(&params(false, false), true));
        assert!(is_audible(&params(false, true), true));
        // soloed and muted: solo wins
        assert!(is_audible(&params(true, true), true));
    }

    #[test]
    fn without_solo_mute_decides() {
        assert!(is_audible(&params(false, false), false));
        assert!(!is_audible(&params(true, false), false));
    }

    #[test]
    fn volume_is_clamped_and_rounded() {
        let mut bus = MixBus::new(80, Arc::new(MeterBank::new(0)));
        assert_eq!(bus.set_volume(140.0), 100);
        assert_eq!(bus.set_volume(33.4), 33);
        assert_eq!(bus.set_volume(f32::NAN), 33);
        assert_eq!(bus.set_volume(-2.0), 0);
        assert_eq!(bus.master_gain(), 0.0);
    }

    #[test]
    fn stopped_bus_reads_zero() {
        let meters = Arc::new(MeterBank::new(0));
        meters.publish_master(40.0, 55.0);
        let bus = MixBus::new(80, meters);
        assert_eq!(bus.levels(false), (0.0, 0.0));
        assert_eq!(bus.levels(true), (40.0, 55.0));
        assert_eq!(bus.state(true).volume, 80);
    }
}
