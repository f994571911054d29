use std::sync::atomic::{AtomicU32, Ordering};

/// Published meter levels, 0-100.
///
/// The render path is the only writer; any number of control-side readers
/// poll it. Each level is an `f32` stored as its bit pattern.
#[derive(Debug)]
pub struct MeterBank {
    channels: Vec<AtomicU32>,
    master: [AtomicU32; 2],
}

impl MeterBank {
    pub fn new(channels: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| AtomicU32::new(0)).collect(),
            master: [AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub(crate) fn publish_channel(&self, slot: usize, level: f32) {
        if let Some(meter) = self.channels.get(slot) {
            meter.store(clamp_level(level).to_bits(), Ordering::Relaxed);
        }
    }

    pub(crate) fn publish_master(&self, left: f32, right: f32) {
        self.master[0].store(clamp_level(left).to_bits(), Ordering::Relaxed);
        self.master[1].store(clamp_level(right).to_bits(), Ordering::Relaxed);
    }

    /// Latest level of `slot`; 0 for slots that do not exist.
    pub fn channel_level(&self, slot: usize) -> f32 {
        self.channels
            .get(slot)
            .map_or(0.0, |meter| f32::from_bits(meter.load(Ordering::Relaxed)))
    }

    pub fn master_levels(&self) -> (f32, f32) {
        (
            f32::from_bits(self.master[0].load(Ordering::Relaxed)),
            f32::from_bits(self.master[1].load(Ordering::Relaxed)),
        )
    }

    pub(crate) fn clear(&self) {
        for meter in self.channels.iter().chain(self.master.iter()) {
            meter.store(0.0f32.to_bits(), Ordering::Relaxed);
        }
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
