//! The render path.
//!
//! `MixEngine` owns every channel's `StripGraph`, sums them on the bus, applies
//! the master gain, and publishes meter levels. It is driven by an
//! `AudioBackend` and receives control changes only through its message
//! queue, so it never waits on the control side.

use std::sync::Arc;

use rtrb::Consumer;

use crate::{
    config::MixerConfig,
    dsp::{amplify::GainRamp, analyzer::Analyzer},
    graph::RenderCtx,
    synth::LoopBuffer,
    MAX_BLOCK_SIZE,
};

pub mod backend;
pub mod message;
pub mod meter;
pub mod strip;

pub use backend::{AudioBackend, CpalBackend, OfflineBackend, OfflineHandle, OpenError};
pub use message::{EngineMessage, StripSettings};
pub use meter::MeterBank;
pub use strip::StripGraph;

/*
Bus Layout
==========

    strip 0 ──┐
    strip 1 ──┼──→ (+) ──→ master gain ──┬──→ output L/R
    strip 2 ──┤                          ├──→ analyser L
    strip 3 ──┘                          └──→ analyser R

Every call to `process` first drains the message queue, then renders in
chunks of at most MAX_BLOCK_SIZE frames. Meters are refreshed once per chunk.
*/

pub struct MixEngine {
    strips: Vec<StripGraph>,
    rx: Consumer<EngineMessage>,
    meters: Arc<MeterBank>,
    ctx: RenderCtx,
    master: GainRamp,
    master_analyzers: [Analyzer; 2],
    strip_l: Vec<f32>,
    strip_r: Vec<f32>,
    bus_l: Vec<f32>,
    bus_r: Vec<f32>,
}

impl MixEngine {
    pub fn new(
        buffers: Vec<Arc<LoopBuffer>>,
        config: &MixerConfig,
        rx: Consumer<EngineMessage>,
        meters: Arc<MeterBank>,
    ) -> Self {
        let strips = buffers
            .into_iter()
            .map(|buffer| StripGraph::new(buffer, &config.analyzer))
            .collect();

        Self {
            strips,
            rx,
            meters,
            ctx: RenderCtx::from_freq(config.sample_rate as f32, 0.0, 1.0),
            master: GainRamp::new(config.master_volume as f32 / 100.0),
            master_analyzers: [
                Analyzer::new(&config.analyzer),
                Analyzer::new(&config.analyzer),
            ],
            strip_l: vec![0.0; MAX_BLOCK_SIZE],
            strip_r: vec![0.0; MAX_BLOCK_SIZE],
            bus_l: vec![0.0; MAX_BLOCK_SIZE],
            bus_r: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.ctx.sample_rate as u32
    }

    pub fn strips(&self) -> &[StripGraph] {
        &self.strips
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.pop() {
            match msg {
                EngineMessage::StartFeed { slot } => {
                    if let Some(strip) = self.strips.get_mut(slot) {
                        strip.start();
                    }
                }
                EngineMessage::StopFeed { slot } => {
                    if let Some(strip) = self.strips.get_mut(slot) {
                        strip.stop();
                        self.meters.publish_channel(slot, 0.0);
                    }
                }
                EngineMessage::RestartFeed { slot } => {
                    if let Some(strip) = self.strips.get_mut(slot) {
                        strip.restart();
                    }
                }
                EngineMessage::Configure { slot, settings } => {
                    if let Some(strip) = self.strips.get_mut(slot) {
                        strip.configure(settings);
                    }
                }
                EngineMessage::MasterGain(gain) => self.master.set_target(gain),
            }
        }
    }

    /// Render into separate left and right buffers.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.drain_messages();

        let frames = left.len().min(right.len());
        let mut offset = 0;
        while offset < frames {
            let n = (frames - offset).min(MAX_BLOCK_SIZE);
            self.render_chunk(n);
            left[offset..offset + n].copy_from_slice(&self.bus_l[..n]);
            right[offset..offset + n].copy_from_slice(&self.bus_r[..n]);
            offset += n;
        }
    }

    /// Render into an interleaved device buffer with `channels` channels.
    ///
    /// Channel 0 gets the left bus, channel 1 the right, any others silence.
    /// A mono device gets the downmix.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        self.drain_messages();
        if channels == 0 {
            return;
        }

        let frames = data.len() / channels;
        let mut offset = 0;
        while offset < frames {
            let n = (frames - offset).min(MAX_BLOCK_SIZE);
            self.render_chunk(n);

            let out = &mut data[offset * channels..(offset + n) * channels];
            for (i, frame) in out.chunks_exact_mut(channels).enumerate() {
                let (l, r) = (self.bus_l[i], self.bus_r[i]);
                if channels == 1 {
                    frame[0] = 0.5 * (l + r);
                    continue;
                }
                frame[0] = l;
                frame[1] = r;
                frame[2..].fill(0.0);
            }
            offset += n;
        }
    }

    fn render_chunk(&mut self, n: usize) {
        let bus_l = &mut self.bus_l[..n];
        let bus_r = &mut self.bus_r[..n];
        bus_l.fill(0.0);
        bus_r.fill(0.0);

        for (slot, strip) in self.strips.iter_mut().enumerate() {
            let (l, r) = (&mut self.strip_l[..n], &mut self.strip_r[..n]);
            strip.render(l, r, &self.ctx);

            if strip.is_feeding() {
                for (bus, &s) in bus_l.iter_mut().zip(l.iter()) {
                    *bus += s;
                }
                for (bus, &s) in bus_r.iter_mut().zip(r.iter()) {
                    *bus += s;
                }
            }
            self.meters.publish_channel(slot, strip.level());
        }

        self.master.render(bus_l, bus_r);

        let [meter_l, meter_r] = &mut self.master_analyzers;
        meter_l.push(bus_l);
        meter_r.push(bus_r);
        self.meters
            .publish_master(meter_l.analyse(), meter_r.analyse());
    }
}
