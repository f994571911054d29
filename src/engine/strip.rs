use std::sync::Arc;

use crate::{
    config::AnalyzerConfig,
    dsp::{amplify::GainRamp, analyzer::Analyzer, filter::SVFilter, pan::StereoPanner},
    engine::message::StripSettings,
    graph::RenderCtx,
    synth::LoopBuffer,
};

/*
Channel Strip Graph
===================

The fixed render chain of one channel:

    loop ──→ high shelf ──→ mid bell ──→ low shelf ──→ gain ──→ pan ──┬──→ bus
             10 kHz          1 kHz, Q 1   100 Hz                      └──→ analyser

Each EQ stage is a pair of state-variable filters (one per side). At 0 dB
every stage passes its input through unchanged.

The loop is read from its own start each time the feed starts. It is not
locked to the transport clock.
*/

pub const HIGH_SHELF_HZ: f32 = 10_000.0;
pub const MID_BELL_HZ: f32 = 1_000.0;
pub const MID_BELL_Q: f32 = 1.0;
pub const LOW_SHELF_HZ: f32 = 100.0;

/// Two-sided EQ stage.
struct StereoFilter {
    sides: [SVFilter; 2],
}

impl StereoFilter {
    fn new(filter: SVFilter) -> Self {
        Self {
            sides: [filter.clone(), filter],
        }
    }

    fn set_gain_db(&mut self, gain_db: f32) {
        for side in &mut self.sides {
            side.set_gain_db(gain_db);
        }
    }

    fn render(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        let [l, r] = &mut self.sides;
        l.render(left, ctx);
        r.render(right, ctx);
    }

    fn reset(&mut self) {
        for side in &mut self.sides {
            side.reset();
        }
    }
}

pub struct StripGraph {
    buffer: Arc<LoopBuffer>,
    position: usize,
    feeding: bool,
    high: StereoFilter,
    mid: StereoFilter,
    low: StereoFilter,
    gain: GainRamp,
    panner: StereoPanner,
    analyzer: Analyzer,
    settings: StripSettings,
}

impl StripGraph {
    pub fn new(buffer: Arc<LoopBuffer>, analyzer: &AnalyzerConfig) -> Self {
        Self {
            buffer,
            position: 0,
            feeding: false,
            high: StereoFilter::new(SVFilter::high_shelf(HIGH_SHELF_HZ, 0.0)),
            mid: StereoFilter::new(SVFilter::bell(MID_BELL_HZ, MID_BELL_Q, 0.0)),
            low: StereoFilter::new(SVFilter::low_shelf(LOW_SHELF_HZ, 0.0)),
            gain: GainRamp::new(0.0),
            panner: StereoPanner::default(),
            analyzer: Analyzer::new(analyzer),
            settings: StripSettings::default(),
        }
    }

    pub fn is_feeding(&self) -> bool {
        self.feeding
    }

    /// Read position inside the loop, in frames.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn settings(&self) -> StripSettings {
        self.settings
    }

    pub fn configure(&mut self, settings: StripSettings) {
        self.high.set_gain_db(settings.eq_high_db);
        self.mid.set_gain_db(settings.eq_mid_db);
        self.low.set_gain_db(settings.eq_low_db);
        self.gain.set_target(settings.gain);
        self.panner.set_pan(settings.pan);
        self.settings = settings;
    }

    /// Idle → Feeding from the loop start. Already feeding: no-op.
    pub fn start(&mut self) {
        if self.feeding {
            return;
        }
        self.position = 0;
        self.high.reset();
        self.mid.reset();
        self.low.reset();
        self.gain.snap();
        self.feeding = true;
    }

    /// Feeding → Idle. Already idle: no-op.
    pub fn stop(&mut self) {
        if !self.feeding {
            return;
        }
        self.feeding = false;
        self.analyzer.reset();
    }

    /// Tear down any running feed and start again from the loop start.
    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    /// Current analyser level (0-100); 0 while idle.
    pub fn level(&self) -> f32 {
        if self.feeding {
            self.analyzer.level()
        } else {
            0.0
        }
    }

    /// Render one block of post-pan output. Writes silence while idle.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        if !self.feeding {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let frames = self.buffer.frames();
        let (src_l, src_r) = (self.buffer.left(), self.buffer.right());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = src_l[self.position];
            *r = src_r[self.position];
            self.position += 1;
            if self.position == frames {
                self.position = 0;
            }
        }

        self.high.render(left, right, ctx);
        self.mid.render(left, right, ctx);
        self.low.render(left, right, ctx);
        self.gain.render(left, right);
        self.panner.render(left, right);

        self.analyzer.push_downmix(left, right);
        self.analyzer.analyse();
    }
}
