/// Convert MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// What a node is asked to render.
///
/// - `sample_rate`: samples per second
/// - `frequency`: pitch of the note being rendered (Hz)
/// - `velocity`: hit strength, 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frequency: f32,
    pub velocity: f32,
}

impl RenderCtx {
    pub fn from_note(sample_rate: f32, note: u8, velocity: f32) -> Self {
        Self::from_freq(sample_rate, midi_note_to_freq(note), velocity)
    }

    pub fn from_freq(sample_rate: f32, frequency: f32, velocity: f32) -> Self {
        Self {
            sample_rate,
            frequency,
            velocity,
        }
    }
}

/// Nodes whose parameters can be driven by a modulation source.
pub trait Modulatable: Send {
    type Param: Copy + Send;

    fn get_param(&self, param: Self::Param) -> f32;

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32);
}

/// A mono audio-processing node.
///
/// Sources overwrite `out`; effects process it in place.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Gate high. Default: nothing to trigger.
    fn note_on(&mut self, _ctx: &RenderCtx) {}

    /// Gate low. Default: nothing to release.
    fn note_off(&mut self, _ctx: &RenderCtx) {}

    /// Whether the node is still producing sound.
    ///
    /// The loop renderer stops rendering a hit once this goes false.
    fn is_active(&self) -> bool {
        true
    }
}

impl GraphNode for Box<dyn GraphNode> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(out, ctx)
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        (**self).note_on(ctx)
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        (**self).note_off(ctx)
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
