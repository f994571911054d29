use crate::{
    graph::{midi_note_to_freq, GraphNode, RenderCtx},
    synth::InstrumentType,
    voices,
};

/*
Offline Loop Bounce
===================

A loop is rendered once, offline, by scheduling voice hits on a grid and
summing them into a mono buffer:

    for each hit in the score:
        build a fresh voice graph
        note_on, render until the gate closes, note_off
        keep rendering until the voice goes inactive (or a full loop has passed)
        add every sample at (start + n) mod loop_length

The modulo is what makes the loop seamless: a tail that rings past the end of
the buffer lands at its beginning, exactly where it would continue if the loop
were played twice in a row. Sample `len - 1` followed by sample `0` is then
the same continuous signal as any other pair of neighbours.

Timing
------

All instruments share 120 BPM: one beat = 0.5 s, one bar = 2 s.

  Drum    one bar per cycle
            kick    beat 1
            snare   beats 2 and 4
            hat     every beat, plus softer off-beat accents
  Bass    A1 C2 D2 E2, 2 s per note            (8 s cycle)
  Vocal   A4 C5 E5 D5 C5 A4, 0.5 s per note,
          then 1 s of rest                     (4 s cycle)
  Pad     Am F C G, 2 s per chord              (8 s cycle)

Melodic notes are gated so their release finishes at the next note boundary.

Noise voices take a seed derived from the hit index, so two bounces of the
same instrument and length are sample-identical.
*/

/// Frames rendered per voice call.
const RENDER_BLOCK: usize = 64;

const SEED_BASE: u64 = 0x5EED_100B;
const SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

const BEAT: f32 = 0.5;

const BASS_LINE: [u8; 4] = [33, 36, 38, 40];
const VOCAL_PHRASE: [u8; 6] = [69, 72, 76, 74, 72, 69];
const VOCAL_NOTE: f32 = 0.5;
const PAD_CHORDS: [[u8; 3]; 4] = [
    [57, 60, 64], // Am
    [53, 57, 60], // F
    [52, 55, 60], // C (first inversion)
    [55, 59, 62], // G
];
const CHORD_LENGTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum VoiceKind {
    Kick,
    Snare,
    Hat,
    Bass,
    Vocal,
    Pad,
}

/// One scheduled note or drum hit inside a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hit {
    kind: VoiceKind,
    /// Offset from the start of the cycle, seconds.
    at: f32,
    /// How long the gate stays high. `None` for one-shot drum hits.
    gate: Option<f32>,
    note: u8,
    velocity: f32,
}

impl Hit {
    fn drum(kind: VoiceKind, at: f32, velocity: f32) -> Self {
        Self {
            kind,
            at,
            gate: None,
            note: 0,
            velocity,
        }
    }

    fn note(kind: VoiceKind, at: f32, gate: f32, note: u8) -> Self {
        Self {
            kind,
            at,
            gate: Some(gate),
            note,
            velocity: 1.0,
        }
    }
}

/// The hits of one pattern cycle.
fn score(instrument: InstrumentType) -> Vec<Hit> {
    match instrument {
        InstrumentType::Drum => {
            let mut hits = vec![
                Hit::drum(VoiceKind::Kick, 0.0, 1.0),
                Hit::drum(VoiceKind::Snare, BEAT, 0.8),
                Hit::drum(VoiceKind::Snare, 3.0 * BEAT, 0.8),
            ];
            for beat in 0..4 {
                let at = beat as f32 * BEAT;
                hits.push(Hit::drum(VoiceKind::Hat, at, 0.35));
                hits.push(Hit::drum(VoiceKind::Hat, at + 0.5 * BEAT, 0.2));
            }
            hits
        }
        InstrumentType::Bass => {
            let length = 4.0 * BEAT;
            BASS_LINE
                .iter()
                .enumerate()
                .map(|(i, &note)| {
                    let gate = length - voices::BASS_RELEASE;
                    Hit::note(VoiceKind::Bass, i as f32 * length, gate, note)
                })
                .collect()
        }
        InstrumentType::Vocal => VOCAL_PHRASE
            .iter()
            .enumerate()
            .map(|(i, &note)| {
                let gate = VOCAL_NOTE - voices::VOCAL_RELEASE;
                Hit::note(VoiceKind::Vocal, i as f32 * VOCAL_NOTE, gate, note)
            })
            .collect(),
        InstrumentType::Pad => PAD_CHORDS
            .iter()
            .enumerate()
            .flat_map(|(i, chord)| {
                let gate = CHORD_LENGTH - voices::PAD_RELEASE;
                chord
                    .iter()
                    .map(move |&note| Hit::note(VoiceKind::Pad, i as f32 * CHORD_LENGTH, gate, note))
            })
            .collect(),
    }
}

/// Render `cycles` repetitions of the instrument's pattern into a mono buffer.
///
/// The result is not yet scaled or clamped.
pub(crate) fn bounce(instrument: InstrumentType, cycles: usize, sample_rate: u32) -> Vec<f32> {
    let cycle_frames = seconds_to_frames(instrument.cycle_seconds(), sample_rate);
    let total = cycle_frames.saturating_mul(cycles);
    let mut out = vec![0.0f32; total];
    if total == 0 {
        return out;
    }

    let pattern = score(instrument);
    let mut hit_index = 0u64;

    for cycle in 0..cycles {
        for hit in &pattern {
            let start = cycle * cycle_frames + seconds_to_frames(hit.at, sample_rate);
            let seed = SEED_BASE.wrapping_add(hit_index.wrapping_mul(SEED_STEP));
            hit_index += 1;

            let ctx = RenderCtx::from_freq(
                sample_rate as f32,
                midi_note_to_freq(hit.note),
                hit.velocity,
            );
            let gate = hit.gate.map(|g| seconds_to_frames(g, sample_rate));

            match hit.kind {
                VoiceKind::Kick => render_hit(voices::kick(seed), &ctx, start, gate, &mut out),
                VoiceKind::Snare => render_hit(voices::snare(seed), &ctx, start, gate, &mut out),
                VoiceKind::Hat => render_hit(voices::hihat(seed), &ctx, start, gate, &mut out),
                VoiceKind::Bass => render_hit(voices::bass(), &ctx, start, gate, &mut out),
                VoiceKind::Vocal => render_hit(voices::vocal(), &ctx, start, gate, &mut out),
                VoiceKind::Pad => render_hit(voices::pad(), &ctx, start, gate, &mut out),
            }
        }
    }

    out
}

pub(crate) fn seconds_to_frames(seconds: f32, sample_rate: u32) -> usize {
    (seconds as f64 * sample_rate as f64).round() as usize
}

/// Render one hit into `out`, wrapping around the end of the buffer.
fn render_hit<V: GraphNode>(
    mut voice: V,
    ctx: &RenderCtx,
    start: usize,
    gate: Option<usize>,
    out: &mut [f32],
) {
    let len = out.len();
    let mut block = [0.0f32; RENDER_BLOCK];
    let mut rendered = 0usize;

    voice.note_on(ctx);

    while rendered < len {
        let mut frames = RENDER_BLOCK.min(len - rendered);
        let gate_open = gate.is_some_and(|g| rendered < g);
        if let (true, Some(g)) = (gate_open, gate) {
            // split the block so note_off lands on the exact frame
            frames = frames.min(g - rendered);
        }

        let chunk = &mut block[..frames];
        voice.render_block(chunk, ctx);
        for (i, &sample) in chunk.iter().enumerate() {
            out[(start + rendered + i) % len] += sample;
        }
        rendered += frames;

        if gate_open && gate == Some(rendered) {
            voice.note_off(ctx);
        }
        if !gate_open && !voice.is_active() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drum_bar_has_expected_hits() {
        let hits = score(InstrumentType::Drum);
        let count = |kind| hits.iter().filter(|h| h.kind == kind).count();
        assert_eq!(count(VoiceKind::Kick), 1);
        assert_eq!(count(VoiceKind::Snare), 2);
        assert_eq!(count(VoiceKind::Hat), 8);
        assert!(hits.iter().all(|h| h.at < InstrumentType::Drum.cycle_seconds()));
    }

    #[test]
    fn melodic_notes_end_inside_their_slot() {
        for instrument in [InstrumentType::Bass, InstrumentType::Vocal, InstrumentType::Pad] {
            for hit in score(instrument) {
                let release = match hit.kind {
                    VoiceKind::Bass => voices::BASS_RELEASE,
                    VoiceKind::Vocal => voices::VOCAL_RELEASE,
                    _ => voices::PAD_RELEASE,
                };
                let end = hit.at + hit.gate.unwrap_or(0.0) + release;
                assert!(end <= instrument.cycle_seconds() + 1e-4, "{instrument:?} note ends at {end}");
            }
        }
    }

    #[test]
    fn vocal_phrase_leaves_a_rest() {
        let last_end = score(InstrumentType::Vocal)
            .iter()
            .map(|h| h.at + VOCAL_NOTE)
            .fold(0.0f32, f32::max);
        assert!(InstrumentType::Vocal.cycle_seconds() - last_end >= 1.0 - 1e-6);
    }

    #[test]
    fn tails_wrap_to_the_start() {
        let sample_rate = 1_000;
        let mut out = vec![0.0f32; 100];
        let ctx = RenderCtx::from_freq(sample_rate as f32, 440.0, 1.0);
        // A one-shot hit 10 frames before the end keeps sounding after the seam.
        render_hit(voices::hihat(1), &ctx, 90, None, &mut out);
        assert!(out[..10].iter().any(|&s| s != 0.0));
        assert!(out[90..].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn bounces_are_deterministic() {
        let a = bounce(InstrumentType::Drum, 1, 8_000);
        let b = bounce(InstrumentType::Drum, 1, 8_000);
        assert_eq!(a.len(), 16_000);
        assert_eq!(a, b);
    }
}
