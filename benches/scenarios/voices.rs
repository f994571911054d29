//! Benchmarks for the instrument voice graphs.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopmix::graph::{midi_note_to_freq, GraphNode, NodeExt, RenderCtx};
use loopmix::voices;

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let candidates: [(&str, u8, Box<dyn GraphNode>); 6] = [
            ("kick", 0, voices::kick(1).boxed()),
            ("snare", 0, voices::snare(2).boxed()),
            ("hihat", 0, voices::hihat(3).boxed()),
            ("bass", 33, voices::bass().boxed()),
            ("vocal", 69, voices::vocal().boxed()),
            ("pad", 57, voices::pad().boxed()),
        ];

        for (name, note, mut voice) in candidates {
            let ctx = RenderCtx::from_freq(48_000.0, midi_note_to_freq(note), 1.0);
            voice.note_on(&ctx);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    voice.render_block(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
