//! Benchmarks for the engine rendering a live session.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopmix::{default_catalog, engine::OfflineBackend, ChannelParam, MixerConfig, Session};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    // one session for all sizes; building it bounces every loop
    let (backend, handle) = OfflineBackend::new();
    let mut session = match Session::new(&default_catalog(), MixerConfig::default(), Box::new(backend)) {
        Ok(session) => session,
        Err(err) => panic!("session: {err}"),
    };
    for channel in default_catalog() {
        let _ = session.set_channel_parameter(channel.id, ChannelParam::EqHighDb, 4.0);
        let _ = session.set_channel_parameter(channel.id, ChannelParam::EqLowDb, -3.0);
        let _ = session.set_channel_parameter(channel.id, ChannelParam::Pan, channel.id as f32 * 20.0 - 50.0);
    }
    if let Err(err) = session.play() {
        panic!("play: {err}");
    }

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("4_channel", size), &size, |b, _| {
            b.iter(|| {
                handle.render(black_box(&mut left), black_box(&mut right));
            })
        });
    }

    group.finish();
    session.close();
}
