use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::config::AnalyzerConfig;

/*
Level Analyser
==============

A meter tap keeps the most recent `fft_size` samples of a signal and, on each
render tick, turns them into a byte spectrum:

  1. Blackman window over the history (oldest sample first)
  2. FFT, magnitude per bin scaled by 1/N
  3. Per-bin smoothing:   m̂[k] = τ·m̂_prev[k] + (1 - τ)·|X[k]|
  4. dB = 20·log10(m̂[k]), mapped linearly from [min_db, max_db] to [0, 255]

The meter level is the mean of those bytes, normalised to 0-100 and scaled by
a sensitivity boost:

    level = min(mean(bytes) / 255 · 100 · sensitivity, 100)

Smoothing makes the level fall off over a few ticks instead of dropping to
zero between drum hits. Silence maps to -inf dB and therefore to byte 0.
*/

pub struct Analyzer {
    config: AnalyzerConfig,
    window: Vec<f32>,
    history: Vec<f32>,
    write_pos: usize,
    fft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    bytes: Vec<u8>,
    level: f32,
}

impl Analyzer {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let size = config.fft_size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        let window = (0..size)
            .map(|i| {
                let x = std::f32::consts::TAU * i as f32 / size as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();

        Self {
            config: *config,
            window,
            history: vec![0.0; size],
            write_pos: 0,
            fft,
            spectrum: vec![Complex::new(0.0, 0.0); size],
            scratch,
            smoothed: vec![0.0; size / 2],
            bytes: vec![0; size / 2],
            level: 0.0,
        }
    }

    /// Append mono samples to the history ring.
    pub fn push(&mut self, samples: &[f32]) {
        let len = self.history.len();
        for &sample in samples {
            self.history[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % len;
        }
    }

    /// Append the mono downmix `(L + R) / 2` of a stereo block.
    pub fn push_downmix(&mut self, left: &[f32], right: &[f32]) {
        let len = self.history.len();
        for (&l, &r) in left.iter().zip(right.iter()) {
            self.history[self.write_pos] = 0.5 * (l + r);
            self.write_pos = (self.write_pos + 1) % len;
        }
    }

    /// Refresh the byte spectrum from the current history and return the level.
    pub fn analyse(&mut self) -> f32 {
        let size = self.history.len();
        for i in 0..size {
            let sample = self.history[(self.write_pos + i) % size];
            self.spectrum[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let tau = self.config.smoothing;
        let db_range = self.config.max_db - self.config.min_db;
        let norm = 1.0 / size as f32;
        let mut byte_sum = 0u32;

        for (k, (smoothed, byte)) in self
            .smoothed
            .iter_mut()
            .zip(self.bytes.iter_mut())
            .enumerate()
        {
            let magnitude = self.spectrum[k].norm() * norm;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;

            *byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                let scaled = 255.0 * (db - self.config.min_db) / db_range;
                scaled.clamp(0.0, 255.0) as u8
            } else {
                0
            };
            byte_sum += u32::from(*byte);
        }

        let mean = byte_sum as f32 / self.bytes.len() as f32;
        self.level = (mean / 255.0 * 100.0 * self.config.sensitivity).min(100.0);
        self.level
    }

    /// Byte spectrum from the last `analyse` call, `fft_size / 2` bins.
    pub fn byte_frequency_data(&self) -> &[u8] {
        &self.bytes
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.write_pos = 0;
        self.smoothed.fill(0.0);
        self.bytes.fill(0);
        self.level = 0.0;
    }
}
