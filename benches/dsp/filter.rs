//! Benchmarks for the state-variable low-pass filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::filter::{FilterCoefficients, LowPassFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed coefficients, as when cutoff is not moving
        let coeffs = FilterCoefficients::new(1_000.0, 0.5, SAMPLE_RATE);
        let mut filter = LowPassFilter::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&coeffs));
            })
        });

        // Coefficients recomputed every sample, as during a cutoff glide
        let mut filter = LowPassFilter::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_sweep", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let cutoff = 500.0 + i as f32 * 4.0;
                    *sample = filter.next_sample(input[i], black_box(cutoff), 0.5, SAMPLE_RATE);
                }
            })
        });
    }

    group.finish();
}
