//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::oscillator::{Oscillator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let increment = 440.0 / SAMPLE_RATE;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Sine uses sin(); saw, square and triangle are arithmetic only
        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new();
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), waveform, black_box(increment));
                })
            });
        }
    }

    group.finish();
}
