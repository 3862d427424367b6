//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::envelope::{Adsr, Envelope};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up); long enough to stay there while measured
        let slow = Adsr::new(1_000.0, 0.1, 0.7, 0.3);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.trigger(&slow);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&slow));
            })
        });

        // Sustain phase (holding steady)
        let short = Adsr::new(0.001, 0.001, 0.7, 0.3);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.trigger(&short);
        // Advance past attack/decay
        for _ in 0..200 {
            env.next_sample(&short);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&short));
            })
        });

        // Release phase (ramping down)
        let long_release = Adsr::new(0.001, 0.001, 0.7, 1_000.0);
        let mut env = Envelope::new(SAMPLE_RATE);
        env.trigger(&long_release);
        for _ in 0..200 {
            env.next_sample(&long_release);
        }
        env.release(&long_release);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer), black_box(&long_release));
            })
        });
    }

    group.finish();
}
