//! Benchmarks for full voice pools.
//!
//! Cost grows with sounding voices, so each case is measured with the pool
//! full.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{
    synth::{SynthMessage, VoiceManager},
    Engine, EngineConfig, Param, PresetBank, MAX_VOICES,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const POOL: usize = 8;

fn full_pool(preset: usize, voices: usize) -> VoiceManager {
    let bank = PresetBank::factory();
    let params = bank.as_slice()[preset].params;
    let mut manager = VoiceManager::new(SAMPLE_RATE, voices, params);
    for i in 0..voices {
        manager.note_on(48 + (i as u8 * 3) % 36, 0.8);
    }
    manager
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === CHORD ===
        // Saw lead with detune, every voice held
        let mut chord = full_pool(3, POOL);
        group.bench_with_input(BenchmarkId::new("chord_8", size), &size, |b, _| {
            b.iter(|| {
                chord.render_block(black_box(&mut buffer));
            })
        });

        // === WORST CASE ===
        // Largest pool the engine accepts
        let mut wall = full_pool(3, MAX_VOICES);
        group.bench_with_input(BenchmarkId::new("chord_max", size), &size, |b, _| {
            b.iter(|| {
                wall.render_block(black_box(&mut buffer));
            })
        });

        // === CUTOFF SWEEP ===
        // Filter coefficients recomputed every sample while the cutoff glides
        let mut sweep = full_pool(0, POOL);
        let mut bright = false;
        group.bench_with_input(BenchmarkId::new("cutoff_sweep", size), &size, |b, _| {
            b.iter(|| {
                bright = !bright;
                let mut params = *sweep.parameters();
                params.cutoff = if bright { 8_000.0 } else { 300.0 };
                sweep.set_parameters(params);
                sweep.render_block(black_box(&mut buffer));
            })
        });

        // === STEALING ===
        // A new note every block on a full pool
        let mut stealing = full_pool(5, POOL);
        let mut note = 40u8;
        group.bench_with_input(BenchmarkId::new("steal_every_block", size), &size, |b, _| {
            b.iter(|| {
                note = if note >= 90 { 40 } else { note + 1 };
                stealing.note_on(note, 1.0);
                stealing.render_block(black_box(&mut buffer));
            })
        });

        // === ENGINE ===
        // Through the bridge, with a parameter change queued each block
        let config = EngineConfig::default()
            .with_sample_rate(SAMPLE_RATE)
            .with_max_voices(POOL)
            .with_queue_capacity(1024);
        let (mut engine, mut controller) =
            Engine::new(config, PresetBank::factory()).expect("engine config is valid");
        for i in 0..POOL as u8 {
            let _ = controller.send(SynthMessage::NoteOn {
                note: 50 + i * 2,
                velocity: 0.8,
            });
        }
        let mut resonance = 0.0f32;
        group.bench_with_input(BenchmarkId::new("engine_block", size), &size, |b, _| {
            b.iter(|| {
                resonance = (resonance + 0.01) % 1.0;
                let _ = controller.set_parameter(Param::Resonance, resonance);
                engine.render_block(black_box(&mut buffer))
            })
        });
    }

    group.finish();
}
