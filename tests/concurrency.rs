use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use saavy_synth::{
    dsp::envelope::EnvelopeStage, ActivitySnapshot, Engine, EngineConfig, OverrunPolicy, Param,
    ParameterSnapshot, Preset, PresetBank, Waveform,
};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 128;
const CONTROL_STEPS: usize = 2_000;

/// Largest sample-to-sample step allowed anywhere in the output.
const MAX_STEP: f32 = 0.5;

/// Largest change in slope allowed on the first samples after a snapshot
/// swap. A smooth signal at these pitches bends far less than this; an
/// unsmoothed gain or cutoff jump shows up as a kink well above it.
const SWAP_KINK: f32 = 0.15;

fn gentle_sine() -> ParameterSnapshot {
    ParameterSnapshot {
        waveform: Waveform::Sine,
        attack: 0.01,
        decay: 0.05,
        sustain: 0.7,
        release: 0.02,
        cutoff: 4_000.0,
        resonance: 0.2,
        gain: 0.6,
        detune: 0.0,
    }
}

/// True if the block between the two snapshots started or stole a voice.
fn started_a_voice(before: &ActivitySnapshot, after: &ActivitySnapshot) -> bool {
    after.voices().iter().any(|v| {
        v.stage == EnvelopeStage::Attack
            && !before
                .voices()
                .iter()
                .any(|b| b.slot == v.slot && b.note == v.note && b.stage == EnvelopeStage::Attack)
    })
}

#[test]
fn control_thread_and_audio_thread_run_side_by_side() {
    let bank = PresetBank::new(vec![Preset::new("Gentle", gentle_sine())]).unwrap();
    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_max_voices(4)
        .with_queue_capacity(1024)
        .with_overrun_policy(OverrunPolicy::Report);
    let (mut engine, mut controller) = Engine::new(config, bank).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let control_done = Arc::clone(&done);

    let control = thread::spawn(move || {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut sent = 0usize;

        for step in 0..CONTROL_STEPS {
            let note = rng.gen_range(48..=72u8); // up to C5
            let result = match rng.gen_range(0..6) {
                0 | 1 => controller.note_on(note, rng.gen_range(0.5..=1.0)),
                2 | 3 => controller.note_off(note),
                4 => {
                    let param = [Param::Cutoff, Param::Gain, Param::Sustain][step % 3];
                    let value = match param {
                        Param::Cutoff => rng.gen_range(200.0..8_200.0),
                        _ => rng.gen_range(0.0..=1.0),
                    };
                    controller.set_parameter(param, value)
                }
                _ => {
                    let attack = rng.gen_range(0.005..0.055);
                    let release = rng.gen_range(0.005..0.105);
                    controller
                        .set_parameter(Param::Attack, attack)
                        .and_then(|_| controller.set_parameter(Param::Release, release))
                }
            };
            // A full queue is allowed; the engine just sees fewer events
            if result.is_ok() {
                sent += 1;
            }
            if step % 16 == 0 {
                thread::sleep(Duration::from_micros(200));
            }
        }

        while controller.all_notes_off().is_err() {
            thread::sleep(Duration::from_micros(200));
        }
        control_done.store(true, Ordering::Release);
        (controller, sent)
    });

    let mut out = [0.0f32; BLOCK];
    let mut history = [0.0f32; 2];
    let mut blocks = 0u64;
    let mut worst_step = 0.0f32;
    let mut worst_kink = 0.0f32;
    let mut swaps_checked = 0usize;
    let mut tail_blocks = 0;

    // Keep rendering until the control side is finished, then drain the
    // release tails.
    while tail_blocks < 200 {
        if done.load(Ordering::Acquire) {
            tail_blocks += 1;
        }

        let before = *engine.activity();
        engine.render_block(&mut out);
        blocks += 1;
        let after = *engine.activity();

        // A swap takes effect on the block's first sample
        if after.parameter_changes > before.parameter_changes
            && !started_a_voice(&before, &after)
        {
            let [older, prev] = history;
            let slopes = [prev - older, out[0] - prev, out[1] - out[0], out[2] - out[1]];
            for pair in slopes.windows(2) {
                let kink = (pair[1] - pair[0]).abs();
                worst_kink = worst_kink.max(kink);
                assert!(
                    kink < SWAP_KINK,
                    "kink of {kink} at the snapshot swap in block {blocks}"
                );
            }
            swaps_checked += 1;
        }

        for &sample in out.iter() {
            assert!(sample.is_finite(), "non-finite sample in block {blocks}");
            worst_step = worst_step.max((sample - history[1]).abs());
            history = [history[1], sample];
        }
    }

    let (mut controller, sent) = control.join().unwrap();
    assert!(sent > 0);
    assert!(swaps_checked > 0, "no snapshot swap landed on a block boundary");
    assert!(
        worst_step < MAX_STEP,
        "largest sample-to-sample step was {worst_step}"
    );
    assert!(worst_kink < SWAP_KINK);

    // 200 blocks of 128 samples is well past the longest release
    assert!(!engine.is_playing());
    assert_eq!(engine.activity().blocks_rendered, blocks);
    assert_eq!(engine.activity().recoveries, 0);

    // The reader never polled during the run and still sees the newest block
    assert_eq!(controller.activity().blocks_rendered, blocks);
    engine.render_block(&mut out);
    assert_eq!(controller.activity().blocks_rendered, blocks + 1);
}
