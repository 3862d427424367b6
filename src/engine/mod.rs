// Purpose: the two halves of a running synth and the rings between them
// Engine lives on the audio thread, Controller on the control thread

pub mod bridge;
pub mod control;

use std::time::{Duration, Instant};

use crate::{
    config::{EngineConfig, OverrunPolicy},
    error::Result,
    synth::{activity::ActivitySnapshot, poly::VoiceManager, preset::PresetBank},
};

pub use self::{
    bridge::{BridgeReceiver, BridgeSender, ParameterBridge},
    control::Controller,
};

/// Outcome of one [`Engine::render_block`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Ok,
    /// Rendering took longer than the block's real-time budget.
    Overrun,
    /// Output went non-finite; the block was silenced and voices reset.
    Recovered,
}

/// Audio-path half of the synth.
///
/// Owns the voice pool and the receiving end of the bridge. Every method here
/// is wait-free and allocation-free; hand the whole value to the audio
/// callback.
pub struct Engine {
    voices: VoiceManager,
    bridge: BridgeReceiver,
    sample_rate: f32,
    budget_fraction: f32,
    overrun_policy: OverrunPolicy,
    max_block_size: usize,
    /// Last sample handed to the host, held by `OverrunPolicy::RepeatLast`.
    last_sample: f32,
    activity: ActivitySnapshot,
}

impl Engine {
    /// Build an engine and its controller, starting on the bank's first preset.
    pub fn new(config: EngineConfig, presets: PresetBank) -> Result<(Engine, Controller)> {
        config.validate()?;
        let initial = presets.get(0)?.clone();

        let (sender, receiver) = ParameterBridge::new(config.queue_capacity, config.max_voices);
        let voices = VoiceManager::new(config.sample_rate, config.max_voices, initial.params);

        log::info!(
            "engine ready: {} Hz, {} voices, preset {:?}",
            config.sample_rate,
            config.max_voices,
            initial.name
        );

        let engine = Engine {
            voices,
            bridge: receiver,
            sample_rate: config.sample_rate,
            budget_fraction: config.budget_fraction,
            overrun_policy: config.overrun_policy,
            max_block_size: config.max_block_size,
            last_sample: 0.0,
            activity: ActivitySnapshot::with_pool_size(config.max_voices),
        };
        let controller = Controller::new(sender, presets, initial, config.max_voices);

        Ok((engine, controller))
    }

    /// Fill `out` with the next mono block.
    ///
    /// Pending control events are applied before the first sample, so an event
    /// sent before this call is audible from the start of the block. Blocks
    /// longer than `max_block_size` are rendered in chunks.
    pub fn render_block(&mut self, out: &mut [f32]) -> BlockStatus {
        let started = Instant::now();

        self.voices.process_messages(&mut self.bridge);
        for chunk in out.chunks_mut(self.max_block_size) {
            self.voices.render_block(chunk);
        }

        let mut status = BlockStatus::Ok;

        if out.iter().any(|s| !s.is_finite()) {
            out.fill(0.0);
            self.voices.reset();
            self.activity.recoveries += 1;
            status = BlockStatus::Recovered;
        } else if !out.is_empty() && started.elapsed() > self.budget(out.len()) {
            self.activity.underruns += 1;
            match self.overrun_policy {
                OverrunPolicy::Silence => out.fill(0.0),
                OverrunPolicy::RepeatLast => out.fill(self.last_sample),
                OverrunPolicy::Report => {}
            }
            status = BlockStatus::Overrun;
        }

        if let Some(&last) = out.last() {
            self.last_sample = last;
        }

        self.activity.blocks_rendered += 1;
        self.voices.activity(&mut self.activity);
        self.bridge.publish(self.activity);

        status
    }

    /// Real-time duration allowed for a block of `frames`.
    pub fn budget(&self, frames: usize) -> Duration {
        let seconds = frames as f64 / self.sample_rate as f64;
        Duration::from_secs_f64(seconds * self.budget_fraction as f64)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }

    pub fn is_playing(&self) -> bool {
        self.voices.is_playing()
    }

    pub fn voices(&self) -> &VoiceManager {
        &self.voices
    }

    /// The snapshot most recently published to the controller.
    pub fn activity(&self) -> &ActivitySnapshot {
        &self.activity
    }
}
