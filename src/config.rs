#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SynthError},
    MAX_BLOCK_SIZE, MAX_VOICES,
};

/// What the engine does with a block that blew its real-time budget.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrunPolicy {
    /// Replace the late block with silence.
    #[default]
    Silence,
    /// Hold the last sample of the previous block for the whole late block.
    RepeatLast,
    /// Keep the rendered audio and only report the overrun.
    Report,
}

/// Construction-time settings for [`Engine`](crate::engine::Engine).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Voice pool size. Fixed for the lifetime of the engine.
    pub max_voices: usize,
    /// Capacity of the control → audio event ring.
    pub queue_capacity: usize,
    /// Largest chunk rendered in one pass. Longer requests are split into
    /// chunks of this size.
    pub max_block_size: usize,
    /// Fraction of the block's real-time duration a render may take before it
    /// counts as an overrun.
    pub budget_fraction: f32,
    pub overrun_policy: OverrunPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 8,
            queue_capacity: 256,
            max_block_size: MAX_BLOCK_SIZE,
            budget_fraction: 1.0,
            overrun_policy: OverrunPolicy::Silence,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_max_block_size(mut self, frames: usize) -> Self {
        self.max_block_size = frames;
        self
    }

    pub fn with_budget_fraction(mut self, fraction: f32) -> Self {
        self.budget_fraction = fraction;
        self
    }

    pub fn with_overrun_policy(mut self, policy: OverrunPolicy) -> Self {
        self.overrun_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate.is_finite() || self.sample_rate < 1_000.0 {
            return Err(SynthError::InvalidConfig(format!(
                "sample rate {} Hz is not usable",
                self.sample_rate
            )));
        }
        if self.max_voices == 0 || self.max_voices > MAX_VOICES {
            return Err(SynthError::InvalidConfig(format!(
                "voice pool size must be in 1..={MAX_VOICES}, got {}",
                self.max_voices
            )));
        }
        if self.queue_capacity == 0 {
            return Err(SynthError::InvalidConfig(
                "event queue capacity must be non-zero".into(),
            ));
        }
        if self.max_block_size == 0 {
            return Err(SynthError::InvalidConfig(
                "max block size must be non-zero".into(),
            ));
        }
        if !self.budget_fraction.is_finite() || self.budget_fraction <= 0.0 {
            return Err(SynthError::InvalidConfig(format!(
                "budget fraction must be positive, got {}",
                self.budget_fraction
            )));
        }
        Ok(())
    }
}
