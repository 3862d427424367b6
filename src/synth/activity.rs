use crate::{dsp::envelope::EnvelopeStage, MAX_VOICES};

/// What one sounding voice is doing, for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoiceActivity {
    /// Index of the voice in the pool.
    pub slot: usize,
    pub note: u8,
    pub velocity: f32,
    pub stage: EnvelopeStage,
    pub level: f32,
}

/// Read-only copy of the engine's voice activity.
///
/// Fixed-size and `Copy`, so the audio path can publish it without
/// allocating. Only the first `active_voices` entries are meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivitySnapshot {
    voices: [VoiceActivity; MAX_VOICES],
    pub active_voices: usize,
    pub pool_size: usize,
    pub blocks_rendered: u64,
    /// Blocks that took longer than their real-time budget.
    pub underruns: u64,
    /// Blocks replaced with silence after non-finite output.
    pub recoveries: u64,
    /// Parameter snapshots swapped in so far.
    pub parameter_changes: u64,
}

impl Default for ActivitySnapshot {
    fn default() -> Self {
        Self {
            voices: [VoiceActivity::default(); MAX_VOICES],
            active_voices: 0,
            pool_size: 0,
            blocks_rendered: 0,
            underruns: 0,
            recoveries: 0,
            parameter_changes: 0,
        }
    }
}

impl ActivitySnapshot {
    /// Empty snapshot for a pool of `pool_size` voices.
    pub fn with_pool_size(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Self::default()
        }
    }

    /// Sounding voices, in pool order.
    pub fn voices(&self) -> &[VoiceActivity] {
        &self.voices[..self.active_voices]
    }

    pub fn is_sounding(&self, note: u8) -> bool {
        self.voices().iter().any(|v| v.note == note)
    }

    pub fn level_of(&self, note: u8) -> Option<f32> {
        self.voices().iter().find(|v| v.note == note).map(|v| v.level)
    }

    pub(crate) fn clear_voices(&mut self) {
        self.active_voices = 0;
    }

    /// Append a voice. Entries past capacity are dropped.
    pub(crate) fn push_voice(&mut self, activity: VoiceActivity) {
        if let Some(entry) = self.voices.get_mut(self.active_voices) {
            *entry = activity;
            self.active_voices += 1;
        }
    }
}
