use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{envelope::Adsr, filter::MIN_CUTOFF_HZ, oscillator::Waveform},
    error::{Result, SynthError},
};

pub const MAX_STAGE_SECONDS: f32 = 10.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MAX_DETUNE_CENTS: f32 = 100.0;

/// The sound parameters every voice reads.
///
/// Always handled by value: the control side builds a complete snapshot and
/// the audio side swaps it in whole, so a half-applied edit is never heard.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub waveform: Waveform,
    /// Seconds
    pub attack: f32,
    /// Seconds
    pub decay: f32,
    /// 0-1
    pub sustain: f32,
    /// Seconds
    pub release: f32,
    /// Hz
    pub cutoff: f32,
    /// 0-1
    pub resonance: f32,
    /// 0-1
    pub gain: f32,
    /// Cents
    pub detune: f32,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            waveform: Waveform::Saw,
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
            cutoff: 2_000.0,
            resonance: 0.3,
            gain: 0.7,
            detune: 0.0,
        }
    }
}

impl ParameterSnapshot {
    pub fn adsr(&self) -> Adsr {
        Adsr::new(self.attack, self.decay, self.sustain, self.release)
    }

    /// Copy with every field forced into its legal range.
    pub fn clamped(&self) -> Self {
        Self {
            waveform: self.waveform,
            attack: Param::Attack.clamp(self.attack),
            decay: Param::Decay.clamp(self.decay),
            sustain: Param::Sustain.clamp(self.sustain),
            release: Param::Release.clamp(self.release),
            cutoff: Param::Cutoff.clamp(self.cutoff),
            resonance: Param::Resonance.clamp(self.resonance),
            gain: Param::Gain.clamp(self.gain),
            detune: Param::Detune.clamp(self.detune),
        }
    }

    /// Reject snapshots carrying NaN or infinity. Everything else is clamped.
    pub fn validated(&self) -> Result<Self> {
        for param in Param::CONTINUOUS {
            if !self.get(param).is_finite() {
                return Err(SynthError::NonFinite(param.name()));
            }
        }
        Ok(self.clamped())
    }

    /// Read a field as a float. Waveform reads as its index.
    pub fn get(&self, param: Param) -> f32 {
        match param {
            Param::Waveform => self.waveform.index() as f32,
            Param::Attack => self.attack,
            Param::Decay => self.decay,
            Param::Sustain => self.sustain,
            Param::Release => self.release,
            Param::Cutoff => self.cutoff,
            Param::Resonance => self.resonance,
            Param::Gain => self.gain,
            Param::Detune => self.detune,
        }
    }

    /// Return a copy with one field replaced.
    ///
    /// Continuous values are clamped; the waveform must be an exact index of
    /// a supported kind.
    pub fn with(&self, param: Param, value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(SynthError::NonFinite(param.name()));
        }

        let mut next = *self;
        match param {
            Param::Waveform => {
                if value < 0.0 || value.fract() != 0.0 {
                    return Err(SynthError::UnsupportedWaveform(value.to_string()));
                }
                next.waveform = Waveform::try_from(value as usize)?;
            }
            Param::Attack => next.attack = param.clamp(value),
            Param::Decay => next.decay = param.clamp(value),
            Param::Sustain => next.sustain = param.clamp(value),
            Param::Release => next.release = param.clamp(value),
            Param::Cutoff => next.cutoff = param.clamp(value),
            Param::Resonance => next.resonance = param.clamp(value),
            Param::Gain => next.gain = param.clamp(value),
            Param::Detune => next.detune = param.clamp(value),
        }
        Ok(next)
    }
}

/// Addressable fields of a [`ParameterSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    Waveform,
    Attack,
    Decay,
    Sustain,
    Release,
    Cutoff,
    Resonance,
    Gain,
    Detune,
}

impl Param {
    pub const ALL: [Param; 9] = [
        Param::Waveform,
        Param::Attack,
        Param::Decay,
        Param::Sustain,
        Param::Release,
        Param::Cutoff,
        Param::Resonance,
        Param::Gain,
        Param::Detune,
    ];

    const CONTINUOUS: [Param; 8] = [
        Param::Attack,
        Param::Decay,
        Param::Sustain,
        Param::Release,
        Param::Cutoff,
        Param::Resonance,
        Param::Gain,
        Param::Detune,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Param::Waveform => "waveform",
            Param::Attack => "attack",
            Param::Decay => "decay",
            Param::Sustain => "sustain",
            Param::Release => "release",
            Param::Cutoff => "cutoff",
            Param::Resonance => "resonance",
            Param::Gain => "gain",
            Param::Detune => "detune",
        }
    }

    /// Legal range for the field.
    pub fn range(self) -> (f32, f32) {
        match self {
            Param::Waveform => (0.0, (Waveform::ALL.len() - 1) as f32),
            Param::Attack | Param::Decay | Param::Release => (0.0, MAX_STAGE_SECONDS),
            Param::Sustain | Param::Resonance | Param::Gain => (0.0, 1.0),
            Param::Cutoff => (MIN_CUTOFF_HZ, MAX_CUTOFF_HZ),
            Param::Detune => (-MAX_DETUNE_CENTS, MAX_DETUNE_CENTS),
        }
    }

    pub fn clamp(self, value: f32) -> f32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = SynthError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "volume" => Ok(Param::Gain),
            "filter_cutoff" => Ok(Param::Cutoff),
            "filter_resonance" => Ok(Param::Resonance),
            _ => Param::ALL
                .into_iter()
                .find(|p| p.name() == wanted)
                .ok_or_else(|| SynthError::UnknownParameter(s.to_string())),
        }
    }
}
