#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::oscillator::Waveform,
    error::{Result, SynthError},
    synth::params::ParameterSnapshot,
};

/// A named parameter bundle.
///
/// Presets are plain values: where they are stored is up to the caller. The
/// engine only ever sees the [`ParameterSnapshot`] they carry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub params: ParameterSnapshot,
}

impl Preset {
    pub fn new(name: impl Into<String>, params: ParameterSnapshot) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        self.params
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Init", ParameterSnapshot::default())
    }
}

/// Ordered list of presets, addressable by index or name.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetBank {
    presets: Vec<Preset>,
}

impl PresetBank {
    pub fn new(presets: Vec<Preset>) -> Result<Self> {
        if presets.is_empty() {
            return Err(SynthError::EmptyPresetBank);
        }
        let presets = presets
            .into_iter()
            .map(|p| {
                let params = p.params.validated()?;
                Ok(Preset { params, ..p })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { presets })
    }

    /// The built-in sounds.
    pub fn factory() -> Self {
        let presets = vec![
            Preset::new(
                "Init",
                ParameterSnapshot {
                    waveform: Waveform::Saw,
                    attack: 0.01,
                    decay: 0.1,
                    sustain: 0.7,
                    release: 0.3,
                    cutoff: 2_000.0,
                    resonance: 0.3,
                    gain: 0.7,
                    detune: 0.0,
                },
            ),
            Preset::new(
                "Soft Pad",
                ParameterSnapshot {
                    waveform: Waveform::Sine,
                    attack: 0.5,
                    decay: 0.3,
                    sustain: 0.8,
                    release: 1.0,
                    cutoff: 1_500.0,
                    resonance: 0.2,
                    gain: 0.6,
                    detune: 0.0,
                },
            ),
            Preset::new(
                "Sub Bass",
                ParameterSnapshot {
                    waveform: Waveform::Sine,
                    attack: 0.005,
                    decay: 0.2,
                    sustain: 0.6,
                    release: 0.15,
                    cutoff: 500.0,
                    resonance: 0.4,
                    gain: 0.8,
                    detune: 0.0,
                },
            ),
            Preset::new(
                "Saw Lead",
                ParameterSnapshot {
                    waveform: Waveform::Saw,
                    attack: 0.01,
                    decay: 0.15,
                    sustain: 0.5,
                    release: 0.2,
                    cutoff: 3_000.0,
                    resonance: 0.5,
                    gain: 0.7,
                    detune: 10.0,
                },
            ),
            Preset::new(
                "Square Lead",
                ParameterSnapshot {
                    waveform: Waveform::Square,
                    attack: 0.01,
                    decay: 0.1,
                    sustain: 0.6,
                    release: 0.25,
                    cutoff: 2_500.0,
                    resonance: 0.4,
                    gain: 0.65,
                    detune: 0.0,
                },
            ),
            Preset::new(
                "Pluck",
                ParameterSnapshot {
                    waveform: Waveform::Triangle,
                    attack: 0.001,
                    decay: 0.3,
                    sustain: 0.0,
                    release: 0.2,
                    cutoff: 4_000.0,
                    resonance: 0.6,
                    gain: 0.75,
                    detune: 0.0,
                },
            ),
            Preset::new(
                "Brass",
                ParameterSnapshot {
                    waveform: Waveform::Saw,
                    attack: 0.08,
                    decay: 0.2,
                    sustain: 0.7,
                    release: 0.15,
                    cutoff: 1_800.0,
                    resonance: 0.35,
                    gain: 0.7,
                    detune: 0.0,
                },
            ),
            Preset::new(
                "Retro",
                ParameterSnapshot {
                    waveform: Waveform::Square,
                    attack: 0.005,
                    decay: 0.1,
                    sustain: 0.4,
                    release: 0.1,
                    cutoff: 1_200.0,
                    resonance: 0.7,
                    gain: 0.6,
                    detune: 0.0,
                },
            ),
        ];

        Self { presets }
    }

    pub fn get(&self, index: usize) -> Result<&Preset> {
        self.presets.get(index).ok_or(SynthError::InvalidPresetIndex {
            index,
            len: self.presets.len(),
        })
    }

    /// Case-insensitive lookup. Returns the index and the preset.
    pub fn find(&self, name: &str) -> Result<(usize, &Preset)> {
        self.presets
            .iter()
            .enumerate()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| SynthError::UnknownPreset(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn as_slice(&self) -> &[Preset] {
        &self.presets
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }
}

impl Default for PresetBank {
    fn default() -> Self {
        Self::factory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_bank_has_the_eight_built_ins() {
        let bank = PresetBank::factory();
        assert_eq!(bank.len(), 8);
        assert_eq!(bank.get(0).unwrap().name, "Init");
        assert_eq!(bank.get(5).unwrap().params.waveform, Waveform::Triangle);
    }

    #[test]
    fn lookup_by_name_ignores_case() {
        let bank = PresetBank::factory();
        let (index, preset) = bank.find("sub bass").unwrap();
        assert_eq!(index, 2);
        assert_eq!(preset.params.cutoff, 500.0);
    }

    #[test]
    fn bad_index_and_name_are_rejected() {
        let bank = PresetBank::factory();
        assert_eq!(
            bank.get(8).unwrap_err(),
            SynthError::InvalidPresetIndex { index: 8, len: 8 }
        );
        assert!(matches!(bank.find("Kazoo"), Err(SynthError::UnknownPreset(_))));
    }

    #[test]
    fn custom_banks_are_validated() {
        assert_eq!(PresetBank::new(Vec::new()), Err(SynthError::EmptyPresetBank));

        let loud = Preset::new(
            "Too Loud",
            ParameterSnapshot {
                gain: 3.0,
                ..ParameterSnapshot::default()
            },
        );
        let bank = PresetBank::new(vec![loud]).unwrap();
        assert_eq!(bank.get(0).unwrap().params.gain, 1.0);

        let broken = Preset::new(
            "Broken",
            ParameterSnapshot {
                attack: f32::NAN,
                ..ParameterSnapshot::default()
            },
        );
        assert!(PresetBank::new(vec![broken]).is_err());
    }
}
