use std::{f32::consts::TAU, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/*
Phase Accumulator Oscillator
============================

Every waveform here is a pure function of a normalized phase p in [0, 1):

  sine      sin(2πp)            smooth, fundamental only
  saw       2p - 1              all harmonics, 1/n
  square    +1 if p < 0.5 else -1   odd harmonics, 1/n
  triangle  4|p - 0.5| - 1      odd harmonics, 1/n²

Each sample we read the waveform at the current phase, then advance:

    phase += frequency / sample_rate
    phase  = phase mod 1

The saw, square and triangle are naive (not band-limited) and alias at high
pitches. That is accepted here; the filter tames most of it.
*/

/// Oscillator waveform kinds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    #[default]
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];

    /// Waveform value at normalized phase `phase` (expected in [0, 1)).
    #[inline]
    pub fn at(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Square => 2,
            Waveform::Triangle => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<usize> for Waveform {
    type Error = SynthError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Waveform::ALL
            .get(index)
            .copied()
            .ok_or_else(|| SynthError::UnsupportedWaveform(index.to_string()))
    }
}

impl FromStr for Waveform {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" | "sin" => Ok(Waveform::Sine),
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "square" | "pulse" => Ok(Waveform::Square),
            "triangle" | "tri" => Ok(Waveform::Triangle),
            _ => Err(SynthError::UnsupportedWaveform(s.to_string())),
        }
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Note frequency with a detune offset in cents (100 cents = 1 semitone).
#[inline]
pub fn detuned_freq(note: u8, detune_cents: f32) -> f32 {
    let base = midi_note_to_freq(note);
    if detune_cents != 0.0 {
        base * 2.0_f32.powf(detune_cents / 1200.0)
    } else {
        base
    }
}

/// Phase accumulator. The waveform is supplied per sample so a parameter
/// change takes effect on every voice at once.
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Return the sample at the current phase, then advance by
    /// `phase_increment` cycles and wrap into [0, 1).
    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform, phase_increment: f32) -> f32 {
        let sample = waveform.at(self.phase);

        self.phase += phase_increment;
        if self.phase >= 1.0 || self.phase < 0.0 {
            self.phase = self.phase.rem_euclid(1.0);
            // rem_euclid can round up to exactly 1.0 for tiny negatives
            if self.phase >= 1.0 {
                self.phase = 0.0;
            }
        }

        sample
    }

    /// Fill `buffer` at a fixed pitch.
    pub fn render(&mut self, buffer: &mut [f32], waveform: Waveform, phase_increment: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(waveform, phase_increment);
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
