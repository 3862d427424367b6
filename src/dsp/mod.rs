//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; parameters are passed in per call so every voice
//! can follow the shared parameter snapshot.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable low-pass filter.
pub mod filter;
/// Phase-accumulator oscillator and waveform shapes.
pub mod oscillator;
/// Linear parameter smoothing.
pub mod smooth;

pub use envelope::{Adsr, EnvelopeStage};
pub use oscillator::Waveform;
