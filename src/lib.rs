pub mod config; // Engine construction settings
pub mod dsp;
pub mod engine; // Audio-path engine and control-side handle
pub mod error;
pub mod io;
pub mod synth; // Voice management and polyphony

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_VOICES: usize = 32;

pub use config::{EngineConfig, OverrunPolicy};
pub use dsp::oscillator::Waveform;
pub use engine::{BlockStatus, Controller, Engine};
pub use error::{Result, SynthError};
pub use synth::{ActivitySnapshot, Param, ParameterSnapshot, Preset, PresetBank};
