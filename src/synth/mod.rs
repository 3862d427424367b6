// Purpose: Voice management, polyphony, parameter snapshots and presets
// This layer sits above the dsp primitives and is driven by the engine

pub mod activity;
pub mod message;
pub mod params;
pub mod poly;
pub mod preset;
pub mod voice;

pub use activity::{ActivitySnapshot, VoiceActivity};
pub use message::{MessageReceiver, SynthMessage};
pub use params::{Param, ParameterSnapshot};
pub use poly::VoiceManager;
pub use preset::{Preset, PresetBank};
pub use voice::{Voice, VoiceState};
