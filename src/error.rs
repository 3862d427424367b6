use thiserror::Error;

/// Errors surfaced to the control side.
///
/// The audio path never returns these: live input there is clamped or
/// ignored, and block-level problems are reported through
/// [`BlockStatus`](crate::engine::BlockStatus).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthError {
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("preset index {index} out of range (bank holds {len} presets)")]
    InvalidPresetIndex { index: usize, len: usize },

    #[error("no preset named {0:?}")]
    UnknownPreset(String),

    #[error("preset bank is empty")]
    EmptyPresetBank,

    #[error("unsupported waveform {0:?}")]
    UnsupportedWaveform(String),

    #[error("unknown parameter {0:?}")]
    UnknownParameter(String),

    #[error("non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("event queue is full")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, SynthError>;
