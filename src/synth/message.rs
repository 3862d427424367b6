use crate::synth::params::ParameterSnapshot;

/// Events sent from the control surface to the audio path.
///
/// All variants are `Copy` so they can travel through a ring buffer without
/// touching the allocator on either side.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: f32 },
    NoteOff { note: u8 },
    /// A complete replacement for the shared parameter snapshot.
    ParameterChange(ParameterSnapshot),
    /// Release every held note.
    AllNotesOff,
    /// Silence every voice immediately.
    Reset,
}

/// Source of pending messages for the audio path.
pub trait MessageReceiver {
    /// Messages waiting right now. A drain never takes more than this, so a
    /// producer that keeps pushing cannot stretch one block.
    fn pending(&self) -> usize;

    fn pop(&mut self) -> Option<SynthMessage>;
}
