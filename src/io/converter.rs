use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

pub const CC_ALL_SOUND_OFF: u8 = 120;
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Map a MIDI event to a synth message.
///
/// `channel_filter` of `None` listens on every channel. Events with no
/// direct message (program change, most controllers, pitch bend) map to
/// `None`; the [`Controller`](crate::engine::Controller) handles the ones
/// that touch presets and parameters.
pub fn midi_to_message(midi: MidiEvent, channel_filter: Option<u8>) -> Option<SynthMessage> {
    if channel_filter.is_some_and(|wanted| wanted != midi.channel()) {
        return None;
    }

    match midi {
        // Velocity 0 note-on is the running-status idiom for note-off.
        MidiEvent::NoteOn { key, velocity: 0, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity: velocity_to_gain(velocity),
        }),
        MidiEvent::NoteOff { key, .. } => Some(SynthMessage::NoteOff { note: key }),
        MidiEvent::ControlChange { controller, .. }
            if controller == CC_ALL_SOUND_OFF || controller == CC_ALL_NOTES_OFF =>
        {
            Some(SynthMessage::AllNotesOff)
        }
        _ => None,
    }
}

/// 0-127 → 0.0-1.0
pub fn velocity_to_gain(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0
}

/// 0-127 → `min..=max` on an exponential curve, for frequencies.
pub fn cc_to_frequency(value: u8, min_hz: f32, max_hz: f32) -> f32 {
    min_hz * (max_hz / min_hz).powf(velocity_to_gain(value))
}
