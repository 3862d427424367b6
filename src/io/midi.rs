/// Channel voice messages the synth understands.
///
/// Channels are 0-based (MIDI channel 1 is `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }

    /// Decode a raw three-byte (or two-byte) channel message.
    ///
    /// Running status, sysex and system messages are not handled.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        let channel = status & 0x0f;
        let data = |i: usize| bytes.get(i).map(|b| b & 0x7f);

        match status & 0xf0 {
            0x80 => Some(MidiEvent::NoteOff {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            }),
            0x90 => Some(MidiEvent::NoteOn {
                channel,
                key: data(1)?,
                velocity: data(2)?,
            }),
            0xb0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data(1)?,
                value: data(2)?,
            }),
            0xc0 => Some(MidiEvent::ProgramChange {
                channel,
                program: data(1)?,
            }),
            0xe0 => {
                let raw = (data(2)? as i16) << 7 | data(1)? as i16;
                Some(MidiEvent::PitchBend {
                    channel,
                    value: raw - 8192,
                })
            }
            _ => None,
        }
    }
}
