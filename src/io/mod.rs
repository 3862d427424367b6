// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

pub use converter::midi_to_message;
pub use midi::MidiEvent;
