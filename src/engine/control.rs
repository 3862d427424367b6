use crate::{
    dsp::{filter::MIN_CUTOFF_HZ, oscillator::Waveform},
    engine::bridge::BridgeSender,
    error::Result,
    io::{
        converter::{cc_to_frequency, midi_to_message, velocity_to_gain},
        midi::MidiEvent,
    },
    synth::{
        activity::ActivitySnapshot,
        message::SynthMessage,
        params::{Param, ParameterSnapshot, MAX_CUTOFF_HZ},
        poly::MAX_NOTE,
        preset::{Preset, PresetBank},
    },
};

pub const CC_VOLUME: u8 = 7;
pub const CC_RESONANCE: u8 = 71;
pub const CC_CUTOFF: u8 = 74;

/// Control-surface half of the synth.
///
/// Validates input, keeps the authoritative copy of the current preset and
/// forwards complete snapshots to the audio path. Nothing is applied locally
/// unless it was also queued, so the two sides never disagree.
pub struct Controller {
    bridge: BridgeSender,
    presets: PresetBank,
    current: Preset,
    current_index: Option<usize>,
    activity: ActivitySnapshot,
    midi_channel: Option<u8>,
}

impl Controller {
    pub(crate) fn new(
        bridge: BridgeSender,
        presets: PresetBank,
        initial: Preset,
        pool_size: usize,
    ) -> Self {
        Self {
            bridge,
            presets,
            current: initial,
            current_index: Some(0),
            activity: ActivitySnapshot::with_pool_size(pool_size),
            midi_channel: None,
        }
    }

    /// Queue a raw message.
    ///
    /// A parameter snapshot carrying NaN or infinity is rejected here and
    /// never queued.
    pub fn send(&mut self, msg: SynthMessage) -> Result<()> {
        let msg = match msg {
            SynthMessage::ParameterChange(params) => {
                let params = params.validated().inspect_err(|err| {
                    log::warn!("rejected parameter snapshot: {err}");
                })?;
                SynthMessage::ParameterChange(params)
            }
            other => other,
        };
        self.bridge.send(msg).inspect_err(|_| {
            log::warn!("event queue full, dropped {msg:?}");
        })
    }

    /// Out-of-range notes are dropped here; velocity is clamped to 0-1.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> Result<()> {
        if note > MAX_NOTE || !velocity.is_finite() {
            log::debug!("ignoring note on {note} velocity {velocity}");
            return Ok(());
        }
        self.send(SynthMessage::NoteOn {
            note,
            velocity: velocity.clamp(0.0, 1.0),
        })
    }

    pub fn note_off(&mut self, note: u8) -> Result<()> {
        if note > MAX_NOTE {
            return Ok(());
        }
        self.send(SynthMessage::NoteOff { note })
    }

    pub fn all_notes_off(&mut self) -> Result<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.send(SynthMessage::Reset)
    }

    /// Change one field of the current snapshot.
    ///
    /// Continuous values are clamped. A rejected value leaves the current
    /// snapshot untouched.
    pub fn set_parameter(&mut self, param: Param, value: f32) -> Result<()> {
        let next = self.current.params.with(param, value).inspect_err(|err| {
            log::warn!("rejected {param} = {value}: {err}");
        })?;
        self.send_snapshot(next)
    }

    pub fn set_waveform(&mut self, waveform: Waveform) -> Result<()> {
        let next = ParameterSnapshot {
            waveform,
            ..self.current.params
        };
        self.send_snapshot(next)
    }

    pub fn select_preset(&mut self, index: usize) -> Result<()> {
        let preset = self
            .presets
            .get(index)
            .inspect_err(|err| log::warn!("{err}"))?
            .clone();
        self.activate(preset, Some(index))
    }

    pub fn select_preset_by_name(&mut self, name: &str) -> Result<()> {
        let (index, preset) = self
            .presets
            .find(name)
            .inspect_err(|err| log::warn!("{err}"))?;
        let preset = preset.clone();
        self.activate(preset, Some(index))
    }

    /// Apply a preset from outside the bank, e.g. one loaded from disk.
    pub fn apply_preset(&mut self, preset: Preset) -> Result<()> {
        let params = preset.params.validated()?;
        self.activate(Preset { params, ..preset }, None)
    }

    /// The active preset, including any edits made since it was selected.
    pub fn current_preset(&self) -> Preset {
        self.current.clone()
    }

    /// Bank position of the active preset, `None` for one applied directly.
    pub fn current_preset_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn presets(&self) -> &[Preset] {
        self.presets.as_slice()
    }

    pub fn parameters(&self) -> ParameterSnapshot {
        self.current.params
    }

    /// Latest activity published by the engine.
    ///
    /// Returns the previous snapshot again if nothing new has arrived.
    pub fn activity(&mut self) -> ActivitySnapshot {
        if let Some(latest) = self.bridge.latest_activity() {
            self.activity = latest;
        }
        self.activity
    }

    /// Listen on one channel only (0-based), or every channel with `None`.
    pub fn set_midi_channel(&mut self, channel: Option<u8>) {
        self.midi_channel = channel;
    }

    /// Route a MIDI event: notes to the engine, program changes to the
    /// preset bank, and CC 7/71/74 to gain, resonance and cutoff.
    pub fn handle_midi(&mut self, event: MidiEvent) -> Result<()> {
        if self
            .midi_channel
            .is_some_and(|wanted| wanted != event.channel())
        {
            return Ok(());
        }

        match event {
            MidiEvent::ProgramChange { program, .. } => self.select_preset(program as usize),
            MidiEvent::ControlChange {
                controller: CC_VOLUME,
                value,
                ..
            } => self.set_parameter(Param::Gain, velocity_to_gain(value)),
            MidiEvent::ControlChange {
                controller: CC_RESONANCE,
                value,
                ..
            } => self.set_parameter(Param::Resonance, velocity_to_gain(value)),
            MidiEvent::ControlChange {
                controller: CC_CUTOFF,
                value,
                ..
            } => {
                let cutoff = cc_to_frequency(value, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
                self.set_parameter(Param::Cutoff, cutoff)
            }
            other => match midi_to_message(other, None) {
                Some(msg) => self.send(msg),
                None => Ok(()),
            },
        }
    }

    /// True once the engine has been dropped.
    pub fn is_disconnected(&self) -> bool {
        self.bridge.is_abandoned()
    }

    fn send_snapshot(&mut self, params: ParameterSnapshot) -> Result<()> {
        self.send(SynthMessage::ParameterChange(params))?;
        self.current.params = params;
        Ok(())
    }

    fn activate(&mut self, preset: Preset, index: Option<usize>) -> Result<()> {
        self.send(SynthMessage::ParameterChange(preset.params))?;
        log::debug!("preset {:?} active", preset.name);
        self.current = preset;
        self.current_index = index;
        Ok(())
    }
}
