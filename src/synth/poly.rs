use crate::{
    dsp::{
        envelope::{Adsr, EnvelopeStage},
        filter::FilterCoefficients,
        smooth::LinearSmoother,
    },
    synth::{
        activity::{ActivitySnapshot, VoiceActivity},
        message::{MessageReceiver, SynthMessage},
        params::ParameterSnapshot,
        voice::{FrameParams, Voice, VoiceState},
    },
};

/// Glide time for gain and cutoff after a snapshot swap.
pub const PARAM_SMOOTHING_SECONDS: f32 = 0.005;

/// Highest valid MIDI note number.
pub const MAX_NOTE: u8 = 127;

/// Fixed pool of voices plus the shared parameter snapshot.
///
/// Lives entirely on the audio thread. Nothing here allocates after
/// construction.
pub struct VoiceManager {
    voices: Box<[Voice]>,
    params: ParameterSnapshot,
    adsr: Adsr,
    gain: LinearSmoother,
    cutoff: LinearSmoother,
    sample_rate: f32,
    activation_counter: u64,
    parameter_changes: u64,
}

impl VoiceManager {
    pub fn new(sample_rate: f32, max_voices: usize, params: ParameterSnapshot) -> Self {
        let params = params.clamped();
        let voices = (0..max_voices)
            .map(|_| Voice::new(sample_rate))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            voices,
            params,
            adsr: params.adsr(),
            gain: LinearSmoother::new(params.gain, PARAM_SMOOTHING_SECONDS, sample_rate),
            cutoff: LinearSmoother::new(params.cutoff, PARAM_SMOOTHING_SECONDS, sample_rate),
            sample_rate,
            activation_counter: 0,
            parameter_changes: 0,
        }
    }

    pub fn apply(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note } => self.note_off(note),
            SynthMessage::ParameterChange(params) => self.set_parameters(params),
            SynthMessage::AllNotesOff => self.all_notes_off(),
            SynthMessage::Reset => self.reset(),
        }
    }

    /// Apply the messages already waiting, in arrival order. Anything pushed
    /// during the drain is left for the next block. Returns how many.
    pub fn process_messages<R: MessageReceiver>(&mut self, rx: &mut R) -> usize {
        let pending = rx.pending();
        let mut count = 0;
        while count < pending {
            let Some(msg) = rx.pop() else {
                break;
            };
            self.apply(msg);
            count += 1;
        }
        count
    }

    /// Start a note. Out-of-range notes and non-finite velocities are ignored.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if note > MAX_NOTE || !velocity.is_finite() {
            return;
        }
        let velocity = velocity.clamp(0.0, 1.0);

        self.activation_counter += 1;
        let age = self.activation_counter;
        let detune = self.params.detune;
        let adsr = self.adsr;

        // A note that is still sounding is retriggered in place so no two
        // voices ever hold the same note.
        let idx = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.note() == note)
            .or_else(|| self.allocate_voice());

        if let Some(idx) = idx {
            self.voices[idx].start(note, velocity, age, detune, &adsr);
        }
    }

    /// Release a held note. Unknown notes and repeated note-offs are no-ops.
    pub fn note_off(&mut self, note: u8) {
        let adsr = self.adsr;
        if let Some(voice) = self.find_voice(note) {
            voice.release(&adsr);
        }
    }

    pub fn all_notes_off(&mut self) {
        let adsr = self.adsr;
        for voice in self.voices.iter_mut() {
            if voice.state() == VoiceState::Active {
                voice.release(&adsr);
            }
        }
    }

    /// Silence everything immediately.
    pub fn reset(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.free();
        }
        self.gain.reset(self.params.gain);
        self.cutoff.reset(self.params.cutoff);
    }

    /// Swap in a new shared snapshot. Gain and cutoff glide; the rest applies
    /// from the next sample. A snapshot carrying NaN or infinity is dropped and
    /// the current one stays in effect.
    pub fn set_parameters(&mut self, params: ParameterSnapshot) {
        let Ok(params) = params.validated() else {
            return;
        };
        let retune = params.detune != self.params.detune;

        self.params = params;
        self.adsr = params.adsr();
        self.gain.set_target(params.gain);
        self.cutoff.set_target(params.cutoff);
        self.parameter_changes += 1;

        if retune {
            for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
                voice.retune(params.detune);
            }
        }
    }

    /// Render `out.len()` samples, overwriting `out`.
    ///
    /// Cost is bounded by `out.len() * active voices`; no allocation.
    pub fn render_block(&mut self, out: &mut [f32]) {
        if !self.is_playing() {
            out.fill(0.0);
            // Nothing audible to glide, so land on the targets directly.
            let (gain, cutoff) = (self.gain.target(), self.cutoff.target());
            self.gain.reset(gain);
            self.cutoff.reset(cutoff);
            return;
        }

        let mut coeffs =
            FilterCoefficients::new(self.cutoff.value(), self.params.resonance, self.sample_rate);
        let mut coeffs_cutoff = self.cutoff.value();

        for sample in out.iter_mut() {
            let gain = self.gain.next();
            let cutoff = self.cutoff.next();
            if cutoff != coeffs_cutoff {
                coeffs = FilterCoefficients::new(cutoff, self.params.resonance, self.sample_rate);
                coeffs_cutoff = cutoff;
            }

            let frame = FrameParams {
                waveform: self.params.waveform,
                adsr: &self.adsr,
                filter: &coeffs,
            };

            let mut mixed = 0.0;
            for voice in self.voices.iter_mut() {
                if voice.is_active() {
                    mixed += voice.next_sample(&frame);
                }
            }

            *sample = soft_clip(mixed * gain);
        }
    }

    /// Fill `snapshot` with the currently sounding voices.
    pub fn activity(&self, snapshot: &mut ActivitySnapshot) {
        snapshot.clear_voices();
        snapshot.pool_size = self.voices.len();
        snapshot.parameter_changes = self.parameter_changes;
        for (slot, voice) in self.voices.iter().enumerate() {
            if voice.is_active() {
                snapshot.push_voice(VoiceActivity {
                    slot,
                    note: voice.note(),
                    velocity: voice.velocity(),
                    stage: voice.envelope_stage(),
                    level: voice.envelope_level(),
                });
            }
        }
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn is_playing(&self) -> bool {
        self.voices.iter().any(|v| v.is_active())
    }

    pub fn pool_size(&self) -> usize {
        self.voices.len()
    }

    pub fn parameters(&self) -> &ParameterSnapshot {
        &self.params
    }

    /// Gain the output stage is using right now, mid-glide or not.
    pub fn current_gain(&self) -> f32 {
        self.gain.value()
    }

    /// Cutoff the filters are using right now, mid-glide or not.
    pub fn current_cutoff(&self) -> f32 {
        self.cutoff.value()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn allocate_voice(&self) -> Option<usize> {
        // First pass: find free voice index
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return Some(idx);
        }

        // Second pass: steal the quietest releasing voice (oldest on ties)
        let releasing = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.envelope_stage() == EnvelopeStage::Release)
            .min_by(|(_, a), (_, b)| {
                a.envelope_level()
                    .total_cmp(&b.envelope_level())
                    .then(a.age().cmp(&b.age()))
            })
            .map(|(idx, _)| idx);
        if releasing.is_some() {
            return releasing;
        }

        // Last resort: steal the oldest activation
        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx)
    }

    fn find_voice(&mut self, note: u8) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.note() == note && v.state() == VoiceState::Active)
    }
}

/// Output stage saturation. Transparent near zero, never exceeds ±1.
#[inline]
fn soft_clip(x: f32) -> f32 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::Waveform;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn held_params() -> ParameterSnapshot {
        ParameterSnapshot {
            waveform: Waveform::Sine,
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.05,
            cutoff: 20_000.0,
            resonance: 0.0,
            gain: 1.0,
            detune: 0.0,
        }
    }

    fn sounding_notes(manager: &VoiceManager) -> Vec<u8> {
        let mut notes: Vec<u8> = manager
            .voices()
            .iter()
            .filter(|v| v.is_active())
            .map(|v| v.note())
            .collect();
        notes.sort_unstable();
        notes
    }

    #[test]
    fn silence_when_nothing_plays() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 4, held_params());
        let mut out = vec![1.0; 256];
        manager.render_block(&mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn steals_oldest_when_nothing_is_releasing() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 4, held_params());
        for note in [60, 62, 64, 65] {
            manager.note_on(note, 1.0);
        }
        manager.note_on(67, 1.0);

        assert_eq!(manager.active_voice_count(), 4);
        assert_eq!(sounding_notes(&manager), vec![62, 64, 65, 67]);
    }

    #[test]
    fn steals_quietest_releasing_voice_first() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 3, held_params());
        let mut out = vec![0.0; 480];

        manager.note_on(60, 1.0);
        manager.note_on(62, 1.0);
        manager.note_on(64, 1.0);
        manager.render_block(&mut out);

        manager.note_off(62);
        manager.render_block(&mut out); // 62 is 10 ms into a 50 ms release
        manager.note_off(64);
        manager.render_block(&mut out[..48]); // 64 barely started releasing

        manager.note_on(72, 1.0);
        assert_eq!(sounding_notes(&manager), vec![60, 64, 72]);
    }

    #[test]
    fn repeated_note_on_reuses_the_same_voice() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 4, held_params());
        manager.note_on(60, 1.0);
        manager.note_on(60, 0.5);
        assert_eq!(manager.active_voice_count(), 1);
    }

    #[test]
    fn double_note_off_is_harmless() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 2, held_params());
        let mut out = vec![0.0; 4_800];

        manager.note_on(60, 1.0);
        manager.note_off(60);
        manager.note_off(60);
        manager.note_off(99);
        manager.render_block(&mut out);

        assert_eq!(manager.active_voice_count(), 0);
        manager.note_off(60);
        manager.note_on(61, 1.0);
        assert_eq!(manager.active_voice_count(), 1);
    }

    #[test]
    fn out_of_range_input_is_ignored() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 2, held_params());
        manager.note_on(128, 1.0);
        manager.note_on(60, f32::NAN);
        assert_eq!(manager.active_voice_count(), 0);

        manager.note_on(60, 7.0);
        assert_eq!(manager.voices()[0].velocity(), 1.0);
    }

    #[test]
    fn output_is_bounded_with_full_pool() {
        let params = ParameterSnapshot {
            waveform: Waveform::Square,
            resonance: 1.0,
            ..held_params()
        };
        let mut manager = VoiceManager::new(SAMPLE_RATE, 8, params);
        for note in 40..48 {
            manager.note_on(note, 1.0);
        }
        let mut out = vec![0.0; 2_048];
        manager.render_block(&mut out);
        assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    }

    #[test]
    fn all_notes_off_then_reset() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 4, held_params());
        manager.note_on(60, 1.0);
        manager.note_on(64, 1.0);

        manager.all_notes_off();
        assert!(manager
            .voices()
            .iter()
            .filter(|v| v.is_active())
            .all(|v| v.state() == VoiceState::Releasing));

        manager.reset();
        assert!(!manager.is_playing());
    }

    #[test]
    fn gain_change_glides_instead_of_stepping() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 1, held_params());
        manager.note_on(33, 1.0); // 55 Hz, slow enough to see the glide
        let mut out = vec![0.0; 64];
        manager.render_block(&mut out);
        let before = out[63];

        manager.set_parameters(ParameterSnapshot {
            gain: 0.0,
            ..held_params()
        });
        manager.render_block(&mut out);
        assert!((out[0] - before).abs() < 0.05, "gain jumped");
    }

    #[test]
    fn activity_lists_sounding_notes() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 4, held_params());
        manager.note_on(60, 0.8);
        manager.note_on(67, 1.0);
        let mut out = vec![0.0; 16];
        manager.render_block(&mut out);

        let mut snapshot = ActivitySnapshot::default();
        manager.activity(&mut snapshot);

        assert_eq!(snapshot.active_voices, 2);
        assert_eq!(snapshot.pool_size, 4);
        assert!(snapshot.is_sounding(60) && snapshot.is_sounding(67));
        assert_eq!(snapshot.level_of(60), Some(1.0));
    }

    #[test]
    fn non_finite_snapshot_keeps_the_current_one() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 2, held_params());
        manager.note_on(60, 1.0);

        manager.set_parameters(ParameterSnapshot {
            gain: f32::NAN,
            ..held_params()
        });
        manager.set_parameters(ParameterSnapshot {
            sustain: f32::INFINITY,
            ..held_params()
        });
        assert_eq!(*manager.parameters(), held_params());

        let mut out = vec![0.0; 256];
        manager.render_block(&mut out);
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out.iter().any(|&s| s != 0.0));

        let mut snapshot = ActivitySnapshot::default();
        manager.activity(&mut snapshot);
        assert_eq!(snapshot.parameter_changes, 0);
    }

    /// Receiver that never runs dry but reports a fixed backlog.
    struct Endless {
        backlog: usize,
        popped: usize,
    }

    impl MessageReceiver for Endless {
        fn pending(&self) -> usize {
            self.backlog
        }

        fn pop(&mut self) -> Option<SynthMessage> {
            self.popped += 1;
            Some(SynthMessage::NoteOff { note: 60 })
        }
    }

    #[test]
    fn drain_stops_at_the_backlog_seen_on_entry() {
        let mut manager = VoiceManager::new(SAMPLE_RATE, 2, held_params());
        let mut rx = Endless {
            backlog: 3,
            popped: 0,
        };

        assert_eq!(manager.process_messages(&mut rx), 3);
        assert_eq!(rx.popped, 3);
    }
}
