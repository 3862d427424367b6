use crate::dsp::{
    envelope::{Adsr, Envelope, EnvelopeStage},
    filter::{FilterCoefficients, LowPassFilter},
    oscillator::{detuned_freq, Oscillator, Waveform},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Gate held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// Values shared by every voice for one sample frame.
///
/// Built once per sample by the voice manager so coefficients are not
/// recomputed per voice.
pub struct FrameParams<'a> {
    pub waveform: Waveform,
    pub adsr: &'a Adsr,
    pub filter: &'a FilterCoefficients,
}

/// One sounding note: oscillator → low-pass → envelope.
pub struct Voice {
    note: u8,
    velocity: f32,
    age: u64,
    sample_rate: f32,
    phase_increment: f32,
    oscillator: Oscillator,
    envelope: Envelope,
    filter: LowPassFilter,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            note: 0,
            velocity: 0.0,
            age: 0,
            sample_rate,
            phase_increment: 0.0,
            oscillator: Oscillator::new(),
            envelope: Envelope::new(sample_rate),
            filter: LowPassFilter::new(),
        }
    }

    /// Assign a note and open the gate.
    ///
    /// A voice coming from Free starts from a clean phase and filter. A voice
    /// that is still sounding (retrigger or steal) keeps both and restarts the
    /// attack from its current level, so the waveform stays continuous.
    pub fn start(&mut self, note: u8, velocity: f32, age: u64, detune_cents: f32, adsr: &Adsr) {
        if self.is_free() {
            self.oscillator.reset();
            self.filter.reset();
        }

        self.note = note;
        self.velocity = velocity;
        self.age = age;
        self.retune(detune_cents);
        self.envelope.trigger(adsr);
    }

    /// Recompute pitch, e.g. after the detune parameter changed.
    pub fn retune(&mut self, detune_cents: f32) {
        self.phase_increment = detuned_freq(self.note, detune_cents) / self.sample_rate;
    }

    pub fn release(&mut self, adsr: &Adsr) {
        if self.state() == VoiceState::Active {
            self.envelope.release(adsr);
        }
    }

    /// Produce one sample. Returns 0 for a free voice.
    #[inline]
    pub fn next_sample(&mut self, frame: &FrameParams<'_>) -> f32 {
        if self.is_free() {
            return 0.0;
        }

        let raw = self
            .oscillator
            .next_sample(frame.waveform, self.phase_increment);
        let filtered = self.filter.process(raw, frame.filter);
        let level = self.envelope.next_sample(frame.adsr);

        filtered * level * self.velocity
    }

    /// Render a block with fixed frame parameters.
    pub fn render(&mut self, out: &mut [f32], frame: &FrameParams<'_>) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frame);
        }
    }

    /// Stop immediately, without a release tail.
    pub fn free(&mut self) {
        self.envelope.reset();
        self.oscillator.reset();
        self.filter.reset();
        self.note = 0;
        self.velocity = 0.0;
    }

    pub fn is_free(&self) -> bool {
        !self.envelope.is_active()
    }

    pub fn is_active(&self) -> bool {
        self.envelope.is_active()
    }

    pub fn state(&self) -> VoiceState {
        match self.envelope.stage() {
            EnvelopeStage::Idle => VoiceState::Free,
            EnvelopeStage::Release => VoiceState::Releasing,
            _ => VoiceState::Active,
        }
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn phase(&self) -> f32 {
        self.oscillator.phase()
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn age(&self) -> u64 {
        self.age
    }
}
