/*
ADSR Envelope Implementation
============================

Linear ADSR envelope generator driving voice amplitude.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the audio signal to control its amplitude over time.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  ramp        A straight line from a start level to a target level, measured
              in samples. Every moving stage is one ramp.


The Shape: Linear Ramps
-----------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Ramps are LINEAR. The curve is not exposed anywhere outside this module; it
shapes the feel of a patch but not the state machine.


Latching Durations
------------------

A stage converts its time to a sample count once, on entry:

    samples = round(seconds * sample_rate)

and then interpolates:

    level = start + (target - start) * elapsed / samples

so the target is hit exactly after `samples` steps, with no drift from
accumulating increments. A stage whose count is zero completes inside the
same `next_sample` call, which is how zero attack/decay/release avoid
dividing by zero.

Attack from a non-zero level (a retrigger) covers only the remaining
distance, so its count is scaled by (1 - level).


The State Machine
-----------------

    Idle ──trigger──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
      ↑                                                         │
      └──────level=0────── Release ←────────release─────────────┘

trigger from ANY stage jumps to Attack from the current level.
release from Attack, Decay or Sustain jumps to Release from the current level.
*/

/// Current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeStage {
    #[default]
    Idle, // Voice free, level = 0
    Attack,  // Ramping up to 1.0
    Decay,   // Ramping down to sustain level
    Sustain, // Holding at sustain level while the gate is high
    Release, // Gate went low, ramping down to 0
}

/// Stage times in seconds plus the sustain level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(0.01, 0.1, 0.7, 0.3)
    }
}

/// Time for a full-scale sustain change to glide in.
const SUSTAIN_SLEW_SECONDS: f32 = 0.005;

#[inline]
fn seconds_to_samples(seconds: f32, sample_rate: f32) -> u32 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate).round() as u32
}

pub struct Envelope {
    sample_rate: f32,

    stage: EnvelopeStage,
    level: f32,

    // Active ramp bookkeeping
    ramp_start: f32,
    ramp_target: f32,
    ramp_total: u32,
    ramp_elapsed: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            ramp_start: 0.0,
            ramp_target: 0.0,
            ramp_total: 0,
            ramp_elapsed: 0,
        }
    }

    fn begin_ramp(&mut self, stage: EnvelopeStage, target: f32, total: u32) {
        self.stage = stage;
        self.ramp_start = self.level;
        self.ramp_target = target;
        self.ramp_total = total;
        self.ramp_elapsed = 0;
    }

    fn enter_attack(&mut self, adsr: &Adsr) {
        let full = seconds_to_samples(adsr.attack, self.sample_rate);
        let remaining = ((1.0 - self.level) * full as f32).round() as u32;
        self.begin_ramp(EnvelopeStage::Attack, 1.0, remaining);
    }

    fn enter_decay(&mut self, adsr: &Adsr) {
        let total = seconds_to_samples(adsr.decay, self.sample_rate);
        self.begin_ramp(EnvelopeStage::Decay, adsr.sustain.clamp(0.0, 1.0), total);
    }

    /// Gate high: start (or restart) the attack from the current level.
    ///
    /// Starting from where the level already is keeps retriggers and voice
    /// steals free of discontinuities.
    pub fn trigger(&mut self, adsr: &Adsr) {
        self.enter_attack(adsr);
    }

    /// Gate low: start the release phase from the current level.
    pub fn release(&mut self, adsr: &Adsr) {
        match self.stage {
            EnvelopeStage::Idle | EnvelopeStage::Release => {}
            _ => {
                let total = seconds_to_samples(adsr.release, self.sample_rate);
                if total == 0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                } else {
                    self.begin_ramp(EnvelopeStage::Release, 0.0, total);
                }
            }
        }
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self, adsr: &Adsr) -> f32 {
        // Zero-length stages fall straight through to the next one, so a
        // single call may visit Attack, Decay and Sustain.
        loop {
            match self.stage {
                EnvelopeStage::Idle => {
                    self.level = 0.0;
                    break;
                }

                EnvelopeStage::Sustain => {
                    let target = adsr.sustain.clamp(0.0, 1.0);
                    let max_step = 1.0 / (SUSTAIN_SLEW_SECONDS * self.sample_rate).max(1.0);
                    let delta = (target - self.level).clamp(-max_step, max_step);
                    self.level += delta;
                    break;
                }

                EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Release => {
                    if self.ramp_elapsed < self.ramp_total {
                        self.ramp_elapsed += 1;
                        let progress = self.ramp_elapsed as f32 / self.ramp_total as f32;
                        self.level =
                            self.ramp_start + (self.ramp_target - self.ramp_start) * progress;
                    }

                    if self.ramp_elapsed < self.ramp_total {
                        break;
                    }

                    // Ramp finished: snap to the target and move on.
                    self.level = self.ramp_target;
                    let was_instant = self.ramp_total == 0;
                    match self.stage {
                        EnvelopeStage::Attack => self.enter_decay(adsr),
                        EnvelopeStage::Decay => self.stage = EnvelopeStage::Sustain,
                        _ => self.stage = EnvelopeStage::Idle,
                    }
                    if !was_instant {
                        break;
                    }
                }
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32], adsr: &Adsr) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(adsr);
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.ramp_start = 0.0;
        self.ramp_target = 0.0;
        self.ramp_total = 0;
        self.ramp_elapsed = 0;
    }

    /// Get the current envelope level (0.0 to 1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Get the current envelope stage
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}
