use std::f32::consts::PI;

/*
State-Variable Low-Pass
=======================

Two trapezoidal integrators (the "TPT" SVF). Unlike the classic Chamberlin
SVF this stays stable all the way up to Nyquist, which matters because the
cutoff is a live parameter.

  g  = tan(π · cutoff / sample_rate)    integrator gain
  k  = damping, 2 = no resonance, → 0 = self-oscillation

Resonance in [0, 1] maps to k in [2.0, 0.1], so even full resonance keeps
some damping and the filter never rings forever.

Both inputs are clamped before use:

  cutoff     [MIN_CUTOFF_HZ, NYQUIST_FRACTION · sample_rate]
  resonance  [0, 1]
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest usable cutoff as a fraction of the sample rate (just below Nyquist).
pub const NYQUIST_FRACTION: f32 = 0.49;

const MAX_DAMPING: f32 = 2.0;
const MIN_DAMPING: f32 = 0.1;

/// Clamp a cutoff into the range the filter can handle at `sample_rate`.
#[inline]
pub fn clamp_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    let max = sample_rate * NYQUIST_FRACTION;
    if cutoff_hz.is_nan() {
        return max;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, max)
}

/// Per-sample filter coefficients. Shared by every voice in a sample frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCoefficients {
    g: f32,
    k: f32,
    h: f32,
}

impl FilterCoefficients {
    pub fn new(cutoff_hz: f32, resonance: f32, sample_rate: f32) -> Self {
        let cutoff = clamp_cutoff(cutoff_hz, sample_rate);
        let resonance = if resonance.is_nan() {
            0.0
        } else {
            resonance.clamp(0.0, 1.0)
        };

        let g = (PI * cutoff / sample_rate).tan();
        let k = MAX_DAMPING - (MAX_DAMPING - MIN_DAMPING) * resonance;
        let h = 1.0 / (1.0 + g * (g + k));

        Self { g, k, h }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LowPassFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory
}

impl LowPassFilter {
    pub fn new() -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
        }
    }

    /// Filter one sample with precomputed coefficients.
    #[inline]
    pub fn process(&mut self, input: f32, coeffs: &FilterCoefficients) -> f32 {
        let v3 = input - self.ic2eq;
        let v1 = coeffs.h * (self.ic1eq + coeffs.g * v3);
        let v2 = self.ic2eq + coeffs.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    /// Filter one sample, computing coefficients on the spot.
    pub fn next_sample(
        &mut self,
        input: f32,
        cutoff_hz: f32,
        resonance: f32,
        sample_rate: f32,
    ) -> f32 {
        let coeffs = FilterCoefficients::new(cutoff_hz, resonance, sample_rate);
        self.process(input, &coeffs)
    }

    pub fn render(&mut self, buffer: &mut [f32], coeffs: &FilterCoefficients) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, coeffs);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
