/// Linear parameter smoother.
///
/// Retargeting starts a fixed-length ramp from the current value, so a jump
/// in a knob becomes a short glide instead of a step (zipper noise).
#[derive(Debug, Clone)]
pub struct LinearSmoother {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_samples: u32,
}

impl LinearSmoother {
    pub fn new(value: f32, ramp_seconds: f32, sample_rate: f32) -> Self {
        let ramp_samples = (ramp_seconds * sample_rate).round().max(1.0) as u32;
        Self {
            current: value,
            target: value,
            step: 0.0,
            remaining: 0,
            ramp_samples,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f32;
    }

    /// Jump straight to `value` with no ramp.
    pub fn reset(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_target_after_ramp() {
        let mut smoother = LinearSmoother::new(0.0, 0.01, 1_000.0);
        smoother.set_target(1.0);

        let mut last = 0.0;
        for _ in 0..10 {
            let v = smoother.next();
            assert!(v >= last, "ramp must be monotonic");
            last = v;
        }

        assert_eq!(smoother.value(), 1.0);
        assert!(!smoother.is_smoothing());
    }

    #[test]
    fn retarget_mid_ramp_starts_from_current_value() {
        let mut smoother = LinearSmoother::new(0.0, 0.01, 1_000.0);
        smoother.set_target(1.0);
        for _ in 0..5 {
            smoother.next();
        }
        let mid = smoother.value();

        smoother.set_target(0.0);
        let next = smoother.next();
        assert!(next < mid && mid - next <= 0.1 + 1e-6);
    }
}
