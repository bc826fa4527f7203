//! Constant-rate parameter ramps.
//!
//! [`LinearSmoothedParam`] reproduces host-style scheduled ramps ("reach
//! `value` in `t` milliseconds"): each new target restarts a straight-line
//! ramp from the current value. The wavetable-grid engine uses it for its
//! intrinsic gain and frequency lanes, and the experiment post chain uses it
//! for every pad-driven control.

/// A value that moves toward its target in a straight line.
///
/// # Example
///
/// ```rust
/// use wavegrid_core::LinearSmoothedParam;
///
/// let mut gain = LinearSmoothedParam::with_config(0.0, 48000.0, 10.0);
/// gain.set_target(1.0);
/// for _ in 0..480 {
///     gain.advance();
/// }
/// assert_eq!(gain.get(), 1.0);
/// assert!(gain.is_settled());
/// ```
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    value: f64,
    target: f64,
    step: f64,
    remaining: u32,
    sample_rate: f64,
    default_ramp_ms: f64,
}

impl LinearSmoothedParam {
    /// Create a settled parameter at `initial`.
    ///
    /// `default_ramp_ms` is the ramp length used by [`set_target`](Self::set_target).
    pub fn with_config(initial: f64, sample_rate: f64, default_ramp_ms: f64) -> Self {
        Self {
            value: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            sample_rate,
            default_ramp_ms,
        }
    }

    /// Ramp toward `target` over the default ramp length.
    ///
    /// Re-sending the target of a ramp in flight leaves it untouched.
    pub fn set_target(&mut self, target: f64) {
        if self.remaining > 0 && (target - self.target).abs() < 1e-12 {
            return;
        }
        self.start_ramp(target, self.default_ramp_ms);
    }

    /// Ramp toward `target` over `time_ms`, restarting from the current value.
    pub fn ramp_to(&mut self, target: f64, time_ms: f64) {
        self.start_ramp(target, time_ms);
    }

    /// Jump to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f64) {
        self.start_ramp(value, 0.0);
    }

    fn start_ramp(&mut self, target: f64, time_ms: f64) {
        self.target = target;
        let samples = (time_ms.max(0.0) * 0.001 * self.sample_rate) as u32;
        if samples == 0 {
            self.value = target;
            self.step = 0.0;
        } else {
            self.step = (target - self.value) / f64::from(samples);
        }
        self.remaining = samples;
    }

    /// Move one sample along the ramp and return the new value.
    ///
    /// The last step lands exactly on the target.
    #[inline]
    pub fn advance(&mut self) -> f64 {
        match self.remaining {
            0 => {}
            1 => {
                self.value = self.target;
                self.remaining = 0;
            }
            _ => {
                self.value += self.step;
                self.remaining -= 1;
            }
        }
        self.value
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f64 {
        self.value
    }

    /// Value the current ramp ends at.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether no ramp is in progress.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }
}
