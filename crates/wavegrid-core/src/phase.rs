//! Oscillator phase accumulation.
//!
//! Every engine drives its oscillators from a [`PhaseAccumulator`]: a radian
//! phase that is advanced by `2π·f/fs` each sample and folded back into
//! `[0, 2π)` by repeated subtraction. Subtraction (rather than a modulo)
//! keeps the phase continuous when the frequency changes between samples.
//! Increments of several cycles are first folded with one exact remainder so
//! absurd frequencies cost the same as ordinary ones.

use libm::fmod;

/// One full cycle in radians.
pub const TAU: f64 = core::f64::consts::TAU;

/// Running oscillator phase in radians.
///
/// # Invariant
///
/// After every call to [`advance`](Self::advance) the phase lies in `[0, 2π)`.
///
/// # Example
///
/// ```rust
/// use wavegrid_core::{PhaseAccumulator, TAU};
///
/// let mut phase = PhaseAccumulator::new();
/// for _ in 0..48000 {
///     let p = phase.advance(440.0, 48000.0);
///     assert!((0.0..TAU).contains(&p));
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
}

impl PhaseAccumulator {
    /// Create an accumulator at phase 0.
    pub const fn new() -> Self {
        Self { phase: 0.0 }
    }

    /// Advance by one sample at `freq_hz` and return the wrapped phase.
    ///
    /// Negative frequencies run the phase backwards; the result is still
    /// folded into `[0, 2π)`.
    #[inline]
    pub fn advance(&mut self, freq_hz: f64, sample_rate: f64) -> f64 {
        self.phase += TAU * freq_hz / sample_rate;
        self.wrap();
        self.phase
    }

    /// Current phase without advancing.
    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    fn wrap(&mut self) {
        // Non-finite increments (zero sample rate) would never terminate below.
        if !self.phase.is_finite() {
            self.phase = 0.0;
            return;
        }
        // Past ~7e16 subtracting TAU no longer changes the value.
        if self.phase.abs() >= 2.0 * TAU {
            self.phase = fmod(self.phase, TAU);
        }
        while self.phase >= TAU {
            self.phase -= TAU;
        }
        while self.phase < 0.0 {
            self.phase += TAU;
        }
        // -tiny + TAU rounds to exactly TAU
        if self.phase >= TAU {
            self.phase = 0.0;
        }
    }
}
