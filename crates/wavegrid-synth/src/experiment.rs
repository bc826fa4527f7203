//! XY-pad post-processing chain for the wavetable grid.
//!
//! ```text
//!                  ┌──────────── dry × 0.75 ─────────────┐
//! in ─► AM ─► band-pass ─┤                                ├─► × 0.6 ─► out
//!                  └─── convolution reverb × 0.25 ───────┘
//! ```
//!
//! A single pad position drives three macros through [`XyMacro::from_pad`]:
//! amplitude-modulation depth, modulator frequency and filter cutoff. Pad
//! moves ramp the macros over [`PAD_RAMP_MS`].

use crate::convolver::Convolver;
use libm::{cos, pow, sin};
use wavegrid_core::{Biquad, LinearSmoothedParam, PhaseAccumulator, bandpass_coefficients};

/// Ramp time for pad moves.
pub const PAD_RAMP_MS: f64 = 100.0;
/// Level of the convolution path.
pub const WET_GAIN: f32 = 0.25;
/// Level of the dry path.
pub const DRY_GAIN: f32 = 0.75;
/// Output level.
pub const MASTER_GAIN: f32 = 0.6;
/// Band-pass quality factor.
pub const FILTER_Q: f32 = 0.5;

const INITIAL_DEPTH: f64 = 0.3;
const INITIAL_MOD_HZ: f64 = 1000.0;
const INITIAL_CUTOFF_HZ: f64 = 1000.0;

/// Macro values derived from a pad position, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XyMacro {
    /// Amplitude-modulation depth.
    pub mod_gain: f64,
    /// Normalized modulator frequency.
    pub mod_freq: f64,
    /// Normalized filter cutoff.
    pub filter_cutoff: f64,
}

impl XyMacro {
    /// Map a pad position (`x`, `y` in `[0, 1]`) onto the three macros.
    ///
    /// Each macro is a squared raised cosine of a different blend of `x`, `y`
    /// and `xy`, so the pad surface folds through each range several times.
    pub fn from_pad(x: f64, y: f64) -> Self {
        let shape = |freq: f64, a: f64, b: f64, c: f64| {
            let v = cos(freq * core::f64::consts::PI * (a * x + b * y + c * x * y)) * 0.5 + 0.5;
            v * v
        };
        Self {
            mod_gain: shape(2.9, 1.4, 0.6, 0.1),
            mod_freq: shape(4.2, 0.6, 1.3, 0.2),
            filter_cutoff: shape(3.8, 1.2, 0.9, 0.3),
        }
    }

    /// Modulator frequency in Hz (150 to 600).
    pub fn mod_freq_hz(&self) -> f64 {
        150.0 + self.mod_freq * 450.0
    }

    /// Band-pass center frequency in Hz (100 to 8100).
    pub fn cutoff_hz(&self) -> f64 {
        pow(self.filter_cutoff, 1.5) * 8000.0 + 100.0
    }
}

/// Amplitude modulation, band-pass and parallel reverb, in place.
#[derive(Debug)]
pub struct ExperimentChain {
    sample_rate: f64,
    modulator: PhaseAccumulator,
    depth: LinearSmoothedParam,
    mod_hz: LinearSmoothedParam,
    cutoff_hz: LinearSmoothedParam,
    filter: Biquad,
    reverb: Option<Convolver>,
}

impl ExperimentChain {
    /// Create a chain; without a `reverb` the wet path is silent.
    pub fn new(sample_rate: f64, reverb: Option<Convolver>) -> Self {
        let smoother = |v| LinearSmoothedParam::with_config(v, sample_rate, PAD_RAMP_MS);
        Self {
            sample_rate,
            modulator: PhaseAccumulator::new(),
            depth: smoother(INITIAL_DEPTH),
            mod_hz: smoother(INITIAL_MOD_HZ),
            cutoff_hz: smoother(INITIAL_CUTOFF_HZ),
            filter: Biquad::new(),
            reverb,
        }
    }

    /// Move the pad; returns the macro targets.
    pub fn set_pad(&mut self, x: f64, y: f64) -> XyMacro {
        let m = XyMacro::from_pad(x, y);
        self.depth.set_target(m.mod_gain);
        self.mod_hz.set_target(m.mod_freq_hz());
        self.cutoff_hz.set_target(m.cutoff_hz());
        m
    }

    /// Current modulation depth.
    pub fn depth(&self) -> f64 {
        self.depth.get()
    }

    /// Current modulator frequency in Hz.
    pub fn mod_freq_hz(&self) -> f64 {
        self.mod_hz.get()
    }

    /// Current band-pass center frequency in Hz.
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz.get()
    }

    /// Whether a reverb impulse response is loaded.
    pub fn has_reverb(&self) -> bool {
        self.reverb.is_some()
    }

    /// Process `buffer` in place.
    ///
    /// Filter coefficients follow the cutoff ramp once per call.
    pub fn process(&mut self, buffer: &mut [f32]) {
        let sr = self.sample_rate;
        let nyquist_guard = sr * 0.49;
        let (b0, b1, b2, a0, a1, a2) = bandpass_coefficients(
            self.cutoff_hz.get().min(nyquist_guard) as f32,
            FILTER_Q,
            sr as f32,
        );
        self.filter.set_coefficients(b0, b1, b2, a0, a1, a2);

        for sample in buffer.iter_mut() {
            let depth = self.depth.advance();
            let freq = self.mod_hz.advance();
            self.cutoff_hz.advance();

            let am = 1.0 + depth * sin(self.modulator.advance(freq, sr));
            let filtered = self.filter.process(*sample * am as f32);
            let wet = self
                .reverb
                .as_mut()
                .map_or(0.0, |reverb| reverb.process_sample(filtered));

            *sample = (filtered * DRY_GAIN + wet * WET_GAIN) * MASTER_GAIN;
        }
    }
}
