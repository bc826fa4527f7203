//! Additive (harmonic) synthesis.
//!
//! Sums up to [`MAX_PARTIALS`] harmonics of the note frequency, read from a
//! shared interpolated sine table. Partials at or above Nyquist are dropped,
//! and the sum is divided by the total absolute partial amplitude so the
//! output stays near unit scale whatever the amplitude settings.

#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};

use crate::engine::{NoteState, SynthEngine};
use libm::ceil;
use wavegrid_core::{ParamBlock, ParamDescriptor, PhaseAccumulator, SineTable, default_values};

/// Upper bound on `n_partials`.
pub const MAX_PARTIALS: usize = 64;

/// Default number of partials.
pub const DEFAULT_PARTIALS: usize = 12;

/// Parameter index of `n_partials`; partial `i` lives at `PARTIAL_BASE + i`.
pub const N_PARTIALS: usize = 0;
/// Parameter index of `partial_amplitude_0`.
pub const PARTIAL_BASE: usize = 1;

/// Deterministic stand-in for randomly seeded default partial amplitudes.
fn default_amplitude(i: usize) -> f64 {
    // 32-bit xorshift seeded per partial
    let mut x = 0x9E37_79B9u32 ^ (i as u32).wrapping_mul(0x85EB_CA6B);
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    f64::from(x) / f64::from(u32::MAX)
}

/// Additive synthesis engine.
///
/// Parameters: `n_partials` followed by `partial_amplitude_0` ..
/// `partial_amplitude_63`. All are read block-rate.
///
/// # Example
///
/// ```rust
/// use wavegrid_synth::{AdditiveEngine, SynthEngine};
/// use wavegrid_core::ParamBlock;
///
/// let mut engine = AdditiveEngine::new(48000.0);
/// engine.note_on(57);
///
/// let mut block = [0.0f32; 128];
/// engine.process(&ParamBlock::empty(), &mut block);
/// assert!(block.iter().all(|s| s.abs() <= 1.0 + 1e-6));
/// ```
#[derive(Debug, Clone)]
pub struct AdditiveEngine {
    sample_rate: f64,
    note: NoteState,
    phase: PhaseAccumulator,
    sine: SineTable,
    descriptors: Vec<ParamDescriptor>,
    values: Vec<f64>,
}

/// `n_partials` followed by one amplitude per partial.
pub(crate) fn descriptors() -> Vec<ParamDescriptor> {
    let mut descriptors = Vec::with_capacity(PARTIAL_BASE + MAX_PARTIALS);
    descriptors.push(ParamDescriptor::new("n_partials", DEFAULT_PARTIALS as f64));
    for i in 0..MAX_PARTIALS {
        descriptors.push(ParamDescriptor::owned(
            format!("partial_amplitude_{i}"),
            default_amplitude(i),
        ));
    }
    descriptors
}

impl AdditiveEngine {
    /// Create an engine with the default partial set.
    pub fn new(sample_rate: f64) -> Self {
        let descriptors = descriptors();
        let values = default_values(&descriptors);

        Self {
            sample_rate,
            note: NoteState::new(440.0),
            phase: PhaseAccumulator::new(),
            sine: SineTable::new(),
            descriptors,
            values,
        }
    }

    /// Current note frequency in Hz.
    pub fn note_frequency(&self) -> f64 {
        self.note.frequency_hz
    }

    /// Oscillator phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase.phase()
    }
}

impl SynthEngine for AdditiveEngine {
    fn process(&mut self, params: &ParamBlock<'_>, output: &mut [f32]) {
        if !self.note.active {
            output.fill(0.0);
            return;
        }
        let len = output.len();
        if len == 0 {
            return;
        }

        let requested = params.resolve(N_PARTIALS, len, self.values[N_PARTIALS]).first();
        let n_partials = if requested.is_nan() {
            0
        } else {
            (ceil(requested).max(0.0) as usize).min(MAX_PARTIALS)
        };

        let mut amps = [0.0f64; MAX_PARTIALS];
        for (i, amp) in amps.iter_mut().enumerate().take(n_partials) {
            let index = PARTIAL_BASE + i;
            *amp = params.resolve(index, len, self.values[index]).first();
        }

        let freq = self.note.frequency_hz;
        let nyquist = self.sample_rate / 2.0;

        for sample in output.iter_mut() {
            let phase = self.phase.advance(freq, self.sample_rate);

            let mut sum = 0.0;
            let mut total = 0.0;
            for (i, &amp) in amps.iter().enumerate().take(n_partials) {
                let harmonic = (i + 1) as f64;
                if harmonic * freq > nyquist {
                    break;
                }
                total += amp.abs();
                sum += amp * self.sine.lookup(harmonic * phase);
            }

            // All-zero amplitudes render silence rather than 0/0.
            *sample = if total > 0.0 { (sum / total) as f32 } else { 0.0 };
        }
    }

    fn note_on(&mut self, note: u8) {
        self.note.press(note);
    }

    fn note_off(&mut self) {
        self.note.release();
    }

    fn is_active(&self) -> bool {
        self.note.active
    }

    fn parameter_descriptors(&self) -> &[ParamDescriptor] {
        &self.descriptors
    }

    fn param(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn set_param(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::sin;
    use wavegrid_core::{ParamValue, TAU};

    const SR: f64 = 48000.0;

    fn single_partial(engine: &mut AdditiveEngine) {
        engine.set_param(N_PARTIALS, 1.0);
        engine.set_param(PARTIAL_BASE, 1.0);
    }

    #[test]
    fn declares_count_and_amplitudes() {
        let engine = AdditiveEngine::new(SR);
        let descs = engine.parameter_descriptors();
        assert_eq!(descs.len(), 1 + MAX_PARTIALS);
        assert_eq!(descs[0].name, "n_partials");
        assert_eq!(descs[0].default_value, 12.0);
        assert_eq!(descs[5].name, "partial_amplitude_4");
        assert!(descs[1..].iter().all(|d| (0.0..=1.0).contains(&d.default_value)));
    }

    #[test]
    fn silent_before_note_on_and_phase_frozen() {
        let mut engine = AdditiveEngine::new(SR);
        let mut out = [1.0f32; 64];
        engine.process(&ParamBlock::empty(), &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(engine.phase(), 0.0);
    }

    #[test]
    fn single_partial_is_pure_sine() {
        let mut engine = AdditiveEngine::new(SR);
        single_partial(&mut engine);
        engine.note_on(69);

        let mut out = [0.0f32; 256];
        engine.process(&ParamBlock::empty(), &mut out);

        for (n, &s) in out.iter().enumerate() {
            let expected = sin(TAU * 440.0 * (n + 1) as f64 / SR);
            assert!((f64::from(s) - expected).abs() < 1e-5, "sample {n}: {s} vs {expected}");
        }
    }

    #[test]
    fn note_off_gates_output() {
        let mut engine = AdditiveEngine::new(SR);
        engine.note_on(60);
        let mut out = [0.0f32; 32];
        engine.process(&ParamBlock::empty(), &mut out);
        let phase = engine.phase();

        engine.note_off();
        assert!(!engine.is_active());
        engine.process(&ParamBlock::empty(), &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(engine.phase(), phase);
    }

    #[test]
    fn all_zero_amplitudes_render_silence() {
        let mut engine = AdditiveEngine::new(SR);
        for i in 0..MAX_PARTIALS {
            engine.set_param(PARTIAL_BASE + i, 0.0);
        }
        engine.note_on(60);
        let mut out = [1.0f32; 64];
        engine.process(&ParamBlock::empty(), &mut out);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn nyquist_guard_drops_upper_partials() {
        // Note 117 is ~7 kHz: only the first three harmonics fit under 24 kHz.
        let mut engine = AdditiveEngine::new(SR);
        engine.set_param(N_PARTIALS, 8.0);
        for i in 0..8 {
            engine.set_param(PARTIAL_BASE + i, 1.0);
        }
        engine.note_on(117);
        let freq = engine.note_frequency();
        assert!(3.0 * freq < SR / 2.0 && 4.0 * freq > SR / 2.0);

        let mut out = [0.0f32; 64];
        engine.process(&ParamBlock::empty(), &mut out);

        let phase_step = TAU * freq / SR;
        for (n, &s) in out.iter().enumerate() {
            let p = phase_step * (n + 1) as f64;
            let expected = (sin(p) + sin(2.0 * p) + sin(3.0 * p)) / 3.0;
            assert!((f64::from(s) - expected).abs() < 1e-4, "sample {n}");
        }
    }

    #[test]
    fn output_bounded_by_normalization() {
        let mut engine = AdditiveEngine::new(SR);
        engine.note_on(40);
        let mut out = [0.0f32; 4096];
        engine.process(&ParamBlock::empty(), &mut out);
        assert!(out.iter().all(|s| s.abs() <= 1.0 + 1e-6));
    }

    #[test]
    fn host_lanes_override_stored_values() {
        let mut engine = AdditiveEngine::new(SR);
        engine.note_on(69);
        let lanes = [Some(ParamValue::Constant(1.0)), Some(ParamValue::Constant(-0.5))];
        let mut out = [0.0f32; 16];
        engine.process(&ParamBlock::new(&lanes), &mut out);
        // One partial with negative amplitude normalizes to an inverted sine
        let expected = -sin(TAU * 440.0 / SR);
        assert!((f64::from(out[0]) - expected).abs() < 1e-5);
    }
}
