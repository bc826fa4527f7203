//! Phase-addressed 3-D wavetable.
//!
//! Axis 0 of the table is one waveform cycle: the oscillator phase maps
//! `[0, 2π)` onto `[0, shape[0] - 1]`. Axes 1 and 2 are a morph grid addressed
//! by `x` and `y` in `[0, 1]`.
//!
//! Every parameter has an intrinsic [`LinearSmoothedParam`] lane that ramps to
//! new values the way a host schedules automation ramps. Lanes supplied in a
//! [`ParamBlock`] take precedence for that block; the intrinsic lanes keep
//! advancing underneath so they are in place when the host lane goes away.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::engine::{NoteState, SynthEngine};
use wavegrid_core::{
    LinearSmoothedParam, LookupTable, ParamBlock, ParamDescriptor, PhaseAccumulator, TAU,
    default_values, finite_or_zero, trilinear,
};

/// Parameter index of `x`.
pub const X: usize = 0;
/// Parameter index of `y`.
pub const Y: usize = 1;
/// Parameter index of `gain`.
pub const GAIN: usize = 2;
/// Parameter index of `frequency`.
pub const FREQUENCY: usize = 3;

const PARAM_COUNT: usize = 4;

/// Ramp time for gain changes and [`SynthEngine::set_param`].
pub const PARAM_RAMP_MS: f64 = 100.0;

/// Glide time to a new note's frequency.
pub const GLIDE_MS: f64 = 10.0;

pub(crate) const DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor::new("x", 0.0),
    ParamDescriptor::new("y", 0.0),
    ParamDescriptor::new("gain", 0.0),
    ParamDescriptor::new("frequency", 174.614),
];

/// Wavetable oscillator over a 3-D morph grid.
///
/// `x`, `y`, `gain` and `frequency` may each be block-rate or sample-rate.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wavegrid_core::{LookupTable, ParamBlock};
/// use wavegrid_synth::{SynthEngine, WavetableGridEngine};
///
/// let saw = LookupTable::from_fn([256, 1, 1], |i, _, _| i as f32 / 127.5 - 1.0).unwrap();
/// let mut engine = WavetableGridEngine::new(48000.0, Arc::new(saw));
/// engine.note_on(48);
///
/// let mut block = [0.0f32; 128];
/// engine.process(&ParamBlock::empty(), &mut block);
/// assert!(engine.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct WavetableGridEngine {
    sample_rate: f64,
    note: NoteState,
    phase: PhaseAccumulator,
    table: Arc<LookupTable>,
    smoothers: [LinearSmoothedParam; PARAM_COUNT],
    descriptors: Vec<ParamDescriptor>,
    values: Vec<f64>,
}

impl WavetableGridEngine {
    /// Create an engine reading `table`, silent until the first note.
    pub fn new(sample_rate: f64, table: Arc<LookupTable>) -> Self {
        let descriptors = DESCRIPTORS.to_vec();
        let values = default_values(&descriptors);
        let smoothers = core::array::from_fn(|i| {
            LinearSmoothedParam::with_config(values[i], sample_rate, PARAM_RAMP_MS)
        });
        Self {
            sample_rate,
            note: NoteState::new(DESCRIPTORS[FREQUENCY].default_value),
            phase: PhaseAccumulator::new(),
            table,
            smoothers,
            descriptors,
            values,
        }
    }

    /// The wavetable.
    pub fn table(&self) -> &Arc<LookupTable> {
        &self.table
    }

    /// Current value of the intrinsic lane for parameter `index`.
    pub fn smoothed(&self, index: usize) -> Option<f64> {
        self.smoothers.get(index).map(LinearSmoothedParam::get)
    }

    /// Frequency of the last note played.
    pub fn note_frequency(&self) -> f64 {
        self.note.frequency_hz
    }
}

impl SynthEngine for WavetableGridEngine {
    fn process(&mut self, params: &ParamBlock<'_>, output: &mut [f32]) {
        let len = output.len();
        let host = core::array::from_fn::<_, PARAM_COUNT, _>(|i| {
            params.lane(i).map(|lane| lane.resolve(len, self.values[i]))
        });

        let table = &*self.table;
        let axis0 = table.axis_max(0);
        let axis1 = table.axis_max(1);
        let axis2 = table.axis_max(2);

        for (n, sample) in output.iter_mut().enumerate() {
            let mut current = [0.0; PARAM_COUNT];
            for ((value, smoother), lane) in
                current.iter_mut().zip(self.smoothers.iter_mut()).zip(host.iter())
            {
                let intrinsic = smoother.advance();
                *value = lane.as_ref().map_or(intrinsic, |lane| lane.at(n));
            }

            let phase = self.phase.advance(current[FREQUENCY], self.sample_rate);
            let wave = trilinear(
                table,
                phase / TAU * axis0,
                current[X] * axis1,
                current[Y] * axis2,
            );
            *sample = finite_or_zero((current[GAIN] * f64::from(wave)) as f32);
        }
    }

    fn note_on(&mut self, note: u8) {
        self.note.press(note);
        self.smoothers[FREQUENCY].ramp_to(self.note.frequency_hz, GLIDE_MS);
        self.smoothers[GAIN].ramp_to(1.0, PARAM_RAMP_MS);
    }

    fn note_off(&mut self) {
        self.note.release();
        self.smoothers[GAIN].ramp_to(0.0, PARAM_RAMP_MS);
    }

    fn is_active(&self) -> bool {
        let gain = &self.smoothers[GAIN];
        gain.get() != 0.0 || !gain.is_settled()
    }

    fn parameter_descriptors(&self) -> &[ParamDescriptor] {
        &self.descriptors
    }

    fn param(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn set_param(&mut self, index: usize, value: f64) {
        if let (Some(slot), Some(smoother)) =
            (self.values.get_mut(index), self.smoothers.get_mut(index))
        {
            *slot = value;
            smoother.ramp_to(value, PARAM_RAMP_MS);
        }
    }

    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(feature = "std"))]
    use alloc::vec;
    use wavegrid_core::ParamValue;

    const SR: f64 = 48000.0;
    const RAMP_SAMPLES: usize = 4800;

    fn ramp_table() -> Arc<LookupTable> {
        // Axis 0 is a rising ramp; x adds 1.0, y adds 10.0.
        let table = LookupTable::from_fn([129, 2, 2], |i0, i1, i2| {
            i0 as f32 / 128.0 + i1 as f32 + 10.0 * i2 as f32
        })
        .unwrap();
        Arc::new(table)
    }

    fn render(engine: &mut WavetableGridEngine, samples: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; samples];
        for chunk in out.chunks_mut(128) {
            engine.process(&ParamBlock::empty(), chunk);
        }
        out
    }

    #[test]
    fn declares_defaults() {
        let engine = WavetableGridEngine::new(SR, ramp_table());
        let names: Vec<_> = engine
            .parameter_descriptors()
            .iter()
            .map(|d| d.name.as_ref())
            .collect();
        assert_eq!(names, ["x", "y", "gain", "frequency"]);
        assert_eq!(engine.param(FREQUENCY), Some(174.614));
        assert_eq!(engine.param(GAIN), Some(0.0));
    }

    #[test]
    fn silent_and_inactive_before_note_on() {
        let mut engine = WavetableGridEngine::new(SR, ramp_table());
        assert!(!engine.is_active());
        let out = render(&mut engine, 512);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn all_zero_table_renders_zero() {
        let table = LookupTable::new(vec![0.0; 4 * 3 * 2], [4, 3, 2]).unwrap();
        let mut engine = WavetableGridEngine::new(SR, Arc::new(table));
        engine.note_on(60);
        let out = render(&mut engine, 2048);
        assert!(out.iter().all(|&s| s == 0.0 && !s.is_nan()));
    }

    #[test]
    fn note_on_ramps_gain_and_glides_frequency() {
        let mut engine = WavetableGridEngine::new(SR, ramp_table());
        engine.note_on(69);
        assert!(engine.is_active());

        render(&mut engine, 480);
        assert_eq!(engine.smoothed(FREQUENCY), Some(440.0));
        let partial = engine.smoothed(GAIN).unwrap();
        assert!(partial > 0.05 && partial < 0.15, "gain after 10 ms: {partial}");

        render(&mut engine, RAMP_SAMPLES);
        assert_eq!(engine.smoothed(GAIN), Some(1.0));
    }

    #[test]
    fn note_off_fades_to_inactive() {
        let mut engine = WavetableGridEngine::new(SR, ramp_table());
        engine.note_on(60);
        render(&mut engine, RAMP_SAMPLES);
        engine.note_off();
        assert!(engine.is_active());

        let tail = render(&mut engine, RAMP_SAMPLES);
        assert!(!engine.is_active());
        assert_eq!(*tail.last().unwrap(), 0.0);

        let after = render(&mut engine, 256);
        assert!(after.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn output_follows_phase_and_grid() {
        let mut engine = WavetableGridEngine::new(SR, ramp_table());
        let one = [1.0f64; 64];
        let lanes = [
            Some(ParamValue::Constant(1.0)),
            Some(ParamValue::Constant(0.0)),
            Some(ParamValue::PerSample(&one)),
            Some(ParamValue::Constant(750.0)),
        ];
        let mut out = [0.0f32; 64];
        engine.process(&ParamBlock::new(&lanes), &mut out);

        // 750 Hz at 48 kHz = 1/64 cycle per sample; the last sample sits on
        // the wrap point and is skipped.
        for (n, &s) in out.iter().enumerate().take(63) {
            let expected = 1.0 + (n + 1) as f32 / 64.0;
            assert!((s - expected).abs() < 1e-4, "sample {n}: {s} vs {expected}");
        }
    }

    #[test]
    fn set_param_ramps_over_100ms() {
        let mut engine = WavetableGridEngine::new(SR, ramp_table());
        engine.set_param(Y, 1.0);
        assert_eq!(engine.param(Y), Some(1.0));
        assert_eq!(engine.smoothed(Y), Some(0.0));
        render(&mut engine, RAMP_SAMPLES / 2);
        let halfway = engine.smoothed(Y).unwrap();
        assert!((halfway - 0.5).abs() < 0.01);
        render(&mut engine, RAMP_SAMPLES);
        assert_eq!(engine.smoothed(Y), Some(1.0));
    }
}
