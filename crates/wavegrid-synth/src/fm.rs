//! Three-operator FM (phase modulation) synthesis.
//!
//! Fixed topology: operator 1 is the carrier, operators 2 and 3 modulate its
//! phase in parallel.
//!
//! ```text
//!   op3 ──┐
//!         ├──► phase of op1 ──► out
//!   op2 ──┘
//! ```
//!
//! Each operator has its own phase accumulator (note frequency × tuning
//! ratio) and its own [`Adsr`] envelope. Modulator outputs are scaled by 2π so
//! a gain of 1.0 sweeps the carrier phase by a full cycle.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::engine::{NoteState, SynthEngine};
use crate::envelope::Adsr;
use libm::sin;
use wavegrid_core::{ParamBlock, ParamDescriptor, PhaseAccumulator, TAU, default_values};

/// Number of operators.
pub const OPERATORS: usize = 3;

/// Parameters per operator.
pub const PARAMS_PER_OPERATOR: usize = 6;

/// Offset of each field within an operator's parameter group.
pub mod field {
    /// Frequency ratio to the note.
    pub const TUNING: usize = 0;
    /// Output gain.
    pub const GAIN: usize = 1;
    /// Envelope attack control.
    pub const ATTACK: usize = 2;
    /// Envelope decay control.
    pub const DECAY: usize = 3;
    /// Envelope sustain level.
    pub const SUSTAIN: usize = 4;
    /// Envelope release control.
    pub const RELEASE: usize = 5;
}

/// Parameter index of `field` for operator `op` (0-based).
pub const fn param_index(op: usize, field: usize) -> usize {
    op * PARAMS_PER_OPERATOR + field
}

pub(crate) const DESCRIPTORS: [ParamDescriptor; OPERATORS * PARAMS_PER_OPERATOR] = [
    ParamDescriptor::new("tuning_1", 1.0),
    ParamDescriptor::new("gain_1", 0.7),
    ParamDescriptor::new("attack_1", 0.01),
    ParamDescriptor::new("decay_1", 0.1),
    ParamDescriptor::new("sustain_1", 0.0),
    ParamDescriptor::new("release_1", 0.2),
    ParamDescriptor::new("tuning_2", 1.0),
    ParamDescriptor::new("gain_2", 0.0),
    ParamDescriptor::new("attack_2", 0.3),
    ParamDescriptor::new("decay_2", 0.1),
    ParamDescriptor::new("sustain_2", 0.5),
    ParamDescriptor::new("release_2", 0.2),
    ParamDescriptor::new("tuning_3", 1.0),
    ParamDescriptor::new("gain_3", 0.0),
    ParamDescriptor::new("attack_3", 0.2),
    ParamDescriptor::new("decay_3", 0.8),
    ParamDescriptor::new("sustain_3", 0.5),
    ParamDescriptor::new("release_3", 0.2),
];

/// Three-operator FM engine.
///
/// Tuning and gain lanes may be block-rate or sample-rate; envelope controls
/// are block-rate and re-applied at the start of every block.
///
/// # Example
///
/// ```rust
/// use wavegrid_synth::{FmEngine, SynthEngine};
/// use wavegrid_synth::fm::{field, param_index};
/// use wavegrid_core::ParamBlock;
///
/// let mut fm = FmEngine::new(48000.0);
/// fm.set_param(param_index(1, field::GAIN), 0.3); // bring in operator 2
/// fm.note_on(45);
///
/// let mut block = [0.0f32; 128];
/// fm.process(&ParamBlock::empty(), &mut block);
/// ```
#[derive(Debug, Clone)]
pub struct FmEngine {
    sample_rate: f64,
    note: NoteState,
    phases: [PhaseAccumulator; OPERATORS],
    envelopes: [Adsr; OPERATORS],
    descriptors: Vec<ParamDescriptor>,
    values: Vec<f64>,
}

impl FmEngine {
    /// Create an engine with the default patch.
    pub fn new(sample_rate: f64) -> Self {
        let descriptors = DESCRIPTORS.to_vec();
        let values = default_values(&descriptors);
        Self {
            sample_rate,
            note: NoteState::new(110.0),
            phases: [PhaseAccumulator::new(); OPERATORS],
            envelopes: [
                Adsr::new(sample_rate),
                Adsr::new(sample_rate),
                Adsr::new(sample_rate),
            ],
            descriptors,
            values,
        }
    }

    /// Current note frequency in Hz.
    pub fn note_frequency(&self) -> f64 {
        self.note.frequency_hz
    }

    /// Envelope of operator `op` (0-based).
    pub fn envelope(&self, op: usize) -> &Adsr {
        &self.envelopes[op]
    }

    /// Phase of operator `op` (0-based) in radians.
    pub fn operator_phase(&self, op: usize) -> f64 {
        self.phases[op].phase()
    }

    fn apply_envelope_params(&mut self, params: &ParamBlock<'_>, len: usize) {
        for op in 0..OPERATORS {
            let read = |f: usize| {
                let index = param_index(op, f);
                params.resolve(index, len, self.values[index]).first()
            };
            let (a, d, s, r) = (
                read(field::ATTACK),
                read(field::DECAY),
                read(field::SUSTAIN),
                read(field::RELEASE),
            );
            self.envelopes[op].set_params(a, d, s, r);
        }
    }
}

impl SynthEngine for FmEngine {
    fn process(&mut self, params: &ParamBlock<'_>, output: &mut [f32]) {
        let len = output.len();
        if len == 0 {
            return;
        }
        self.apply_envelope_params(params, len);

        if !self.is_active() {
            output.fill(0.0);
            return;
        }

        let lane = |op: usize, f: usize| {
            let index = param_index(op, f);
            params.resolve(index, len, self.values[index])
        };
        let tuning = [lane(0, field::TUNING), lane(1, field::TUNING), lane(2, field::TUNING)];
        let gain = [lane(0, field::GAIN), lane(1, field::GAIN), lane(2, field::GAIN)];

        let freq = self.note.frequency_hz;
        let sr = self.sample_rate;

        for (n, sample) in output.iter_mut().enumerate() {
            let env1 = self.envelopes[0].process();
            let env2 = self.envelopes[1].process();
            let env3 = self.envelopes[2].process();

            let op3 = TAU * env3 * gain[2].at(n) * sin(self.phases[2].phase());
            let op2 = TAU * env2 * gain[1].at(n) * sin(self.phases[1].phase());
            let op1 = env1 * gain[0].at(n) * sin(self.phases[0].phase() + op2 + op3);

            for (phase, ratio) in self.phases.iter_mut().zip(tuning.iter()) {
                phase.advance(freq * ratio.at(n), sr);
            }

            *sample = op1 as f32;
        }
    }

    fn note_on(&mut self, note: u8) {
        self.note.press(note);
        for (phase, env) in self.phases.iter_mut().zip(self.envelopes.iter_mut()) {
            env.attack();
            phase.reset();
        }
    }

    fn note_off(&mut self) {
        self.note.release();
        for env in &mut self.envelopes {
            env.release();
        }
    }

    fn is_active(&self) -> bool {
        self.envelopes.iter().any(Adsr::is_active)
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
