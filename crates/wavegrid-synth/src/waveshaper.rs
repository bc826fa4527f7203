//! Table-driven waveshaping.
//!
//! A sine exciter at the note frequency addresses axis 0 of a 3-D transfer
//! table, while the `x` and `y` parameters select a position on the other two
//! axes. The table therefore holds a family of transfer curves and `x`/`y`
//! morph between them.

#[cfg(not(feature = "std"))]
use alloc::{sync::Arc, vec::Vec};
#[cfg(feature = "std")]
use std::sync::Arc;

use crate::engine::{NoteState, SynthEngine};
use libm::sin;
use wavegrid_core::{
    LookupTable, ParamBlock, ParamDescriptor, PhaseAccumulator, default_values, finite_or_zero,
    trilinear,
};

/// Parameter index of `x`.
pub const X: usize = 0;
/// Parameter index of `y`.
pub const Y: usize = 1;

pub(crate) const DESCRIPTORS: [ParamDescriptor; 2] = [
    ParamDescriptor::new("x", 0.5),
    ParamDescriptor::new("y", 0.5),
];

/// Sine exciter shaped by a 3-D transfer table.
///
/// `x` and `y` are in `[0, 1]` and may be block-rate or sample-rate.
#[derive(Debug, Clone)]
pub struct WaveshaperEngine {
    sample_rate: f64,
    note: NoteState,
    phase: PhaseAccumulator,
    table: Arc<LookupTable>,
    descriptors: Vec<ParamDescriptor>,
    values: Vec<f64>,
}

impl WaveshaperEngine {
    /// Create an engine reading `table`.
    pub fn new(sample_rate: f64, table: Arc<LookupTable>) -> Self {
        let descriptors = DESCRIPTORS.to_vec();
        let values = default_values(&descriptors);
        Self {
            sample_rate,
            note: NoteState::new(440.0),
            phase: PhaseAccumulator::new(),
            table,
            descriptors,
            values,
        }
    }

    /// The transfer table.
    pub fn table(&self) -> &Arc<LookupTable> {
        &self.table
    }

    /// Exciter phase in radians.
    pub fn phase(&self) -> f64 {
        self.phase.phase()
    }
}

impl SynthEngine for WaveshaperEngine {
    fn process(&mut self, params: &ParamBlock<'_>, output: &mut [f32]) {
        if !self.note.active {
            output.fill(0.0);
            return;
        }
        let len = output.len();
        let x = params.resolve(X, len, self.values[X]);
        let y = params.resolve(Y, len, self.values[Y]);

        let table = &*self.table;
        let scale0 = table.axis_max(0) * 0.5;
        let scale1 = table.axis_max(1);
        let scale2 = table.axis_max(2);
        let freq = self.note.frequency_hz;

        for (n, sample) in output.iter_mut().enumerate() {
            let exciter = sin(self.phase.advance(freq, self.sample_rate));
            let value = trilinear(
                table,
                (exciter + 1.0) * scale0,
                x.at(n) * scale1,
                y.at(n) * scale2,
            );
            *sample = finite_or_zero(value);
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
