//! The engine contract shared by every synthesis algorithm.
//!
//! The set of engines is closed, so [`Engine`] is an enum that dispatches to
//! the four implementations without boxing. Hosts that only need one
//! algorithm can use the concrete types directly through [`SynthEngine`].
//!
//! # Voice lifecycle
//!
//! Every engine plays a single voice and follows the same contract:
//!
//! - [`note_on`](SynthEngine::note_on) sets the note frequency and starts sounding
//! - [`note_off`](SynthEngine::note_off) starts the engine's release
//! - [`is_active`](SynthEngine::is_active) reports whether output can be non-zero
//!
//! How "release" sounds is algorithm-specific: the FM engine runs its
//! envelopes' release stages, the additive and waveshaper engines gate
//! immediately, and the wavetable grid ramps its gain lane to zero.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::additive::{self, AdditiveEngine};
use crate::fm::{self, FmEngine};
use crate::waveshaper::{self, WaveshaperEngine};
use crate::wavetable_grid::{self, WavetableGridEngine};
use wavegrid_core::{ParamBlock, ParamDescriptor, midi_to_freq};

/// Frequency and gate of the single voice an engine plays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteState {
    /// Note frequency in Hz.
    pub frequency_hz: f64,
    /// Whether the note is held.
    pub active: bool,
}

impl NoteState {
    /// A released note at `frequency_hz`.
    pub const fn new(frequency_hz: f64) -> Self {
        Self {
            frequency_hz,
            active: false,
        }
    }

    /// Hold `note`, resolving its frequency.
    pub fn press(&mut self, note: u8) {
        self.frequency_hz = midi_to_freq(note);
        self.active = true;
    }

    /// Release the note; the frequency is kept.
    pub fn release(&mut self) {
        self.active = false;
    }
}

/// Per-block sample generator with a single voice.
///
/// `process` must not allocate, lock, or perform I/O.
pub trait SynthEngine {
    /// Fill `output` with the next block of samples.
    ///
    /// Lanes in `params` override the engine's stored parameter values for
    /// this block only.
    fn process(&mut self, params: &ParamBlock<'_>, output: &mut [f32]);

    /// Start playing MIDI note `note`.
    fn note_on(&mut self, note: u8);

    /// Release the current note.
    fn note_off(&mut self);

    /// Whether the engine can currently produce non-zero output.
    fn is_active(&self) -> bool;

    /// Ordered parameter declarations; indices address [`ParamBlock`] lanes.
    fn parameter_descriptors(&self) -> &[ParamDescriptor];

    /// Stored (block-rate) value of parameter `index`.
    fn param(&self, index: usize) -> Option<f64>;

    /// Replace the stored value of parameter `index`. Unknown indices are ignored.
    fn set_param(&mut self, index: usize, value: f64);

    /// Sample rate in Hz.
    fn sample_rate(&self) -> f64;
}

/// Engine algorithm identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Harmonic partial summation.
    Additive,
    /// Three-operator phase modulation.
    Fm,
    /// Sine exciter through a 3-D transfer table.
    Waveshaper,
    /// Phase-addressed 3-D wavetable.
    WavetableGrid,
}

impl EngineKind {
    /// All kinds, in declaration order.
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Additive,
        EngineKind::Fm,
        EngineKind::Waveshaper,
        EngineKind::WavetableGrid,
    ];

    /// Stable identifier used in patches and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Additive => "additive",
            EngineKind::Fm => "fm",
            EngineKind::Waveshaper => "waveshaper",
            EngineKind::WavetableGrid => "wavetable_grid",
        }
    }

    /// Look up a kind by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Whether the engine reads a 3-D lookup table.
    pub fn needs_table(self) -> bool {
        matches!(self, EngineKind::Waveshaper | EngineKind::WavetableGrid)
    }

    /// Parameter declarations of this kind, without building an engine.
    pub fn parameter_descriptors(self) -> Vec<ParamDescriptor> {
        match self {
            EngineKind::Additive => additive::descriptors(),
            EngineKind::Fm => fm::DESCRIPTORS.to_vec(),
            EngineKind::Waveshaper => waveshaper::DESCRIPTORS.to_vec(),
            EngineKind::WavetableGrid => wavetable_grid::DESCRIPTORS.to_vec(),
        }
    }
}

impl core::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Any of the four engines.
#[derive(Debug, Clone)]
pub enum Engine {
    /// See [`AdditiveEngine`].
    Additive(AdditiveEngine),
    /// See [`FmEngine`].
    Fm(FmEngine),
    /// See [`WaveshaperEngine`].
    Waveshaper(WaveshaperEngine),
    /// See [`WavetableGridEngine`].
    WavetableGrid(WavetableGridEngine),
}

macro_rules! dispatch {
    ($self:expr, $engine:ident => $body:expr) => {
        match $self {
            Engine::Additive($engine) => $body,
            Engine::Fm($engine) => $body,
            Engine::Waveshaper($engine) => $body,
            Engine::WavetableGrid($engine) => $body,
        }
    };
}

impl Engine {
    /// Which algorithm this is.
    pub fn kind(&self) -> EngineKind {
        match self {
            Engine::Additive(_) => EngineKind::Additive,
            Engine::Fm(_) => EngineKind::Fm,
            Engine::Waveshaper(_) => EngineKind::Waveshaper,
            Engine::WavetableGrid(_) => EngineKind::WavetableGrid,
        }
    }
}

impl SynthEngine for Engine {
    #[inline]
    fn process(&mut self, params: &ParamBlock<'_>, output: &mut [f32]) {
        dispatch!(self, e => e.process(params, output))
    }

    fn note_on(&mut self, note: u8) {
        dispatch!(self, e => e.note_on(note))
    }

    fn note_off(&mut self) {
        dispatch!(self, e => e.note_off())
    }

    fn is_active(&self) -> bool {
        dispatch!(self, e => e.is_active())
    }

    fn parameter_descriptors(&self) -> &[ParamDescriptor] {
        dispatch!(self, e => e.parameter_descriptors())
    }

    fn param(&self, index: usize) -> Option<f64> {
        dispatch!(self, e => e.param(index))
    }

    fn set_param(&mut self, index: usize, value: f64) {
        dispatch!(self, e => e.set_param(index, value))
    }

    fn sample_rate(&self) -> f64 {
        dispatch!(self, e => e.sample_rate())
    }
}

impl From<AdditiveEngine> for Engine {
    fn from(e: AdditiveEngine) -> Self {
        Engine::Additive(e)
    }
}

impl From<FmEngine> for Engine {
    fn from(e: FmEngine) -> Self {
        Engine::Fm(e)
    }
}

impl From<WaveshaperEngine> for Engine {
    fn from(e: WaveshaperEngine) -> Self {
        Engine::Waveshaper(e)
    }
}

impl From<WavetableGridEngine> for Engine {
    fn from(e: WavetableGridEngine) -> Self {
        Engine::WavetableGrid(e)
    }
}
