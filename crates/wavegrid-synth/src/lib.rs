//! Wavegrid Synth - Synthesis engines for the wavegrid framework
//!
//! Four single-voice engines share one block-processing contract,
//! [`SynthEngine`], and can be driven interchangeably through [`Engine`].
//!
//! # Engines
//!
//! - [`AdditiveEngine`] - Up to 64 harmonics from an interpolated sine table
//! - [`FmEngine`] - Three operators, two parallel phase modulators
//! - [`WaveshaperEngine`] - Sine exciter through a 3-D transfer table
//! - [`WavetableGridEngine`] - Phase-addressed 3-D wavetable with ramped lanes
//!
//! ```rust
//! use wavegrid_core::ParamBlock;
//! use wavegrid_synth::{AdditiveEngine, SynthEngine};
//!
//! let mut engine = AdditiveEngine::new(48000.0);
//! engine.note_on(69);
//!
//! let mut block = [0.0f32; 128];
//! engine.process(&ParamBlock::empty(), &mut block);
//! ```
//!
//! ## Envelopes
//!
//! - [`Adsr`] - Slew-limited ADSR used by the FM operators
//! - [`EnvelopeStage`] - Envelope stage tracking
//!
//! ## Real-time Plumbing (`std`)
//!
//! - [`ControlMessage`] / [`control_channel`] - Bounded, non-blocking note
//!   and parameter messages
//! - [`processor`] - One-shot engine installation plus per-block rendering
//! - [`Convolver`] - Uniform-partitioned FFT convolution
//! - [`ExperimentChain`] - XY-pad driven AM, band-pass and reverb
//!
//! # no_std Support
//!
//! The engines and envelope are `no_std` compatible. Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! wavegrid-synth = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod additive;
pub mod engine;
pub mod envelope;
pub mod fm;
pub mod waveshaper;
pub mod wavetable_grid;

#[cfg(feature = "std")]
pub mod control;
#[cfg(feature = "std")]
pub mod convolver;
#[cfg(feature = "std")]
pub mod experiment;
#[cfg(feature = "std")]
mod processor;

pub use additive::{AdditiveEngine, MAX_PARTIALS};
pub use engine::{Engine, EngineKind, NoteState, SynthEngine};
pub use envelope::{Adsr, EnvelopeStage, SLEW_LIMIT};
pub use fm::FmEngine;
pub use waveshaper::WaveshaperEngine;
pub use wavetable_grid::WavetableGridEngine;

#[cfg(feature = "std")]
pub use control::{ControlError, ControlMessage, ControlReceiver, ControlSender, control_channel};
#[cfg(feature = "std")]
pub use convolver::Convolver;
#[cfg(feature = "std")]
pub use experiment::{ExperimentChain, XyMacro};
#[cfg(feature = "std")]
pub use processor::{BlockProcessor, InstallError, ProcessorHandle, processor};
