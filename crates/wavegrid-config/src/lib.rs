//! Patch files and validation for wavegrid engines.
//!
//! A [`Patch`] is a TOML description of one engine setup: which algorithm,
//! its parameter values by name, the lookup table or impulse response it
//! reads, and a note sequence to render. Validation checks parameter names
//! against the engine's own declarations and collects every problem in one
//! pass.
//!
//! # Example
//!
//! ```rust
//! use wavegrid_config::Patch;
//! use wavegrid_synth::{EngineKind, SynthEngine};
//!
//! let patch = Patch::from_toml(r#"
//!     engine = "additive"
//!     [params]
//!     n_partials = 4
//!     [[notes]]
//!     note = 57
//!     duration = 0.5
//! "#).unwrap();
//!
//! assert_eq!(patch.validate().unwrap(), EngineKind::Additive);
//! let engine = patch.build_engine(None).unwrap();
//! assert_eq!(engine.param(0), Some(4.0));
//! ```

mod error;
mod patch;
mod validation;

pub use error::{ConfigError, Result};
pub use patch::{ExperimentConfig, NoteEvent, Patch};
pub use validation::{
    MAX_NOTE, ValidationError, ValidationResult, resolve_params, validate_engine, validate_notes,
    validate_patch,
};
