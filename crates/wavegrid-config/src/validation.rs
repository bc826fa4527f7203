//! Patch validation.
//!
//! Checks engine names, parameter names against the engine's declarations,
//! and the note sequence. Every problem in a patch is collected so a single
//! run reports all of them.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use wavegrid_config::resolve_params;
//! use wavegrid_synth::EngineKind;
//!
//! let mut params = BTreeMap::new();
//! params.insert("gain_2".to_string(), 0.4);
//! let resolved = resolve_params(EngineKind::Fm, &params).unwrap();
//! assert_eq!(resolved, vec![(7, 0.4)]);
//! ```

use crate::patch::{NoteEvent, Patch};
use std::collections::BTreeMap;
use thiserror::Error;
use wavegrid_core::find_param;
use wavegrid_synth::EngineKind;

pub use wavegrid_synth::control::MAX_NOTE;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown engine name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// Unknown parameter name.
    #[error("unknown parameter '{param}' for engine '{engine}'")]
    UnknownParameter {
        /// Name of the engine.
        engine: String,
        /// Name of the unrecognized parameter.
        param: String,
    },

    /// Parameter value is NaN or infinite.
    #[error("parameter '{param}' is not finite: {value}")]
    NonFinite {
        /// Name of the parameter.
        param: String,
        /// The offending value.
        value: f64,
    },

    /// Engine reads a lookup table but the patch names none.
    #[error("engine '{0}' needs a `table` path")]
    MissingTable(String),

    /// Note number outside the MIDI range.
    #[error("note {index}: note number {note} is above {MAX_NOTE}")]
    InvalidNote {
        /// Position in the note sequence.
        index: usize,
        /// The note number.
        note: u8,
    },

    /// Note start or duration is negative or not finite.
    #[error("note {index}: {reason}")]
    InvalidTiming {
        /// Position in the note sequence.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Sample rate of zero.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    /// Block size of zero.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// Pad coordinate outside `[0, 1]`.
    #[error("pad position ({x}, {y}) is outside [0, 1]")]
    PadOutOfRange {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Look up an engine kind by name.
pub fn validate_engine(name: &str) -> ValidationResult<EngineKind> {
    EngineKind::from_name(name).ok_or_else(|| ValidationError::UnknownEngine(name.to_string()))
}

/// Map named parameter values onto indices in `kind`'s declarations.
///
/// Returns `(index, value)` pairs in name order.
pub fn resolve_params(
    kind: EngineKind,
    params: &BTreeMap<String, f64>,
) -> ValidationResult<Vec<(usize, f64)>> {
    let descriptors = kind.parameter_descriptors();
    let mut resolved = Vec::with_capacity(params.len());
    let mut errors = Vec::new();

    for (name, &value) in params {
        match find_param(&descriptors, name) {
            Some(_) if !value.is_finite() => errors.push(ValidationError::NonFinite {
                param: name.clone(),
                value,
            }),
            Some(index) => resolved.push((index, value)),
            None => errors.push(ValidationError::UnknownParameter {
                engine: kind.name().to_string(),
                param: name.clone(),
            }),
        }
    }

    collect(errors).map(|()| resolved)
}

/// Check a note sequence.
pub fn validate_notes(notes: &[NoteEvent]) -> ValidationResult<()> {
    let mut errors = Vec::new();
    for (index, event) in notes.iter().enumerate() {
        check_note(index, event, &mut errors);
    }
    collect(errors)
}

/// Validate a whole patch, returning its engine kind.
pub fn validate_patch(patch: &Patch) -> ValidationResult<EngineKind> {
    let mut errors = Vec::new();

    if patch.sample_rate == 0 {
        errors.push(ValidationError::InvalidSampleRate(patch.sample_rate));
    }
    if patch.block_size == 0 {
        errors.push(ValidationError::InvalidBlockSize(patch.block_size));
    }

    let kind = match validate_engine(&patch.engine) {
        Ok(kind) => {
            if kind.needs_table() && patch.table.is_none() {
                errors.push(ValidationError::MissingTable(kind.name().to_string()));
            }
            if let Err(e) = resolve_params(kind, &patch.params) {
                flatten_into(e, &mut errors);
            }
            Some(kind)
        }
        Err(e) => {
            errors.push(e);
            None
        }
    };

    for (index, event) in patch.notes.iter().enumerate() {
        check_note(index, event, &mut errors);
    }

    if let Some(experiment) = &patch.experiment {
        let [x, y] = experiment.pad;
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            errors.push(ValidationError::PadOutOfRange { x, y });
        }
    }

    collect(errors)?;
    // No errors means the engine name resolved.
    kind.ok_or_else(|| ValidationError::UnknownEngine(patch.engine.clone()))
}

fn check_note(index: usize, event: &NoteEvent, errors: &mut Vec<ValidationError>) {
    if event.note > MAX_NOTE {
        errors.push(ValidationError::InvalidNote {
            index,
            note: event.note,
        });
    }
    if !event.start.is_finite() || event.start < 0.0 {
        errors.push(ValidationError::InvalidTiming {
            index,
            reason: format!("start {} must be a non-negative number of seconds", event.start),
        });
    }
    if !event.duration.is_finite() || event.duration < 0.0 {
        errors.push(ValidationError::InvalidTiming {
            index,
            reason: format!(
                "duration {} must be a non-negative number of seconds",
                event.duration
            ),
        });
    }
}

fn flatten_into(error: ValidationError, errors: &mut Vec<ValidationError>) {
    match error {
        ValidationError::Multiple(inner) => errors.extend(inner),
        other => errors.push(other),
    }
}

fn collect(mut errors: Vec<ValidationError>) -> ValidationResult<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn engine_names() {
        assert_eq!(validate_engine("fm"), Ok(EngineKind::Fm));
        assert_eq!(
            validate_engine("wavetable_grid"),
            Ok(EngineKind::WavetableGrid)
        );
        assert_eq!(
            validate_engine("FM"),
            Err(ValidationError::UnknownEngine("FM".into()))
        );
    }

    #[test]
    fn params_resolve_to_indices() {
        let resolved = resolve_params(
            EngineKind::Additive,
            &params(&[("n_partials", 8.0), ("partial_amplitude_3", 0.5)]),
        )
        .unwrap();
        assert_eq!(resolved, vec![(0, 8.0), (4, 0.5)]);

        let resolved =
            resolve_params(EngineKind::WavetableGrid, &params(&[("frequency", 220.0)])).unwrap();
        assert_eq!(resolved, vec![(3, 220.0)]);
    }

    #[test]
    fn unknown_and_non_finite_params_are_collected() {
        let err = resolve_params(
            EngineKind::Waveshaper,
            &params(&[("drive", 1.0), ("x", f64::NAN), ("y", 0.2)]),
        )
        .unwrap_err();
        let ValidationError::Multiple(errors) = err else {
            panic!("expected multiple errors, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::UnknownParameter { param, engine } if param == "drive" && engine == "waveshaper"
        )));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::NonFinite { param, .. } if param == "x"))
        );
    }

    #[test]
    fn single_error_is_not_wrapped() {
        let err = resolve_params(EngineKind::Fm, &params(&[("gain_9", 1.0)])).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownParameter { .. }));
    }

    #[test]
    fn note_checks() {
        let notes = [
            NoteEvent::new(60, 0.0, 1.0),
            NoteEvent::new(200, 0.5, 1.0),
            NoteEvent::new(64, -1.0, f64::INFINITY),
        ];
        let ValidationError::Multiple(errors) = validate_notes(&notes).unwrap_err() else {
            panic!("expected multiple errors");
        };
        assert_eq!(
            errors[0],
            ValidationError::InvalidNote {
                index: 1,
                note: 200
            }
        );
        assert_eq!(errors.len(), 3);
        assert!(validate_notes(&notes[..1]).is_ok());
    }

    #[test]
    fn note_range_matches_control_channel() {
        let (tx, _rx) = wavegrid_synth::control_channel(4);
        assert!(validate_notes(&[NoteEvent::new(MAX_NOTE, 0.0, 1.0)]).is_ok());
        assert!(tx.note_on(MAX_NOTE).is_ok());

        let above = MAX_NOTE + 1;
        assert!(validate_notes(&[NoteEvent::new(above, 0.0, 1.0)]).is_err());
        assert!(tx.note_on(above).is_err());
    }

    #[test]
    fn multiple_error_message_joins() {
        let err = ValidationError::Multiple(vec![
            ValidationError::InvalidSampleRate(0),
            ValidationError::InvalidBlockSize(0),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: invalid sample rate: 0; invalid block size: 0"
        );
    }
}
