//! TOML patch files.
//!
//! A patch names an engine, its parameter values, optional table and impulse
//! response paths, and a note sequence for offline rendering:
//!
//! ```toml
//! name = "Glass bell"
//! engine = "fm"
//! sample_rate = 48000
//!
//! [params]
//! gain_2 = 0.4
//! tuning_2 = 3.5
//!
//! [[notes]]
//! note = 69
//! start = 0.0
//! duration = 1.5
//! ```
//!
//! Relative `table` and `impulse_response` paths are resolved against the
//! directory of the patch file when it is loaded with [`Patch::load`].

use crate::error::{ConfigError, Result};
use crate::validation::{resolve_params, validate_patch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wavegrid_core::LookupTable;
use wavegrid_synth::{
    AdditiveEngine, ControlMessage, Engine, EngineKind, FmEngine, SynthEngine, WaveshaperEngine,
    WavetableGridEngine,
};

/// One note in a patch's sequence, timed in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number.
    pub note: u8,
    /// Start time in seconds.
    #[serde(default)]
    pub start: f64,
    /// Time until note-off, in seconds.
    pub duration: f64,
}

impl NoteEvent {
    /// Create a note event.
    pub fn new(note: u8, start: f64, duration: f64) -> Self {
        Self {
            note,
            start,
            duration,
        }
    }
}

/// Settings for the XY-pad post chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Pad position `[x, y]` in `[0, 1]`.
    #[serde(default = "default_pad")]
    pub pad: [f64; 2],
    /// Impulse response WAV for the reverb path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_response: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            pad: default_pad(),
            impulse_response: None,
        }
    }
}

/// A renderable engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Engine name, see [`EngineKind::name`].
    pub engine: String,

    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Render block size in samples.
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Seconds rendered after the last note-off.
    #[serde(default = "default_tail")]
    pub tail: f64,

    /// Lookup table for the waveshaper and wavetable grid engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<PathBuf>,

    /// Parameter values by name; unset parameters keep their defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,

    /// Optional post chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<ExperimentConfig>,

    /// Note sequence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<NoteEvent>,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_block_size() -> usize {
    128
}

fn default_tail() -> f64 {
    1.0
}

fn default_pad() -> [f64; 2] {
    [0.5, 0.5]
}

impl Patch {
    /// Create an empty patch for `kind`.
    pub fn new(kind: EngineKind) -> Self {
        Self {
            name: None,
            engine: kind.name().to_string(),
            sample_rate: default_sample_rate(),
            block_size: default_block_size(),
            tail: default_tail(),
            table: None,
            params: BTreeMap::new(),
            experiment: None,
            notes: Vec::new(),
        }
    }

    /// Set a parameter by name.
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Append a note.
    pub fn with_note(mut self, note: u8, start: f64, duration: f64) -> Self {
        self.notes.push(NoteEvent::new(note, start, duration));
        self
    }

    /// Load a patch file, resolving relative paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut patch = Self::from_toml(&content)?;
        if let Some(dir) = path.parent() {
            patch.resolve_paths(dir);
        }
        tracing::debug!(path = %path.display(), engine = %patch.engine, notes = patch.notes.len(), "loaded patch");
        Ok(patch)
    }

    /// Parse a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the patch to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the patch to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Make relative table and impulse response paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(table) = self.table.as_mut() {
            resolve(table);
        }
        if let Some(ir) = self
            .experiment
            .as_mut()
            .and_then(|e| e.impulse_response.as_mut())
        {
            resolve(ir);
        }
    }

    /// The engine kind named by the patch.
    pub fn engine_kind(&self) -> Result<EngineKind> {
        EngineKind::from_name(&self.engine)
            .ok_or_else(|| ConfigError::UnknownEngine(self.engine.clone()))
    }

    /// Check the whole patch, reporting every problem found.
    pub fn validate(&self) -> Result<EngineKind> {
        Ok(validate_patch(self)?)
    }

    /// Build the configured engine with the patch's parameter values applied.
    ///
    /// `table` is required for table-driven engines and ignored otherwise.
    pub fn build_engine(&self, table: Option<Arc<LookupTable>>) -> Result<Engine> {
        let kind = self.engine_kind()?;
        let assignments = resolve_params(kind, &self.params)?;
        let sample_rate = f64::from(self.sample_rate);

        let mut engine: Engine = match (kind, table) {
            (EngineKind::Additive, _) => AdditiveEngine::new(sample_rate).into(),
            (EngineKind::Fm, _) => FmEngine::new(sample_rate).into(),
            (EngineKind::Waveshaper, Some(table)) => {
                WaveshaperEngine::new(sample_rate, table).into()
            }
            (EngineKind::WavetableGrid, Some(table)) => {
                WavetableGridEngine::new(sample_rate, table).into()
            }
            (kind, None) => return Err(ConfigError::MissingTable(kind.name().to_string())),
        };

        for (index, value) in assignments {
            engine.set_param(index, value);
        }
        Ok(engine)
    }

    /// Total render length in seconds: the last note-off plus the tail.
    pub fn duration_secs(&self) -> f64 {
        let last_off = self
            .notes
            .iter()
            .map(|n| n.start + n.duration)
            .fold(0.0, f64::max);
        last_off + self.tail.max(0.0)
    }

    /// Note-on and note-off messages with their sample offsets, in time order.
    ///
    /// A note-off sharing a sample with a note-on sorts first so the new note
    /// is not cut by the previous one's release.
    pub fn control_events(&self) -> Vec<(u64, ControlMessage)> {
        let sr = f64::from(self.sample_rate);
        let to_samples = |secs: f64| (secs.max(0.0) * sr).round() as u64;

        let mut events: Vec<(u64, ControlMessage)> = self
            .notes
            .iter()
            .flat_map(|n| {
                [
                    (to_samples(n.start), ControlMessage::NoteOn { note: n.note }),
                    (to_samples(n.start + n.duration), ControlMessage::NoteOff),
                ]
            })
            .collect();
        events.sort_by_key(|(at, msg)| (*at, matches!(msg, ControlMessage::NoteOn { .. })));
        events
    }
}
