//! ADSR envelope generator.
//!
//! A per-voice amplitude state machine with click-free transitions. Attack is
//! a linear ramp from wherever the envelope currently is; decay and release
//! are exponential approaches. Every committed step is slew-limited to
//! [`SLEW_LIMIT`], so neither stage changes nor parameter jumps can produce an
//! audible click.

use libm::exp;

/// Threshold below which a stage is considered to have reached its target.
pub const THRESHOLD: f64 = 1e-5;

/// Largest change in output allowed between consecutive samples.
pub const SLEW_LIMIT: f64 = 0.004;

/// Longest attack/decay/release segment, in seconds, at a control value of 1.0.
pub const MAX_SEGMENT_SECONDS: f64 = 2.0;

/// ADSR envelope stages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Linear ramp from the trigger level toward 1.0.
    Attack,
    /// Exponential fall from 1.0 toward the sustain level.
    Decay,
    /// Holds the sustain level while the note is held.
    Sustain,
    /// Exponential fall toward zero after note-off.
    Release,
    /// Envelope is inactive; output is zero.
    #[default]
    Silent,
}

/// Attack-decay-sustain-release envelope.
///
/// Control values for attack, decay and release are in `[0, 1]` and are
/// cubed before being scaled to [`MAX_SEGMENT_SECONDS`], which gives most of
/// the control range to short times. Sustain is used directly as a level.
///
/// # Example
///
/// ```rust
/// use wavegrid_synth::{Adsr, EnvelopeStage};
///
/// let mut env = Adsr::new(48000.0);
/// env.set_params(0.1, 0.4, 0.6, 0.3);
///
/// env.attack();
/// let mut last = 0.0;
/// for _ in 0..2000 {
///     let level = env.process();
///     assert!((level - last).abs() <= 0.004 + 1e-12);
///     last = level;
/// }
///
/// env.release();
/// assert_eq!(env.stage(), EnvelopeStage::Release);
/// ```
#[derive(Debug, Clone)]
pub struct Adsr {
    stage: EnvelopeStage,
    /// Samples spent in the current stage.
    stage_phase: u64,
    /// Last committed output.
    last_value: f64,
    /// Unslewed value computed by the current stage on the last sample.
    stage_value: f64,
    /// Level the attack ramp started from.
    attack_amp: f64,
    /// Level the release started from.
    release_amp: f64,

    segment_length: f64,
    attack_samples: f64,
    decay_samples: f64,
    sustain: f64,
    release_samples: f64,

    alpha_decay: f64,
    alpha_release: f64,
}

impl Default for Adsr {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Adsr {
    /// Create a silent envelope.
    ///
    /// Default control values: attack 0.1, decay 0.5, sustain 0.3, release 0.4.
    pub fn new(sample_rate: f64) -> Self {
        let mut env = Self {
            stage: EnvelopeStage::Silent,
            stage_phase: 0,
            last_value: 0.0,
            stage_value: 0.0,
            attack_amp: 0.0,
            release_amp: 0.0,
            segment_length: MAX_SEGMENT_SECONDS * sample_rate,
            attack_samples: 0.0,
            decay_samples: 0.0,
            sustain: 0.0,
            release_samples: 0.0,
            alpha_decay: 0.0,
            alpha_release: 0.0,
        };
        env.set_params(0.1, 0.5, 0.3, 0.4);
        env
    }

    /// Set attack, decay, sustain and release from control values in `[0, 1]`.
    ///
    /// Recomputes the decay and release coefficients. Cheap enough to call
    /// once per block.
    pub fn set_params(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) {
        self.attack_samples = cube(attack) * self.segment_length;
        self.decay_samples = cube(decay) * self.segment_length;
        self.sustain = clamp_unit(sustain);
        self.release_samples = cube(release) * self.segment_length;
        self.alpha_decay = alpha(self.decay_samples);
        self.alpha_release = alpha(self.release_samples);
    }

    /// Start (or restart) the attack from the current level.
    pub fn attack(&mut self) {
        self.stage_phase = 0;
        self.stage = EnvelopeStage::Attack;
        self.attack_amp = self.last_value;
    }

    /// Start the release from the current level.
    ///
    /// No-op while already releasing or silent.
    pub fn release(&mut self) {
        if matches!(self.stage, EnvelopeStage::Release | EnvelopeStage::Silent) {
            return;
        }
        self.release_amp = self.last_value;
        self.stage = EnvelopeStage::Release;
        self.stage_phase = 0;
    }

    /// Force the envelope to silence immediately.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Silent;
        self.stage_phase = 0;
        self.last_value = 0.0;
        self.stage_value = 0.0;
    }

    /// Current stage.
    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Last committed output.
    pub fn value(&self) -> f64 {
        self.last_value
    }

    /// Value the stage computed on the last sample, before slew limiting.
    pub fn stage_value(&self) -> f64 {
        self.stage_value
    }

    /// Level captured by the last [`release`](Self::release).
    pub fn release_amp(&self) -> f64 {
        self.release_amp
    }

    /// Sustain level.
    pub fn sustain(&self) -> f64 {
        self.sustain
    }

    /// True unless silent.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Silent
    }

    /// Compute the next envelope sample.
    #[inline]
    pub fn process(&mut self) -> f64 {
        let value = match self.stage {
            EnvelopeStage::Attack => {
                if self.last_value < 1.0 - THRESHOLD {
                    let value = self.attack_amp
                        + (self.stage_phase as f64 / self.attack_samples.max(1.0))
                            * (1.0 - self.attack_amp);
                    self.stage_phase += 1;
                    value.min(1.0)
                } else {
                    self.stage = EnvelopeStage::Decay;
                    self.stage_phase = 0;
                    1.0
                }
            }
            EnvelopeStage::Decay => {
                let diff = self.last_value - self.sustain;
                if diff > THRESHOLD {
                    self.stage_phase += 1;
                    diff * self.alpha_decay + self.sustain
                } else {
                    self.stage = EnvelopeStage::Sustain;
                    self.stage_phase = 0;
                    self.sustain
                }
            }
            EnvelopeStage::Sustain => self.sustain,
            EnvelopeStage::Release => {
                if self.last_value > THRESHOLD {
                    self.stage_phase += 1;
                    self.last_value * self.alpha_release
                } else {
                    self.stage = EnvelopeStage::Silent;
                    self.stage_phase = 0;
                    0.0
                }
            }
            EnvelopeStage::Silent => 0.0,
        };
        self.stage_value = value;

        let step = (value - self.last_value).clamp(-SLEW_LIMIT, SLEW_LIMIT);
        let committed = clamp_unit(self.last_value + step);
        self.last_value = committed;
        committed
    }
}

#[inline]
fn cube(x: f64) -> f64 {
    let x = clamp_unit(x);
    x * x * x
}

#[inline]
fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Per-sample coefficient `exp(-1 / samples)`; zero-length segments are instant.
#[inline]
fn alpha(samples: f64) -> f64 {
    if samples > 0.0 { exp(-1.0 / samples) } else { 0.0 }
}
