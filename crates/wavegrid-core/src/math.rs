//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`midi_to_freq`] - Equal-tempered note number to Hz (A4 = 440 Hz)
//! - [`lerp`] - Linear interpolation
//! - [`finite_or_zero`] - NaN/∞ substitution for the output stage

use libm::pow;

/// Convert a MIDI note number to frequency in Hz.
///
/// `440 · 2^((note - 69) / 12)`, so note 69 is exactly 440 Hz.
///
/// # Example
/// ```rust
/// use wavegrid_core::midi_to_freq;
///
/// assert_eq!(midi_to_freq(69), 440.0);
/// assert!((midi_to_freq(81) - 880.0).abs() < 1e-9);
/// ```
#[inline]
pub fn midi_to_freq(note: u8) -> f64 {
    440.0 * pow(2.0, (f64::from(note) - 69.0) / 12.0)
}

/// Linear interpolation between `a` and `b` by `t`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Replace NaN and infinities with silence.
///
/// Used right before a sample is written to an output buffer.
#[inline]
pub fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_exactly_440() {
        assert_eq!(midi_to_freq(69), 440.0);
    }

    #[test]
    fn octaves_double() {
        assert!((midi_to_freq(57) - 220.0).abs() < 1e-9);
        assert!((midi_to_freq(93) - 1760.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }

    #[test]
    fn finite_or_zero_substitutes() {
        assert_eq!(finite_or_zero(f32::NAN), 0.0);
        assert_eq!(finite_or_zero(f32::INFINITY), 0.0);
        assert_eq!(finite_or_zero(-0.25), -0.25);
    }
}
