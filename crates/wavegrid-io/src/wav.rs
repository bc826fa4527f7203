//! WAV reading for impulse responses and writing for rendered output.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Channel count, rate and bit depth of a WAV file.
///
/// A depth of 32 is IEEE float; other depths are integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self::mono_float(48000)
    }
}

impl WavSpec {
    /// Mono 32-bit float at `sample_rate`.
    pub fn mono_float(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
        }
    }

    fn is_float(self) -> bool {
        self.bits_per_sample == 32
    }

    /// Magnitude of the most negative integer sample.
    fn full_scale(self) -> f32 {
        (1i64 << self.bits_per_sample.saturating_sub(1)) as f32
    }

    fn to_hound(self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: if self.is_float() {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file as mono `f32` samples along with its spec.
///
/// Integer PCM is scaled to `[-1, 1)`. Multi-channel frames are averaged,
/// which is how the convolver consumes impulse responses.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let raw = reader.spec();
    let spec = WavSpec {
        channels: raw.channels,
        sample_rate: raw.sample_rate,
        bits_per_sample: raw.bits_per_sample,
    };

    let interleaved = match raw.sample_format {
        SampleFormat::Float => decode(reader.into_samples::<f32>(), |v| v)?,
        SampleFormat::Int => {
            let scale = spec.full_scale().recip();
            decode(reader.into_samples::<i32>(), |v| v as f32 * scale)?
        }
    };
    let mono = mix_to_mono(interleaved, usize::from(spec.channels.max(1)));

    tracing::debug!(
        frames = mono.len(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        "read wav"
    );
    Ok((mono, spec))
}

/// Write interleaved samples to a WAV file.
///
/// Integer formats are rounded and clamped to the representable range.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mut writer = WavWriter::create(path, spec.to_hound())?;

    if spec.is_float() {
        samples.iter().try_for_each(|&s| writer.write_sample(s))?;
    } else {
        let full_scale = spec.full_scale();
        samples
            .iter()
            .try_for_each(|&s| writer.write_sample(quantize(s, full_scale)))?;
    }

    writer.finalize()?;
    Ok(())
}

fn decode<S>(
    samples: impl Iterator<Item = hound::Result<S>>,
    convert: impl Fn(S) -> f32,
) -> Result<Vec<f32>> {
    samples
        .map(|s| s.map(&convert).map_err(Error::from))
        .collect()
}

/// Average each frame; a trailing partial frame is dropped.
fn mix_to_mono(interleaved: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved;
    }
    let gain = (channels as f32).recip();
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * gain)
        .collect()
}

fn quantize(sample: f32, full_scale: f32) -> i32 {
    (sample * full_scale)
        .round()
        .clamp(-full_scale, full_scale - 1.0) as i32
}
