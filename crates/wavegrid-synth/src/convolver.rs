//! Uniform-partitioned FFT convolution for reverb impulse responses.
//!
//! The impulse response is split into partitions of `block` samples, each
//! zero-padded to `2 * block` and transformed once at construction. At run
//! time every full input block is transformed (overlap-save with the previous
//! block), pushed into a frequency-domain delay line, multiplied against the
//! partition spectra and summed, then transformed back. All buffers are
//! allocated up front; [`Convolver::process`] does not allocate.
//!
//! Latency is one block: output for an input block becomes available while
//! the next block is being collected.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Streaming convolver with a fixed impulse response.
pub struct Convolver {
    block: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    /// Spectra of the impulse response partitions.
    partitions: Vec<Vec<Complex<f32>>>,
    /// Spectra of past input windows, newest at `delay_pos`.
    delay_line: Vec<Vec<Complex<f32>>>,
    delay_pos: usize,
    /// Last two input blocks, time domain.
    window: Vec<f32>,
    /// Input collected for the block in progress.
    pending: Vec<f32>,
    /// Output of the last completed block.
    ready: Vec<f32>,
    pos: usize,
    work: Vec<Complex<f32>>,
    accum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl core::fmt::Debug for Convolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Convolver")
            .field("block", &self.block)
            .field("partitions", &self.partitions.len())
            .finish_non_exhaustive()
    }
}

impl Convolver {
    /// Build a convolver for `impulse_response` with the given block size.
    ///
    /// A block size of 0 is treated as 1. An empty impulse response yields a
    /// convolver that outputs silence.
    pub fn new(impulse_response: &[f32], block_size: usize) -> Self {
        let block = block_size.max(1);
        let fft_size = 2 * block;

        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(0.0, 0.0); scratch_len];

        let count = impulse_response.len().div_ceil(block).max(1);
        let partitions = (0..count)
            .map(|p| {
                let mut spectrum = vec![Complex::new(0.0, 0.0); fft_size];
                let start = (p * block).min(impulse_response.len());
                let end = ((p + 1) * block).min(impulse_response.len());
                for (bin, &h) in spectrum.iter_mut().zip(&impulse_response[start..end]) {
                    bin.re = h;
                }
                forward.process_with_scratch(&mut spectrum, &mut scratch);
                spectrum
            })
            .collect();

        Self {
            block,
            forward,
            inverse,
            partitions,
            delay_line: vec![vec![Complex::new(0.0, 0.0); fft_size]; count],
            delay_pos: 0,
            window: vec![0.0; fft_size],
            pending: vec![0.0; block],
            ready: vec![0.0; block],
            pos: 0,
            work: vec![Complex::new(0.0, 0.0); fft_size],
            accum: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
        }
    }

    /// Like [`new`](Self::new), with the impulse response scaled to unit energy.
    pub fn normalized(impulse_response: &[f32], block_size: usize) -> Self {
        let energy: f32 = impulse_response.iter().map(|h| h * h).sum();
        if energy > 0.0 {
            let scale = 1.0 / energy.sqrt();
            let scaled: Vec<f32> = impulse_response.iter().map(|h| h * scale).collect();
            Self::new(&scaled, block_size)
        } else {
            Self::new(impulse_response, block_size)
        }
    }

    /// Partition length and latency in samples.
    pub fn block_size(&self) -> usize {
        self.block
    }

    /// Number of impulse response partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Convolve one sample.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let out = self.ready[self.pos];
        self.pending[self.pos] = input;
        self.pos += 1;
        if self.pos == self.block {
            self.pos = 0;
            self.run_block();
        }
        out
    }

    /// Convolve `input` into `output`. Slices must have equal length.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        for (x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.process_sample(*x);
        }
    }

    /// Clear all signal history, keeping the impulse response.
    pub fn reset(&mut self) {
        for spectrum in &mut self.delay_line {
            spectrum.fill(Complex::new(0.0, 0.0));
        }
        self.window.fill(0.0);
        self.pending.fill(0.0);
        self.ready.fill(0.0);
        self.pos = 0;
        self.delay_pos = 0;
    }

    fn run_block(&mut self) {
        let block = self.block;
        let count = self.partitions.len();

        self.window.copy_within(block.., 0);
        self.window[block..].copy_from_slice(&self.pending);

        for (bin, &x) in self.work.iter_mut().zip(&self.window) {
            *bin = Complex::new(x, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.work, &mut self.scratch);

        self.delay_pos = (self.delay_pos + count - 1) % count;
        self.delay_line[self.delay_pos].copy_from_slice(&self.work);

        self.accum.fill(Complex::new(0.0, 0.0));
        for (p, partition) in self.partitions.iter().enumerate() {
            let input = &self.delay_line[(self.delay_pos + p) % count];
            for ((acc, x), h) in self.accum.iter_mut().zip(input).zip(partition) {
                *acc += x * h;
            }
        }
        self.inverse
            .process_with_scratch(&mut self.accum, &mut self.scratch);

        let norm = 1.0 / (2 * block) as f32;
        for (y, bin) in self.ready.iter_mut().zip(&self.accum[block..]) {
            *y = bin.re * norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(input: &[f32], ir: &[f32]) -> Vec<f32> {
        (0..input.len())
            .map(|n| {
                ir.iter()
                    .enumerate()
                    .filter(|&(k, _)| k <= n)
                    .map(|(k, h)| h * input[n - k])
                    .sum()
            })
            .collect()
    }

    fn test_signal(len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| ((n * 7919) % 97) as f32 / 48.5 - 1.0)
            .collect()
    }

    #[test]
    fn unit_impulse_delays_by_one_block() {
        let mut conv = Convolver::new(&[1.0], 32);
        let input = test_signal(256);
        let mut output = vec![0.0; 256];
        conv.process(&input, &mut output);

        assert!(output[..32].iter().all(|&s| s == 0.0));
        for n in 32..256 {
            assert!((output[n] - input[n - 32]).abs() < 1e-5, "sample {n}");
        }
    }

    #[test]
    fn matches_direct_convolution_across_partitions() {
        let block = 16;
        let ir: Vec<f32> = (0..70).map(|k| 0.9f32.powi(k) * if k % 2 == 0 { 1.0 } else { -0.5 }).collect();
        let input = test_signal(400);

        let mut conv = Convolver::new(&ir, block);
        assert_eq!(conv.partition_count(), 5);
        let mut output = vec![0.0; input.len()];
        conv.process(&input, &mut output);

        let expected = direct(&input, &ir);
        for n in block..input.len() {
            assert!(
                (output[n] - expected[n - block]).abs() < 1e-3,
                "sample {n}: {} vs {}",
                output[n],
                expected[n - block]
            );
        }
    }

    #[test]
    fn empty_response_is_silent() {
        let mut conv = Convolver::new(&[], 8);
        let mut output = vec![1.0; 64];
        conv.process(&test_signal(64), &mut output);
        assert!(output.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn normalized_has_unit_energy() {
        let mut conv = Convolver::normalized(&[3.0, 4.0], 4);
        let mut impulse = vec![0.0; 16];
        impulse[0] = 1.0;
        let mut output = vec![0.0; 16];
        conv.process(&impulse, &mut output);
        assert!((output[4] - 0.6).abs() < 1e-5);
        assert!((output[5] - 0.8).abs() < 1e-5);
    }

    #[test]
    fn reset_clears_tail() {
        let mut conv = Convolver::new(&[0.5; 40], 8);
        let mut output = vec![0.0; 64];
        conv.process(&test_signal(64), &mut output);
        conv.reset();
        conv.process(&[0.0; 64], &mut output);
        assert!(output.iter().all(|s| s.abs() < 1e-6));
    }
}
