//! In-place radix-2 decimation-in-time block FFT/IFFT.
//!
//! The gateware implementation schedules butterflies across a triple-bank
//! memory (`ram1`/`ram2a`/`ram2b`) so one "logical" FFT pipelines three
//! blocks concurrently. None of that bookkeeping has semantic weight outside
//! hardware scheduling, so this is represented the way the rest of this
//! crate represents large buffers: a contiguous owned block, transformed
//! in-place, with the same bit-reversed load ordering, quarter-circle
//! twiddle ROM, and per-stage scaling bitmask as the source.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::rounding::round_half_down;
use crate::sample::Complex;

fn cmul(a: Complex, b: Complex, bias_bits: u32) -> Complex {
    let real = a.i * b.i - a.q * b.q;
    let imag = a.i * b.q + a.q * b.i;
    Complex::new(round_half_down(real, bias_bits), round_half_down(imag, bias_bits))
}

fn bit_reverse(mut x: usize, bits: u32) -> usize {
    let mut r = 0usize;
    for _ in 0..bits {
        r = (r << 1) | (x & 1);
        x >>= 1;
    }
    r
}

/// A radix-2 DIT FFT/IFFT transformer for a fixed block length `n = 2^log2n`.
pub struct BlockFft {
    log2n: u32,
    n: usize,
    mantissa_bits: u32,
    /// `twiddles[k] = exp(-2*pi*i*k/n)`, `k` in `0..n/2`, scaled by
    /// `2^mantissa_bits`.
    twiddles: Vec<Complex>,
    bitrev: Vec<usize>,
    /// Bit `i` clear (the default, all-zeros) means stage `i` right-shifts
    /// its output by one bit, giving the usual 1/N-scaled transform. Setting
    /// bit `i` skips that stage's shift, letting it grow by one bit instead
    /// — useful to push bit growth to the early stages so rounding error
    /// isn't amplified by later ones.
    scaling_mask: u32,
}

impl BlockFft {
    /// `log2n` is the block size's log2 (e.g. `10` for a 1024-point
    /// transform). `mantissa_bits` is the fractional width of both samples
    /// and twiddle factors. `scaling_mask` is a `log2n`-bit mask: a clear bit
    /// scales that stage's output by half (the all-zeros default gives the
    /// usual 1/N-normalized transform); a set bit skips the shift, letting
    /// that stage's output grow by a bit instead.
    pub fn new(log2n: u32, mantissa_bits: u32, scaling_mask: u32) -> Self {
        let n = 1usize << log2n;
        let scale = (1i64 << mantissa_bits) as f64;
        let twiddles = (0..n / 2)
            .map(|k| {
                let theta = -2.0 * core::f64::consts::PI * (k as f64) / (n as f64);
                Complex::new(
                    (libm::cos(theta) * scale).round() as i64,
                    (libm::sin(theta) * scale).round() as i64,
                )
            })
            .collect();
        let bitrev = (0..n).map(|i| bit_reverse(i, log2n)).collect();
        Self {
            log2n,
            n,
            mantissa_bits,
            twiddles,
            bitrev,
            scaling_mask,
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// `fft_shiftmask` register: reconfigure which butterfly stages scale by
    /// half. Takes effect on the next [`Self::forward`]/[`Self::inverse`].
    pub fn set_scaling_mask(&mut self, mask: u32) {
        self.scaling_mask = mask;
    }

    pub fn scaling_mask(&self) -> u32 {
        self.scaling_mask
    }

    /// Forward transform, in place. `data.len()` must equal [`Self::len`].
    pub fn forward(&self, data: &mut [Complex]) {
        self.transform(data, false);
    }

    /// Inverse transform, in place. Pick a `scaling_mask` of `0` (every
    /// stage's bit clear, the default) to scale every stage and recover a
    /// fully 1/N-normalized inverse, matching the gateware's per-stage
    /// scaling rather than a single post-divide.
    pub fn inverse(&self, data: &mut [Complex]) {
        self.transform(data, true);
    }

    fn transform(&self, data: &mut [Complex], inverse: bool) {
        assert_eq!(data.len(), self.n);

        for i in 0..self.n {
            let j = self.bitrev[i];
            if j > i {
                data.swap(i, j);
            }
        }

        for stage in 0..self.log2n {
            let len = 1usize << (stage + 1);
            let half = len / 2;
            let step = self.n / len;
            let mut start = 0;
            while start < self.n {
                for j in 0..half {
                    let mut tw = self.twiddles[j * step];
                    if inverse {
                        tw.q = -tw.q;
                    }
                    let u = data[start + j];
                    let t = cmul(data[start + j + half], tw, self.mantissa_bits);
                    data[start + j] = u.add(t);
                    data[start + j + half] = u.sub(t);
                }
                start += len;
            }
            if self.scaling_mask & (1 << stage) == 0 {
                for sample in data.iter_mut() {
                    *sample = Complex::new(
                        round_half_down(sample.i, 1),
                        round_half_down(sample.q, 1),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::{num_complex::Complex64, FftPlanner};

    fn to_fixed(samples: &[Complex64], mantissa_bits: u32) -> Vec<Complex> {
        let scale = (1i64 << mantissa_bits) as f64;
        samples
            .iter()
            .map(|c| Complex::new((c.re * scale).round() as i64, (c.im * scale).round() as i64))
            .collect()
    }

    #[test]
    fn forward_matches_reference_fft_on_single_tone() {
        let log2n = 6;
        let n = 1usize << log2n;
        let mantissa_bits = 14;
        let bin = 5;

        let input: Vec<Complex64> = (0..n)
            .map(|k| {
                let theta = 2.0 * core::f64::consts::PI * (bin as f64) * (k as f64) / (n as f64);
                Complex64::new(libm::cos(theta) * 0.4, libm::sin(theta) * 0.4)
            })
            .collect();

        let mut reference = input.clone();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut reference);

        let mut fixed = to_fixed(&input, mantissa_bits);
        // every stage's bit set: skip the per-stage 1/2 scaling so the
        // result matches the reference FFT's unnormalized magnitude.
        let transformer = BlockFft::new(log2n, mantissa_bits, (1 << log2n) - 1);
        transformer.forward(&mut fixed);

        let scale = (1i64 << mantissa_bits) as f64;
        for (k, (got, want)) in fixed.iter().zip(reference.iter()).enumerate() {
            let got_re = got.i as f64 / scale;
            let got_im = got.q as f64 / scale;
            let tol = n as f64 * 0.4 * 1e-2;
            assert!(
                (got_re - want.re).abs() < tol && (got_im - want.im).abs() < tol,
                "bin {k}: got ({got_re}, {got_im}) want ({}, {})",
                want.re,
                want.im
            );
        }
    }

    #[test]
    fn inverse_of_forward_recovers_input_with_full_scaling() {
        let log2n = 5;
        let n = 1usize << log2n;
        let mantissa_bits = 14;
        let scale = (1i64 << mantissa_bits) as f64;

        let input: Vec<Complex> = (0..n)
            .map(|k| {
                let theta = 2.0 * core::f64::consts::PI * 3.0 * (k as f64) / (n as f64);
                Complex::new(
                    (libm::cos(theta) * 0.3 * scale).round() as i64,
                    (libm::sin(theta) * 0.3 * scale).round() as i64,
                )
            })
            .collect();

        // unscaled forward, fully 1/N-normalized inverse: the round trip
        // lands back at unity gain.
        let forward = BlockFft::new(log2n, mantissa_bits, (1 << log2n) - 1);
        let inverse = BlockFft::new(log2n, mantissa_bits, 0);

        let mut buf = input.clone();
        forward.forward(&mut buf);
        inverse.inverse(&mut buf);

        for (got, want) in buf.iter().zip(input.iter()) {
            assert!((got.i - want.i).abs() <= 4, "got {} want {}", got.i, want.i);
            assert!((got.q - want.q).abs() <= 4, "got {} want {}", got.q, want.q);
        }
    }

    #[test]
    fn bit_reverse_is_involution() {
        for i in 0..64 {
            assert_eq!(bit_reverse(bit_reverse(i, 6), 6), i);
        }
    }
}
