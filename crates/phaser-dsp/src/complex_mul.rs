//! Complex multiplication via the 3-multiply (Karatsuba) identity.
//!
//! `(a + bi)(c + di) = (ac - bd) + (ad + bc)i` costs four multiplies done
//! naively. The gateware instead computes
//!
//! ```text
//! k1 = c * (a + b)
//! k2 = a * (d - c)
//! k3 = b * (c + d)
//! real = k1 - k3
//! imag = k1 + k2
//! ```
//!
//! trading one multiply for two extra adds — worthwhile when multipliers
//! (DSP slices) are the scarce resource. The product is rounded back down to
//! `bias_bits` fewer fractional bits with [`round_half_down`].

use crate::rounding::round_half_down;
use crate::sample::Complex;

/// Fixed pipeline latency of [`ComplexMultiplier::step`], in clock ticks.
pub const LATENCY: u32 = 5;

/// A pipelined complex multiplier: `out = round_half_down(a * b, bias_bits)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComplexMultiplier {
    bias_bits: u32,
    pipeline: [Complex; LATENCY as usize + 1],
}

impl ComplexMultiplier {
    /// `bias_bits` is the number of fractional bits the product is rounded
    /// away — typically the input mantissa width, so the product lands back
    /// at the same scale as its factors.
    pub fn new(bias_bits: u32) -> Self {
        Self {
            bias_bits,
            pipeline: [Complex::ZERO; LATENCY as usize + 1],
        }
    }

    /// Pipeline latency in clock ticks.
    pub fn latency(&self) -> u32 {
        LATENCY
    }

    /// Combinational product of `a` and `b`, rounded to `bias_bits` fewer
    /// fractional bits.
    pub fn eval(&self, a: Complex, b: Complex) -> Complex {
        let k1 = b.i * (a.i + a.q);
        let k2 = a.i * (b.q - b.i);
        let k3 = a.q * (b.i + b.q);
        let real = k1 - k3;
        let imag = k1 + k2;
        Complex::new(
            round_half_down(real, self.bias_bits),
            round_half_down(imag, self.bias_bits),
        )
    }

    /// Advance the pipeline by one tick.
    pub fn step(&mut self, a: Complex, b: Complex) -> Complex {
        let out = self.eval(a, b);
        for i in 0..LATENCY as usize {
            self.pipeline[i] = self.pipeline[i + 1];
        }
        self.pipeline[LATENCY as usize] = out;
        self.pipeline[0]
    }

    /// Reset the pipeline registers.
    pub fn reset(&mut self) {
        self.pipeline = [Complex::ZERO; LATENCY as usize + 1];
    }
}
