//! Half-band FIR interpolator-by-2.
//!
//! A half-band low-pass has the property that every other impulse-response
//! tap (other than the center) is exactly zero — the ideal brick-wall
//! response at `pi/2` is `sinc(n/2)`, which vanishes at every even `n != 0`.
//! That halves the multiply count of a naive symmetric FIR and is exactly
//! why these sit in every polyphase interpolator stage of the gateware
//! (`HBF0`, `HBF1`): one path of the 2x gearbox is a pure delay (the even
//! taps contribute nothing), the other is a FIR over only the odd,
//! symmetric taps.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::rounding::round_half_down;
use crate::sample::Complex;

/// `HBF0`'s 18-bit odd-tap impulse response, nearest-to-center first,
/// verbatim from the gateware's coefficient ROM. The center tap itself is
/// hard-wired to `131072 = 2^17` and is not stored here (see
/// [`HBF_SCALE_BITS`]).
pub const HBF0_ODD_TAPS: [i64; 15] = [
    83046, -26644, 14803, -9411, 6252, -4184, 2765, -1780, 1103, -650, 360, -183, 83, -32, 9,
];

/// `HBF1`'s 18-bit odd-tap impulse response, same convention as
/// [`HBF0_ODD_TAPS`].
pub const HBF1_ODD_TAPS: [i64; 7] = [81772, -23146, 9925, -4175, 1512, -418, 69];

/// Fixed-point scale shared by [`HBF0_ODD_TAPS`] and [`HBF1_ODD_TAPS`]; the
/// hard-wired center tap is exactly `2^HBF_SCALE_BITS`.
pub const HBF_SCALE_BITS: u32 = 17;

/// A half-band interpolate-by-2 filter, shared MAC chain over the I and Q
/// lanes of a [`Complex`] sample.
///
/// Call [`Self::step`] once per output tick at the *output* rate: pass
/// `Some(sample)` on the tick a new input sample is available (every other
/// tick) and `None` otherwise. Every call returns one output sample.
#[derive(Clone, Debug)]
pub struct HalfBandFir {
    /// Coefficients for one half of the symmetric odd taps, nearest-to-center
    /// first, scaled by `2^scale_bits`.
    odd_taps: Vec<i64>,
    scale_bits: u32,
    /// History of accepted input samples, most recent first.
    history: Vec<Complex>,
    /// `true` on the tick that should emit the pass-through (delayed input)
    /// sample; `false` on the tick that emits the computed FIR sum.
    passthrough_phase: bool,
}

impl HalfBandFir {
    /// Build directly from scaled odd-tap coefficients (nearest-to-center
    /// first) and the matching fixed-point scale.
    pub fn new(odd_taps: Vec<i64>, scale_bits: u32) -> Self {
        let history_len = 2 * odd_taps.len();
        Self {
            odd_taps,
            scale_bits,
            history: vec![Complex::ZERO; history_len.max(2)],
            passthrough_phase: true,
        }
    }

    /// Design a half-band filter with `half_taps` odd coefficients (plus the
    /// implicit unity center tap) using a windowed-sinc prototype: ideal
    /// half-band impulse response at odd offset `2k-1` is
    /// `sin(pi*(2k-1)/2) / (pi*(2k-1)/2)`, tapered with a Hamming window and
    /// quantized to `scale_bits` fractional bits.
    ///
    /// Only useful for synthetic/benchmark filters exercising the generic
    /// MAC path — the real `HBF0`/`HBF1` stages must use
    /// [`Self::hbf0`]/[`Self::hbf1`], whose coefficients are the gateware's
    /// actual ROM contents rather than an approximation of them.
    pub fn design(half_taps: usize, scale_bits: u32) -> Self {
        let n = 2 * half_taps; // odd offsets are 1, 3, .., 2*half_taps-1
        let scale = (1i64 << scale_bits) as f64;
        let mut taps = Vec::with_capacity(half_taps);
        for k in 1..=half_taps {
            let offset = (2 * k - 1) as f64;
            let x = core::f64::consts::FRAC_PI_2 * offset;
            let sinc = libm::sin(x) / x;
            // Hamming window evaluated at this tap's position within the
            // full (odd+center) symmetric span.
            let w = 0.54 + 0.46 * libm::cos(core::f64::consts::PI * offset / n as f64);
            taps.push((sinc * w * scale).round() as i64);
        }
        Self::new(taps, scale_bits)
    }

    /// The gateware's actual `HBF0` stage: 15 odd taps, ≥89.5 dB stopband.
    pub fn hbf0() -> Self {
        Self::new(HBF0_ODD_TAPS.to_vec(), HBF_SCALE_BITS)
    }

    /// The gateware's actual `HBF1` stage: 7 odd taps, ≥89.5 dB stopband.
    pub fn hbf1() -> Self {
        Self::new(HBF1_ODD_TAPS.to_vec(), HBF_SCALE_BITS)
    }

    /// Number of input samples of history retained (the group delay the
    /// pass-through path must match, in input-sample units).
    pub fn center_index(&self) -> usize {
        self.odd_taps.len()
    }

    /// Advance one output tick. `input` is `Some` exactly on ticks a new
    /// input sample arrives (every other tick, i.e. half the output rate).
    pub fn step(&mut self, input: Option<Complex>) -> Complex {
        if let Some(sample) = input {
            self.history.insert(0, sample);
            self.history.truncate(2 * self.odd_taps.len().max(1));
        }

        let out = if self.passthrough_phase {
            let idx = self.center_index().min(self.history.len().saturating_sub(1));
            self.history[idx]
        } else {
            let mut acc_i = 0i64;
            let mut acc_q = 0i64;
            for (j, &coeff) in self.odd_taps.iter().enumerate() {
                let lo = self.center_index().saturating_sub(j + 1);
                let hi = (self.center_index() + j).min(self.history.len() - 1);
                if lo < self.history.len() {
                    acc_i += coeff * self.history[lo].i;
                    acc_q += coeff * self.history[lo].q;
                }
                if hi != lo && hi < self.history.len() {
                    acc_i += coeff * self.history[hi].i;
                    acc_q += coeff * self.history[hi].q;
                }
            }
            Complex::new(
                round_half_down(acc_i, self.scale_bits),
                round_half_down(acc_q, self.scale_bits),
            )
        };
        self.passthrough_phase = !self.passthrough_phase;
        out
    }

    pub fn reset(&mut self) {
        for s in &mut self.history {
            *s = Complex::ZERO;
        }
        self.passthrough_phase = true;
    }
}
