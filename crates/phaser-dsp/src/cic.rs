//! Cascaded Integrator-Comb interpolator with a gain-normalization LUT.
//!
//! A CIC interpolator of order `n` and rate `r` has passband gain `r^(n-1)`,
//! which is neither a power of two nor constant as the output rate is
//! retuned at runtime. Rather than a divider, the gateware keeps a small LUT
//! of `(shift, reciprocal)` pairs, one per supported rate: normalize with a
//! coarse power-of-two shift, then fix up the remainder with a quantized
//! multiply — this is the "super" in `SuperCic`, gearboxed so the same
//! hardware instance serves every rate up to `max_rate`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::rounding::round_half_down;
use crate::sample::Complex;

/// One entry of the gain-normalization LUT.
#[derive(Clone, Copy, Debug)]
struct GainEntry {
    /// Power-of-two shift bringing `r^(n-1)` within `(0.5, 1]` of a power of two.
    shift: u32,
    /// Reciprocal-of-remainder multiplier, scaled by `2^width_lut`.
    recip_q: i64,
}

fn gain_entry(r: u32, order: u32, width_lut: u32) -> GainEntry {
    if r <= 1 {
        return GainEntry {
            shift: 0,
            recip_q: 1i64 << width_lut,
        };
    }
    let raw_gain = libm::pow(r as f64, (order - 1) as f64);
    let shift = libm::ceil(libm::log2(raw_gain)) as u32;
    let recip = (1u64 << shift) as f64 / raw_gain;
    let recip_q = libm::round(recip * (1i64 << width_lut) as f64) as i64;
    GainEntry { shift, recip_q }
}

/// A gearboxed CIC interpolator: comb stages run at the (variable) low input
/// rate, integrator stages at the fixed high output rate, connected by a
/// zero-stuff-by-`r` gearbox. `order` is the number of comb/integrator
/// stages (`N`).
#[derive(Clone, Debug)]
pub struct SuperCic {
    order: u32,
    max_rate: u32,
    width_lut: u32,
    gain_lut: Vec<GainEntry>,
    comb_state: Vec<Complex>,
    integrator_state: Vec<Complex>,
    /// Ticks remaining before the next low-rate input is due, at the
    /// currently configured rate.
    stuff_counter: u32,
}

impl SuperCic {
    pub fn new(order: u32, max_rate: u32, width_lut: u32) -> Self {
        let gain_lut = (0..=max_rate)
            .map(|r| gain_entry(r, order, width_lut))
            .collect();
        Self {
            order,
            max_rate,
            width_lut,
            gain_lut,
            comb_state: vec![Complex::ZERO; order as usize],
            integrator_state: vec![Complex::ZERO; order as usize],
            stuff_counter: 0,
        }
    }

    /// Run the comb cascade on one low-rate input sample.
    fn comb(&mut self, x: Complex) -> Complex {
        let mut v = x;
        for stage in self.comb_state.iter_mut() {
            let next = v;
            v = v.sub(*stage);
            *stage = next;
        }
        v
    }

    /// Run the integrator cascade on one high-rate input sample (usually
    /// zero, except on the tick a comb output is stuffed in).
    fn integrate(&mut self, x: Complex) -> Complex {
        let mut v = x;
        for stage in self.integrator_state.iter_mut() {
            *stage = stage.add(v);
            v = *stage;
        }
        v
    }

    /// Advance one high-rate output tick at interpolation factor `rate`
    /// (`1..=max_rate`). `input` must be `Some` exactly on the tick a new
    /// low-rate sample is due (every `rate` ticks) and `None` otherwise.
    pub fn step(&mut self, rate: u32, input: Option<Complex>) -> Complex {
        debug_assert!(rate >= 1 && rate <= self.max_rate);
        let stuffed = match input {
            Some(x) => self.comb(x),
            None => Complex::ZERO,
        };
        let integrated = self.integrate(stuffed);
        let entry = self.gain_lut[rate as usize];
        Complex::new(
            round_half_down(integrated.i * entry.recip_q, self.width_lut + entry.shift),
            round_half_down(integrated.q * entry.recip_q, self.width_lut + entry.shift),
        )
    }

    /// Whether the next tick at `rate` is the one due to accept a new
    /// low-rate input sample — convenience for callers driving the gearbox.
    pub fn input_due(&mut self, rate: u32) -> bool {
        if self.stuff_counter == 0 {
            self.stuff_counter = rate - 1;
            true
        } else {
            self.stuff_counter -= 1;
            false
        }
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn max_rate(&self) -> u32 {
        self.max_rate
    }

    pub fn reset(&mut self) {
        for s in &mut self.comb_state {
            *s = Complex::ZERO;
        }
        for s in &mut self.integrator_state {
            *s = Complex::ZERO;
        }
        self.stuff_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_input_converges_to_unity_gain_output() {
        let mut cic = SuperCic::new(3, 16, 18);
        let rate = 8;
        let dc = Complex::new(1000, -2000);
        let mut last = Complex::ZERO;
        for tick in 0..4000u32 {
            let input = if cic.input_due(rate) { Some(dc) } else { None };
            last = cic.step(rate, input);
        }
        let tol = (dc.i.abs() / 200).max(2);
        assert!((last.i - dc.i).abs() <= tol, "i: got {} want {}", last.i, dc.i);
        assert!((last.q - dc.q).abs() <= tol, "q: got {} want {}", last.q, dc.q);
    }

    #[test]
    fn gain_lut_is_monotone_reasonable_at_rate_one() {
        let cic = SuperCic::new(4, 32, 16);
        let entry = cic.gain_lut[1];
        // rate 1 means no interpolation: gain should normalize to ~unity.
        assert_eq!(entry.shift, 0);
        assert!((entry.recip_q - (1i64 << 16)).abs() <= 1);
    }

    #[test]
    fn reset_clears_all_stage_state() {
        let mut cic = SuperCic::new(3, 8, 16);
        cic.step(4, Some(Complex::new(10, 10)));
        cic.reset();
        assert!(cic.comb_state.iter().all(|s| *s == Complex::ZERO));
        assert!(cic.integrator_state.iter().all(|s| *s == Complex::ZERO));
    }
}
