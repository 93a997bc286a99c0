//! The sample-rate-conversion chain: `HBF0` -> `HBF1` -> [`SuperCic`].
//!
//! Each stage doubles (the half-band filters) or multiplies by a runtime
//! rate (the CIC) the sample rate of the one before it. [`SuperInterpolator`]
//! wires the three into a single chain driven at the *output* (highest) rate:
//! call [`SuperInterpolator::step`] once per output tick, supplying a new
//! input sample only on the ticks the configured [`InterpolationMode`] says
//! one is due — mirroring how a single clock domain drives every stage of
//! the gateware's polyphase interpolator, each at its own sub-multiple rate.

use crate::cic::SuperCic;
use crate::hbf::HalfBandFir;
use crate::sample::Complex;

/// Which stages of the chain are active, and the CIC's runtime rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpolationMode {
    /// No conversion: one input sample per output tick.
    Bypass,
    /// `HBF0` only: output rate is 2x input.
    Hbf0,
    /// `HBF0` then `HBF1`: output rate is 4x input.
    Hbf0Hbf1,
    /// `HBF0`, `HBF1`, then [`SuperCic`] at the given rate: output rate is
    /// `4 * rate` x input.
    Hbf0Hbf1Cic(u32),
}

impl InterpolationMode {
    fn stages(self) -> (bool, bool, u32) {
        match self {
            InterpolationMode::Bypass => (false, false, 1),
            InterpolationMode::Hbf0 => (true, false, 1),
            InterpolationMode::Hbf0Hbf1 => (true, true, 1),
            InterpolationMode::Hbf0Hbf1Cic(r) => (true, true, r.max(1)),
        }
    }

    /// Overall rate multiplier, `input_rate -> output_rate`.
    pub fn rate(self) -> u32 {
        let (h0, h1, r) = self.stages();
        (if h0 { 2 } else { 1 }) * (if h1 { 2 } else { 1 }) * r
    }
}

/// The assembled HBF0 -> HBF1 -> CIC interpolation chain.
pub struct SuperInterpolator {
    mode: InterpolationMode,
    hbf0: HalfBandFir,
    hbf1: HalfBandFir,
    cic: SuperCic,
    tick: u64,
}

impl SuperInterpolator {
    pub fn new(mode: InterpolationMode, hbf0: HalfBandFir, hbf1: HalfBandFir, cic: SuperCic) -> Self {
        Self {
            mode,
            hbf0,
            hbf1,
            cic,
            tick: 0,
        }
    }

    /// The gateware's actual chain: `HBF0`/`HBF1` loaded with their real
    /// 18-bit coefficient ROMs ([`HalfBandFir::hbf0`]/[`HalfBandFir::hbf1`])
    /// and an order-3 CIC reaching up to `max_cic_rate`.
    pub fn with_defaults(mode: InterpolationMode, max_cic_rate: u32) -> Self {
        Self::new(
            mode,
            HalfBandFir::hbf0(),
            HalfBandFir::hbf1(),
            SuperCic::new(3, max_cic_rate, 18),
        )
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    /// Reconfigure the active mode (e.g. between STFT pulses). Does not
    /// reset any stage's internal state — call [`Self::reset`] too if a
    /// clean restart is required.
    pub fn set_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
        self.tick = 0;
    }

    /// The overall input:output rate ratio of the currently configured mode.
    pub fn rate(&self) -> u32 {
        self.mode.rate()
    }

    /// Is a new input sample due on the *next* call to [`Self::step`]?
    /// Callers feed the chain at its slowest (input) rate by checking this
    /// before deciding whether `Some` or `None` is passed in.
    pub fn input_due(&self) -> bool {
        self.tick % self.mode.rate() as u64 == 0
    }

    /// Advance one output tick.
    pub fn step(&mut self, input: Option<Complex>) -> Complex {
        let (use_hbf0, use_hbf1, cic_rate) = self.mode.stages();
        let t = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let hbf1_period = cic_rate as u64;
        let hbf0_period = hbf1_period * if use_hbf1 { 2 } else { 1 };

        let hbf0_sample = if use_hbf0 && t % hbf0_period == 0 {
            Some(self.hbf0.step(input))
        } else {
            None
        };

        let hbf1_input = if use_hbf0 { hbf0_sample } else { input };

        let hbf1_sample = if use_hbf1 && t % hbf1_period == 0 {
            Some(self.hbf1.step(hbf1_input))
        } else {
            None
        };

        let cic_input = if use_hbf1 { hbf1_sample } else { hbf1_input };

        self.cic.step(cic_rate, cic_input)
    }

    pub fn reset(&mut self) {
        self.hbf0.reset();
        self.hbf1.reset();
        self.cic.reset();
        self.tick = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_mode_rate_is_one() {
        let interp = SuperInterpolator::with_defaults(InterpolationMode::Bypass, 16);
        assert_eq!(interp.rate(), 1);
    }

    #[test]
    fn hbf0_hbf1_cic_rate_multiplies_correctly() {
        let interp = SuperInterpolator::with_defaults(InterpolationMode::Hbf0Hbf1Cic(5), 16);
        assert_eq!(interp.rate(), 20);
    }

    #[test]
    fn dc_tracks_through_full_chain() {
        let mut interp = SuperInterpolator::with_defaults(InterpolationMode::Hbf0Hbf1Cic(4), 16);
        let dc = Complex::new(2000, -500);
        let rate = interp.rate() as u64;
        let mut last = Complex::ZERO;
        for tick in 0..(rate * 300) {
            let input = if tick % rate == 0 { Some(dc) } else { None };
            last = interp.step(input);
        }
        let tol_i = (dc.i.abs() / 100).max(4);
        let tol_q = (dc.q.abs() / 100).max(4);
        assert!((last.i - dc.i).abs() <= tol_i, "i: got {} want {}", last.i, dc.i);
        assert!((last.q - dc.q).abs() <= tol_q, "q: got {} want {}", last.q, dc.q);
    }

    #[test]
    fn produces_exactly_rate_outputs_per_input() {
        let mut interp = SuperInterpolator::with_defaults(InterpolationMode::Hbf0Hbf1, 1);
        let rate = interp.rate();
        assert_eq!(rate, 4);
        let mut count = 0;
        for tick in 0..(rate as u64 * 10) {
            let input = if tick % rate as u64 == 0 {
                Some(Complex::new(1, 1))
            } else {
                None
            };
            interp.step(input);
            count += 1;
        }
        assert_eq!(count, rate as u64 * 10);
    }
}
