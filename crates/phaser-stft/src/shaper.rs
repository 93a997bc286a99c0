//! The shared "shaper" window branch.
//!
//! Runs the same IFFT-memory → interpolator pipeline as a regular
//! [`crate::Branch`], but over a single real-valued window instead of a
//! complex spectrum, and without a DUC stage — the shaper never gets
//! frequency-shifted, it only amplitude-modulates the summed branch output.

use phaser_dsp::interpolator::{InterpolationMode, SuperInterpolator};
use phaser_dsp::rounding::round_half_down;
use phaser_dsp::Complex;

use crate::branch::BranchState;

/// The shared real-valued window branch.
pub struct Shaper {
    window: Vec<i64>,
    interpolator: SuperInterpolator,
    state: BranchState,
    cont_pos: usize,
    output_bits: u32,
}

impl Shaper {
    pub fn new(window_len: usize, mode: InterpolationMode, max_cic_rate: u32, output_bits: u32) -> Self {
        Self {
            window: vec![0; window_len],
            interpolator: SuperInterpolator::with_defaults(mode, max_cic_rate),
            state: BranchState::Idle,
            cont_pos: 0,
            output_bits,
        }
    }

    pub fn state(&self) -> BranchState {
        self.state
    }

    /// Load the window's samples (real-valued, carried in `Complex::i`; `q`
    /// is unused but keeps the same frame-loader path the complex branches
    /// use).
    pub fn load_window(&mut self, window: Vec<i64>) {
        self.window = window;
    }

    /// Advance one tick. Driven by the same `continuous`/`trigger`/
    /// `nr_repeats` signals as the complex branches — the shaper free-runs
    /// or emits in lockstep with them.
    pub fn step(&mut self, continuous: bool, trigger: bool, nr_repeats: u32) -> (i64, bool) {
        if self.window.is_empty() {
            return (0, false);
        }

        let mut pulse_done = false;
        let read_pos = match self.state {
            BranchState::Idle if continuous => Some(self.cont_pos),
            BranchState::Idle => {
                if trigger {
                    self.state = BranchState::Emit {
                        repeats_left: nr_repeats.max(1),
                        pos: 0,
                    };
                }
                None
            }
            BranchState::Emit { pos, .. } => Some(pos),
        };

        let sample = read_pos.map(|pos| self.window[pos % self.window.len()]).unwrap_or(0);

        let input_due = self.interpolator.input_due();
        let interpolated = self.interpolator.step(if input_due {
            Some(Complex::new(sample, 0))
        } else {
            None
        });

        if input_due {
            match &mut self.state {
                BranchState::Idle if continuous => {
                    self.cont_pos = (self.cont_pos + 1) % self.window.len();
                }
                BranchState::Idle => {}
                BranchState::Emit { repeats_left, pos } => {
                    *pos += 1;
                    if *pos >= self.window.len() {
                        *pos = 0;
                        *repeats_left -= 1;
                        if *repeats_left == 0 {
                            self.state = BranchState::Idle;
                            pulse_done = true;
                        }
                    }
                }
            }
        }

        (interpolated.i, pulse_done)
    }

    /// Multiply a complex branch sum by this tick's real window sample,
    /// rounding the product down to [`Self::output_bits`] fractional bits
    /// (real × complex).
    pub fn apply(&self, window_sample: i64, sum: Complex) -> Complex {
        let shift = self.output_bits;
        Complex::new(
            round_half_down(window_sample * sum.i, shift),
            round_half_down(window_sample * sum.q, shift),
        )
    }

    pub fn reset(&mut self) {
        self.interpolator.reset();
        self.state = BranchState::Idle;
        self.cont_pos = 0;
    }
}
