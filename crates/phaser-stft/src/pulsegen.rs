//! The top-level STFT pulse generator: `K` [`Branch`]es, a shared
//! [`Shaper`], and the continuous/triggered/windowed mode register surface
//! (`pulse_settings`, `pulse_trigger`, `pulsegen_busy`).

use phaser_dsp::interpolator::InterpolationMode;
use phaser_dsp::Complex;

use crate::branch::Branch;
use crate::shaper::Shaper;

/// Which of the three `pulse_settings` modes is selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Continuous,
    Triggered,
    /// Windowed carries its own `continuous`/`triggered` choice for the
    /// underlying address sequencing — only whether the shaper multiplies
    /// in varies.
    Windowed { triggered: bool },
}

impl Mode {
    fn continuous(self) -> bool {
        !matches!(
            self,
            Mode::Triggered | Mode::Windowed { triggered: true }
        )
    }

    fn windowed(self) -> bool {
        matches!(self, Mode::Windowed { .. })
    }
}

/// Owns every branch, the shared shaper, and the pulse-trigger handshake.
pub struct PulseGenerator {
    branches: Vec<Branch>,
    shaper: Shaper,
    mode: Mode,
    nr_repeats: u32,
    ftw: Vec<u32>,
    phase_offset: Vec<u32>,
    /// Mirrors the `pulse_trigger` register: set by the host, auto-cleared
    /// once every branch (and the shaper, if windowed) has completed its
    /// `nr_repeats` passes and returned to idle.
    trigger_pending: bool,
    /// Per-branch "has finished its passes since the current trigger" latch
    /// — branches complete at different ticks (different memory lengths),
    /// so `pulse_done` can't be read off a single tick's `done` flags alone.
    branch_finished: Vec<bool>,
    shaper_finished: bool,
}

impl PulseGenerator {
    pub fn new(
        branches: usize,
        memory_len: usize,
        mode: InterpolationMode,
        max_cic_rate: u32,
        shaper_output_bits: u32,
    ) -> Self {
        Self {
            branches: (0..branches)
                .map(|_| Branch::new(memory_len, mode, max_cic_rate))
                .collect(),
            shaper: Shaper::new(memory_len, mode, max_cic_rate, shaper_output_bits),
            mode: Mode::Continuous,
            nr_repeats: 1,
            ftw: vec![0; branches],
            phase_offset: vec![0; branches],
            trigger_pending: false,
            branch_finished: vec![false; branches],
            shaper_finished: false,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_nr_repeats(&mut self, nr_repeats: u32) {
        self.nr_repeats = nr_repeats.max(1);
    }

    pub fn set_carrier(&mut self, branch: usize, ftw: u32, phase_offset: u32) {
        self.ftw[branch] = ftw;
        self.phase_offset[branch] = phase_offset;
    }

    pub fn branch_mut(&mut self, index: usize) -> &mut Branch {
        &mut self.branches[index]
    }

    pub fn shaper_mut(&mut self) -> &mut Shaper {
        &mut self.shaper
    }

    /// `pulse_trigger` register write: arms a single-shot trigger pulse,
    /// only meaningful while [`Self::busy`] is false.
    pub fn set_trigger(&mut self) {
        if !self.busy() {
            self.trigger_pending = true;
            self.branch_finished.iter_mut().for_each(|f| *f = false);
            self.shaper_finished = false;
        }
    }

    /// `pulsegen_busy`: a trigger is armed or in flight (meaningless in
    /// continuous mode, which never gates).
    pub fn busy(&self) -> bool {
        self.trigger_pending
    }

    /// Advance one output tick. Returns `(sample, pulse_done)` —
    /// `pulse_done` pulses once, the tick every armed branch (and the
    /// shaper, if windowed) has completed its `nr_repeats` passes.
    pub fn step(&mut self) -> (Complex, bool) {
        let continuous = self.mode.continuous();
        let trigger = self.trigger_pending;

        let mut sum = Complex::ZERO;
        for (i, branch) in self.branches.iter_mut().enumerate() {
            let (sample, done) = branch.step(
                continuous,
                trigger,
                self.nr_repeats,
                self.ftw[i],
                self.phase_offset[i],
            );
            sum = sum.add(sample);
            if done {
                self.branch_finished[i] = true;
            }
        }

        let out = if self.mode.windowed() {
            let (window_sample, shaper_done) = self.shaper.step(continuous, trigger, self.nr_repeats);
            if shaper_done {
                self.shaper_finished = true;
            }
            self.shaper.apply(window_sample, sum)
        } else {
            sum
        };

        let ready = self.branch_finished.iter().all(|&f| f)
            && (!self.mode.windowed() || self.shaper_finished);
        let pulse_done = trigger && !continuous && ready;
        if pulse_done {
            self.trigger_pending = false;
        }

        (out, pulse_done)
    }

    pub fn reset(&mut self) {
        for b in &mut self.branches {
            b.reset();
        }
        self.shaper.reset();
        self.trigger_pending = false;
        self.branch_finished.iter_mut().for_each(|f| *f = false);
        self.shaper_finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulsegen() -> PulseGenerator {
        PulseGenerator::new(2, 4, InterpolationMode::Bypass, 1, 0)
    }

    #[test]
    fn continuous_mode_never_reports_busy() {
        let mut pg = pulsegen();
        pg.set_mode(Mode::Continuous);
        pg.branch_mut(0).load_memory(vec![Complex::new(1, 0); 4]);
        pg.branch_mut(1).load_memory(vec![Complex::new(2, 0); 4]);
        for _ in 0..10 {
            let (_, done) = pg.step();
            assert!(!done);
        }
        assert!(!pg.busy());
    }

    #[test]
    fn triggered_mode_sums_branches_and_reports_done() {
        let mut pg = pulsegen();
        pg.set_mode(Mode::Triggered);
        pg.set_nr_repeats(1);
        pg.branch_mut(0).load_memory(vec![Complex::new(1, 0); 4]);
        pg.branch_mut(1).load_memory(vec![Complex::new(2, 0); 4]);
        pg.set_trigger();
        assert!(pg.busy());

        let mut saw_done = false;
        for _ in 0..40 {
            let (_, done) = pg.step();
            if done {
                saw_done = true;
                break;
            }
        }
        assert!(saw_done);
        assert!(!pg.busy());
    }

    #[test]
    fn windowed_mode_multiplies_by_the_shaper() {
        let mut pg = pulsegen();
        pg.set_mode(Mode::Windowed { triggered: false });
        pg.branch_mut(0).load_memory(vec![Complex::new(10, 0); 4]);
        pg.shaper_mut().load_window(vec![0, 0, 0, 0]);
        let (out, _) = pg.step();
        assert_eq!(out, Complex::ZERO);
    }
}
