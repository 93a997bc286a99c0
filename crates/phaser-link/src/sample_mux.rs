//! The SampleMux: a zero-order-hold interpolator from frame bodies to the
//! per-channel baseband sample stream.
//!
//! Each frame body carries `n_mux` consecutive complex samples per channel;
//! the mux emits one sample per channel every `t_frame / n_mux` cycles,
//! asserting `sample_mark` on the cycle it starts a new body — the frame
//! phase reference downstream DAC FIFO ingress aligns to.

use phaser_dsp::sample::Complex;

/// Drives `n_channel` baseband streams from successive frame bodies.
pub struct SampleMux {
    n_channel: usize,
    /// `body[mux_index][channel]`, most recently loaded.
    body: Vec<Vec<Complex>>,
    cycles_per_sample: u32,
    mux_index: usize,
    cycle_counter: u32,
}

impl SampleMux {
    /// `cycles_per_sample` is `t_frame / n_mux`: how many clock ticks elapse
    /// between successive per-channel sample emissions.
    pub fn new(n_channel: usize, cycles_per_sample: u32) -> Self {
        Self {
            n_channel,
            body: Vec::new(),
            cycles_per_sample: cycles_per_sample.max(1),
            mux_index: 0,
            cycle_counter: 0,
        }
    }

    /// Load a new frame body: `n_mux` groups of `n_channel` samples. Takes
    /// effect from the mux's current position — it does not reset timing,
    /// matching the zero-order-hold contract (no glitch on reload).
    pub fn load_body(&mut self, body: Vec<Vec<Complex>>) {
        debug_assert!(body.iter().all(|group| group.len() == self.n_channel));
        self.body = body;
    }

    /// Advance one clock tick. Returns `Some((samples, sample_mark))` on the
    /// tick a new per-channel sample is emitted; `sample_mark` is set exactly
    /// when this is the first sample of a freshly loaded body.
    pub fn step(&mut self) -> Option<(Vec<Complex>, bool)> {
        if self.cycle_counter > 0 {
            self.cycle_counter -= 1;
            return None;
        }
        self.cycle_counter = self.cycles_per_sample - 1;
        if self.body.is_empty() {
            return Some((vec![Complex::ZERO; self.n_channel], false));
        }
        let mark = self.mux_index == 0;
        let samples = self.body[self.mux_index % self.body.len()].clone();
        self.mux_index = (self.mux_index + 1) % self.body.len();
        Some((samples, mark))
    }

    pub fn reset(&mut self) {
        self.mux_index = 0;
        self.cycle_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_sample_per_channel_every_cycles_per_sample_ticks() {
        let mut mux = SampleMux::new(2, 4);
        mux.load_body(vec![
            vec![Complex::new(1, 1), Complex::new(2, 2)],
            vec![Complex::new(3, 3), Complex::new(4, 4)],
        ]);

        let mut emissions = Vec::new();
        for _ in 0..16 {
            if let Some(pair) = mux.step() {
                emissions.push(pair);
            }
        }
        assert_eq!(emissions.len(), 4);
        assert_eq!(emissions[0].0, vec![Complex::new(1, 1), Complex::new(2, 2)]);
        assert!(emissions[0].1, "first emission of a body asserts sample_mark");
        assert_eq!(emissions[1].0, vec![Complex::new(3, 3), Complex::new(4, 4)]);
        assert!(!emissions[1].1);
        // mux wraps and sample_mark reasserts on the next cycle through the body
        assert!(emissions[2].1);
    }

    #[test]
    fn idle_without_a_loaded_body_emits_zero() {
        let mut mux = SampleMux::new(1, 2);
        let mut saw = false;
        for _ in 0..4 {
            if let Some((samples, mark)) = mux.step() {
                assert_eq!(samples, vec![Complex::ZERO]);
                assert!(!mark);
                saw = true;
            }
        }
        assert!(saw);
    }
}
