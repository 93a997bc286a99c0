//! STFT pulse generator: `K` parallel IFFT → interpolator → DUC branches,
//! a shared real-valued "shaper" window branch, and the
//! continuous/triggered/windowed mode state machine that drives them.
//!
//! Each [`Branch`] owns its own FFT memory (loaded externally, e.g. by
//! `phaser-link`'s FFT frame loader), its own [`phaser_dsp::SuperInterpolator`],
//! and its own [`phaser_dsp::PhasedDuc`]. [`PulseGenerator`] sums the active
//! branches, optionally multiplies by the shaper, and tracks
//! `pulsegen_busy`/`pulse_done` the way the register map exposes them.

pub mod branch;
pub mod pulsegen;
pub mod shaper;

pub use branch::{Branch, BranchState};
pub use pulsegen::{Mode, PulseGenerator};
pub use shaper::Shaper;
