//! Phaser DSP core — fixed-point signal-processing datapath for a dual-channel
//! RF signal-generation board.
//!
//! This crate implements the hot-path arithmetic of the Phaser gateware: a
//! cos/sin generator, a phased numerically-controlled oscillator and complex
//! multiplier, a multi-stage polyphase interpolator, a radix-2 block FFT/IFFT,
//! and a multi-channel IIR servo. Everything here is free-running, fixed-point,
//! and advances one step per clock tick — there are no threads or async tasks.
//!
//! # Core Abstractions
//!
//! ## Stepper contract
//!
//! - [`Step`] — every component advances by exactly one tick per call
//! - [`Stream`] — a `{data, stb, ack}` valid/ready endpoint the scheduler routes
//!
//! ## Oscillator & mixer
//!
//! - [`CosSin`] — phase → (cos, sin), minimax-tuned ROM + linear interpolation
//! - [`ComplexMultiplier`] — 3-multiply complex product with bias-half-down rounding
//! - [`PhasedAccu`] / [`PhasedDuc`] — N-phased NCO and digital up-converter
//!
//! ## Sample-rate conversion
//!
//! - [`SuperInterpolator`] — HBF0 → HBF1 → [`SuperCic`], shared MAC chain
//! - [`BlockFft`] — in-place radix-2 DIT FFT/IFFT with per-stage scaling
//!
//! ## Servo
//!
//! - [`IirServo`] — time-multiplexed first-order biquad-style servo
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! phaser-dsp = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod cic;
pub mod complex_mul;
pub mod cossin;
pub mod duc;
pub mod fft;
pub mod hbf;
pub mod iir;
pub mod interpolator;
pub mod rounding;
pub mod sample;
pub mod stepper;

pub use cic::SuperCic;
pub use complex_mul::ComplexMultiplier;
pub use cossin::CosSin;
pub use duc::{PhasedAccu, PhasedDuc, PhaseModulator};
pub use fft::BlockFft;
pub use hbf::HalfBandFir;
pub use iir::IirServo;
pub use interpolator::{InterpolationMode, SuperInterpolator};
pub use rounding::round_half_down;
pub use sample::Complex;
pub use stepper::{Step, Stream};
