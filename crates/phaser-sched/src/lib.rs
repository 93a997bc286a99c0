//! The top-level scheduler: wires [`phaser_link`]'s decoder, sample mux and
//! FFT loader together with [`phaser_stft`]'s pulse generator and
//! [`phaser_dsp`]'s per-channel interpolator/DUC/IIR stages into a single
//! `step()`-per-tick pipeline.
//!
//! This crate also owns the static [`Config`]/preset TOML format used to
//! seed channel carriers and IIR coefficient tables before any link frames
//! arrive.

pub mod channel;
pub mod config;
pub mod error;
pub mod pipeline;

pub use channel::{Channel, Source};
pub use config::{ChannelConfig, Config, IirProfile};
pub use error::SchedError;
pub use pipeline::{Pipeline, Tick};
