//! Frame decoder, register bus, sample mux, and FFT frame loader for the
//! Phaser link.
//!
//! This crate sits between the (out-of-scope) physical link layer and
//! [`phaser_dsp`]'s arithmetic: it turns an already byte-aligned, framed
//! stream into register writes, per-channel baseband samples, and FFT
//! coefficient loads. Nothing here is hot-path arithmetic, so unlike
//! `phaser-dsp` this crate is `std`-only.

pub mod decoder;
pub mod error;
pub mod fft_loader;
pub mod frame;
pub mod register;
pub mod regmap;
pub mod sample_mux;

pub use decoder::{Decoder, DecoderEvent};
pub use error::LinkError;
pub use fft_loader::FftFrameLoader;
pub use frame::{Frame, FrameKind, Header};
pub use register::{Access, RegisterBus, RegisterFile};
pub use regmap::{DucRegs, Field, PulsegenRegs, RegisterMap, ServoRegs};
pub use sample_mux::SampleMux;
