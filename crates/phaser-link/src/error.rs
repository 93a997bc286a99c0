//! Error types surfaced by the link layer.
//!
//! Per the core's error-handling policy: framing/CRC/SPI faults are reported
//! by the (out-of-scope) physical layer via counters and the `sta` register,
//! not exceptions raised here — this enum covers only faults *this* crate can
//! itself detect while interpreting an already-accepted frame or register
//! access.

use thiserror::Error;

/// Errors this crate's frame/register handling can report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// A frame's declared body length didn't match what its `type` implies.
    #[error("frame body has {got} bits, expected {expected} for type {frame_type}")]
    BodyLengthMismatch {
        frame_type: u8,
        expected: usize,
        got: usize,
    },

    /// An unrecognized frame `type` field (only 0, 1, 2 are defined).
    #[error("unknown frame type {0}")]
    UnknownFrameType(u8),

    /// A register write targeted an address with no declared slot.
    #[error("register address {0:#04x} is not mapped")]
    UnmappedAddress(u8),

    /// A register write targeted a read-only slot.
    #[error("register address {0:#04x} is read-only")]
    WriteToReadOnly(u8),

    /// A register read targeted a write-only slot.
    #[error("register address {0:#04x} is write-only")]
    ReadFromWriteOnly(u8),

    /// The FFT frame loader's `fft_id` selected a branch that doesn't exist.
    #[error("fft loader addressed branch {0}, only {1} configured")]
    UnknownFftBranch(u8, usize),
}
