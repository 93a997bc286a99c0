//! The top-level frame decoder: dispatches each accepted frame to the
//! register bus, the sample mux, or the FFT loader by its `type` field.

use phaser_dsp::sample::Complex;

use crate::error::LinkError;
use crate::fft_loader::FftFrameLoader;
use crate::frame::{Frame, FrameKind};
use crate::register::RegisterBus;
use crate::sample_mux::SampleMux;

/// What handling a single frame produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderEvent {
    /// A register frame with `we = 0`: the value read back.
    RegisterRead(u8),
    /// A register frame with `we = 1`: the address written, so the owning
    /// scheduler can react to commit-point registers (`duc_stb`,
    /// `servoN_cfg`, ...) that this crate has no visibility into.
    RegisterWrite(u8),
    /// A sample-body frame: nothing to report back to the host.
    None,
    /// An FFT-load frame: which branch's memory to write, and the writes.
    FftWrite {
        branch: usize,
        writes: Vec<(u16, Complex)>,
    },
}

/// Owns the register bus, sample mux, and FFT loader, and routes frames.
pub struct Decoder {
    pub register_bus: RegisterBus,
    pub sample_mux: SampleMux,
    pub fft_loader: FftFrameLoader,
    n_mux: usize,
    n_channel: usize,
    w_s: u32,
    coef_width: u32,
    coef_per_frame: usize,
}

impl Decoder {
    pub fn new(
        register_bus: RegisterBus,
        sample_mux: SampleMux,
        fft_loader: FftFrameLoader,
        n_mux: usize,
        n_channel: usize,
        w_s: u32,
        coef_width: u32,
        coef_per_frame: usize,
    ) -> Self {
        Self {
            register_bus,
            sample_mux,
            fft_loader,
            n_mux,
            n_channel,
            w_s,
            coef_width,
            coef_per_frame,
        }
    }

    /// Handle one accepted frame (one `frame_stb`).
    pub fn handle_frame(&mut self, frame: &Frame) -> Result<DecoderEvent, LinkError> {
        match frame.header.kind {
            FrameKind::Register => {
                tracing::trace!(addr = frame.header.addr, we = frame.header.we, "register frame");
                match self.register_bus.dispatch(&frame.header)? {
                    Some(value) => Ok(DecoderEvent::RegisterRead(value)),
                    None => Ok(DecoderEvent::RegisterWrite(frame.header.addr)),
                }
            }
            FrameKind::SampleBody => {
                tracing::trace!("sample body frame");
                let groups = frame.unpack_sample_mux_body(self.n_mux, self.n_channel, self.w_s)?;
                self.sample_mux.load_body(groups);
                Ok(DecoderEvent::None)
            }
            FrameKind::FftLoad => {
                let (base_addr, coeffs, fft_id) =
                    frame.unpack_fft_load(self.coef_width, self.coef_per_frame)?;
                tracing::trace!(base_addr, fft_id, "fft load frame");
                let (branch, writes) = self.fft_loader.unpack(base_addr, &coeffs, fft_id)?;
                Ok(DecoderEvent::FftWrite { branch, writes })
            }
        }
    }

    /// Advance the sample mux by one clock tick, independent of frame
    /// arrival — it free-runs at `t_frame / n_mux` once a body is loaded.
    pub fn tick_sample_mux(&mut self) -> Option<(Vec<Complex>, bool)> {
        self.sample_mux.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft_loader::FftFrameLoader;
    use crate::frame::Header;
    use crate::register::{Access, RegisterFile};

    fn decoder() -> Decoder {
        let mut file = RegisterFile::new();
        file.declare(0x01, Access::ReadWrite);
        Decoder::new(
            RegisterBus::new(file),
            SampleMux::new(2, 4),
            FftFrameLoader::new(1, 64),
            1,
            2,
            14,
            18,
            4,
        )
    }

    #[test]
    fn register_write_then_read() {
        let mut d = decoder();
        let write = Frame {
            header: Header {
                we: true,
                addr: 1,
                data: 99,
                kind: FrameKind::Register,
            },
            body: Vec::new(),
        };
        assert_eq!(d.handle_frame(&write).unwrap(), DecoderEvent::RegisterWrite(1));

        let read = Frame {
            header: Header {
                we: false,
                addr: 1,
                data: 0,
                kind: FrameKind::Register,
            },
            body: Vec::new(),
        };
        assert_eq!(d.handle_frame(&read).unwrap(), DecoderEvent::RegisterRead(99));
    }

    #[test]
    fn sample_body_frame_feeds_the_mux() {
        let mut d = decoder();
        let mut body = vec![0u8; ((2 * 2 * 14) as usize + 7) / 8];
        body[0] = 0x01; // i=1 for channel 0 in the first (and only) mux group
        let frame = Frame {
            header: Header {
                we: true,
                addr: 0,
                data: 0,
                kind: FrameKind::SampleBody,
            },
            body,
        };
        assert_eq!(d.handle_frame(&frame).unwrap(), DecoderEvent::None);
        let (samples, mark) = d.tick_sample_mux().unwrap();
        assert!(mark);
        assert_eq!(samples[0], Complex::new(1, 0));
    }
}
