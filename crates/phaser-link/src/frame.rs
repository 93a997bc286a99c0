//! Frame header parsing and body bit-unpacking.
//!
//! The physical/SERDES/CRC layer is out of scope (spec'd as an abstract
//! byte-aligned framed stream with one "frame valid" event per frame) — this
//! module starts from that already-accepted byte buffer.

use phaser_dsp::sample::Complex;

use crate::error::LinkError;

/// Frame type discriminant (`type` field, bits `[16:20]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// `type == 0`: register access, no body.
    Register,
    /// `type == 1`: sample body for the [`crate::SampleMux`].
    SampleBody,
    /// `type == 2`: FFT coefficient load body.
    FftLoad,
}

impl FrameKind {
    fn from_type_field(t: u8) -> Result<Self, LinkError> {
        match t {
            0 => Ok(FrameKind::Register),
            1 => Ok(FrameKind::SampleBody),
            2 => Ok(FrameKind::FftLoad),
            other => Err(LinkError::UnknownFrameType(other)),
        }
    }
}

/// The 20-bit frame header: `{we:1, addr:7, data:8, type:4}`, bit 0 first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub we: bool,
    pub addr: u8,
    pub data: u8,
    pub kind: FrameKind,
}

impl Header {
    /// Parse from the low 20 bits of `word` (bit 0 = `we`).
    pub fn parse(word: u32) -> Result<Self, LinkError> {
        let we = word & 1 != 0;
        let addr = ((word >> 1) & 0x7f) as u8;
        let data = ((word >> 8) & 0xff) as u8;
        let type_field = ((word >> 16) & 0xf) as u8;
        Ok(Self {
            we,
            addr,
            data,
            kind: FrameKind::from_type_field(type_field)?,
        })
    }

    /// Pack back into the low 20 bits of a `u32`, the inverse of
    /// [`Self::parse`] — used by host-side tooling that generates frames
    /// rather than only decoding them.
    pub fn to_word(self) -> u32 {
        let type_field: u32 = match self.kind {
            FrameKind::Register => 0,
            FrameKind::SampleBody => 1,
            FrameKind::FftLoad => 2,
        };
        (self.we as u32) | (u32::from(self.addr & 0x7f) << 1) | (u32::from(self.data) << 8) | (type_field << 16)
    }
}

/// A little-endian, LSB-first bit cursor over a byte buffer — the "abstract
/// byte-aligned framed stream" the header and body share a layout
/// convention with.
struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    fn bits_remaining(&self) -> usize {
        self.bytes.len() * 8 - self.bit_pos
    }

    fn read_bits(&mut self, n: u32) -> u64 {
        let mut out = 0u64;
        for i in 0..n {
            let bit_index = self.bit_pos + i as usize;
            let byte = self.bytes[bit_index / 8];
            let bit = (byte >> (bit_index % 8)) & 1;
            out |= (bit as u64) << i;
        }
        self.bit_pos += n as usize;
        out
    }

    fn read_signed(&mut self, width: u32) -> i64 {
        phaser_dsp::rounding::sign_extend(self.read_bits(width) as i64, width)
    }
}

/// The write-side counterpart of [`BitReader`]: an LSB-first bit cursor that
/// grows a byte buffer as bits are pushed.
struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    fn new() -> Self {
        Self { bytes: Vec::new(), bit_pos: 0 }
    }

    fn write_bits(&mut self, value: u64, n: u32) {
        for i in 0..n {
            let bit_index = self.bit_pos + i as usize;
            let byte_index = bit_index / 8;
            if byte_index >= self.bytes.len() {
                self.bytes.push(0);
            }
            if (value >> i) & 1 != 0 {
                self.bytes[byte_index] |= 1 << (bit_index % 8);
            }
        }
        self.bit_pos += n as usize;
    }

    fn write_signed(&mut self, value: i64, width: u32) {
        self.write_bits(phaser_dsp::rounding::mask(value, width) as u64, width);
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A decoded frame: header plus its (still-packed) body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub header: Header,
    pub body: Vec<u8>,
}

impl Frame {
    /// Parse a frame from its 20-bit header word and raw body bytes.
    pub fn parse(header_word: u32, body: Vec<u8>) -> Result<Self, LinkError> {
        Ok(Self {
            header: Header::parse(header_word)?,
            body,
        })
    }

    /// Unpack a `type == 1` body into `n_channel` complex samples, each lane
    /// `w_s` bits wide, assuming `n_mux == 1` (one sample per channel per
    /// frame; see [`Self::unpack_sample_mux_body`] for `n_mux > 1`).
    pub fn unpack_samples(&self, n_channel: usize, w_s: u32) -> Result<Vec<Complex>, LinkError> {
        self.unpack_sample_mux_body(1, n_channel, w_s)
            .map(|grid| grid.into_iter().next().unwrap_or_default())
    }

    /// Unpack a `type == 1` body into `n_mux` groups of `n_channel` complex
    /// samples each, `w_s` bits per lane, little-endian (least-significant
    /// sample first) across the body.
    pub fn unpack_sample_mux_body(
        &self,
        n_mux: usize,
        n_channel: usize,
        w_s: u32,
    ) -> Result<Vec<Vec<Complex>>, LinkError> {
        let expected_bits = n_mux * n_channel * 2 * w_s as usize;
        if self.body.len() * 8 < expected_bits {
            return Err(LinkError::BodyLengthMismatch {
                frame_type: 1,
                expected: expected_bits,
                got: self.body.len() * 8,
            });
        }
        let mut reader = BitReader::new(&self.body);
        let mut groups = Vec::with_capacity(n_mux);
        for _ in 0..n_mux {
            let mut channels = Vec::with_capacity(n_channel);
            for _ in 0..n_channel {
                let i = reader.read_signed(w_s);
                let q = reader.read_signed(w_s);
                channels.push(Complex::new(i, q));
            }
            groups.push(channels);
        }
        Ok(groups)
    }

    /// Unpack a `type == 2` body into `{base_addr(16), data[count], fft_id(4)}`.
    pub fn unpack_fft_load(
        &self,
        coef_width: u32,
        coef_count: usize,
    ) -> Result<(u16, Vec<i64>, u8), LinkError> {
        let expected_bits = 16 + coef_count * coef_width as usize + 4;
        if self.body.len() * 8 < expected_bits {
            return Err(LinkError::BodyLengthMismatch {
                frame_type: 2,
                expected: expected_bits,
                got: self.body.len() * 8,
            });
        }
        let mut reader = BitReader::new(&self.body);
        let base_addr = reader.read_bits(16) as u16;
        let mut coeffs = Vec::with_capacity(coef_count);
        for _ in 0..coef_count {
            coeffs.push(reader.read_signed(coef_width));
        }
        let fft_id = reader.read_bits(4) as u8;
        debug_assert_eq!(reader.bits_remaining(), self.body.len() * 8 - expected_bits);
        Ok((base_addr, coeffs, fft_id))
    }

    /// Build a `type == 0` register write frame.
    pub fn register_write(addr: u8, data: u8) -> Self {
        Self {
            header: Header { we: true, addr, data, kind: FrameKind::Register },
            body: Vec::new(),
        }
    }

    /// Build a `type == 0` register read frame (`data` is ignored by the
    /// decoder on a read, so it's left zero).
    pub fn register_read(addr: u8) -> Self {
        Self {
            header: Header { we: false, addr, data: 0, kind: FrameKind::Register },
            body: Vec::new(),
        }
    }

    /// Build a `type == 1` sample body frame from `n_mux` groups of complex
    /// samples per channel, the inverse of [`Self::unpack_sample_mux_body`].
    pub fn pack_sample_mux_body(groups: &[Vec<Complex>], w_s: u32) -> Self {
        let mut writer = BitWriter::new();
        for group in groups {
            for sample in group {
                writer.write_signed(sample.i, w_s);
                writer.write_signed(sample.q, w_s);
            }
        }
        Self {
            header: Header { we: true, addr: 0, data: 0, kind: FrameKind::SampleBody },
            body: writer.into_bytes(),
        }
    }

    /// Build a `type == 2` FFT-load frame, the inverse of
    /// [`Self::unpack_fft_load`].
    pub fn pack_fft_load(base_addr: u16, coeffs: &[i64], coef_width: u32, fft_id: u8) -> Self {
        let mut writer = BitWriter::new();
        writer.write_bits(u64::from(base_addr), 16);
        for &c in coeffs {
            writer.write_signed(c, coef_width);
        }
        writer.write_bits(u64::from(fft_id), 4);
        Self {
            header: Header { we: true, addr: 0, data: 0, kind: FrameKind::FftLoad },
            body: writer.into_bytes(),
        }
    }
}
