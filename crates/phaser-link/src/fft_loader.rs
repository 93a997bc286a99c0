//! The FFT coefficient loader.
//!
//! On a `type == 2` frame, the body carries `{base_addr(16), data[..], fft_id(4)}`.
//! The loader pairs up consecutive `data` words into complex FFT-memory
//! entries and targets the selected branch's buffer starting at `base_addr`,
//! incrementing the write address each pair and stopping early if the
//! address would run past the memory's end — matching the source's
//! "deasserting the write when the address overflows or the count is
//! reached".

use phaser_dsp::sample::Complex;

use crate::error::LinkError;

/// Unpacks `type == 2` frame bodies into per-branch FFT-memory writes.
pub struct FftFrameLoader {
    branches: usize,
    mem_size: usize,
}

impl FftFrameLoader {
    /// `branches` is the number of independently addressable FFT memories
    /// (STFT branches); `mem_size` is each one's word count.
    pub fn new(branches: usize, mem_size: usize) -> Self {
        Self { branches, mem_size }
    }

    /// Turn one already-unpacked `(base_addr, coeffs, fft_id)` triple (see
    /// [`crate::Frame::unpack_fft_load`]) into `(branch, writes)`, where
    /// `writes` is `(address, value)` pairs to apply to that branch's FFT
    /// memory, in order.
    pub fn unpack(
        &self,
        base_addr: u16,
        coeffs: &[i64],
        fft_id: u8,
    ) -> Result<(usize, Vec<(u16, Complex)>), LinkError> {
        let branch = fft_id as usize;
        if branch >= self.branches {
            return Err(LinkError::UnknownFftBranch(fft_id, self.branches));
        }
        let mut writes = Vec::with_capacity(coeffs.len() / 2);
        let mut addr = base_addr as usize;
        for pair in coeffs.chunks(2) {
            if addr >= self.mem_size {
                break;
            }
            let i = pair[0];
            let q = pair.get(1).copied().unwrap_or(0);
            writes.push((addr as u16, Complex::new(i, q)));
            addr += 1;
        }
        Ok((branch, writes))
    }
}
