//! The named register map: assigns byte addresses to the core's named
//! registers on top of the generic [`RegisterFile`], and combines
//! multi-byte registers big-endian the way the host-side view does
//! (multi-byte registers occupy consecutive addresses).
//!
//! The layout itself (which address holds `cfg`, how many bytes `duc0_f`
//! spans, ...) is not specified bit-for-bit beyond field widths and names —
//! this module picks one concrete, internally consistent assignment and
//! documents it here, the way a host-side register map header would.

use crate::error::LinkError;
use crate::register::{Access, RegisterFile};

/// One named field: a run of `width` consecutive byte addresses starting at
/// `base`, most-significant byte first.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub base: u8,
    pub width: u8,
    pub access: Access,
}

impl Field {
    const fn new(base: u8, width: u8, access: Access) -> Self {
        Self { base, width, access }
    }

    fn next(self) -> u8 {
        self.base + self.width
    }

    pub fn declare(&self, file: &mut RegisterFile) {
        for i in 0..self.width {
            file.declare(self.base + i, self.access);
        }
    }

    /// Compose the field's bytes into a single value, most-significant
    /// byte first.
    pub fn read(&self, file: &RegisterFile) -> Result<u64, LinkError> {
        let mut v = 0u64;
        for i in 0..self.width {
            v = (v << 8) | u64::from(file.read(self.base + i)?);
        }
        Ok(v)
    }

    /// Write `value`'s low `8 * width` bits across the field's bytes,
    /// most-significant byte first, as a sequence of per-byte register
    /// writes (one per host frame, in reality).
    pub fn write(&self, file: &mut RegisterFile, value: u64) -> Result<(), LinkError> {
        for i in 0..self.width {
            let shift = 8 * u32::from(self.width - 1 - i);
            file.write(self.base + i, ((value >> shift) & 0xff) as u8)?;
        }
        Ok(())
    }

    /// Update the field from hardware observation (e.g. `dac*_data`)
    /// instead of a host write.
    pub fn set_observed(&self, file: &mut RegisterFile, value: u64) {
        for i in 0..self.width {
            let shift = 8 * u32::from(self.width - 1 - i);
            file.set_observed(self.base + i, ((value >> shift) & 0xff) as u8);
        }
    }

    /// Whether `addr` falls inside this field's byte range.
    pub fn contains(&self, addr: u8) -> bool {
        addr >= self.base && addr < self.base + self.width
    }
}

/// One channel's DUC-facing register group.
#[derive(Clone, Copy, Debug)]
pub struct DucRegs {
    /// bit0 `clr`, bit1 `clr_once`, bits2-3 source select.
    pub cfg: Field,
    /// 32-bit frequency tuning word.
    pub f: Field,
    /// 16-bit phase offset.
    pub p: Field,
    /// Live sample snapshot: `(i:16, q:16)` concatenated, read-only.
    pub dac_data: Field,
    /// Test pattern injected when `cfg` selects `sel == 1`: `(i:16, q:16)`.
    pub dac_test: Field,
}

/// One channel's servo-facing register group.
#[derive(Clone, Debug)]
pub struct ServoRegs {
    /// bit0 enable, bit1 hold, bits2+ profile selector.
    pub cfg: Field,
    /// `coeffs[profile] = [b0, b1, a0, offset]`, each a 3-byte (24-bit)
    /// signed fixed-point field except `offset`, which is 2 bytes.
    pub profiles: Vec<[Field; 4]>,
}

/// The STFT pulse-generator control surface, shared across branches.
#[derive(Clone, Copy, Debug)]
pub struct PulsegenRegs {
    pub fft_load: Field,
    pub fft_start: Field,
    pub fft_busy: Field,
    pub fft_shiftmask: Field,
    pub interpolation_rate: Field,
    pub pulse_trigger: Field,
    pub pulse_settings: Field,
    pub repeater: Field,
    pub pulsegen_busy: Field,
}

/// The complete core-visible register map, concretely addressed.
#[derive(Clone, Debug)]
pub struct RegisterMap {
    pub cfg: Field,
    pub sta: Field,
    /// One-shot commit: any write to this address latches every channel's
    /// currently-staged `duc*_f`/`duc*_p`, and applies `clr_once` on
    /// channels whose `duc*_cfg` bit1 is set — the `duc_stb` register
    /// write is the commit point for frequency/phase updates.
    pub duc_stb: Field,
    pub duc: Vec<DucRegs>,
    pub servo: Vec<ServoRegs>,
    pub pulsegen: PulsegenRegs,
}

/// Coefficient/offset field widths, in bytes.
const COEF_WIDTH: u8 = 3;
const OFFSET_WIDTH: u8 = 2;

impl RegisterMap {
    /// Build the standard layout for `n_channel` DUC/servo channels and
    /// `n_profiles` IIR profiles per channel, declaring every field's
    /// access on `file` as it goes.
    pub fn build(file: &mut RegisterFile, n_channel: usize, n_profiles: usize) -> Self {
        let mut addr = 0u8;
        let mut alloc = |width: u8, access: Access| {
            let f = Field::new(addr, width, access);
            addr = f.next();
            f
        };

        let cfg = alloc(1, Access::ReadWrite);
        let sta = alloc(1, Access::ReadOnly);
        let duc_stb = alloc(1, Access::WriteOnly);

        let duc: Vec<DucRegs> = (0..n_channel)
            .map(|_| DucRegs {
                cfg: alloc(1, Access::ReadWrite),
                f: alloc(4, Access::ReadWrite),
                p: alloc(2, Access::ReadWrite),
                dac_data: alloc(4, Access::ReadOnly),
                dac_test: alloc(4, Access::ReadWrite),
            })
            .collect();

        let servo: Vec<ServoRegs> = (0..n_channel)
            .map(|_| ServoRegs {
                cfg: alloc(1, Access::ReadWrite),
                profiles: (0..n_profiles)
                    .map(|_| {
                        [
                            alloc(COEF_WIDTH, Access::WriteOnly),
                            alloc(COEF_WIDTH, Access::WriteOnly),
                            alloc(COEF_WIDTH, Access::WriteOnly),
                            alloc(OFFSET_WIDTH, Access::WriteOnly),
                        ]
                    })
                    .collect(),
            })
            .collect();

        let pulsegen = PulsegenRegs {
            fft_load: alloc(1, Access::ReadWrite),
            fft_start: alloc(1, Access::ReadWrite),
            fft_busy: alloc(1, Access::ReadOnly),
            fft_shiftmask: alloc(2, Access::ReadWrite),
            interpolation_rate: alloc(1, Access::ReadWrite),
            pulse_trigger: alloc(1, Access::ReadWrite),
            pulse_settings: alloc(1, Access::ReadWrite),
            repeater: alloc(1, Access::ReadWrite),
            pulsegen_busy: alloc(1, Access::ReadOnly),
        };

        assert!(addr <= 127, "register map overflowed the 7-bit address space");

        let map = Self { cfg, sta, duc_stb, duc, servo, pulsegen };
        map.declare_all(file);
        map
    }

    fn declare_all(&self, file: &mut RegisterFile) {
        self.cfg.declare(file);
        self.sta.declare(file);
        self.duc_stb.declare(file);
        for d in &self.duc {
            d.cfg.declare(file);
            d.f.declare(file);
            d.p.declare(file);
            d.dac_data.declare(file);
            d.dac_test.declare(file);
        }
        for s in &self.servo {
            s.cfg.declare(file);
            for profile in &s.profiles {
                for field in profile {
                    field.declare(file);
                }
            }
        }
        self.pulsegen.fft_load.declare(file);
        self.pulsegen.fft_start.declare(file);
        self.pulsegen.fft_busy.declare(file);
        self.pulsegen.fft_shiftmask.declare(file);
        self.pulsegen.interpolation_rate.declare(file);
        self.pulsegen.pulse_trigger.declare(file);
        self.pulsegen.pulse_settings.declare(file);
        self.pulsegen.repeater.declare(file);
        self.pulsegen.pulsegen_busy.declare(file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_fits_the_7_bit_address_space() {
        let mut file = RegisterFile::new();
        let map = RegisterMap::build(&mut file, 2, 3);
        assert_eq!(map.duc.len(), 2);
        assert_eq!(map.servo[0].profiles.len(), 3);
    }

    #[test]
    fn multi_byte_field_round_trips_big_endian() {
        let mut file = RegisterFile::new();
        let map = RegisterMap::build(&mut file, 1, 1);
        map.duc[0].f.write(&mut file, 0x1234_5678).unwrap();
        assert_eq!(file.read(map.duc[0].f.base).unwrap(), 0x12);
        assert_eq!(file.read(map.duc[0].f.base + 3).unwrap(), 0x78);
        assert_eq!(map.duc[0].f.read(&file).unwrap(), 0x1234_5678);
    }

    #[test]
    fn observed_field_bypasses_the_writable_check() {
        let mut file = RegisterFile::new();
        let map = RegisterMap::build(&mut file, 1, 1);
        map.duc[0].dac_data.set_observed(&mut file, 0x0001_0002);
        assert_eq!(map.duc[0].dac_data.read(&file).unwrap(), 0x0001_0002);
    }
}
