//! The register file and bus.
//!
//! A flat `{addr (0..127) -> word}` map. The original gateware's address
//! overlap check is a permanent placeholder that never fires, so address
//! reuse is allowed silently here too — a later [`RegisterFile::declare`]
//! for an already-declared address simply replaces it, with no diagnostic.

use std::collections::HashMap;

use crate::error::LinkError;
use crate::frame::Header;

/// Whether a register slot accepts host writes, host reads, or both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    fn readable(self) -> bool {
        matches!(self, Access::ReadOnly | Access::ReadWrite)
    }

    fn writable(self) -> bool {
        matches!(self, Access::WriteOnly | Access::ReadWrite)
    }
}

struct Slot {
    access: Access,
    value: u8,
}

/// The flat register map, addresses `0..128`.
pub struct RegisterFile {
    slots: HashMap<u8, Slot>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Declare (or silently redeclare) a register slot.
    pub fn declare(&mut self, addr: u8, access: Access) {
        self.slots.insert(addr, Slot { access, value: 0 });
    }

    /// Latch `data` into `addr`, as a write-enabled frame strobe would.
    pub fn write(&mut self, addr: u8, data: u8) -> Result<(), LinkError> {
        let slot = self
            .slots
            .get_mut(&addr)
            .ok_or(LinkError::UnmappedAddress(addr))?;
        if !slot.access.writable() {
            return Err(LinkError::WriteToReadOnly(addr));
        }
        tracing::debug!(addr = format!("{addr:#04x}"), data, "register write");
        slot.value = data;
        Ok(())
    }

    /// Read the currently latched/observed value at `addr`.
    pub fn read(&self, addr: u8) -> Result<u8, LinkError> {
        let slot = self.slots.get(&addr).ok_or(LinkError::UnmappedAddress(addr))?;
        if !slot.access.readable() {
            return Err(LinkError::ReadFromWriteOnly(addr));
        }
        Ok(slot.value)
    }

    /// Set a register's value from hardware observation (e.g. `sta`,
    /// `dac*_data`) rather than a host write — bypasses the writable check.
    pub fn set_observed(&mut self, addr: u8, value: u8) {
        if let Some(slot) = self.slots.get_mut(&addr) {
            slot.value = value;
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a [`RegisterFile`] from decoded register-frame headers.
pub struct RegisterBus {
    pub file: RegisterFile,
}

impl RegisterBus {
    pub fn new(file: RegisterFile) -> Self {
        Self { file }
    }

    /// Dispatch one register-type frame's header: `we` writes `data` at
    /// `addr`, otherwise it's a read and the current value is returned.
    pub fn dispatch(&mut self, header: &Header) -> Result<Option<u8>, LinkError> {
        if header.we {
            self.file.write(header.addr, header.data)?;
            Ok(None)
        } else {
            self.file.read(header.addr).map(Some)
        }
    }
}
