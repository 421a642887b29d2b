//! Processor-facing bus vocabulary.
//!
//! A processor core drives a system bus one cycle at a time through [`CpuBus`].
//! Every call states what kind of cycle it is and whether it is a genuine
//! hardware cycle or an introspection read issued by a debugger.

use serde::{Deserialize, Serialize};

/// Kind of a single bus cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusCycle {
    /// Instruction stream read (opcode or operand byte)
    Fetch,
    /// Data read
    Read,
    /// Data write carrying the byte driven by the processor
    Write(u8),
}

impl BusCycle {
    #[inline]
    pub fn is_write(self) -> bool {
        matches!(self, BusCycle::Write(_))
    }

    #[inline]
    pub fn is_read(self) -> bool {
        !self.is_write()
    }

    /// Byte driven by the processor, if any
    #[inline]
    pub fn data(self) -> Option<u8> {
        match self {
            BusCycle::Write(val) => Some(val),
            BusCycle::Fetch | BusCycle::Read => None,
        }
    }
}

/// Whether an access is allowed to perturb emulated state.
///
/// Debuggers, disassemblers and memory viewers issue `Disabled` accesses:
/// they must observe the bus without triggering bank switches, clearing
/// latched flags or recording fetch history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SideEffects {
    #[default]
    Enabled,
    Disabled,
}

impl SideEffects {
    #[inline]
    pub fn enabled(self) -> bool {
        self == SideEffects::Enabled
    }
}

/// Bus interface driven by a processor core
pub trait CpuBus {
    /// Perform one bus cycle and return the byte on the data bus.
    ///
    /// For writes the return value is the written byte and carries no
    /// information.
    fn access(&mut self, addr: u16, cycle: BusCycle, side_effects: SideEffects) -> u8;

    /// Genuine data read
    fn read(&mut self, addr: u16) -> u8 {
        self.access(addr, BusCycle::Read, SideEffects::Enabled)
    }

    /// Genuine instruction fetch
    fn fetch(&mut self, addr: u16) -> u8 {
        self.access(addr, BusCycle::Fetch, SideEffects::Enabled)
    }

    /// Genuine write
    fn write(&mut self, addr: u16, val: u8) {
        self.access(addr, BusCycle::Write(val), SideEffects::Enabled);
    }

    /// Side-effect free read for debuggers
    fn peek(&mut self, addr: u16) -> u8 {
        self.access(addr, BusCycle::Read, SideEffects::Disabled)
    }
}
