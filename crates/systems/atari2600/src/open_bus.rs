//! Floating data bus reconstruction
//!
//! When no chip drives the data lines, the 6507 reads whatever charge is left
//! on them, which is almost always a byte from the last few bus cycles. Games
//! (and a few copy protections) depend on this, so reads of undriven
//! addresses are answered from a short trace of recent opcode fetches.
//!
//! The heuristic only models the common instruction shapes and is known to
//! be incomplete.

use serde::{Deserialize, Serialize};

/// Opcode of `LDA (zp),Y`
const LDA_INDIRECT_Y: u8 = 0xB1;

/// Address bits that are set for cartridge and RIOT RAM fetches
const DRIVEN_FETCH_BITS: u16 = 0x1080;

/// One program byte seen on the bus during a fetch cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fetch {
    pub addr: u16,
    pub byte: u8,
}

impl Fetch {
    #[inline]
    fn from_program_memory(&self) -> bool {
        self.addr & DRIVEN_FETCH_BITS != 0
    }
}

/// The two most recent fetches, newest first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusTrace {
    last: Fetch,
    prev: Fetch,
}

impl BusTrace {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, addr: u16, byte: u8) {
        self.prev = self.last;
        self.last = Fetch { addr, byte };
    }

    pub fn last(&self) -> Fetch {
        self.last
    }

    pub fn prev(&self) -> Fetch {
        self.prev
    }
}

/// Value the data bus floats to for a read of `requested`.
///
/// `peek` reads memory without side effects; it is only consulted for the
/// pointer byte of an `LDA (zp),Y` still on the bus.
pub fn resolve<F>(requested: u16, trace: &BusTrace, peek: F) -> u8
where
    F: FnOnce(u16) -> u8,
{
    let last = trace.last();
    let prev = trace.prev();

    if !last.from_program_memory() {
        return requested as u8;
    }
    if last.byte < 0x80 || last.byte == 0xFF {
        return last.byte;
    }
    if !prev.from_program_memory() {
        return last.byte;
    }
    if prev.byte == LDA_INDIRECT_Y {
        return peek(u16::from(last.byte) + 1);
    }
    last.byte
}
