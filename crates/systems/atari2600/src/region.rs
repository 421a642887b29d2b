//! Address regions and mirroring
//!
//! The 6507 drives 13 address lines but the chips on the board only decode a
//! few of them, so every register and RAM byte answers at many addresses.
//! A region records which address bits its chip ignores (the mirror mask);
//! clearing those bits gives the canonical address.
//!
//! After masking to 13 bits:
//! - $0000-$007F TIA, ignoring A8-A11
//! - $0080-$00FF RIOT RAM, ignoring A8, A10, A11
//! - $0280-$029F RIOT I/O and timer, ignoring A8, A10, A11
//! - $1000-$1FFF cartridge window
//!
//! Anything else below $1000 (e.g. $02A0-$02FF) is driven by nobody.

use std::fmt;

/// Mask applied to every address before decoding
pub const ADDRESS_MASK: u16 = 0x1FFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    base: u16,
    size: u16,
    mirror: u16,
}

impl Region {
    pub const fn new(base: u16, size: u16, mirror: u16) -> Self {
        Self { base, size, mirror }
    }

    /// Region repeating every `stride` bytes inside a `window`-sized block.
    ///
    /// Both `window` and `stride` must be non-zero powers of two.
    pub const fn with_stride(base: u16, size: u16, window: u16, stride: u16) -> Self {
        debug_assert!(window.is_power_of_two() && stride.is_power_of_two());
        Self::new(base, size, window.wrapping_sub(1) & !stride.wrapping_sub(1))
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn mirror(&self) -> u16 {
        self.mirror
    }

    /// Canonical address if `addr` (or one of its mirrors) falls in the region
    #[inline]
    pub fn canonical(&self, addr: u16) -> Option<u16> {
        let canonical = addr & !self.mirror;
        if canonical >= self.base && canonical - self.base < self.size {
            Some(canonical)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, addr: u16) -> bool {
        self.canonical(addr).is_some()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:04X}-${:04X} (mirror ${:04X})",
            self.base,
            self.base.wrapping_add(self.size.wrapping_sub(1)),
            self.mirror
        )
    }
}

pub const TIA: Region = Region::new(0x0000, 0x0080, 0x0F00);
pub const RIOT_RAM: Region = Region::new(0x0080, 0x0080, 0x0D00);
pub const RIOT_IO: Region = Region::new(0x0280, 0x0020, 0x0D00);
pub const CARTRIDGE: Region = Region::new(0x1000, 0x1000, 0x0000);

/// $0FA0-$0FC0: nobody drives it on a bare console, JVP boards route it to
/// RIOT RAM (see [`crate::mapper::Jvp`])
pub const JVP_RIOT_OVERLAY: Region = Region::new(0x0FA0, 0x0021, 0x0000);

/// Chip that drives the data bus for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// TIA register offset ($00-$7F)
    Tia(u8),
    /// Canonical RIOT RAM address ($80-$FF)
    RiotRam(u16),
    /// RIOT I/O register offset ($00-$1F)
    RiotIo(u8),
    /// 13-bit address inside the cartridge window
    Cartridge(u16),
    Unmapped,
}

/// Resolve the owner of an address, TIA first, then RIOT, then cartridge
#[inline]
pub fn decode(addr: u16) -> Owner {
    let addr = addr & ADDRESS_MASK;
    if let Some(canonical) = TIA.canonical(addr) {
        Owner::Tia(canonical as u8)
    } else if let Some(canonical) = RIOT_RAM.canonical(addr) {
        Owner::RiotRam(canonical)
    } else if let Some(canonical) = RIOT_IO.canonical(addr) {
        Owner::RiotIo((canonical - RIOT_IO.base) as u8)
    } else if CARTRIDGE.contains(addr) {
        Owner::Cartridge(addr)
    } else {
        Owner::Unmapped
    }
}
