//! Atari 2600 bank switching schemes
//!
//! Each board family lives in its own module with its own state struct.
//! [`Mapper`] is the closed set of them; the bus calls one dispatch function
//! per cycle and every arm is checked for exhaustiveness by the compiler.
//!
//! Two entry points exist:
//! - [`Mapper::on_access`] for cycles inside the $1000-$1FFF window. It
//!   returns `Some(byte)` when the cartridge drives the data bus and `None`
//!   when nothing does (writes, RAM write ports).
//! - [`Mapper::snoop`] for cycles anywhere else. Boards such as 3F, FE, UA
//!   and X07 decode addresses outside their window; the owning chip still
//!   answers those cycles.
//!
//! JVP boards also route a range the console leaves undecoded to RIOT RAM;
//! [`Mapper::riot_overlay`] tells the decoder about it.

mod activision;
mod e0;
mod e7;
mod fixed;
mod hotspot;
mod jvp;
mod latch;
mod tigervision;
mod ua;
mod x07;

pub use activision::Activision;
pub use e0::E0;
pub use e7::E7;
pub use fixed::{Commavid, Fixed};
pub use hotspot::Hotspot;
pub use jvp::Jvp;
pub use latch::Latch;
pub use tigervision::Tigervision;
pub use ua::UaLtd;
pub use x07::X07;

use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::{CartridgeImage, MappingScheme};
use crate::ram::SharedIoRam;

/// Unified mapper enum that dispatches to specific implementations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Mapper {
    Fixed(Fixed),
    Commavid(Commavid),
    Hotspot(Hotspot),
    Latch(Latch),
    E0(E0),
    E7(E7),
    Tigervision(Tigervision),
    Activision(Activision),
    UaLtd(UaLtd),
    X07(X07),
    Jvp(Jvp),
}

impl Mapper {
    /// Power-on banking state for the image's declared scheme
    pub fn new(image: &CartridgeImage) -> Self {
        match image.scheme() {
            MappingScheme::Rom2K | MappingScheme::Rom4K => Mapper::Fixed(Fixed),
            MappingScheme::Commavid => Mapper::Commavid(Commavid::new()),
            MappingScheme::F8 => Mapper::Hotspot(Hotspot::f8(1)),
            MappingScheme::F8Swapped => Mapper::Hotspot(Hotspot::f8(0)),
            MappingScheme::F6 => Mapper::Hotspot(Hotspot::f6()),
            MappingScheme::F4 => Mapper::Hotspot(Hotspot::f4()),
            MappingScheme::F8SuperChip => Mapper::Hotspot(Hotspot::f8(1).with_super_chip()),
            MappingScheme::F6SuperChip => Mapper::Hotspot(Hotspot::f6().with_super_chip()),
            MappingScheme::F4SuperChip => Mapper::Hotspot(Hotspot::f4().with_super_chip()),
            MappingScheme::FA => Mapper::Hotspot(Hotspot::fa()),
            MappingScheme::Latch => Mapper::Latch(Latch::default()),
            MappingScheme::E0 => Mapper::E0(E0::new()),
            MappingScheme::E7 => Mapper::E7(E7::new()),
            MappingScheme::Tigervision3F => Mapper::Tigervision(Tigervision::new_3f()),
            MappingScheme::Tigervision3E => Mapper::Tigervision(Tigervision::new_3e()),
            MappingScheme::Activision => Mapper::Activision(Activision::default()),
            MappingScheme::UaLtd => Mapper::UaLtd(UaLtd::default()),
            MappingScheme::X07 => Mapper::X07(X07::default()),
            MappingScheme::Jvp => Mapper::Jvp(Jvp::default()),
        }
    }

    /// Service a cycle inside the cartridge window.
    ///
    /// `addr` is the 13-bit bus address. Hotspot side effects are applied
    /// before the returned byte is chosen.
    #[inline]
    pub fn on_access(
        &mut self,
        image: &CartridgeImage,
        addr: u16,
        cycle: BusCycle,
        side_effects: SideEffects,
    ) -> Option<u8> {
        let offset = (addr & 0x0FFF) as usize;
        match self {
            Mapper::Fixed(m) => m.on_access(image, offset, cycle),
            Mapper::Commavid(m) => m.on_access(image, offset, cycle),
            Mapper::Hotspot(m) => m.on_access(image, offset, cycle, side_effects),
            Mapper::Latch(m) => m.on_access(image, offset, cycle, side_effects),
            Mapper::E0(m) => m.on_access(image, offset, cycle, side_effects),
            Mapper::E7(m) => m.on_access(image, offset, cycle, side_effects),
            Mapper::Tigervision(m) => m.on_access(image, offset, cycle),
            Mapper::Activision(m) => m.on_access(image, offset, cycle, side_effects),
            Mapper::UaLtd(m) => m.on_access(image, offset, cycle),
            Mapper::X07(m) => m.on_access(image, offset, cycle, side_effects),
            Mapper::Jvp(m) => m.on_access(image, offset, cycle, side_effects),
        }
    }

    /// Observe a genuine cycle outside the cartridge window
    #[inline]
    pub fn snoop(&mut self, image: &CartridgeImage, addr: u16, cycle: BusCycle, ram: &SharedIoRam) {
        match self {
            Mapper::Tigervision(m) => m.snoop(image, addr, cycle),
            Mapper::Activision(m) => m.snoop(addr, cycle, ram),
            Mapper::UaLtd(m) => m.snoop(addr),
            Mapper::X07(m) => m.snoop(addr),
            Mapper::Jvp(m) => m.snoop(addr),
            Mapper::Fixed(_)
            | Mapper::Commavid(_)
            | Mapper::Hotspot(_)
            | Mapper::Latch(_)
            | Mapper::E0(_)
            | Mapper::E7(_) => {}
        }
    }

    /// Banks currently visible, lowest window slice first
    pub fn banks(&self) -> Vec<usize> {
        match self {
            Mapper::Fixed(_) | Mapper::Commavid(_) => vec![0],
            Mapper::Hotspot(m) => vec![m.bank()],
            Mapper::Latch(m) => vec![m.bank()],
            Mapper::E0(m) => m.slices().to_vec(),
            Mapper::E7(m) => vec![m.rom_bank(), m.ram_page()],
            Mapper::Tigervision(m) => vec![m.bank()],
            Mapper::Activision(m) => vec![m.bank()],
            Mapper::UaLtd(m) => vec![m.bank()],
            Mapper::X07(m) => vec![m.bank()],
            Mapper::Jvp(m) => vec![m.bank()],
        }
    }

    /// RIOT RAM address the board wires to `addr`, for addresses the console
    /// itself leaves undecoded
    #[inline]
    pub fn riot_overlay(&self, addr: u16) -> Option<u16> {
        match self {
            Mapper::Jvp(_) => Jvp::riot_overlay(addr),
            _ => None,
        }
    }

    /// Check banking state restored from outside against the image it will
    /// serve, so that no later access can index past a RAM buffer
    pub fn validate(&self, image: &CartridgeImage) -> Result<(), String> {
        match (self, &Mapper::new(image)) {
            (Mapper::Commavid(m), Mapper::Commavid(fresh)) => m.check_state(fresh),
            (Mapper::Hotspot(m), Mapper::Hotspot(fresh)) => m.check_state(fresh),
            (Mapper::E7(m), Mapper::E7(fresh)) => m.check_state(fresh),
            (Mapper::Tigervision(m), Mapper::Tigervision(fresh)) => m.check_state(fresh),
            (m, fresh) if std::mem::discriminant(m) == std::mem::discriminant(fresh) => Ok(()),
            _ => Err(format!("banking state is not for a {} board", image.scheme().id())),
        }
    }
}
