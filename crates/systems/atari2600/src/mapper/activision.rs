use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;
use crate::ram::SharedIoRam;

const BANK_SIZE: usize = 0x1000;

/// Activision FE: two 4K banks and no hotspot inside the window.
///
/// The board watches the stack. Any access to $01FE arms it, and the next
/// byte it sees on the data bus picks the bank from bit 5: set selects bank
/// 0, clear bank 1. That byte is the high half of an address in flight:
///
/// - JSR pushes PCH to $01FF and PCL to $01FE, then fetches the new PCH
///   from ROM, so the trigger fires on that window read.
/// - RTS pulls $01FE then $01FF, so the trigger fires on the stack byte,
///   which comes from RIOT RAM.
///
/// Writes to $01FF and window writes leave the trigger armed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activision {
    bank: usize,
    armed: bool,
}

impl Activision {
    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    fn fire(&mut self, data: u8, source: &str) {
        let bank = if data & 0x20 != 0 { 0 } else { 1 };
        log(LogCategory::Cartridge, LogLevel::Debug, || {
            format!("FE: {} byte ${:02X} -> bank {}", source, data, bank)
        });
        self.bank = bank;
        self.armed = false;
    }

    pub fn snoop(&mut self, addr: u16, cycle: BusCycle, ram: &SharedIoRam) {
        match (addr, cycle) {
            (0x01FE, _) => self.armed = true,
            (0x01FF, BusCycle::Fetch | BusCycle::Read) if self.armed => {
                self.fire(ram.read(addr), "stack");
            }
            _ => {}
        }
    }

    pub fn on_access(
        &mut self,
        image: &CartridgeImage,
        offset: usize,
        cycle: BusCycle,
        side_effects: SideEffects,
    ) -> Option<u8> {
        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => {
                // The byte comes from the old bank; the switch applies after it
                let byte = image.read_rom(BANK_SIZE, self.bank, offset);
                if self.armed && side_effects.enabled() {
                    self.fire(byte, "ROM");
                }
                Some(byte)
            }
        }
    }
}
