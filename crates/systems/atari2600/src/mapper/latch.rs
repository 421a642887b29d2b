use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const BANK_SIZE: usize = 0x1000;

/// Write-triggered 4K banking: every write into the window latches the low
/// address bits as the new bank number, whatever the data and wherever in the
/// window it lands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Latch {
    bank: usize,
}

impl Latch {
    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn on_access(
        &mut self,
        image: &CartridgeImage,
        offset: usize,
        cycle: BusCycle,
        side_effects: SideEffects,
    ) -> Option<u8> {
        match cycle {
            BusCycle::Write(_) => {
                if side_effects.enabled() {
                    let bank = offset % image.bank_count(BANK_SIZE);
                    log(LogCategory::Cartridge, LogLevel::Debug, || {
                        format!("Latch ${:04X}: bank {} -> {}", 0x1000 + offset, self.bank, bank)
                    });
                    self.bank = bank;
                }
                None
            }
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(BANK_SIZE, self.bank, offset)),
        }
    }
}
