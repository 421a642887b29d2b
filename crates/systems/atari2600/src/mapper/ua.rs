use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::BusCycle;
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const BANK_SIZE: usize = 0x1000;

/// UA Limited: 8K in two 4K banks, switched by touching $0220 (bank 0) or
/// $0240 (bank 1).
///
/// The board decodes $0200-$027F with A6 as the bank bit. Those addresses
/// belong to a TIA mirror, so the TIA still answers the cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UaLtd {
    bank: usize,
}

impl UaLtd {
    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn snoop(&mut self, addr: u16) {
        if (0x0200..=0x027F).contains(&addr) {
            let bank = ((addr - 0x0200) >> 6) as usize;
            if bank != self.bank {
                log(LogCategory::Cartridge, LogLevel::Debug, || {
                    format!("UA ${:04X}: bank {} -> {}", addr, self.bank, bank)
                });
            }
            self.bank = bank;
        }
    }

    pub fn on_access(&self, image: &CartridgeImage, offset: usize, cycle: BusCycle) -> Option<u8> {
        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(BANK_SIZE, self.bank, offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_addresses() {
        let mut ua = UaLtd::default();
        ua.snoop(0x0240);
        assert_eq!(ua.bank(), 1);
        ua.snoop(0x0220);
        assert_eq!(ua.bank(), 0);
        ua.snoop(0x027F);
        assert_eq!(ua.bank(), 1);

        // Outside the decoded range
        ua.snoop(0x0020);
        ua.snoop(0x0280);
        assert_eq!(ua.bank(), 1);
    }
}
