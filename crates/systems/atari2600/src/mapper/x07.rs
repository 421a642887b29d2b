use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const BANK_SIZE: usize = 0x1000;

/// X07: 64K in sixteen 4K banks with no hotspot of its own.
///
/// The board decodes every cycle on the lower half of the bus:
///
/// ```text
/// A12         A0
/// 0 1xxx nnnn 1101   switch to bank n
/// 0 0xxx 0nxx xxxx   switch to bank 111n, only while in bank 14 or 15
/// ```
///
/// TIA and RIOT still answer those cycles; the cartridge just watches. Writes
/// into the window are decoded the same way on their low 12 bits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct X07 {
    bank: usize,
}

impl X07 {
    pub fn bank(&self) -> usize {
        self.bank
    }

    fn switch(&mut self, addr: u16) {
        let a = addr & 0x0FFF;
        let bank = if a & 0x180F == 0x080D {
            ((a & 0x00F0) >> 4) as usize
        } else if a & 0x1880 == 0 && self.bank & 0x0E == 0x0E {
            ((a & 0x0040) >> 6) as usize | 0x0E
        } else {
            return;
        };
        if bank != self.bank {
            log(LogCategory::Cartridge, LogLevel::Debug, || {
                format!("X07 ${:04X}: bank {} -> {}", addr, self.bank, bank)
            });
        }
        self.bank = bank;
    }

    pub fn snoop(&mut self, addr: u16) {
        if addr < 0x1000 {
            self.switch(addr);
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
            BusCycle::Write(_) => {
                if side_effects.enabled() {
                    self.switch(offset as u16);
                }
                None
            }
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(BANK_SIZE, self.bank, offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_bank_pattern() {
        let mut x07 = X07::default();
        x07.snoop(0x08AD);
        assert_eq!(x07.bank(), 0xA);
        x07.snoop(0x0F3D);
        assert_eq!(x07.bank(), 0x3);
    }

    #[test]
    fn test_high_pair_pattern_only_from_14_or_15() {
        let mut x07 = X07::default();

        // Bank 0: the second pattern is ignored
        x07.snoop(0x0040);
        assert_eq!(x07.bank(), 0);

        x07.snoop(0x08ED);
        assert_eq!(x07.bank(), 14);
        x07.snoop(0x0040);
        assert_eq!(x07.bank(), 15);
        x07.snoop(0x0000);
        assert_eq!(x07.bank(), 14);

        // A7 set (RIOT RAM) does not match
        x07.snoop(0x00C0);
        assert_eq!(x07.bank(), 14);
    }

    #[test]
    fn test_window_write_uses_low_bits() {
        let image =
            CartridgeImage::new(crate::cartridge::MappingScheme::X07, vec![0; 16 * BANK_SIZE]).unwrap();
        let mut x07 = X07::default();

        x07.on_access(&image, 0x85D, BusCycle::Write(0), SideEffects::Enabled);
        assert_eq!(x07.bank(), 5);

        // Reads in the window never switch
        x07.on_access(&image, 0x86D, BusCycle::Read, SideEffects::Enabled);
        assert_eq!(x07.bank(), 5);

        x07.on_access(&image, 0x86D, BusCycle::Write(0), SideEffects::Disabled);
        assert_eq!(x07.bank(), 5);
    }
}
