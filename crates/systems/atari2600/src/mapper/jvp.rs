use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;
use crate::region;

const BANK_SIZE: usize = 0x1000;

/// First RIOT RAM byte shown through the overlay
const OVERLAY_RAM_BASE: u16 = 0x00A0;

/// JVP: 8K in two 4K banks.
///
/// $1FFA selects bank 0 and $1FFB bank 1. The board also decodes
/// $0FA0-$0FC0, a range no console chip answers: any access to $0FA0 or
/// $0FC0 flips the bank, and the whole range is wired to RIOT RAM
/// $A0-$C0, so the cartridge and the RAM see the same cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jvp {
    bank: usize,
}

impl Jvp {
    pub fn bank(&self) -> usize {
        self.bank
    }

    fn select(&mut self, bank: usize, addr: u16) {
        if bank != self.bank {
            log(LogCategory::Cartridge, LogLevel::Debug, || {
                format!("JVP ${:04X}: bank {} -> {}", addr, self.bank, bank)
            });
        }
        self.bank = bank;
    }

    pub fn snoop(&mut self, addr: u16) {
        if matches!(addr, 0x0FA0 | 0x0FC0) {
            self.select(self.bank ^ 1, addr);
        }
    }

    /// RIOT RAM address answering `addr` through the board's overlay
    pub fn riot_overlay(addr: u16) -> Option<u16> {
        region::JVP_RIOT_OVERLAY
            .canonical(addr)
            .map(|canonical| OVERLAY_RAM_BASE + (canonical - region::JVP_RIOT_OVERLAY.base()))
    }

    pub fn on_access(
        &mut self,
        image: &CartridgeImage,
        offset: usize,
        cycle: BusCycle,
        side_effects: SideEffects,
    ) -> Option<u8> {
        if side_effects.enabled() {
            match offset {
                0xFFA => self.select(0, 0x1FFA),
                0xFFB => self.select(1, 0x1FFB),
                _ => {}
            }
        }
        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(BANK_SIZE, self.bank, offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::MappingScheme;

    fn image() -> CartridgeImage {
        let mut rom = vec![0x10; BANK_SIZE];
        rom.extend(vec![0x11; BANK_SIZE]);
        CartridgeImage::new(MappingScheme::Jvp, rom).unwrap()
    }

    #[test]
    fn test_window_hotspots() {
        let image = image();
        let mut jvp = Jvp::default();

        assert_eq!(jvp.on_access(&image, 0xFFB, BusCycle::Read, SideEffects::Enabled), Some(0x11));
        assert_eq!(jvp.bank(), 1);
        jvp.on_access(&image, 0xFFA, BusCycle::Write(0), SideEffects::Enabled);
        assert_eq!(jvp.bank(), 0);

        // Debugger reads leave the bank alone
        jvp.on_access(&image, 0xFFB, BusCycle::Read, SideEffects::Disabled);
        assert_eq!(jvp.bank(), 0);
    }

    #[test]
    fn test_overlay_hotspots_toggle() {
        let mut jvp = Jvp::default();
        jvp.snoop(0x0FA0);
        assert_eq!(jvp.bank(), 1);
        jvp.snoop(0x0FC0);
        assert_eq!(jvp.bank(), 0);
        jvp.snoop(0x0FB0);
        assert_eq!(jvp.bank(), 0);
    }

    #[test]
    fn test_overlay_maps_to_riot_ram() {
        assert_eq!(Jvp::riot_overlay(0x0FA0), Some(0x00A0));
        assert_eq!(Jvp::riot_overlay(0x0FC0), Some(0x00C0));
        assert_eq!(Jvp::riot_overlay(0x0F9F), None);
        assert_eq!(Jvp::riot_overlay(0x0FC1), None);
    }
}
