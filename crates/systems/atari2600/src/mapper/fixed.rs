use emu_core::BusCycle;
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

/// 2K/4K cartridges: the ROM is wired straight to the connector
///
/// A 2K chip ignores A11, so it shows up twice in the window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixed;

impl Fixed {
    pub fn on_access(&self, image: &CartridgeImage, offset: usize, cycle: BusCycle) -> Option<u8> {
        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(0x1000, 0, offset)),
        }
    }
}

/// Commavid (CV): 2K ROM at $1800 plus 1K of RAM
///
/// - $1000-$13FF: RAM read port
/// - $1400-$17FF: RAM write port
/// - $1800-$1FFF: ROM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commavid {
    ram: Vec<u8>,
}

impl Default for Commavid {
    fn default() -> Self {
        Self::new()
    }
}

impl Commavid {
    pub fn new() -> Self {
        Self { ram: vec![0; 0x400] }
    }

    pub(super) fn check_state(&self, fresh: &Self) -> Result<(), String> {
        if self.ram.len() != fresh.ram.len() {
            return Err(format!("CV RAM is {} bytes, expected {}", self.ram.len(), fresh.ram.len()));
        }
        Ok(())
    }

    pub fn on_access(&mut self, image: &CartridgeImage, offset: usize, cycle: BusCycle) -> Option<u8> {
        match cycle {
            BusCycle::Write(val) => {
                if (0x400..0x800).contains(&offset) {
                    self.ram[offset & 0x3FF] = val;
                }
                None
            }
            BusCycle::Fetch | BusCycle::Read => {
                if offset < 0x400 {
                    Some(self.ram[offset])
                } else {
                    Some(image.read_rom(0x800, 0, offset & 0x7FF))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::MappingScheme;

    #[test]
    fn test_2k_mirrors_in_window() {
        let mut rom = vec![0; 2048];
        rom[0] = 0x12;
        rom[0x7FF] = 0x34;
        let image = CartridgeImage::new(MappingScheme::Rom2K, rom).unwrap();

        assert_eq!(Fixed.on_access(&image, 0x000, BusCycle::Read), Some(0x12));
        assert_eq!(Fixed.on_access(&image, 0x800, BusCycle::Read), Some(0x12));
        assert_eq!(Fixed.on_access(&image, 0xFFF, BusCycle::Fetch), Some(0x34));
        assert_eq!(Fixed.on_access(&image, 0x000, BusCycle::Write(0)), None);
    }

    #[test]
    fn test_commavid_ram_ports() {
        let mut rom = vec![0; 2048];
        rom[0x7FC] = 0xF0;
        let image = CartridgeImage::new(MappingScheme::Commavid, rom).unwrap();
        let mut cv = Commavid::new();

        cv.on_access(&image, 0x410, BusCycle::Write(0x5A));
        assert_eq!(cv.on_access(&image, 0x010, BusCycle::Read), Some(0x5A));

        // Writes to the read port are ignored
        cv.on_access(&image, 0x010, BusCycle::Write(0xFF));
        assert_eq!(cv.on_access(&image, 0x010, BusCycle::Read), Some(0x5A));

        assert_eq!(cv.on_access(&image, 0xFFC, BusCycle::Read), Some(0xF0));
    }
}
