use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const BANK_SIZE: usize = 0x800;
const LOW_RAM_SIZE: usize = 0x400;
const PAGE_SIZE: usize = 0x100;

/// M-Network E7: 16K of ROM in 2K banks plus 2K of RAM.
///
/// ```text
/// $1000-$17FF  ROM bank 0-6, or 1K RAM (write $1000-$13FF, read $1400-$17FF)
/// $1800-$19FF  256-byte RAM page (write $1800-$18FF, read $1900-$19FF)
/// $1A00-$1FFF  last 1.5K of the final bank
/// ```
///
/// Hotspots: $1FE0-$1FE6 select a ROM bank for the low segment, $1FE7
/// replaces it with the 1K RAM, $1FE8-$1FEB pick one of four RAM pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct E7 {
    rom_bank: usize,
    ram_enabled: bool,
    ram_page: usize,
    ram: Vec<u8>,
}

impl Default for E7 {
    fn default() -> Self {
        Self::new()
    }
}

impl E7 {
    pub fn new() -> Self {
        Self {
            rom_bank: 0,
            ram_enabled: false,
            ram_page: 0,
            ram: vec![0; LOW_RAM_SIZE + 4 * PAGE_SIZE],
        }
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank
    }

    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    pub fn ram_page(&self) -> usize {
        self.ram_page
    }

    pub(super) fn check_state(&self, fresh: &Self) -> Result<(), String> {
        if self.ram.len() != fresh.ram.len() {
            return Err(format!("E7 RAM is {} bytes, expected {}", self.ram.len(), fresh.ram.len()));
        }
        if self.ram_page >= 4 || self.rom_bank >= 7 {
            return Err(format!(
                "E7 ROM bank {} / RAM page {} out of range",
                self.rom_bank, self.ram_page
            ));
        }
        Ok(())
    }

    fn switch(&mut self, offset: usize) {
        match offset {
            0xFE7 => {
                log(LogCategory::Cartridge, LogLevel::Debug, || "E7: low segment -> RAM".to_string());
                self.ram_enabled = true;
            }
            0xFE0..=0xFE6 => {
                let bank = offset & 0x07;
                log(LogCategory::Cartridge, LogLevel::Debug, || {
                    format!("E7: low segment -> ROM bank {}", bank)
                });
                self.rom_bank = bank;
                self.ram_enabled = false;
            }
            0xFE8..=0xFEB => {
                self.ram_page = offset & 0x03;
                log(LogCategory::Cartridge, LogLevel::Debug, || {
                    format!("E7: RAM page {}", self.ram_page)
                });
            }
            _ => {}
        }
    }

    fn page_index(&self, offset: usize) -> usize {
        LOW_RAM_SIZE + self.ram_page * PAGE_SIZE + (offset & 0xFF)
    }

    pub fn on_access(
        &mut self,
        image: &CartridgeImage,
        offset: usize,
        cycle: BusCycle,
        side_effects: SideEffects,
    ) -> Option<u8> {
        if side_effects.enabled() {
            self.switch(offset);
        }

        match (offset, cycle) {
            (0x000..=0x7FF, BusCycle::Write(val)) => {
                if self.ram_enabled && offset < LOW_RAM_SIZE {
                    self.ram[offset] = val;
                }
                None
            }
            (0x000..=0x7FF, _) => {
                if !self.ram_enabled {
                    Some(image.read_rom(BANK_SIZE, self.rom_bank, offset))
                } else if offset >= LOW_RAM_SIZE {
                    Some(self.ram[offset & 0x3FF])
                } else {
                    None
                }
            }
            (0x800..=0x8FF, BusCycle::Write(val)) => {
                let idx = self.page_index(offset);
                self.ram[idx] = val;
                None
            }
            (0x800..=0x8FF, _) => None,
            (0x900..=0x9FF, BusCycle::Write(_)) => None,
            (0x900..=0x9FF, _) => Some(self.ram[self.page_index(offset)]),
            (_, BusCycle::Write(_)) => None,
            (_, _) => Some(image.read_rom(BANK_SIZE, image.last_bank(BANK_SIZE), offset & 0x7FF)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::MappingScheme;

    fn image() -> CartridgeImage {
        let mut rom = vec![0; 8 * BANK_SIZE];
        for bank in 0..8 {
            rom[bank * BANK_SIZE..(bank + 1) * BANK_SIZE].fill(0x70 + bank as u8);
        }
        CartridgeImage::new(MappingScheme::E7, rom).unwrap()
    }

    fn read(e7: &mut E7, image: &CartridgeImage, offset: usize) -> Option<u8> {
        e7.on_access(image, offset, BusCycle::Read, SideEffects::Enabled)
    }

    fn write(e7: &mut E7, image: &CartridgeImage, offset: usize, val: u8) {
        e7.on_access(image, offset, BusCycle::Write(val), SideEffects::Enabled);
    }

    #[test]
    fn test_rom_bank_select() {
        let image = image();
        let mut e7 = E7::new();

        assert_eq!(read(&mut e7, &image, 0x000), Some(0x70));
        read(&mut e7, &image, 0xFE5);
        assert_eq!(read(&mut e7, &image, 0x7FF), Some(0x75));
        // Fixed upper area always shows the last bank
        assert_eq!(read(&mut e7, &image, 0xA00), Some(0x77));
        assert_eq!(read(&mut e7, &image, 0xFFF), Some(0x77));
    }

    #[test]
    fn test_low_ram_overlay() {
        let image = image();
        let mut e7 = E7::new();

        // RAM disabled: writes to the low segment go nowhere
        write(&mut e7, &image, 0x010, 0x99);
        read(&mut e7, &image, 0xFE7);
        assert!(e7.ram_enabled());
        assert_eq!(read(&mut e7, &image, 0x410), Some(0x00));

        write(&mut e7, &image, 0x010, 0x42);
        assert_eq!(read(&mut e7, &image, 0x410), Some(0x42));
        assert_eq!(read(&mut e7, &image, 0x010), None);

        // Selecting a ROM bank hides the RAM but keeps its contents
        read(&mut e7, &image, 0xFE1);
        assert_eq!(read(&mut e7, &image, 0x410), Some(0x71));
        read(&mut e7, &image, 0xFE7);
        assert_eq!(read(&mut e7, &image, 0x410), Some(0x42));
    }

    #[test]
    fn test_ram_pages_are_separate() {
        let image = image();
        let mut e7 = E7::new();

        for page in 0..4 {
            read(&mut e7, &image, 0xFE8 + page);
            write(&mut e7, &image, 0x820, 0xA0 + page as u8);
        }
        for page in 0..4 {
            read(&mut e7, &image, 0xFE8 + page);
            assert_eq!(e7.ram_page(), page);
            assert_eq!(read(&mut e7, &image, 0x920), Some(0xA0 + page as u8));
        }
    }
}
