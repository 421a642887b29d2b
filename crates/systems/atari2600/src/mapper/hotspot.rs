use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const BANK_SIZE: usize = 0x1000;

/// Atari "F" family: 4K banks selected by touching a hotspot near the top of
/// the window.
///
/// | scheme | banks | hotspots      |
/// |--------|-------|---------------|
/// | F8     | 2     | $1FF8-$1FF9   |
/// | F6     | 4     | $1FF6-$1FF9   |
/// | F4     | 8     | $1FF4-$1FFB   |
/// | FA     | 3     | $1FF8-$1FFA   |
///
/// Hotspots fire on reads as well as writes; the byte returned by the access
/// already comes from the newly selected bank.
///
/// Optional on-cart RAM sits at the bottom of the window with a write port
/// followed by a read port of the same size: 128 bytes for Super Chip boards
/// ($1000-$107F write, $1080-$10FF read), 256 bytes for CBS RAM Plus (FA).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    bank: usize,
    first_hotspot: usize,
    hotspots: usize,
    ram: Option<Vec<u8>>,
}

impl Hotspot {
    pub fn new(first_hotspot: usize, hotspots: usize, start_bank: usize, ram_size: usize) -> Self {
        Self {
            bank: start_bank,
            first_hotspot,
            hotspots,
            ram: (ram_size > 0).then(|| vec![0; ram_size]),
        }
    }

    pub fn f8(start_bank: usize) -> Self {
        Self::new(0xFF8, 2, start_bank, 0)
    }

    pub fn f6() -> Self {
        Self::new(0xFF6, 4, 0, 0)
    }

    pub fn f4() -> Self {
        Self::new(0xFF4, 8, 0, 0)
    }

    pub fn fa() -> Self {
        Self::new(0xFF8, 3, 0, 256)
    }

    /// Add 128 bytes of Super Chip RAM
    pub fn with_super_chip(mut self) -> Self {
        self.ram = Some(vec![0; 128]);
        self
    }

    pub fn bank(&self) -> usize {
        self.bank
    }

    pub(super) fn check_state(&self, fresh: &Self) -> Result<(), String> {
        if (self.first_hotspot, self.hotspots) != (fresh.first_hotspot, fresh.hotspots) {
            return Err("hotspot layout does not match the board".to_string());
        }
        if self.bank >= self.hotspots {
            return Err(format!("bank {} out of range", self.bank));
        }
        let len = |ram: &Option<Vec<u8>>| ram.as_ref().map(Vec::len);
        if len(&self.ram) != len(&fresh.ram) {
            return Err("cartridge RAM size does not match the board".to_string());
        }
        Ok(())
    }

    fn switch(&mut self, offset: usize) {
        if (self.first_hotspot..self.first_hotspot + self.hotspots).contains(&offset) {
            let bank = offset - self.first_hotspot;
            if bank != self.bank {
                log(LogCategory::Cartridge, LogLevel::Debug, || {
                    format!("Hotspot ${:04X}: bank {} -> {}", 0x1000 + offset, self.bank, bank)
                });
            }
            self.bank = bank;
        }
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

        if let Some(ram) = self.ram.as_mut() {
            let size = ram.len();
            if offset < size {
                // Write port; a read here has nothing driving the bus
                if let BusCycle::Write(val) = cycle {
                    ram[offset] = val;
                }
                return None;
            }
            if offset < size * 2 {
                return match cycle {
                    BusCycle::Write(_) => None,
                    BusCycle::Fetch | BusCycle::Read => Some(ram[offset - size]),
                };
            }
        }

        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(BANK_SIZE, self.bank, offset)),
        }
    }
}
