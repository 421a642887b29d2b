use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const SLICE_SIZE: usize = 0x400;

/// Parker Brothers E0: 8K split into eight 1K banks, shown through four 1K
/// slices of the window.
///
/// Hotspots $1FE0-$1FE7 pick the bank for slice 0, $1FE8-$1FEF for slice 1
/// and $1FF0-$1FF7 for slice 2. Slice 3 ($1C00-$1FFF) always shows the last
/// bank, which keeps the hotspots and vectors reachable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct E0 {
    slices: [usize; 4],
}

impl Default for E0 {
    fn default() -> Self {
        Self::new()
    }
}

impl E0 {
    pub fn new() -> Self {
        Self {
            slices: [4, 5, 6, 7],
        }
    }

    pub fn slices(&self) -> [usize; 4] {
        self.slices
    }

    fn switch(&mut self, offset: usize) {
        if (0xFE0..0xFF8).contains(&offset) {
            let slice = (offset - 0xFE0) >> 3;
            let bank = offset & 0x07;
            log(LogCategory::Cartridge, LogLevel::Debug, || {
                format!("E0: slice {} -> bank {}", slice, bank)
            });
            self.slices[slice] = bank;
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
        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => {
                let slice = offset / SLICE_SIZE;
                let bank = if slice == 3 {
                    image.last_bank(SLICE_SIZE)
                } else {
                    self.slices[slice]
                };
                Some(image.read_rom(SLICE_SIZE, bank, offset))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::MappingScheme;

    fn image() -> CartridgeImage {
        let mut rom = vec![0; 8 * SLICE_SIZE];
        for bank in 0..8 {
            rom[bank * SLICE_SIZE..(bank + 1) * SLICE_SIZE].fill(0xE0 + bank as u8);
        }
        CartridgeImage::new(MappingScheme::E0, rom).unwrap()
    }

    fn read(e0: &mut E0, image: &CartridgeImage, offset: usize) -> Option<u8> {
        e0.on_access(image, offset, BusCycle::Read, SideEffects::Enabled)
    }

    #[test]
    fn test_power_on_slices() {
        let image = image();
        let mut e0 = E0::new();
        assert_eq!(read(&mut e0, &image, 0x000), Some(0xE4));
        assert_eq!(read(&mut e0, &image, 0x400), Some(0xE5));
        assert_eq!(read(&mut e0, &image, 0x800), Some(0xE6));
        assert_eq!(read(&mut e0, &image, 0xC00), Some(0xE7));
    }

    #[test]
    fn test_each_slice_switches_independently() {
        let image = image();
        let mut e0 = E0::new();

        read(&mut e0, &image, 0xFE2);
        e0.on_access(&image, 0xFEB, BusCycle::Write(0), SideEffects::Enabled);
        read(&mut e0, &image, 0xFF1);

        assert_eq!(e0.slices(), [2, 3, 1, 7]);
        assert_eq!(read(&mut e0, &image, 0x0FF), Some(0xE2));
        assert_eq!(read(&mut e0, &image, 0x4FF), Some(0xE3));
        assert_eq!(read(&mut e0, &image, 0x8FF), Some(0xE1));
        assert_eq!(read(&mut e0, &image, 0xCFF), Some(0xE7));
    }

    #[test]
    fn test_debugger_read_does_not_switch() {
        let image = image();
        let mut e0 = E0::new();
        e0.on_access(&image, 0xFE0, BusCycle::Read, SideEffects::Disabled);
        assert_eq!(e0.slices(), [4, 5, 6, 7]);
    }
}
