use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::BusCycle;
use serde::{Deserialize, Serialize};

use crate::cartridge::CartridgeImage;

const BANK_SIZE: usize = 0x800;
const RAM_BANK_SIZE: usize = 0x400;
const RAM_BANKS: usize = 32;

/// Tigervision 3F and its RAM-carrying 3E extension.
///
/// The board listens to writes at $00-$3F, which is TIA territory: the TIA
/// takes the write as usual and the cartridge latches the data byte as the
/// 2K bank for $1000-$17FF. $1800-$1FFF is fixed to the last bank.
///
/// 3E only reacts to $3F for ROM and uses $3E to map one of 32 1K RAM banks
/// over $1000-$17FF (read $1000-$13FF, write $1400-$17FF). Selecting a ROM
/// bank again unmaps the RAM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tigervision {
    bank: usize,
    ram_bank: Option<usize>,
    ram: Option<Vec<u8>>,
}

impl Tigervision {
    pub fn new_3f() -> Self {
        Self {
            bank: 0,
            ram_bank: None,
            ram: None,
        }
    }

    pub fn new_3e() -> Self {
        Self {
            bank: 0,
            ram_bank: None,
            ram: Some(vec![0; RAM_BANKS * RAM_BANK_SIZE]),
        }
    }

    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn ram_bank(&self) -> Option<usize> {
        self.ram_bank
    }

    pub(super) fn check_state(&self, fresh: &Self) -> Result<(), String> {
        let len = |ram: &Option<Vec<u8>>| ram.as_ref().map(Vec::len);
        if len(&self.ram) != len(&fresh.ram) {
            return Err("3E RAM size does not match the board".to_string());
        }
        match self.ram_bank {
            Some(bank) if bank >= RAM_BANKS => Err(format!("3E RAM bank {} out of range", bank)),
            _ => Ok(()),
        }
    }

    fn select_rom(&mut self, image: &CartridgeImage, data: u8) {
        let bank = data as usize % image.bank_count(BANK_SIZE);
        log(LogCategory::Cartridge, LogLevel::Debug, || {
            format!("3F: bank {} -> {} (data ${:02X})", self.bank, bank, data)
        });
        self.bank = bank;
        self.ram_bank = None;
    }

    /// Observe a cycle on the raw 13-bit bus
    pub fn snoop(&mut self, image: &CartridgeImage, addr: u16, cycle: BusCycle) {
        let BusCycle::Write(data) = cycle else {
            return;
        };
        match (addr, self.ram.is_some()) {
            (0x0000..=0x003F, false) | (0x003F, true) => self.select_rom(image, data),
            (0x003E, true) => {
                let bank = data as usize % RAM_BANKS;
                log(LogCategory::Cartridge, LogLevel::Debug, || {
                    format!("3E: RAM bank {}", bank)
                });
                self.ram_bank = Some(bank);
            }
            _ => {}
        }
    }

    pub fn on_access(&mut self, image: &CartridgeImage, offset: usize, cycle: BusCycle) -> Option<u8> {
        if offset >= BANK_SIZE {
            return match cycle {
                BusCycle::Write(_) => None,
                BusCycle::Fetch | BusCycle::Read => {
                    Some(image.read_rom(BANK_SIZE, image.last_bank(BANK_SIZE), offset))
                }
            };
        }

        if let (Some(ram_bank), Some(ram)) = (self.ram_bank, self.ram.as_mut()) {
            let idx = ram_bank * RAM_BANK_SIZE + (offset & 0x3FF);
            match cycle {
                BusCycle::Write(val) if offset >= RAM_BANK_SIZE => ram[idx] = val,
                BusCycle::Fetch | BusCycle::Read if offset < RAM_BANK_SIZE => return Some(ram[idx]),
                _ => {}
            }
        }

        match cycle {
            BusCycle::Write(_) => None,
            BusCycle::Fetch | BusCycle::Read => Some(image.read_rom(BANK_SIZE, self.bank, offset)),
        }
    }
}
