//! Atari 2600 cartridge image and banking scheme selection
//!
//! The cartridge connector only exposes A0-A11 plus A12 as the chip select, so
//! every cartridge sees a 4K window at $1000-$1FFF. Anything larger than 4K
//! needs bank switching logic on the cartridge board, and there is no header
//! describing it: the scheme has to be declared by whoever supplies the image
//! (software list, user override) or guessed from the ROM size.

use std::str::FromStr;

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, SideEffects};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapper::Mapper;
use crate::ram::SharedIoRam;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("Invalid ROM size: {0} bytes")]
    InvalidSize(usize),
    #[error("Unknown banking scheme: {0}")]
    UnknownScheme(String),
    #[error("Unsupported banking scheme: {0}")]
    UnsupportedScheme(String),
}

/// Banking scheme types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingScheme {
    /// 2K ROM (no banking, mirrored twice in the window)
    Rom2K,
    /// 4K ROM (no banking)
    Rom4K,
    /// Commavid: 2K ROM plus 1K RAM
    Commavid,
    /// 8K F8 banking (2x 4K banks), powers up in bank 1
    F8,
    /// F8 with the power-on bank swapped to bank 0
    F8Swapped,
    /// 16K F6 banking (4x 4K banks)
    F6,
    /// 32K F4 banking (8x 4K banks)
    F4,
    /// F8 with 128 bytes of Super Chip RAM
    F8SuperChip,
    /// F6 with 128 bytes of Super Chip RAM
    F6SuperChip,
    /// F4 with 128 bytes of Super Chip RAM
    F4SuperChip,
    /// 12K CBS RAM Plus (3x 4K banks, 256 bytes RAM)
    FA,
    /// Any write in the window latches a 4K bank from the address
    Latch,
    /// Parker Brothers: four 1K slices
    E0,
    /// M-Network: 2K banks plus paged RAM
    E7,
    /// Tigervision: 2K banks selected by writes to $00-$3F
    Tigervision3F,
    /// 3F with 1K RAM banks selected through $3E
    Tigervision3E,
    /// Activision: bank chosen by the stack byte after an access to $01FE
    Activision,
    /// UA Limited: bank chosen by accesses to $0220/$0240
    UaLtd,
    /// X07: 16x 4K banks selected by snooping the whole lower half
    X07,
    /// JVP: 2x 4K banks, with RIOT RAM showing through $0FA0-$0FC0
    Jvp,
}

/// Identifiers known from software lists that this core does not emulate
const UNSUPPORTED_SCHEMES: &[&str] = &[
    "dpc", "ss", "cm", "harmony", "4in1", "8in1", "32in1", "dc", "fv",
];

impl FromStr for MappingScheme {
    type Err = CartridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let id = lower.strip_prefix("a26_").unwrap_or(&lower);
        let scheme = match id {
            "2k" => MappingScheme::Rom2K,
            "4k" => MappingScheme::Rom4K,
            "cv" => MappingScheme::Commavid,
            "f8" => MappingScheme::F8,
            "f8sw" => MappingScheme::F8Swapped,
            "f6" => MappingScheme::F6,
            "f4" => MappingScheme::F4,
            "f8sc" => MappingScheme::F8SuperChip,
            "f6sc" => MappingScheme::F6SuperChip,
            "f4sc" => MappingScheme::F4SuperChip,
            "fa" => MappingScheme::FA,
            "latch" => MappingScheme::Latch,
            "e0" => MappingScheme::E0,
            "e7" => MappingScheme::E7,
            "3f" => MappingScheme::Tigervision3F,
            "3e" => MappingScheme::Tigervision3E,
            "fe" => MappingScheme::Activision,
            "ua" => MappingScheme::UaLtd,
            "x07" => MappingScheme::X07,
            "jvp" => MappingScheme::Jvp,
            _ if UNSUPPORTED_SCHEMES.contains(&id) => {
                log(LogCategory::Cartridge, LogLevel::Error, || {
                    format!("Cartridge: banking scheme '{}' is not emulated", s)
                });
                return Err(CartridgeError::UnsupportedScheme(s.to_string()));
            }
            _ => {
                log(LogCategory::Cartridge, LogLevel::Error, || {
                    format!("Cartridge: unknown banking scheme '{}'", s)
                });
                return Err(CartridgeError::UnknownScheme(s.to_string()));
            }
        };
        Ok(scheme)
    }
}

impl MappingScheme {
    /// Guess the banking scheme from the ROM size
    ///
    /// 16K images are ambiguous (F6 and E7 share the size); F6 is by far the
    /// more common so it wins.
    pub fn detect(rom: &[u8]) -> Result<Self, CartridgeError> {
        match rom.len() {
            2048 => Ok(MappingScheme::Rom2K),
            4096 => Ok(MappingScheme::Rom4K),
            8192 => Ok(MappingScheme::F8),
            12288 => Ok(MappingScheme::FA),
            16384 => Ok(MappingScheme::F6),
            32768 => Ok(MappingScheme::F4),
            65536 => Ok(MappingScheme::X07),
            _ => Err(CartridgeError::InvalidSize(rom.len())),
        }
    }

    /// Size of one switchable ROM bank
    pub fn bank_size(self) -> usize {
        match self {
            MappingScheme::E0 => 0x400,
            MappingScheme::Rom2K
            | MappingScheme::Commavid
            | MappingScheme::E7
            | MappingScheme::Tigervision3F
            | MappingScheme::Tigervision3E => 0x800,
            _ => 0x1000,
        }
    }

    /// Canonical short identifier
    pub fn id(self) -> &'static str {
        match self {
            MappingScheme::Rom2K => "2k",
            MappingScheme::Rom4K => "4k",
            MappingScheme::Commavid => "cv",
            MappingScheme::F8 => "f8",
            MappingScheme::F8Swapped => "f8sw",
            MappingScheme::F6 => "f6",
            MappingScheme::F4 => "f4",
            MappingScheme::F8SuperChip => "f8sc",
            MappingScheme::F6SuperChip => "f6sc",
            MappingScheme::F4SuperChip => "f4sc",
            MappingScheme::FA => "fa",
            MappingScheme::Latch => "latch",
            MappingScheme::E0 => "e0",
            MappingScheme::E7 => "e7",
            MappingScheme::Tigervision3F => "3f",
            MappingScheme::Tigervision3E => "3e",
            MappingScheme::Activision => "fe",
            MappingScheme::UaLtd => "ua",
            MappingScheme::X07 => "x07",
            MappingScheme::Jvp => "jvp",
        }
    }
}

/// Immutable ROM contents plus the scheme they were declared with
#[derive(Debug, Clone)]
pub struct CartridgeImage {
    scheme: MappingScheme,
    rom: Vec<u8>,
}

impl CartridgeImage {
    pub fn new(scheme: MappingScheme, rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if rom.is_empty() {
            return Err(CartridgeError::InvalidSize(0));
        }
        Ok(Self { scheme, rom })
    }

    pub fn scheme(&self) -> MappingScheme {
        self.scheme
    }

    /// Get ROM size
    pub fn size(&self) -> usize {
        self.rom.len()
    }

    /// Number of banks of `bank_size` bytes; short images count as one bank
    pub fn bank_count(&self, bank_size: usize) -> usize {
        std::cmp::max(1, self.rom.len() / bank_size)
    }

    pub fn last_bank(&self, bank_size: usize) -> usize {
        self.bank_count(bank_size) - 1
    }

    /// Read a byte from a bank.
    ///
    /// Bank indices past the end alias back into the image the way missing
    /// address lines do on real boards.
    #[inline]
    pub fn read_rom(&self, bank_size: usize, bank: usize, offset: usize) -> u8 {
        let bank = bank % self.bank_count(bank_size);
        let idx = bank * bank_size + offset % bank_size;
        self.rom[idx % self.rom.len()]
    }
}

/// Atari 2600 cartridge: image plus live banking state
#[derive(Debug, Clone)]
pub struct Cartridge {
    image: CartridgeImage,
    mapper: Mapper,
}

impl Cartridge {
    pub fn new(image: CartridgeImage) -> Self {
        let mapper = Mapper::new(&image);
        log(LogCategory::Cartridge, LogLevel::Info, || {
            format!(
                "Cartridge: {} KB image, scheme {}, {} bank(s)",
                image.size() / 1024,
                image.scheme().id(),
                image.bank_count(image.scheme().bank_size())
            )
        });
        Self { image, mapper }
    }

    /// Return banking state to its power-on value
    pub fn reset(&mut self) {
        self.mapper = Mapper::new(&self.image);
    }

    /// Access inside the $1000-$1FFF window
    #[inline]
    pub fn access(&mut self, addr: u16, cycle: BusCycle, side_effects: SideEffects) -> Option<u8> {
        self.mapper.on_access(&self.image, addr, cycle, side_effects)
    }

    /// RIOT RAM address the board maps over an undecoded `addr`
    #[inline]
    pub fn riot_overlay(&self, addr: u16) -> Option<u16> {
        self.mapper.riot_overlay(addr)
    }

    /// Let the banking logic observe a cycle outside its window
    #[inline]
    pub fn snoop(&mut self, addr: u16, cycle: BusCycle, side_effects: SideEffects, ram: &SharedIoRam) {
        if side_effects.enabled() {
            self.mapper.snoop(&self.image, addr, cycle, ram);
        }
    }

    pub fn image(&self) -> &CartridgeImage {
        &self.image
    }

    pub fn scheme(&self) -> MappingScheme {
        self.image.scheme()
    }

    /// Live banking state, serializable for save-state collaborators
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Replace banking state captured earlier for the same image
    pub fn restore_mapper(&mut self, mapper: Mapper) {
        self.mapper = mapper;
    }
}
