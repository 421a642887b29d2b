//! Atari 2600 memory bus and cartridge interface
//!
//! Everything between the 6507's address/data pins and the chips it talks
//! to: address decoding with the board's partial decoding (mirrors), the bank
//! switching logic found on cartridge boards, the floating data bus and
//! VSYNC-based display geometry detection. The CPU core, TIA and RIOT timer
//! are external and plug in through [`emu_core::CpuBus`], [`VideoChip`] and
//! [`IoChip`].

#![allow(clippy::upper_case_acronyms)]

mod bus;
mod cartridge;
mod chips;
mod config;
mod display;
pub mod mapper;
pub mod open_bus;
mod ram;
pub mod region;

pub use bus::Atari2600Bus;
pub use cartridge::{Cartridge, CartridgeError, CartridgeImage, MappingScheme};
pub use chips::{IoChip, Unconnected, VideoChip};
pub use config::{ConfigError, SessionConfig};
pub use display::{DisplayGeometry, DisplayTimingDetector, VideoStandard};
pub use mapper::Mapper;
pub use open_bus::BusTrace;
pub use ram::{SharedIoRam, RIOT_RAM_SIZE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Cartridge error: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Save state error: {0}")]
    State(#[from] serde_json::Error),
    #[error("Save state does not match this session: {0}")]
    StateMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
    pub rom_size: usize,
    pub banking_scheme: String,
    /// Visible bank per window slice
    pub banks: Vec<usize>,
    pub scanlines: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_messages() {
        let err = BusError::from(CartridgeError::UnknownScheme("zz".to_string()));
        assert_eq!(err.to_string(), "Cartridge error: Unknown banking scheme: zz");

        let err = BusError::from(ConfigError::InvalidGeometry(300));
        assert_eq!(
            err.to_string(),
            "Configuration error: Unsupported display geometry: 300 lines"
        );
    }

    #[test]
    fn test_debug_info() {
        let bus = Atari2600Bus::new(
            &SessionConfig::with_scheme("e0"),
            vec![0; 0x2000],
            Unconnected,
            Unconnected,
        )
        .unwrap();

        let info = bus.debug_info();
        assert_eq!(info.rom_size, 0x2000);
        assert_eq!(info.banking_scheme, "e0");
        assert_eq!(info.banks, vec![4, 5, 6, 7]);
        assert_eq!(info.scanlines, 262);
    }
}
