//! Atari 2600 memory bus implementation
//!
//! The 6507 has a 13-bit address bus (8KB addressable space). Each access is
//! handled in the same order as on the board:
//!
//! 1. mask to 13 bits
//! 2. let the cartridge watch the cycle if it is outside $1000-$1FFF (some
//!    boards decode TIA/RIOT traffic to switch banks)
//! 3. collapse mirrors and pick the owner: TIA, RIOT RAM, RIOT I/O, cartridge
//!    (a board may also route an undecoded range to RIOT RAM)
//! 4. the owner answers; if nobody does, the bus floats (see [`crate::open_bus`])
//! 5. opcode fetches are remembered for the floating bus heuristic

use emu_core::logging::{log, LogCategory, LogLevel};
use emu_core::{BusCycle, CpuBus, SideEffects};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cartridge::{Cartridge, CartridgeImage, MappingScheme};
use crate::chips::{IoChip, VideoChip};
use crate::config::SessionConfig;
use crate::display::{DisplayGeometry, DisplayTimingDetector};
use crate::mapper::Mapper;
use crate::open_bus::{self, BusTrace};
use crate::ram::SharedIoRam;
use crate::region::{self, Owner, ADDRESS_MASK};
use crate::{BusError, DebugInfo};

const STATE_VERSION: u64 = 1;

/// Everything a save state needs besides the ROM and the external chips
#[derive(Debug, Serialize, Deserialize)]
struct BusState {
    version: u64,
    scheme: MappingScheme,
    mapper: Mapper,
    ram: SharedIoRam,
    trace: BusTrace,
    display: DisplayTimingDetector,
}

/// Atari 2600 memory bus
#[derive(Debug)]
pub struct Atari2600Bus<V: VideoChip, I: IoChip> {
    pub tia: V,
    pub riot: I,
    ram: SharedIoRam,
    cartridge: Cartridge,
    trace: BusTrace,
    display: DisplayTimingDetector,
}

impl<V: VideoChip, I: IoChip> Atari2600Bus<V, I> {
    /// Build a bus for one session.
    ///
    /// Fails if the declared scheme is unknown or not emulated, the ROM is
    /// empty, or the configured geometry does not exist.
    pub fn new(config: &SessionConfig, rom: Vec<u8>, tia: V, riot: I) -> Result<Self, BusError> {
        let scheme = config.scheme_for(&rom)?;
        let image = CartridgeImage::new(scheme, rom)?;
        let geometry = config.initial_geometry()?;

        log(LogCategory::Bus, LogLevel::Info, || {
            format!(
                "Bus: {:?} session ({} Hz CPU, {} Hz TIA), {} lines, scheme {}",
                config.video_standard,
                config.video_standard.cpu_clock(),
                config.video_standard.master_clock(),
                geometry.lines(),
                scheme.id()
            )
        });

        Ok(Self {
            tia,
            riot,
            ram: SharedIoRam::new(),
            cartridge: Cartridge::new(image),
            trace: BusTrace::new(),
            display: DisplayTimingDetector::new(geometry),
        })
    }

    /// Run one bus cycle and return the value on the data bus.
    ///
    /// For writes that is the written byte.
    pub fn access(&mut self, addr: u16, cycle: BusCycle, side_effects: SideEffects) -> u8 {
        let addr = addr & ADDRESS_MASK;

        if !region::CARTRIDGE.contains(addr) {
            self.cartridge.snoop(addr, cycle, side_effects, &self.ram);
        }

        let owner = match self.cartridge.riot_overlay(addr) {
            Some(canonical) => Owner::RiotRam(canonical),
            None => region::decode(addr),
        };

        let value = match (owner, cycle) {
            (Owner::Tia(offset), BusCycle::Write(data)) => {
                self.tia.write(offset, data);
                data
            }
            (Owner::Tia(offset), _) => {
                let floating = self.floating(addr);
                if side_effects.enabled() {
                    self.tia.read(offset, floating)
                } else {
                    self.tia.peek(offset, floating)
                }
            }
            (Owner::RiotRam(canonical), BusCycle::Write(data)) => {
                self.ram.write(canonical, data);
                data
            }
            (Owner::RiotRam(canonical), _) => self.ram.read(canonical),
            (Owner::RiotIo(offset), BusCycle::Write(data)) => {
                self.riot.write(offset, data);
                data
            }
            (Owner::RiotIo(offset), _) => {
                if side_effects.enabled() {
                    self.riot.read(offset)
                } else {
                    self.riot.peek(offset)
                }
            }
            (Owner::Cartridge(addr), _) => match self.cartridge.access(addr, cycle, side_effects) {
                Some(byte) => byte,
                None => cycle.data().unwrap_or_else(|| self.floating(addr)),
            },
            (Owner::Unmapped, BusCycle::Write(data)) => {
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Bus: write ${:02X} to unmapped ${:04X} dropped", data, addr)
                });
                data
            }
            (Owner::Unmapped, _) => {
                let floating = self.floating(addr);
                log(LogCategory::Bus, LogLevel::Trace, || {
                    format!("Bus: read of unmapped ${:04X} floats to ${:02X}", addr, floating)
                });
                floating
            }
        };

        if cycle == BusCycle::Fetch && side_effects.enabled() {
            self.trace.record(addr, value);
        }
        value
    }

    /// Value the data lines float to when nothing drives them
    pub fn floating(&self, addr: u16) -> u8 {
        // The only memory the heuristic consults is a zero page pointer,
        // which always lands in RIOT RAM
        open_bus::resolve(addr, &self.trace, |pointer| self.ram.read(pointer))
    }

    /// Report the number of scan lines between two VSYNC pulses
    pub fn on_vsync(&mut self, interval: u16) -> Option<DisplayGeometry> {
        self.display.observe(interval)
    }

    /// Power-on state for banking and RAM. The chips reset themselves.
    pub fn reset(&mut self) {
        self.cartridge.reset();
        self.ram.clear();
        self.trace = BusTrace::new();
    }

    pub fn ram(&self) -> &SharedIoRam {
        &self.ram
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn trace(&self) -> &BusTrace {
        &self.trace
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.display.geometry()
    }

    pub fn display(&self) -> &DisplayTimingDetector {
        &self.display
    }

    /// Get debug information
    pub fn debug_info(&self) -> DebugInfo {
        DebugInfo {
            rom_size: self.cartridge.image().size(),
            banking_scheme: self.cartridge.scheme().id().to_string(),
            banks: self.cartridge.mapper().banks(),
            scanlines: self.display.geometry().lines(),
        }
    }

    /// Capture banking, RAM, trace and display state (no ROM data)
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "version": STATE_VERSION,
            "scheme": self.cartridge.scheme(),
            "mapper": self.cartridge.mapper(),
            "ram": &self.ram,
            "trace": &self.trace,
            "display": &self.display,
        })
    }

    /// Restore state captured by [`Self::save_state`] for the same cartridge
    pub fn load_state(&mut self, v: &Value) -> Result<(), BusError> {
        let state: BusState = serde_json::from_value(v.clone())?;
        if state.version != STATE_VERSION {
            return Err(BusError::StateMismatch(format!(
                "version {} (expected {})",
                state.version, STATE_VERSION
            )));
        }
        if state.scheme != self.cartridge.scheme() {
            return Err(BusError::StateMismatch(format!(
                "scheme {} (cartridge is {})",
                state.scheme.id(),
                self.cartridge.scheme().id()
            )));
        }

        state
            .mapper
            .validate(self.cartridge.image())
            .map_err(BusError::StateMismatch)?;

        self.cartridge.restore_mapper(state.mapper);
        self.ram = state.ram;
        self.trace = state.trace;
        self.display = state.display;
        Ok(())
    }
}

impl<V: VideoChip, I: IoChip> CpuBus for Atari2600Bus<V, I> {
    #[inline]
    fn access(&mut self, addr: u16, cycle: BusCycle, side_effects: SideEffects) -> u8 {
        Atari2600Bus::access(self, addr, cycle, side_effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chips::Unconnected;

    /// TIA that records writes and answers reads with its register offset
    #[derive(Debug, Default)]
    struct EchoTia {
        writes: Vec<(u8, u8)>,
        reads: usize,
    }

    impl VideoChip for EchoTia {
        fn read(&mut self, offset: u8, _floating: u8) -> u8 {
            self.reads += 1;
            offset
        }

        fn peek(&self, offset: u8, _floating: u8) -> u8 {
            offset
        }

        fn write(&mut self, offset: u8, data: u8) {
            self.writes.push((offset, data));
        }
    }

    fn bus_4k(rom: Vec<u8>) -> Atari2600Bus<EchoTia, Unconnected> {
        Atari2600Bus::new(
            &SessionConfig::with_scheme("4k"),
            rom,
            EchoTia::default(),
            Unconnected,
        )
        .unwrap()
    }

    #[test]
    fn test_bus_tia_access() {
        let mut bus = bus_4k(vec![0xEA; 4096]);

        bus.write(0x0006, 0x42); // COLUP0
        bus.write(0x0106, 0x43); // mirror
        bus.write(0x0F46, 0x44); // A6 is decoded, so this is register $46
        assert_eq!(bus.tia.writes, vec![(0x06, 0x42), (0x06, 0x43), (0x46, 0x44)]);

        assert_eq!(bus.read(0x0030), 0x30);
        assert_eq!(bus.read(0x0F3C), 0x3C);
    }

    #[test]
    fn test_bus_riot_ram() {
        let mut bus = bus_4k(vec![0xEA; 4096]);

        bus.write(0x0080, 0x12);
        assert_eq!(bus.read(0x0080), 0x12);

        // Stack page mirror
        bus.write(0x01FF, 0x34);
        assert_eq!(bus.read(0x00FF), 0x34);
        assert_eq!(bus.ram().read(0x00FF), 0x34);
    }

    #[test]
    fn test_bus_address_masking() {
        let mut rom = vec![0; 4096];
        rom[0xFFC] = 0x00;
        rom[0xFFD] = 0xF0;
        let mut bus = bus_4k(rom);

        // Reset vector through the 6502's view of $FFFC
        assert_eq!(bus.read(0xFFFC), 0x00);
        assert_eq!(bus.read(0xFFFD), 0xF0);
        assert_eq!(bus.read(0x2030), bus.read(0x0030));
    }

    #[test]
    fn test_fetch_records_trace() {
        let mut rom = vec![0; 4096];
        rom[0] = 0xA5;
        rom[1] = 0x85;
        let mut bus = bus_4k(rom);

        bus.fetch(0xF000);
        bus.fetch(0xF001);
        assert_eq!(bus.trace().prev().addr, 0x1000);
        assert_eq!(bus.trace().last().byte, 0x85);

        // Plain reads and debugger fetches leave it alone
        bus.read(0x1000);
        bus.access(0x1000, BusCycle::Fetch, SideEffects::Disabled);
        assert_eq!(bus.trace().last().addr, 0x1001);
    }

    #[test]
    fn test_unmapped_read_floats() {
        let mut rom = vec![0; 4096];
        rom[0] = 0xAD;
        rom[1] = 0xA5;
        let mut bus = bus_4k(rom);

        bus.fetch(0x1000);
        bus.fetch(0x1001);
        assert_eq!(bus.read(0x02A5), 0xA5);

        // Writes to the gap are dropped without disturbing anything
        assert_eq!(bus.access(0x02A5, BusCycle::Write(0x77), SideEffects::Enabled), 0x77);
        assert!(bus.ram().as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_peek_uses_chip_peek() {
        let mut bus = bus_4k(vec![0; 4096]);
        bus.peek(0x0030);
        assert_eq!(bus.tia.reads, 0);
        bus.read(0x0030);
        assert_eq!(bus.tia.reads, 1);
    }

    #[test]
    fn test_vsync_updates_geometry() {
        let mut bus = bus_4k(vec![0; 4096]);
        assert_eq!(bus.geometry(), DisplayGeometry::Lines262);
        assert_eq!(bus.on_vsync(311), Some(DisplayGeometry::Lines312));
        assert_eq!(bus.debug_info().scanlines, 312);
    }

    #[test]
    fn test_save_load_state() {
        let mut rom = vec![0; 0x2000];
        rom[0x0FF8] = 0x11;
        let config = SessionConfig::with_scheme("f8");
        let mut bus = Atari2600Bus::new(&config, rom.clone(), Unconnected, Unconnected).unwrap();

        bus.read(0x1FF8);
        bus.write(0x0090, 0x5A);
        let state = bus.save_state();
        assert_eq!(state["version"], 1);
        assert!(state.get("rom").is_none());

        let mut other = Atari2600Bus::new(&config, rom, Unconnected, Unconnected).unwrap();
        other.load_state(&state).unwrap();
        assert_eq!(other.debug_info().banks, vec![0]);
        assert_eq!(other.ram().read(0x0090), 0x5A);
    }

    #[test]
    fn test_load_state_rejects_out_of_range_banking() {
        let mut bus = Atari2600Bus::new(
            &SessionConfig::with_scheme("3e"),
            vec![0; 0x2000],
            Unconnected,
            Unconnected,
        )
        .unwrap();
        bus.write(0x003E, 3);
        let good = bus.save_state();

        let mut bad = good.clone();
        bad["mapper"]["Tigervision"]["ram_bank"] = serde_json::json!(40);
        assert!(matches!(bus.load_state(&bad), Err(BusError::StateMismatch(_))));

        // The rejected state left the live one in place
        assert_eq!(bus.cartridge().mapper().banks(), vec![0]);
        bus.write(0x1400, 0x21);
        assert_eq!(bus.read(0x1000), 0x21);
        bus.load_state(&good).unwrap();
    }

    #[test]
    fn test_load_state_rejects_other_scheme() {
        let f8 = Atari2600Bus::new(
            &SessionConfig::with_scheme("f8"),
            vec![0; 0x2000],
            Unconnected,
            Unconnected,
        )
        .unwrap();
        let mut f6 = Atari2600Bus::new(
            &SessionConfig::with_scheme("f6"),
            vec![0; 0x4000],
            Unconnected,
            Unconnected,
        )
        .unwrap();

        assert!(matches!(
            f6.load_state(&f8.save_state()),
            Err(BusError::StateMismatch(_))
        ));
    }

    #[test]
    fn test_reset_restores_power_on_bank() {
        let mut bus = Atari2600Bus::new(
            &SessionConfig::with_scheme("f6"),
            vec![0; 0x4000],
            Unconnected,
            Unconnected,
        )
        .unwrap();
        bus.read(0x1FF8);
        bus.write(0x0080, 1);
        assert_eq!(bus.debug_info().banks, vec![2]);

        bus.reset();
        assert_eq!(bus.debug_info().banks, vec![0]);
        assert_eq!(bus.ram().read(0x0080), 0);
    }
}
