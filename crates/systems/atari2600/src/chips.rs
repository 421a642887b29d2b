//! Seams to the chips the bus dispatches to
//!
//! The TIA and the RIOT timer/I/O section are emulated elsewhere; the bus only
//! needs to hand them register offsets and data. RIOT RAM is not behind this
//! seam because cartridge logic watches it too (see [`crate::SharedIoRam`]).

use emu_core::logging::{log, LogCategory, LogLevel};

/// TIA register interface.
///
/// The TIA only drives D6/D7 on reads; `floating` is the open-bus value for
/// the bits it leaves undriven.
pub trait VideoChip {
    fn read(&mut self, offset: u8, floating: u8) -> u8;

    /// Read without side effects (debugger)
    fn peek(&self, offset: u8, floating: u8) -> u8;

    fn write(&mut self, offset: u8, data: u8);
}

/// RIOT I/O port and timer interface (offsets $00-$1F)
pub trait IoChip {
    fn read(&mut self, offset: u8) -> u8;

    /// Read without side effects (debugger)
    fn peek(&self, offset: u8) -> u8;

    fn write(&mut self, offset: u8, data: u8);
}

/// Stand-in for a chip that is not attached.
///
/// Reads see a floating bus for the TIA and idle port lines for the RIOT;
/// writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconnected;

impl VideoChip for Unconnected {
    fn read(&mut self, offset: u8, floating: u8) -> u8 {
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("TIA: unconnected read of register ${:02X}", offset)
        });
        floating
    }

    fn peek(&self, _offset: u8, floating: u8) -> u8 {
        floating
    }

    fn write(&mut self, offset: u8, data: u8) {
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("TIA: unconnected write ${:02X} to register ${:02X}", data, offset)
        });
    }
}

impl IoChip for Unconnected {
    fn read(&mut self, offset: u8) -> u8 {
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("RIOT: unconnected read of register ${:02X}", offset)
        });
        // Port inputs are pulled high
        0xFF
    }

    fn peek(&self, _offset: u8) -> u8 {
        0xFF
    }

    fn write(&mut self, offset: u8, data: u8) {
        log(LogCategory::Stubs, LogLevel::Trace, || {
            format!("RIOT: unconnected write ${:02X} to register ${:02X}", data, offset)
        });
    }
}
