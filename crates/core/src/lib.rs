//! Core emulator primitives and traits.

pub mod bus;
pub mod logging;

pub use bus::{BusCycle, CpuBus, SideEffects};
