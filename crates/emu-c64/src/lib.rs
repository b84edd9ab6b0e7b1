//! Commodore 64 system integration on top of the cycle-accurate 6502 core.
//!
//! Combines CPU, memory banking, cartridge auto-detection, and VIC-II
//! raster timing into a driver loop that steps one instruction at a time
//! and publishes a frame snapshot through a lock-light handshake whenever
//! the raster counter wraps. Pixel rendering, audio, input, and storage
//! devices are out of scope — `bus.rs` leaves hooks for them but models no
//! chip logic.

mod bus;
mod c64;
mod cartridge;
mod config;
mod error;
mod frame;
mod memory;
pub mod vic;

pub use bus::C64Bus;
pub use c64::C64;
pub use cartridge::{BankLines, Cartridge};
pub use config::C64Config;
pub use error::C64Error;
pub use frame::{FrameHandshake, RamSnapshot};
pub use memory::C64Memory;
pub use vic::{Vic, VicVariant};
