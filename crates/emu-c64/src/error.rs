//! C64-level error taxonomy.

use std::fmt;

/// Failures the C64 system integration layer can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum C64Error {
    /// A `.bin` cartridge image didn't match any recognised auto-detection
    /// shape (8K CBM80, 8K Ultimax reset vector, or 16K).
    InvalidCartridge { reason: String },
    /// A CRT file had a valid header but named a hardware type this
    /// implementation doesn't map (anything but Normal or Action Replay).
    UnsupportedCartridge { hardware_type: u16 },
    /// An I/O device claiming an address failed; the bus logs and
    /// continues rather than aborting the CPU thread.
    BusDeviceError { addr: u16, reason: String },
}

impl fmt::Display for C64Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            C64Error::InvalidCartridge { reason } => write!(f, "invalid cartridge image: {reason}"),
            C64Error::UnsupportedCartridge { hardware_type } => {
                write!(f, "unsupported CRT hardware type {hardware_type}")
            }
            C64Error::BusDeviceError { addr, reason } => {
                write!(f, "bus device error at ${addr:04X}: {reason}")
            }
        }
    }
}

impl std::error::Error for C64Error {}
