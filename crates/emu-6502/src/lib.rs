//! Cycle-accurate 6502 CPU emulator.
//!
//! `step()` fetches, decodes, and fully executes one instruction, returning
//! the number of cycles it consumed. `execute()` loops `step()` up to a
//! cycle budget for callers that want to run in chunks rather than
//! instruction-by-instruction.

mod cpu;
mod error;
mod flags;
mod opcodes;
mod registers;
mod variant;

pub use cpu::{Mos6502, TraceEvent};
pub use error::CpuError;
pub use flags::Status;
pub use opcodes::{AddrMode, Mnemonic, OpInfo};
pub use registers::Registers;
pub use variant::Variant;
