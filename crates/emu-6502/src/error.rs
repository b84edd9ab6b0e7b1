//! CPU-level error taxonomy.

use std::fmt;

/// Failures the CPU core can report.
///
/// The CPU never aborts execution on its own: `InvalidOpcode` only surfaces
/// when strict mode is explicitly enabled, and even then the instruction
/// has already executed its documented NOP fallback by the time the error
/// is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// An undefined opcode was fetched while strict mode was enabled.
    InvalidOpcode { opcode: u8, pc: u16 },
    /// `execute(max_cycles)` could not complete the in-flight instruction
    /// within the requested budget. Testing aid only; never raised by
    /// `step()` itself.
    CycleExhaustion { requested: u32, consumed: u32 },
    /// BRK was executed while the test harness asked to be told about it.
    CpuBreak { pc: u16 },
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuError::InvalidOpcode { opcode, pc } => {
                write!(f, "invalid opcode ${opcode:02X} at ${pc:04X}")
            }
            CpuError::CycleExhaustion {
                requested,
                consumed,
            } => write!(
                f,
                "cycle budget exhausted: requested {requested}, consumed {consumed} before the in-flight instruction could finish"
            ),
            CpuError::CpuBreak { pc } => write!(f, "BRK encountered at ${pc:04X}"),
        }
    }
}

impl std::error::Error for CpuError {}
