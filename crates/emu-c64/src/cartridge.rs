//! Cartridge auto-detection and mapping.
//!
//! Two entry points: `load_bin` infers the cartridge shape from a raw ROM
//! dump's size and contents; `load_crt` parses the community CRT container
//! format. Both produce a `Cartridge`, which the bus consults for ROML/ROMH
//! overrides and for the $DE00-$DFFF control-register window.

#![allow(clippy::cast_possible_truncation)]

use crate::error::C64Error;

const CBM80_SIGNATURE: [u8; 5] = [0xC3, 0xC2, 0xCD, 0x38, 0x30];
const CRT_SIGNATURE: &[u8; 16] = b"C64 CARTRIDGE   ";
const CHIP_SIGNATURE: &[u8; 4] = b"CHIP";

/// Cartridge control lines. `true` = asserted (active low on the real bus,
/// but the sense is normalised here so `true` always means "driving").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BankLines {
    pub exrom: bool,
    pub game: bool,
}

/// An installed cartridge and its runtime state.
#[derive(Debug, Clone)]
pub enum Cartridge {
    /// No cartridge installed.
    None,
    /// 8 KiB at $8000-$9FFF (ROML only). EXROM=0, GAME=1.
    Normal8K { rom: Vec<u8> },
    /// 16 KiB at $8000-$BFFF (ROML+ROMH). EXROM=0, GAME=0.
    Normal16K { rom: Vec<u8> },
    /// 8 KiB at $E000-$FFFF, replacing most of the address space.
    /// EXROM=1, GAME=0.
    Ultimax { rom: Vec<u8> },
    /// Action Replay: four 8 KiB ROM banks plus 8 KiB of cartridge RAM,
    /// switched through the $DE00 control register.
    ActionReplay {
        banks: [Vec<u8>; 4],
        ram: Box<[u8; 0x2000]>,
        bank: u8,
        ram_enabled: bool,
        frozen: bool,
        lines: BankLines,
    },
}

impl Default for Cartridge {
    fn default() -> Self {
        Cartridge::None
    }
}

impl Cartridge {
    /// Current EXROM/GAME state this cartridge drives onto the bus.
    #[must_use]
    pub fn bank_lines(&self) -> BankLines {
        match self {
            Cartridge::None => BankLines { exrom: true, game: true },
            Cartridge::Normal8K { .. } => BankLines { exrom: false, game: true },
            Cartridge::Normal16K { .. } => BankLines { exrom: false, game: false },
            Cartridge::Ultimax { .. } => BankLines { exrom: true, game: false },
            Cartridge::ActionReplay { lines, .. } => *lines,
        }
    }

    /// Read from the ROML window ($8000-$9FFF), offset 0-8191.
    #[must_use]
    pub fn read_roml(&self, offset: u16) -> u8 {
        match self {
            Cartridge::None => 0xFF,
            Cartridge::Normal8K { rom } | Cartridge::Normal16K { rom } => {
                rom.get(offset as usize).copied().unwrap_or(0xFF)
            }
            Cartridge::Ultimax { .. } => 0xFF,
            Cartridge::ActionReplay { banks, bank, .. } => banks[*bank as usize]
                .get(offset as usize)
                .copied()
                .unwrap_or(0xFF),
        }
    }

    /// Read from the ROMH window ($A000-$BFFF, or $E000-$FFFF in Ultimax
    /// mode), offset 0-8191.
    #[must_use]
    pub fn read_romh(&self, offset: u16) -> u8 {
        match self {
            Cartridge::Normal16K { rom } => rom.get(0x2000 + offset as usize).copied().unwrap_or(0xFF),
            Cartridge::Ultimax { rom } => rom.get(offset as usize).copied().unwrap_or(0xFF),
            _ => 0xFF,
        }
    }

    /// Handle a read from the $DE00-$DFFF control/RAM window.
    #[must_use]
    pub fn read_io(&self, addr: u16) -> u8 {
        match self {
            Cartridge::ActionReplay { ram, ram_enabled, bank, .. } => {
                if (0xDF00..=0xDFFF).contains(&addr) {
                    if *ram_enabled {
                        ram[(addr - 0xDF00) as usize]
                    } else {
                        0xFF
                    }
                } else if (0xDE00..=0xDEFF).contains(&addr) {
                    // Nothing else is readable in this window; ROM itself
                    // is mapped through read_roml/read_romh, not here.
                    let _ = bank;
                    0xFF
                } else {
                    0xFF
                }
            }
            _ => 0xFF,
        }
    }

    /// Handle a write to the $DE00-$DFFF control/RAM window.
    pub fn write_io(&mut self, addr: u16, value: u8) {
        if let Cartridge::ActionReplay {
            bank,
            ram_enabled,
            frozen,
            lines,
            ram,
            ..
        } = self
        {
            if addr == 0xDE00 {
                *bank = value & 0x03;
                lines.exrom = value & 0x04 != 0;
                lines.game = value & 0x08 != 0;
                *ram_enabled = value & 0x10 != 0;
                if value & 0x40 != 0 {
                    *frozen = false;
                }
            } else if *ram_enabled && (0xDF00..=0xDFFF).contains(&addr) {
                ram[(addr - 0xDF00) as usize] = value;
            }
        }
    }

    /// Mark an Action Replay cartridge as frozen (the cartridge's freeze
    /// button, which asserts NMI externally).
    pub fn freeze(&mut self) {
        if let Cartridge::ActionReplay { frozen, .. } = self {
            *frozen = true;
        }
    }

    /// Whether an Action Replay cartridge is currently frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        matches!(self, Cartridge::ActionReplay { frozen: true, .. })
    }

    /// Auto-detect and load a raw `.bin` cartridge image.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCartridge` if the image doesn't match any of the
    /// recognised shapes (8K CBM80 signature, 8K Ultimax reset vector, or
    /// plain 16K).
    pub fn load_bin(bytes: &[u8]) -> Result<Self, C64Error> {
        if bytes.len() == 8192 && bytes.get(4..9) == Some(&CBM80_SIGNATURE) {
            return Ok(Cartridge::Normal8K { rom: bytes.to_vec() });
        }
        if bytes.len() == 8192 {
            let reset_vector = u16::from_le_bytes([bytes[0x1FFC], bytes[0x1FFD]]);
            if (0xE000..=0xFFFF).contains(&reset_vector) {
                return Ok(Cartridge::Ultimax { rom: bytes.to_vec() });
            }
        }
        if bytes.len() == 16384 {
            return Ok(Cartridge::Normal16K { rom: bytes.to_vec() });
        }
        Err(C64Error::InvalidCartridge {
            reason: format!(
                "{} bytes matches no known shape (8K CBM80, 8K Ultimax, or 16K)",
                bytes.len()
            ),
        })
    }

    /// Parse and load a CRT-format cartridge image.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCartridge` for a malformed header or CHIP packet,
    /// `UnsupportedCartridge` for any hardware type other than Normal (0)
    /// or Action Replay (1).
    pub fn load_crt(bytes: &[u8]) -> Result<Self, C64Error> {
        if bytes.len() < 64 || &bytes[0..16] != CRT_SIGNATURE {
            return Err(C64Error::InvalidCartridge {
                reason: "missing CRT signature".to_string(),
            });
        }

        let header_len = read_be_u32(bytes, 0x10) as usize;
        if header_len < 0x20 || header_len > bytes.len() {
            return Err(C64Error::InvalidCartridge {
                reason: format!("invalid header length {header_len}"),
            });
        }
        let hw_type = read_be_u16(bytes, 0x16);
        let exrom_byte = bytes[0x18];
        let game_byte = bytes[0x19];

        let mut roml: Vec<Vec<u8>> = Vec::new();
        let mut romh: Vec<Vec<u8>> = Vec::new();
        let mut offset = header_len;

        while offset + 0x10 <= bytes.len() {
            if &bytes[offset..offset + 4] != CHIP_SIGNATURE {
                return Err(C64Error::InvalidCartridge {
                    reason: format!("expected CHIP signature at offset {offset}"),
                });
            }
            let chip_len = read_be_u32(bytes, offset + 4) as usize;
            if chip_len < 0x10 || offset + chip_len > bytes.len() {
                return Err(C64Error::InvalidCartridge {
                    reason: format!("invalid CHIP packet length at offset {offset}"),
                });
            }
            let bank = read_be_u16(bytes, offset + 0x0A) as usize;
            let load_addr = read_be_u16(bytes, offset + 0x0C);
            let rom_size = read_be_u16(bytes, offset + 0x0E) as usize;
            let rom_start = offset + 0x10;
            let rom_end = rom_start + rom_size;
            if rom_end > bytes.len() {
                return Err(C64Error::InvalidCartridge {
                    reason: format!("CHIP ROM data past end of file at offset {offset}"),
                });
            }
            let rom_data = bytes[rom_start..rom_end].to_vec();
            match load_addr {
                0x8000 => {
                    while roml.len() <= bank {
                        roml.push(Vec::new());
                    }
                    roml[bank] = rom_data;
                }
                0xA000 | 0xE000 => {
                    while romh.len() <= bank {
                        romh.push(Vec::new());
                    }
                    romh[bank] = rom_data;
                }
                other => {
                    return Err(C64Error::InvalidCartridge {
                        reason: format!("unexpected CHIP load address ${other:04X}"),
                    })
                }
            }
            offset += chip_len;
        }

        match hw_type {
            0 => {
                let mut rom = roml.into_iter().next().unwrap_or_default();
                if let Some(high) = romh.into_iter().next() {
                    rom.extend(high);
                    Ok(Cartridge::Normal16K { rom })
                } else if exrom_byte == 0 && game_byte != 0 {
                    Ok(Cartridge::Normal8K { rom })
                } else {
                    Ok(Cartridge::Ultimax { rom })
                }
            }
            1 => {
                let mut banks: [Vec<u8>; 4] = Default::default();
                for (i, bank) in roml.into_iter().take(4).enumerate() {
                    banks[i] = bank;
                }
                Ok(Cartridge::ActionReplay {
                    banks,
                    ram: Box::new([0; 0x2000]),
                    bank: 0,
                    ram_enabled: false,
                    frozen: false,
                    lines: BankLines { exrom: false, game: true },
                })
            }
            other => Err(C64Error::UnsupportedCartridge { hardware_type: other }),
        }
    }
}

fn read_be_u16(data: &[u8], offset: usize) -> u16 {
    u16::from(data[offset]) << 8 | u16::from(data[offset + 1])
}

fn read_be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from(data[offset]) << 24
        | u32::from(data[offset + 1]) << 16
        | u32::from(data[offset + 2]) << 8
        | u32::from(data[offset + 3])
}
