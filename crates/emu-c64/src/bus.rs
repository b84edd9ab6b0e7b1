//! C64 bus: memory, VIC-II, and cartridge routing.
//!
//! Implements `emu_core::Bus` for the C64. The C64 is fully memory-mapped —
//! there is no separate I/O address space, so only `read`/`write` matter.
//!
//! Address $D400-$D7FF (SID) and $DC00-$DDFF (CIA 1/2) are wired as an open
//! bus stub: no SID or CIA chip logic is modelled, but the routing exists so
//! a future device can be slotted in without touching the CPU or memory
//! banking code.

#![allow(clippy::cast_possible_truncation)]

use emu_core::Bus;

use crate::cartridge::Cartridge;
use crate::memory::C64Memory;
use crate::vic::Vic;

/// The C64 bus, implementing `emu_core::Bus`.
pub struct C64Bus {
    pub memory: C64Memory,
    pub vic: Vic,
    pub cartridge: Cartridge,
}

impl C64Bus {
    #[must_use]
    pub fn new(memory: C64Memory, vic: Vic) -> Self {
        Self {
            memory,
            vic,
            cartridge: Cartridge::None,
        }
    }

    /// Install a cartridge, asserting its EXROM/GAME lines.
    pub fn set_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = cartridge;
    }

    /// Whether the cartridge currently overrides ROML ($8000-$9FFF).
    /// ROML is mapped whenever EXROM is asserted low (8K and 16K configs).
    fn roml_active(&self) -> bool {
        !self.cartridge.bank_lines().exrom
    }

    /// Whether the cartridge currently overrides ROMH ($A000-$BFFF, or
    /// $E000-$FFFF in Ultimax mode), and which.
    fn romh_active(&self) -> RomhOverride {
        let lines = self.cartridge.bank_lines();
        if lines.exrom && !lines.game {
            RomhOverride::Ultimax
        } else if !lines.exrom && !lines.game {
            RomhOverride::Normal
        } else {
            RomhOverride::None
        }
    }
}

#[derive(PartialEq, Eq)]
enum RomhOverride {
    None,
    Normal,
    Ultimax,
}

impl Bus for C64Bus {
    fn read(&mut self, address: u16) -> u8 {
        match address {
            0x8000..=0x9FFF if self.roml_active() => self.cartridge.read_roml(address - 0x8000),
            0xA000..=0xBFFF if self.romh_active() == RomhOverride::Normal => {
                self.cartridge.read_romh(address - 0xA000)
            }
            0xE000..=0xFFFF if self.romh_active() == RomhOverride::Ultimax => {
                self.cartridge.read_romh(address - 0xE000)
            }
            0xD000..=0xDFFF if self.memory.io_visible() => match address {
                0xD000..=0xD3FF => self.vic.read((address & 0x3F) as u8),
                0xD400..=0xD7FF => 0xFF, // SID hook: no chip modelled.
                0xD800..=0xDBFF => self.memory.colour_ram_read(address - 0xD800),
                0xDC00..=0xDDFF => 0xFF, // CIA 1/2 hook: no chip modelled.
                0xDE00..=0xDFFF => self.cartridge.read_io(address),
                _ => 0xFF,
            },
            _ => self.memory.cpu_read(address),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0xDE00..=0xDFFF if self.memory.io_visible() => {
                self.cartridge.write_io(address, value);
            }
            0xD000..=0xDFFF if self.memory.io_visible() => match address {
                0xD000..=0xD3FF => self.vic.write((address & 0x3F) as u8, value),
                0xD800..=0xDBFF => self.memory.colour_ram_write(address - 0xD800, value),
                _ => {} // SID/CIA hooks: no chip modelled.
            },
            _ => self.memory.cpu_write(address, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vic::VicVariant;

    fn make_bus() -> C64Bus {
        let kernal = vec![0xEE; 8192];
        let basic = vec![0xBB; 8192];
        let chargen = vec![0xCC; 4096];
        let memory = C64Memory::new(&kernal, &basic, &chargen);
        C64Bus::new(memory, Vic::new(VicVariant::Pal6569))
    }

    #[test]
    fn ram_read_write() {
        let mut bus = make_bus();
        bus.write(0x3000, 0xAB);
        assert_eq!(bus.read(0x3000), 0xAB);
    }

    #[test]
    fn basic_rom_visible_without_cartridge() {
        let bus = make_bus();
        assert_eq!(bus.memory.cpu_read(0xA000), 0xBB);
    }

    #[test]
    fn vic_register_access() {
        let mut bus = make_bus();
        bus.write(0xD020, 0x06);
        assert_eq!(bus.read(0xD020), 0x06);
    }

    #[test]
    fn colour_ram_access() {
        let mut bus = make_bus();
        bus.write(0xD800, 0x05);
        assert_eq!(bus.read(0xD800), 0x05);
    }

    #[test]
    fn sid_and_cia_hooks_return_open_bus() {
        let mut bus = make_bus();
        assert_eq!(bus.read(0xD400), 0xFF);
        assert_eq!(bus.read(0xDC00), 0xFF);
    }

    #[test]
    fn normal_8k_cartridge_overrides_roml_only() {
        let mut bytes = vec![0xAAu8; 8192];
        bytes[4..9].copy_from_slice(&[0xC3, 0xC2, 0xCD, 0x38, 0x30]);
        let cart = Cartridge::load_bin(&bytes).unwrap();
        let mut bus = make_bus();
        bus.set_cartridge(cart);
        assert_eq!(bus.read(0x8000), 0xAA);
        // GAME asserted for Normal8K, so $A000-$BFFF stays BASIC ROM/RAM.
        assert_eq!(bus.memory.cpu_read(0xA000), 0xBB);
    }

    #[test]
    fn ultimax_cartridge_overrides_romh_at_e000() {
        let mut bytes = vec![0x11u8; 8192];
        bytes[0x1FFC] = 0x00;
        bytes[0x1FFD] = 0xF0;
        let cart = Cartridge::load_bin(&bytes).unwrap();
        let mut bus = make_bus();
        bus.set_cartridge(cart);
        assert_eq!(bus.read(0xE000), 0x11);
    }
}
