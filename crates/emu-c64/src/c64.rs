//! Top-level C64 system.
//!
//! Drives the CPU instruction-by-instruction: each `step()` fully executes
//! one 6502 instruction, reports the cycles it took, and those cycles feed
//! the VIC-II raster counter. When the counter wraps a frame, the current
//! RAM is snapshotted and handed to the frame-ready handshake for a
//! (separately threaded) renderer to pick up. Producer and consumer never
//! share a lock beyond the handshake itself — see `frame.rs`.

#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;

use emu_6502::{Mos6502, Variant};
use emu_core::{Cpu, Observable, Value};

use crate::bus::C64Bus;
use crate::cartridge::Cartridge;
use crate::config::C64Config;
use crate::error::C64Error;
use crate::frame::FrameHandshake;
use crate::memory::C64Memory;
use crate::vic::Vic;

/// C64 system: CPU, bus, and the frame-ready handshake to a renderer.
pub struct C64 {
    cpu: Mos6502,
    bus: C64Bus,
    /// CPU cycles elapsed since construction.
    master_clock: u64,
    /// Completed frame counter.
    frame_count: u64,
    frames: Arc<FrameHandshake>,
}

impl C64 {
    /// Create a new C64 from the given configuration.
    #[must_use]
    pub fn new(config: &C64Config) -> Self {
        let memory = C64Memory::new(&config.kernal_rom, &config.basic_rom, &config.char_rom);
        let vic = Vic::new(config.vic_variant);
        let mut bus = C64Bus::new(memory, vic);

        let mut cpu = Mos6502::new(Variant::Nmos6502);
        cpu.reset(&mut bus);

        Self {
            cpu,
            bus,
            master_clock: 0,
            frame_count: 0,
            frames: Arc::new(FrameHandshake::new()),
        }
    }

    /// The shared frame-ready handshake. Clone the `Arc` to hand to a
    /// renderer thread.
    #[must_use]
    pub fn frame_handshake(&self) -> Arc<FrameHandshake> {
        Arc::clone(&self.frames)
    }

    /// Install a cartridge, asserting its EXROM/GAME lines on the bus.
    pub fn set_cartridge(&mut self, cartridge: Cartridge) {
        self.bus.set_cartridge(cartridge);
    }

    /// Auto-detect and install a raw `.bin` cartridge image.
    ///
    /// # Errors
    ///
    /// See `Cartridge::load_bin`.
    pub fn load_cartridge_bin(&mut self, bytes: &[u8]) -> Result<(), C64Error> {
        self.bus.set_cartridge(Cartridge::load_bin(bytes)?);
        Ok(())
    }

    /// Parse and install a CRT-format cartridge image.
    ///
    /// # Errors
    ///
    /// See `Cartridge::load_crt`.
    pub fn load_cartridge_crt(&mut self, bytes: &[u8]) -> Result<(), C64Error> {
        self.bus.set_cartridge(Cartridge::load_crt(bytes)?);
        Ok(())
    }

    /// Execute a single instruction, advance the VIC-II raster counter by
    /// the cycles it took, and publish a frame snapshot if the raster
    /// wrapped. Returns the number of cycles executed. Never blocks.
    pub fn step(&mut self) -> u8 {
        let cycles = self.cpu.step(&mut self.bus);
        self.master_clock += u64::from(cycles);
        self.bus.vic.tick(u16::from(cycles));

        if self.bus.vic.take_frame_ready() {
            self.frame_count += 1;
            self.frames.publish_frame(&self.bus.memory.ram_snapshot());
        }

        cycles
    }

    /// Run instructions until the frame handshake signals a stop request,
    /// or until `max_instructions` have executed (whichever comes first).
    /// Returns the number of instructions executed.
    pub fn run_until_stop(&mut self, max_instructions: u64) -> u64 {
        let mut executed = 0;
        while executed < max_instructions && !self.frames.should_stop() {
            self.step();
            executed += 1;
        }
        executed
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    /// Mutable reference to the CPU.
    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    /// Reference to the bus.
    #[must_use]
    pub fn bus(&self) -> &C64Bus {
        &self.bus
    }

    /// Mutable reference to the bus.
    pub fn bus_mut(&mut self) -> &mut C64Bus {
        &mut self.bus
    }

    /// CPU cycles elapsed since construction.
    #[must_use]
    pub fn master_clock(&self) -> u64 {
        self.master_clock
    }

    /// Completed frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Observable for C64 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("vic.") {
            match rest {
                "raster_y" => Some(self.bus.vic.raster_y().into()),
                "cycle_in_line" => Some(self.bus.vic.cycle_in_line().into()),
                _ => None,
            }
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) =
                rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
            {
                u16::from_str_radix(hex, 16).ok()
            } else if let Some(hex) = rest.strip_prefix('$') {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.bus.memory.peek(a)))
        } else {
            match path {
                "master_clock" => Some(self.master_clock.into()),
                "frame_count" => Some(self.frame_count.into()),
                _ => self.cpu.query(path),
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502_paths>",
            "vic.raster_y",
            "vic.cycle_in_line",
            "memory.<address>",
            "master_clock",
            "frame_count",
        ]
    }
}
