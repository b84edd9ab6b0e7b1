//! Crate-level scenarios: reset, banking, cartridge auto-detection, and the
//! frame-ready handshake exercised together through `C64`/`C64Bus` rather
//! than through any single module's unit tests.

use emu_c64::{C64Config, C64};
use emu_core::Bus;

fn make_c64() -> C64 {
    let mut kernal = vec![0xEA; 8192]; // NOP sled
    kernal[0x1FFC] = 0x00;
    kernal[0x1FFD] = 0xE0; // reset vector -> $E000
    let basic = vec![0; 8192];
    let chargen = vec![0; 4096];
    C64::new(&C64Config::pal(kernal, basic, chargen))
}

#[test]
fn reset_vector_is_honored_on_construction() {
    let c64 = make_c64();
    assert_eq!(c64.cpu().pc(), 0xE000);
}

#[test]
fn basic_rom_banked_in_by_default_until_0001_changes() {
    let mut c64 = make_c64();
    // Put a known BASIC ROM byte where we can see it.
    c64.bus_mut().memory.ram_write(0xA000, 0x00); // irrelevant, RAM shadow
    assert!(c64.bus().memory.hiram());
    assert!(c64.bus().memory.loram());
}

#[test]
fn cbm80_cartridge_overrides_roml_and_sets_bank_lines() {
    let mut bytes = vec![0x77u8; 8192];
    bytes[4..9].copy_from_slice(&[0xC3, 0xC2, 0xCD, 0x38, 0x30]);
    bytes[0x1FFC] = 0x00;
    bytes[0x1FFD] = 0x80;

    let mut c64 = make_c64();
    c64.load_cartridge_bin(&bytes).expect("CBM80 image should auto-detect");

    let lines = c64.bus().cartridge.bank_lines();
    assert!(!lines.exrom);
    assert!(lines.game);
    assert_eq!(c64.bus_mut().read(0x8000), 0x77);
}

#[test]
fn invalid_cartridge_size_is_rejected() {
    let mut c64 = make_c64();
    assert!(c64.load_cartridge_bin(&[0u8; 123]).is_err());
}

#[test]
fn frame_ready_after_one_pal_frame_of_nops_and_handshake_drains() {
    let mut c64 = make_c64();
    let handshake = c64.frame_handshake();

    // PAL frame = 19,656 cycles; our NOP sled runs 2 cycles/instruction.
    let mut frames_seen = 0;
    for _ in 0..(19_656 / 2 + 5) {
        c64.step();
        if handshake.try_take_frame().is_some() {
            frames_seen += 1;
        }
    }
    assert_eq!(frames_seen, 1, "exactly one frame should complete within one frame's worth of NOPs");
    assert_eq!(c64.frame_count(), 1);
}

#[test]
fn stop_request_halts_run_until_stop() {
    let mut c64 = make_c64();
    let handshake = c64.frame_handshake();
    handshake.request_stop();
    let executed = c64.run_until_stop(1_000);
    assert_eq!(executed, 0, "a pre-existing stop request should prevent any instruction from running");
}
