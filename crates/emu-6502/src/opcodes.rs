//! The 256-entry instruction table: opcode -> (mnemonic, addressing mode,
//! base cycles, page-cross cycle rule).
//!
//! `op_info` is the table. It is a function rather than a literal array
//! because roughly two dozen slots are variant-dependent (CMOS adds real
//! instructions where NMOS has an undefined-opcode NOP); encoding that as
//! two full 256-entry arrays would duplicate the 151 shared legal entries.

use crate::variant::Variant;

/// Effective-address computation. Mirrors the spec's addressing-mode list;
/// `ZeroPageRelative` is the CMOS BBR/BBS operand shape (zero page address
/// then a branch displacement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    IndirectZp,
    Relative,
    ZeroPageRelative,
}

/// The operation a slot performs. Undefined opcodes all decode to `Nop`:
/// the addressing mode still determines how many bytes and cycles the
/// instruction consumes (so cycle-counting test ROMs see a stable result),
/// but no opcode beyond the documented 151 (plus CMOS extensions) has any
/// effect on registers or memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, JmpInd, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx,
    Txa, Txs, Tya,
    // CMOS 65C02 extensions.
    Bra, Stz, Phx, Phy, Plx, Ply,
    Rmb(u8), Smb(u8), Bbr(u8), Bbs(u8),
}

/// One instruction table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub mnemonic: Mnemonic,
    pub mode: AddrMode,
    pub base_cycles: u8,
    pub page_cross_adds_cycle: bool,
}

const fn op(mnemonic: Mnemonic, mode: AddrMode, base_cycles: u8) -> OpInfo {
    OpInfo {
        mnemonic,
        mode,
        base_cycles,
        page_cross_adds_cycle: false,
    }
}

const fn op_pc(mnemonic: Mnemonic, mode: AddrMode, base_cycles: u8) -> OpInfo {
    OpInfo {
        mnemonic,
        mode,
        base_cycles,
        page_cross_adds_cycle: true,
    }
}

/// Look up the table entry for `opcode` under `variant`.
#[must_use]
pub const fn op_info(variant: Variant, opcode: u8) -> OpInfo {
    if variant.is_cmos() {
        if let Some(entry) = cmos_override(opcode) {
            return entry;
        }
    }
    nmos_table(opcode)
}

/// CMOS slots that diverge from the NMOS table. `None` means "use the
/// shared NMOS entry" (including the shared legal opcodes and the
/// documented-NOP treatment of everything else).
const fn cmos_override(opcode: u8) -> Option<OpInfo> {
    use AddrMode::{Absolute, AbsoluteX, Implied, IndirectZp, ZeroPage, ZeroPageRelative, ZeroPageX};
    use Mnemonic::{Bbr, Bbs, Bra, Phx, Phy, Plx, Ply, Rmb, Smb, Stz};

    let bit = (opcode >> 4) & 0x07;
    Some(match opcode {
        0x80 => op_pc(Bra, AddrMode::Relative, 2),
        0x5A => op(Phy, Implied, 3),
        0xDA => op(Phx, Implied, 3),
        0x7A => op(Ply, Implied, 4),
        0xFA => op(Plx, Implied, 4),
        0x64 => op(Stz, ZeroPage, 3),
        0x74 => op(Stz, ZeroPageX, 4),
        0x9C => op(Stz, Absolute, 4),
        0x9E => op(Stz, AbsoluteX, 5),
        0x12 => op(Mnemonic::Ora, IndirectZp, 5),
        0x32 => op(Mnemonic::And, IndirectZp, 5),
        0x52 => op(Mnemonic::Eor, IndirectZp, 5),
        0x72 => op(Mnemonic::Adc, IndirectZp, 5),
        0x92 => op(Mnemonic::Sta, IndirectZp, 5),
        0xB2 => op(Mnemonic::Lda, IndirectZp, 5),
        0xD2 => op(Mnemonic::Cmp, IndirectZp, 5),
        0xF2 => op(Mnemonic::Sbc, IndirectZp, 5),
        0x07 | 0x17 | 0x27 | 0x37 | 0x47 | 0x57 | 0x67 | 0x77 => op(Rmb(bit), ZeroPage, 5),
        0x87 | 0x97 | 0xA7 | 0xB7 | 0xC7 | 0xD7 | 0xE7 | 0xF7 => op(Smb(bit), ZeroPage, 5),
        0x0F | 0x1F | 0x2F | 0x3F | 0x4F | 0x5F | 0x6F | 0x7F => op(Bbr(bit), ZeroPageRelative, 5),
        0x8F | 0x9F | 0xAF | 0xBF | 0xCF | 0xDF | 0xEF | 0xFF => op(Bbs(bit), ZeroPageRelative, 5),
        // JMP (ind) loses the NMOS page-wrap bug on CMOS at the cost of a cycle.
        0x6C => op(Mnemonic::JmpInd, AddrMode::Indirect, 6),
        // Every slot NMOS treats as an illegal/unofficial opcode is a true
        // 1-cycle Implied NOP on CMOS: the 65C02 defines no side effects for
        // these, unlike the NMOS bus-glitch behaviors they fell into.
        _ if !is_nmos_documented(opcode) => op(Mnemonic::Nop, Implied, 1),
        _ => return None,
    })
}

/// True for every opcode the NMOS table assigns a real mnemonic other than
/// the undefined-opcode `Nop` catch-all (i.e. the 151 legal/shared opcodes).
const fn is_nmos_documented(opcode: u8) -> bool {
    !matches!(
        opcode,
        0x1A | 0x3A
            | 0x5A
            | 0x7A
            | 0xDA
            | 0xFA
            | 0x02
            | 0x12
            | 0x22
            | 0x32
            | 0x42
            | 0x52
            | 0x62
            | 0x72
            | 0x92
            | 0xB2
            | 0xD2
            | 0xF2
            | 0x80
            | 0x82
            | 0x89
            | 0xC2
            | 0xE2
            | 0x0B
            | 0x2B
            | 0x4B
            | 0x6B
            | 0x8B
            | 0xAB
            | 0xCB
            | 0xEB
            | 0x04
            | 0x44
            | 0x64
            | 0x87
            | 0xA7
            | 0x07
            | 0x27
            | 0x47
            | 0x67
            | 0xC7
            | 0xE7
            | 0x97
            | 0xB7
            | 0x14
            | 0x34
            | 0x54
            | 0x74
            | 0xD4
            | 0xF4
            | 0x17
            | 0x37
            | 0x57
            | 0x77
            | 0xD7
            | 0xF7
            | 0x0C
            | 0x1C
            | 0x3C
            | 0x5C
            | 0x7C
            | 0xDC
            | 0xFC
            | 0x0F
            | 0x2F
            | 0x4F
            | 0x6F
            | 0x8F
            | 0xAF
            | 0xCF
            | 0xEF
            | 0x83
            | 0xA3
            | 0x03
            | 0x23
            | 0x43
            | 0x63
            | 0xC3
            | 0xE3
            | 0xB3
            | 0x93
            | 0x13
            | 0x33
            | 0x53
            | 0x73
            | 0xD3
            | 0xF3
            | 0xBF
            | 0xBB
            | 0x9F
            | 0x9B
            | 0x9E
            | 0x9C
            | 0x1B
            | 0x3B
            | 0x5B
            | 0x7B
            | 0xDB
            | 0xFB
            | 0x1F
            | 0x3F
            | 0x5F
            | 0x7F
            | 0xDF
            | 0xFF
    )
}

/// The shared NMOS table. Every slot not documented as a legal opcode is
/// `Nop` with the addressing mode and cycle count this implementation has
/// chosen to present for it; full illegal-opcode ALU fidelity is out of
/// scope (see the crate's design notes).
#[allow(clippy::too_many_lines)]
const fn nmos_table(opcode: u8) -> OpInfo {
    use AddrMode::{
        Absolute, AbsoluteX, AbsoluteY, Accumulator, Immediate, Implied, Indirect, IndirectX,
        IndirectY, Relative, ZeroPage, ZeroPageX, ZeroPageY,
    };
    use Mnemonic::{
        Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp,
        Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, JmpInd, Jsr, Lda, Ldx, Ldy, Lsr, Nop,
        Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
        Tsx, Txa, Txs, Tya,
    };

    match opcode {
        0x00 => op(Brk, Implied, 7),
        0x01 => op(Ora, IndirectX, 6),
        0x05 => op(Ora, ZeroPage, 3),
        0x06 => op(Asl, ZeroPage, 5),
        0x08 => op(Php, Implied, 3),
        0x09 => op(Ora, Immediate, 2),
        0x0A => op(Asl, Accumulator, 2),
        0x0D => op(Ora, Absolute, 4),
        0x0E => op(Asl, Absolute, 6),
        0x10 => op_pc(Bpl, Relative, 2),
        0x11 => op_pc(Ora, IndirectY, 5),
        0x15 => op(Ora, ZeroPageX, 4),
        0x16 => op(Asl, ZeroPageX, 6),
        0x18 => op(Clc, Implied, 2),
        0x19 => op_pc(Ora, AbsoluteY, 4),
        0x1D => op_pc(Ora, AbsoluteX, 4),
        0x1E => op(Asl, AbsoluteX, 7),
        0x20 => op(Jsr, Absolute, 6),
        0x21 => op(And, IndirectX, 6),
        0x24 => op(Bit, ZeroPage, 3),
        0x25 => op(And, ZeroPage, 3),
        0x26 => op(Rol, ZeroPage, 5),
        0x28 => op(Plp, Implied, 4),
        0x29 => op(And, Immediate, 2),
        0x2A => op(Rol, Accumulator, 2),
        0x2C => op(Bit, Absolute, 4),
        0x2D => op(And, Absolute, 4),
        0x2E => op(Rol, Absolute, 6),
        0x30 => op_pc(Bmi, Relative, 2),
        0x31 => op_pc(And, IndirectY, 5),
        0x35 => op(And, ZeroPageX, 4),
        0x36 => op(Rol, ZeroPageX, 6),
        0x38 => op(Sec, Implied, 2),
        0x39 => op_pc(And, AbsoluteY, 4),
        0x3D => op_pc(And, AbsoluteX, 4),
        0x3E => op(Rol, AbsoluteX, 7),
        0x40 => op(Rti, Implied, 6),
        0x41 => op(Eor, IndirectX, 6),
        0x45 => op(Eor, ZeroPage, 3),
        0x46 => op(Lsr, ZeroPage, 5),
        0x48 => op(Pha, Implied, 3),
        0x49 => op(Eor, Immediate, 2),
        0x4A => op(Lsr, Accumulator, 2),
        0x4C => op(Jmp, Absolute, 3),
        0x4D => op(Eor, Absolute, 4),
        0x4E => op(Lsr, Absolute, 6),
        0x50 => op_pc(Bvc, Relative, 2),
        0x51 => op_pc(Eor, IndirectY, 5),
        0x55 => op(Eor, ZeroPageX, 4),
        0x56 => op(Lsr, ZeroPageX, 6),
        0x58 => op(Cli, Implied, 2),
        0x59 => op_pc(Eor, AbsoluteY, 4),
        0x5D => op_pc(Eor, AbsoluteX, 4),
        0x5E => op(Lsr, AbsoluteX, 7),
        0x60 => op(Rts, Implied, 6),
        0x61 => op(Adc, IndirectX, 6),
        0x65 => op(Adc, ZeroPage, 3),
        0x66 => op(Ror, ZeroPage, 5),
        0x68 => op(Pla, Implied, 4),
        0x69 => op(Adc, Immediate, 2),
        0x6A => op(Ror, Accumulator, 2),
        0x6C => op(JmpInd, Indirect, 5),
        0x6D => op(Adc, Absolute, 4),
        0x6E => op(Ror, Absolute, 6),
        0x70 => op_pc(Bvs, Relative, 2),
        0x71 => op_pc(Adc, IndirectY, 5),
        0x75 => op(Adc, ZeroPageX, 4),
        0x76 => op(Ror, ZeroPageX, 6),
        0x78 => op(Sei, Implied, 2),
        0x79 => op_pc(Adc, AbsoluteY, 4),
        0x7D => op_pc(Adc, AbsoluteX, 4),
        0x7E => op(Ror, AbsoluteX, 7),
        0x81 => op(Sta, IndirectX, 6),
        0x84 => op(Sty, ZeroPage, 3),
        0x85 => op(Sta, ZeroPage, 3),
        0x86 => op(Stx, ZeroPage, 3),
        0x88 => op(Dey, Implied, 2),
        0x8A => op(Txa, Implied, 2),
        0x8C => op(Sty, Absolute, 4),
        0x8D => op(Sta, Absolute, 4),
        0x8E => op(Stx, Absolute, 4),
        0x90 => op_pc(Bcc, Relative, 2),
        0x91 => op(Sta, IndirectY, 6),
        0x94 => op(Sty, ZeroPageX, 4),
        0x95 => op(Sta, ZeroPageX, 4),
        0x96 => op(Stx, ZeroPageY, 4),
        0x98 => op(Tya, Implied, 2),
        0x99 => op(Sta, AbsoluteY, 5),
        0x9A => op(Txs, Implied, 2),
        0x9D => op(Sta, AbsoluteX, 5),
        0xA0 => op(Ldy, Immediate, 2),
        0xA1 => op(Lda, IndirectX, 6),
        0xA2 => op(Ldx, Immediate, 2),
        0xA4 => op(Ldy, ZeroPage, 3),
        0xA5 => op(Lda, ZeroPage, 3),
        0xA6 => op(Ldx, ZeroPage, 3),
        0xA8 => op(Tay, Implied, 2),
        0xA9 => op(Lda, Immediate, 2),
        0xAA => op(Tax, Implied, 2),
        0xAC => op(Ldy, Absolute, 4),
        0xAD => op(Lda, Absolute, 4),
        0xAE => op(Ldx, Absolute, 4),
        0xB0 => op_pc(Bcs, Relative, 2),
        0xB1 => op_pc(Lda, IndirectY, 5),
        0xB4 => op(Ldy, ZeroPageX, 4),
        0xB5 => op(Lda, ZeroPageX, 4),
        0xB6 => op(Ldx, ZeroPageY, 4),
        0xB8 => op(Clv, Implied, 2),
        0xB9 => op_pc(Lda, AbsoluteY, 4),
        0xBA => op(Tsx, Implied, 2),
        0xBC => op_pc(Ldy, AbsoluteX, 4),
        0xBD => op_pc(Lda, AbsoluteX, 4),
        0xBE => op_pc(Ldx, AbsoluteY, 4),
        0xC0 => op(Cpy, Immediate, 2),
        0xC1 => op(Cmp, IndirectX, 6),
        0xC4 => op(Cpy, ZeroPage, 3),
        0xC5 => op(Cmp, ZeroPage, 3),
        0xC6 => op(Dec, ZeroPage, 5),
        0xC8 => op(Iny, Implied, 2),
        0xC9 => op(Cmp, Immediate, 2),
        0xCA => op(Dex, Implied, 2),
        0xCC => op(Cpy, Absolute, 4),
        0xCD => op(Cmp, Absolute, 4),
        0xCE => op(Dec, Absolute, 6),
        0xD0 => op_pc(Bne, Relative, 2),
        0xD1 => op_pc(Cmp, IndirectY, 5),
        0xD5 => op(Cmp, ZeroPageX, 4),
        0xD6 => op(Dec, ZeroPageX, 6),
        0xD8 => op(Cld, Implied, 2),
        0xD9 => op_pc(Cmp, AbsoluteY, 4),
        0xDD => op_pc(Cmp, AbsoluteX, 4),
        0xDE => op(Dec, AbsoluteX, 7),
        0xE0 => op(Cpx, Immediate, 2),
        0xE1 => op(Sbc, IndirectX, 6),
        0xE4 => op(Cpx, ZeroPage, 3),
        0xE5 => op(Sbc, ZeroPage, 3),
        0xE6 => op(Inc, ZeroPage, 5),
        0xE8 => op(Inx, Implied, 2),
        0xE9 => op(Sbc, Immediate, 2),
        0xEA => op(Nop, Implied, 2),
        0xEC => op(Cpx, Absolute, 4),
        0xED => op(Sbc, Absolute, 4),
        0xEE => op(Inc, Absolute, 6),
        0xF0 => op_pc(Beq, Relative, 2),
        0xF1 => op_pc(Sbc, IndirectY, 5),
        0xF5 => op(Sbc, ZeroPageX, 4),
        0xF6 => op(Inc, ZeroPageX, 6),
        0xF8 => op(Sed, Implied, 2),
        0xF9 => op_pc(Sbc, AbsoluteY, 4),
        0xFD => op_pc(Sbc, AbsoluteX, 4),
        0xFE => op(Inc, AbsoluteX, 7),

        // Undefined opcodes: documented stable NOP. The addressing mode
        // picked for each slot follows the classic NOP/DOP/TOP grouping
        // used by NES/C64 test ROMs, so instruction length and cycle
        // count are stable even though no register/memory effect occurs.
        0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA | 0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52
        | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => op(Nop, Implied, 2),
        0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 | 0x0B | 0x2B | 0x4B | 0x6B | 0x8B | 0xAB | 0xCB
        | 0xEB => op(Nop, Immediate, 2),
        0x04 | 0x44 | 0x64 | 0x87 | 0xA7 => op(Nop, ZeroPage, 3),
        0x07 | 0x27 | 0x47 | 0x67 | 0xC7 | 0xE7 => op(Nop, ZeroPage, 5),
        0x97 | 0xB7 => op(Nop, ZeroPageY, 4),
        0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => op(Nop, ZeroPageX, 4),
        0x17 | 0x37 | 0x57 | 0x77 | 0xD7 | 0xF7 => op(Nop, ZeroPageX, 6),
        0x0C => op(Nop, Absolute, 4),
        0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => op_pc(Nop, AbsoluteX, 4),
        0x0F | 0x2F | 0x4F | 0x6F | 0x8F | 0xAF | 0xCF | 0xEF => op(Nop, Absolute, 6),
        0x83 | 0xA3 => op(Nop, IndirectX, 6),
        0x03 | 0x23 | 0x43 | 0x63 | 0xC3 | 0xE3 => op(Nop, IndirectX, 8),
        0xB3 => op_pc(Nop, IndirectY, 5),
        0x93 => op(Nop, IndirectY, 6),
        0x13 | 0x33 | 0x53 | 0x73 | 0xD3 | 0xF3 => op(Nop, IndirectY, 8),
        0xBF | 0xBB => op_pc(Nop, AbsoluteY, 4),
        0x9F | 0x9B | 0x9E => op(Nop, AbsoluteY, 5),
        0x9C => op(Nop, AbsoluteX, 5),
        0x1B | 0x3B | 0x5B | 0x7B | 0xDB | 0xFB => op(Nop, AbsoluteY, 7),
        0x1F | 0x3F | 0x5F | 0x7F | 0xDF | 0xFF => op(Nop, AbsoluteX, 7),
    }
}
