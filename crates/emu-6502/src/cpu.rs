//! 6502 CPU implementation.
//!
//! Each `step()` fetches, decodes and fully executes exactly one
//! instruction (or services one pending interrupt), returning the number
//! of cycles it consumed. Addressing-mode resolution and the 256-entry
//! per-variant table live in `opcodes`; this module is the ALU and the
//! dispatch that ties a decoded opcode to register and bus effects.

use emu_core::{Bus, Observable, Value};

use crate::error::CpuError;
use crate::flags::{B, C, D, I, N, V, Z};
use crate::opcodes::{op_info, AddrMode, Mnemonic, OpInfo};
use crate::variant::Variant;
use crate::{Registers, Status};

/// Fires after every completed `step()`. Installed with
/// [`Mos6502::set_trace_hook`]; absent by default so tracing costs
/// nothing when unused.
pub struct TraceEvent {
    pub pc: u16,
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub cycles: u8,
}

/// The MOS 6502 CPU.
///
/// `variant` selects NMOS vs. CMOS behavior (decoder table, JMP-indirect
/// bug, BCD flag correctness, and BRK/IRQ effect on the D flag); see the
/// crate-level design notes for the full list of divergences.
pub struct Mos6502 {
    pub regs: Registers,
    pub variant: Variant,
    cycles: u64,
    pending_irq: bool,
    pending_nmi: bool,
    trace: Option<Box<dyn FnMut(TraceEvent)>>,
}

impl std::fmt::Debug for Mos6502 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mos6502")
            .field("regs", &self.regs)
            .field("variant", &self.variant)
            .field("cycles", &self.cycles)
            .field("pending_irq", &self.pending_irq)
            .field("pending_nmi", &self.pending_nmi)
            .finish_non_exhaustive()
    }
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new(Variant::default())
    }
}

impl Mos6502 {
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Self {
            regs: Registers::new(),
            variant,
            cycles: 0,
            pending_irq: false,
            pending_nmi: false,
            trace: None,
        }
    }

    /// Install (or remove, with `None`) a per-instruction trace callback.
    pub fn set_trace_hook(&mut self, hook: Option<Box<dyn FnMut(TraceEvent)>>) {
        self.trace = hook;
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    /// Reload `PC` from the reset vector, set `SP = $FD`, `P = 0x24`, and
    /// drop any pending interrupt latches. RAM is untouched by design:
    /// that is the bus owner's concern, not the CPU's.
    pub fn reset<B: Bus>(&mut self, bus: &mut B) {
        self.regs = Registers::new();
        self.regs.p = Status::from_byte(I | 0x20);
        self.regs.pc = bus.read_word(0xFFFC);
        self.pending_irq = false;
        self.pending_nmi = false;
        self.cycles = 0;
    }

    /// Latch a pending NMI. Edge-triggered: calling this twice before it
    /// is serviced has the same effect as calling it once.
    pub fn nmi(&mut self) {
        self.pending_nmi = true;
    }

    /// Assert the IRQ line. Level-sensitive: stays pending until serviced,
    /// and is only serviced while `P.I == 0`.
    pub fn irq(&mut self) {
        self.pending_irq = true;
    }

    /// Execute exactly one instruction, or service one pending interrupt
    /// if one is latched and (for IRQ) not masked. Returns cycles consumed.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u8 {
        if self.pending_nmi {
            self.pending_nmi = false;
            let cycles = self.service_interrupt(bus, 0xFFFA);
            self.cycles += u64::from(cycles);
            return cycles;
        }
        if self.pending_irq && !self.regs.p.is_set(I) {
            let cycles = self.service_interrupt(bus, 0xFFFE);
            self.cycles += u64::from(cycles);
            return cycles;
        }

        let pc_at_fetch = self.regs.pc;
        let opcode = self.fetch_byte(bus);
        let info = op_info(self.variant, opcode);
        let cycles = self.execute_instruction(bus, info);
        self.cycles += u64::from(cycles);

        if let Some(hook) = self.trace.as_mut() {
            hook(TraceEvent {
                pc: pc_at_fetch,
                opcode,
                mnemonic: info.mnemonic,
                cycles,
            });
        }

        cycles
    }

    /// Run `step()` until at least `max_cycles` cycles have been consumed.
    /// Never returns `Err`: overshoot past `max_cycles` by up to one
    /// instruction's worth of cycles is expected (an in-flight instruction
    /// is never split), per the crate's cycle-accounting invariants.
    /// `CycleExhaustion` remains available on [`CpuError`] for a stricter
    /// caller that wants to treat overshoot as failure.
    pub fn execute<B: Bus>(&mut self, bus: &mut B, max_cycles: u32) -> Result<u32, CpuError> {
        let mut consumed = 0u32;
        while consumed < max_cycles {
            consumed += u32::from(self.step(bus));
        }
        Ok(consumed)
    }

    fn service_interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16) -> u8 {
        let addr = self.regs.push();
        bus.write(addr, (self.regs.pc >> 8) as u8);
        let addr = self.regs.push();
        bus.write(addr, self.regs.pc as u8);
        let addr = self.regs.push();
        bus.write(addr, self.regs.p.to_byte_irq());
        self.regs.p.set(I);
        if self.variant.is_cmos() {
            self.regs.p.clear(D);
        }
        self.regs.pc = bus.read_word(vector);
        7
    }

    fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let v = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        v
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        (u16::from(hi) << 8) | u16::from(lo)
    }

    /// Effective address for every addressing mode that has one.
    /// Returns `(address, page_crossed)`; `page_crossed` is only ever
    /// true for the indexed/indirect-indexed modes.
    fn operand_addr<B: Bus>(&mut self, bus: &mut B, mode: AddrMode) -> (u16, bool) {
        match mode {
            AddrMode::ZeroPage => {
                let zp = self.fetch_byte(bus);
                (u16::from(zp), false)
            }
            AddrMode::ZeroPageX => {
                let zp = self.fetch_byte(bus);
                (u16::from(zp.wrapping_add(self.regs.x)), false)
            }
            AddrMode::ZeroPageY => {
                let zp = self.fetch_byte(bus);
                (u16::from(zp.wrapping_add(self.regs.y)), false)
            }
            AddrMode::Absolute => (self.fetch_word(bus), false),
            AddrMode::AbsoluteX => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(u16::from(self.regs.x));
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let addr = base.wrapping_add(u16::from(self.regs.y));
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            AddrMode::IndirectX => {
                let zp = self.fetch_byte(bus);
                let ptr = zp.wrapping_add(self.regs.x);
                let lo = bus.read(u16::from(ptr));
                let hi = bus.read(u16::from(ptr.wrapping_add(1)));
                ((u16::from(hi) << 8) | u16::from(lo), false)
            }
            AddrMode::IndirectY => {
                let zp = self.fetch_byte(bus);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                let base = (u16::from(hi) << 8) | u16::from(lo);
                let addr = base.wrapping_add(u16::from(self.regs.y));
                (addr, (base & 0xFF00) != (addr & 0xFF00))
            }
            AddrMode::IndirectZp => {
                let zp = self.fetch_byte(bus);
                let lo = bus.read(u16::from(zp));
                let hi = bus.read(u16::from(zp.wrapping_add(1)));
                ((u16::from(hi) << 8) | u16::from(lo), false)
            }
            AddrMode::Implied | AddrMode::Accumulator | AddrMode::Immediate
            | AddrMode::Relative | AddrMode::Indirect | AddrMode::ZeroPageRelative => {
                unreachable!("{mode:?} has no effective address")
            }
        }
    }

    /// Operand value for read-type instructions, including `Accumulator`
    /// and `Immediate` which `operand_addr` cannot express.
    fn read_operand<B: Bus>(&mut self, bus: &mut B, mode: AddrMode) -> (u8, bool) {
        match mode {
            AddrMode::Accumulator => (self.regs.a, false),
            AddrMode::Immediate => (self.fetch_byte(bus), false),
            _ => {
                let (addr, crossed) = self.operand_addr(bus, mode);
                (bus.read(addr), crossed)
            }
        }
    }

    /// Read-modify-write: read the operand, apply `f`, write the result
    /// back. NMOS re-writes the unmodified value first (a documented
    /// spurious write); CMOS does not.
    fn rmw<B: Bus>(&mut self, bus: &mut B, mode: AddrMode, f: fn(&mut Self, u8) -> u8) {
        if mode == AddrMode::Accumulator {
            let v = self.regs.a;
            self.regs.a = f(self, v);
            return;
        }
        let (addr, _) = self.operand_addr(bus, mode);
        let old = bus.read(addr);
        if !self.variant.is_cmos() {
            bus.write(addr, old);
        }
        let new = f(self, old);
        bus.write(addr, new);
    }

    fn op_branch<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u8 {
        let offset = self.fetch_byte(bus) as i8;
        if !taken {
            return 0;
        }
        let old_pc = self.regs.pc;
        let new_pc = old_pc.wrapping_add(i16::from(offset) as u16);
        self.regs.pc = new_pc;
        if (old_pc & 0xFF00) != (new_pc & 0xFF00) {
            2
        } else {
            1
        }
    }

    fn op_bbx<B: Bus>(&mut self, bus: &mut B, bit: u8, branch_if_set: bool) -> u8 {
        let zp = self.fetch_byte(bus);
        let val = bus.read(u16::from(zp));
        let offset = self.fetch_byte(bus) as i8;
        if (val & (1 << bit) != 0) != branch_if_set {
            return 0;
        }
        self.regs.pc = self.regs.pc.wrapping_add(i16::from(offset) as u16);
        1
    }

    fn op_rmb<B: Bus>(&mut self, bus: &mut B, bit: u8) {
        let zp = self.fetch_byte(bus);
        let addr = u16::from(zp);
        let v = bus.read(addr) & !(1 << bit);
        bus.write(addr, v);
    }

    fn op_smb<B: Bus>(&mut self, bus: &mut B, bit: u8) {
        let zp = self.fetch_byte(bus);
        let addr = u16::from(zp);
        let v = bus.read(addr) | (1 << bit);
        bus.write(addr, v);
    }

    fn op_brk<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let addr = self.regs.push();
        bus.write(addr, (self.regs.pc >> 8) as u8);
        let addr = self.regs.push();
        bus.write(addr, self.regs.pc as u8);
        let addr = self.regs.push();
        bus.write(addr, self.regs.p.to_byte_brk());
        self.regs.p.set(I);
        if self.variant.is_cmos() {
            self.regs.p.clear(D);
        }
        self.regs.pc = bus.read_word(0xFFFE);
    }

    fn op_rti<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.regs.pop();
        let p = bus.read(addr);
        self.regs.p = Status::from_byte(p);
        self.regs.p.clear(B);
        let addr = self.regs.pop();
        let lo = bus.read(addr);
        let addr = self.regs.pop();
        let hi = bus.read(addr);
        self.regs.pc = (u16::from(hi) << 8) | u16::from(lo);
    }

    fn op_rts<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.regs.pop();
        let lo = bus.read(addr);
        let addr = self.regs.pop();
        let hi = bus.read(addr);
        self.regs.pc = ((u16::from(hi) << 8) | u16::from(lo)).wrapping_add(1);
    }

    fn op_jsr<B: Bus>(&mut self, bus: &mut B) {
        let lo = bus.read(self.regs.pc);
        let ret = self.regs.pc.wrapping_add(1);
        let addr = self.regs.push();
        bus.write(addr, (ret >> 8) as u8);
        let addr = self.regs.push();
        bus.write(addr, ret as u8);
        let hi = bus.read(self.regs.pc.wrapping_add(1));
        self.regs.pc = (u16::from(hi) << 8) | u16::from(lo);
    }

    fn op_jmp_ind<B: Bus>(&mut self, bus: &mut B) {
        let ptr = self.fetch_word(bus);
        let lo = bus.read(ptr);
        let hi_addr = if self.variant.is_cmos() {
            ptr.wrapping_add(1)
        } else {
            (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF)
        };
        let hi = bus.read(hi_addr);
        self.regs.pc = (u16::from(hi) << 8) | u16::from(lo);
    }

    fn op_push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        bus.write(addr, value);
    }

    fn op_pop<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pop();
        bus.read(addr)
    }

    fn set_flag(&mut self, flag: u8, value: bool) {
        self.regs.p.set_if(flag, value);
    }

    // ------------------------------------------------------------------
    // ALU. N/Z/C/V formulas below are shared between NMOS and CMOS; only
    // decimal-mode N/Z correctness (do_adc/do_sbc) and cycle cost (the
    // dispatcher) vary by variant.
    // ------------------------------------------------------------------

    fn do_lda(&mut self, val: u8) {
        self.regs.a = val;
        self.regs.p.update_nz(val);
    }

    fn do_ldx(&mut self, val: u8) {
        self.regs.x = val;
        self.regs.p.update_nz(val);
    }

    fn do_ldy(&mut self, val: u8) {
        self.regs.y = val;
        self.regs.p.update_nz(val);
    }

    fn do_ora(&mut self, val: u8) {
        self.regs.a |= val;
        self.regs.p.update_nz(self.regs.a);
    }

    fn do_and(&mut self, val: u8) {
        self.regs.a &= val;
        self.regs.p.update_nz(self.regs.a);
    }

    fn do_eor(&mut self, val: u8) {
        self.regs.a ^= val;
        self.regs.p.update_nz(self.regs.a);
    }

    fn do_adc(&mut self, val: u8) {
        if self.regs.p.is_set(D) {
            self.do_adc_decimal(val);
        } else {
            self.do_adc_binary(val);
        }
    }

    fn do_adc_binary(&mut self, val: u8) {
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(C));
        let sum = u16::from(a) + u16::from(val) + carry;
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        self.regs.p.set_if(V, (a ^ result) & (val ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    fn do_adc_decimal(&mut self, val: u8) {
        let a = self.regs.a;
        let carry = u8::from(self.regs.p.is_set(C));

        let mut lo = (a & 0x0F) + (val & 0x0F) + carry;
        if lo > 9 {
            lo += 6;
        }
        let mut hi = (a >> 4) + (val >> 4) + u8::from(lo > 0x0F);

        // NMOS sets N/Z/V from the binary (not decimal-adjusted) sum.
        let bin_sum = u16::from(a) + u16::from(val) + u16::from(carry);
        let bin_result = bin_sum as u8;
        self.regs.p.set_if(Z, bin_result == 0);
        self.regs.p.set_if(N, hi & 0x08 != 0);
        self.regs.p.set_if(V, (a ^ bin_result) & (val ^ bin_result) & 0x80 != 0);

        if hi > 9 {
            hi += 6;
        }
        self.regs.p.set_if(C, hi > 0x0F);
        self.regs.a = (hi << 4) | (lo & 0x0F);

        // CMOS corrects N/Z against the final decimal-adjusted result.
        if self.variant.is_cmos() {
            self.regs.p.set_if(Z, self.regs.a == 0);
            self.regs.p.set_if(N, self.regs.a & 0x80 != 0);
        }
    }

    fn do_sbc(&mut self, val: u8) {
        if self.regs.p.is_set(D) {
            self.do_sbc_decimal(val);
        } else {
            self.do_adc_binary(!val);
        }
    }

    fn do_sbc_decimal(&mut self, val: u8) {
        let a = self.regs.a;
        let borrow = i16::from(!self.regs.p.is_set(C));

        let bin_result = i16::from(a) - i16::from(val) - borrow;
        self.regs.p.set_if(C, bin_result >= 0);
        self.regs.p.set_if(Z, (bin_result as u8) == 0);
        self.regs.p.set_if(N, bin_result & 0x80 != 0);
        self.regs.p.set_if(
            V,
            (i16::from(a) ^ bin_result) & (i16::from(a) ^ i16::from(val)) & 0x80 != 0,
        );

        let mut lo = i16::from(a & 0x0F) - i16::from(val & 0x0F) - borrow;
        let mut hi = i16::from(a >> 4) - i16::from(val >> 4);
        if lo < 0 {
            lo -= 6;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 6;
        }
        self.regs.a = ((hi << 4) as u8) | ((lo & 0x0F) as u8);

        if self.variant.is_cmos() {
            self.regs.p.set_if(Z, self.regs.a == 0);
            self.regs.p.set_if(N, self.regs.a & 0x80 != 0);
        }
    }

    fn do_cmp(&mut self, val: u8) {
        let result = self.regs.a.wrapping_sub(val);
        self.regs.p.set_if(C, self.regs.a >= val);
        self.regs.p.update_nz(result);
    }

    fn do_cpx(&mut self, val: u8) {
        let result = self.regs.x.wrapping_sub(val);
        self.regs.p.set_if(C, self.regs.x >= val);
        self.regs.p.update_nz(result);
    }

    fn do_cpy(&mut self, val: u8) {
        let result = self.regs.y.wrapping_sub(val);
        self.regs.p.set_if(C, self.regs.y >= val);
        self.regs.p.update_nz(result);
    }

    fn do_bit(&mut self, val: u8) {
        self.regs.p.set_if(Z, self.regs.a & val == 0);
        self.regs.p.set_if(N, val & 0x80 != 0);
        self.regs.p.set_if(V, val & 0x40 != 0);
    }

    fn do_asl(&mut self, val: u8) -> u8 {
        self.regs.p.set_if(C, val & 0x80 != 0);
        let result = val << 1;
        self.regs.p.update_nz(result);
        result
    }

    fn do_lsr(&mut self, val: u8) -> u8 {
        self.regs.p.set_if(C, val & 0x01 != 0);
        let result = val >> 1;
        self.regs.p.update_nz(result);
        result
    }

    fn do_rol(&mut self, val: u8) -> u8 {
        let carry = u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, val & 0x80 != 0);
        let result = (val << 1) | carry;
        self.regs.p.update_nz(result);
        result
    }

    fn do_ror(&mut self, val: u8) -> u8 {
        let carry = if self.regs.p.is_set(C) { 0x80 } else { 0 };
        self.regs.p.set_if(C, val & 0x01 != 0);
        let result = (val >> 1) | carry;
        self.regs.p.update_nz(result);
        result
    }

    fn do_inc(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    fn do_dec(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }

    #[allow(clippy::too_many_lines)]
    fn execute_instruction<B: Bus>(&mut self, bus: &mut B, info: OpInfo) -> u8 {
        use Mnemonic::{
            Adc, And, Asl, Bbr, Bbs, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Bra, Brk, Bvc, Bvs, Clc,
            Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp, JmpInd, Jsr, Lda,
            Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Phx, Phy, Pla, Plp, Plx, Ply, Rmb, Rol, Ror, Rti,
            Rts, Sbc, Sec, Sed, Sei, Smb, Sta, Stx, Sty, Stz, Tax, Tay, Tsx, Txa, Txs, Tya,
        };

        let mut cycles = u32::from(info.base_cycles);
        let mut page_crossed = false;

        match info.mnemonic {
            Lda => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_lda(v);
            }
            Ldx => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_ldx(v);
            }
            Ldy => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_ldy(v);
            }
            Ora => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_ora(v);
            }
            And => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_and(v);
            }
            Eor => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_eor(v);
            }
            Adc => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_adc(v);
                if self.regs.p.is_set(D) && self.variant.is_cmos() {
                    cycles += 1;
                }
            }
            Sbc => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_sbc(v);
                if self.regs.p.is_set(D) && self.variant.is_cmos() {
                    cycles += 1;
                }
            }
            Cmp => {
                let (v, c) = self.read_operand(bus, info.mode);
                page_crossed = c;
                self.do_cmp(v);
            }
            Cpx => {
                let (v, _) = self.read_operand(bus, info.mode);
                self.do_cpx(v);
            }
            Cpy => {
                let (v, _) = self.read_operand(bus, info.mode);
                self.do_cpy(v);
            }
            Bit => {
                let (v, _) = self.read_operand(bus, info.mode);
                self.do_bit(v);
            }
            Sta => {
                let (addr, _) = self.operand_addr(bus, info.mode);
                bus.write(addr, self.regs.a);
            }
            Stx => {
                let (addr, _) = self.operand_addr(bus, info.mode);
                bus.write(addr, self.regs.x);
            }
            Sty => {
                let (addr, _) = self.operand_addr(bus, info.mode);
                bus.write(addr, self.regs.y);
            }
            Stz => {
                let (addr, _) = self.operand_addr(bus, info.mode);
                bus.write(addr, 0);
            }
            Asl => self.rmw(bus, info.mode, Self::do_asl),
            Lsr => self.rmw(bus, info.mode, Self::do_lsr),
            Rol => self.rmw(bus, info.mode, Self::do_rol),
            Ror => self.rmw(bus, info.mode, Self::do_ror),
            Inc => self.rmw(bus, info.mode, Self::do_inc),
            Dec => self.rmw(bus, info.mode, Self::do_dec),
            Inx => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Iny => {
                self.regs.y = self.regs.y.wrapping_add(1);
                self.regs.p.update_nz(self.regs.y);
            }
            Dex => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.x);
            }
            Dey => {
                self.regs.y = self.regs.y.wrapping_sub(1);
                self.regs.p.update_nz(self.regs.y);
            }
            Tax => {
                self.regs.x = self.regs.a;
                self.regs.p.update_nz(self.regs.x);
            }
            Tay => {
                self.regs.y = self.regs.a;
                self.regs.p.update_nz(self.regs.y);
            }
            Txa => {
                self.regs.a = self.regs.x;
                self.regs.p.update_nz(self.regs.a);
            }
            Tya => {
                self.regs.a = self.regs.y;
                self.regs.p.update_nz(self.regs.a);
            }
            Tsx => {
                self.regs.x = self.regs.s;
                self.regs.p.update_nz(self.regs.x);
            }
            Txs => self.regs.s = self.regs.x,
            Clc => self.set_flag(C, false),
            Sec => self.set_flag(C, true),
            Cli => self.set_flag(I, false),
            Sei => self.set_flag(I, true),
            Cld => self.set_flag(D, false),
            Sed => self.set_flag(D, true),
            Clv => self.set_flag(V, false),
            Pha => self.op_push(bus, self.regs.a),
            Pla => {
                let v = self.op_pop(bus);
                self.regs.a = v;
                self.regs.p.update_nz(v);
            }
            Php => {
                let v = self.regs.p.to_byte_brk();
                self.op_push(bus, v);
            }
            Plp => {
                let v = self.op_pop(bus);
                self.regs.p = Status::from_byte(v);
                self.regs.p.clear(B);
            }
            Phx => self.op_push(bus, self.regs.x),
            Phy => self.op_push(bus, self.regs.y),
            Plx => {
                let v = self.op_pop(bus);
                self.regs.x = v;
                self.regs.p.update_nz(v);
            }
            Ply => {
                let v = self.op_pop(bus);
                self.regs.y = v;
                self.regs.p.update_nz(v);
            }
            Jmp => self.regs.pc = self.fetch_word(bus),
            JmpInd => self.op_jmp_ind(bus),
            Jsr => self.op_jsr(bus),
            Rts => self.op_rts(bus),
            Rti => self.op_rti(bus),
            Brk => self.op_brk(bus),
            Bpl => cycles += u32::from(self.op_branch(bus, !self.regs.p.is_set(N))),
            Bmi => cycles += u32::from(self.op_branch(bus, self.regs.p.is_set(N))),
            Bvc => cycles += u32::from(self.op_branch(bus, !self.regs.p.is_set(V))),
            Bvs => cycles += u32::from(self.op_branch(bus, self.regs.p.is_set(V))),
            Bcc => cycles += u32::from(self.op_branch(bus, !self.regs.p.is_set(C))),
            Bcs => cycles += u32::from(self.op_branch(bus, self.regs.p.is_set(C))),
            Bne => cycles += u32::from(self.op_branch(bus, !self.regs.p.is_set(Z))),
            Beq => cycles += u32::from(self.op_branch(bus, self.regs.p.is_set(Z))),
            Bra => cycles += u32::from(self.op_branch(bus, true)),
            Bbr(bit) => cycles += u32::from(self.op_bbx(bus, bit, false)),
            Bbs(bit) => cycles += u32::from(self.op_bbx(bus, bit, true)),
            Rmb(bit) => self.op_rmb(bus, bit),
            Smb(bit) => self.op_smb(bus, bit),
            Nop => {
                let (_, c) = match info.mode {
                    AddrMode::Implied | AddrMode::Accumulator => (0, false),
                    _ => self.read_operand(bus, info.mode),
                };
                page_crossed = c;
            }
        }

        if page_crossed && info.page_cross_adds_cycle {
            cycles += 1;
        }
        cycles as u8
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(self.regs.p.0.into()),
            "flags.c" | "c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" | "z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" | "i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" | "d" => Some(self.regs.p.is_set(D).into()),
            "flags.v" | "v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" | "n" => Some(self.regs.p.is_set(N).into()),
            "cycles" => Some(Value::U64(self.cycles)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.v",
            "flags.n", "cycles",
        ]
    }
}

impl<B: Bus> emu_core::Cpu<B> for Mos6502 {
    type Error = CpuError;

    fn reset(&mut self, bus: &mut B) {
        Mos6502::reset(self, bus);
    }

    fn irq(&mut self) {
        Mos6502::irq(self);
    }

    fn nmi(&mut self) {
        Mos6502::nmi(self);
    }

    fn step(&mut self, bus: &mut B) -> u8 {
        Mos6502::step(self, bus)
    }

    fn execute(&mut self, bus: &mut B, max_cycles: u32) -> Result<u32, Self::Error> {
        Mos6502::execute(self, bus, max_cycles)
    }

    fn pc(&self) -> u16 {
        Mos6502::pc(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn cpu_at(pc: u16) -> (Mos6502, SimpleBus) {
        let mut cpu = Mos6502::new(Variant::Nmos6502);
        cpu.regs.pc = pc;
        (cpu, SimpleBus::new())
    }

    #[test]
    fn reset_loads_vector_and_clears_flags() {
        let mut cpu = Mos6502::new(Variant::Nmos6502);
        let mut bus = SimpleBus::new();
        bus.load(0xFFFC, &[0x00, 0x80]);
        cpu.reset(&mut bus);
        assert_eq!(cpu.pc(), 0x8000);
        assert_eq!(cpu.regs.s, 0xFD);
        assert!(cpu.regs.p.is_set(I));
    }

    #[test]
    fn lda_adc_brk_sequence() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        bus.load(0x8000, &[0xA9, 0x05, 0x69, 0x03, 0x00]);
        bus.load(0xFFFE, &[0x00, 0x90]);

        let c1 = cpu.step(&mut bus);
        assert_eq!(c1, 2);
        let c2 = cpu.step(&mut bus);
        assert_eq!(c2, 2);
        assert_eq!(cpu.regs.a, 0x08);
        assert!(!cpu.regs.p.is_set(C));
        assert!(!cpu.regs.p.is_set(Z));
        assert!(!cpu.regs.p.is_set(N));
        assert!(!cpu.regs.p.is_set(V));

        let c3 = cpu.step(&mut bus);
        assert_eq!(c3, 7);
        assert_eq!(cpu.pc(), 0x9000);
    }

    #[test]
    fn lda_tax_transfers_and_sets_flags() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        bus.load(0x8000, &[0xA9, 0xFF, 0xAA]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0xFF);
        assert_eq!(cpu.regs.x, 0xFF);
        assert!(cpu.regs.p.is_set(N));
        assert!(!cpu.regs.p.is_set(Z));
    }

    #[test]
    fn zero_page_x_wraps() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        bus.load(0x8000, &[0xA2, 0x01, 0xB5, 0xFF]);
        bus.load(0x0000, &[0x42]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0x42);
    }

    #[test]
    fn branch_taken_across_page_costs_four_cycles() {
        let (mut cpu, mut bus) = cpu_at(0x80FE);
        bus.load(0x80FE, &[0xA9, 0x00]); // LDA #$00 sets Z
        bus.load(0x8100, &[0xF0, 0x05]); // BEQ +5, crosses page from $8102
        cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x8100);
        let c = cpu.step(&mut bus);
        assert_eq!(c, 4);
    }

    #[test]
    fn jmp_indirect_nmos_page_wrap_bug() {
        let (mut cpu, mut bus) = cpu_at(0x0000);
        bus.load(0x0000, &[0x6C, 0xFF, 0x10]);
        bus.load(0x10FF, &[0x00]);
        bus.load(0x1000, &[0x80]);
        bus.load(0x1100, &[0x12]);
        let c = cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x8000, "NMOS must fetch high byte from $1000, not $1100");
        assert_eq!(c, 5);
    }

    #[test]
    fn jmp_indirect_cmos_fixes_page_wrap() {
        let (mut cpu, mut bus) = cpu_at(0x0000);
        cpu.variant = Variant::Cmos65C02;
        bus.load(0x0000, &[0x6C, 0xFF, 0x10]);
        bus.load(0x10FF, &[0x00]);
        bus.load(0x1100, &[0x12]);
        let c = cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x1200);
        assert_eq!(c, 6);
    }

    #[test]
    fn php_plp_round_trips_with_break_forced_clear() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        cpu.regs.p = Status::from_byte(C | Z);
        bus.load(0x8000, &[0x08, 0x28]); // PHP, PLP
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert!(!cpu.regs.p.is_set(B));
        assert!(cpu.regs.p.is_set(C));
        assert!(cpu.regs.p.is_set(Z));
    }

    #[test]
    fn undefined_nmos_opcode_is_a_length_and_cycle_stable_nop() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        bus.load(0x8000, &[0x80, 0x00, 0xEA]); // undefined immediate NOP, then real NOP
        let c = cpu.step(&mut bus);
        assert_eq!(c, 2);
        assert_eq!(cpu.pc(), 0x8002);
    }

    #[test]
    fn cmos_extra_opcode_bra_is_unconditional() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        cpu.variant = Variant::Cmos65C02;
        bus.load(0x8000, &[0x80, 0x02]); // BRA +2
        let c = cpu.step(&mut bus);
        assert_eq!(cpu.pc(), 0x8004);
        assert_eq!(c, 3);
    }

    #[test]
    fn undefined_nmos_opcode_is_a_one_cycle_nop_on_cmos() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        cpu.variant = Variant::Cmos65C02;
        bus.load(0x8000, &[0x03, 0xEA]); // NMOS-illegal IndirectX slot, then real NOP
        let c = cpu.step(&mut bus);
        assert_eq!(c, 1);
        assert_eq!(cpu.pc(), 0x8001, "CMOS treats the slot as Implied, not IndirectX");
    }

    #[test]
    fn irq_masked_by_interrupt_disable_flag() {
        let (mut cpu, mut bus) = cpu_at(0x8000);
        cpu.regs.p.set(I);
        bus.load(0x8000, &[0xEA]);
        cpu.irq();
        let c = cpu.step(&mut bus);
        assert_eq!(c, 2, "NOP should run since IRQ is masked");
        assert_eq!(cpu.pc(), 0x8001);
    }
}
