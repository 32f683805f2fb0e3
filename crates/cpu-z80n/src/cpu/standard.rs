//! Unprefixed opcode handlers and their dispatch table.
//!
//! Handlers decode register, pair and condition fields from the latched
//! opcode byte, so one handler covers a whole opcode family. The four
//! prefix slots (0xCB, 0xDD, 0xED, 0xFD) are intercepted by the fetch loop
//! and never dispatched through this table; their entries are `nop` only
//! to keep the table total.

use emu_core::IoBus;

use super::{OpHandler, Z80};
use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity};

#[rustfmt::skip]
pub(super) static OPS: [OpHandler; 256] = [
    // 0x00
    nop, ld_rp_nn, ld_bci_a, inc_rp, inc_r, dec_r, ld_r_n, rlca,
    ex_af_af, add_hl_rp, ld_a_bci, dec_rp, inc_r, dec_r, ld_r_n, rrca,
    // 0x10
    djnz, ld_rp_nn, ld_dei_a, inc_rp, inc_r, dec_r, ld_r_n, rla,
    jr_e, add_hl_rp, ld_a_dei, dec_rp, inc_r, dec_r, ld_r_n, rra,
    // 0x20
    jr_cc_e, ld_rp_nn, ld_nni_hl, inc_rp, inc_r, dec_r, ld_r_n, daa,
    jr_cc_e, add_hl_rp, ld_hl_nni, dec_rp, inc_r, dec_r, ld_r_n, cpl,
    // 0x30
    jr_cc_e, ld_rp_nn, ld_nni_a, inc_rp, inc_hli, dec_hli, ld_hli_n, scf,
    jr_cc_e, add_hl_rp, ld_a_nni, dec_rp, inc_r, dec_r, ld_r_n, ccf,
    // 0x40
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    // 0x50
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    // 0x60
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    // 0x70
    ld_hli_r, ld_hli_r, ld_hli_r, ld_hli_r, ld_hli_r, ld_hli_r, halt, ld_hli_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_r_hli, ld_r_r,
    // 0x80
    add_a_r, add_a_r, add_a_r, add_a_r, add_a_r, add_a_r, add_a_hli, add_a_r,
    adc_a_r, adc_a_r, adc_a_r, adc_a_r, adc_a_r, adc_a_r, adc_a_hli, adc_a_r,
    // 0x90
    sub_a_r, sub_a_r, sub_a_r, sub_a_r, sub_a_r, sub_a_r, sub_a_hli, sub_a_r,
    sbc_a_r, sbc_a_r, sbc_a_r, sbc_a_r, sbc_a_r, sbc_a_r, sbc_a_hli, sbc_a_r,
    // 0xa0
    and_a_r, and_a_r, and_a_r, and_a_r, and_a_r, and_a_r, and_a_hli, and_a_r,
    xor_a_r, xor_a_r, xor_a_r, xor_a_r, xor_a_r, xor_a_r, xor_a_hli, xor_a_r,
    // 0xb0
    or_a_r, or_a_r, or_a_r, or_a_r, or_a_r, or_a_r, or_a_hli, or_a_r,
    cp_a_r, cp_a_r, cp_a_r, cp_a_r, cp_a_r, cp_a_r, cp_a_hli, cp_a_r,
    // 0xc0
    ret_cc, pop_rp, jp_cc_nn, jp_nn, call_cc_nn, push_rp, add_a_n, rst_n,
    ret_cc, ret, jp_cc_nn, nop, call_cc_nn, call_nn, adc_a_n, rst_n,
    // 0xd0
    ret_cc, pop_rp, jp_cc_nn, out_n_a, call_cc_nn, push_rp, sub_a_n, rst_n,
    ret_cc, exx, jp_cc_nn, in_a_n, call_cc_nn, nop, sbc_a_n, rst_n,
    // 0xe0
    ret_cc, pop_rp, jp_cc_nn, ex_spi_hl, call_cc_nn, push_rp, and_a_n, rst_n,
    ret_cc, jp_hl, jp_cc_nn, ex_de_hl, call_cc_nn, nop, xor_a_n, rst_n,
    // 0xf0
    ret_cc, pop_rp, jp_cc_nn, di, call_cc_nn, push_rp, or_a_n, rst_n,
    ret_cc, ld_sp_hl, jp_cc_nn, ei, call_cc_nn, nop, cp_a_n, rst_n,
];

pub(super) fn nop(_cpu: &mut Z80, _bus: &mut dyn IoBus) {}

// ---------------------------------------------------------------------
// 8-bit loads

pub(super) fn ld_r_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode & 7);
    cpu.set_reg8((cpu.opcode >> 3) & 7, value);
}

pub(super) fn ld_r_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_byte(bus);
    cpu.set_reg8((cpu.opcode >> 3) & 7, value);
}

pub(super) fn ld_r_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    cpu.set_reg8((cpu.opcode >> 3) & 7, value);
}

pub(super) fn ld_hli_r(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode & 7);
    cpu.write_mem(bus, cpu.regs.hl(), value);
}

pub(super) fn ld_hli_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_byte(bus);
    cpu.write_mem(bus, cpu.regs.hl(), value);
}

pub(super) fn ld_bci_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.bc();
    cpu.write_mem(bus, address, cpu.regs.a);
    // WZ low tracks the address increment, WZ high takes A
    cpu.regs.set_wl(address.wrapping_add(1) as u8);
    cpu.regs.set_wh(cpu.regs.a);
}

pub(super) fn ld_dei_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.de();
    cpu.write_mem(bus, address, cpu.regs.a);
    cpu.regs.set_wl(address.wrapping_add(1) as u8);
    cpu.regs.set_wh(cpu.regs.a);
}

pub(super) fn ld_a_bci(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.bc();
    cpu.regs.wz = address.wrapping_add(1);
    cpu.regs.a = cpu.read_mem(bus, address);
}

pub(super) fn ld_a_dei(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.de();
    cpu.regs.wz = address.wrapping_add(1);
    cpu.regs.a = cpu.read_mem(bus, address);
}

pub(super) fn ld_nni_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    cpu.write_mem(bus, address, cpu.regs.a);
    cpu.regs.set_wl(address.wrapping_add(1) as u8);
    cpu.regs.set_wh(cpu.regs.a);
}

pub(super) fn ld_a_nni(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    cpu.regs.wz = address.wrapping_add(1);
    cpu.regs.a = cpu.read_mem(bus, address);
}

// ---------------------------------------------------------------------
// 16-bit loads

pub(super) fn ld_rp_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_word(bus);
    cpu.set_reg16((cpu.opcode >> 4) & 3, value);
}

pub(super) fn ld_nni_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    cpu.write_mem(bus, address, cpu.regs.l);
    cpu.regs.wz = address.wrapping_add(1);
    cpu.write_mem(bus, cpu.regs.wz, cpu.regs.h);
}

pub(super) fn ld_hl_nni(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    cpu.regs.l = cpu.read_mem(bus, address);
    cpu.regs.wz = address.wrapping_add(1);
    cpu.regs.h = cpu.read_mem(bus, cpu.regs.wz);
}

pub(super) fn ld_sp_hl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    cpu.regs.sp = cpu.regs.hl();
}

pub(super) fn pop_rp(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.pop_word(bus);
    cpu.set_reg16_stk((cpu.opcode >> 4) & 3, value);
}

pub(super) fn push_rp(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    let value = cpu.reg16_stk((cpu.opcode >> 4) & 3);
    cpu.push_word(bus, value);
}

// ---------------------------------------------------------------------
// Exchanges

pub(super) fn ex_af_af(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    core::mem::swap(&mut cpu.regs.a, &mut cpu.regs.a_alt);
    core::mem::swap(&mut cpu.regs.f, &mut cpu.regs.f_alt);
}

pub(super) fn exx(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    core::mem::swap(&mut cpu.regs.b, &mut cpu.regs.b_alt);
    core::mem::swap(&mut cpu.regs.c, &mut cpu.regs.c_alt);
    core::mem::swap(&mut cpu.regs.d, &mut cpu.regs.d_alt);
    core::mem::swap(&mut cpu.regs.e, &mut cpu.regs.e_alt);
    core::mem::swap(&mut cpu.regs.h, &mut cpu.regs.h_alt);
    core::mem::swap(&mut cpu.regs.l, &mut cpu.regs.l_alt);
}

pub(super) fn ex_de_hl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    core::mem::swap(&mut cpu.regs.d, &mut cpu.regs.h);
    core::mem::swap(&mut cpu.regs.e, &mut cpu.regs.l);
}

pub(super) fn ex_spi_hl(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let sp = cpu.regs.sp;
    let lo = cpu.read_mem(bus, sp);
    let hi = cpu.read_mem(bus, sp.wrapping_add(1));
    cpu.internal(1);
    cpu.write_mem(bus, sp.wrapping_add(1), cpu.regs.h);
    cpu.write_mem(bus, sp, cpu.regs.l);
    cpu.internal(2);
    cpu.regs.wz = u16::from(hi) << 8 | u16::from(lo);
    cpu.regs.set_hl(cpu.regs.wz);
}

// ---------------------------------------------------------------------
// 8-bit arithmetic and logic

macro_rules! alu_handlers {
    ($reg:ident, $hli:ident, $imm:ident, $op:ident, $carry:expr) => {
        pub(super) fn $reg(cpu: &mut Z80, _bus: &mut dyn IoBus) {
            let value = cpu.reg8(cpu.opcode & 7);
            apply_acc(cpu, alu::$op(cpu.regs.a, value, $carry(cpu)));
        }

        fn $hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
            let value = cpu.read_mem(bus, cpu.regs.hl());
            apply_acc(cpu, alu::$op(cpu.regs.a, value, $carry(cpu)));
        }

        pub(super) fn $imm(cpu: &mut Z80, bus: &mut dyn IoBus) {
            let value = cpu.fetch_byte(bus);
            apply_acc(cpu, alu::$op(cpu.regs.a, value, $carry(cpu)));
        }
    };
}

pub(super) fn no_carry(_cpu: &Z80) -> bool {
    false
}

pub(super) fn carry_in(cpu: &Z80) -> bool {
    cpu.regs.f & CF != 0
}

pub(super) fn apply_acc(cpu: &mut Z80, result: alu::AluResult) {
    cpu.regs.a = result.value;
    cpu.regs.f = result.flags;
}

alu_handlers!(add_a_r, add_a_hli, add_a_n, add8, no_carry);
alu_handlers!(adc_a_r, adc_a_hli, adc_a_n, add8, carry_in);
alu_handlers!(sub_a_r, sub_a_hli, sub_a_n, sub8, no_carry);
alu_handlers!(sbc_a_r, sbc_a_hli, sbc_a_n, sub8, carry_in);

macro_rules! logic_handlers {
    ($reg:ident, $hli:ident, $imm:ident, $op:ident) => {
        pub(super) fn $reg(cpu: &mut Z80, _bus: &mut dyn IoBus) {
            let value = cpu.reg8(cpu.opcode & 7);
            apply_acc(cpu, alu::$op(cpu.regs.a, value));
        }

        fn $hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
            let value = cpu.read_mem(bus, cpu.regs.hl());
            apply_acc(cpu, alu::$op(cpu.regs.a, value));
        }

        pub(super) fn $imm(cpu: &mut Z80, bus: &mut dyn IoBus) {
            let value = cpu.fetch_byte(bus);
            apply_acc(cpu, alu::$op(cpu.regs.a, value));
        }
    };
}

logic_handlers!(and_a_r, and_a_hli, and_a_n, and8);
logic_handlers!(xor_a_r, xor_a_hli, xor_a_n, xor8);
logic_handlers!(or_a_r, or_a_hli, or_a_n, or8);

pub(super) fn cp_a_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode & 7);
    cpu.regs.f = alu::cp8(cpu.regs.a, value).flags;
}

pub(super) fn cp_a_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    cpu.regs.f = alu::cp8(cpu.regs.a, value).flags;
}

pub(super) fn cp_a_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_byte(bus);
    cpu.regs.f = alu::cp8(cpu.regs.a, value).flags;
}

pub(super) fn inc_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = (cpu.opcode >> 3) & 7;
    let result = alu::inc8(cpu.reg8(idx));
    cpu.set_reg8(idx, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

pub(super) fn dec_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = (cpu.opcode >> 3) & 7;
    let result = alu::dec8(cpu.reg8(idx));
    cpu.set_reg8(idx, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

pub(super) fn inc_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = alu::inc8(value);
    cpu.write_mem(bus, address, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

pub(super) fn dec_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = alu::dec8(value);
    cpu.write_mem(bus, address, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

// ---------------------------------------------------------------------
// 16-bit arithmetic

pub(super) fn add_hl_rp(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let hl = cpu.regs.hl();
    cpu.regs.wz = hl.wrapping_add(1);
    let (value, flags) = alu::add16(hl, cpu.reg16((cpu.opcode >> 4) & 3));
    cpu.regs.set_hl(value);
    cpu.regs.f = (cpu.regs.f & (SF | ZF | PF)) | flags;
}

pub(super) fn inc_rp(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    let idx = (cpu.opcode >> 4) & 3;
    cpu.set_reg16(idx, cpu.reg16(idx).wrapping_add(1));
}

pub(super) fn dec_rp(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    let idx = (cpu.opcode >> 4) & 3;
    cpu.set_reg16(idx, cpu.reg16(idx).wrapping_sub(1));
}

// ---------------------------------------------------------------------
// Accumulator rotates and flag operations

pub(super) fn rlca(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let carry = cpu.regs.a & 0x80 != 0;
    cpu.regs.a = cpu.regs.a.rotate_left(1);
    cpu.regs.f =
        (cpu.regs.f & (SF | ZF | PF)) | (cpu.regs.a & (YF | XF)) | if carry { CF } else { 0 };
}

pub(super) fn rrca(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let carry = cpu.regs.a & 0x01 != 0;
    cpu.regs.a = cpu.regs.a.rotate_right(1);
    cpu.regs.f =
        (cpu.regs.f & (SF | ZF | PF)) | (cpu.regs.a & (YF | XF)) | if carry { CF } else { 0 };
}

pub(super) fn rla(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let carry = cpu.regs.a & 0x80 != 0;
    cpu.regs.a = cpu.regs.a << 1 | (cpu.regs.f & CF);
    cpu.regs.f =
        (cpu.regs.f & (SF | ZF | PF)) | (cpu.regs.a & (YF | XF)) | if carry { CF } else { 0 };
}

pub(super) fn rra(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let carry = cpu.regs.a & 0x01 != 0;
    cpu.regs.a = cpu.regs.a >> 1 | (cpu.regs.f & CF) << 7;
    cpu.regs.f =
        (cpu.regs.f & (SF | ZF | PF)) | (cpu.regs.a & (YF | XF)) | if carry { CF } else { 0 };
}

pub(super) fn daa(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let a = cpu.regs.a;
    let carry = cpu.regs.f & CF != 0 || a > 0x99;
    let mut correction = 0u8;
    if cpu.regs.f & HF != 0 || a & 0x0F > 0x09 {
        correction |= 0x06;
    }
    if carry {
        correction |= 0x60;
    }
    let result = if cpu.regs.f & NF != 0 {
        alu::sub8(a, correction, false)
    } else {
        alu::add8(a, correction, false)
    };
    cpu.regs.a = result.value;
    // Carry out is a BCD overflow, parity replaces arithmetic overflow
    cpu.regs.f = (result.flags & !(CF | PF))
        | if carry { CF } else { 0 }
        | if parity(result.value) { PF } else { 0 };
}

pub(super) fn cpl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.a = !cpu.regs.a;
    cpu.regs.f = (cpu.regs.f & (SF | ZF | PF | CF)) | HF | NF | (cpu.regs.a & (YF | XF));
}

pub(super) fn scf(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.f = (cpu.regs.f & (SF | ZF | PF)) | (cpu.regs.a & (YF | XF)) | CF;
}

pub(super) fn ccf(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let carry = cpu.regs.f & CF != 0;
    cpu.regs.f = (cpu.regs.f & (SF | ZF | PF))
        | (cpu.regs.a & (YF | XF))
        | if carry { HF } else { CF };
}

// ---------------------------------------------------------------------
// Jumps, calls and returns

pub(super) fn djnz(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    let dist = cpu.fetch_byte(bus);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    if cpu.regs.b != 0 {
        cpu.relative_jump(dist);
    }
}

pub(super) fn jr_e(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let dist = cpu.fetch_byte(bus);
    cpu.relative_jump(dist);
}

pub(super) fn jr_cc_e(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let dist = cpu.fetch_byte(bus);
    // JR maps NZ/Z/NC/C onto condition indices 0..3
    if cpu.condition(((cpu.opcode >> 3) & 7) - 4) {
        cpu.relative_jump(dist);
    }
}

pub(super) fn jp_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.regs.wz = cpu.fetch_word(bus);
    cpu.regs.pc = cpu.regs.wz;
}

pub(super) fn jp_cc_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.regs.wz = cpu.fetch_word(bus);
    if cpu.condition((cpu.opcode >> 3) & 7) {
        cpu.regs.pc = cpu.regs.wz;
    }
}

pub(super) fn jp_hl(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.pc = cpu.regs.hl();
}

pub(super) fn call_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.regs.wz = cpu.fetch_word(bus);
    cpu.call_core(bus);
}

pub(super) fn call_cc_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.regs.wz = cpu.fetch_word(bus);
    if cpu.condition((cpu.opcode >> 3) & 7) {
        cpu.call_core(bus);
    }
}

pub(super) fn ret(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.ret_core(bus);
}

pub(super) fn ret_cc(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    if cpu.condition((cpu.opcode >> 3) & 7) {
        cpu.ret_core(bus);
    }
}

pub(super) fn rst_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let target = u16::from(cpu.opcode & 0x38);
    cpu.rst_core(bus, target);
}

// ---------------------------------------------------------------------
// I/O, interrupt control, HALT

pub(super) fn out_n_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let n = cpu.fetch_byte(bus);
    let port = u16::from(cpu.regs.a) << 8 | u16::from(n);
    // WZ low wraps within the low byte, WZ high keeps A
    cpu.regs.set_wl(n.wrapping_add(1));
    cpu.regs.set_wh(cpu.regs.a);
    cpu.write_port(bus, port, cpu.regs.a);
}

pub(super) fn in_a_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let n = cpu.fetch_byte(bus);
    let port = u16::from(cpu.regs.a) << 8 | u16::from(n);
    cpu.regs.wz = port.wrapping_add(1);
    cpu.regs.a = cpu.read_port(bus, port);
}

pub(super) fn di(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.iff1 = false;
    cpu.regs.iff2 = false;
}

pub(super) fn ei(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.iff1 = true;
    cpu.regs.iff2 = true;
    // The instruction after EI always runs before an interrupt is taken
    cpu.ei_backlog = 2;
}

pub(super) fn halt(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.halted = true;
    // PC stays on the HALT opcode until an interrupt releases it
    cpu.regs.pc = cpu.regs.pc.wrapping_sub(1);
}
