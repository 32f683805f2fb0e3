//! ED-prefixed opcode handlers.
//!
//! Undefined ED slots execute as two-byte no-ops (8T in total). The Z80N
//! extensions live in [`super::next`] and are consulted before this table
//! when they are enabled.

use emu_core::IoBus;

use super::{OpHandler, Z80};
use crate::alu;
use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, parity, sz53, sz53p};

#[rustfmt::skip]
pub(super) static OPS: [OpHandler; 256] = [
    // 0x00
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    // 0x40
    in_r_c, out_c_r, sbc_hl_rp, ld_nni_rp, neg, retn, im_n, ld_i_a,
    in_r_c, out_c_r, adc_hl_rp, ld_rp_nni, neg, retn, im_n, ld_r_a,
    // 0x50
    in_r_c, out_c_r, sbc_hl_rp, ld_nni_rp, neg, retn, im_n, ld_a_i,
    in_r_c, out_c_r, adc_hl_rp, ld_rp_nni, neg, retn, im_n, ld_a_r,
    // 0x60
    in_r_c, out_c_r, sbc_hl_rp, ld_nni_rp, neg, retn, im_n, rrd,
    in_r_c, out_c_r, adc_hl_rp, ld_rp_nni, neg, retn, im_n, rld,
    // 0x70
    in_r_c, out_c_r, sbc_hl_rp, ld_nni_rp, neg, retn, im_n, ed_nop,
    in_r_c, out_c_r, adc_hl_rp, ld_rp_nni, neg, retn, im_n, ed_nop,
    // 0x80
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    // 0xa0
    ldi, cpi, ini, outi, ed_nop, ed_nop, ed_nop, ed_nop,
    ldd, cpd, ind, outd, ed_nop, ed_nop, ed_nop, ed_nop,
    // 0xb0
    ldir, cpir, inir, otir, ed_nop, ed_nop, ed_nop, ed_nop,
    lddr, cpdr, indr, otdr, ed_nop, ed_nop, ed_nop, ed_nop,
    // 0xc0
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    // 0xe0
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
    ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop, ed_nop,
];

fn ed_nop(_cpu: &mut Z80, _bus: &mut dyn IoBus) {}

// ---------------------------------------------------------------------
// I/O through register C

/// IN r,(C). The y=6 slot tests the input without storing it.
fn in_r_c(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let port = cpu.regs.bc();
    cpu.regs.wz = port.wrapping_add(1);
    let value = cpu.read_port(bus, port);
    cpu.regs.f = (cpu.regs.f & CF) | sz53p(value);
    let idx = (cpu.opcode >> 3) & 7;
    if idx != 6 {
        cpu.set_reg8(idx, value);
    }
}

/// OUT (C),r. The y=6 slot outputs 0 (NMOS behavior).
fn out_c_r(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let port = cpu.regs.bc();
    let idx = (cpu.opcode >> 3) & 7;
    let value = if idx == 6 { 0 } else { cpu.reg8(idx) };
    cpu.write_port(bus, port, value);
    cpu.regs.wz = port.wrapping_add(1);
}

// ---------------------------------------------------------------------
// 16-bit arithmetic and loads

fn sbc_hl_rp(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let hl = cpu.regs.hl();
    cpu.regs.wz = hl.wrapping_add(1);
    let operand = cpu.reg16((cpu.opcode >> 4) & 3);
    let (value, flags) = alu::sbc16(hl, operand, cpu.regs.f & CF != 0);
    cpu.regs.set_hl(value);
    cpu.regs.f = flags;
}

fn adc_hl_rp(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let hl = cpu.regs.hl();
    cpu.regs.wz = hl.wrapping_add(1);
    let operand = cpu.reg16((cpu.opcode >> 4) & 3);
    let (value, flags) = alu::adc16(hl, operand, cpu.regs.f & CF != 0);
    cpu.regs.set_hl(value);
    cpu.regs.f = flags;
}

fn ld_nni_rp(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    let value = cpu.reg16((cpu.opcode >> 4) & 3);
    cpu.write_mem(bus, address, value as u8);
    cpu.regs.wz = address.wrapping_add(1);
    cpu.write_mem(bus, cpu.regs.wz, (value >> 8) as u8);
}

fn ld_rp_nni(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    let lo = cpu.read_mem(bus, address);
    cpu.regs.wz = address.wrapping_add(1);
    let hi = cpu.read_mem(bus, cpu.regs.wz);
    cpu.set_reg16((cpu.opcode >> 4) & 3, u16::from(hi) << 8 | u16::from(lo));
}

// ---------------------------------------------------------------------
// Miscellaneous

fn neg(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let result = alu::sub8(0, cpu.regs.a, false);
    cpu.regs.a = result.value;
    cpu.regs.f = result.flags;
}

/// RETN and RETI share this: both restore IFF1 from IFF2 and return.
fn retn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.regs.iff1 = cpu.regs.iff2;
    cpu.ret_core(bus);
}

fn im_n(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.im = match (cpu.opcode >> 3) & 3 {
        2 => 1,
        3 => 2,
        _ => 0,
    };
}

fn ld_i_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.i = cpu.regs.a;
}

fn ld_r_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.r = cpu.regs.a;
}

fn ld_a_i(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.a = cpu.regs.i;
    // PV reports IFF2 so software can probe the interrupt state
    cpu.regs.f =
        (cpu.regs.f & CF) | sz53(cpu.regs.a) | if cpu.regs.iff2 { PF } else { 0 };
}

fn ld_a_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(1);
    cpu.regs.a = cpu.regs.r;
    cpu.regs.f =
        (cpu.regs.f & CF) | sz53(cpu.regs.a) | if cpu.regs.iff2 { PF } else { 0 };
}

fn rrd(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    cpu.regs.wz = address.wrapping_add(1);
    let value = cpu.read_mem(bus, address);
    cpu.internal(4);
    cpu.write_mem(bus, address, cpu.regs.a << 4 | value >> 4);
    cpu.regs.a = (cpu.regs.a & 0xF0) | (value & 0x0F);
    cpu.regs.f = (cpu.regs.f & CF) | sz53p(cpu.regs.a);
}

fn rld(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    cpu.regs.wz = address.wrapping_add(1);
    let value = cpu.read_mem(bus, address);
    cpu.internal(4);
    cpu.write_mem(bus, address, value << 4 | (cpu.regs.a & 0x0F));
    cpu.regs.a = (cpu.regs.a & 0xF0) | value >> 4;
    cpu.regs.f = (cpu.regs.f & CF) | sz53p(cpu.regs.a);
}

// ---------------------------------------------------------------------
// Block transfer

fn ldi_core(cpu: &mut Z80, bus: &mut dyn IoBus, step: i16) {
    let hl = cpu.regs.hl();
    let de = cpu.regs.de();
    let value = cpu.read_mem(bus, hl);
    cpu.write_mem(bus, de, value);
    cpu.internal(2);
    cpu.regs.set_hl(hl.wrapping_add_signed(step));
    cpu.regs.set_de(de.wrapping_add_signed(step));
    let bc = cpu.regs.bc().wrapping_sub(1);
    cpu.regs.set_bc(bc);
    // Y comes from bit 1 and X from bit 3 of value + A
    let n = value.wrapping_add(cpu.regs.a);
    cpu.regs.f = (cpu.regs.f & (SF | ZF | CF))
        | (n & XF)
        | if n & 0x02 != 0 { YF } else { 0 }
        | if bc != 0 { PF } else { 0 };
}

fn ldi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldi_core(cpu, bus, 1);
}

fn ldd(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldi_core(cpu, bus, -1);
}

fn ldir(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldi_core(cpu, bus, 1);
    ld_block_repeat(cpu);
}

fn lddr(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldi_core(cpu, bus, -1);
    ld_block_repeat(cpu);
}

fn ld_block_repeat(cpu: &mut Z80) {
    if cpu.regs.bc() != 0 {
        cpu.internal(5);
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
        cpu.regs.wz = cpu.regs.pc.wrapping_add(1);
    }
}

// ---------------------------------------------------------------------
// Block compare

fn cpi_core(cpu: &mut Z80, bus: &mut dyn IoBus, step: i16) {
    let hl = cpu.regs.hl();
    let value = cpu.read_mem(bus, hl);
    cpu.internal(5);
    cpu.regs.set_hl(hl.wrapping_add_signed(step));
    let bc = cpu.regs.bc().wrapping_sub(1);
    cpu.regs.set_bc(bc);
    let diff = cpu.regs.a.wrapping_sub(value);
    let half = cpu.regs.a & 0x0F < value & 0x0F;
    // Y and X come from the difference with the half borrow applied
    let n = diff.wrapping_sub(u8::from(half));
    cpu.regs.f = (cpu.regs.f & CF)
        | NF
        | if half { HF } else { 0 }
        | if diff == 0 { ZF } else { 0 }
        | (diff & SF)
        | if bc != 0 { PF } else { 0 }
        | if n & 0x02 != 0 { YF } else { 0 }
        | (n & XF);
    cpu.regs.wz = cpu.regs.wz.wrapping_add_signed(step);
}

fn cpi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpi_core(cpu, bus, 1);
}

fn cpd(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpi_core(cpu, bus, -1);
}

fn cpir(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpi_core(cpu, bus, 1);
    cp_block_repeat(cpu);
}

fn cpdr(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpi_core(cpu, bus, -1);
    cp_block_repeat(cpu);
}

/// Repeat while BC is nonzero and the match has not been found.
fn cp_block_repeat(cpu: &mut Z80) {
    if cpu.regs.f & PF != 0 && cpu.regs.f & ZF == 0 {
        cpu.internal(5);
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
        cpu.regs.wz = cpu.regs.pc.wrapping_add(1);
    }
}

// ---------------------------------------------------------------------
// Block I/O

fn ini_core(cpu: &mut Z80, bus: &mut dyn IoBus, step: i16) {
    cpu.internal(1);
    let port = cpu.regs.bc();
    cpu.regs.wz = port.wrapping_add_signed(step);
    let value = cpu.read_port(bus, port);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    let hl = cpu.regs.hl();
    cpu.write_mem(bus, hl, value);
    cpu.regs.set_hl(hl.wrapping_add_signed(step));
    let adjust = cpu.regs.c.wrapping_add_signed(step as i8);
    io_block_flags(cpu, value, adjust);
}

fn outi_core(cpu: &mut Z80, bus: &mut dyn IoBus, step: i16) {
    cpu.internal(1);
    let hl = cpu.regs.hl();
    let value = cpu.read_mem(bus, hl);
    cpu.regs.b = cpu.regs.b.wrapping_sub(1);
    let port = cpu.regs.bc();
    cpu.regs.wz = port.wrapping_add_signed(step);
    cpu.write_port(bus, port, value);
    cpu.regs.set_hl(hl.wrapping_add_signed(step));
    io_block_flags(cpu, value, cpu.regs.l);
}

/// Shared block I/O flag update. `adjust` is C+1/C-1 for the input forms
/// and the updated L for the output forms.
fn io_block_flags(cpu: &mut Z80, value: u8, adjust: u8) {
    let sum = u16::from(value) + u16::from(adjust);
    cpu.regs.f = sz53(cpu.regs.b)
        | if value & 0x80 != 0 { NF } else { 0 }
        | if sum > 0xFF { HF | CF } else { 0 }
        | if parity((sum & 7) as u8 ^ cpu.regs.b) { PF } else { 0 };
}

fn ini(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ini_core(cpu, bus, 1);
}

fn ind(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ini_core(cpu, bus, -1);
}

fn outi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    outi_core(cpu, bus, 1);
}

fn outd(cpu: &mut Z80, bus: &mut dyn IoBus) {
    outi_core(cpu, bus, -1);
}

fn inir(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ini_core(cpu, bus, 1);
    io_block_repeat(cpu);
}

fn indr(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ini_core(cpu, bus, -1);
    io_block_repeat(cpu);
}

fn otir(cpu: &mut Z80, bus: &mut dyn IoBus) {
    outi_core(cpu, bus, 1);
    io_block_repeat(cpu);
}

fn otdr(cpu: &mut Z80, bus: &mut dyn IoBus) {
    outi_core(cpu, bus, -1);
    io_block_repeat(cpu);
}

// Unlike the LD/CP repeaters, the I/O forms keep the WZ value set by
// their core (BC before/after the B decrement) on every iteration.
fn io_block_repeat(cpu: &mut Z80) {
    if cpu.regs.b != 0 {
        cpu.internal(5);
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
    }
}
