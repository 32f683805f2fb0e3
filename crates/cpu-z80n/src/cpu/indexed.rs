//! DD/FD-prefixed opcode handlers.
//!
//! The active prefix selects IX or IY through `Z80::index`. Slots the
//! prefix does not affect dispatch straight to the standard handlers, so
//! a useless prefix costs its 4T and nothing else.

use emu_core::IoBus;

use super::standard::{
    add_a_r, adc_a_r, and_a_r, call_cc_nn, call_nn, ccf, cp_a_n, cp_a_r, cpl, daa, dec_r,
    dec_rp, di, djnz, ei, ex_af_af, ex_de_hl, exx, halt, in_a_n, inc_r, inc_rp, jp_cc_nn,
    jp_nn, jr_cc_e, jr_e, ld_a_bci, ld_a_dei, ld_a_nni, ld_bci_a, ld_dei_a, ld_nni_a,
    ld_r_n, ld_r_r, ld_rp_nn, nop, or_a_r, out_n_a, pop_rp, push_rp, ret, ret_cc, rla,
    rlca, rra, rrca, rst_n, sbc_a_r, scf, sub_a_r, xor_a_r,
};
use super::standard::{
    adc_a_n, add_a_n, and_a_n, or_a_n, sbc_a_n, sub_a_n, xor_a_n,
};
use super::{OpHandler, Z80};
use crate::alu;
use crate::flags::{CF, PF, SF, ZF};

#[rustfmt::skip]
pub(super) static OPS: [OpHandler; 256] = [
    // 0x00
    nop, ld_rp_nn, ld_bci_a, inc_rp, inc_r, dec_r, ld_r_n, rlca,
    ex_af_af, add_ix_rp, ld_a_bci, dec_rp, inc_r, dec_r, ld_r_n, rrca,
    // 0x10
    djnz, ld_rp_nn, ld_dei_a, inc_rp, inc_r, dec_r, ld_r_n, rla,
    jr_e, add_ix_rp, ld_a_dei, dec_rp, inc_r, dec_r, ld_r_n, rra,
    // 0x20
    jr_cc_e, ld_ix_nn, ld_nni_ix, inc_ix, inc_rx, dec_rx, ld_rx_n, daa,
    jr_cc_e, add_ix_rp, ld_ix_nni, dec_ix, inc_rx, dec_rx, ld_rx_n, cpl,
    // 0x30
    jr_cc_e, ld_rp_nn, ld_nni_a, inc_rp, inc_xi, dec_xi, ld_xi_n, scf,
    jr_cc_e, add_ix_rp, ld_a_nni, dec_rp, inc_r, dec_r, ld_r_n, ccf,
    // 0x40
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_r_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_r_r,
    // 0x50
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_r_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_r_r,
    // 0x60: XH/XL destinations, except LD H,(IX+d) which loads real H
    ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_rx_rx,
    ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_rx_rx,
    // 0x70
    ld_xi_r, ld_xi_r, ld_xi_r, ld_xi_r, ld_xi_r, ld_xi_r, halt, ld_xi_r,
    ld_r_r, ld_r_r, ld_r_r, ld_r_r, ld_rx_rx, ld_rx_rx, ld_r_xi, ld_r_r,
    // 0x80
    add_a_r, add_a_r, add_a_r, add_a_r, alu_a_rx, alu_a_rx, alu_a_xi, add_a_r,
    adc_a_r, adc_a_r, adc_a_r, adc_a_r, alu_a_rx, alu_a_rx, alu_a_xi, adc_a_r,
    // 0x90
    sub_a_r, sub_a_r, sub_a_r, sub_a_r, alu_a_rx, alu_a_rx, alu_a_xi, sub_a_r,
    sbc_a_r, sbc_a_r, sbc_a_r, sbc_a_r, alu_a_rx, alu_a_rx, alu_a_xi, sbc_a_r,
    // 0xa0
    and_a_r, and_a_r, and_a_r, and_a_r, alu_a_rx, alu_a_rx, alu_a_xi, and_a_r,
    xor_a_r, xor_a_r, xor_a_r, xor_a_r, alu_a_rx, alu_a_rx, alu_a_xi, xor_a_r,
    // 0xb0
    or_a_r, or_a_r, or_a_r, or_a_r, alu_a_rx, alu_a_rx, alu_a_xi, or_a_r,
    cp_a_r, cp_a_r, cp_a_r, cp_a_r, alu_a_rx, alu_a_rx, alu_a_xi, cp_a_r,
    // 0xc0
    ret_cc, pop_rp, jp_cc_nn, jp_nn, call_cc_nn, push_rp, add_a_n, rst_n,
    ret_cc, ret, jp_cc_nn, nop, call_cc_nn, call_nn, adc_a_n, rst_n,
    // 0xd0
    ret_cc, pop_rp, jp_cc_nn, out_n_a, call_cc_nn, push_rp, sub_a_n, rst_n,
    ret_cc, exx, jp_cc_nn, in_a_n, call_cc_nn, nop, sbc_a_n, rst_n,
    // 0xe0
    ret_cc, pop_ix, jp_cc_nn, ex_spi_ix, call_cc_nn, push_ix, and_a_n, rst_n,
    ret_cc, jp_ix, jp_cc_nn, ex_de_hl, call_cc_nn, nop, xor_a_n, rst_n,
    // 0xf0
    ret_cc, pop_rp, jp_cc_nn, di, call_cc_nn, push_rp, or_a_n, rst_n,
    ret_cc, ld_sp_ix, jp_cc_nn, ei, call_cc_nn, nop, cp_a_n, rst_n,
];

// ---------------------------------------------------------------------
// 16-bit index arithmetic and loads

fn add_ix_rp(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(7);
    let index = cpu.index();
    cpu.regs.wz = index.wrapping_add(1);
    // The HL slot of the pair field reads the index register itself
    let operand = match (cpu.opcode >> 4) & 3 {
        0 => cpu.regs.bc(),
        1 => cpu.regs.de(),
        2 => index,
        _ => cpu.regs.sp,
    };
    let (value, flags) = alu::add16(index, operand);
    cpu.set_index(value);
    cpu.regs.f = (cpu.regs.f & (SF | ZF | PF)) | flags;
}

fn ld_ix_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_word(bus);
    cpu.set_index(value);
}

fn ld_nni_ix(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    cpu.write_mem(bus, address, cpu.index_l());
    cpu.regs.wz = address.wrapping_add(1);
    cpu.write_mem(bus, cpu.regs.wz, cpu.index_h());
}

fn ld_ix_nni(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_word(bus);
    let lo = cpu.read_mem(bus, address);
    cpu.regs.wz = address.wrapping_add(1);
    let hi = cpu.read_mem(bus, cpu.regs.wz);
    cpu.set_index(u16::from(hi) << 8 | u16::from(lo));
}

fn inc_ix(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    cpu.set_index(cpu.index().wrapping_add(1));
}

fn dec_ix(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    cpu.set_index(cpu.index().wrapping_sub(1));
}

// ---------------------------------------------------------------------
// Half-index registers (undocumented)

fn inc_rx(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = (cpu.opcode >> 3) & 7;
    let result = alu::inc8(cpu.index_reg8(idx));
    cpu.set_index_reg8(idx, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

fn dec_rx(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = (cpu.opcode >> 3) & 7;
    let result = alu::dec8(cpu.index_reg8(idx));
    cpu.set_index_reg8(idx, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

fn ld_rx_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_byte(bus);
    cpu.set_index_reg8((cpu.opcode >> 3) & 7, value);
}

fn ld_rx_rx(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.index_reg8(cpu.opcode & 7);
    cpu.set_index_reg8((cpu.opcode >> 3) & 7, value);
}

fn alu_a_rx(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.index_reg8(cpu.opcode & 7);
    apply_alu(cpu, value);
}

// ---------------------------------------------------------------------
// (IX+d) operands

fn ld_r_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_displacement(bus);
    let value = cpu.read_mem(bus, address);
    cpu.set_reg8((cpu.opcode >> 3) & 7, value);
}

fn ld_xi_r(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_displacement(bus);
    let value = cpu.reg8(cpu.opcode & 7);
    cpu.write_mem(bus, address, value);
}

fn ld_xi_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    // Shorter padding: the immediate fetch overlaps the address math
    let dist = cpu.fetch_byte(bus) as i8;
    let value = cpu.fetch_byte(bus);
    cpu.internal(2);
    cpu.regs.wz = cpu.index().wrapping_add_signed(i16::from(dist));
    cpu.write_mem(bus, cpu.regs.wz, value);
}

fn inc_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_displacement(bus);
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = alu::inc8(value);
    cpu.write_mem(bus, address, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

fn dec_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_displacement(bus);
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = alu::dec8(value);
    cpu.write_mem(bus, address, result.value);
    cpu.regs.f = (cpu.regs.f & CF) | result.flags;
}

fn alu_a_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.fetch_displacement(bus);
    let value = cpu.read_mem(bus, address);
    apply_alu(cpu, value);
}

/// Accumulator operation selected by bits 3..5 of the opcode.
fn apply_alu(cpu: &mut Z80, value: u8) {
    let a = cpu.regs.a;
    let carry = cpu.regs.f & CF != 0;
    let result = match (cpu.opcode >> 3) & 7 {
        0 => alu::add8(a, value, false),
        1 => alu::add8(a, value, carry),
        2 => alu::sub8(a, value, false),
        3 => alu::sub8(a, value, carry),
        4 => alu::and8(a, value),
        5 => alu::xor8(a, value),
        6 => alu::or8(a, value),
        _ => {
            cpu.regs.f = alu::cp8(a, value).flags;
            return;
        }
    };
    cpu.regs.a = result.value;
    cpu.regs.f = result.flags;
}

// ---------------------------------------------------------------------
// Stack and control flow through the index register

fn pop_ix(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.pop_word(bus);
    cpu.set_index(value);
}

fn push_ix(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    let value = cpu.index();
    cpu.push_word(bus, value);
}

fn ex_spi_ix(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let sp = cpu.regs.sp;
    let lo = cpu.read_mem(bus, sp);
    let hi = cpu.read_mem(bus, sp.wrapping_add(1));
    cpu.internal(1);
    cpu.write_mem(bus, sp.wrapping_add(1), cpu.index_h());
    cpu.write_mem(bus, sp, cpu.index_l());
    cpu.internal(2);
    cpu.regs.wz = u16::from(hi) << 8 | u16::from(lo);
    cpu.set_index(cpu.regs.wz);
}

fn jp_ix(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.pc = cpu.index();
}

fn ld_sp_ix(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.internal(2);
    cpu.regs.sp = cpu.index();
}
