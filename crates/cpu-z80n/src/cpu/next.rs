//! Z80N opcode handlers: the ZX Spectrum Next additions to the ED page.
//!
//! These are consulted before the standard ED table and only when the CPU
//! was built with [`Z80::new_z80n`]. None of them touch the flags except
//! TEST.

use emu_core::IoBus;

use super::{OpHandler, Z80};
use crate::alu;

/// TBBlue register select port.
const REG_SELECT_PORT: u16 = 0x243B;
/// TBBlue register access port.
const REG_ACCESS_PORT: u16 = 0x253B;

/// Map an ED-page opcode to its Z80N handler, if the slot is a Z80N
/// instruction.
pub(super) fn lookup(opcode: u8) -> Option<OpHandler> {
    Some(match opcode {
        0x23 => swapnib,
        0x24 => mirror_a,
        0x27 => test_n,
        0x28 => bsla_de_b,
        0x29 => bsra_de_b,
        0x2A => bsrl_de_b,
        0x2B => bsrf_de_b,
        0x2C => brlc_de_b,
        0x30 => mul_d_e,
        0x31 => add_hl_a,
        0x32 => add_de_a,
        0x33 => add_bc_a,
        0x34 => add_hl_nn,
        0x35 => add_de_nn,
        0x36 => add_bc_nn,
        0x8A => push_nn,
        0x90 => outinb,
        0x91 => nextreg_n_n,
        0x92 => nextreg_n_a,
        0x93 => pixeldn,
        0x94 => pixelad,
        0x95 => setae,
        0x98 => jp_ci,
        0xA4 => ldix,
        0xA5 => ldws,
        0xAC => lddx,
        0xB4 => ldirx,
        0xB7 => ldpirx,
        0xBC => lddrx,
        _ => return None,
    })
}

// ---------------------------------------------------------------------
// Accumulator and DE bit twiddling

fn swapnib(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.a = cpu.regs.a.rotate_left(4);
}

fn mirror_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.a = cpu.regs.a.reverse_bits();
}

fn test_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_byte(bus);
    cpu.regs.f = alu::and8(cpu.regs.a, value).flags;
}

fn bsla_de_b(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let count = u32::from(cpu.regs.b & 0x1F);
    let de = cpu.regs.de();
    cpu.regs.set_de(if count >= 16 { 0 } else { de << count });
}

fn bsra_de_b(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    // Sign-filling shift; counts past 15 leave only the sign
    let count = u32::from(cpu.regs.b & 0x1F).min(15);
    let de = cpu.regs.de() as i16;
    cpu.regs.set_de((de >> count) as u16);
}

fn bsrl_de_b(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let count = u32::from(cpu.regs.b & 0x1F);
    let de = cpu.regs.de();
    cpu.regs.set_de(if count >= 16 { 0 } else { de >> count });
}

fn bsrf_de_b(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    // One-filling shift
    let count = u32::from(cpu.regs.b & 0x1F);
    let de = cpu.regs.de();
    cpu.regs
        .set_de(if count >= 16 { 0xFFFF } else { !(!de >> count) });
}

fn brlc_de_b(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let count = u32::from(cpu.regs.b & 0x0F);
    cpu.regs.set_de(cpu.regs.de().rotate_left(count));
}

// ---------------------------------------------------------------------
// Arithmetic

fn mul_d_e(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs
        .set_de(u16::from(cpu.regs.d) * u16::from(cpu.regs.e));
}

fn add_hl_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs
        .set_hl(cpu.regs.hl().wrapping_add(u16::from(cpu.regs.a)));
}

fn add_de_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs
        .set_de(cpu.regs.de().wrapping_add(u16::from(cpu.regs.a)));
}

fn add_bc_a(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs
        .set_bc(cpu.regs.bc().wrapping_add(u16::from(cpu.regs.a)));
}

fn add_hl_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_word(bus);
    cpu.internal(2);
    cpu.regs.set_hl(cpu.regs.hl().wrapping_add(value));
}

fn add_de_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_word(bus);
    cpu.internal(2);
    cpu.regs.set_de(cpu.regs.de().wrapping_add(value));
}

fn add_bc_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.fetch_word(bus);
    cpu.internal(2);
    cpu.regs.set_bc(cpu.regs.bc().wrapping_add(value));
}

// ---------------------------------------------------------------------
// Stack, I/O and screen address helpers

/// PUSH nn stores its immediate high byte first.
fn push_nn(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let hi = cpu.fetch_byte(bus);
    let lo = cpu.fetch_byte(bus);
    cpu.internal(3);
    cpu.push_word(bus, u16::from(hi) << 8 | u16::from(lo));
}

/// OUTI without the B decrement.
fn outinb(cpu: &mut Z80, bus: &mut dyn IoBus) {
    cpu.internal(1);
    let hl = cpu.regs.hl();
    let value = cpu.read_mem(bus, hl);
    cpu.write_port(bus, cpu.regs.bc(), value);
    cpu.regs.set_hl(hl.wrapping_add(1));
}

/// The TBBlue register file is reached directly, not through regular I/O
/// machine cycles, so the port writes carry no bus T-states of their own.
fn write_next_reg(cpu: &mut Z80, bus: &mut dyn IoBus, reg: u8, value: u8) {
    cpu.internal(6);
    bus.write_io(REG_SELECT_PORT, reg);
    bus.write_io(REG_ACCESS_PORT, value);
}

fn nextreg_n_n(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let reg = cpu.fetch_byte(bus);
    let value = cpu.fetch_byte(bus);
    write_next_reg(cpu, bus, reg, value);
}

fn nextreg_n_a(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let reg = cpu.fetch_byte(bus);
    let value = cpu.regs.a;
    write_next_reg(cpu, bus, reg, value);
}

/// Step HL one pixel row down within a ULA screen third.
fn pixeldn(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let hl = cpu.regs.hl();
    let next = if hl & 0x0700 != 0x0700 {
        hl.wrapping_add(0x0100)
    } else if hl & 0x00E0 != 0x00E0 {
        (hl & 0xF8FF).wrapping_add(0x0020)
    } else {
        (hl & 0xF81F).wrapping_add(0x0800)
    };
    cpu.regs.set_hl(next);
}

/// HL = ULA screen address of the pixel at column E, row D.
fn pixelad(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let row = u16::from(cpu.regs.d);
    let col = u16::from(cpu.regs.e);
    cpu.regs.set_hl(
        0x4000 | ((row & 0xC0) << 5) | ((row & 0x07) << 8) | ((row & 0x38) << 2) | (col >> 3),
    );
}

/// A = the pixel mask for the column in E.
fn setae(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    cpu.regs.a = 0x80 >> (cpu.regs.e & 7);
}

/// JP (C): jump within the current 16K bank to the address formed from
/// the I/O port read.
fn jp_ci(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_port(bus, cpu.regs.bc());
    cpu.internal(1);
    cpu.regs.pc = (cpu.regs.pc & 0xC000) | (u16::from(value) << 6);
}

// ---------------------------------------------------------------------
// Extended block transfers. These never touch the flags; the write is
// skipped when the source byte equals A.

fn ldix_core(cpu: &mut Z80, bus: &mut dyn IoBus, hl_step: i16, de_step: i16) {
    let hl = cpu.regs.hl();
    let de = cpu.regs.de();
    let value = cpu.read_mem(bus, hl);
    if value == cpu.regs.a {
        cpu.internal(3);
    } else {
        cpu.write_mem(bus, de, value);
    }
    cpu.internal(2);
    cpu.regs.set_hl(hl.wrapping_add_signed(hl_step));
    cpu.regs.set_de(de.wrapping_add_signed(de_step));
    cpu.regs.set_bc(cpu.regs.bc().wrapping_sub(1));
}

fn ldix(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldix_core(cpu, bus, 1, 1);
}

fn lddx(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldix_core(cpu, bus, -1, -1);
}

fn ldirx(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldix_core(cpu, bus, 1, 1);
    block_repeat(cpu);
}

fn lddrx(cpu: &mut Z80, bus: &mut dyn IoBus) {
    ldix_core(cpu, bus, -1, -1);
    block_repeat(cpu);
}

/// LD (DE),(HL) then INC L and INC D: walks a screen column.
fn ldws(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    cpu.write_mem(bus, cpu.regs.de(), value);
    cpu.regs.l = cpu.regs.l.wrapping_add(1);
    cpu.regs.d = cpu.regs.d.wrapping_add(1);
}

/// LDIRX with the source address forced to an 8-byte pattern window:
/// the low three bits come from E, HL itself never moves.
fn ldpirx(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let source = (cpu.regs.hl() & 0xFFF8) | u16::from(cpu.regs.e & 7);
    let de = cpu.regs.de();
    let value = cpu.read_mem(bus, source);
    if value == cpu.regs.a {
        cpu.internal(3);
    } else {
        cpu.write_mem(bus, de, value);
    }
    cpu.internal(2);
    cpu.regs.set_de(de.wrapping_add(1));
    cpu.regs.set_bc(cpu.regs.bc().wrapping_sub(1));
    block_repeat(cpu);
}

fn block_repeat(cpu: &mut Z80) {
    if cpu.regs.bc() != 0 {
        cpu.internal(5);
        cpu.regs.pc = cpu.regs.pc.wrapping_sub(2);
    }
}
