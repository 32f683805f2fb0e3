//! DDCB/FDCB-prefixed opcode handlers.
//!
//! The effective address (index register plus displacement) is already in
//! WZ when these run. Every slot operates on that address; for the rotate,
//! RES and SET families the result is also copied into the register named
//! by the low three bits unless that field is 6.

use emu_core::IoBus;

use super::bit::{apply_shift, bit_flags};
use super::{OpHandler, Z80};
use crate::flags::CF;

#[rustfmt::skip]
pub(super) static OPS: [OpHandler; 256] = [
    // 0x00: rotate and shift families
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi, rot_xi,
    // 0x40: BIT
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi, bit_xi,
    // 0x80: RES
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi, res_xi,
    // 0xc0: SET
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
    set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi, set_xi,
];

/// Copy an operation result into the register selected by the low three
/// bits, unless that field names the memory-only slot.
fn copy_result(cpu: &mut Z80, value: u8) {
    let idx = cpu.opcode & 7;
    if idx != 6 {
        cpu.set_reg8(idx, value);
    }
}

fn rot_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.wz;
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = apply_shift(cpu.opcode >> 3, value, cpu.regs.f & CF != 0);
    cpu.write_mem(bus, address, result.value);
    cpu.regs.f = result.flags;
    copy_result(cpu, result.value);
}

fn bit_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.wz);
    cpu.internal(1);
    let xy = cpu.regs.wh();
    bit_flags(cpu, (cpu.opcode >> 3) & 7, value, xy);
}

fn res_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.wz;
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let mask = 1 << ((cpu.opcode >> 3) & 7);
    let result = value & !mask;
    cpu.write_mem(bus, address, result);
    copy_result(cpu, result);
}

fn set_xi(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.wz;
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let mask = 1 << ((cpu.opcode >> 3) & 7);
    let result = value | mask;
    cpu.write_mem(bus, address, result);
    copy_result(cpu, result);
}
