//! CB-prefixed opcode handlers: rotates, shifts and bit operations.

use emu_core::IoBus;

use super::{OpHandler, Z80};
use crate::alu::{self, AluResult};
use crate::flags::{CF, HF, PF, SF, XF, YF, ZF};

#[rustfmt::skip]
pub(super) static OPS: [OpHandler; 256] = [
    // 0x00: RLC / RRC
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    // 0x10: RL / RR
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    // 0x20: SLA / SRA
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    // 0x30: SLL / SRL
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    rot_r, rot_r, rot_r, rot_r, rot_r, rot_r, rot_hli, rot_r,
    // 0x40: BIT
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    bit_r, bit_r, bit_r, bit_r, bit_r, bit_r, bit_hli, bit_r,
    // 0x80: RES
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    res_r, res_r, res_r, res_r, res_r, res_r, res_hli, res_r,
    // 0xc0: SET
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
    set_r, set_r, set_r, set_r, set_r, set_r, set_hli, set_r,
];

/// Apply the shift family selected by bits 3..5 of the opcode.
pub(super) fn apply_shift(family: u8, value: u8, carry: bool) -> AluResult {
    match family & 7 {
        0 => alu::rlc8(value),
        1 => alu::rrc8(value),
        2 => alu::rl8(value, carry),
        3 => alu::rr8(value, carry),
        4 => alu::sla8(value),
        5 => alu::sra8(value),
        6 => alu::sll8(value),
        _ => alu::srl8(value),
    }
}

/// BIT flag update. Y and X come from `xy_source`: the operand itself for
/// registers, WZ high for the memory forms.
pub(super) fn bit_flags(cpu: &mut Z80, bit: u8, value: u8, xy_source: u8) {
    let tested = value & (1 << bit);
    cpu.regs.f = (cpu.regs.f & CF)
        | HF
        | (xy_source & (YF | XF))
        | if tested == 0 { ZF | PF } else { 0 }
        | if bit == 7 && tested != 0 { SF } else { 0 };
}

fn rot_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = cpu.opcode & 7;
    let result = apply_shift(cpu.opcode >> 3, cpu.reg8(idx), cpu.regs.f & CF != 0);
    cpu.set_reg8(idx, result.value);
    cpu.regs.f = result.flags;
}

fn rot_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let result = apply_shift(cpu.opcode >> 3, value, cpu.regs.f & CF != 0);
    cpu.write_mem(bus, address, result.value);
    cpu.regs.f = result.flags;
}

fn bit_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let value = cpu.reg8(cpu.opcode & 7);
    bit_flags(cpu, (cpu.opcode >> 3) & 7, value, value);
}

fn bit_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let value = cpu.read_mem(bus, cpu.regs.hl());
    cpu.internal(1);
    let xy = cpu.regs.wh();
    bit_flags(cpu, (cpu.opcode >> 3) & 7, value, xy);
}

fn res_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = cpu.opcode & 7;
    let mask = 1 << ((cpu.opcode >> 3) & 7);
    cpu.set_reg8(idx, cpu.reg8(idx) & !mask);
}

fn res_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let mask = 1 << ((cpu.opcode >> 3) & 7);
    cpu.write_mem(bus, address, value & !mask);
}

fn set_r(cpu: &mut Z80, _bus: &mut dyn IoBus) {
    let idx = cpu.opcode & 7;
    let mask = 1 << ((cpu.opcode >> 3) & 7);
    cpu.set_reg8(idx, cpu.reg8(idx) | mask);
}

fn set_hli(cpu: &mut Z80, bus: &mut dyn IoBus) {
    let address = cpu.regs.hl();
    let value = cpu.read_mem(bus, address);
    cpu.internal(1);
    let mask = 1 << ((cpu.opcode >> 3) & 7);
    cpu.write_mem(bus, address, value | mask);
}
