//! Unit tests for individual Z80 instructions.
//!
//! Short programs run until HALT, or single instructions execute through
//! `execute_cycle` so the returned T-state count can be checked too.

use cpu_z80n::{CF, HF, NF, PF, SF, XF, YF, Z80, ZF};
use emu_core::SimpleBus;

/// Run CPU until it HALTs, with a safety limit.
fn run_until_halt(cpu: &mut Z80, bus: &mut SimpleBus) {
    let mut count = 0;
    while !cpu.regs.halted && count < 10_000 {
        cpu.execute_cycle(bus);
        count += 1;
    }
    assert!(cpu.regs.halted, "program never reached HALT");
}

fn program(bytes: &[u8]) -> (Z80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, bytes);
    let mut cpu = Z80::new();
    cpu.regs.f = 0;
    (cpu, bus)
}

#[test]
fn test_nop_timing() {
    let (mut cpu, mut bus) = program(&[0x00]);
    assert_eq!(cpu.execute_cycle(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0001);
}

#[test]
fn test_ld_a_n() {
    let (mut cpu, mut bus) = program(&[0x3E, 0x42, 0x76]); // LD A,0x42; HALT
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x42);
}

#[test]
fn test_ld_r_r() {
    let (mut cpu, mut bus) = program(&[0x06, 0x17, 0x48, 0x51, 0x76]); // LD B,0x17; LD C,B; LD D,C
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.b, 0x17);
    assert_eq!(cpu.regs.c, 0x17);
    assert_eq!(cpu.regs.d, 0x17);
}

#[test]
fn test_ld_bc_nn() {
    let (mut cpu, mut bus) = program(&[0x01, 0x34, 0x12]); // LD BC,0x1234
    assert_eq!(cpu.execute_cycle(&mut bus), 10);
    assert_eq!(cpu.regs.bc(), 0x1234);
}

#[test]
fn test_ld_hl_indirect() {
    // LD HL,0x4000; LD (HL),0x5A; LD A,(HL); HALT
    let (mut cpu, mut bus) = program(&[0x21, 0x00, 0x40, 0x36, 0x5A, 0x7E, 0x76]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x4000), 0x5A);
    assert_eq!(cpu.regs.a, 0x5A);
}

#[test]
fn test_ld_bci_a_memptr() {
    let (mut cpu, mut bus) = program(&[0x02]); // LD (BC),A
    cpu.regs.a = 0x7E;
    cpu.regs.set_bc(0x12FF);
    assert_eq!(cpu.execute_cycle(&mut bus), 7);
    assert_eq!(bus.peek(0x12FF), 0x7E);
    // WZ: high byte from A, low byte from BC+1
    assert_eq!(cpu.regs.wz, 0x7E00);
}

#[test]
fn test_ld_a_nn_indirect_memptr() {
    let (mut cpu, mut bus) = program(&[0x3A, 0x00, 0x30]); // LD A,(0x3000)
    bus.load(0x3000, &[0x99]);
    assert_eq!(cpu.execute_cycle(&mut bus), 13);
    assert_eq!(cpu.regs.a, 0x99);
    assert_eq!(cpu.regs.wz, 0x3001);
}

#[test]
fn test_add_overflow_flags() {
    let (mut cpu, mut bus) = program(&[0xC6, 0x01]); // ADD A,0x01
    cpu.regs.a = 0x7F;
    assert_eq!(cpu.execute_cycle(&mut bus), 7);
    assert_eq!(cpu.regs.a, 0x80);
    assert_eq!(cpu.regs.f, SF | HF | PF);
}

#[test]
fn test_sub_borrow_flags() {
    let (mut cpu, mut bus) = program(&[0xD6, 0x01]); // SUB 0x01
    cpu.regs.a = 0x00;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.regs.f, SF | YF | HF | XF | NF | CF);
}

#[test]
fn test_adc_uses_carry() {
    let (mut cpu, mut bus) = program(&[0xCE, 0x00]); // ADC A,0x00
    cpu.regs.a = 0x10;
    cpu.regs.f = CF;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0x11);
}

#[test]
fn test_cp_takes_y_x_from_operand() {
    let (mut cpu, mut bus) = program(&[0xFE, 0x20]); // CP 0x20
    cpu.regs.a = 0x10;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(cpu.regs.f, SF | YF | NF | CF);
}

#[test]
fn test_inc_preserves_carry() {
    let (mut cpu, mut bus) = program(&[0x3C]); // INC A
    cpu.regs.a = 0x0F;
    cpu.regs.f = CF;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0x10);
    assert_eq!(cpu.regs.f, HF | CF);
}

#[test]
fn test_dec_to_zero() {
    let (mut cpu, mut bus) = program(&[0x05]); // DEC B
    cpu.regs.b = 0x01;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.b, 0x00);
    assert_eq!(cpu.regs.f, ZF | NF);
}

#[test]
fn test_inc_hl_memory_timing() {
    let (mut cpu, mut bus) = program(&[0x34]); // INC (HL)
    cpu.regs.set_hl(0x4000);
    bus.load(0x4000, &[0x41]);
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
    assert_eq!(bus.peek(0x4000), 0x42);
}

#[test]
fn test_daa_bcd_boundary() {
    // LD A,0x99; DAA; HALT leaves AF = 0x998C
    let (mut cpu, mut bus) = program(&[0x3E, 0x99, 0x27, 0x76]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.af(), 0x998C);
}

#[test]
fn test_daa_after_addition() {
    // 0x15 + 0x27 = 0x3C, DAA corrects to BCD 42
    let (mut cpu, mut bus) = program(&[0x3E, 0x15, 0xC6, 0x27, 0x27, 0x76]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x42);
}

#[test]
fn test_cpl_scf_ccf() {
    let (mut cpu, mut bus) = program(&[0x2F]); // CPL
    cpu.regs.a = 0x0F;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0xF0);
    assert_eq!(cpu.regs.f & (HF | NF), HF | NF);

    let (mut cpu, mut bus) = program(&[0x37, 0x3F]); // SCF; CCF
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.f & CF, CF);
    cpu.execute_cycle(&mut bus);
    // CCF moves the old carry into H
    assert_eq!(cpu.regs.f & CF, 0);
    assert_eq!(cpu.regs.f & HF, HF);
}

#[test]
fn test_rlca_rotates_into_carry() {
    let (mut cpu, mut bus) = program(&[0x07]); // RLCA
    cpu.regs.a = 0x81;
    assert_eq!(cpu.execute_cycle(&mut bus), 4);
    assert_eq!(cpu.regs.a, 0x03);
    assert_eq!(cpu.regs.f & CF, CF);
}

#[test]
fn test_rra_through_carry() {
    let (mut cpu, mut bus) = program(&[0x1F]); // RRA
    cpu.regs.a = 0x01;
    cpu.regs.f = 0;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0x00);
    assert_eq!(cpu.regs.f & CF, CF);
}

#[test]
fn test_add_hl_bc_flags_and_memptr() {
    let (mut cpu, mut bus) = program(&[0x09]); // ADD HL,BC
    cpu.regs.set_hl(0x0FFF);
    cpu.regs.set_bc(0x0001);
    cpu.regs.f = SF | ZF | PF; // must survive
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
    assert_eq!(cpu.regs.hl(), 0x1000);
    assert_eq!(cpu.regs.f, SF | ZF | PF | HF);
    assert_eq!(cpu.regs.wz, 0x1000); // old HL + 1
}

#[test]
fn test_ex_af_and_exx() {
    // EX AF,AF'; EXX swap the full banks
    let (mut cpu, mut bus) = program(&[0x08, 0xD9, 0x76]);
    cpu.regs.set_af(0x1234);
    cpu.regs.set_bc(0x1111);
    cpu.regs.b_alt = 0x22;
    cpu.regs.c_alt = 0x22;
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a_alt, 0x12);
    assert_eq!(cpu.regs.bc(), 0x2222);
    assert_eq!(cpu.regs.b_alt, 0x11);
}

#[test]
fn test_push_pop_round_trip() {
    // LD SP,0x8000; LD BC,0x1234; PUSH BC; POP DE; HALT
    let (mut cpu, mut bus) = program(&[
        0x31, 0x00, 0x80, // LD SP,0x8000
        0x01, 0x34, 0x12, // LD BC,0x1234
        0xC5, // PUSH BC
        0xD1, // POP DE
        0x76, // HALT
    ]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.de(), 0x1234);
    assert_eq!(cpu.regs.sp, 0x8000);
    assert_eq!(bus.peek(0x7FFF), 0x12);
    assert_eq!(bus.peek(0x7FFE), 0x34);
}

#[test]
fn test_push_timing() {
    let (mut cpu, mut bus) = program(&[0xC5]); // PUSH BC
    cpu.regs.sp = 0x8000;
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
}

#[test]
fn test_ex_sp_hl_round_trip() {
    let (mut cpu, mut bus) = program(&[0xE3]); // EX (SP),HL
    cpu.regs.sp = 0x8000;
    cpu.regs.set_hl(0xABCD);
    bus.load(0x8000, &[0x34, 0x12]);
    assert_eq!(cpu.execute_cycle(&mut bus), 19);
    assert_eq!(cpu.regs.hl(), 0x1234);
    assert_eq!(bus.peek(0x8000), 0xCD);
    assert_eq!(bus.peek(0x8001), 0xAB);
    assert_eq!(cpu.regs.wz, 0x1234);
}

#[test]
fn test_jp_and_memptr() {
    let (mut cpu, mut bus) = program(&[0xC3, 0x00, 0x10]); // JP 0x1000
    assert_eq!(cpu.execute_cycle(&mut bus), 10);
    assert_eq!(cpu.regs.pc, 0x1000);
    assert_eq!(cpu.regs.wz, 0x1000);
}

#[test]
fn test_jp_cc_not_taken_still_sets_memptr() {
    let (mut cpu, mut bus) = program(&[0xCA, 0x00, 0x10]); // JP Z,0x1000
    cpu.regs.f = 0; // Z clear
    assert_eq!(cpu.execute_cycle(&mut bus), 10);
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.wz, 0x1000);
}

#[test]
fn test_jr_timing() {
    let (mut cpu, mut bus) = program(&[0x18, 0x05]); // JR +5
    assert_eq!(cpu.execute_cycle(&mut bus), 12);
    assert_eq!(cpu.regs.pc, 0x0007);
    assert_eq!(cpu.regs.wz, 0x0007);

    let (mut cpu, mut bus) = program(&[0x20, 0x05]); // JR NZ,+5
    cpu.regs.f = ZF;
    assert_eq!(cpu.execute_cycle(&mut bus), 7);
    assert_eq!(cpu.regs.pc, 0x0002);
}

#[test]
fn test_jr_backwards() {
    let (mut cpu, mut bus) = program(&[0x18, 0xFE]); // JR -2: jump to self
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.pc, 0x0000);
}

#[test]
fn test_djnz_timing() {
    let (mut cpu, mut bus) = program(&[0x10, 0x02]); // DJNZ +2
    cpu.regs.b = 2;
    assert_eq!(cpu.execute_cycle(&mut bus), 13);
    assert_eq!(cpu.regs.pc, 0x0004);
    assert_eq!(cpu.regs.b, 1);

    let (mut cpu, mut bus) = program(&[0x10, 0x02]);
    cpu.regs.b = 1;
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.b, 0);
}

#[test]
fn test_call_ret_flow() {
    // CALL 0x0010 ... at 0x0010: RET
    let (mut cpu, mut bus) = program(&[0xCD, 0x10, 0x00]);
    cpu.regs.sp = 0x8000;
    bus.load(0x0010, &[0xC9]);
    assert_eq!(cpu.execute_cycle(&mut bus), 17);
    assert_eq!(cpu.regs.pc, 0x0010);
    assert_eq!(cpu.regs.sp, 0x7FFE);
    // Return address is the byte after the CALL
    assert_eq!(bus.peek(0x7FFE), 0x03);
    assert_eq!(bus.peek(0x7FFF), 0x00);
    assert_eq!(cpu.execute_cycle(&mut bus), 10);
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.sp, 0x8000);
}

#[test]
fn test_ret_cc_timing() {
    let (mut cpu, mut bus) = program(&[0xC8]); // RET Z
    cpu.regs.f = 0;
    assert_eq!(cpu.execute_cycle(&mut bus), 5);

    let (mut cpu, mut bus) = program(&[0xC8]);
    cpu.regs.f = ZF;
    cpu.regs.sp = 0x8000;
    bus.load(0x8000, &[0x00, 0x10]);
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
    assert_eq!(cpu.regs.pc, 0x1000);
}

#[test]
fn test_rst_vector() {
    let (mut cpu, mut bus) = program(&[0xEF]); // RST 28H
    cpu.regs.sp = 0x8000;
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
    assert_eq!(cpu.regs.pc, 0x0028);
    assert_eq!(cpu.regs.wz, 0x0028);
    assert_eq!(bus.peek(0x7FFE), 0x01);
}

#[test]
fn test_out_n_a() {
    let (mut cpu, mut bus) = program(&[0xD3, 0xFE]); // OUT (0xFE),A
    cpu.regs.a = 0x42;
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
    assert_eq!(bus.io_writes, vec![(0x42FE, 0x42)]);
}

#[test]
fn test_in_a_n() {
    let (mut cpu, mut bus) = program(&[0xDB, 0x10]); // IN A,(0x10)
    cpu.regs.a = 0x20;
    bus.io_read_values.insert(0x2010, 0x77);
    assert_eq!(cpu.execute_cycle(&mut bus), 11);
    assert_eq!(cpu.regs.a, 0x77);
    assert_eq!(cpu.regs.wz, 0x2011);
}

#[test]
fn test_halt_holds_pc_and_burns_cycles() {
    let (mut cpu, mut bus) = program(&[0x76]);
    assert_eq!(cpu.execute_cycle(&mut bus), 4);
    assert!(cpu.regs.halted);
    assert_eq!(cpu.regs.pc, 0x0000);
    assert_eq!(cpu.execute_cycle(&mut bus), 4);
    assert_eq!(cpu.regs.pc, 0x0000);
}

#[test]
fn test_refresh_register_advance() {
    // R counts one per M1 fetch, including each prefix byte
    let (mut cpu, mut bus) = program(&[0x00, 0xDD, 0x09, 0xDD, 0xCB, 0x00, 0x06]);
    cpu.execute_cycle(&mut bus); // NOP
    assert_eq!(cpu.regs.r, 1);
    cpu.execute_cycle(&mut bus); // ADD IX,BC: DD + opcode
    assert_eq!(cpu.regs.r, 3);
    cpu.execute_cycle(&mut bus); // RLC (IX+0): DD + CB only
    assert_eq!(cpu.regs.r, 5);
}

#[test]
fn test_refresh_wraps_within_low_bits() {
    let (mut cpu, mut bus) = program(&[0x00]);
    cpu.regs.r = 0xFF;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.r, 0x80);
}

// ---------------------------------------------------------------------
// CB prefix

#[test]
fn test_rl_b_through_carry() {
    let (mut cpu, mut bus) = program(&[0xCB, 0x10, 0xCB, 0x10]); // RL B; RL B
    cpu.regs.b = 0x80;
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.b, 0x00);
    assert_eq!(cpu.regs.f, ZF | PF | CF);
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    // The carry rotates back in
    assert_eq!(cpu.regs.b, 0x01);
    assert_eq!(cpu.regs.f, 0);
}

#[test]
fn test_sra_keeps_sign() {
    let (mut cpu, mut bus) = program(&[0xCB, 0x2F]); // SRA A
    cpu.regs.a = 0x81;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0xC0);
    assert_eq!(cpu.regs.f & CF, CF);
}

#[test]
fn test_sll_shifts_in_one() {
    let (mut cpu, mut bus) = program(&[0xCB, 0x30]); // SLL B
    cpu.regs.b = 0x01;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.b, 0x03);
}

#[test]
fn test_shift_memory_timing() {
    let (mut cpu, mut bus) = program(&[0xCB, 0x26]); // SLA (HL)
    cpu.regs.set_hl(0x4000);
    bus.load(0x4000, &[0x40]);
    assert_eq!(cpu.execute_cycle(&mut bus), 15);
    assert_eq!(bus.peek(0x4000), 0x80);
}

#[test]
fn test_bit_on_register() {
    let (mut cpu, mut bus) = program(&[0xCB, 0x78]); // BIT 7,B
    cpu.regs.b = 0x80;
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.f, SF | HF);

    let (mut cpu, mut bus) = program(&[0xCB, 0x40]); // BIT 0,B
    cpu.regs.b = 0x00;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.f, ZF | HF | PF);
}

#[test]
fn test_bit_hl_memory_uses_wz_for_y_x() {
    let (mut cpu, mut bus) = program(&[0xCB, 0x66]); // BIT 4,(HL)
    cpu.regs.set_hl(0x4000);
    cpu.regs.wz = 0x2800; // Y and X bits set in the high byte
    bus.load(0x4000, &[0x10]);
    assert_eq!(cpu.execute_cycle(&mut bus), 12);
    assert_eq!(cpu.regs.f, YF | HF | XF);
}

#[test]
fn test_res_set_on_memory() {
    let (mut cpu, mut bus) = program(&[0xCB, 0xFE, 0xCB, 0x86, 0x76]); // SET 7,(HL); RES 0,(HL)
    cpu.regs.set_hl(0x4000);
    bus.load(0x4000, &[0x01]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x4000), 0x80);
}

// ---------------------------------------------------------------------
// ED prefix

#[test]
fn test_in_r_c_flags() {
    let (mut cpu, mut bus) = program(&[0xED, 0x58]); // IN E,(C)
    cpu.regs.set_bc(0x1234);
    bus.io_read_values.insert(0x1234, 0x00);
    assert_eq!(cpu.execute_cycle(&mut bus), 12);
    assert_eq!(cpu.regs.e, 0x00);
    assert_eq!(cpu.regs.f, ZF | PF);
    assert_eq!(cpu.regs.wz, 0x1235);
}

#[test]
fn test_out_c_r() {
    let (mut cpu, mut bus) = program(&[0xED, 0x41]); // OUT (C),B
    cpu.regs.set_bc(0x2211);
    assert_eq!(cpu.execute_cycle(&mut bus), 12);
    assert_eq!(bus.io_writes, vec![(0x2211, 0x22)]);
}

#[test]
fn test_sbc_hl_de() {
    let (mut cpu, mut bus) = program(&[0xED, 0x52]); // SBC HL,DE
    cpu.regs.set_hl(0x1000);
    cpu.regs.set_de(0x1000);
    cpu.regs.f = CF;
    assert_eq!(cpu.execute_cycle(&mut bus), 15);
    assert_eq!(cpu.regs.hl(), 0xFFFF);
    assert_eq!(cpu.regs.f & (SF | NF | CF), SF | NF | CF);
    assert_eq!(cpu.regs.wz, 0x1001);
}

#[test]
fn test_adc_hl_bc_zero() {
    let (mut cpu, mut bus) = program(&[0xED, 0x4A]); // ADC HL,BC
    cpu.regs.set_hl(0xFFFF);
    cpu.regs.set_bc(0x0000);
    cpu.regs.f = CF;
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.hl(), 0x0000);
    assert_eq!(cpu.regs.f & (ZF | CF), ZF | CF);
}

#[test]
fn test_ld_nn_de_and_back() {
    // LD (0x5000),DE; LD BC,(0x5000); HALT
    let (mut cpu, mut bus) = program(&[0xED, 0x53, 0x00, 0x50, 0xED, 0x4B, 0x00, 0x50, 0x76]);
    cpu.regs.set_de(0xBEEF);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x5000), 0xEF);
    assert_eq!(bus.peek(0x5001), 0xBE);
    assert_eq!(cpu.regs.bc(), 0xBEEF);
    assert_eq!(cpu.regs.wz, 0x5001);
}

#[test]
fn test_neg() {
    let (mut cpu, mut bus) = program(&[0xED, 0x44]); // NEG
    cpu.regs.a = 0x01;
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.a, 0xFF);
    assert_eq!(cpu.regs.f & (NF | CF), NF | CF);
}

#[test]
fn test_ld_a_i_reports_iff2() {
    let (mut cpu, mut bus) = program(&[0xED, 0x57]); // LD A,I
    cpu.regs.i = 0x3F;
    cpu.regs.iff2 = true;
    assert_eq!(cpu.execute_cycle(&mut bus), 9);
    assert_eq!(cpu.regs.a, 0x3F);
    assert_eq!(cpu.regs.f & PF, PF);
}

#[test]
fn test_rrd_rld() {
    let (mut cpu, mut bus) = program(&[0xED, 0x67]); // RRD
    cpu.regs.a = 0x84;
    cpu.regs.set_hl(0x4000);
    bus.load(0x4000, &[0x20]);
    assert_eq!(cpu.execute_cycle(&mut bus), 18);
    assert_eq!(cpu.regs.a, 0x80);
    assert_eq!(bus.peek(0x4000), 0x42);
    assert_eq!(cpu.regs.wz, 0x4001);

    let (mut cpu, mut bus) = program(&[0xED, 0x6F]); // RLD
    cpu.regs.a = 0x7A;
    cpu.regs.set_hl(0x4000);
    bus.load(0x4000, &[0x31]);
    cpu.execute_cycle(&mut bus);
    assert_eq!(cpu.regs.a, 0x73);
    assert_eq!(bus.peek(0x4000), 0x1A);
}

#[test]
fn test_undefined_ed_slot_is_nop() {
    let (mut cpu, mut bus) = program(&[0xED, 0x00]);
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.pc, 0x0002);
}

#[test]
fn test_undefined_ed_slots_cover_high_quadrant() {
    for op in [0xC0, 0xDF, 0xE0, 0xF5, 0xFF] {
        let (mut cpu, mut bus) = program(&[0xED, op]);
        assert_eq!(cpu.execute_cycle(&mut bus), 8);
        assert_eq!(cpu.regs.pc, 0x0002);
    }
}

#[test]
fn test_ldi() {
    let (mut cpu, mut bus) = program(&[0xED, 0xA0]); // LDI
    cpu.regs.set_hl(0x1000);
    cpu.regs.set_de(0x2000);
    cpu.regs.set_bc(0x0002);
    bus.load(0x1000, &[0x55]);
    assert_eq!(cpu.execute_cycle(&mut bus), 16);
    assert_eq!(bus.peek(0x2000), 0x55);
    assert_eq!(cpu.regs.hl(), 0x1001);
    assert_eq!(cpu.regs.de(), 0x2001);
    assert_eq!(cpu.regs.bc(), 0x0001);
    assert_eq!(cpu.regs.f & PF, PF); // BC still nonzero
    assert_eq!(cpu.regs.f & NF, 0);
}

#[test]
fn test_ldir_repeats_and_finishes() {
    let (mut cpu, mut bus) = program(&[0xED, 0xB0]); // LDIR
    cpu.regs.set_hl(0x1000);
    cpu.regs.set_de(0x2000);
    cpu.regs.set_bc(0x0003);
    bus.load(0x1000, &[0x11, 0x22, 0x33]);
    assert_eq!(cpu.execute_cycle(&mut bus), 21);
    assert_eq!(cpu.regs.pc, 0x0000); // rewound for the next iteration
    assert_eq!(cpu.execute_cycle(&mut bus), 21);
    assert_eq!(cpu.execute_cycle(&mut bus), 16);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.bc(), 0x0000);
    assert_eq!(cpu.regs.f & PF, 0);
    assert_eq!(
        [bus.peek(0x2000), bus.peek(0x2001), bus.peek(0x2002)],
        [0x11, 0x22, 0x33]
    );
}

#[test]
fn test_lddr_copies_backwards() {
    let (mut cpu, mut bus) = program(&[0xED, 0xB8]); // LDDR
    cpu.regs.set_hl(0x1002);
    cpu.regs.set_de(0x2002);
    cpu.regs.set_bc(0x0003);
    bus.load(0x1000, &[0x11, 0x22, 0x33]);
    while cpu.regs.bc() != 0 {
        cpu.execute_cycle(&mut bus);
    }
    assert_eq!(
        [bus.peek(0x2000), bus.peek(0x2001), bus.peek(0x2002)],
        [0x11, 0x22, 0x33]
    );
}

#[test]
fn test_cpir_stops_on_match() {
    let (mut cpu, mut bus) = program(&[0xED, 0xB1]); // CPIR
    cpu.regs.a = 0x22;
    cpu.regs.set_hl(0x1000);
    cpu.regs.set_bc(0x0004);
    bus.load(0x1000, &[0x11, 0x22, 0x33, 0x44]);
    cpu.execute_cycle(&mut bus); // no match, repeats
    assert_eq!(cpu.regs.pc, 0x0000);
    cpu.execute_cycle(&mut bus); // match on 0x22
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.hl(), 0x1002);
    assert_eq!(cpu.regs.bc(), 0x0002);
    assert_eq!(cpu.regs.f & ZF, ZF);
    assert_eq!(cpu.regs.f & PF, PF);
}

#[test]
fn test_ini_flags_and_memptr() {
    let (mut cpu, mut bus) = program(&[0xED, 0xA2]); // INI
    cpu.regs.set_bc(0x0110);
    cpu.regs.set_hl(0x4000);
    bus.io_read_values.insert(0x0110, 0x40);
    assert_eq!(cpu.execute_cycle(&mut bus), 16);
    assert_eq!(bus.peek(0x4000), 0x40);
    assert_eq!(cpu.regs.b, 0x00);
    assert_eq!(cpu.regs.hl(), 0x4001);
    assert_eq!(cpu.regs.wz, 0x0111);
    assert_eq!(cpu.regs.f & ZF, ZF); // B reached zero
}

#[test]
fn test_otir_drains_buffer() {
    let (mut cpu, mut bus) = program(&[0xED, 0xB3]); // OTIR
    cpu.regs.set_bc(0x0205);
    cpu.regs.set_hl(0x1000);
    bus.load(0x1000, &[0xAA, 0xBB]);
    assert_eq!(cpu.execute_cycle(&mut bus), 21);
    assert_eq!(cpu.execute_cycle(&mut bus), 16);
    assert_eq!(bus.io_writes, vec![(0x0105, 0xAA), (0x0005, 0xBB)]);
    assert_eq!(cpu.regs.b, 0);
}

// ---------------------------------------------------------------------
// DD/FD prefix

#[test]
fn test_ld_ix_nn() {
    let (mut cpu, mut bus) = program(&[0xDD, 0x21, 0x34, 0x12]); // LD IX,0x1234
    assert_eq!(cpu.execute_cycle(&mut bus), 14);
    assert_eq!(cpu.regs.ix, 0x1234);
}

#[test]
fn test_add_iy_sp() {
    let (mut cpu, mut bus) = program(&[0xFD, 0x39]); // ADD IY,SP
    cpu.regs.iy = 0x1000;
    cpu.regs.sp = 0x0234;
    assert_eq!(cpu.execute_cycle(&mut bus), 15);
    assert_eq!(cpu.regs.iy, 0x1234);
    assert_eq!(cpu.regs.wz, 0x1001);
}

#[test]
fn test_undocumented_half_index() {
    // LD XH,0x12; LD XL,0x34; LD A,XH; ADD A,XL
    let (mut cpu, mut bus) = program(&[
        0xDD, 0x26, 0x12, // LD XH,0x12
        0xDD, 0x2E, 0x34, // LD XL,0x34
        0xDD, 0x7C, // LD A,XH
        0xDD, 0x85, // ADD A,XL
        0x76, // HALT
    ]);
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.ix, 0x1234);
    assert_eq!(cpu.regs.a, 0x46);
}

#[test]
fn test_ld_h_ixd_loads_real_h() {
    let (mut cpu, mut bus) = program(&[0xDD, 0x66, 0x01]); // LD H,(IX+1)
    cpu.regs.ix = 0x4000;
    bus.load(0x4001, &[0x99]);
    assert_eq!(cpu.execute_cycle(&mut bus), 19);
    assert_eq!(cpu.regs.h, 0x99);
    assert_eq!(cpu.regs.ix, 0x4000);
}

#[test]
fn test_ld_ixd_n_timing() {
    let (mut cpu, mut bus) = program(&[0xDD, 0x36, 0xFF, 0x5A]); // LD (IX-1),0x5A
    cpu.regs.ix = 0x4001;
    assert_eq!(cpu.execute_cycle(&mut bus), 19);
    assert_eq!(bus.peek(0x4000), 0x5A);
    assert_eq!(cpu.regs.wz, 0x4000);
}

#[test]
fn test_inc_ixd() {
    let (mut cpu, mut bus) = program(&[0xDD, 0x34, 0x02]); // INC (IX+2)
    cpu.regs.ix = 0x4000;
    bus.load(0x4002, &[0x7F]);
    assert_eq!(cpu.execute_cycle(&mut bus), 23);
    assert_eq!(bus.peek(0x4002), 0x80);
    assert_eq!(cpu.regs.f & (SF | HF | PF), SF | HF | PF);
}

#[test]
fn test_add_a_iyd() {
    let (mut cpu, mut bus) = program(&[0xFD, 0x86, 0x03]); // ADD A,(IY+3)
    cpu.regs.a = 0x10;
    cpu.regs.iy = 0x4000;
    bus.load(0x4003, &[0x22]);
    assert_eq!(cpu.execute_cycle(&mut bus), 19);
    assert_eq!(cpu.regs.a, 0x32);
}

#[test]
fn test_push_pop_ix_round_trip() {
    // PUSH IX; POP IY leaves IY = IX
    let (mut cpu, mut bus) = program(&[0xDD, 0xE5, 0xFD, 0xE1, 0x76]);
    cpu.regs.sp = 0x8000;
    cpu.regs.ix = 0xCAFE;
    run_until_halt(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.iy, 0xCAFE);
    assert_eq!(cpu.regs.sp, 0x8000);
}

#[test]
fn test_ex_sp_ix_round_trip() {
    let (mut cpu, mut bus) = program(&[0xDD, 0xE3]); // EX (SP),IX
    cpu.regs.sp = 0x8000;
    cpu.regs.ix = 0xABCD;
    bus.load(0x8000, &[0x34, 0x12]);
    assert_eq!(cpu.execute_cycle(&mut bus), 23);
    assert_eq!(cpu.regs.ix, 0x1234);
    assert_eq!(bus.peek(0x8000), 0xCD);
    assert_eq!(bus.peek(0x8001), 0xAB);
}

#[test]
fn test_jp_ix() {
    let (mut cpu, mut bus) = program(&[0xDD, 0xE9]); // JP (IX)
    cpu.regs.ix = 0x1234;
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.pc, 0x1234);
}

#[test]
fn test_doubled_prefix_uses_last() {
    // DD FD 21: the FD wins, so LD IY,nn
    let (mut cpu, mut bus) = program(&[0xDD, 0xFD, 0x21, 0x34, 0x12]);
    assert_eq!(cpu.execute_cycle(&mut bus), 18); // extra prefix costs 4T
    assert_eq!(cpu.regs.iy, 0x1234);
    assert_eq!(cpu.regs.ix, 0x0000);
}

#[test]
fn test_prefix_before_ed_has_no_effect() {
    // DD ED 52: SBC HL,DE with the real HL
    let (mut cpu, mut bus) = program(&[0xDD, 0xED, 0x52]);
    cpu.regs.set_hl(0x2000);
    cpu.regs.set_de(0x1000);
    assert_eq!(cpu.execute_cycle(&mut bus), 19);
    assert_eq!(cpu.regs.hl(), 0x1000);
}

#[test]
fn test_useless_prefix_on_plain_op() {
    // DD 04 is INC B plus a wasted prefix
    let (mut cpu, mut bus) = program(&[0xDD, 0x04]);
    cpu.regs.b = 1;
    assert_eq!(cpu.execute_cycle(&mut bus), 8);
    assert_eq!(cpu.regs.b, 2);
}

// ---------------------------------------------------------------------
// DDCB/FDCB prefix

#[test]
fn test_sla_ixd_with_register_copy() {
    // DD CB 32 20: SLA (IX+0x32),B
    let (mut cpu, mut bus) = program(&[0xDD, 0xCB, 0x32, 0x20]);
    cpu.regs.ix = 0x1000;
    bus.load(0x1032, &[0x40]);
    assert_eq!(cpu.execute_cycle(&mut bus), 23);
    assert_eq!(bus.peek(0x1032), 0x80);
    assert_eq!(cpu.regs.b, 0x80);
    assert_eq!(cpu.regs.f & SF, SF);
    assert_eq!(cpu.regs.wz, 0x1032);
}

#[test]
fn test_bit_ixd_y_x_from_address_high() {
    // FD CB FF 7E: BIT 7,(IY-1)
    let (mut cpu, mut bus) = program(&[0xFD, 0xCB, 0xFF, 0x7E]);
    cpu.regs.iy = 0x2900;
    bus.load(0x28FF, &[0x80]);
    assert_eq!(cpu.execute_cycle(&mut bus), 20);
    // Effective address 0x28FF: high byte 0x28 supplies Y and X
    assert_eq!(cpu.regs.f, SF | YF | HF | XF);
}

#[test]
fn test_set_ixd_memory_only_slot() {
    // DD CB 00 C6: SET 0,(IX+0) with no register copy
    let (mut cpu, mut bus) = program(&[0xDD, 0xCB, 0x00, 0xC6]);
    cpu.regs.ix = 0x4000;
    cpu.regs.a = 0x00;
    cpu.execute_cycle(&mut bus);
    assert_eq!(bus.peek(0x4000), 0x01);
    assert_eq!(cpu.regs.a, 0x00);
}

#[test]
fn test_res_iyd_copies_to_register() {
    // FD CB 05 81: RES 0,(IY+5),C
    let (mut cpu, mut bus) = program(&[0xFD, 0xCB, 0x05, 0x81]);
    cpu.regs.iy = 0x4000;
    bus.load(0x4005, &[0xFF]);
    cpu.execute_cycle(&mut bus);
    assert_eq!(bus.peek(0x4005), 0xFE);
    assert_eq!(cpu.regs.c, 0xFE);
}

// ---------------------------------------------------------------------
// Reset

#[test]
fn test_reset_state() {
    let (mut cpu, mut bus) = program(&[0x3E, 0x42, 0x76]);
    cpu.regs.set_bc(0x1234);
    run_until_halt(&mut cpu, &mut bus);
    cpu.reset();
    assert_eq!(cpu.regs.pc, 0x0000);
    assert_eq!(cpu.regs.sp, 0xFFFF);
    assert_eq!(cpu.regs.af(), 0xFFFF);
    assert_eq!(cpu.regs.im, 0);
    assert!(!cpu.regs.iff1);
    assert!(!cpu.regs.halted);
    assert_eq!(cpu.tacts(), 0);
    // Soft reset leaves the working pairs alone
    assert_eq!(cpu.regs.bc(), 0x1234);
    cpu.hard_reset();
    assert_eq!(cpu.regs.bc(), 0x0000);
}
