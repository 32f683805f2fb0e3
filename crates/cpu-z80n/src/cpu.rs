//! Z80 CPU state and the instruction execution loop.
//!
//! One call to [`Z80::execute_cycle`] runs one complete instruction: all
//! prefix bytes, displacement and immediates, the operation itself, and the
//! T-state accounting. Interrupt requests are consulted only at these
//! instruction boundaries.

mod bit;
mod extended;
mod indexed;
mod indexed_bit;
mod next;
mod standard;

use emu_core::{Cpu, IoBus};

use crate::registers::Registers;

/// Opcode prefix state. `None` between instructions; the other variants
/// exist only inside a single `execute_cycle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    None,
    Cb,
    Ed,
    Dd,
    Fd,
    DdCb,
    FdCb,
}

/// Handler for one decoded opcode. The opcode byte is latched in
/// `Z80::opcode` so family handlers can pull register and condition fields
/// out of it.
type OpHandler = fn(&mut Z80, &mut dyn IoBus);

/// The Z80 CPU.
///
/// Construct with [`Z80::new`] for a plain Z80 or [`Z80::new_z80n`] to
/// enable the ZX Spectrum Next extended instruction set. Registers are a
/// public field; hosts and tests may read and write them freely between
/// instructions.
pub struct Z80 {
    pub regs: Registers,

    /// Monotonic T-state counter. Only reset clears it.
    tacts: u64,

    /// Prefix applying to the opcode being dispatched.
    prefix: Prefix,

    /// Opcode byte currently executing.
    opcode: u8,

    /// EI backlog: maskable interrupts stay deferred while non-zero. EI
    /// sets it to 2 so the instruction after EI always runs first.
    ei_backlog: u8,

    int_pending: bool,
    nmi_pending: bool,

    /// Recognize Z80N (ZX Spectrum Next) opcodes. When false those ED
    /// slots execute as plain 8T no-ops and consume no operand bytes.
    allow_extended_instructions: bool,
}

impl Z80 {
    /// A Z80 with the standard instruction set.
    #[must_use]
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            tacts: 0,
            prefix: Prefix::None,
            opcode: 0,
            ei_backlog: 0,
            int_pending: false,
            nmi_pending: false,
            allow_extended_instructions: false,
        };
        cpu.reset();
        cpu
    }

    /// A Z80 that also recognizes the Z80N extended instructions.
    #[must_use]
    pub fn new_z80n() -> Self {
        let mut cpu = Self::new();
        cpu.allow_extended_instructions = true;
        cpu
    }

    /// T-states consumed since the last reset.
    #[must_use]
    pub fn tacts(&self) -> u64 {
        self.tacts
    }

    /// True when Z80N opcodes are recognized.
    #[must_use]
    pub fn extended_instructions_allowed(&self) -> bool {
        self.allow_extended_instructions
    }

    /// Handle the /RESET signal: architectural power-on state without
    /// touching BC/DE/HL or the index registers (hardware leaves them).
    pub fn reset(&mut self) {
        self.regs.set_af(0xFFFF);
        self.regs.a_alt = 0xFF;
        self.regs.f_alt = 0xFF;
        self.regs.i = 0;
        self.regs.r = 0;
        self.regs.pc = 0x0000;
        self.regs.sp = 0xFFFF;
        self.regs.wz = 0x0000;
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        self.regs.im = 0;
        self.regs.halted = false;
        self.prefix = Prefix::None;
        self.opcode = 0;
        self.ei_backlog = 0;
        self.int_pending = false;
        self.nmi_pending = false;
        self.tacts = 0;
    }

    /// Reset as if the machine had just been powered on: everything a soft
    /// reset clears, plus all register pairs.
    pub fn hard_reset(&mut self) {
        self.regs = Registers::default();
        self.reset();
    }

    /// Request a maskable interrupt. The request stays latched until the
    /// CPU accepts it at an instruction boundary with IFF1 set.
    pub fn request_interrupt(&mut self) {
        self.int_pending = true;
    }

    /// Request a non-maskable interrupt, serviced at the next boundary.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Execute one complete instruction (or service a pending interrupt)
    /// and return the T-states it consumed.
    pub fn execute_cycle(&mut self, bus: &mut dyn IoBus) -> u32 {
        let start = self.tacts;

        if self.ei_backlog > 0 {
            self.ei_backlog -= 1;
        }

        if self.nmi_pending {
            self.nmi_pending = false;
            self.take_nmi(bus);
            return (self.tacts - start) as u32;
        }
        if self.int_pending && self.regs.iff1 && self.ei_backlog == 0 {
            self.int_pending = false;
            self.take_int(bus);
            return (self.tacts - start) as u32;
        }

        if self.regs.halted {
            // HALT burns refresh cycles without advancing PC
            self.refresh();
            self.internal(4);
            return (self.tacts - start) as u32;
        }

        loop {
            match self.prefix {
                Prefix::None => {
                    let op = self.fetch_m1(bus);
                    match op {
                        0xCB => self.prefix = Prefix::Cb,
                        0xED => self.prefix = Prefix::Ed,
                        0xDD => self.prefix = Prefix::Dd,
                        0xFD => self.prefix = Prefix::Fd,
                        _ => {
                            self.opcode = op;
                            standard::OPS[op as usize](self, bus);
                            break;
                        }
                    }
                }
                Prefix::Cb => {
                    self.opcode = self.fetch_m1(bus);
                    bit::OPS[self.opcode as usize](self, bus);
                    break;
                }
                Prefix::Ed => {
                    let op = self.fetch_m1(bus);
                    self.opcode = op;
                    let ext = if self.allow_extended_instructions {
                        next::lookup(op)
                    } else {
                        None
                    };
                    match ext {
                        Some(handler) => handler(self, bus),
                        None => extended::OPS[op as usize](self, bus),
                    }
                    break;
                }
                Prefix::Dd | Prefix::Fd => {
                    let op = self.fetch_m1(bus);
                    match op {
                        // Only the most recent DD/FD prefix applies
                        0xDD => self.prefix = Prefix::Dd,
                        0xFD => self.prefix = Prefix::Fd,
                        // DD/FD in front of ED has no effect beyond its 4T
                        0xED => self.prefix = Prefix::Ed,
                        0xCB => {
                            self.prefix = if self.prefix == Prefix::Dd {
                                Prefix::DdCb
                            } else {
                                Prefix::FdCb
                            };
                        }
                        _ => {
                            self.opcode = op;
                            indexed::OPS[op as usize](self, bus);
                            break;
                        }
                    }
                }
                Prefix::DdCb | Prefix::FdCb => {
                    // The displacement and the final opcode byte are plain
                    // reads, not M1 fetches: R does not advance for them.
                    let dist = self.read_mem(bus, self.regs.pc) as i8;
                    self.regs.pc = self.regs.pc.wrapping_add(1);
                    self.regs.wz = self.index().wrapping_add_signed(i16::from(dist));
                    self.opcode = self.read_mem(bus, self.regs.pc);
                    self.internal(2);
                    self.regs.pc = self.regs.pc.wrapping_add(1);
                    indexed_bit::OPS[self.opcode as usize](self, bus);
                    break;
                }
            }
        }

        self.prefix = Prefix::None;
        (self.tacts - start) as u32
    }

    // -----------------------------------------------------------------
    // Interrupt entry

    fn take_nmi(&mut self, bus: &mut dyn IoBus) {
        // 4T acknowledge cycle
        self.internal(4);
        self.leave_halt();

        // IFF2 keeps the pre-NMI interrupt enable so RETN can restore it
        self.regs.iff2 = self.regs.iff1;
        self.regs.iff1 = false;

        self.push_pc(bus);
        self.refresh();
        self.regs.pc = 0x0066;
    }

    fn take_int(&mut self, bus: &mut dyn IoBus) {
        // 6T acknowledge cycle
        self.internal(6);
        self.leave_halt();

        self.regs.iff1 = false;
        self.regs.iff2 = false;

        self.push_pc(bus);
        self.refresh();

        if self.regs.im == 2 {
            // Nothing drives the data bus here, so the vector low byte
            // reads as 0xFF
            let vector = (u16::from(self.regs.i) << 8) | 0x00FF;
            let lo = self.read_mem(bus, vector);
            let hi = self.read_mem(bus, vector.wrapping_add(1));
            self.regs.wz = u16::from(hi) << 8 | u16::from(lo);
        } else {
            // IM 0 reads 0xFF from the open bus: RST 38. IM 1 is RST 38.
            self.regs.wz = 0x0038;
        }
        self.regs.pc = self.regs.wz;
    }

    fn leave_halt(&mut self) {
        if self.regs.halted {
            self.regs.pc = self.regs.pc.wrapping_add(1);
            self.regs.halted = false;
        }
    }

    // -----------------------------------------------------------------
    // Bus access with T-state accounting

    /// M1 opcode fetch: 3T read plus 1T refresh, R advances.
    fn fetch_m1(&mut self, bus: &mut dyn IoBus) -> u8 {
        let opcode = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        self.refresh();
        self.tacts += 4;
        opcode
    }

    /// R increments over its low 7 bits; bit 7 is programmer-owned.
    fn refresh(&mut self) {
        self.regs.r = (self.regs.r & 0x80) | (self.regs.r.wrapping_add(1) & 0x7F);
    }

    fn read_mem(&mut self, bus: &mut dyn IoBus, address: u16) -> u8 {
        self.tacts += 3;
        bus.read(address)
    }

    fn write_mem(&mut self, bus: &mut dyn IoBus, address: u16, value: u8) {
        self.tacts += 3;
        bus.write(address, value);
    }

    fn read_port(&mut self, bus: &mut dyn IoBus, port: u16) -> u8 {
        self.tacts += 4;
        bus.read_io(port)
    }

    fn write_port(&mut self, bus: &mut dyn IoBus, port: u16, value: u8) {
        self.tacts += 4;
        bus.write_io(port, value);
    }

    /// Internal machine cycles with no bus activity.
    fn internal(&mut self, tstates: u32) {
        self.tacts += u64::from(tstates);
    }

    /// Fetch an immediate byte operand.
    fn fetch_byte(&mut self, bus: &mut dyn IoBus) -> u8 {
        let value = self.read_mem(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    /// Fetch a little-endian immediate word operand.
    fn fetch_word(&mut self, bus: &mut dyn IoBus) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Read the indexed displacement and form the effective address in WZ.
    /// Costs 3T for the byte plus 5T internal.
    fn fetch_displacement(&mut self, bus: &mut dyn IoBus) -> u16 {
        let dist = self.read_mem(bus, self.regs.pc) as i8;
        self.internal(5);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        let address = self.index().wrapping_add_signed(i16::from(dist));
        self.regs.wz = address;
        address
    }

    // -----------------------------------------------------------------
    // Stack and control-flow cores

    fn push_word(&mut self, bus: &mut dyn IoBus, value: u16) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_mem(bus, self.regs.sp, (value >> 8) as u8);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        self.write_mem(bus, self.regs.sp, value as u8);
    }

    fn pop_word(&mut self, bus: &mut dyn IoBus) -> u16 {
        let lo = self.read_mem(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = self.read_mem(bus, self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Push PC with the 1T internal padding interrupt entry and CALL share.
    fn push_pc(&mut self, bus: &mut dyn IoBus) {
        self.internal(1);
        self.push_word(bus, self.regs.pc);
    }

    /// CALL tail: target already assembled in WZ.
    fn call_core(&mut self, bus: &mut dyn IoBus) {
        self.push_pc(bus);
        self.regs.pc = self.regs.wz;
    }

    /// RST tail.
    fn rst_core(&mut self, bus: &mut dyn IoBus, address: u16) {
        self.push_pc(bus);
        self.regs.wz = address;
        self.regs.pc = address;
    }

    /// RET tail, shared by RET/RET cc/RETN/RETI.
    fn ret_core(&mut self, bus: &mut dyn IoBus) {
        self.regs.wz = self.pop_word(bus);
        self.regs.pc = self.regs.wz;
    }

    /// Taken relative jump: 5T internal, WZ tracks the target.
    fn relative_jump(&mut self, dist: u8) {
        self.internal(5);
        self.regs.pc = self.regs.pc.wrapping_add_signed(i16::from(dist as i8));
        self.regs.wz = self.regs.pc;
    }

    // -----------------------------------------------------------------
    // Opcode field decoding

    /// 3-bit register field: 0=B 1=C 2=D 3=E 4=H 5=L 7=A. Index 6 is the
    /// (HL) slot and is resolved by the handler, never here.
    fn reg8(&self, idx: u8) -> u8 {
        match idx {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            7 => self.regs.a,
            _ => unreachable!("(HL) operand is resolved by the handler"),
        }
    }

    fn set_reg8(&mut self, idx: u8, value: u8) {
        match idx {
            0 => self.regs.b = value,
            1 => self.regs.c = value,
            2 => self.regs.d = value,
            3 => self.regs.e = value,
            4 => self.regs.h = value,
            5 => self.regs.l = value,
            7 => self.regs.a = value,
            _ => unreachable!("(HL) operand is resolved by the handler"),
        }
    }

    /// 2-bit register-pair field: 0=BC 1=DE 2=HL 3=SP.
    fn reg16(&self, idx: u8) -> u16 {
        match idx & 3 {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => self.regs.hl(),
            _ => self.regs.sp,
        }
    }

    fn set_reg16(&mut self, idx: u8, value: u16) {
        match idx & 3 {
            0 => self.regs.set_bc(value),
            1 => self.regs.set_de(value),
            2 => self.regs.set_hl(value),
            _ => self.regs.sp = value,
        }
    }

    /// PUSH/POP register-pair field: 3 means AF instead of SP.
    fn reg16_stk(&self, idx: u8) -> u16 {
        if idx & 3 == 3 {
            self.regs.af()
        } else {
            self.reg16(idx)
        }
    }

    fn set_reg16_stk(&mut self, idx: u8, value: u16) {
        if idx & 3 == 3 {
            self.regs.set_af(value);
        } else {
            self.set_reg16(idx, value);
        }
    }

    /// 3-bit condition field: NZ Z NC C PO PE P M.
    fn condition(&self, idx: u8) -> bool {
        use crate::flags::{CF, PF, SF, ZF};
        match idx & 7 {
            0 => self.regs.f & ZF == 0,
            1 => self.regs.f & ZF != 0,
            2 => self.regs.f & CF == 0,
            3 => self.regs.f & CF != 0,
            4 => self.regs.f & PF == 0,
            5 => self.regs.f & PF != 0,
            6 => self.regs.f & SF == 0,
            _ => self.regs.f & SF != 0,
        }
    }

    // -----------------------------------------------------------------
    // Index register views (DD selects IX, FD selects IY)

    fn index(&self) -> u16 {
        match self.prefix {
            Prefix::Dd | Prefix::DdCb => self.regs.ix,
            _ => self.regs.iy,
        }
    }

    fn set_index(&mut self, value: u16) {
        match self.prefix {
            Prefix::Dd | Prefix::DdCb => self.regs.ix = value,
            _ => self.regs.iy = value,
        }
    }

    fn index_h(&self) -> u8 {
        (self.index() >> 8) as u8
    }

    fn index_l(&self) -> u8 {
        self.index() as u8
    }

    fn set_index_h(&mut self, value: u8) {
        self.set_index((self.index() & 0x00FF) | (u16::from(value) << 8));
    }

    fn set_index_l(&mut self, value: u8) {
        self.set_index((self.index() & 0xFF00) | u16::from(value));
    }

    /// Register field with the undocumented half-index substitution:
    /// 4 and 5 read XH/XL (or YH/YL) instead of H and L.
    fn index_reg8(&self, idx: u8) -> u8 {
        match idx {
            4 => self.index_h(),
            5 => self.index_l(),
            _ => self.reg8(idx),
        }
    }

    fn set_index_reg8(&mut self, idx: u8, value: u8) {
        match idx {
            4 => self.set_index_h(value),
            5 => self.set_index_l(value),
            _ => self.set_reg8(idx, value),
        }
    }
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: IoBus> Cpu<B> for Z80 {
    fn step(&mut self, bus: &mut B) -> u32 {
        self.execute_cycle(bus)
    }

    fn reset(&mut self) {
        Z80::reset(self);
    }

    fn interrupt(&mut self) {
        self.request_interrupt();
    }

    fn nmi(&mut self) {
        self.request_nmi();
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn is_halted(&self) -> bool {
        self.regs.halted
    }
}
