//! Z80 register file.

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

/// The full Z80 register set, including internal and interrupt state.
///
/// Halves of the 16-bit pairs are stored flat; the pair accessors are views
/// over the same storage, so a half write is always visible through the
/// pair and vice versa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    // Main registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,

    // Alternate registers
    pub a_alt: u8,
    pub f_alt: u8,
    pub b_alt: u8,
    pub c_alt: u8,
    pub d_alt: u8,
    pub e_alt: u8,
    pub h_alt: u8,
    pub l_alt: u8,

    // Index registers
    pub ix: u16,
    pub iy: u16,

    // Other registers
    pub sp: u16,
    pub pc: u16,
    pub i: u8,
    pub r: u8,

    // Internal registers
    /// WZ/MEMPTR - internal temporary register.
    /// Affects undocumented X/Y flags in BIT instructions and some jumps.
    pub wz: u16,

    // Interrupt state
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,

    // Halt state
    pub halted: bool,
}

impl Registers {
    /// Get AF register pair.
    #[must_use]
    pub const fn af(&self) -> u16 {
        (self.a as u16) << 8 | self.f as u16
    }

    /// Get BC register pair.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        (self.b as u16) << 8 | self.c as u16
    }

    /// Get DE register pair.
    #[must_use]
    pub const fn de(&self) -> u16 {
        (self.d as u16) << 8 | self.e as u16
    }

    /// Get HL register pair.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        (self.h as u16) << 8 | self.l as u16
    }

    /// Get IR register pair (refresh address put on the bus during
    /// internal cycles).
    #[must_use]
    pub const fn ir(&self) -> u16 {
        (self.i as u16) << 8 | self.r as u16
    }

    /// High byte of IX (undocumented half register).
    #[must_use]
    pub const fn xh(&self) -> u8 {
        (self.ix >> 8) as u8
    }

    /// Low byte of IX (undocumented half register).
    #[must_use]
    pub const fn xl(&self) -> u8 {
        self.ix as u8
    }

    /// High byte of IY (undocumented half register).
    #[must_use]
    pub const fn yh(&self) -> u8 {
        (self.iy >> 8) as u8
    }

    /// Low byte of IY (undocumented half register).
    #[must_use]
    pub const fn yl(&self) -> u8 {
        self.iy as u8
    }

    /// High byte of WZ, used by BIT n,(HL) for the Y/X flags.
    #[must_use]
    pub const fn wh(&self) -> u8 {
        (self.wz >> 8) as u8
    }

    /// Low byte of WZ.
    #[must_use]
    pub const fn wl(&self) -> u8 {
        self.wz as u8
    }

    /// Set AF register pair.
    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.f = value as u8;
    }

    /// Set BC register pair.
    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    /// Set DE register pair.
    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    /// Set HL register pair.
    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    /// Set the high byte of IX.
    pub fn set_xh(&mut self, value: u8) {
        self.ix = (self.ix & 0x00FF) | (u16::from(value) << 8);
    }

    /// Set the low byte of IX.
    pub fn set_xl(&mut self, value: u8) {
        self.ix = (self.ix & 0xFF00) | u16::from(value);
    }

    /// Set the high byte of IY.
    pub fn set_yh(&mut self, value: u8) {
        self.iy = (self.iy & 0x00FF) | (u16::from(value) << 8);
    }

    /// Set the low byte of IY.
    pub fn set_yl(&mut self, value: u8) {
        self.iy = (self.iy & 0xFF00) | u16::from(value);
    }

    /// Set the high byte of WZ.
    pub fn set_wh(&mut self, value: u8) {
        self.wz = (self.wz & 0x00FF) | (u16::from(value) << 8);
    }

    /// Set the low byte of WZ.
    pub fn set_wl(&mut self, value: u8) {
        self.wz = (self.wz & 0xFF00) | u16::from(value);
    }
}
