//! Cycle-exact Z80 CPU interpreter with the Z80N (ZX Spectrum Next)
//! extension set.
//!
//! Each call to [`Z80::execute_cycle`] runs exactly one instruction,
//! prefixes and all, and returns its T-state cost. Memory and I/O go
//! through the host's [`emu_core::IoBus`]; the core carries no device
//! knowledge.

mod alu;
mod cpu;
mod flags;
mod registers;

pub use cpu::Z80;
pub use flags::{CF, HF, NF, PF, SF, XF, YF, ZF};
pub use registers::Registers;
