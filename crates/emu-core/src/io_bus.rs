use crate::Bus;

/// A bus that also supports separate I/O port operations.
///
/// The Z80 has a 16-bit I/O address space distinct from memory, reached via
/// IN and OUT instructions. Port accesses apply immediately, like memory
/// accesses; the CPU core charges the 4 T-states itself.
pub trait IoBus: Bus {
    /// Read a byte from the given I/O port.
    fn read_io(&mut self, port: u16) -> u8;

    /// Write a byte to the given I/O port.
    fn write_io(&mut self, port: u16, value: u8);
}
