//! Memory bus interface and a flat test bus.

use std::collections::HashMap;

/// A bus that supports memory read/write operations.
///
/// The host implements address decoding, ROM/RAM banking and peripheral
/// routing behind this trait; the CPU core never sees any of it. Reads and
/// writes apply immediately. The CPU accounts for the T-states an access
/// costs, so implementations must not block or retry.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat 64K RAM bus with preloadable I/O port values, for tests.
pub struct SimpleBus {
    ram: [u8; 65536],
    /// Values returned by `read_io`, keyed by port. Missing ports read 0xFF.
    pub io_read_values: HashMap<u16, u8>,
    /// Every `write_io` call in order.
    pub io_writes: Vec<(u16, u8)>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0; 65536],
            io_read_values: HashMap::new(),
            io_writes: Vec::new(),
        }
    }

    /// Load bytes into RAM starting at `address`.
    pub fn load(&mut self, address: u16, bytes: &[u8]) {
        for (i, &byte) in bytes.iter().enumerate() {
            self.ram[address.wrapping_add(i as u16) as usize] = byte;
        }
    }

    /// Read RAM without going through the bus contract.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.ram[address as usize]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.ram[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize] = value;
    }
}

impl crate::IoBus for SimpleBus {
    fn read_io(&mut self, port: u16) -> u8 {
        self.io_read_values.get(&port).copied().unwrap_or(0xFF)
    }

    fn write_io(&mut self, port: u16, value: u8) {
        self.io_writes.push((port, value));
    }
}
