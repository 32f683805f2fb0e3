//! Core traits and helpers for cycle-counted CPU emulation.
//!
//! CPUs execute one instruction per `step` and report its cost in T-states;
//! memory and I/O are reached through host-supplied bus implementations.

mod bus;
mod cpu;
mod io_bus;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use io_bus::IoBus;
