use crate::Bus;

/// A CPU that executes one instruction at a time.
///
/// The type parameter `B` is the bus type this CPU operates on.
pub trait Cpu<B: Bus> {
    /// Execute one complete instruction, including any prefix bytes,
    /// displacement and immediate operands. Returns the T-states consumed.
    fn step(&mut self, bus: &mut B) -> u32;

    /// Reset the CPU to its architectural power-on state.
    fn reset(&mut self);

    /// Request a maskable interrupt.
    ///
    /// The request is latched and consulted at the next instruction
    /// boundary; it stays pending until the CPU accepts it.
    fn interrupt(&mut self);

    /// Request a non-maskable interrupt, serviced at the next boundary.
    fn nmi(&mut self);

    /// Current program counter.
    fn pc(&self) -> u16;

    /// True while the CPU sits in the HALT state.
    fn is_halted(&self) -> bool;
}
