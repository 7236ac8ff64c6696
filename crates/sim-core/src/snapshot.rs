//! Immutable processor snapshots.

use crate::flags::Flags;
use crate::processor::Processor;
use crate::state::{Register, DATA_MEMORY_WORDS, GENERAL_REGISTER_COUNT};

/// Snapshot of a [`Processor`] taken at one clock count.
///
/// Registers and memory are stored by value, so ticks taken after the
/// snapshot cannot change it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProcState {
    clk: u64,
    pc: usize,
    next_line: Option<usize>,
    registers: [u16; GENERAL_REGISTER_COUNT],
    memory: [u16; DATA_MEMORY_WORDS],
    flags: Flags,
}

impl ProcState {
    /// Captures the current state of `processor`.
    #[must_use]
    pub fn of(processor: &Processor) -> Self {
        let arch = processor.arch();
        Self {
            clk: processor.clk_counter(),
            pc: arch.pc(),
            next_line: processor.current_command().map(crate::Command::line),
            registers: arch.registers(),
            memory: arch.memory(),
            flags: arch.flags(),
        }
    }

    /// Clock count: `0` before any tick, `n` after the n-th tick.
    #[must_use]
    pub const fn clk(&self) -> u64 {
        self.clk
    }

    /// Program counter at capture time.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }

    /// Source line of the command the next tick would execute, `None` when
    /// halted.
    #[must_use]
    pub const fn next_line(&self) -> Option<usize> {
        self.next_line
    }

    /// Register file contents indexed by [`Register::index`].
    #[must_use]
    pub const fn registers(&self) -> &[u16; GENERAL_REGISTER_COUNT] {
        &self.registers
    }

    /// Value of one register.
    #[must_use]
    pub const fn register(&self, reg: Register) -> u16 {
        self.registers[reg.index()]
    }

    /// Data memory contents.
    #[must_use]
    pub const fn memory(&self) -> &[u16; DATA_MEMORY_WORDS] {
        &self.memory
    }

    /// Flags produced by the last executed command.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }
}
