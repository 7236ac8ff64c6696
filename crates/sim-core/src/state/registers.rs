use std::fmt;

use crate::flags::Flags;

/// Number of general-purpose registers (`r0..r7`).
pub const GENERAL_REGISTER_COUNT: usize = 8;
/// Number of addressable data memory words (`m[0]..m[15]`).
pub const DATA_MEMORY_WORDS: usize = 16;

/// General-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl Register {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps an array index back to a register.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::R0),
            1 => Some(Self::R1),
            2 => Some(Self::R2),
            3 => Some(Self::R3),
            4 => Some(Self::R4),
            5 => Some(Self::R5),
            6 => Some(Self::R6),
            7 => Some(Self::R7),
            _ => None,
        }
    }

    /// Lower-case register name as written in program text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::R0 => "r0",
            Self::R1 => "r1",
            Self::R2 => "r2",
            Self::R3 => "r3",
            Self::R4 => "r4",
            Self::R5 => "r5",
            Self::R6 => "r6",
            Self::R7 => "r7",
        }
    }

    /// Parses `r0`..`r7` (either case).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text
            .strip_prefix('r')
            .or_else(|| text.strip_prefix('R'))?;
        if digits.len() != 1 {
            return None;
        }
        digits
            .parse::<usize>()
            .ok()
            .and_then(Self::from_index)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutable machine state owned by a processor: registers, data memory,
/// program counter and the flags of the last executed instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchitecturalState {
    gpr: [u16; GENERAL_REGISTER_COUNT],
    memory: [u16; DATA_MEMORY_WORDS],
    pc: usize,
    flags: Flags,
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: Register) -> u16 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_gpr(&mut self, reg: Register, value: u16) {
        self.gpr[reg.index()] = value;
    }

    /// Copy of the whole register file.
    #[must_use]
    pub const fn registers(&self) -> [u16; GENERAL_REGISTER_COUNT] {
        self.gpr
    }

    /// Reads a data memory word, `None` when `addr` is out of range.
    #[must_use]
    pub fn mem(&self, addr: usize) -> Option<u16> {
        self.memory.get(addr).copied()
    }

    /// Writes a data memory word. Out-of-range writes are ignored; the
    /// execution stage validates addresses before committing.
    pub fn set_mem(&mut self, addr: usize, value: u16) {
        if let Some(slot) = self.memory.get_mut(addr) {
            *slot = value;
        }
    }

    /// Copy of the whole data memory.
    #[must_use]
    pub const fn memory(&self) -> [u16; DATA_MEMORY_WORDS] {
        self.memory
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: usize) {
        self.pc = value;
    }

    /// Flags produced by the last executed instruction.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Replaces the flags wholesale.
    pub const fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }
}
