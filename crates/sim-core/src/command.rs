//! Closed instruction vocabulary and the loaded program's command model.
//!
//! Every instruction variant operates on the eight 16-bit registers and the
//! sixteen-word data memory. Jump targets are absolute 0-based indices into
//! the program; a target equal to the program length halts the processor.

use std::fmt;

use crate::flags::{Flag, Flags};
use crate::state::Register;

/// Two-register arithmetic and logic operations (`rd = rd op rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    /// Wrapping addition.
    Add,
    /// Wrapping subtraction.
    Sub,
    /// Low 16 bits of the product.
    Mul,
    /// Unsigned division; faults on a zero divisor.
    Div,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Logical shift left by `rs & 0xF`.
    Shl,
    /// Logical shift right by `rs & 0xF`.
    Shr,
}

impl AluOp {
    /// Mnemonic as written in program text.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
        }
    }
}

/// Single-register operations (`rd = op rd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Add one.
    Inc,
    /// Subtract one.
    Dec,
    /// Bitwise complement.
    Not,
}

impl UnaryOp {
    /// Mnemonic as written in program text.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Not => "NOT",
        }
    }
}

/// Branch predicate evaluated against the flags of the previous instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Unconditional.
    Always,
    /// `Z` set.
    Zero,
    /// `Z` clear.
    NotZero,
    /// `N` set.
    Negative,
    /// `N` clear.
    NotNegative,
    /// `C` set.
    Carry,
    /// `C` clear.
    NotCarry,
    /// `V` set.
    Overflow,
    /// `V` clear.
    NotOverflow,
}

impl Condition {
    /// Returns `true` when the branch is taken under `flags`.
    #[must_use]
    pub const fn holds(self, flags: Flags) -> bool {
        match self {
            Self::Always => true,
            Self::Zero => flags.is_set(Flag::Zero),
            Self::NotZero => !flags.is_set(Flag::Zero),
            Self::Negative => flags.is_set(Flag::Negative),
            Self::NotNegative => !flags.is_set(Flag::Negative),
            Self::Carry => flags.is_set(Flag::Carry),
            Self::NotCarry => !flags.is_set(Flag::Carry),
            Self::Overflow => flags.is_set(Flag::Overflow),
            Self::NotOverflow => !flags.is_set(Flag::Overflow),
        }
    }

    /// Jump mnemonic for this predicate.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Always => "JMP",
            Self::Zero => "JZ",
            Self::NotZero => "JNZ",
            Self::Negative => "JN",
            Self::NotNegative => "JNN",
            Self::Carry => "JC",
            Self::NotCarry => "JNC",
            Self::Overflow => "JV",
            Self::NotOverflow => "JNV",
        }
    }
}

/// Data memory operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// Fixed word address, validated at load time.
    Absolute(u8),
    /// Word address held in a register, validated when executed.
    Indirect(Register),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(addr) => write!(f, "[{addr}]"),
            Self::Indirect(reg) => write!(f, "[{reg}]"),
        }
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// Does nothing.
    Nop,
    /// Moves the program counter to the end of the program.
    Halt,
    /// `rd = value`.
    Load {
        /// Destination register.
        rd: Register,
        /// Immediate value.
        value: u16,
    },
    /// `rd = rs`.
    Mov {
        /// Destination register.
        rd: Register,
        /// Source register.
        rs: Register,
    },
    /// `rd = rd op rs`.
    Alu {
        /// Operation.
        op: AluOp,
        /// Destination and left operand.
        rd: Register,
        /// Right operand.
        rs: Register,
    },
    /// `rd = op rd`.
    Unary {
        /// Operation.
        op: UnaryOp,
        /// Destination and operand.
        rd: Register,
    },
    /// Sets flags from `ra - rb` without writing a register.
    Cmp {
        /// Left operand.
        ra: Register,
        /// Right operand.
        rb: Register,
    },
    /// `rd = m[addr]`.
    LoadMem {
        /// Destination register.
        rd: Register,
        /// Source address.
        addr: Address,
    },
    /// `m[addr] = rs`.
    StoreMem {
        /// Source register.
        rs: Register,
        /// Destination address.
        addr: Address,
    },
    /// Branch to `target` when `cond` holds.
    Jump {
        /// Branch predicate.
        cond: Condition,
        /// Absolute 0-based command index.
        target: usize,
    },
}

impl Instruction {
    /// Explicit branch target, if this is a jump.
    #[must_use]
    pub const fn jump_target(&self) -> Option<usize> {
        match self {
            Self::Jump { target, .. } => Some(*target),
            _ => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nop => f.write_str("NOP"),
            Self::Halt => f.write_str("HALT"),
            Self::Load { rd, value } => write!(f, "LOAD {rd}, {value}"),
            Self::Mov { rd, rs } => write!(f, "MOV {rd}, {rs}"),
            Self::Alu { op, rd, rs } => write!(f, "{} {rd}, {rs}", op.mnemonic()),
            Self::Unary { op, rd } => write!(f, "{} {rd}", op.mnemonic()),
            Self::Cmp { ra, rb } => write!(f, "CMP {ra}, {rb}"),
            Self::LoadMem { rd, addr } => write!(f, "LDM {rd}, {addr}"),
            Self::StoreMem { rs, addr } => write!(f, "STM {rs}, {addr}"),
            Self::Jump { cond, target } => write!(f, "{} {target}", cond.mnemonic()),
        }
    }
}

/// A loaded instruction together with its 1-based source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    line: usize,
    instruction: Instruction,
}

impl Command {
    /// Creates a command for `instruction` loaded from source `line`.
    #[must_use]
    pub const fn new(line: usize, instruction: Instruction) -> Self {
        Self { line, instruction }
    }

    /// 1-based source line the command was loaded from.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// The decoded instruction.
    #[must_use]
    pub const fn instruction(&self) -> &Instruction {
        &self.instruction
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instruction)
    }
}
