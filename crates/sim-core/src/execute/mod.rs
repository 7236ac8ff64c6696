//! Instruction execution pipeline.
//!
//! Execution is split in two so faults stay precise:
//! 1. [`execute_instruction`] reads operands from the current state and
//!    records every side effect in an [`ExecuteState`] without mutating
//!    anything. A fault returns early and nothing is committed.
//! 2. [`commit_execution`] writes the destination register or memory word,
//!    recomputes FLAGS from the *post-write* state and advances the PC.

mod flags;
mod helpers;

pub use flags::FlagsUpdate;
pub use helpers::{add_with_carry, resolve_address, sub_with_borrow};

use crate::command::{AluOp, Instruction, UnaryOp};
use crate::fault::FaultCode;
use crate::flags::{Flag, Flags};
use crate::state::{ArchitecturalState, Register};

/// Side effects of one instruction, accumulated before commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteState {
    /// Register to write.
    pub dest_reg: Option<Register>,
    /// Value for `dest_reg`.
    pub dest_value: Option<u16>,
    /// Data memory word index and value to write.
    pub memory_write: Option<(usize, u16)>,
    /// How FLAGS are recomputed after the writes.
    pub flags_update: FlagsUpdate,
    /// Program counter after commit.
    pub next_pc: usize,
}

impl ExecuteState {
    /// Creates an execute state that falls through to `next_pc`.
    #[must_use]
    pub fn new(next_pc: usize) -> Self {
        Self {
            next_pc,
            ..Self::default()
        }
    }
}

/// Computes the side effects of `instr` against `state`.
///
/// `program_len` is the halt address used by `HALT`.
///
/// # Errors
///
/// Returns a [`FaultCode`] for a zero divisor or an out-of-range indirect
/// address. No side effects are recorded in that case.
pub fn execute_instruction(
    instr: &Instruction,
    state: &ArchitecturalState,
    program_len: usize,
) -> Result<ExecuteState, FaultCode> {
    let mut exec = ExecuteState::new(state.pc().saturating_add(1));

    match *instr {
        Instruction::Nop => {}
        Instruction::Halt => exec.next_pc = program_len,
        Instruction::Load { rd, value } => write_register(&mut exec, rd, value, false, false),
        Instruction::Mov { rd, rs } => write_register(&mut exec, rd, state.gpr(rs), false, false),
        Instruction::Alu { op, rd, rs } => execute_alu(&mut exec, state, op, rd, rs)?,
        Instruction::Unary { op, rd } => execute_unary(&mut exec, state, op, rd),
        Instruction::Cmp { ra, rb } => {
            let (diff, borrow, overflow) = sub_with_borrow(state.gpr(ra), state.gpr(rb));
            exec.flags_update = FlagsUpdate::Set(Flags::from_result(diff, borrow, overflow));
        }
        Instruction::LoadMem { rd, addr } => {
            let index = resolve_address(addr, state)?;
            let value = state.mem(index).unwrap_or_default();
            write_register(&mut exec, rd, value, false, false);
        }
        Instruction::StoreMem { rs, addr } => {
            let index = resolve_address(addr, state)?;
            exec.memory_write = Some((index, state.gpr(rs)));
            exec.flags_update = FlagsUpdate::FromStoredWord;
        }
        Instruction::Jump { cond, target } => {
            if cond.holds(state.flags()) {
                exec.next_pc = target;
            }
        }
    }

    Ok(exec)
}

fn write_register(exec: &mut ExecuteState, rd: Register, value: u16, carry: bool, overflow: bool) {
    exec.dest_reg = Some(rd);
    exec.dest_value = Some(value);
    exec.flags_update = FlagsUpdate::FromDestination { carry, overflow };
}

fn execute_alu(
    exec: &mut ExecuteState,
    state: &ArchitecturalState,
    op: AluOp,
    rd: Register,
    rs: Register,
) -> Result<(), FaultCode> {
    let a = state.gpr(rd);
    let b = state.gpr(rs);

    let (result, carry, overflow) = match op {
        AluOp::Add => add_with_carry(a, b),
        AluOp::Sub => sub_with_borrow(a, b),
        AluOp::Mul => {
            let full = u32::from(a) * u32::from(b);
            let low = u16::try_from(full & 0xFFFF).unwrap_or_default();
            (low, full > 0xFFFF, false)
        }
        AluOp::Div => {
            if b == 0 {
                return Err(FaultCode::DivideByZero);
            }
            (a / b, false, false)
        }
        AluOp::And => (a & b, false, false),
        AluOp::Or => (a | b, false, false),
        AluOp::Xor => (a ^ b, false, false),
        AluOp::Shl => {
            let shift = b & 0x0F;
            let carry = shift > 0 && ((a >> (16 - shift)) & 1) != 0;
            (a << shift, carry, false)
        }
        AluOp::Shr => {
            let shift = b & 0x0F;
            let carry = shift > 0 && ((a >> (shift - 1)) & 1) != 0;
            (a >> shift, carry, false)
        }
    };

    write_register(exec, rd, result, carry, overflow);
    Ok(())
}

fn execute_unary(exec: &mut ExecuteState, state: &ArchitecturalState, op: UnaryOp, rd: Register) {
    let value = state.gpr(rd);
    let (result, carry, overflow) = match op {
        UnaryOp::Inc => add_with_carry(value, 1),
        UnaryOp::Dec => sub_with_borrow(value, 1),
        UnaryOp::Not => (!value, false, false),
    };
    write_register(exec, rd, result, carry, overflow);
}

/// Applies the recorded side effects to `state`.
///
/// Register and memory writes land first; FLAGS are then derived from the
/// written location so they describe the post-execution state.
pub fn commit_execution(state: &mut ArchitecturalState, exec: &ExecuteState) {
    if let (Some(reg), Some(value)) = (exec.dest_reg, exec.dest_value) {
        state.set_gpr(reg, value);
    }

    if let Some((index, value)) = exec.memory_write {
        state.set_mem(index, value);
    }

    let previous = state.flags();
    let flags = match exec.flags_update {
        FlagsUpdate::None => previous,
        FlagsUpdate::FromDestination { carry, overflow } => exec
            .dest_reg
            .map_or(previous, |reg| Flags::from_result(state.gpr(reg), carry, overflow)),
        FlagsUpdate::FromStoredWord => exec.memory_write.map_or(previous, |(index, _)| {
            let word = state.mem(index).unwrap_or_default();
            Flags::from_result(
                word,
                previous.is_set(Flag::Carry),
                previous.is_set(Flag::Overflow),
            )
        }),
        FlagsUpdate::Set(flags) => flags,
    };
    state.set_flags(flags);

    state.set_pc(exec.next_pc);
}
