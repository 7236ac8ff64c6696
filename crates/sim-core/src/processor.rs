//! The clock-stepped processor.

use log::{debug, trace};
use thiserror::Error;

use crate::command::Command;
use crate::execute::{commit_execution, execute_instruction};
use crate::fault::ExecFault;
use crate::state::ArchitecturalState;

/// Errors raised while installing a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ProcessorError {
    /// A program was already stored in this processor.
    #[error("a program is already stored; a processor accepts exactly one program")]
    AlreadyInitialized,
    /// A jump points past the end of the program.
    #[error("jump on line {line} targets command {target}, but the program has {len} commands")]
    TargetOutOfRange {
        /// Source line of the jump.
        line: usize,
        /// Requested target index.
        target: usize,
        /// Program length.
        len: usize,
    },
}

/// Result of one clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// A command was executed.
    Executed {
        /// Program counter of the executed command.
        pc: usize,
        /// Source line of the executed command.
        line: usize,
    },
    /// The program counter is past the last command; nothing changed.
    Halted,
}

/// Processor owning a fixed program and one mutable machine state.
///
/// Observers never borrow the live state across ticks; they take a
/// [`ProcState`](crate::ProcState) copy instead.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    program: Vec<Command>,
    initialized: bool,
    arch: ArchitecturalState,
    clk: u64,
}

impl Processor {
    /// Creates a processor with no program. Ticking it is a halted no-op.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a processor and stores `commands` as its program.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError::TargetOutOfRange`] when a jump points past
    /// the end of `commands`.
    pub fn with_program(commands: Vec<Command>) -> Result<Self, ProcessorError> {
        let mut processor = Self::new();
        processor.store_program(commands)?;
        Ok(processor)
    }

    /// Installs the program and resets the machine to its zero state.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessorError::AlreadyInitialized`] on a second call, and
    /// [`ProcessorError::TargetOutOfRange`] when a jump points past the end of
    /// `commands`.
    pub fn store_program(&mut self, commands: Vec<Command>) -> Result<(), ProcessorError> {
        if self.initialized {
            return Err(ProcessorError::AlreadyInitialized);
        }

        let len = commands.len();
        for command in &commands {
            if let Some(target) = command.instruction().jump_target() {
                if target > len {
                    return Err(ProcessorError::TargetOutOfRange {
                        line: command.line(),
                        target,
                        len,
                    });
                }
            }
        }

        trace!("storing program of {len} commands");
        self.program = commands;
        self.initialized = true;
        self.arch = ArchitecturalState::default();
        self.clk = 0;
        Ok(())
    }

    /// Advances the processor by one clock tick.
    ///
    /// A halted processor only advances its clock counter.
    ///
    /// # Errors
    ///
    /// Returns an [`ExecFault`] when the command at the program counter
    /// faults. The tick is then discarded: neither the machine state nor the
    /// clock counter change.
    pub fn clk(&mut self) -> Result<StepOutcome, ExecFault> {
        let pc = self.arch.pc();
        let Some(command) = self.program.get(pc).copied() else {
            self.clk += 1;
            trace!("clk {}: halted at pc {pc}", self.clk);
            return Ok(StepOutcome::Halted);
        };

        let exec = execute_instruction(command.instruction(), &self.arch, self.program.len())
            .map_err(|code| ExecFault {
                pc,
                line: command.line(),
                code,
            })?;
        commit_execution(&mut self.arch, &exec);
        self.clk += 1;

        debug!(
            "clk {}: line {} `{}` -> pc {}, flags {}",
            self.clk,
            command.line(),
            command,
            self.arch.pc(),
            self.arch.flags()
        );

        Ok(StepOutcome::Executed {
            pc,
            line: command.line(),
        })
    }

    /// Number of ticks taken so far, halted ticks included.
    #[must_use]
    pub const fn clk_counter(&self) -> u64 {
        self.clk
    }

    /// Current program counter.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.arch.pc()
    }

    /// Returns `true` when the program counter is past the last command.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.arch.pc() >= self.program.len()
    }

    /// The stored program.
    #[must_use]
    pub fn program(&self) -> &[Command] {
        &self.program
    }

    /// Command the next tick will execute, if any.
    #[must_use]
    pub fn current_command(&self) -> Option<&Command> {
        self.program.get(self.arch.pc())
    }

    /// Read-only view of the live machine state.
    #[must_use]
    pub const fn arch(&self) -> &ArchitecturalState {
        &self.arch
    }
}
