//! Core processor model for the ticksim simulator.
//!
//! A [`Processor`] owns a fixed program of [`Command`]s and advances one
//! clock tick per [`Processor::clk`] call. [`ProcState`] snapshots are
//! independent copies and [`History`] keeps one per tick.

/// Register file and data memory primitives.
pub mod state;
pub use state::{ArchitecturalState, Register, DATA_MEMORY_WORDS, GENERAL_REGISTER_COUNT};

/// Named status flags.
pub mod flags;
pub use flags::{Flag, Flags};

/// Instruction vocabulary and loaded commands.
pub mod command;
pub use command::{Address, AluOp, Command, Condition, Instruction, UnaryOp};

/// Runtime fault taxonomy.
pub mod fault;
pub use fault::{ExecFault, FaultCode};

/// Instruction execution pipeline.
pub mod execute;
pub use execute::{commit_execution, execute_instruction, ExecuteState, FlagsUpdate};

/// Clock-stepped processor.
pub mod processor;
pub use processor::{Processor, ProcessorError, StepOutcome};

/// Immutable processor snapshots.
pub mod snapshot;
pub use snapshot::ProcState;

/// Append-only snapshot history.
pub mod history;
pub use history::{History, HistoryError};
