//! Register file and data memory primitives.

/// Register identifiers and the mutable machine state.
pub mod registers;

pub use registers::{ArchitecturalState, Register, DATA_MEMORY_WORDS, GENERAL_REGISTER_COUNT};
