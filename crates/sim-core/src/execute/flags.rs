//! FLAGS update behaviors for different instruction classes.

use crate::flags::Flags;

/// Describes how FLAGS are recomputed once an instruction's effects are
/// committed. Register- and memory-derived variants read the post-execution
/// state, never the operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagsUpdate {
    /// Keep the previous FLAGS.
    #[default]
    None,
    /// `Z`/`N` from the destination register after the write.
    FromDestination {
        /// Carry/borrow out of the operation.
        carry: bool,
        /// Signed overflow of the operation.
        overflow: bool,
    },
    /// `Z`/`N` from the data memory word just written; `C`/`V` unchanged.
    FromStoredWord,
    /// Replace FLAGS with a precomputed value (results that are discarded).
    Set(Flags),
}
