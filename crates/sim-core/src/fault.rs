use thiserror::Error;

/// Runtime fault raised while executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FaultCode {
    /// `DIV` with a zero divisor.
    #[error("division by zero")]
    DivideByZero,
    /// Indirect data memory access outside `m[0]..m[15]`.
    #[error("data memory address {0} out of range")]
    AddressOutOfRange(u16),
}

/// A fault together with the command that raised it.
///
/// The faulting tick commits no side effects, so the processor state stays
/// exactly as it was before the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("execution fault at pc {pc} (line {line}): {code}")]
pub struct ExecFault {
    /// Program counter of the faulting command.
    pub pc: usize,
    /// Source line of the faulting command.
    pub line: usize,
    /// What went wrong.
    pub code: FaultCode,
}
