//! Mnemonic resolution for program text.

use ticksim_core::{AluOp, Condition, UnaryOp};

/// Instruction family selected by a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// `NOP`.
    Nop,
    /// `HALT`.
    Halt,
    /// `LOAD rd, imm`.
    Load,
    /// `MOV rd, rs`.
    Mov,
    /// Two-register ALU operation.
    Alu(AluOp),
    /// Single-register operation.
    Unary(UnaryOp),
    /// `CMP ra, rb`.
    Cmp,
    /// `LDM rd, [addr]`.
    LoadMem,
    /// `STM rs, [addr]`.
    StoreMem,
    /// Conditional or unconditional jump.
    Jump(Condition),
}

/// Operand shape expected after a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandForm {
    /// No operands.
    None,
    /// One register.
    Reg,
    /// Register and immediate.
    RegImm,
    /// Two registers.
    RegReg,
    /// Register and bracketed memory operand.
    RegMem,
    /// Label or command index.
    Target,
}

impl OperandForm {
    /// Number of comma-separated operands the form takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::None => 0,
            Self::Reg | Self::Target => 1,
            Self::RegImm | Self::RegReg | Self::RegMem => 2,
        }
    }
}

impl Mnemonic {
    /// Operand shape this mnemonic expects.
    #[must_use]
    pub const fn operand_form(self) -> OperandForm {
        match self {
            Self::Nop | Self::Halt => OperandForm::None,
            Self::Load => OperandForm::RegImm,
            Self::Mov | Self::Alu(_) | Self::Cmp => OperandForm::RegReg,
            Self::Unary(_) => OperandForm::Reg,
            Self::LoadMem | Self::StoreMem => OperandForm::RegMem,
            Self::Jump(_) => OperandForm::Target,
        }
    }

    /// Canonical upper-case spelling.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Halt => "HALT",
            Self::Load => "LOAD",
            Self::Mov => "MOV",
            Self::Alu(op) => op.mnemonic(),
            Self::Unary(op) => op.mnemonic(),
            Self::Cmp => "CMP",
            Self::LoadMem => "LDM",
            Self::StoreMem => "STM",
            Self::Jump(cond) => cond.mnemonic(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MnemonicEntry {
    name: &'static str,
    mnemonic: Mnemonic,
}

const fn entry(name: &'static str, mnemonic: Mnemonic) -> MnemonicEntry {
    MnemonicEntry { name, mnemonic }
}

const MNEMONIC_ENTRIES: &[MnemonicEntry] = &[
    entry("NOP", Mnemonic::Nop),
    entry("HALT", Mnemonic::Halt),
    entry("LOAD", Mnemonic::Load),
    entry("MOV", Mnemonic::Mov),
    entry("ADD", Mnemonic::Alu(AluOp::Add)),
    entry("SUB", Mnemonic::Alu(AluOp::Sub)),
    entry("MUL", Mnemonic::Alu(AluOp::Mul)),
    entry("DIV", Mnemonic::Alu(AluOp::Div)),
    entry("AND", Mnemonic::Alu(AluOp::And)),
    entry("OR", Mnemonic::Alu(AluOp::Or)),
    entry("XOR", Mnemonic::Alu(AluOp::Xor)),
    entry("SHL", Mnemonic::Alu(AluOp::Shl)),
    entry("SHR", Mnemonic::Alu(AluOp::Shr)),
    entry("INC", Mnemonic::Unary(UnaryOp::Inc)),
    entry("DEC", Mnemonic::Unary(UnaryOp::Dec)),
    entry("NOT", Mnemonic::Unary(UnaryOp::Not)),
    entry("CMP", Mnemonic::Cmp),
    entry("LDM", Mnemonic::LoadMem),
    entry("STM", Mnemonic::StoreMem),
    entry("JMP", Mnemonic::Jump(Condition::Always)),
    entry("JZ", Mnemonic::Jump(Condition::Zero)),
    entry("JNZ", Mnemonic::Jump(Condition::NotZero)),
    entry("JN", Mnemonic::Jump(Condition::Negative)),
    entry("JNN", Mnemonic::Jump(Condition::NotNegative)),
    entry("JC", Mnemonic::Jump(Condition::Carry)),
    entry("JNC", Mnemonic::Jump(Condition::NotCarry)),
    entry("JV", Mnemonic::Jump(Condition::Overflow)),
    entry("JNV", Mnemonic::Jump(Condition::NotOverflow)),
];

/// Resolves a mnemonic string.
///
/// Matching is ASCII case-insensitive.
#[must_use]
pub fn resolve_mnemonic(name: &str) -> Option<Mnemonic> {
    MNEMONIC_ENTRIES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| entry.mnemonic)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;
    use ticksim_core::{AluOp, Condition, UnaryOp};

    use super::{resolve_mnemonic, Mnemonic, OperandForm, MNEMONIC_ENTRIES};

    #[test]
    fn every_entry_resolves_to_its_own_spelling() {
        for entry in MNEMONIC_ENTRIES {
            assert_eq!(resolve_mnemonic(entry.name), Some(entry.mnemonic));
            assert_eq!(entry.mnemonic.name(), entry.name);
        }
    }

    #[test]
    fn table_has_no_duplicate_names() {
        let names: HashSet<_> = MNEMONIC_ENTRIES.iter().map(|entry| entry.name).collect();
        assert_eq!(names.len(), MNEMONIC_ENTRIES.len());
        assert_eq!(MNEMONIC_ENTRIES.len(), 28);
    }

    #[rstest]
    #[case("add", Mnemonic::Alu(AluOp::Add))]
    #[case("Inc", Mnemonic::Unary(UnaryOp::Inc))]
    #[case("jNz", Mnemonic::Jump(Condition::NotZero))]
    #[case("ldm", Mnemonic::LoadMem)]
    fn lookup_is_case_insensitive(#[case] name: &str, #[case] expected: Mnemonic) {
        assert_eq!(resolve_mnemonic(name), Some(expected));
    }

    #[test]
    fn unknown_mnemonic_returns_none() {
        assert_eq!(resolve_mnemonic("???"), None);
        assert_eq!(resolve_mnemonic("MOVE"), None);
        assert_eq!(resolve_mnemonic(""), None);
    }

    #[rstest]
    #[case(Mnemonic::Halt, OperandForm::None, 0)]
    #[case(Mnemonic::Load, OperandForm::RegImm, 2)]
    #[case(Mnemonic::Cmp, OperandForm::RegReg, 2)]
    #[case(Mnemonic::Unary(UnaryOp::Not), OperandForm::Reg, 1)]
    #[case(Mnemonic::StoreMem, OperandForm::RegMem, 2)]
    #[case(Mnemonic::Jump(Condition::Always), OperandForm::Target, 1)]
    fn operand_forms_and_arity(
        #[case] mnemonic: Mnemonic,
        #[case] form: OperandForm,
        #[case] arity: usize,
    ) {
        assert_eq!(mnemonic.operand_form(), form);
        assert_eq!(form.arity(), arity);
    }
}
