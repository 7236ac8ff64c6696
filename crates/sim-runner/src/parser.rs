//! Program line parser for instructions and labels.
//!
//! Converts the instruction part of each [`SourceLine`] into a
//! [`ParsedLine`]. Jump targets that name labels stay symbolic here and are
//! resolved by [`crate::symbols`] once every label is known.

use thiserror::Error;
use ticksim_core::{Address, Instruction, Register, DATA_MEMORY_WORDS};

use crate::mnemonic::{resolve_mnemonic, Mnemonic, OperandForm};
use crate::source::SourceLine;

/// Smallest accepted immediate (two's complement of the 16-bit word).
pub const IMMEDIATE_MIN: i64 = -32_768;
/// Largest accepted immediate.
pub const IMMEDIATE_MAX: i64 = 65_535;

/// A jump target as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpTarget {
    /// Absolute 0-based command index.
    Index(usize),
    /// Label reference, resolved after all lines are parsed.
    Label(String),
}

/// Instruction body awaiting label resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedBody {
    /// Fully decoded instruction.
    Ready(Instruction),
    /// Jump whose target may still be symbolic.
    Jump {
        /// Branch predicate.
        cond: ticksim_core::Condition,
        /// Target as written.
        target: JumpTarget,
    },
}

/// A parsed instruction line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// Label defined on this line, if any.
    pub label: Option<String>,
    /// Resolved mnemonic.
    pub mnemonic: Mnemonic,
    /// Decoded operands.
    pub body: ParsedBody,
}

/// A single parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Empty or comment-only line.
    Blank,
    /// Instruction line.
    Instruction(ParsedInstruction),
}

/// Malformed program text, tied to the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}: `{text}`")]
pub struct ParseError {
    /// 1-indexed line number.
    pub line: usize,
    /// The raw line as written.
    pub text: String,
    /// Kind of parse error.
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Creates an error for `line` with its raw `text`.
    #[must_use]
    pub fn new(line: usize, text: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            line,
            text: text.into(),
            kind,
        }
    }

    fn at(source: &SourceLine, kind: ParseErrorKind) -> Self {
        Self::new(source.line, source.raw.clone(), kind)
    }
}

/// Classification of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Unknown or invalid mnemonic.
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    /// Invalid register name (not r0-r7).
    #[error("invalid register `{0}`")]
    InvalidRegister(String),
    /// Malformed or out-of-range immediate value.
    #[error("invalid immediate `{0}`")]
    InvalidImmediate(String),
    /// Malformed or out-of-range memory operand.
    #[error("invalid memory operand `{0}`")]
    InvalidMemoryOperand(String),
    /// Jump target that is neither a label nor an index.
    #[error("invalid jump target `{0}`")]
    InvalidTarget(String),
    /// Label with characters other than letters, digits and `_`.
    #[error("invalid label `{0}`")]
    InvalidLabel(String),
    /// Label with nothing after it.
    #[error("label `{0}` is not followed by an instruction")]
    LabelWithoutInstruction(String),
    /// Fewer operands than the mnemonic takes.
    #[error("{mnemonic} expects {expected} operand(s), found {found}")]
    MissingOperand {
        /// Mnemonic as resolved.
        mnemonic: &'static str,
        /// Operands the mnemonic takes.
        expected: usize,
        /// Operands written.
        found: usize,
    },
    /// More operands than the mnemonic takes.
    #[error("{mnemonic} expects {expected} operand(s), found {found}")]
    UnexpectedOperand {
        /// Mnemonic as resolved.
        mnemonic: &'static str,
        /// Operands the mnemonic takes.
        expected: usize,
        /// Operands written.
        found: usize,
    },
    /// Label defined twice.
    #[error("duplicate label `{name}` (first defined on line {first_definition})")]
    DuplicateLabel {
        /// Label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// Jump to a label that is never defined.
    #[error("undefined label `{0}`")]
    UndefinedLabel(String),
    /// Jump past the end of the program.
    #[error("jump target {target} is past the end of the {len}-command program")]
    TargetOutOfRange {
        /// Requested index.
        target: usize,
        /// Program length.
        len: usize,
    },
}

/// Result of parsing a single line.
pub type ParseResult = Result<ParsedLine, ParseError>;

/// Parses a source line into a [`ParsedLine`].
///
/// # Errors
///
/// Returns a [`ParseError`] naming the line when it holds an unknown
/// mnemonic, a malformed operand or the wrong number of operands.
pub fn parse_line(source: &SourceLine) -> ParseResult {
    if source.is_blank() {
        return Ok(ParsedLine::Blank);
    }

    parse_instruction(&source.text)
        .map(ParsedLine::Instruction)
        .map_err(|kind| ParseError::at(source, kind))
}

fn parse_instruction(text: &str) -> Result<ParsedInstruction, ParseErrorKind> {
    let (label, rest) = match split_label(text) {
        Some((label, rest)) => {
            if !is_valid_label(label) {
                return Err(ParseErrorKind::InvalidLabel(label.to_string()));
            }
            if rest.is_empty() {
                return Err(ParseErrorKind::LabelWithoutInstruction(label.to_string()));
            }
            (Some(label.to_string()), rest)
        }
        None => (None, text),
    };

    let (name, operand_text) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(name, operands)| (name, operands.trim()));
    let mnemonic =
        resolve_mnemonic(name).ok_or_else(|| ParseErrorKind::UnknownMnemonic(name.to_string()))?;

    let operands = tokenize(operand_text);
    check_arity(mnemonic, &operands)?;
    let body = parse_body(mnemonic, &operands)?;

    Ok(ParsedInstruction {
        label,
        mnemonic,
        body,
    })
}

fn split_label(text: &str) -> Option<(&str, &str)> {
    let (label, rest) = text.split_once(':')?;
    Some((label.trim(), rest.trim()))
}

fn is_valid_label(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn tokenize(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split(',').map(str::trim).collect()
}

fn check_arity(mnemonic: Mnemonic, operands: &[&str]) -> Result<(), ParseErrorKind> {
    let expected = mnemonic.operand_form().arity();
    let found = operands.iter().filter(|operand| !operand.is_empty()).count();

    if operands.len() > expected {
        return Err(ParseErrorKind::UnexpectedOperand {
            mnemonic: mnemonic.name(),
            expected,
            found: operands.len(),
        });
    }
    if found < expected {
        return Err(ParseErrorKind::MissingOperand {
            mnemonic: mnemonic.name(),
            expected,
            found,
        });
    }
    Ok(())
}

fn parse_body(mnemonic: Mnemonic, operands: &[&str]) -> Result<ParsedBody, ParseErrorKind> {
    let instruction = match (mnemonic, mnemonic.operand_form(), operands) {
        (Mnemonic::Nop, OperandForm::None, []) => Instruction::Nop,
        (Mnemonic::Halt, OperandForm::None, []) => Instruction::Halt,
        (Mnemonic::Load, OperandForm::RegImm, [rd, value]) => Instruction::Load {
            rd: parse_register(rd)?,
            value: parse_immediate(value)?,
        },
        (Mnemonic::Mov, OperandForm::RegReg, [rd, rs]) => Instruction::Mov {
            rd: parse_register(rd)?,
            rs: parse_register(rs)?,
        },
        (Mnemonic::Alu(op), OperandForm::RegReg, [rd, rs]) => Instruction::Alu {
            op,
            rd: parse_register(rd)?,
            rs: parse_register(rs)?,
        },
        (Mnemonic::Cmp, OperandForm::RegReg, [ra, rb]) => Instruction::Cmp {
            ra: parse_register(ra)?,
            rb: parse_register(rb)?,
        },
        (Mnemonic::Unary(op), OperandForm::Reg, [rd]) => Instruction::Unary {
            op,
            rd: parse_register(rd)?,
        },
        (Mnemonic::LoadMem, OperandForm::RegMem, [rd, addr]) => Instruction::LoadMem {
            rd: parse_register(rd)?,
            addr: parse_memory_operand(addr)?,
        },
        (Mnemonic::StoreMem, OperandForm::RegMem, [rs, addr]) => Instruction::StoreMem {
            rs: parse_register(rs)?,
            addr: parse_memory_operand(addr)?,
        },
        (Mnemonic::Jump(cond), OperandForm::Target, [target]) => {
            return Ok(ParsedBody::Jump {
                cond,
                target: parse_target(target)?,
            });
        }
        _ => {
            let expected = mnemonic.operand_form().arity();
            return Err(ParseErrorKind::MissingOperand {
                mnemonic: mnemonic.name(),
                expected,
                found: operands.len(),
            });
        }
    };

    Ok(ParsedBody::Ready(instruction))
}

fn parse_register(s: &str) -> Result<Register, ParseErrorKind> {
    Register::parse(s).ok_or_else(|| ParseErrorKind::InvalidRegister(s.to_string()))
}

/// Parses an immediate into its 16-bit word.
///
/// Accepts an optional `#`, decimal (optionally negative), `0x` hex and `0b`
/// binary. Negative values are stored as two's complement.
fn parse_immediate(s: &str) -> Result<u16, ParseErrorKind> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    parse_numeric_value(digits)
        .filter(|value| (IMMEDIATE_MIN..=IMMEDIATE_MAX).contains(value))
        .and_then(|value| u16::try_from(value.rem_euclid(0x1_0000)).ok())
        .ok_or_else(|| ParseErrorKind::InvalidImmediate(s.to_string()))
}

fn parse_memory_operand(s: &str) -> Result<Address, ParseErrorKind> {
    let err = || ParseErrorKind::InvalidMemoryOperand(s.to_string());
    let inner = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
        .ok_or_else(err)?;

    if let Some(reg) = Register::parse(inner) {
        return Ok(Address::Indirect(reg));
    }

    parse_numeric_value(inner)
        .and_then(|value| usize::try_from(value).ok())
        .filter(|&addr| addr < DATA_MEMORY_WORDS)
        .and_then(|addr| u8::try_from(addr).ok())
        .map(Address::Absolute)
        .ok_or_else(err)
}

fn parse_target(s: &str) -> Result<JumpTarget, ParseErrorKind> {
    if is_valid_label(s) {
        return Ok(JumpTarget::Label(s.to_string()));
    }

    parse_numeric_value(s)
        .and_then(|value| usize::try_from(value).ok())
        .map(JumpTarget::Index)
        .ok_or_else(|| ParseErrorKind::InvalidTarget(s.to_string()))
}

#[allow(clippy::option_if_let_else)]
fn parse_numeric_value(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, magnitude) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (radix, digits) = [("0x", 16), ("0X", 16), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| magnitude.strip_prefix(prefix).map(|rest| (radix, rest)))
        .unwrap_or((10, magnitude));
    if digits.starts_with(['+', '-']) {
        return None;
    }

    let value = i64::from_str_radix(digits, radix).ok()?;
    if negative {
        value.checked_neg()
    } else {
        Some(value)
    }
}
