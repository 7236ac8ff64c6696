//! Label table and jump target resolution.
//!
//! The first pass walks the parsed lines, assigning each instruction its
//! 0-based command index and recording label definitions. The second pass
//! rewrites symbolic jump targets to indices and range-checks every target.

use std::collections::HashMap;

use ticksim_core::{Command, Instruction};

use crate::parser::{JumpTarget, ParseError, ParseErrorKind, ParsedBody, ParsedInstruction};
use crate::source::SourceLine;

/// A label with its command index and definition line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Index of the command the label names.
    pub index: usize,
    /// Source line number where the label was defined.
    pub defined_at: usize,
}

/// Symbol table mapping label names to their definitions.
pub type SymbolTable = HashMap<String, Symbol>;

/// A parsed instruction with the source line it came from.
pub type ParsedEntry<'a> = (&'a SourceLine, ParsedInstruction);

/// Builds the symbol table from instruction lines in program order.
///
/// # Errors
///
/// Returns a [`ParseErrorKind::DuplicateLabel`] error on the line of the
/// second definition.
pub fn build_symbol_table(entries: &[ParsedEntry<'_>]) -> Result<SymbolTable, ParseError> {
    let mut table = SymbolTable::new();

    for (index, (source, instruction)) in entries.iter().enumerate() {
        let Some(name) = &instruction.label else {
            continue;
        };
        if let Some(existing) = table.get(name) {
            return Err(ParseError::new(
                source.line,
                source.raw.clone(),
                ParseErrorKind::DuplicateLabel {
                    name: name.clone(),
                    first_definition: existing.defined_at,
                },
            ));
        }
        table.insert(
            name.clone(),
            Symbol {
                index,
                defined_at: source.line,
            },
        );
    }

    Ok(table)
}

/// Resolves every jump target and produces the final commands.
///
/// # Errors
///
/// Returns a [`ParseError`] for a reference to an undefined label or a target
/// past the end of the program.
pub fn resolve(
    entries: Vec<ParsedEntry<'_>>,
    symbols: &SymbolTable,
) -> Result<Vec<Command>, ParseError> {
    let len = entries.len();

    entries
        .into_iter()
        .map(|(source, instruction)| {
            let resolved = resolve_body(instruction.body, symbols, len)
                .map_err(|kind| ParseError::new(source.line, source.raw.clone(), kind))?;
            Ok(Command::new(source.line, resolved))
        })
        .collect()
}

fn resolve_body(
    body: ParsedBody,
    symbols: &SymbolTable,
    len: usize,
) -> Result<Instruction, ParseErrorKind> {
    match body {
        ParsedBody::Ready(instruction) => Ok(instruction),
        ParsedBody::Jump { cond, target } => {
            let target = match target {
                JumpTarget::Index(index) => index,
                JumpTarget::Label(name) => {
                    symbols
                        .get(&name)
                        .ok_or_else(|| ParseErrorKind::UndefinedLabel(name.clone()))?
                        .index
                }
            };
            if target > len {
                return Err(ParseErrorKind::TargetOutOfRange { target, len });
            }
            Ok(Instruction::Jump { cond, target })
        }
    }
}
