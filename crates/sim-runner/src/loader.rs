//! Program loading pipeline.
//!
//! Source extraction, per-line parsing, the label pass and target resolution
//! run in order; the first malformed line fails the whole load.

use log::debug;
use ticksim_core::Command;

use crate::parser::{parse_line, ParseError, ParsedLine};
use crate::source::{extract_source, Comments};
use crate::symbols::{build_symbol_table, resolve, ParsedEntry};

/// A successfully loaded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedProgram {
    /// Commands in program order.
    pub commands: Vec<Command>,
    /// Comment text keyed by source line, comment-only lines included.
    pub comments: Comments,
}

/// Loads program text into commands and the line comment map.
///
/// Each non-empty, non-comment-only line becomes exactly one command carrying
/// its 1-based line number.
///
/// # Errors
///
/// Returns the [`ParseError`] of the first malformed line.
pub fn load_program(text: &str) -> Result<LoadedProgram, ParseError> {
    let content = extract_source(text);

    let mut entries: Vec<ParsedEntry<'_>> = Vec::new();
    for line in &content.lines {
        match parse_line(line)? {
            ParsedLine::Blank => {}
            ParsedLine::Instruction(instruction) => entries.push((line, instruction)),
        }
    }

    let symbols = build_symbol_table(&entries)?;
    let commands = resolve(entries, &symbols)?;
    let comments = content.comments();

    debug!(
        "loaded {} commands, {} labels, {} comments",
        commands.len(),
        symbols.len(),
        comments.len()
    );

    Ok(LoadedProgram { commands, comments })
}
