//! Host side of the ticksim simulator: program loading, rendering,
//! configuration and the interactive operator session.

/// Startup configuration and text assets.
pub mod config;
/// Top-level error type.
pub mod errors;
/// Program loading pipeline.
pub mod loader;
/// Mnemonic table.
pub mod mnemonic;
/// Program line parser.
pub mod parser;
/// State rendering.
pub mod render;
/// Interactive operator session.
pub mod session;
/// Line and comment extraction.
pub mod source;
/// Label table and jump target resolution.
pub mod symbols;

pub use errors::SimError;
