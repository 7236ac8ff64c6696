//! Interactive operator session.
//!
//! The session owns the processor, the snapshot history and the persistent
//! sink. It reads one control command per input line, echoes an
//! acknowledgement and renders on request. Every way out of the loop writes
//! the whole history to the sink and flushes it first, including execution
//! faults and failed terminal i/o.

use std::io::{self, BufRead, Write};
use std::iter;
use std::str::FromStr;

use log::{info, warn};
use thiserror::Error;
use ticksim_core::{ExecFault, History, HistoryError, Processor};

use crate::render::StateWriter;

/// Prompt printed before every input line.
pub const PROMPT: &str = "command: ";

/// Prefix of every acknowledgement line.
pub const ACK: &str = "<---";

/// Operator control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCommand {
    /// `help` / `h`.
    Help,
    /// `state` / `s`.
    State,
    /// `stateHistory` / `sh`.
    StateHistory,
    /// `clk` / `c`.
    Clk,
    /// `clk <n>` / `c <n>`; counts above `u32::MAX` are not commands.
    ClkTimes(u32),
    /// `exit` / `e`.
    Exit,
}

/// Input that is not a control command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no such command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for ControlCommand {
    type Err = UnknownCommand;

    /// Parses one input line. Matching is case-sensitive and exact apart
    /// from trailing whitespace.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end();
        match line {
            "help" | "h" => return Ok(Self::Help),
            "state" | "s" => return Ok(Self::State),
            "stateHistory" | "sh" => return Ok(Self::StateHistory),
            "clk" | "c" => return Ok(Self::Clk),
            "exit" | "e" => return Ok(Self::Exit),
            _ => {}
        }

        line.split_once(' ')
            .filter(|(name, _)| matches!(*name, "clk" | "c"))
            .map(|(_, count)| count)
            .filter(|count| !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|count| count.parse().ok())
            .map(Self::ClkTimes)
            .ok_or_else(|| UnknownCommand(line.to_string()))
    }
}

/// Whether the session keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next command.
    Continue,
    /// Leave the loop.
    Exit,
}

/// Fatal session error.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A tick faulted; the history up to the fault was written to the sink.
    #[error(transparent)]
    Fault(#[from] ExecFault),
    /// A snapshot was recorded out of order.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// Reading input or writing output failed.
    #[error("session i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Operator session over a persistent sink `W`.
#[derive(Debug)]
pub struct Session<W: Write> {
    processor: Processor,
    history: History,
    writer: StateWriter,
    help: String,
    welcome: String,
    sink: W,
}

impl<W: Write> Session<W> {
    /// Creates a session and captures the initial snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::History`] when `processor` has already ticked.
    pub fn new(
        processor: Processor,
        writer: StateWriter,
        help: String,
        welcome: String,
        sink: W,
    ) -> Result<Self, SessionError> {
        let history = History::start(&processor)?;
        Ok(Self {
            processor,
            history,
            writer,
            help,
            welcome,
            sink,
        })
    }

    /// Snapshots recorded so far.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// The simulated processor.
    #[must_use]
    pub const fn processor(&self) -> &Processor {
        &self.processor
    }

    /// Runs the prompt loop until `exit` or end of input and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fault`] when a tick faults and
    /// [`SessionError::Io`] when input or output fails. The history is
    /// written to the sink before either is returned.
    pub fn run<R, E>(mut self, input: R, echo: &mut E) -> Result<W, SessionError>
    where
        R: BufRead,
        E: Write + ?Sized,
    {
        if let Err(error) = self.prompt_loop(input, echo) {
            if let Err(flush) = self.finish() {
                warn!("cannot write the history after `{error}`: {flush}");
            }
            return Err(error);
        }

        self.finish()?;
        Ok(self.sink)
    }

    fn prompt_loop<R, E>(&mut self, input: R, echo: &mut E) -> Result<(), SessionError>
    where
        R: BufRead,
        E: Write + ?Sized,
    {
        writeln!(echo, "{}", self.welcome)?;
        writeln!(echo, "{}", self.help)?;

        let mut lines = input.lines();
        loop {
            write!(echo, "{PROMPT}")?;
            echo.flush()?;

            let Some(line) = lines.next().transpose()? else {
                info!("end of input, leaving the session");
                writeln!(echo)?;
                self.execute(ControlCommand::Exit, echo)?;
                return Ok(());
            };

            if self.dispatch(&line, echo)? == Flow::Exit {
                return Ok(());
            }
            echo.flush()?;
        }
    }

    /// Handles one raw input line.
    ///
    /// # Errors
    ///
    /// See [`Session::execute`].
    pub fn dispatch<E: Write + ?Sized>(
        &mut self,
        line: &str,
        echo: &mut E,
    ) -> Result<Flow, SessionError> {
        match line.parse::<ControlCommand>() {
            Ok(command) => self.execute(command, echo),
            Err(unknown) => {
                warn!("{unknown}");
                writeln!(echo, "{ACK} {unknown}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Executes one control command, echoing to `echo`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Fault`] when a tick faults; ticks before the
    /// faulting one stay recorded.
    pub fn execute<E: Write + ?Sized>(
        &mut self,
        command: ControlCommand,
        echo: &mut E,
    ) -> Result<Flow, SessionError> {
        match command {
            ControlCommand::Help => {
                writeln!(echo, "{ACK} help")?;
                writeln!(echo, "{}", self.help)?;
            }
            ControlCommand::State => {
                writeln!(echo, "{ACK} state")?;
                let clk = self.history.len() - 1;
                let state = self.history.latest();
                let reference = self
                    .history
                    .reference_flags(clk)
                    .unwrap_or_else(|| state.flags());
                self.writer
                    .write_batch(echo, iter::once((state, reference)))?;
            }
            ControlCommand::StateHistory => {
                writeln!(echo, "{ACK} stateHistory")?;
                self.writer.write_batch(echo, self.history.entries())?;
            }
            ControlCommand::Clk => {
                writeln!(echo, "{ACK} clk")?;
                self.tick()?;
            }
            ControlCommand::ClkTimes(times) => {
                writeln!(echo, "{ACK} clk {times} times")?;
                for _ in 0..times {
                    self.tick()?;
                }
            }
            ControlCommand::Exit => {
                writeln!(echo, "{ACK} exit")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    fn tick(&mut self) -> Result<(), SessionError> {
        self.processor.clk()?;
        self.history.record(&self.processor)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SessionError> {
        self.writer
            .write_batch(&mut self.sink, self.history.entries())?;
        self.sink.flush()?;
        info!(
            "wrote {} states to the persistent output",
            self.history.len()
        );
        Ok(())
    }
}
