//! Append-only history of processor snapshots.

use thiserror::Error;

use crate::flags::Flags;
use crate::processor::Processor;
use crate::snapshot::ProcState;

/// Rejected history append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("snapshot for clk {found} cannot be stored at history index {expected}")]
pub struct HistoryError {
    /// Clock count the next entry must carry.
    pub expected: u64,
    /// Clock count of the rejected snapshot.
    pub found: u64,
}

/// Ordered snapshots where entry `i` is the state after tick `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    states: Vec<ProcState>,
}

impl History {
    /// Starts a history with the processor's current state, which must not
    /// have ticked yet.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] when the processor has already ticked.
    pub fn start(processor: &Processor) -> Result<Self, HistoryError> {
        let initial = ProcState::of(processor);
        if initial.clk() != 0 {
            return Err(HistoryError {
                expected: 0,
                found: initial.clk(),
            });
        }
        Ok(Self {
            states: vec![initial],
        })
    }

    /// Appends a snapshot of `processor` taken right after a tick.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] unless the snapshot's clock count equals the
    /// current history length.
    pub fn record(&mut self, processor: &Processor) -> Result<&ProcState, HistoryError> {
        self.push(ProcState::of(processor))
    }

    /// Appends an already captured snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] unless `state.clk()` equals the current
    /// history length.
    pub fn push(&mut self, state: ProcState) -> Result<&ProcState, HistoryError> {
        let expected = self.states.len() as u64;
        if state.clk() != expected {
            return Err(HistoryError {
                expected,
                found: state.clk(),
            });
        }
        self.states.push(state);
        Ok(&self.states[self.states.len() - 1])
    }

    /// Number of stored snapshots (ticks taken plus one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`: a history holds at least the initial snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Snapshot after tick `clk`.
    #[must_use]
    pub fn get(&self, clk: usize) -> Option<&ProcState> {
        self.states.get(clk)
    }

    /// Most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> &ProcState {
        &self.states[self.states.len() - 1]
    }

    /// Flags to diff entry `clk` against: the previous entry's flags, or the
    /// entry's own flags for the initial snapshot.
    #[must_use]
    pub fn reference_flags(&self, clk: usize) -> Option<Flags> {
        let state = self.states.get(clk)?;
        let reference = clk
            .checked_sub(1)
            .and_then(|prev| self.states.get(prev))
            .unwrap_or(state);
        Some(reference.flags())
    }

    /// Every snapshot in tick order, paired with its reference flags.
    pub fn entries(&self) -> impl Iterator<Item = (&ProcState, Flags)> {
        self.states.iter().enumerate().map(move |(index, state)| {
            let reference = index
                .checked_sub(1)
                .map_or(state.flags(), |prev| self.states[prev].flags());
            (state, reference)
        })
    }

    /// All snapshots in tick order.
    #[must_use]
    pub fn as_slice(&self) -> &[ProcState] {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::{History, HistoryError};
    use crate::command::{Command, Instruction, UnaryOp};
    use crate::flags::Flag;
    use crate::processor::Processor;
    use crate::snapshot::ProcState;
    use crate::state::Register;

    fn dec_program() -> Processor {
        Processor::with_program(vec![
            Command::new(
                1,
                Instruction::Unary {
                    op: UnaryOp::Dec,
                    rd: Register::R0,
                },
            ),
            Command::new(
                2,
                Instruction::Unary {
                    op: UnaryOp::Inc,
                    rd: Register::R0,
                },
            ),
        ])
        .expect("valid program")
    }

    #[test]
    fn entries_reference_the_previous_tick() {
        let mut processor = dec_program();
        let mut history = History::start(&processor).expect("fresh processor");
        for _ in 0..2 {
            processor.clk().expect("no fault");
            history.record(&processor).expect("in order");
        }

        let entries: Vec<_> = history.entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].1, entries[0].0.flags());
        assert_eq!(entries[1].1, history.as_slice()[0].flags());
        assert_eq!(entries[2].1, history.as_slice()[1].flags());
        assert!(entries[2].0.flags().is_set(Flag::Zero));
        assert_eq!(history.reference_flags(2), Some(entries[1].0.flags()));
        assert_eq!(history.reference_flags(3), None);
    }

    #[test]
    fn out_of_order_snapshots_are_rejected() {
        let mut processor = dec_program();
        let mut history = History::start(&processor).expect("fresh processor");
        let initial = ProcState::of(&processor);

        assert_eq!(
            history.push(initial),
            Err(HistoryError {
                expected: 1,
                found: 0,
            })
        );

        processor.clk().expect("no fault");
        processor.clk().expect("no fault");
        assert_eq!(
            history.record(&processor).map(ProcState::clk),
            Err(HistoryError {
                expected: 1,
                found: 2,
            })
        );
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
    }

    #[test]
    fn history_cannot_start_after_ticks() {
        let mut processor = dec_program();
        processor.clk().expect("no fault");
        assert_eq!(
            History::start(&processor),
            Err(HistoryError {
                expected: 0,
                found: 1,
            })
        );
    }
}
