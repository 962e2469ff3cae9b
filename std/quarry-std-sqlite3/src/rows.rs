//!
//! Row Sequences
//!
//! `RowSequence` turns a statement cursor into a lazy, finite stream of
//! records:
//!
//! ```text
//! Unopened --open--> Streaming ------step Done-----> Exhausted
//!              \---> UpdatePending --one record----> Exhausted
//!              \---> Exhausted (query without rows)
//! ```
//!
//! The cursor is stepped one row ahead: while `Streaming`, the current row
//! sits in the statement and is read by the next `next_record`, which then
//! steps again. Closing resets the cursor but never finalizes the
//! statement, so a prepared statement can be executed again afterwards.
//!

use quarry_std_core::{Item, Record};
use tracing::trace;

use crate::engine::{Statement, Step};
use crate::error::Result;

/// Field name of the single record produced by a statement without result columns
pub const AFFECTED_ROWS: &str = "Affected Rows";

/// Statement a sequence runs: borrowed from the statement registry, or
/// compiled for this one execution and finalized with the sequence.
pub(crate) enum StatementSlot<'s> {
    Prepared(&'s mut Statement),
    OneShot(Statement),
}

impl StatementSlot<'_> {
    fn get(&self) -> &Statement {
        match self {
            StatementSlot::Prepared(stmt) => stmt,
            StatementSlot::OneShot(stmt) => stmt,
        }
    }

    fn get_mut(&mut self) -> &mut Statement {
        match self {
            StatementSlot::Prepared(stmt) => stmt,
            StatementSlot::OneShot(stmt) => stmt,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowState {
    Unopened,
    Streaming,
    UpdatePending,
    Exhausted,
}

pub struct RowSequence<'s> {
    slot: StatementSlot<'s>,
    state: RowState,
    columns: Vec<String>,
    changes_before: i64,
}

impl<'s> RowSequence<'s> {
    pub(crate) fn new(slot: StatementSlot<'s>) -> Self {
        Self {
            slot,
            state: RowState::Unopened,
            columns: Vec::new(),
            changes_before: 0,
        }
    }

    pub fn state(&self) -> RowState {
        self.state
    }

    /// Perform the first cursor step. Opening twice is a no-op.
    pub fn open(&mut self) -> Result<()> {
        if self.state != RowState::Unopened {
            return Ok(());
        }
        self.changes_before = self.slot.get().total_changes();
        let step = match self.slot.get_mut().step() {
            Ok(step) => step,
            Err(e) => {
                self.close();
                return Err(e);
            }
        };
        let stmt = self.slot.get();
        trace!(?step, columns = stmt.column_count(), "cursor opened");
        self.state = match step {
            Step::Row => {
                self.columns = stmt.column_names();
                RowState::Streaming
            }
            Step::Done if stmt.column_count() == 0 => RowState::UpdatePending,
            Step::Done => RowState::Exhausted,
        };
        Ok(())
    }

    /// Produce the next record, or `None` once the sequence is exhausted.
    /// Opens the cursor on first use.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        self.open()?;
        match self.state {
            RowState::Unopened | RowState::Exhausted => Ok(None),
            RowState::UpdatePending => {
                let changes = self.update_count();
                self.state = RowState::Exhausted;
                let mut record = Record::new();
                record.insert(AFFECTED_ROWS.to_string(), Item::Integer(changes));
                Ok(Some(record))
            }
            RowState::Streaming => {
                let record = self.read_row();
                match self.slot.get_mut().step() {
                    Ok(Step::Row) => trace!("cursor stepped"),
                    Ok(Step::Done) => {
                        trace!("cursor done");
                        self.state = RowState::Exhausted;
                    }
                    Err(e) => {
                        self.close();
                        return Err(e);
                    }
                }
                Ok(Some(record))
            }
        }
    }

    /// The engine's per-statement count is left untouched by statements
    /// that change nothing (DDL), so it is only trusted when the total moved.
    fn update_count(&self) -> i64 {
        let stmt = self.slot.get();
        if stmt.total_changes() == self.changes_before {
            0
        } else {
            stmt.changes()
        }
    }

    fn read_row(&self) -> Record {
        let stmt = self.slot.get();
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), stmt.column_item(i)))
            .collect()
    }

    /// Number of rows the execution changed.
    ///
    /// Statements without result columns report the engine's change count;
    /// row-returning statements are drained and report the difference in
    /// the connection's total change count.
    pub fn affected_rows(mut self) -> Result<i64> {
        self.open()?;
        if self.state == RowState::UpdatePending {
            return Ok(self.update_count());
        }
        while self.next_record()?.is_some() {}
        Ok(self.slot.get().total_changes() - self.changes_before)
    }

    /// Reset the cursor and end the sequence. Idempotent.
    pub fn close(&mut self) {
        self.slot.get_mut().reset();
        self.state = RowState::Exhausted;
    }
}

impl Iterator for RowSequence<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

impl Drop for RowSequence<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
