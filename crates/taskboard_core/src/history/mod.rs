//! Linear undo/redo history of board snapshots.
//!
//! # Responsibility
//! - Record one snapshot per successful mutation.
//! - Step a cursor backwards/forwards and hand snapshots back to the caller.
//!
//! # Invariants
//! - `cursor < entries.len()` whenever `entries` is non-empty.
//! - A new checkpoint discards every entry after the cursor (no branches).
//! - Entries are owned copies; later edits to the live board never reach them.

use crate::model::board::BoardState;
use log::debug;

/// One immutable recorded board state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    snapshot: BoardState,
}

impl HistoryEntry {
    pub fn snapshot(&self) -> &BoardState {
        &self.snapshot
    }
}

/// Undo/redo log with a "currently displayed" cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates the redo branch and appends a copy of `state`.
    pub fn checkpoint(&mut self, state: &BoardState) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(HistoryEntry {
            snapshot: state.clone(),
        });
        self.cursor = self.entries.len() - 1;
        debug!(
            "event=history_checkpoint module=history status=ok entries={} cursor={}",
            self.entries.len(),
            self.cursor
        );
    }

    /// Drops all entries and records `state` as the only baseline.
    pub fn reset(&mut self, state: &BoardState) {
        self.entries.clear();
        self.cursor = 0;
        self.checkpoint(state);
    }

    /// Steps back one entry. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<BoardState> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        debug!(
            "event=history_undo module=history status=ok cursor={}",
            self.cursor
        );
        Some(self.entries[self.cursor].snapshot.clone())
    }

    /// Steps forward one entry. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<BoardState> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        debug!(
            "event=history_redo module=history status=ok cursor={}",
            self.cursor
        );
        Some(self.entries[self.cursor].snapshot.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the displayed entry, or `None` before the baseline exists.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryStore;
    use crate::model::board::BoardState;

    #[test]
    fn empty_store_cannot_step() {
        let mut history = HistoryStore::new();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn reset_leaves_single_baseline() {
        let board = BoardState::with_default_columns();
        let mut history = HistoryStore::new();
        history.checkpoint(&board);
        history.checkpoint(&board);
        history.reset(&board);
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), Some(0));
        assert!(!history.can_undo());
    }
}
