//! Bounded undo/redo over opaque snapshots.
//!
//! The buffer never looks inside a snapshot beyond comparing it with the
//! present one, so it works for any `Clone + PartialEq` state.

use std::collections::VecDeque;

/// Default number of snapshots kept on each side of the present.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Past, present and future snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    past: VecDeque<T>,
    present: Option<T>,
    future: VecDeque<T>,
    limit: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T> History<T> {
    /// Create an empty buffer keeping at most `limit` snapshots per side.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: None,
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn present(&self) -> Option<&T> {
        self.present.as_ref()
    }

    /// Whether there is something to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether there is something to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of undoable snapshots.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redoable snapshots.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// Drop everything, including the present.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.present = None;
    }

    /// Start over from `state` with nothing to undo or redo.
    pub fn initialize(&mut self, state: T) {
        self.past.clear();
        self.future.clear();
        self.present = Some(state);
    }

    /// Step back. Returns the new present, or `None` if there is no past.
    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        if let Some(present) = self.present.replace(previous) {
            self.future.push_front(present);
            self.future.truncate(self.limit);
        }
        self.present.as_ref()
    }

    /// Step forward. Returns the new present, or `None` if there is no future.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop_front()?;
        if let Some(present) = self.present.replace(next) {
            self.past.push_back(present);
        }
        self.present.as_ref()
    }
}

impl<T: PartialEq> History<T> {
    /// Record a new present.
    ///
    /// A snapshot equal to the present is ignored. Otherwise the old present
    /// moves into the past (dropping the oldest beyond the limit) and the
    /// future is cleared. Returns whether anything was recorded.
    pub fn record(&mut self, state: T) -> bool {
        if self.present.as_ref() == Some(&state) {
            return false;
        }
        if let Some(present) = self.present.replace(state) {
            self.past.push_back(present);
            while self.past.len() > self.limit {
                self.past.pop_front();
            }
        }
        self.future.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_undo_redo() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);
        history.record(3);

        assert_eq!(history.undo(), Some(&2));
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), None);
        assert_eq!(history.present(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.past_len(), 1);
        assert_eq!(history.future_len(), 1);
    }

    #[test]
    fn test_duplicate_is_ignored() {
        let mut history = History::new(10);
        assert!(history.record("a"));
        assert!(!history.record("a"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_record_clears_future() {
        let mut history = History::new(10);
        history.record(1);
        history.record(2);
        history.undo();
        assert!(history.can_redo());

        history.record(5);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
    }

    #[test]
    fn test_past_is_bounded() {
        let mut history = History::new(3);
        for i in 0..10 {
            history.record(i);
        }
        assert_eq!(history.past_len(), 3);
        assert_eq!(history.present(), Some(&9));
        history.undo();
        history.undo();
        assert_eq!(history.undo(), Some(&6));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_future_is_bounded() {
        let mut history = History::new(2);
        for i in 0..3 {
            history.record(i);
        }
        history.undo();
        history.undo();
        assert_eq!(history.future_len(), 2);
    }

    #[test]
    fn test_initialize_and_clear() {
        let mut history = History::default();
        history.record(1);
        history.record(2);
        history.initialize(7);
        assert_eq!(history.present(), Some(&7));
        assert!(!history.can_undo());

        history.clear();
        assert_eq!(history.present(), None);
        assert!(history.record(1));
        assert!(!history.can_undo());
    }
}
