//! # Undo / Redo History
//!
//! Whole-value snapshots of the draft, bounded in depth.
//!
//! ```text
//!   undo stack (oldest dropped first)        redo stack
//!   [ s0 | s1 | s2 ] ◄── undo ── current ── redo ──► [ s4 ]
//! ```
//!
//! Recording a new snapshot clears the redo stack.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    undo: VecDeque<T>,
    redo: Vec<T>,
    limit: usize,
}

impl<T> History<T> {
    /// A history keeping at most `limit` undo steps. Zero disables undo.
    pub fn new(limit: usize) -> Self {
        History {
            undo: VecDeque::with_capacity(limit.min(64)),
            redo: Vec::new(),
            limit,
        }
    }

    /// Stores the state as it was before a successful mutation.
    pub fn record(&mut self, previous: T) {
        self.redo.clear();
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(previous);
    }

    /// Swaps `current` for the last recorded state.
    pub fn undo(&mut self, current: T) -> Result<T, T> {
        match self.undo.pop_back() {
            Some(previous) => {
                self.redo.push(current);
                Ok(previous)
            }
            None => Err(current),
        }
    }

    /// Swaps `current` for the last undone state.
    pub fn redo(&mut self, current: T) -> Result<T, T> {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push_back(current);
                if self.undo.len() > self.limit {
                    self.undo.pop_front();
                }
                Ok(next)
            }
            None => Err(current),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
