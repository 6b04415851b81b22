// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subtitle entry with per-entry edit history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default bound on per-entry edit history depth.
pub const DEFAULT_MAX_UNDO_DEPTH: usize = 100;

/// One timed text block of a subtitle track.
///
/// The text carries its own undo/redo history: `history` holds every past
/// state with the current text on top, `future` holds states undone from it.
/// `history` is never empty and its top always equals the current text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Display start, in seconds.
    pub start: f64,
    /// Display end, in seconds.
    pub end: f64,
    /// Current text.
    text: String,
    /// Past states, oldest first; the top (back) is the current text.
    history: VecDeque<String>,
    /// States undone from `history`, most recently undone last.
    future: Vec<String>,
}

impl Entry {
    /// Create an entry with a single-state history.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut history = VecDeque::new();
        history.push_back(text.clone());
        Self {
            start,
            end,
            text,
            history,
            future: Vec::new(),
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Display duration, in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Replace the text, pushing the new state onto the history and
    /// discarding any redo states.
    ///
    /// The history is bounded by `max_depth`: once full, the oldest state is
    /// discarded first. `max_depth` is clamped to at least 1 so the history
    /// can never run empty.
    pub fn apply_edit(&mut self, new_text: impl Into<String>, max_depth: usize) {
        let new_text = new_text.into();
        self.history.push_back(new_text.clone());
        while self.history.len() > max_depth.max(1) {
            self.history.pop_front();
        }
        self.future.clear();
        self.text = new_text;
    }

    /// Step back one edit. No-op (returns false) when only the oldest
    /// state remains.
    pub fn undo(&mut self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        if let Some(undone) = self.history.pop_back() {
            self.future.push(undone);
        }
        if let Some(top) = self.history.back() {
            self.text = top.clone();
        }
        true
    }

    /// Step forward one undone edit. No-op (returns false) when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(redone) = self.future.pop() else {
            return false;
        };
        self.history.push_back(redone.clone());
        self.text = redone;
        true
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.history.len() > 1
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of states currently held, including the current one.
    pub fn history_depth(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_history() {
        let entry = Entry::new(1.0, 3.0, "Hello");
        assert_eq!(entry.text(), "Hello");
        assert_eq!(entry.history_depth(), 1);
        assert!(!entry.can_undo());
        assert!(!entry.can_redo());
    }

    #[test]
    fn test_edit_undo_redo() {
        let mut entry = Entry::new(0.0, 2.0, "one");
        entry.apply_edit("two", DEFAULT_MAX_UNDO_DEPTH);
        entry.apply_edit("three", DEFAULT_MAX_UNDO_DEPTH);
        assert_eq!(entry.text(), "three");

        assert!(entry.undo());
        assert_eq!(entry.text(), "two");
        assert!(entry.undo());
        assert_eq!(entry.text(), "one");

        // Bottom of the stack: further undo is a no-op
        assert!(!entry.undo());
        assert_eq!(entry.text(), "one");

        assert!(entry.redo());
        assert_eq!(entry.text(), "two");
        assert!(entry.redo());
        assert_eq!(entry.text(), "three");
        assert!(!entry.redo());
    }

    #[test]
    fn test_edit_clears_redo() {
        let mut entry = Entry::new(0.0, 2.0, "one");
        entry.apply_edit("two", DEFAULT_MAX_UNDO_DEPTH);
        entry.undo();
        assert!(entry.can_redo());

        entry.apply_edit("fork", DEFAULT_MAX_UNDO_DEPTH);
        assert!(!entry.can_redo());
        assert_eq!(entry.text(), "fork");
        assert!(entry.undo());
        assert_eq!(entry.text(), "one");
    }

    #[test]
    fn test_history_bound() {
        let mut entry = Entry::new(0.0, 2.0, "v0");
        for i in 1..10 {
            entry.apply_edit(format!("v{i}"), 4);
        }
        assert_eq!(entry.history_depth(), 4);
        assert_eq!(entry.text(), "v9");

        // Only the three retained predecessors can be recovered
        assert!(entry.undo());
        assert!(entry.undo());
        assert!(entry.undo());
        assert_eq!(entry.text(), "v6");
        assert!(!entry.undo());
    }

    #[test]
    fn test_zero_depth_clamped() {
        let mut entry = Entry::new(0.0, 2.0, "a");
        entry.apply_edit("b", 0);
        assert_eq!(entry.history_depth(), 1);
        assert_eq!(entry.text(), "b");
        assert!(!entry.undo());
    }
}
