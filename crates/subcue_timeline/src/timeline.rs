// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered sequence of subtitle entries with bulk timing operations.

use crate::entry::{Entry, DEFAULT_MAX_UNDO_DEPTH};
use crate::error::TimelineError;
use crate::srt;
use serde::{Deserialize, Serialize};

/// An ordered subtitle track.
///
/// Entries are kept ordered by start time. Serialized indices are always
/// regenerated contiguously from 1, independent of anything the source text
/// carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<Entry>,
    /// Bound on each entry's edit history.
    #[serde(default = "default_undo_depth")]
    max_undo_depth: usize,
}

fn default_undo_depth() -> usize {
    DEFAULT_MAX_UNDO_DEPTH
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
        }
    }

    /// Parse SRT text into a timeline. Malformed blocks are dropped by the
    /// lenient parser; the result is ordered by start time.
    pub fn from_srt(text: &str) -> Self {
        let mut timeline = Self::new();
        timeline.replace_entries(srt::parse(text));
        timeline
    }

    /// Render the timeline as SRT text, renumbered 1..N.
    pub fn to_srt(&self) -> String {
        srt::serialize(&self.entries)
    }

    /// Replace all entries wholesale, re-establishing start-time order.
    pub fn replace_entries(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.sort_entries();
    }

    /// Set the per-entry undo bound applied by [`Timeline::edit`].
    pub fn set_max_undo_depth(&mut self, depth: usize) {
        self.max_undo_depth = depth.max(1);
    }

    /// All entries, in start order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entry count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the timeline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an entry by position.
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Replace the text of one entry, recording the edit in its history.
    pub fn edit(&mut self, index: usize, new_text: impl Into<String>) -> Result<(), TimelineError> {
        let depth = self.max_undo_depth;
        let entry = self.entry_mut(index)?;
        entry.apply_edit(new_text, depth);
        Ok(())
    }

    /// Undo the last edit of one entry. Returns whether anything changed.
    pub fn undo(&mut self, index: usize) -> Result<bool, TimelineError> {
        Ok(self.entry_mut(index)?.undo())
    }

    /// Redo the last undone edit of one entry. Returns whether anything changed.
    pub fn redo(&mut self, index: usize) -> Result<bool, TimelineError> {
        Ok(self.entry_mut(index)?.redo())
    }

    /// Shift every entry by `offset_seconds`, clamping results at zero.
    ///
    /// Timing-only: text and edit histories are untouched. Shifting is a
    /// distinct operation class from text edits and is not undoable through
    /// the per-entry history.
    pub fn shift_all(&mut self, offset_seconds: f64) {
        for entry in &mut self.entries {
            entry.start = (entry.start + offset_seconds).max(0.0);
            entry.end = (entry.end + offset_seconds).max(0.0);
        }
        self.sort_entries();
    }

    /// Rescale every timestamp by `old_fps / new_fps`.
    ///
    /// Used when a track was authored against a different framerate than the
    /// media it is played with; timing-only, like [`Timeline::shift_all`].
    pub fn rescale(&mut self, old_fps: f64, new_fps: f64) {
        if new_fps <= 0.0 || old_fps <= 0.0 {
            return;
        }
        let factor = old_fps / new_fps;
        for entry in &mut self.entries {
            entry.start *= factor;
            entry.end *= factor;
        }
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut Entry, TimelineError> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(TimelineError::EntryOutOfRange { index, len })
    }

    fn sort_entries(&mut self) {
        self.entries
            .sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}
