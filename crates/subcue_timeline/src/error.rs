// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline error types.

use thiserror::Error;

/// Errors from timeline entry operations.
///
/// Parsing is deliberately absent here: the SRT parser is lenient and drops
/// malformed blocks instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// An entry index beyond the current timeline length.
    #[error("entry index {index} out of range (timeline has {len} entries)")]
    EntryOutOfRange {
        /// Requested index.
        index: usize,
        /// Current entry count.
        len: usize,
    },
}
