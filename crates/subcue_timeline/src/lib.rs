// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subtitle timeline for Subcue.
//!
//! This crate owns the timed-text model and everything that operates on it
//! without touching the outside world:
//! - Entries with per-entry undo/redo history
//! - Lenient SRT parsing and renumbering serialization
//! - Bulk time-shift and framerate rescaling
//! - Linguistically-aware text reflow
//! - Quality validation against professional subtitling standards
//!
//! ## Architecture
//!
//! Everything here is pure data and deterministic functions; no I/O, no
//! clocks, no globals. The session layer (`subcue_session`) composes these
//! pieces into a project lifecycle.

pub mod entry;
pub mod error;
pub mod reflow;
pub mod srt;
pub mod timeline;
pub mod validate;

pub use entry::{Entry, DEFAULT_MAX_UNDO_DEPTH};
pub use error::TimelineError;
pub use reflow::{ReflowConfig, ReflowEngine};
pub use timeline::Timeline;
pub use validate::{
    validate, Problem, ProblemKind, Severity, ValidationLimits, ValidationReport, ValidationStats,
};
