// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session error taxonomy.

use crate::machine::{ProjectEvent, Region};
use crate::version::VersionId;
use subcue_timeline::TimelineError;
use thiserror::Error;

/// Errors from offset aggregation and correction planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Too few usable offset samples to aggregate.
    #[error("only {usable} of {total} offset samples usable (need at least {required})")]
    InsufficientSamples {
        /// Samples that produced a measurement.
        usable: usize,
        /// Samples attempted.
        total: usize,
        /// Minimum usable samples for aggregation.
        required: usize,
    },

    /// No correction could be produced at all.
    #[error("synchronization produced no usable correction")]
    SyncFailed,
}

/// Errors surfaced by the session controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// An intent that the owning region cannot accept in its current state.
    ///
    /// Raw event dispatch on the state machine is a silent no-op for
    /// undefined triggers; this error exists for the session's intent API,
    /// where the caller asked for something and deserves a reason.
    #[error("{region:?} region cannot accept {trigger:?} in its current state")]
    StateConflict {
        /// Region that rejected the intent.
        region: Region,
        /// The rejected trigger.
        trigger: ProjectEvent,
    },

    /// Opaque failure forwarded from the translation collaborator.
    #[error("translation failed: {0}")]
    Translation(String),

    /// Offset aggregation failure.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A version id that is not in the store.
    #[error("unknown version {0}")]
    UnknownVersion(VersionId),

    /// Entry-level timeline failure.
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    /// No subtitle is loaded yet.
    #[error("no subtitle loaded")]
    NoSubtitle,
}
