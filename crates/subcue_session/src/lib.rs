// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcue project session engine.
//!
//! A session loads a video and a timed-text track, then edits, re-times,
//! translates and re-synchronizes that track. This crate provides:
//! - A parallel state machine over four lifecycles (video, subtitle,
//!   translation, sync)
//! - A version store of named timeline snapshots keyed by origin
//! - A sync orchestrator turning measured offsets into a correction policy
//! - A session controller owning all of it, with no global state
//! - Boundary traits for the external collaborators
//!
//! ## Architecture
//!
//! The engine is single-threaded and event-driven: hosts perform all I/O,
//! feed outcomes in as events, and read derived flags back out. Busy states
//! structurally reject duplicate triggers, so no locking is needed; a
//! version identity is last-writer-wins across completion order.

pub mod collab;
pub mod config;
pub mod error;
pub mod machine;
pub mod release;
pub mod session;
pub mod sync;
pub mod version;

pub use collab::{
    AlignmentService, CatalogCandidate, CollabError, SubtitleCatalog, Transcoder,
    TranslationService,
};
pub use config::{SessionConfig, CONFIG_FORMAT_VERSION};
pub use error::{SessionError, SyncError};
pub use machine::{
    AppState, Dispatch, Effect, ProjectContext, ProjectEvent, ProjectStateMachine, Region,
    Regions, SubtitleState, SyncState, TranslationState, UiFlags, VideoState,
};
pub use release::{clean_title, ReleaseInfo};
pub use session::{MediaInfo, SessionController, SyncRequest, TranslationRequest};
pub use sync::{
    Correction, OffsetSample, SyncConfig, SyncOrchestrator, SyncQuality, SyncReport,
};
pub use version::{Version, VersionId, VersionLabel, VersionMeta, VersionStore};
