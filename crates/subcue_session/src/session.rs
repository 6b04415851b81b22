// SPDX-License-Identifier: MIT OR Apache-2.0
//! The session controller.
//!
//! One [`SessionController`] owns everything a project session holds: the
//! state machine, the live timeline, the version store and the tuning
//! config. There is no ambient global state; hosts construct a controller,
//! feed it events and collaborator outcomes, and read derived flags back.
//!
//! All mutation happens inside these handlers on one thread. Collaborator
//! results are recorded in the order they complete, not the order they were
//! requested: for a given version identity the last writer wins, so a slow
//! early request can be superseded by a fast later one.

use crate::config::SessionConfig;
use crate::error::{SessionError, SyncError};
use crate::machine::{
    Dispatch, Effect, ProjectEvent, ProjectStateMachine, Region, Regions, SubtitleState,
    SyncState, TranslationState, UiFlags,
};
use crate::release::{clean_title, ReleaseInfo};
use crate::sync::{Correction, OffsetSample, SyncOrchestrator, SyncReport};
use crate::version::{VersionId, VersionLabel, VersionMeta, VersionStore};
use subcue_timeline::{validate, ReflowEngine, Timeline, ValidationLimits, ValidationReport};

/// What the session knows about the loaded media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    /// Original filename.
    pub filename: String,
    /// Cleaned title for catalog queries.
    pub title: String,
    /// Release details detected from the filename.
    pub release: ReleaseInfo,
}

/// Everything a host needs to run a translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Serialized live timeline.
    pub subtitle_text: String,
    /// Source language.
    pub source_lang: String,
    /// Target language.
    pub target_lang: String,
}

/// Everything a host needs to run an alignment measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRequest {
    /// Serialized working copy, after any framerate rescale.
    pub subtitle_text: String,
    /// Seconds into the media at which to sample.
    pub sample_points: Vec<f64>,
    /// `(subtitle_fps, media_fps)` when the pre-pass rescaled the copy.
    pub rescaled: Option<(f64, f64)>,
}

/// A correction waiting for the user's confirm/cancel.
#[derive(Debug, Clone)]
struct PendingCorrection {
    timeline: Timeline,
    report: Option<SyncReport>,
}

/// Owner of one project session.
#[derive(Debug)]
pub struct SessionController {
    config: SessionConfig,
    machine: ProjectStateMachine,
    timeline: Timeline,
    versions: VersionStore,
    reflow: ReflowEngine,
    sync: SyncOrchestrator,
    media: Option<MediaInfo>,
    /// Working copy measurements were taken against (post-prepass).
    sync_base: Option<Timeline>,
    pending: Option<PendingCorrection>,
    last_report: Option<SyncReport>,
    last_translation_error: Option<String>,
}

impl SessionController {
    /// Create a controller with the given configuration.
    pub fn new(config: SessionConfig) -> Self {
        let reflow = ReflowEngine::new(config.reflow.clone());
        let sync = SyncOrchestrator::new(config.sync.clone());
        Self {
            config,
            machine: ProjectStateMachine::new(),
            timeline: Timeline::new(),
            versions: VersionStore::new(),
            reflow,
            sync,
            media: None,
            sync_base: None,
            pending: None,
            last_report: None,
            last_translation_error: None,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Derived flags as of the last transition.
    pub fn flags(&self) -> UiFlags {
        self.machine.flags()
    }

    /// Region states, when a session is active.
    pub fn regions(&self) -> Option<Regions> {
        self.machine.regions()
    }

    /// The live timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The version store.
    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    /// What is known about the loaded media.
    pub fn media(&self) -> Option<&MediaInfo> {
        self.media.as_ref()
    }

    /// The most recent aggregated sync report.
    pub fn last_sync_report(&self) -> Option<SyncReport> {
        self.last_report
    }

    /// The most recent translation failure message.
    pub fn last_translation_error(&self) -> Option<&str> {
        self.last_translation_error.as_deref()
    }

    /// Feed a raw event through the state machine.
    ///
    /// Undefined triggers are silent no-ops, mirroring the machine itself.
    /// The intent methods below are the checked alternative.
    pub fn dispatch_event(&mut self, event: ProjectEvent) -> Dispatch {
        self.machine.dispatch(event)
    }

    /// Start a session for newly loaded media, wiping session state.
    ///
    /// A no-op when a session is already active; only loading media from
    /// idle resets context, timeline and versions.
    pub fn start_session(&mut self, filename: &str) -> bool {
        let dispatch = self.machine.dispatch(ProjectEvent::UploadMkv);
        if dispatch.effects.contains(&Effect::ResetSession) {
            self.timeline = Timeline::new();
            self.versions.clear();
            self.sync_base = None;
            self.pending = None;
            self.last_report = None;
            self.last_translation_error = None;
            self.media = Some(MediaInfo {
                filename: filename.to_string(),
                title: clean_title(filename),
                release: ReleaseInfo::from_filename(filename),
            });
            tracing::info!(filename, "session reset for new media");
        }
        dispatch.changed
    }

    /// Record that the video finished loading.
    pub fn video_ready(&mut self) {
        self.machine.dispatch(ProjectEvent::VideoReady);
    }

    /// Record that the video failed to load.
    pub fn video_error(&mut self) {
        self.machine.dispatch(ProjectEvent::VideoError);
    }

    /// The query a host should send to the subtitle catalog.
    pub fn catalog_query(&self) -> Option<&str> {
        self.media.as_ref().map(|m| m.title.as_str())
    }

    /// Install a subtitle track delivered by upload, extraction or catalog
    /// download, and store it as a version under `label`.
    pub fn subtitle_loaded(
        &mut self,
        text: &str,
        label: VersionLabel,
        meta: &VersionMeta,
    ) -> Result<VersionId, SessionError> {
        let trigger = match label {
            VersionLabel::Extracted => ProjectEvent::ExtractFromMkv,
            VersionLabel::Original => ProjectEvent::UploadSubtitle,
            _ => ProjectEvent::SubtitleAvailable,
        };
        if self.regions().map(|r| r.subtitle) != Some(SubtitleState::Missing) {
            return Err(SessionError::StateConflict {
                region: Region::Subtitle,
                trigger,
            });
        }

        let mut timeline = Timeline::from_srt(text);
        timeline.set_max_undo_depth(self.config.max_undo_depth);
        let id = self.versions.add_or_update(label, timeline.entries(), meta);
        self.timeline = timeline;
        self.machine.dispatch(trigger);
        tracing::info!(entries = self.timeline.len(), "subtitle track installed");
        Ok(id)
    }

    /// Begin a translation run. Returns what the host must hand the
    /// translation collaborator.
    pub fn request_translation(
        &mut self,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<TranslationRequest, SessionError> {
        if self.timeline.is_empty() {
            return Err(SessionError::NoSubtitle);
        }
        let dispatch = self.machine.dispatch(ProjectEvent::Translate);
        if !dispatch.effects.contains(&Effect::DispatchTranslation) {
            return Err(SessionError::StateConflict {
                region: Region::Translation,
                trigger: ProjectEvent::Translate,
            });
        }
        Ok(TranslationRequest {
            subtitle_text: self.timeline.to_srt(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        })
    }

    /// Record a delivered translation as the translated version.
    ///
    /// Recording order is completion order; for the same
    /// `(label, source, language)` identity the last delivery wins.
    pub fn translation_completed(
        &mut self,
        translated_text: &str,
        meta: &VersionMeta,
    ) -> Result<VersionId, SessionError> {
        if self.regions().map(|r| r.translation) != Some(TranslationState::Running) {
            return Err(SessionError::StateConflict {
                region: Region::Translation,
                trigger: ProjectEvent::TranslationDone,
            });
        }

        // Block-count equality is the collaborator adapter's contract; what
        // is checked here is only that the delivery parses at all
        let translated = Timeline::from_srt(translated_text);
        if translated.is_empty() {
            self.machine.dispatch(ProjectEvent::TranslationError);
            let message = "result contained no parseable entries".to_string();
            self.last_translation_error = Some(message.clone());
            return Err(SessionError::Translation(message));
        }

        self.machine.dispatch(ProjectEvent::TranslationDone);
        Ok(self
            .versions
            .add_or_update(VersionLabel::Translated, translated.entries(), meta))
    }

    /// Record a failed translation. Timeline and versions stay untouched.
    pub fn translation_failed(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        let dispatch = self.machine.dispatch(ProjectEvent::TranslationError);
        if !dispatch.changed {
            return Err(SessionError::StateConflict {
                region: Region::Translation,
                trigger: ProjectEvent::TranslationError,
            });
        }
        let message = message.into();
        tracing::warn!(%message, "translation failed");
        self.last_translation_error = Some(message);
        Ok(())
    }

    /// Dismiss the translation outcome.
    pub fn ack_translation(&mut self) {
        self.machine.dispatch(ProjectEvent::AckTranslation);
    }

    /// Begin an automatic sync run.
    ///
    /// Runs the framerate pre-pass on a working copy (the live timeline is
    /// never mutated here) and returns what the host must hand the
    /// alignment collaborator.
    pub fn request_sync(
        &mut self,
        media_duration: f64,
        media_fps: Option<f64>,
    ) -> Result<SyncRequest, SessionError> {
        if self.timeline.is_empty() {
            return Err(SessionError::NoSubtitle);
        }
        let dispatch = self.machine.dispatch(ProjectEvent::Sync);
        if !dispatch.effects.contains(&Effect::DispatchAlignment) {
            return Err(SessionError::StateConflict {
                region: Region::Sync,
                trigger: ProjectEvent::Sync,
            });
        }

        let mut working = self.timeline.clone();
        let rescaled = media_fps.and_then(|fps| self.sync.framerate_prepass(&mut working, fps));
        let request = SyncRequest {
            subtitle_text: working.to_srt(),
            sample_points: self.sync.sample_points(media_duration),
            rescaled,
        };
        self.sync_base = Some(working);
        Ok(request)
    }

    /// Aggregate measured samples and stage a correction for preview.
    ///
    /// A uniform-shift correction is staged immediately. A non-uniform
    /// pattern is returned as [`Correction::NonLinear`]; the host runs the
    /// external resync collaborator and reports back through
    /// [`SessionController::resync_completed`].
    pub fn sync_measured(&mut self, samples: &[OffsetSample]) -> Result<Correction, SessionError> {
        if self.regions().map(|r| r.sync) != Some(SyncState::Auto) {
            return Err(SessionError::StateConflict {
                region: Region::Sync,
                trigger: ProjectEvent::SyncPreview,
            });
        }

        let report = match self.sync.aggregate(samples) {
            Ok(report) => report,
            Err(e) => {
                self.machine.dispatch(ProjectEvent::SyncError);
                return Err(e.into());
            }
        };
        self.last_report = Some(report);

        let correction = self.sync.plan(report);
        if let Correction::UniformShift(report) = correction {
            let mut corrected = self.sync_base.clone().unwrap_or_else(|| self.timeline.clone());
            corrected.shift_all(report.offset);
            self.pending = Some(PendingCorrection {
                timeline: corrected,
                report: Some(report),
            });
            self.machine.dispatch(ProjectEvent::SyncPreview);
        }
        Ok(correction)
    }

    /// Record the external resync collaborator's corrected track and stage
    /// it for preview.
    pub fn resync_completed(&mut self, corrected_text: &str) -> Result<(), SessionError> {
        if self.regions().map(|r| r.sync) != Some(SyncState::Auto) {
            return Err(SessionError::StateConflict {
                region: Region::Sync,
                trigger: ProjectEvent::SyncPreview,
            });
        }
        let corrected = Timeline::from_srt(corrected_text);
        if corrected.is_empty() {
            self.machine.dispatch(ProjectEvent::SyncError);
            return Err(SyncError::SyncFailed.into());
        }
        self.pending = Some(PendingCorrection {
            timeline: corrected,
            report: self.last_report,
        });
        self.machine.dispatch(ProjectEvent::SyncPreview);
        Ok(())
    }

    /// Record a failed measurement run.
    pub fn sync_failed(&mut self) {
        self.machine.dispatch(ProjectEvent::SyncError);
    }

    /// Stage a hand-entered offset as a correction.
    pub fn manual_sync(&mut self, offset_seconds: f64) -> Result<(), SessionError> {
        let dispatch = self.machine.dispatch(ProjectEvent::ManualSync);
        if !dispatch.changed {
            return Err(SessionError::StateConflict {
                region: Region::Sync,
                trigger: ProjectEvent::ManualSync,
            });
        }
        let mut corrected = self.timeline.clone();
        corrected.shift_all(offset_seconds);
        self.pending = Some(PendingCorrection {
            timeline: corrected,
            report: None,
        });
        Ok(())
    }

    /// Accept the staged correction: store it as the autosync version and
    /// activate it.
    pub fn confirm_sync(&mut self, meta: &VersionMeta) -> Result<VersionId, SessionError> {
        let dispatch = self.machine.dispatch(ProjectEvent::ConfirmSync);
        if !dispatch.effects.contains(&Effect::ApplyCorrection) {
            return Err(SessionError::StateConflict {
                region: Region::Sync,
                trigger: ProjectEvent::ConfirmSync,
            });
        }
        let Some(pending) = self.pending.take() else {
            return Err(SyncError::SyncFailed.into());
        };

        let id = self
            .versions
            .add_or_update(VersionLabel::Autosync, pending.timeline.entries(), meta);
        self.activate_version(id)?;
        self.sync_base = None;
        if let Some(report) = pending.report {
            tracing::info!(
                offset = format!("{:+.2}s", report.offset),
                usable = report.usable_samples,
                total = report.total_samples,
                "correction applied"
            );
        }
        Ok(id)
    }

    /// Discard the staged correction.
    pub fn cancel_sync(&mut self) {
        let dispatch = self.machine.dispatch(ProjectEvent::CancelSync);
        if dispatch.effects.contains(&Effect::DiscardCorrection) {
            self.pending = None;
            self.sync_base = None;
        }
    }

    /// Dismiss a sync failure.
    pub fn ack_sync(&mut self) {
        self.machine.dispatch(ProjectEvent::AckSync);
    }

    /// Replace one entry's text, recorded in its undo history.
    pub fn edit_entry(&mut self, index: usize, text: &str) -> Result<(), SessionError> {
        self.require_editable()?;
        self.machine.dispatch(ProjectEvent::Edit);
        self.timeline.edit(index, text)?;
        Ok(())
    }

    /// Undo one entry's last edit.
    pub fn undo_entry(&mut self, index: usize) -> Result<bool, SessionError> {
        self.require_editable()?;
        Ok(self.timeline.undo(index)?)
    }

    /// Redo one entry's last undone edit.
    pub fn redo_entry(&mut self, index: usize) -> Result<bool, SessionError> {
        self.require_editable()?;
        Ok(self.timeline.redo(index)?)
    }

    /// Rewrap one entry's text under the configured line/width budget,
    /// recorded in its undo history like any other edit.
    pub fn reflow_entry(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_editable()?;
        let entry = self
            .timeline
            .entry(index)
            .ok_or(SessionError::Timeline(subcue_timeline::TimelineError::EntryOutOfRange {
                index,
                len: self.timeline.len(),
            }))?;
        let rewrapped = self
            .reflow
            .reflow(entry.text(), self.config.max_lines, self.config.max_chars);
        if rewrapped != entry.text() {
            self.timeline.edit(index, rewrapped)?;
        }
        Ok(())
    }

    /// Shift the whole live timeline; timing-only, not undoable per entry.
    pub fn shift_timeline(&mut self, offset_seconds: f64) -> Result<(), SessionError> {
        self.require_editable()?;
        self.timeline.shift_all(offset_seconds);
        Ok(())
    }

    /// Store the current live timeline as the edited version.
    pub fn commit_edits(&mut self, meta: &VersionMeta) -> Result<VersionId, SessionError> {
        self.require_editable()?;
        Ok(self
            .versions
            .add_or_update(VersionLabel::Edited, self.timeline.entries(), meta))
    }

    /// Make a stored version the live timeline.
    pub fn activate_version(&mut self, id: VersionId) -> Result<(), SessionError> {
        let entries = self
            .versions
            .activate(id)
            .ok_or(SessionError::UnknownVersion(id))?;
        let mut timeline = Timeline::new();
        timeline.set_max_undo_depth(self.config.max_undo_depth);
        timeline.replace_entries(entries);
        self.timeline = timeline;
        Ok(())
    }

    /// Quality report for the live timeline.
    pub fn quality_report(&self) -> ValidationReport {
        validate(&self.timeline, &ValidationLimits::default())
    }

    fn require_editable(&self) -> Result<(), SessionError> {
        if self.regions().map(|r| r.subtitle) == Some(SubtitleState::Ready) {
            Ok(())
        } else {
            Err(SessionError::StateConflict {
                region: Region::Subtitle,
                trigger: ProjectEvent::Edit,
            })
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
