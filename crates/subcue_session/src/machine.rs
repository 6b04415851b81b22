// SPDX-License-Identifier: MIT OR Apache-2.0
//! Parallel project state machine.
//!
//! One session is modeled as four concurrently-active regions (video,
//! subtitle, translation, sync) entered together when media is loaded, plus
//! a shared context record mutated only by designated entry actions. Every
//! transition is a pure function of `(state, event, context)`; the machine
//! applies them, collects the effects they request, and recomputes the
//! externally observable flags. An event no region handles is a structural
//! no-op: no state change, no effects.
//!
//! Re-entrancy needs no locks: a busy region (`Running`, `Auto`) simply has
//! no transition for a repeated trigger of the same kind, so a duplicate
//! request can never be dispatched. There is likewise no cancellation of an
//! in-flight request; only a delivered result can be confirmed or discarded.

use serde::{Deserialize, Serialize};

/// Everything the UI or a collaborator can feed into the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectEvent {
    /// New media loaded; starts a session from idle.
    UploadMkv,
    /// Video finished loading.
    VideoReady,
    /// Video failed to load.
    VideoError,
    /// Extract the embedded track from the container.
    ExtractFromMkv,
    /// Search the subtitle catalog.
    SearchOpenSubtitles,
    /// User supplied a subtitle file.
    UploadSubtitle,
    /// A subtitle track became available by other means.
    SubtitleAvailable,
    /// User picked the translate workflow.
    ChooseTranslate,
    /// User picked the sync workflow.
    ChooseSync,
    /// User picked the edit workflow.
    ChooseEdit,
    /// Start a translation run.
    Translate,
    /// Start an automatic sync run.
    Sync,
    /// Start manual offset adjustment.
    ManualSync,
    /// Edit the live timeline.
    Edit,
    /// Translation collaborator delivered a result.
    TranslationDone,
    /// Translation collaborator failed.
    TranslationError,
    /// User dismissed the translation outcome.
    AckTranslation,
    /// Sync measurement produced a previewable correction.
    SyncPreview,
    /// Sync measurement failed.
    SyncError,
    /// User accepted the pending correction.
    ConfirmSync,
    /// User discarded the pending correction.
    CancelSync,
    /// User dismissed the sync failure.
    AckSync,
}

/// The four concurrently-active sub-machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    /// Video readiness.
    Video,
    /// Subtitle presence.
    Subtitle,
    /// Translation lifecycle.
    Translation,
    /// Synchronization lifecycle.
    Sync,
}

/// Video region state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoState {
    /// Media is loading.
    #[default]
    Loading,
    /// Media is ready for playback.
    Ready,
    /// Media failed; terminal for this region.
    Error,
}

/// Subtitle region state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleState {
    /// Transient entry state, resolved by guard in the same dispatch.
    Check,
    /// No track loaded yet.
    Missing,
    /// A track came with the session.
    Present,
    /// Transient acquisition state; falls through to `Ready`.
    Available,
    /// A track is loaded and a workflow may run on it.
    Ready,
}

/// Translation region state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TranslationState {
    /// Nothing running.
    #[default]
    Idle,
    /// A translation request is outstanding.
    Running,
    /// A result arrived.
    Done,
    /// The request failed.
    Error,
}

/// Sync region state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncState {
    /// Nothing running.
    #[default]
    Idle,
    /// Automatic measurement is outstanding.
    Auto,
    /// A measured correction awaits confirmation.
    Preview,
    /// Manual offset adjustment in progress.
    Manual,
    /// Measurement failed.
    Error,
}

/// Shared flags mutated only by designated state-entry actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    /// A subtitle track has been loaded this session.
    pub has_subtitle: bool,
    /// A translation has completed this session.
    pub has_translated: bool,
    /// A sync preview has been produced this session.
    pub has_synced: bool,
}

/// Externally observable flags, recomputed on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiFlags {
    /// Video region reached `Ready`.
    pub video_loaded: bool,
    /// Subtitle region is in `Missing`.
    pub subtitle_missing: bool,
    /// A subtitle track is loaded (`Present` or `Ready`).
    pub subtitle_active: bool,
    /// A translation completed this session.
    pub subtitle_translated: bool,
    /// A sync preview was produced this session.
    pub subtitle_synced: bool,
}

/// Work a transition asks the session layer to perform.
///
/// Effects are plain data, never callbacks; the machine stays deterministic
/// and the session decides how each effect maps onto collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Clear timeline, versions and context for a fresh session.
    ResetSession,
    /// Hand the serialized timeline to the translation collaborator.
    DispatchTranslation,
    /// Ask the alignment collaborator to measure offsets.
    DispatchAlignment,
    /// Apply the pending correction as the new autosync version.
    ApplyCorrection,
    /// Drop the pending correction.
    DiscardCorrection,
}

/// States of the four regions while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regions {
    /// Video readiness.
    pub video: VideoState,
    /// Subtitle presence.
    pub subtitle: SubtitleState,
    /// Translation lifecycle.
    pub translation: TranslationState,
    /// Synchronization lifecycle.
    pub sync: SyncState,
}

/// Top-level machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppState {
    /// No session; waiting for media.
    #[default]
    Idle,
    /// All four regions active.
    Active(Regions),
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Whether any region changed state.
    pub changed: bool,
    /// Effects requested by the transitions taken, in order.
    pub effects: Vec<Effect>,
}

/// The parallel composite machine coordinating one project session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectStateMachine {
    state: AppState,
    context: ProjectContext,
    flags: UiFlags,
}

impl ProjectStateMachine {
    /// Create a machine in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current top-level state.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Region states, when a session is active.
    pub fn regions(&self) -> Option<Regions> {
        match self.state {
            AppState::Idle => None,
            AppState::Active(regions) => Some(regions),
        }
    }

    /// The shared context record.
    pub fn context(&self) -> ProjectContext {
        self.context
    }

    /// The derived flags as of the last transition.
    pub fn flags(&self) -> UiFlags {
        self.flags
    }

    /// Feed one event through every region.
    ///
    /// Undefined triggers change nothing and request nothing. Flags are
    /// recomputed unconditionally, never cached across transitions.
    pub fn dispatch(&mut self, event: ProjectEvent) -> Dispatch {
        let mut effects = Vec::new();
        let mut changed = false;

        match self.state {
            AppState::Idle => {
                if event == ProjectEvent::UploadMkv {
                    let context = ProjectContext::default();
                    let regions = Regions {
                        video: VideoState::Loading,
                        subtitle: resolve_check(context),
                        translation: TranslationState::Idle,
                        sync: SyncState::Idle,
                    };
                    self.context = context;
                    self.state = AppState::Active(regions);
                    effects.push(Effect::ResetSession);
                    changed = true;
                    tracing::info!("session started");
                }
            }
            AppState::Active(mut regions) => {
                if let Some(next) = video_transition(regions.video, event) {
                    tracing::debug!(from = ?regions.video, to = ?next, "video region");
                    regions.video = next;
                    changed = true;
                }
                if let Some((next, context)) = subtitle_transition(regions.subtitle, event, self.context) {
                    tracing::debug!(from = ?regions.subtitle, to = ?next, "subtitle region");
                    regions.subtitle = next;
                    self.context = context;
                    changed = true;
                }
                if let Some((next, context, effect)) =
                    translation_transition(regions.translation, event, self.context)
                {
                    tracing::debug!(from = ?regions.translation, to = ?next, "translation region");
                    regions.translation = next;
                    self.context = context;
                    effects.extend(effect);
                    changed = true;
                }
                if let Some((next, context, effect)) = sync_transition(regions.sync, event, self.context) {
                    tracing::debug!(from = ?regions.sync, to = ?next, "sync region");
                    regions.sync = next;
                    self.context = context;
                    effects.extend(effect);
                    changed = true;
                }
                self.state = AppState::Active(regions);
            }
        }

        if !changed {
            tracing::trace!(?event, "event not accepted in current state");
        }
        self.flags = derive_flags(self.state, self.context);

        Dispatch { changed, effects }
    }
}

/// Resolve the subtitle region's transient entry state via its guard.
fn resolve_check(context: ProjectContext) -> SubtitleState {
    if context.has_subtitle {
        SubtitleState::Present
    } else {
        SubtitleState::Missing
    }
}

/// Acquisition entry action plus the immediate fall-through to `Ready`.
///
/// `Available` holds no outstanding work of its own, so it resolves within
/// the same dispatch and is never observable between events.
fn enter_available(mut context: ProjectContext) -> (SubtitleState, ProjectContext) {
    context.has_subtitle = true;
    (SubtitleState::Ready, context)
}

fn video_transition(state: VideoState, event: ProjectEvent) -> Option<VideoState> {
    match (state, event) {
        (VideoState::Loading, ProjectEvent::VideoReady) => Some(VideoState::Ready),
        (VideoState::Loading, ProjectEvent::VideoError) => Some(VideoState::Error),
        _ => None,
    }
}

fn subtitle_transition(
    state: SubtitleState,
    event: ProjectEvent,
    context: ProjectContext,
) -> Option<(SubtitleState, ProjectContext)> {
    match (state, event) {
        (SubtitleState::Check, _) => Some((resolve_check(context), context)),
        (
            SubtitleState::Missing,
            ProjectEvent::ExtractFromMkv
            | ProjectEvent::SearchOpenSubtitles
            | ProjectEvent::UploadSubtitle
            | ProjectEvent::SubtitleAvailable,
        ) => Some(enter_available(context)),
        (
            SubtitleState::Present,
            ProjectEvent::ChooseTranslate | ProjectEvent::ChooseSync | ProjectEvent::ChooseEdit,
        ) => Some((SubtitleState::Ready, context)),
        // `Ready` self-accepts workflow triggers without changing state
        _ => None,
    }
}

fn translation_transition(
    state: TranslationState,
    event: ProjectEvent,
    mut context: ProjectContext,
) -> Option<(TranslationState, ProjectContext, Option<Effect>)> {
    match (state, event) {
        (TranslationState::Idle, ProjectEvent::Translate) => Some((
            TranslationState::Running,
            context,
            Some(Effect::DispatchTranslation),
        )),
        (TranslationState::Running, ProjectEvent::TranslationDone) => {
            context.has_translated = true;
            Some((TranslationState::Done, context, None))
        }
        (TranslationState::Running, ProjectEvent::TranslationError) => {
            Some((TranslationState::Error, context, None))
        }
        (TranslationState::Done | TranslationState::Error, ProjectEvent::AckTranslation) => {
            Some((TranslationState::Idle, context, None))
        }
        _ => None,
    }
}

fn sync_transition(
    state: SyncState,
    event: ProjectEvent,
    mut context: ProjectContext,
) -> Option<(SyncState, ProjectContext, Option<Effect>)> {
    match (state, event) {
        (SyncState::Idle, ProjectEvent::Sync) => {
            Some((SyncState::Auto, context, Some(Effect::DispatchAlignment)))
        }
        (SyncState::Idle, ProjectEvent::ManualSync) => Some((SyncState::Manual, context, None)),
        (SyncState::Auto, ProjectEvent::SyncPreview) => {
            context.has_synced = true;
            Some((SyncState::Preview, context, None))
        }
        (SyncState::Auto, ProjectEvent::SyncError) => Some((SyncState::Error, context, None)),
        (SyncState::Preview | SyncState::Manual, ProjectEvent::ConfirmSync) => {
            Some((SyncState::Idle, context, Some(Effect::ApplyCorrection)))
        }
        (SyncState::Preview | SyncState::Manual, ProjectEvent::CancelSync) => {
            Some((SyncState::Idle, context, Some(Effect::DiscardCorrection)))
        }
        (SyncState::Error, ProjectEvent::AckSync) => Some((SyncState::Idle, context, None)),
        _ => None,
    }
}

/// Pure derivation of the observable flags from machine state and context.
fn derive_flags(state: AppState, context: ProjectContext) -> UiFlags {
    let regions = match state {
        AppState::Idle => return UiFlags::default(),
        AppState::Active(regions) => regions,
    };
    UiFlags {
        video_loaded: regions.video == VideoState::Ready,
        subtitle_missing: regions.subtitle == SubtitleState::Missing,
        subtitle_active: matches!(regions.subtitle, SubtitleState::Present | SubtitleState::Ready),
        subtitle_translated: context.has_translated,
        subtitle_synced: context.has_synced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> ProjectStateMachine {
        let mut machine = ProjectStateMachine::new();
        machine.dispatch(ProjectEvent::UploadMkv);
        machine
    }

    #[test]
    fn test_upload_starts_all_regions() {
        let machine = started();
        let regions = machine.regions().expect("session active");
        assert_eq!(regions.video, VideoState::Loading);
        assert_eq!(regions.subtitle, SubtitleState::Missing);
        assert_eq!(regions.translation, TranslationState::Idle);
        assert_eq!(regions.sync, SyncState::Idle);
        assert_eq!(machine.context(), ProjectContext::default());
    }

    #[test]
    fn test_upload_requests_session_reset() {
        let mut machine = ProjectStateMachine::new();
        let dispatch = machine.dispatch(ProjectEvent::UploadMkv);
        assert!(dispatch.changed);
        assert_eq!(dispatch.effects, vec![Effect::ResetSession]);
    }

    #[test]
    fn test_events_ignored_while_idle() {
        let mut machine = ProjectStateMachine::new();
        let dispatch = machine.dispatch(ProjectEvent::Sync);
        assert!(!dispatch.changed);
        assert!(dispatch.effects.is_empty());
        assert_eq!(machine.state(), AppState::Idle);
    }

    #[test]
    fn test_video_lifecycle() {
        let mut machine = started();
        assert!(!machine.flags().video_loaded);
        machine.dispatch(ProjectEvent::VideoReady);
        assert!(machine.flags().video_loaded);

        // Terminal: no way back out of error
        let mut failing = started();
        failing.dispatch(ProjectEvent::VideoError);
        let dispatch = failing.dispatch(ProjectEvent::VideoReady);
        assert!(!dispatch.changed);
        assert_eq!(failing.regions().map(|r| r.video), Some(VideoState::Error));
    }

    #[test]
    fn test_subtitle_acquisition_falls_through_to_ready() {
        let mut machine = started();
        assert!(machine.flags().subtitle_missing);

        machine.dispatch(ProjectEvent::UploadSubtitle);
        let regions = machine.regions().expect("session active");
        assert_eq!(regions.subtitle, SubtitleState::Ready);
        assert!(machine.context().has_subtitle);
        assert!(machine.flags().subtitle_active);
        assert!(!machine.flags().subtitle_missing);
    }

    #[test]
    fn test_translation_lifecycle_sets_flag() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);

        let dispatch = machine.dispatch(ProjectEvent::Translate);
        assert_eq!(dispatch.effects, vec![Effect::DispatchTranslation]);
        assert!(!machine.flags().subtitle_translated);

        machine.dispatch(ProjectEvent::TranslationDone);
        assert!(machine.flags().subtitle_translated);

        machine.dispatch(ProjectEvent::AckTranslation);
        assert_eq!(
            machine.regions().map(|r| r.translation),
            Some(TranslationState::Idle)
        );
        // The context flag survives the acknowledgment
        assert!(machine.flags().subtitle_translated);
    }

    #[test]
    fn test_translation_error_path() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);
        machine.dispatch(ProjectEvent::Translate);
        machine.dispatch(ProjectEvent::TranslationError);
        assert_eq!(
            machine.regions().map(|r| r.translation),
            Some(TranslationState::Error)
        );
        assert!(!machine.flags().subtitle_translated);
        machine.dispatch(ProjectEvent::AckTranslation);
        assert_eq!(
            machine.regions().map(|r| r.translation),
            Some(TranslationState::Idle)
        );
    }

    #[test]
    fn test_duplicate_sync_is_structurally_rejected() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);

        let first = machine.dispatch(ProjectEvent::Sync);
        assert_eq!(first.effects, vec![Effect::DispatchAlignment]);

        // A second SYNC while measuring: no state change, no duplicate request
        let second = machine.dispatch(ProjectEvent::Sync);
        assert!(!second.changed);
        assert!(second.effects.is_empty());
        assert_eq!(machine.regions().map(|r| r.sync), Some(SyncState::Auto));
    }

    #[test]
    fn test_sync_preview_confirm() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);
        machine.dispatch(ProjectEvent::Sync);
        machine.dispatch(ProjectEvent::SyncPreview);
        assert!(machine.flags().subtitle_synced);

        let dispatch = machine.dispatch(ProjectEvent::ConfirmSync);
        assert_eq!(dispatch.effects, vec![Effect::ApplyCorrection]);
        assert_eq!(machine.regions().map(|r| r.sync), Some(SyncState::Idle));
    }

    #[test]
    fn test_sync_preview_cancel() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);
        machine.dispatch(ProjectEvent::Sync);
        machine.dispatch(ProjectEvent::SyncPreview);

        let dispatch = machine.dispatch(ProjectEvent::CancelSync);
        assert_eq!(dispatch.effects, vec![Effect::DiscardCorrection]);
        assert_eq!(machine.regions().map(|r| r.sync), Some(SyncState::Idle));
        // hasSynced stays: a preview was produced this session
        assert!(machine.flags().subtitle_synced);
    }

    #[test]
    fn test_sync_error_acknowledged() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);
        machine.dispatch(ProjectEvent::Sync);
        machine.dispatch(ProjectEvent::SyncError);
        assert!(!machine.flags().subtitle_synced);
        machine.dispatch(ProjectEvent::AckSync);
        assert_eq!(machine.regions().map(|r| r.sync), Some(SyncState::Idle));
    }

    #[test]
    fn test_manual_sync_path() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);
        machine.dispatch(ProjectEvent::ManualSync);
        assert_eq!(machine.regions().map(|r| r.sync), Some(SyncState::Manual));
        let dispatch = machine.dispatch(ProjectEvent::ConfirmSync);
        assert_eq!(dispatch.effects, vec![Effect::ApplyCorrection]);
        assert_eq!(machine.regions().map(|r| r.sync), Some(SyncState::Idle));
    }

    #[test]
    fn test_present_track_needs_workflow_choice() {
        // Re-seeding a session that already has a subtitle resolves the
        // check guard to Present
        let context = ProjectContext {
            has_subtitle: true,
            ..ProjectContext::default()
        };
        assert_eq!(resolve_check(context), SubtitleState::Present);

        let (next, context) =
            subtitle_transition(SubtitleState::Present, ProjectEvent::ChooseEdit, context)
                .expect("defined transition");
        assert_eq!(next, SubtitleState::Ready);
        assert!(context.has_subtitle);
    }

    #[test]
    fn test_flags_recomputed_every_dispatch() {
        let mut machine = started();
        machine.dispatch(ProjectEvent::UploadSubtitle);
        machine.dispatch(ProjectEvent::VideoReady);
        let flags = machine.flags();
        assert!(flags.video_loaded && flags.subtitle_active);

        // Restarting the session drops everything derived
        machine.dispatch(ProjectEvent::Sync);
        machine.dispatch(ProjectEvent::SyncPreview);
        assert!(machine.flags().subtitle_synced);
    }
}
