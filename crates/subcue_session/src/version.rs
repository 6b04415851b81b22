// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named timeline snapshots keyed by origin.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use subcue_timeline::Entry;
use uuid::Uuid;

/// Unique identifier for a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(pub Uuid);

impl VersionId {
    /// Create a new random version ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VersionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Origin of a stored timeline snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VersionLabel {
    /// The track as first loaded.
    Original,
    /// Extracted from the media container.
    Extracted,
    /// Produced by the translation collaborator.
    Translated,
    /// Produced by automatic synchronization.
    Autosync,
    /// Hand-edited by the user.
    Edited,
}

impl VersionLabel {
    /// Get the display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Extracted => "Extracted",
            Self::Translated => "Translated",
            Self::Autosync => "Autosync",
            Self::Edited => "Edited",
        }
    }
}

/// Descriptive metadata attached to a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMeta {
    /// Where the track came from (release name, catalog id, ...).
    pub source: String,
    /// Track language.
    pub language: String,
    /// Free-form variant tag (release group, revision, ...).
    pub variant: String,
}

/// A named, independently stored snapshot of a timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    /// Unique version ID, stable across updates.
    pub id: VersionId,
    /// Origin label.
    pub label: VersionLabel,
    /// Where the track came from.
    pub source: String,
    /// Track language.
    pub language: String,
    /// Free-form variant tag.
    pub variant: String,
    /// Snapshot of the entries, including each entry's edit history.
    entries: Vec<Entry>,
}

impl Version {
    /// The stored entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Identity under which versions merge: one version per (label, source,
/// language) triple, updated in place thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct VersionKey {
    label: VersionLabel,
    source: String,
    language: String,
}

/// Ordered store of versions with a single active one.
///
/// Entry snapshots are deep-copied both on store and on activation, so live
/// edits can never corrupt stored history and stored updates can never leak
/// into the live timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionStore {
    versions: IndexMap<VersionKey, Version>,
    active: Option<VersionId>,
}

impl VersionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot under `(label, source, language)`.
    ///
    /// An existing version with that identity has its entries replaced in
    /// place, keeping its id and position in the store; a new identity is
    /// appended and becomes the active version. Returns the id either way.
    pub fn add_or_update(&mut self, label: VersionLabel, entries: &[Entry], meta: &VersionMeta) -> VersionId {
        let key = VersionKey {
            label,
            source: meta.source.clone(),
            language: meta.language.clone(),
        };

        if let Some(existing) = self.versions.get_mut(&key) {
            existing.entries = entries.to_vec();
            existing.variant = meta.variant.clone();
            tracing::debug!(
                label = label.display_name(),
                source = %meta.source,
                "updated stored version in place"
            );
            return existing.id;
        }

        let version = Version {
            id: VersionId::new(),
            label,
            source: meta.source.clone(),
            language: meta.language.clone(),
            variant: meta.variant.clone(),
            entries: entries.to_vec(),
        };
        let id = version.id;
        self.versions.insert(key, version);
        self.active = Some(id);
        tracing::info!(label = label.display_name(), source = %meta.source, "created version");
        id
    }

    /// Mark a version active and hand back a deep copy of its entries for
    /// the caller to install as the live timeline.
    pub fn activate(&mut self, id: VersionId) -> Option<Vec<Entry>> {
        let version = self.versions.values().find(|v| v.id == id)?;
        let entries = version.entries.clone();
        self.active = Some(id);
        tracing::info!(label = version.label.display_name(), "activated version");
        Some(entries)
    }

    /// Look a version up by id.
    pub fn get(&self, id: VersionId) -> Option<&Version> {
        self.versions.values().find(|v| v.id == id)
    }

    /// Look a version up by identity.
    pub fn find(&self, label: VersionLabel, source: &str, language: &str) -> Option<&Version> {
        let key = VersionKey {
            label,
            source: source.to_string(),
            language: language.to_string(),
        };
        self.versions.get(&key)
    }

    /// The currently active version id, if any version exists.
    pub fn active(&self) -> Option<VersionId> {
        self.active
    }

    /// Stored version count.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// All versions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    /// Drop every version. Only a full session reset does this.
    pub fn clear(&mut self) {
        self.versions.clear();
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(source: &str, language: &str) -> VersionMeta {
        VersionMeta {
            source: source.to_string(),
            language: language.to_string(),
            variant: String::new(),
        }
    }

    fn sample_entries(text: &str) -> Vec<Entry> {
        vec![Entry::new(1.0, 3.0, text)]
    }

    #[test]
    fn test_new_identity_appends_and_activates() {
        let mut store = VersionStore::new();
        let id = store.add_or_update(VersionLabel::Original, &sample_entries("a"), &meta("up", "en"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.active(), Some(id));

        let id2 = store.add_or_update(VersionLabel::Translated, &sample_entries("b"), &meta("up", "pt"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.active(), Some(id2));
    }

    #[test]
    fn test_same_identity_updates_in_place() {
        let mut store = VersionStore::new();
        let id = store.add_or_update(VersionLabel::Autosync, &sample_entries("a"), &meta("up", "en"));
        store.add_or_update(VersionLabel::Original, &sample_entries("x"), &meta("up", "en"));

        let id_again = store.add_or_update(VersionLabel::Autosync, &sample_entries("b"), &meta("up", "en"));
        assert_eq!(store.len(), 2);
        assert_eq!(id, id_again);
        // Position preserved: autosync is still first
        assert_eq!(store.iter().next().map(|v| v.id), Some(id));
        assert_eq!(
            store.get(id).map(|v| v.entries()[0].text().to_string()),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_update_does_not_steal_active() {
        let mut store = VersionStore::new();
        store.add_or_update(VersionLabel::Autosync, &sample_entries("a"), &meta("up", "en"));
        let original = store.add_or_update(VersionLabel::Original, &sample_entries("x"), &meta("up", "en"));

        store.add_or_update(VersionLabel::Autosync, &sample_entries("b"), &meta("up", "en"));
        assert_eq!(store.active(), Some(original));
    }

    #[test]
    fn test_activation_copies_never_aliases() {
        let mut store = VersionStore::new();
        let id = store.add_or_update(VersionLabel::Original, &sample_entries("stored"), &meta("up", "en"));

        let mut live = store.activate(id).expect("version exists");
        live[0].apply_edit("mutated live", 10);

        assert_eq!(store.get(id).map(|v| v.entries()[0].text()), Some("stored"));
    }

    #[test]
    fn test_activate_unknown_version() {
        let mut store = VersionStore::new();
        assert!(store.activate(VersionId::new()).is_none());
        assert_eq!(store.active(), None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut store = VersionStore::new();
        store.add_or_update(VersionLabel::Original, &sample_entries("a"), &meta("up", "en"));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.active(), None);
    }
}
