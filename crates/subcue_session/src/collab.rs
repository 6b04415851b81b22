// SPDX-License-Identifier: MIT OR Apache-2.0
//! Boundary traits for external collaborators.
//!
//! The session engine never performs I/O itself. Hosts implement these
//! traits over whatever transport they have (subprocess, HTTP, queue) and
//! feed outcomes back into the session as completion events. Timeouts and
//! retries are the implementor's concern; this core only ever sees a result
//! or a failure.

use crate::sync::OffsetSample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque collaborator failure, forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CollabError(pub String);

/// Converts media between container/codec formats.
///
/// No timing guarantee: a transcode may take arbitrarily long, which is why
/// its completion arrives as an event rather than a return value in the
/// session flow.
pub trait Transcoder {
    /// Transcode raw media bytes into the target format.
    fn transcode(&self, video: &[u8], target_format: &str) -> Result<Vec<u8>, CollabError>;
}

/// Measures subtitle/audio offsets at sample points across the media.
pub trait AlignmentService {
    /// Measure one offset per sample point (seconds into the media).
    ///
    /// Individual points may fail without failing the batch; the result
    /// always has one sample per requested point, in order.
    fn measure_offsets(&self, language_hint: &str, sample_points: &[f64]) -> Vec<OffsetSample>;

    /// Non-linear resynchronization for tracks whose drift a uniform shift
    /// cannot fix. Takes and returns serialized timeline text.
    fn resync(&self, subtitle_text: &str) -> Result<String, CollabError>;
}

/// Translates a serialized timeline.
///
/// The contract requires the result to have the same block count as the
/// input; enforcing that is the implementor's (or its adapter's) job before
/// the result reaches the session.
pub trait TranslationService {
    /// Translate serialized timeline text between languages.
    fn translate(
        &self,
        subtitle_text: &str,
        source_lang: &str,
        target_lang: &str,
        context: Option<&str>,
    ) -> Result<String, CollabError>;
}

/// One search hit from the subtitle catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    /// Catalog-side identifier, used for download.
    pub id: String,
    /// Release name.
    pub name: String,
    /// Track language.
    pub language: String,
    /// Download count, a popularity proxy.
    pub downloads: u64,
    /// Catalog rating.
    pub rating: f32,
}

/// Searches and downloads subtitle tracks from an external catalog.
pub trait SubtitleCatalog {
    /// Search for candidate tracks by title and language.
    fn search(&self, query: &str, language: &str) -> Result<Vec<CatalogCandidate>, CollabError>;

    /// Download one candidate's raw subtitle bytes.
    fn download(&self, id: &str) -> Result<Vec<u8>, CollabError>;
}
