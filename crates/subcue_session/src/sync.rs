// SPDX-License-Identifier: MIT OR Apache-2.0
//! Offset aggregation and correction policy.
//!
//! Alignment measurement happens outside this core; what arrives here is a
//! small set of independently measured offset samples, some of which may
//! have failed. The orchestrator aggregates them, decides between a uniform
//! shift and delegation to the external non-linear resync collaborator, and
//! always reports how trustworthy the number is.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use subcue_timeline::Timeline;

/// Framerates commonly encountered in the wild.
const COMMON_FRAMERATES: [f64; 8] = [23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0];

/// Framerate pairs that are incompatible but cleanly convertible.
const CONVERTIBLE_PAIRS: [(f64, f64); 2] = [(23.976, 24.0), (25.0, 29.97)];

/// Tuning knobs for the sync policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Offset samples requested per run.
    pub sample_count: usize,
    /// Minimum usable samples for aggregation.
    pub min_samples: usize,
    /// Largest |mean offset| still correctable by a uniform shift, seconds.
    pub uniform_shift_limit: f64,
    /// Sample standard deviation above which drift is considered
    /// non-uniform, seconds.
    pub max_std_dev: f64,
    /// Minimum entry count for framerate inference to be meaningful.
    pub min_entries_for_framerate: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sample_count: 5,
            min_samples: 2,
            uniform_shift_limit: 1.5,
            max_std_dev: 1.0,
            min_entries_for_framerate: 100,
        }
    }
}

/// One measurement from the alignment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OffsetSample {
    /// Offset between subtitle timing and audio timing, seconds.
    Measured(f64),
    /// The sample point produced nothing usable.
    Failed,
}

/// Coarse trust grade for a sync result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncQuality {
    /// Tiny offset, samples agree closely.
    Perfect,
    /// Small offset, good agreement.
    Good,
    /// Noticeable offset or spread.
    Fair,
    /// Large offset or widely scattered samples.
    Poor,
}

/// Aggregated measurement, always carrying its own confidence data.
///
/// A partial result (some samples failed) is still a result, but it must
/// never be presented as full confidence: sample counts and spread travel
/// with the offset wherever it goes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Mean offset over the usable samples, seconds.
    pub offset: f64,
    /// Samples that produced a measurement.
    pub usable_samples: usize,
    /// Samples attempted.
    pub total_samples: usize,
    /// Sample standard deviation of the usable offsets, seconds.
    pub std_dev: f64,
    /// Coarse trust grade.
    pub quality: SyncQuality,
}

/// How a measured offset should be corrected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Correction {
    /// Shift every timestamp by the mean offset.
    UniformShift(SyncReport),
    /// Drift is non-uniform; hand the track to the external resync
    /// collaborator.
    NonLinear(SyncReport),
}

impl Correction {
    /// The report behind this decision.
    pub fn report(&self) -> &SyncReport {
        match self {
            Self::UniformShift(report) | Self::NonLinear(report) => report,
        }
    }
}

/// Turns raw measured offsets into a correction policy.
#[derive(Debug, Clone, Default)]
pub struct SyncOrchestrator {
    config: SyncConfig,
}

impl SyncOrchestrator {
    /// Create an orchestrator with the given tuning.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// The active tuning.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Aggregate raw samples into a report.
    ///
    /// Failed samples are excluded; fewer than the configured minimum of
    /// usable ones is an [`SyncError::InsufficientSamples`].
    pub fn aggregate(&self, samples: &[OffsetSample]) -> Result<SyncReport, SyncError> {
        let usable: Vec<f64> = samples
            .iter()
            .filter_map(|s| match s {
                OffsetSample::Measured(v) => Some(*v),
                OffsetSample::Failed => None,
            })
            .collect();

        if usable.len() < self.config.min_samples {
            return Err(SyncError::InsufficientSamples {
                usable: usable.len(),
                total: samples.len(),
                required: self.config.min_samples,
            });
        }

        let mean = usable.iter().sum::<f64>() / usable.len() as f64;
        let std_dev = if usable.len() > 1 {
            let variance =
                usable.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (usable.len() - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let report = SyncReport {
            offset: mean,
            usable_samples: usable.len(),
            total_samples: samples.len(),
            std_dev,
            quality: grade(mean, std_dev),
        };
        tracing::info!(
            offset = format!("{:+.2}s", report.offset),
            std_dev = format!("{:.2}s", report.std_dev),
            usable = report.usable_samples,
            total = report.total_samples,
            "aggregated offset samples"
        );
        Ok(report)
    }

    /// Decide between a uniform shift and non-linear delegation.
    pub fn plan(&self, report: SyncReport) -> Correction {
        if report.offset.abs() >= self.config.uniform_shift_limit
            || report.std_dev > self.config.max_std_dev
        {
            tracing::info!("offset pattern suggests non-uniform drift, delegating resync");
            Correction::NonLinear(report)
        } else {
            Correction::UniformShift(report)
        }
    }

    /// Evenly spaced measurement points across the media, skipping the
    /// very start and end where credits and silence live.
    pub fn sample_points(&self, media_duration: f64) -> Vec<f64> {
        let n = self.config.sample_count.max(1);
        let step = media_duration / (n as f64 + 1.0);
        (1..=n).map(|i| step * i as f64).collect()
    }

    /// Infer the framerate a track was authored against.
    ///
    /// Entry start times authored on a frame grid land near multiples of the
    /// frame duration; each common framerate is scored by how many starts
    /// fall within 5 ms of its grid. Tracks below the configured entry count
    /// are too short to score reliably.
    pub fn infer_framerate(&self, timeline: &Timeline) -> Option<f64> {
        if timeline.len() < self.config.min_entries_for_framerate {
            return None;
        }

        let mut best_fps = None;
        let mut best_score = 0usize;
        for fps in COMMON_FRAMERATES {
            let frame_ms = 1000.0 / fps;
            let score = timeline
                .entries()
                .iter()
                .take(200)
                .filter(|e| {
                    let ms = (e.start * 1000.0).round();
                    let rem = ms % frame_ms;
                    rem.min(frame_ms - rem) < 5.0
                })
                .count();
            if score > best_score {
                best_score = score;
                best_fps = Some(fps);
            }
        }
        best_fps
    }

    /// Rescale the track when media and subtitle framerates form a known
    /// convertible pair.
    ///
    /// Returns the `(subtitle_fps, media_fps)` pair applied, or `None` when
    /// no rescale was warranted. Runs before offset measurement so the
    /// samples measure residual shift, not framerate drift.
    pub fn framerate_prepass(&self, timeline: &mut Timeline, media_fps: f64) -> Option<(f64, f64)> {
        let subtitle_fps = self.infer_framerate(timeline)?;
        if !is_convertible_pair(subtitle_fps, media_fps) {
            return None;
        }
        tracing::info!(
            from = subtitle_fps,
            to = media_fps,
            "framerate mismatch, rescaling timestamps"
        );
        timeline.rescale(subtitle_fps, media_fps);
        Some((subtitle_fps, media_fps))
    }
}

/// Check whether two framerates are one of the known convertible pairs.
fn is_convertible_pair(a: f64, b: f64) -> bool {
    CONVERTIBLE_PAIRS.iter().any(|(x, y)| {
        (close(a, *x) && close(b, *y)) || (close(a, *y) && close(b, *x))
    })
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.01
}

/// Grade a measurement by offset size and sample agreement.
fn grade(offset: f64, std_dev: f64) -> SyncQuality {
    if offset.abs() < 0.3 && std_dev < 0.5 {
        SyncQuality::Perfect
    } else if offset.abs() < 0.8 && std_dev < 1.0 {
        SyncQuality::Good
    } else if offset.abs() < 2.0 && std_dev < 2.0 {
        SyncQuality::Fair
    } else {
        SyncQuality::Poor
    }
}
