// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subtitle quality validation against professional timing standards.
//!
//! The checks follow broadcast/streaming subtitling practice: reading speed,
//! line budget, display duration and inter-entry gaps. Validation never
//! mutates the timeline; it produces a typed report the host can surface.

use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Thresholds for [`validate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationLimits {
    /// Minimum display duration, seconds.
    pub min_duration: f64,
    /// Maximum display duration, seconds.
    pub max_duration: f64,
    /// Ideal characters per line.
    pub ideal_chars: usize,
    /// Maximum acceptable characters per line.
    pub max_chars: usize,
    /// Line length that triggers a report.
    pub warn_chars: usize,
    /// Ideal characters per second.
    pub ideal_cps: f64,
    /// Maximum characters per second.
    pub max_cps: f64,
    /// Maximum lines per entry.
    pub max_lines: usize,
    /// Minimum gap between entries, seconds (about 2 frames).
    pub min_gap: f64,
    /// Gap length considered a suspicious pause, seconds.
    pub long_pause: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_duration: 1.0,
            max_duration: 6.0,
            ideal_chars: 37,
            max_chars: 42,
            warn_chars: 46,
            ideal_cps: 15.0,
            max_cps: 17.0,
            max_lines: 2,
            min_gap: 0.08,
            long_pause: 20.0,
        }
    }
}

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Breaks the standard outright.
    Error,
    /// Close to the limit or mildly over.
    Warning,
    /// Worth a look, possibly intentional.
    Info,
}

/// The kind of problem found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemKind {
    /// Entry shown for less than the minimum duration.
    ShortDuration,
    /// Entry shown for more than the maximum duration.
    LongDuration,
    /// More lines than the budget allows.
    TooManyLines,
    /// A line longer than the acceptable width.
    LongLine,
    /// Reading speed above the limit.
    HighCps,
    /// Entry with no text.
    Empty,
    /// Gap to the previous entry below the minimum.
    GapTooSmall,
    /// Entry overlaps the previous one.
    Overlap,
    /// Unusually long silence before this entry.
    LongPause,
}

/// One finding against a single entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// 1-based entry index, as it would appear in serialized output.
    pub index: usize,
    /// What was found.
    pub kind: ProblemKind,
    /// How serious it is.
    pub severity: Severity,
    /// Human-readable description with the measured value.
    pub message: String,
}

/// Per-kind counters over a whole report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    /// Entries shorter than the minimum duration.
    pub short_durations: usize,
    /// Entries longer than the maximum duration.
    pub long_durations: usize,
    /// Entries over the line budget.
    pub too_many_lines: usize,
    /// Entries with an over-wide line.
    pub long_lines: usize,
    /// Entries read faster than the limit.
    pub high_cps: usize,
    /// Empty entries.
    pub empty: usize,
    /// Suspiciously long pauses.
    pub long_pauses: usize,
}

/// Full validation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of entries examined.
    pub total_entries: usize,
    /// All findings, in timeline order.
    pub problems: Vec<Problem>,
    /// Per-kind counters.
    pub stats: ValidationStats,
}

impl ValidationReport {
    /// Check whether anything was reported.
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }
}

/// Scan a timeline against the given limits.
pub fn validate(timeline: &Timeline, limits: &ValidationLimits) -> ValidationReport {
    let mut problems = Vec::new();
    let mut stats = ValidationStats::default();
    let mut previous_end: Option<f64> = None;

    for (i, entry) in timeline.entries().iter().enumerate() {
        let index = i + 1;
        let duration = entry.duration();
        let text = entry.text();

        if duration < limits.min_duration {
            stats.short_durations += 1;
            problems.push(Problem {
                index,
                kind: ProblemKind::ShortDuration,
                severity: Severity::Warning,
                message: format!(
                    "duration {duration:.1}s below minimum {:.1}s",
                    limits.min_duration
                ),
            });
        }
        if duration > limits.max_duration {
            stats.long_durations += 1;
            let severity = if duration > limits.max_duration * 1.5 {
                Severity::Error
            } else {
                Severity::Warning
            };
            problems.push(Problem {
                index,
                kind: ProblemKind::LongDuration,
                severity,
                message: format!(
                    "duration {duration:.1}s above maximum {:.1}s",
                    limits.max_duration
                ),
            });
        }

        let lines: Vec<&str> = text.lines().collect();
        if lines.len() > limits.max_lines {
            stats.too_many_lines += 1;
            problems.push(Problem {
                index,
                kind: ProblemKind::TooManyLines,
                severity: Severity::Error,
                message: format!("{} lines (maximum {})", lines.len(), limits.max_lines),
            });
        }

        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if widest > limits.warn_chars {
            stats.long_lines += 1;
            let severity = if widest > 50 { Severity::Error } else { Severity::Warning };
            problems.push(Problem {
                index,
                kind: ProblemKind::LongLine,
                severity,
                message: format!(
                    "line of {widest} chars (ideal {}, maximum {})",
                    limits.ideal_chars, limits.max_chars
                ),
            });
        }

        let visible_chars = text.chars().filter(|c| *c != '\n').count();
        let cps = if duration > 0.0 {
            visible_chars as f64 / duration
        } else {
            0.0
        };
        if cps > limits.max_cps {
            stats.high_cps += 1;
            let severity = if cps > limits.max_cps * 1.2 {
                Severity::Error
            } else {
                Severity::Warning
            };
            problems.push(Problem {
                index,
                kind: ProblemKind::HighCps,
                severity,
                message: format!(
                    "{cps:.1} chars/s (ideal {:.0}, maximum {:.0})",
                    limits.ideal_cps, limits.max_cps
                ),
            });
        }

        if text.trim().is_empty() {
            stats.empty += 1;
            problems.push(Problem {
                index,
                kind: ProblemKind::Empty,
                severity: Severity::Error,
                message: "empty entry".to_string(),
            });
        }

        if let Some(prev_end) = previous_end {
            let gap = entry.start - prev_end;
            if gap < 0.0 {
                problems.push(Problem {
                    index,
                    kind: ProblemKind::Overlap,
                    severity: Severity::Error,
                    message: format!("overlaps previous entry by {:.2}s", -gap),
                });
            } else if gap < limits.min_gap {
                problems.push(Problem {
                    index,
                    kind: ProblemKind::GapTooSmall,
                    severity: Severity::Warning,
                    message: format!(
                        "gap of {:.0}ms (minimum {:.0}ms)",
                        gap * 1000.0,
                        limits.min_gap * 1000.0
                    ),
                });
            } else if gap > limits.long_pause {
                stats.long_pauses += 1;
                let severity = if gap > 60.0 { Severity::Error } else { Severity::Info };
                problems.push(Problem {
                    index,
                    kind: ProblemKind::LongPause,
                    severity,
                    message: format!("{gap:.1}s of silence before this entry"),
                });
            }
        }
        previous_end = Some(entry.end);
    }

    ValidationReport {
        total_entries: timeline.len(),
        problems,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_track_has_no_problems() {
        let timeline = Timeline::from_srt(
            "1\n00:00:01,000 --> 00:00:03,000\nHello there.\n\n2\n00:00:04,000 --> 00:00:06,500\nStill fine.\n",
        );
        let report = validate(&timeline, &ValidationLimits::default());
        assert!(!report.has_problems());
        assert_eq!(report.total_entries, 2);
    }

    #[test]
    fn test_duration_bounds() {
        let timeline = Timeline::from_srt(
            "1\n00:00:01,000 --> 00:00:01,400\nBlink.\n\n2\n00:00:02,000 --> 00:00:12,000\nLingers far far too long on screen.\n",
        );
        let report = validate(&timeline, &ValidationLimits::default());
        assert_eq!(report.stats.short_durations, 1);
        assert_eq!(report.stats.long_durations, 1);
        // 10s is past 1.5x the 6s maximum
        assert!(report
            .problems
            .iter()
            .any(|p| p.kind == ProblemKind::LongDuration && p.severity == Severity::Error));
    }

    #[test]
    fn test_line_budget_and_width() {
        let text = format!(
            "1\n00:00:01,000 --> 00:00:06,000\none\ntwo\nthree\n\n2\n00:00:07,000 --> 00:00:12,900\n{}\n",
            "x".repeat(48)
        );
        let report = validate(&Timeline::from_srt(&text), &ValidationLimits::default());
        assert_eq!(report.stats.too_many_lines, 1);
        assert_eq!(report.stats.long_lines, 1);
    }

    #[test]
    fn test_reading_speed() {
        let text = format!("1\n00:00:01,000 --> 00:00:02,100\n{}\n", "y".repeat(40));
        let report = validate(&Timeline::from_srt(&text), &ValidationLimits::default());
        assert_eq!(report.stats.high_cps, 1);
        assert!(report
            .problems
            .iter()
            .any(|p| p.kind == ProblemKind::HighCps && p.severity == Severity::Error));
    }

    #[test]
    fn test_gap_checks() {
        let timeline = Timeline::from_srt(
            "1\n00:00:01,000 --> 00:00:03,000\nFirst.\n\n2\n00:00:03,020 --> 00:00:05,000\nRight behind it.\n\n3\n00:00:40,000 --> 00:00:42,000\nMuch later.\n",
        );
        let report = validate(&timeline, &ValidationLimits::default());
        assert!(report.problems.iter().any(|p| p.kind == ProblemKind::GapTooSmall));
        assert!(report.problems.iter().any(|p| p.kind == ProblemKind::LongPause));
        assert_eq!(report.stats.long_pauses, 1);
    }

    #[test]
    fn test_overlap_detected() {
        let timeline = Timeline::from_srt(
            "1\n00:00:01,000 --> 00:00:04,000\nFirst.\n\n2\n00:00:03,000 --> 00:00:06,000\nToo eager.\n",
        );
        let report = validate(&timeline, &ValidationLimits::default());
        assert!(report
            .problems
            .iter()
            .any(|p| p.kind == ProblemKind::Overlap && p.severity == Severity::Error));
    }
}
