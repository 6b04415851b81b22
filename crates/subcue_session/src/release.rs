// SPDX-License-Identifier: MIT OR Apache-2.0
//! Release metadata recovered from media filenames.
//!
//! Scene-style filenames carry the source, resolution, codec, year and
//! release group of a rip. Those details decide which catalog subtitles
//! will line up with the media, so they feed version metadata and catalog
//! search terms.

use serde::{Deserialize, Serialize};

/// Rip source, in detection priority order.
const SOURCES: [(&str, &[&str]); 9] = [
    ("BluRay", &["BLURAY", "BLU-RAY", "BDRIP", "BRRIP", "BD"]),
    ("WEB-DL", &["WEB-DL", "WEBDL", "WEB.DL"]),
    ("WEBRip", &["WEBRIP", "WEB-RIP", "WEB RIP"]),
    ("WEB", &["WEB"]),
    ("HDTV", &["HDTV", "HD-TV"]),
    ("DVDRip", &["DVDRIP", "DVD-RIP"]),
    ("DVD", &["DVD"]),
    ("HDCAM", &["HDCAM", "HD-CAM"]),
    ("CAM", &["CAM", "CAMRIP", "HDTS", "TELESYNC", "TS"]),
];

const RESOLUTIONS: [&str; 6] = ["2160P", "4K", "1080P", "720P", "576P", "480P"];

const CODECS: [(&str, &[&str]); 4] = [
    ("HEVC", &["HEVC", "H.265", "H265", "X265"]),
    ("H.264", &["H.264", "H264", "X264", "AVC"]),
    ("VP9", &["VP9"]),
    ("AV1", &["AV1"]),
];

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "mkv", "avi", "webm", "mov", "flv", "wmv"];

/// Tokens after which a filename stops describing the title.
const QUALITY_MARKERS: [&str; 10] = [
    "720P", "1080P", "2160P", "4K", "BLURAY", "WEB-DL", "HDTV", "X264", "X265", "HEVC",
];

/// Release details detected from a media filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    /// Rip source (BluRay, WEB-DL, ...).
    pub source: Option<String>,
    /// Video resolution (1080p, ...).
    pub resolution: Option<String>,
    /// Video codec (HEVC, H.264, ...).
    pub codec: Option<String>,
    /// Release year.
    pub year: Option<u32>,
    /// Release group, from the trailing `-GROUP` convention.
    pub release_group: Option<String>,
}

impl ReleaseInfo {
    /// Detect release details from a video or subtitle filename.
    pub fn from_filename(filename: &str) -> Self {
        let upper = filename.to_uppercase();

        let source = SOURCES
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| upper.contains(p)))
            .map(|(name, _)| (*name).to_string());

        let resolution = RESOLUTIONS
            .iter()
            .find(|r| upper.contains(**r))
            .map(|r| r.replace('P', "p"));

        let codec = CODECS
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| upper.contains(p)))
            .map(|(name, _)| (*name).to_string());

        Self {
            source,
            resolution,
            codec,
            year: detect_year(filename),
            release_group: detect_release_group(filename),
        }
    }
}

/// Strip release decoration from a filename, leaving a searchable title.
pub fn clean_title(filename: &str) -> String {
    let mut name = filename.to_string();

    // Drop the video extension
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if VIDEO_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            name = stem.to_string();
        }
    }

    // Dots and underscores stand in for spaces in scene names
    name = name.replace(['.', '_'], " ");

    // The year and everything after it is release decoration
    if let Some((pos, _)) = find_year(&name) {
        name.truncate(pos);
    }

    // So are quality markers, wherever they appear
    let upper = name.to_uppercase();
    let cut = QUALITY_MARKERS
        .iter()
        .filter_map(|m| upper.find(*m))
        .min();
    if let Some(pos) = cut {
        name.truncate(pos);
    }

    name.trim().to_string()
}

/// Find a plausible release year (1900..=2030) in the text.
fn find_year(text: &str) -> Option<(usize, u32)> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 4 <= bytes.len() {
        if bytes[i..i + 4].iter().all(u8::is_ascii_digit) {
            let bounded_left = i == 0 || !bytes[i - 1].is_ascii_digit();
            let bounded_right = i + 4 == bytes.len() || !bytes[i + 4].is_ascii_digit();
            if bounded_left && bounded_right {
                if let Ok(year) = text[i..i + 4].parse::<u32>() {
                    if (1900..=2030).contains(&year) {
                        return Some((i, year));
                    }
                }
            }
        }
        i += 1;
    }
    None
}

fn detect_year(filename: &str) -> Option<u32> {
    find_year(filename).map(|(_, year)| year)
}

/// Release group: the alphanumeric run after the last dash, extension aside.
fn detect_release_group(filename: &str) -> Option<String> {
    let mut stem = filename;
    if let Some((prefix, ext)) = filename.rsplit_once('.') {
        if ext.chars().all(char::is_alphanumeric) && !ext.is_empty() {
            stem = prefix;
        }
    }
    let (_, group) = stem.rsplit_once('-')?;
    if !group.is_empty() && group.chars().all(char::is_alphanumeric) {
        Some(group.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_scene_name() {
        let info = ReleaseInfo::from_filename("The.Quiet.Harbor.2019.1080p.BluRay.x264-GECKOS.mkv");
        assert_eq!(info.source.as_deref(), Some("BluRay"));
        assert_eq!(info.resolution.as_deref(), Some("1080p"));
        assert_eq!(info.codec.as_deref(), Some("H.264"));
        assert_eq!(info.year, Some(2019));
        assert_eq!(info.release_group.as_deref(), Some("GECKOS"));
    }

    #[test]
    fn test_source_priority() {
        // WEB-DL wins over the bare WEB fallback
        let info = ReleaseInfo::from_filename("Show.S01E02.WEB-DL.HEVC.mkv");
        assert_eq!(info.source.as_deref(), Some("WEB-DL"));
        assert_eq!(info.codec.as_deref(), Some("HEVC"));
    }

    #[test]
    fn test_year_window() {
        assert_eq!(ReleaseInfo::from_filename("Movie.1899.mkv").year, None);
        assert_eq!(ReleaseInfo::from_filename("Movie.1900.mkv").year, Some(1900));
        assert_eq!(ReleaseInfo::from_filename("Movie.2030.mkv").year, Some(2030));
        // Five digits in a row are not a year
        assert_eq!(ReleaseInfo::from_filename("Movie.20305.mkv").year, None);
    }

    #[test]
    fn test_no_decoration() {
        let info = ReleaseInfo::from_filename("plain_recording.mp4");
        assert_eq!(info, ReleaseInfo::default());
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(
            clean_title("The.Quiet.Harbor.2019.1080p.BluRay.x264-GECKOS.mkv"),
            "The Quiet Harbor"
        );
        assert_eq!(clean_title("Late_Tide.mkv"), "Late Tide");
        assert_eq!(clean_title("Docu 1080p HDTV.mp4"), "Docu");
    }
}
