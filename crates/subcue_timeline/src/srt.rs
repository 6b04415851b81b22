// SPDX-License-Identifier: MIT OR Apache-2.0
//! SRT text format: timestamps, lenient parsing, renumbering serialization.

use crate::entry::Entry;

/// Parse a zero-padded `HH:MM:SS,mmm` timestamp into seconds.
pub fn parse_timestamp(s: &str) -> Option<f64> {
    let s = s.trim();
    let mut clock = s.split(':');
    let hours = parse_field(clock.next()?, 2)?;
    let minutes = parse_field(clock.next()?, 2)?;
    let sec_ms = clock.next()?;
    if clock.next().is_some() {
        return None;
    }
    let (secs, millis) = sec_ms.split_once(',')?;
    let secs = parse_field(secs, 2)?;
    let millis = parse_field(millis, 3)?;
    if minutes > 59 || secs > 59 {
        return None;
    }
    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + f64::from(secs) + f64::from(millis) / 1000.0)
}

/// Parse one zero-padded clock field of exactly `width` digits.
fn parse_field(s: &str, width: usize) -> Option<u32> {
    if s.len() != width || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Render seconds as a zero-padded `HH:MM:SS,mmm` timestamp.
///
/// Negative values are clamped to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Parse a `"start --> end"` time-range line.
///
/// Returns `None` for any malformed line, and for ranges whose end does not
/// come after the start.
pub fn parse_time_range(line: &str) -> Option<(f64, f64)> {
    let (start, end) = line.split_once("-->")?;
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    if end <= start {
        return None;
    }
    Some((start, end))
}

/// Parse SRT text into entries.
///
/// The parser is lenient by design: it splits on blank-line-delimited blocks,
/// accepts and ignores a leading numeric index line, and silently drops any
/// block without a valid time-range line followed by at least one text line.
/// It never fails outright; hopeless input simply yields no entries.
pub fn parse(text: &str) -> Vec<Entry> {
    let mut entries = Vec::new();

    for block in split_blocks(text) {
        let mut lines = block.iter().map(|l| l.trim()).peekable();

        // Optional index line, always regenerated on output
        if let Some(first) = lines.peek() {
            if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
                lines.next();
            }
        }

        let Some(range_line) = lines.next() else {
            continue;
        };
        let Some((start, end)) = parse_time_range(range_line) else {
            continue;
        };

        let text_lines: Vec<&str> = lines.filter(|l| !l.is_empty()).collect();
        if text_lines.is_empty() {
            continue;
        }

        entries.push(Entry::new(start, end, text_lines.join("\n")));
    }

    entries
}

/// Serialize entries back to SRT text.
///
/// Indices are renumbered 1..N regardless of what the source carried;
/// timestamps are clamped at zero by [`format_timestamp`].
pub fn serialize(entries: &[Entry]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n",
            i + 1,
            format_timestamp(entry.start),
            format_timestamp(entry.end),
            entry.text()
        ));
    }
    out
}

/// Split raw text into blocks separated by blank (or whitespace-only) lines.
fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello world.\n\n2\n00:00:04,000 --> 00:00:06,000\nSecond line.\n";

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:01,000"), Some(1.0));
        assert_eq!(parse_timestamp("01:02:03,450"), Some(3723.45));
        assert_eq!(parse_timestamp("bogus"), None);
        assert_eq!(parse_timestamp("00:99:00,000"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1.0), "00:00:01,000");
        assert_eq!(format_timestamp(3723.45), "01:02:03,450");
        assert_eq!(format_timestamp(2.5), "00:00:02,500");
        // Negative results clamp to zero
        assert_eq!(format_timestamp(-4.2), "00:00:00,000");
    }

    #[test]
    fn test_parse_basic() {
        let entries = parse(SAMPLE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].start, 1.0);
        assert_eq!(entries[0].end, 3.0);
        assert_eq!(entries[0].text(), "Hello world.");
        assert_eq!(entries[1].start, 4.0);
        assert_eq!(entries[1].text(), "Second line.");
    }

    #[test]
    fn test_parse_multiline_text() {
        let entries = parse("7\n00:00:01,000 --> 00:00:03,000\n- Who?\n- Me.\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text(), "- Who?\n- Me.");
    }

    #[test]
    fn test_parse_missing_index_line() {
        let entries = parse("00:00:01,000 --> 00:00:03,000\nNo index here.\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text(), "No index here.");
    }

    #[test]
    fn test_parse_drops_malformed_blocks() {
        let text = "1\n00:00:01,000 --> 00:00:03,000\nGood.\n\njust a stray line\n\n3\nnot a time range\ntext\n\n4\n00:00:09,000 --> 00:00:07,000\nInverted range.\n\n5\n00:00:10,000 --> 00:00:12,000\n";
        let entries = parse(text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text(), "Good.");
    }

    #[test]
    fn test_roundtrip_preserves_timing_and_text() {
        let entries = parse(SAMPLE);
        let rendered = serialize(&entries);
        let reparsed = parse(&rendered);
        assert_eq!(reparsed.len(), entries.len());
        for (a, b) in entries.iter().zip(reparsed.iter()) {
            assert!((a.start - b.start).abs() < 1e-9);
            assert!((a.end - b.end).abs() < 1e-9);
            assert_eq!(a.text(), b.text());
        }
    }

    #[test]
    fn test_serialize_renumbers() {
        let text = "41\n00:00:01,000 --> 00:00:03,000\nFirst.\n\n99\n00:00:04,000 --> 00:00:06,000\nSecond.\n";
        let rendered = serialize(&parse(text));
        assert!(rendered.starts_with("1\n"));
        assert!(rendered.contains("\n2\n"));
        assert!(!rendered.contains("41"));
    }
}
