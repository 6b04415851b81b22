// SPDX-License-Identifier: MIT OR Apache-2.0
//! Linguistically-aware line rewrapping for subtitle text.
//!
//! [`ReflowEngine::reflow`] rewraps a subtitle's text to fit a line/width
//! budget while keeping linguistic units intact: fixed phrases never split
//! across lines, ellipses and abbreviations stay glued to the word before
//! them, and short or connective words never start a continuation line.

use serde::{Deserialize, Serialize};

/// Marker substituted for spaces inside units that must not break.
const NBSP: char = '\u{00A0}';

/// Word lists and character sets driving the reflow rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflowConfig {
    /// Multi-word phrases kept on a single line (e.g. proper names).
    #[serde(default)]
    pub protected_phrases: Vec<String>,
    /// Abbreviations glued onto the word before them.
    #[serde(default = "default_abbreviations")]
    pub abbreviations: Vec<String>,
    /// Unit suffixes (percent, measurements) glued onto the number before them.
    #[serde(default = "default_unit_suffixes")]
    pub unit_suffixes: Vec<String>,
    /// Words too weak to begin a continuation line.
    #[serde(default = "default_weak_leading_words")]
    pub weak_leading_words: Vec<String>,
    /// Closing punctuation that must not begin a continuation line.
    #[serde(default = "default_closing_punctuation")]
    pub closing_punctuation: String,
}

fn default_abbreviations() -> Vec<String> {
    ["Jr.", "Sr.", "Inc.", "etc.", "a.m.", "p.m."]
        .map(String::from)
        .to_vec()
}

fn default_unit_suffixes() -> Vec<String> {
    ["%", "km", "m", "cm", "mm", "kg", "g", "ml", "mph", "km/h"]
        .map(String::from)
        .to_vec()
}

fn default_weak_leading_words() -> Vec<String> {
    ["a", "an", "the", "and", "but", "or", "nor", "of", "to", "at", "in", "on", "by"]
        .map(String::from)
        .to_vec()
}

fn default_closing_punctuation() -> String {
    ")]},.;:!?\"'".to_string()
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            protected_phrases: Vec::new(),
            abbreviations: default_abbreviations(),
            unit_suffixes: default_unit_suffixes(),
            weak_leading_words: default_weak_leading_words(),
            closing_punctuation: default_closing_punctuation(),
        }
    }
}

/// Rewraps subtitle text under line and width constraints.
#[derive(Debug, Clone, Default)]
pub struct ReflowEngine {
    config: ReflowConfig,
}

impl ReflowEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: ReflowConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    /// Rewrap `text` into at most `max_lines` lines of at most `max_chars`
    /// characters each.
    ///
    /// Pure and deterministic. Blank or whitespace-only input is returned
    /// unchanged. A single token longer than `max_chars` occupies its own
    /// line uncut. Repeated application is not guaranteed to be stable:
    /// when the greedy wrap exceeds the line budget the token list is
    /// rebalanced by count, and a rebalanced result may wrap differently
    /// on a second pass.
    pub fn reflow(&self, text: &str, max_lines: usize, max_chars: usize) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let max_lines = max_lines.max(1);

        let normalized = normalize(text);
        let protected = self.protect_phrases(&normalized);
        let tokens = self.tokenize(&protected);

        let mut lines = greedy_pack(&tokens, max_chars);
        if lines.len() > max_lines {
            lines = rebalance(&tokens, max_lines);
        }
        self.eliminate_orphans(&mut lines);

        let restored: Vec<String> = lines.iter().map(|l| l.replace(NBSP, " ")).collect();
        restored.join("\n")
    }

    /// Substitute the internal spaces of protected phrases so the tokenizer
    /// treats each phrase as one unit.
    fn protect_phrases(&self, text: &str) -> String {
        let mut out = text.to_string();
        for phrase in &self.config.protected_phrases {
            if phrase.contains(' ') && out.contains(phrase.as_str()) {
                let glued = phrase.replace(' ', &NBSP.to_string());
                out = out.replace(phrase.as_str(), &glued);
            }
        }
        out
    }

    /// Split on spaces, then glue ellipses, abbreviations and unit suffixes
    /// onto the token before them. Hyphenated compounds are already single
    /// tokens.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for raw in text.split(' ').filter(|t| !t.is_empty()) {
            if let Some(prev) = tokens.last_mut() {
                if is_ellipsis(raw) {
                    prev.push_str(raw);
                    continue;
                }
                if self.config.abbreviations.iter().any(|a| a == raw) {
                    prev.push(NBSP);
                    prev.push_str(raw);
                    continue;
                }
                if self.config.unit_suffixes.iter().any(|u| u == raw) {
                    prev.push(NBSP);
                    prev.push_str(raw);
                    continue;
                }
            }
            tokens.push(raw.to_string());
        }
        tokens
    }

    /// Merge orphan continuation lines into the line above, repeating until
    /// nothing changes.
    fn eliminate_orphans(&self, lines: &mut Vec<String>) {
        loop {
            let mut changed = false;
            let mut i = 1;
            while i < lines.len() {
                if self.is_orphan(&lines[i]) {
                    let orphan = lines.remove(i);
                    lines[i - 1].push(' ');
                    lines[i - 1].push_str(&orphan);
                    changed = true;
                } else {
                    i += 1;
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn is_orphan(&self, line: &str) -> bool {
        if line.chars().count() <= 2 {
            return true;
        }
        if line
            .chars()
            .next()
            .is_some_and(|c| self.config.closing_punctuation.contains(c))
        {
            return true;
        }
        let first_word = line.split([' ', NBSP]).next().unwrap_or("");
        self.config
            .weak_leading_words
            .iter()
            .any(|w| w.eq_ignore_ascii_case(first_word))
    }
}

/// Collapse whitespace, unify ellipsis variants to `"..."` and tighten
/// punctuation spacing.
fn normalize(text: &str) -> String {
    let mut s = text.replace('\u{2026}', "...");

    // All whitespace runs become single spaces
    s = s.split_whitespace().collect::<Vec<_>>().join(" ");

    // Spaced-out dots fuse into one run, then long runs settle at three
    while s.contains(". .") {
        s = s.replace(". .", "..");
    }
    while s.contains("....") {
        s = s.replace("....", "...");
    }

    tighten_punctuation(&s)
}

/// Remove spaces before closing punctuation and guarantee one space after
/// clause punctuation.
///
/// Ellipses keep a preceding space here so the tokenizer can glue them onto
/// the word before them; digit pairs around `,` and `:` (decimals, clock
/// times) are left untouched.
fn tighten_punctuation(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());

    for i in 0..chars.len() {
        let c = chars[i];
        if !",.;:!?".contains(c) {
            out.push(c);
            continue;
        }

        if !(c == '.' && dot_run_len(&chars, i) >= 3) {
            while out.ends_with(' ') {
                out.pop();
            }
        }
        out.push(c);

        if ",;:!?".contains(c) {
            if let Some(&next) = chars.get(i + 1) {
                let prev_digit = out.chars().rev().nth(1).is_some_and(|p| p.is_ascii_digit());
                let numeric_pair = matches!(c, ',' | ':') && prev_digit && next.is_ascii_digit();
                if next.is_alphanumeric() && !numeric_pair {
                    out.push(' ');
                }
            }
        }
    }

    out
}

/// Length of the run of consecutive dots containing position `i`.
fn dot_run_len(chars: &[char], i: usize) -> usize {
    let mut start = i;
    while start > 0 && chars[start - 1] == '.' {
        start -= 1;
    }
    let mut end = i;
    while end + 1 < chars.len() && chars[end + 1] == '.' {
        end += 1;
    }
    end - start + 1
}

fn is_ellipsis(token: &str) -> bool {
    token.chars().count() >= 3 && token.chars().all(|c| c == '.')
}

/// Pack tokens into lines greedily while they fit the width budget.
fn greedy_pack(tokens: &[String], max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for token in tokens {
        if current.is_empty() {
            current = token.clone();
        } else if current.chars().count() + 1 + token.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(token);
        } else {
            lines.push(std::mem::take(&mut current));
            current = token.clone();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Split the flat token list into at most `max_lines` equally-counted chunks.
fn rebalance(tokens: &[String], max_lines: usize) -> Vec<String> {
    let chunk = tokens.len().div_ceil(max_lines).max(1);
    tokens.chunks(chunk).map(|c| c.join(" ")).collect()
}
