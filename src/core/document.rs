//! Program Text
//!
//! Immutable program lines plus the normalizer that removes editor-only
//! decoration (display line numbers, CRLF endings) before interpretation.

use regex::Regex;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::OnceLock;

/// An immutable, 0-indexed sequence of program lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramText {
    lines: Vec<String>,
}

impl ProgramText {
    /// Split raw text into lines without any gutter handling
    pub fn new(text: &str) -> Self {
        Normalizer::default().normalize(text)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True when the program contains no non-blank line
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Lines surrounding `index`, each tagged with its own index.
    ///
    /// Used by the info panel to show where the selected point comes from.
    pub fn context(&self, index: usize, before: usize, after: usize) -> Vec<(usize, &str)> {
        if self.lines.is_empty() {
            return Vec::new();
        }
        let start = index.saturating_sub(before);
        let end = index.saturating_add(after).min(self.lines.len() - 1);
        (start..=end)
            .filter_map(|i| self.line(i).map(|l| (i, l)))
            .collect()
    }

    /// Join the lines back into a single text
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// How display line numbers were added in front of each line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Gutter {
    /// Lines are taken verbatim
    #[default]
    None,
    /// Drop a fixed number of leading characters from every line
    Fixed(usize),
    /// Strip a leading `12:` / `12 |` / `12 ` display number when present
    Auto,
}

/// Turns editor text into [`ProgramText`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    gutter: Gutter,
}

fn gutter_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\s*[:|]?\s?").ok())
        .as_ref()
}

impl FromStr for Gutter {
    type Err = String;

    /// Parses `none`, `auto` or a fixed width such as `6`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Gutter::None),
            "auto" => Ok(Gutter::Auto),
            other => other
                .parse::<usize>()
                .map(Gutter::Fixed)
                .map_err(|_| format!("invalid gutter '{}': expected none, auto or a width", s)),
        }
    }
}

impl TryFrom<String> for Gutter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Normalizer {
    pub fn new(gutter: Gutter) -> Self {
        Self { gutter }
    }

    pub fn normalize(&self, raw: &str) -> ProgramText {
        if raw.is_empty() {
            return ProgramText::default();
        }

        let lines = raw
            .split('\n')
            .map(|line| {
                let line = line.trim_end_matches('\r');
                let stripped = match self.gutter {
                    Gutter::None => line,
                    Gutter::Fixed(width) => match line.char_indices().nth(width) {
                        Some((idx, _)) => &line[idx..],
                        None => "",
                    },
                    Gutter::Auto => match gutter_regex().and_then(|re| re.find(line)) {
                        Some(m) => &line[m.end()..],
                        None => line,
                    },
                };
                stripped.trim_end().to_string()
            })
            .collect();

        ProgramText { lines }
    }
}

/// Normalize raw text with the given gutter convention
pub fn normalize(raw: &str, gutter: Gutter) -> ProgramText {
    Normalizer::new(gutter).normalize(raw)
}
