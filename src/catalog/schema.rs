//! Program Catalog Types
//!
//! Programs known to the catalog and the short descriptive metadata shown
//! next to subprogram names.

use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Subprogram header lines scanned for tool and correction numbers
const HEADER_LINES: usize = 15;

/// Main program or subprogram, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramKind {
    /// `.MPF`
    Main,
    /// `.SPF`
    Sub,
}

impl ProgramKind {
    /// Classify a file name; `None` for anything that is not a program
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?;
        if extension.eq_ignore_ascii_case("mpf") {
            Some(ProgramKind::Main)
        } else if extension.eq_ignore_ascii_case("spf") {
            Some(ProgramKind::Sub)
        } else {
            None
        }
    }
}

/// Where a catalog entry came from; later sources override earlier ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramSource {
    BuiltIn = 0,
    Directory = 1,
}

/// A program held by the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Upper-cased file name, e.g. `EXAMPLE1.MPF`
    pub name: String,
    pub kind: ProgramKind,
    pub content: String,
    pub source: ProgramSource,
    pub source_path: Option<PathBuf>,
}

impl Program {
    /// Build a program from a file name; `None` if the name is not `.MPF`/`.SPF`
    pub fn new(name: &str, content: String, source: ProgramSource) -> Option<Self> {
        let kind = ProgramKind::from_file_name(name)?;
        Some(Self {
            name: name.to_uppercase(),
            kind,
            content,
            source,
            source_path: None,
        })
    }

    /// Subprogram metadata; main programs carry none
    pub fn info(&self) -> Option<SubprogramInfo> {
        match self.kind {
            ProgramKind::Sub => Some(SubprogramInfo::extract(&self.content)),
            ProgramKind::Main => None,
        }
    }
}

/// Tool, correction and notes from a subprogram header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubprogramInfo {
    pub tool_number: Option<u32>,
    pub correction_number: Option<u32>,
    /// Comment following the correction word
    pub note: Option<String>,
    /// Comment on the second line of the file
    pub second_note: Option<String>,
}

struct HeaderPatterns {
    tool: Regex,
    correction: Regex,
}

fn header_patterns() -> Option<&'static HeaderPatterns> {
    static PATTERNS: OnceLock<Option<HeaderPatterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(HeaderPatterns {
                tool: Regex::new(r"\bT(\d+)").ok()?,
                correction: Regex::new(r"\bD(\d+)\s*;(.+)").ok()?,
            })
        })
        .as_ref()
}

impl SubprogramInfo {
    pub fn extract(content: &str) -> Self {
        let mut info = SubprogramInfo::default();
        let lines: Vec<&str> = content.lines().collect();

        if let Some(second) = lines.get(1).map(|l| l.trim()) {
            if let Some(note) = second.strip_prefix(';') {
                info.second_note = non_empty(note);
            }
        }

        let Some(patterns) = header_patterns() else {
            return info;
        };

        for line in lines.iter().take(HEADER_LINES) {
            let line = line.trim();
            let code = line.split(';').next().unwrap_or_default();

            if info.tool_number.is_none() {
                info.tool_number = patterns
                    .tool
                    .captures(code)
                    .and_then(|c| c.get(1)?.as_str().parse().ok());
            }

            if info.correction_number.is_none() {
                if let Some(captures) = patterns.correction.captures(line) {
                    info.correction_number =
                        captures.get(1).and_then(|m| m.as_str().parse().ok());
                    info.note = captures.get(2).and_then(|m| non_empty(m.as_str()));
                }
            }

            if info.tool_number.is_some() && info.correction_number.is_some() {
                break;
            }
        }

        info
    }

    /// One-line label such as `T3 D1 ; RADIUS NOZE=8`
    pub fn label(&self) -> Option<String> {
        let tool = self.tool_number?;
        let mut label = format!("T{}", tool);
        if let Some(correction) = self.correction_number {
            label.push_str(&format!(" D{}", correction));
        }
        if let Some(note) = &self.note {
            label.push_str(&format!(" ; {}", note));
        }
        Some(label)
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
