//! Interpretation Diagnostics
//!
//! Per-line findings collected while a program is interpreted. Nothing in
//! here is fatal: the interpreter keeps going and reports what it skipped.

use serde::Serialize;
use std::fmt;

/// Severity of a diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic attached to a source line (0-based)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "line {}: {}: {}", self.line + 1, label, self.message)
    }
}

/// Ordered diagnostics for one interpretation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn add_error(&mut self, line: usize, message: String) {
        log::warn!("line {}: {}", line + 1, message);
        self.items.push(Diagnostic {
            line,
            message,
            severity: Severity::Error,
        });
    }

    pub fn add_warning(&mut self, line: usize, message: String) {
        log::warn!("line {}: {}", line + 1, message);
        self.items.push(Diagnostic {
            line,
            message,
            severity: Severity::Warning,
        });
    }

    /// True when no diagnostic has `Error` severity
    pub fn is_clean(&self) -> bool {
        !self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Diagnostics reported for a single source line
    pub fn for_line(&self, line: usize) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.line == line)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
