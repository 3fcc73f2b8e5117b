//! Core Program Types
//!
//! Program text handling and the diagnostics collected while interpreting it.

pub mod diagnostics;
pub mod document;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use document::{normalize, Gutter, Normalizer, ProgramText};
