//! Sinumerik Turning Toolpath
//!
//! Interprets Siemens Sinumerik turning programs (`.MPF` main programs and
//! `.SPF` subprograms) into an ordered toolpath with machining time.
//!
//! This library provides:
//! - Program text normalization and line parsing
//! - A modal-state interpreter with R-parameters and arithmetic
//! - Toolpath bounds and machining time estimation
//! - A catalog of bundled and on-disk programs

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod interpreter;
pub mod parser;
pub mod timing;
pub mod toolpath;

pub use catalog::{Program, ProgramCatalog, ProgramKind, SubprogramInfo};
pub use config::Config;
pub use crate::core::{Diagnostic, Diagnostics, Gutter, ProgramText, Severity};
pub use interpreter::{
    interpret, interpret_program, interpret_with, InterpreterOptions, InterpreterSession,
    Playback, PointInfo,
};
pub use parser::{parse_line, ParsedLine};
pub use timing::MachiningTime;
pub use toolpath::{Bounds, Motion, PositioningMode, Toolpath, ToolpathPoint};
