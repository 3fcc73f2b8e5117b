//! Program Catalog
//!
//! Bundled and on-disk programs, `.MPF`/`.SPF` classification and
//! subprogram header metadata. The catalog only produces text; it has no
//! motion logic of its own.

pub mod registry;
pub mod schema;

pub use registry::{load_program_file, ProgramCatalog};
pub use schema::{Program, ProgramKind, ProgramSource, SubprogramInfo};

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// File name used when saving text that has no name yet
pub const DEFAULT_SAVE_NAME: &str = "program.mpf";

/// Write the edited program text verbatim
pub fn save_program(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)
        .with_context(|| format!("Failed to save program: {}", path.display()))?;
    log::info!("Saved program to {}", path.display());
    Ok(())
}
