//! Program Registry
//!
//! In-memory catalog of main programs and subprograms, filled from the
//! bundled examples and from program directories.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::schema::{Program, ProgramKind, ProgramSource};

const BUILT_IN_PROGRAMS: [(&str, &str); 4] = [
    (
        "EXAMPLE1.MPF",
        include_str!("../../resources/programs/EXAMPLE1.MPF"),
    ),
    (
        "EXAMPLE2.MPF",
        include_str!("../../resources/programs/EXAMPLE2.MPF"),
    ),
    ("SUB1.SPF", include_str!("../../resources/programs/SUB1.SPF")),
    ("SUB2.SPF", include_str!("../../resources/programs/SUB2.SPF")),
];

/// Catalog of programs keyed by upper-cased file name
#[derive(Debug, Clone, Default)]
pub struct ProgramCatalog {
    programs: BTreeMap<String, Program>,
    active: Option<String>,
}

impl ProgramCatalog {
    pub fn new() -> Self {
        Self {
            programs: BTreeMap::new(),
            active: None,
        }
    }

    /// A catalog holding the bundled example programs
    pub fn with_examples() -> Self {
        let mut catalog = Self::new();
        catalog.add_embedded_examples();
        catalog
    }

    /// Add the bundled example programs
    pub fn add_embedded_examples(&mut self) {
        for (name, content) in BUILT_IN_PROGRAMS {
            if let Some(program) = Program::new(name, content.to_string(), ProgramSource::BuiltIn) {
                self.add_program(program);
            }
        }
    }

    /// Add a program unless an entry from a higher-priority source exists.
    ///
    /// Returns whether the program was stored.
    pub fn add_program(&mut self, program: Program) -> bool {
        let should_add = match self.programs.get(&program.name) {
            Some(existing) => program.source >= existing.source,
            None => true,
        };
        if should_add {
            log::debug!("catalog: added {} ({:?})", program.name, program.source);
            self.programs.insert(program.name.clone(), program);
        }
        should_add
    }

    /// Load every `.MPF` / `.SPF` file in `dir`; returns how many were added.
    ///
    /// A missing directory adds nothing. Files that cannot be read are
    /// logged and skipped.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read program directory: {}", dir.display()))?;

        let mut added = 0;
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if ProgramKind::from_file_name(name).is_none() {
                continue;
            }

            match load_program_file(&path) {
                Ok(program) => {
                    if self.add_program(program) {
                        added += 1;
                    }
                }
                Err(e) => log::error!("Failed to load program file {}: {:#}", path.display(), e),
            }
        }

        log::info!("Loaded {} programs from {}", added, dir.display());
        Ok(added)
    }

    /// Look up a program by file name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&Program> {
        self.programs.get(&name.to_uppercase())
    }

    pub fn main_programs(&self) -> impl Iterator<Item = &Program> {
        self.programs
            .values()
            .filter(|p| p.kind == ProgramKind::Main)
    }

    pub fn sub_programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.values().filter(|p| p.kind == ProgramKind::Sub)
    }

    /// First main program by name; the one opened when nothing is selected
    pub fn first_main(&self) -> Option<&Program> {
        self.main_programs().next()
    }

    /// Number of main programs and subprograms
    pub fn counts(&self) -> (usize, usize) {
        (self.main_programs().count(), self.sub_programs().count())
    }

    pub fn summary(&self) -> String {
        let (main, sub) = self.counts();
        format!("Loaded {} MPF and {} SPF", main, sub)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Select the program to work on
    pub fn set_active(&mut self, name: &str) -> bool {
        let key = name.to_uppercase();
        if self.programs.contains_key(&key) {
            self.active = Some(key);
            true
        } else {
            false
        }
    }

    /// The selected program, falling back to the first main program
    pub fn active(&self) -> Option<&Program> {
        self.active
            .as_ref()
            .and_then(|name| self.programs.get(name))
            .or_else(|| self.first_main())
    }
}

/// Read a single program file from disk
pub fn load_program_file(path: &Path) -> Result<Program> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid program file name: {}", path.display()))?;
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read program file: {}", path.display()))?;
    // Controller exports are not always UTF-8
    let content = String::from_utf8_lossy(&bytes).into_owned();

    let mut program = Program::new(name, content, ProgramSource::Directory)
        .with_context(|| format!("Not an .MPF or .SPF program: {}", path.display()))?;
    program.source_path = Some(path.to_path_buf());
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_are_bundled() {
        let catalog = ProgramCatalog::with_examples();
        assert_eq!(catalog.counts(), (2, 2));
        assert_eq!(catalog.summary(), "Loaded 2 MPF and 2 SPF");
        assert_eq!(
            catalog.first_main().map(|p| p.name.as_str()),
            Some("EXAMPLE1.MPF")
        );
        assert!(catalog.get("sub2.spf").is_some());
    }

    #[test]
    fn test_active_program_selection() {
        let mut catalog = ProgramCatalog::with_examples();
        assert_eq!(catalog.active().map(|p| p.name.as_str()), Some("EXAMPLE1.MPF"));

        assert!(catalog.set_active("example2.mpf"));
        assert_eq!(catalog.active().map(|p| p.name.as_str()), Some("EXAMPLE2.MPF"));

        assert!(!catalog.set_active("MISSING.MPF"));
        assert_eq!(catalog.active().map(|p| p.name.as_str()), Some("EXAMPLE2.MPF"));
    }

    #[test]
    fn test_built_in_does_not_override_directory_program() {
        let mut catalog = ProgramCatalog::new();
        let from_disk =
            Program::new("EXAMPLE1.MPF", "G0 X1".to_string(), ProgramSource::Directory).unwrap();
        assert!(catalog.add_program(from_disk));

        catalog.add_embedded_examples();
        assert_eq!(catalog.get("EXAMPLE1.MPF").unwrap().content, "G0 X1");
    }

    #[test]
    fn test_missing_directory_adds_nothing() {
        let mut catalog = ProgramCatalog::new();
        let added = catalog
            .load_dir(Path::new("/definitely/not/a/program/dir"))
            .unwrap();
        assert_eq!(added, 0);
        assert!(catalog.is_empty());
    }
}
