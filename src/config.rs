//! Configuration management for the `mpf-sim` tool.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional `.mpf-sim.toml` project file
//! - Program directory configuration

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::Gutter;

/// Name of the per-project settings file
pub const PROJECT_FILE_NAME: &str = ".mpf-sim.toml";

/// Command-line arguments for the turning-program simulator
#[derive(Debug, Parser)]
#[command(name = "mpf-sim")]
#[command(about = "Interpret Sinumerik turning programs and report the toolpath")]
#[command(version)]
pub struct Args {
    /// Program files to interpret
    pub files: Vec<PathBuf>,

    /// Additional directory containing .MPF / .SPF programs
    #[arg(long, help = "Directory containing .MPF and .SPF programs")]
    pub program_dir: Option<PathBuf>,

    /// Interpret a program from the catalog by name
    #[arg(long, help = "Catalog program to interpret (e.g., 'EXAMPLE1.MPF')")]
    pub example: Option<String>,

    /// List the catalog and exit
    #[arg(long)]
    pub list: bool,

    /// Display line-number gutter to strip from pasted text
    #[arg(long, help = "Gutter to strip: none, auto or a fixed width")]
    pub gutter: Option<Gutter>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Show details for the point at this index
    #[arg(long, alias = "step")]
    pub point: Option<usize>,

    /// Step through every point in order
    #[arg(long)]
    pub play: bool,

    /// Re-run whenever the input file changes
    #[arg(long)]
    pub watch: bool,

    /// Save the (normalized) program text to this path
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Spindle speed in effect before the program sets one
    #[arg(long, help = "Initial spindle speed preset")]
    pub spindle: Option<f64>,

    /// Explicit project settings file
    #[arg(long, help = "Project settings file (default: ./.mpf-sim.toml)")]
    pub project: Option<PathBuf>,

    /// Log level
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// How results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of `.mpf-sim.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectFile {
    pub program_dirs: Vec<PathBuf>,
    pub gutter: Option<Gutter>,
    pub spindle_preset: Option<f64>,
    pub format: Option<OutputFormat>,
}

impl ProjectFile {
    /// Parse project settings from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project settings")
    }

    /// Load project settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;
        let mut project = Self::parse(&content)
            .with_context(|| format!("Invalid project file: {}", path.display()))?;

        // Relative program directories are relative to the project file
        if let Some(base) = path.parent() {
            for dir in &mut project.program_dirs {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }

        Ok(project)
    }

    /// Look for `.mpf-sim.toml` in `dir`
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(PROJECT_FILE_NAME);
        if path.is_file() {
            log::debug!("Using project file {}", path.display());
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub files: Vec<PathBuf>,
    /// Program directories, loaded in order; later ones override earlier ones
    pub program_dirs: Vec<PathBuf>,
    pub example: Option<String>,
    pub list: bool,
    pub gutter: Gutter,
    pub format: OutputFormat,
    pub point: Option<usize>,
    pub play: bool,
    pub watch: bool,
    pub save: Option<PathBuf>,
    pub spindle_preset: f64,
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments and the project file
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, discovering the project file
    pub fn from_args(args: Args) -> Result<Self> {
        let project = match &args.project {
            Some(path) => Some(ProjectFile::load(path)?),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                ProjectFile::discover(&cwd)?
            }
        };
        Self::from_parts(args, project)
    }

    /// Merge arguments over project settings (useful for testing)
    pub fn from_parts(args: Args, project: Option<ProjectFile>) -> Result<Self> {
        let project = project.unwrap_or_default();

        let mut program_dirs = Vec::new();

        // Default user config directory has the lowest priority
        if let Some(config_dir) = dirs::config_dir() {
            program_dirs.push(config_dir.join("mpf-sim").join("programs"));
        }
        program_dirs.extend(project.program_dirs);
        if let Some(custom_dir) = args.program_dir {
            program_dirs.push(custom_dir);
        }

        Ok(Config {
            files: args.files,
            program_dirs,
            example: args.example,
            list: args.list,
            gutter: args.gutter.or(project.gutter).unwrap_or_default(),
            format: args.format.or(project.format).unwrap_or_default(),
            point: args.point,
            play: args.play,
            watch: args.watch,
            save: args.save,
            spindle_preset: args.spindle.or(project.spindle_preset).unwrap_or(0.0),
            log_level: args.log_level,
        })
    }
}
