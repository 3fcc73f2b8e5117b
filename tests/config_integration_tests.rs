//! Project file discovery and merging with command-line arguments
use clap::Parser;
use sinumerik_toolpath::config::{Args, Config, OutputFormat, ProjectFile, PROJECT_FILE_NAME};
use sinumerik_toolpath::Gutter;
use std::fs;

#[test]
fn test_discover_project_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(PROJECT_FILE_NAME),
        "program_dirs = [\"programs\"]\ngutter = \"4\"\nformat = \"json\"\n",
    )
    .unwrap();

    let project = ProjectFile::discover(dir.path())
        .expect("read project file")
        .expect("project file present");
    assert_eq!(project.program_dirs, vec![dir.path().join("programs")]);

    let config = Config::from_parts(Args::parse_from(["mpf-sim"]), Some(project)).unwrap();
    assert_eq!(config.gutter, Gutter::Fixed(4));
    assert_eq!(config.format, OutputFormat::Json);
    assert!(config.program_dirs.contains(&dir.path().join("programs")));
}

#[test]
fn test_no_project_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ProjectFile::discover(dir.path()).unwrap().is_none());
}

#[test]
fn test_invalid_project_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(PROJECT_FILE_NAME);
    fs::write(&path, "gutter = [").unwrap();

    let err = ProjectFile::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains(PROJECT_FILE_NAME));
}

#[test]
fn test_invalid_gutter_in_project_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(PROJECT_FILE_NAME);
    fs::write(&path, "gutter = \"wide\"\n").unwrap();

    let args = Args::parse_from(["mpf-sim", "--project", path.to_str().unwrap()]);
    let err = Config::from_args(args).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid gutter 'wide'"));
}

#[test]
fn test_explicit_project_argument() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shop.toml");
    fs::write(&path, "spindle_preset = 320.0\n").unwrap();

    let args = Args::parse_from(["mpf-sim", "--project", path.to_str().unwrap()]);
    let config = Config::from_args(args).unwrap();
    assert_eq!(config.spindle_preset, 320.0);
}
