//! Program catalog loading from directories and saving
use sinumerik_toolpath::catalog::{
    load_program_file, save_program, ProgramCatalog, ProgramKind, ProgramSource,
};
use std::fs;
use tempfile::TempDir;

fn program_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("SHAFT.MPF"), "N10 G0 X0 Z0\nN20 G1 X5 F0.1\n").unwrap();
    fs::write(
        dir.path().join("finish.spf"),
        "MSG(\"FINISH\")\n; OUTER DIAMETER\nN08 T7\n    D2 ; RADIUS 0.4\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a program").unwrap();
    dir
}

#[test]
fn test_load_dir_adds_programs_only() {
    let dir = program_dir();
    let mut catalog = ProgramCatalog::new();

    let added = catalog.load_dir(dir.path()).expect("load programs");
    assert_eq!(added, 2);
    assert_eq!(catalog.counts(), (1, 1));

    let shaft = catalog.get("shaft.mpf").expect("main program");
    assert_eq!(shaft.kind, ProgramKind::Main);
    assert_eq!(shaft.source, ProgramSource::Directory);
    assert_eq!(shaft.source_path.as_deref(), Some(dir.path().join("SHAFT.MPF").as_path()));
}

#[test]
fn test_directory_programs_join_bundled_examples() {
    let dir = program_dir();
    let mut catalog = ProgramCatalog::with_examples();
    catalog.load_dir(dir.path()).expect("load programs");

    assert_eq!(catalog.summary(), "Loaded 3 MPF and 3 SPF");
    let names: Vec<&str> = catalog.sub_programs().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["FINISH.SPF", "SUB1.SPF", "SUB2.SPF"]);
}

#[test]
fn test_directory_program_overrides_bundled_one() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("EXAMPLE1.MPF"), "G0 X1 Z1").unwrap();

    let mut catalog = ProgramCatalog::with_examples();
    catalog.load_dir(dir.path()).unwrap();
    assert_eq!(catalog.get("EXAMPLE1.MPF").unwrap().content, "G0 X1 Z1");
    assert_eq!(catalog.counts(), (2, 2));
}

#[test]
fn test_subprogram_metadata_from_disk() {
    let dir = program_dir();
    let program = load_program_file(&dir.path().join("finish.spf")).unwrap();
    let info = program.info().expect("subprogram info");

    assert_eq!(info.tool_number, Some(7));
    assert_eq!(info.correction_number, Some(2));
    assert_eq!(info.note.as_deref(), Some("RADIUS 0.4"));
    assert_eq!(info.second_note.as_deref(), Some("OUTER DIAMETER"));
}

#[test]
fn test_non_utf8_program_is_read_lossily() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("LEGACY.MPF");
    fs::write(&path, b"; KOMENT \xe9\nG0 X1 Z1\n").unwrap();

    let program = load_program_file(&path).unwrap();
    assert!(program.content.contains("G0 X1 Z1"));
}

#[test]
fn test_save_is_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.mpf");
    let text = "N10 G0 X0 Z0 ; start\r\n\n  N20 G1 X5   \n";

    save_program(&path, text).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_save_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("program.mpf");
    let err = save_program(&path, "G0 X0").unwrap_err();
    assert!(err.to_string().contains("Failed to save program"));
}
