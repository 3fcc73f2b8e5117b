//! End-to-end interpreter behaviour on whole programs
use sinumerik_toolpath::{
    interpret, interpret_with, InterpreterOptions, Motion, PositioningMode, ProgramCatalog,
    Severity,
};

const SCENARIO: &str = "G0 X0 Z0\nG1 X10 Z0 F100\nG1 X10 Z-20\nG0 X50 Z50";

fn coords(text: &str) -> Vec<(f64, f64)> {
    interpret(text).points().iter().map(|p| (p.x, p.z)).collect()
}

#[test]
fn test_scenario_native_and_screen_frames() {
    let session = interpret(SCENARIO);
    let points = session.points();

    assert_eq!(points.len(), 4);
    let native: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.z)).collect();
    assert_eq!(native, vec![(0.0, 0.0), (10.0, 0.0), (10.0, -20.0), (50.0, 50.0)]);

    let screen: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.screen_y())).collect();
    assert_eq!(screen[2], (10.0, 20.0));
    assert_eq!(screen[3], (50.0, -50.0));

    let motions: Vec<Motion> = points.iter().map(|p| p.motion).collect();
    assert_eq!(
        motions,
        vec![Motion::Rapid, Motion::Linear, Motion::Linear, Motion::Rapid]
    );
}

#[test]
fn test_scenario_time_counts_only_rapid_without_spindle() {
    let session = interpret(SCENARIO);
    let expected = 40f64.hypot(70.0) / 6000.0 * 60.0;
    assert!((session.estimate().total_seconds - expected).abs() < 1e-9);
    assert_eq!(session.estimate().to_string(), "0:00 min");
}

#[test]
fn test_interpretation_is_idempotent() {
    let text = "R1=5\nG91 X=R1 Z0\nX=R1*2\nG90 G1 X3 Z-7 F0.2 S=R1*100";
    let first = interpret(text);
    let second = interpret(text);
    assert_eq!(first.points(), second.points());
    assert_eq!(first.diagnostics(), second.diagnostics());
}

#[test]
fn test_no_coordinates_no_points() {
    let session = interpret("; header\nMSG(\"OP 1\")\nG54 G95\nM4 S=180\nT3 D1\nSTOPRE");
    assert!(session.points().is_empty());
    assert!(session.diagnostics().is_empty());
    assert!(session.bounds().is_none());
    assert_eq!(session.estimate().total_seconds, 0.0);
}

#[test]
fn test_absolute_then_incremental() {
    assert_eq!(coords("G90 X10 Z0\nG91 X5"), vec![(10.0, 0.0), (15.0, 0.0)]);
}

#[test]
fn test_incremental_first_coordinate_is_absolute() {
    let session = interpret("G91 X5 Z0");
    assert_eq!(session.points()[0].x, 5.0);
    assert_eq!(
        session.points()[0].positioning_mode,
        PositioningMode::Incremental
    );
}

#[test]
fn test_spindle_from_parameters() {
    let speeds: Vec<f64> = interpret("R1=180\nS=R1 X0 Z0\nS=R1*2 X1")
        .points()
        .iter()
        .map(|p| p.spindle_speed)
        .collect();
    assert_eq!(speeds, vec![180.0, 360.0]);
}

#[test]
fn test_division_by_zero_keeps_position() {
    let session = interpret("G0 X2 Z0\nG1 X1/0 F0.1");
    assert_eq!(session.points().len(), 1);
    assert_eq!(session.points()[0].x, 2.0);

    let diagnostic = session.diagnostics().iter().next().unwrap();
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.line, 1);
}

#[test]
fn test_spindle_preset_applies_until_programmed() {
    let options = InterpreterOptions {
        spindle_preset: 250.0,
    };
    let session = interpret_with("G0 X0 Z0\nG1 X100 F0.2\nS500 X200", &options);
    let speeds: Vec<f64> = session.points().iter().map(|p| p.spindle_speed).collect();
    assert_eq!(speeds, vec![250.0, 250.0, 500.0]);

    // 100 mm at 0.2 * 250 then 100 mm at 0.2 * 500
    assert!((session.estimate().total_seconds - 180.0).abs() < 1e-9);
}

#[test]
fn test_bundled_main_programs_interpret_cleanly() {
    let catalog = ProgramCatalog::with_examples();
    let example1 = interpret(&catalog.get("EXAMPLE1.MPF").unwrap().content);
    assert_eq!(example1.points().len(), 6);
    assert!(example1.diagnostics().is_empty());

    let example2 = interpret(&catalog.get("EXAMPLE2.MPF").unwrap().content);
    assert_eq!(example2.points().len(), 4);
    assert_eq!(example2.points()[0].mnemonic(), "G0");
}

#[test]
fn test_bundled_subprograms_have_no_motion() {
    let catalog = ProgramCatalog::with_examples();
    for program in catalog.sub_programs() {
        let session = interpret(&program.content);
        assert!(session.points().is_empty(), "{}", program.name);
    }
}

#[test]
fn test_point_info_walks_with_playback() {
    let session = interpret(SCENARIO);
    let mut playback = session.playback();
    let mut elapsed = Vec::new();

    let mut current = playback.first();
    while let Some(index) = current {
        elapsed.push(session.point_info(index).unwrap().cumulative_seconds);
        current = playback.step_forward();
    }

    assert_eq!(elapsed.len(), 4);
    assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
    assert!((elapsed[3] - session.estimate().total_seconds).abs() < 1e-9);
}
