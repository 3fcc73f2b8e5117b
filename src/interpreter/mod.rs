//! Modal-State Interpreter
//!
//! Walks the program line by line, threading [`ModalState`] through, and
//! emits a [`ToolpathPoint`] for every line that moves the tool or changes
//! the positioning mode. Malformed words are dropped with a diagnostic;
//! interpretation itself never fails.

pub mod session;
pub mod state;

pub use session::{InterpreterSession, Playback, PointInfo};
pub use state::ModalState;

use crate::core::{Diagnostics, ProgramText};
use crate::parser::{
    evaluate, parse_line, Assignment, Axis, Block, ExprError, ParsedLine, UndefinedParameter,
    Word,
};
use crate::toolpath::{PositioningMode, Toolpath, ToolpathPoint};

/// Caller-supplied starting conditions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InterpreterOptions {
    /// Spindle speed in effect before the program sets one
    pub spindle_preset: f64,
}

/// Interpret program text with default options
pub fn interpret(text: &str) -> InterpreterSession {
    interpret_with(text, &InterpreterOptions::default())
}

/// Interpret program text with explicit options
pub fn interpret_with(text: &str, options: &InterpreterOptions) -> InterpreterSession {
    interpret_program(ProgramText::new(text), options)
}

/// Interpret already-normalized program text
pub fn interpret_program(program: ProgramText, options: &InterpreterOptions) -> InterpreterSession {
    let mut interpreter = Interpreter::new(options);
    for (index, line) in program.lines().iter().enumerate() {
        interpreter.process_line(index, line);
    }

    log::debug!(
        "interpreted {} lines into {} points ({} diagnostics)",
        program.len(),
        interpreter.toolpath.len(),
        interpreter.diagnostics.len()
    );

    InterpreterSession::new(program, interpreter.toolpath, interpreter.diagnostics)
}

struct Interpreter {
    state: ModalState,
    toolpath: Toolpath,
    diagnostics: Diagnostics,
    seen_coordinate: bool,
}

impl Interpreter {
    fn new(options: &InterpreterOptions) -> Self {
        Self {
            state: ModalState::new(options.spindle_preset),
            toolpath: Toolpath::new(),
            diagnostics: Diagnostics::new(),
            seen_coordinate: false,
        }
    }

    fn process_line(&mut self, index: usize, line: &str) {
        match parse_line(line) {
            ParsedLine::Empty | ParsedLine::Comment(_) | ParsedLine::Message(_) => {}
            ParsedLine::Assignment(assignments) => self.assign(index, &assignments),
            ParsedLine::Block(block) => self.execute(index, &block),
        }
    }

    fn assign(&mut self, index: usize, assignments: &[Assignment]) {
        for assignment in assignments {
            match evaluate(
                &assignment.expr,
                &self.state.parameters,
                UndefinedParameter::Error,
            ) {
                Ok(value) => {
                    log::trace!("line {}: {} = {}", index + 1, assignment.name, value);
                    self.state
                        .parameters
                        .insert(assignment.name.clone(), value);
                }
                Err(e) => self.diagnostics.add_warning(
                    index,
                    format!(
                        "assignment {}={} ignored: {}",
                        assignment.name, assignment.expr, e
                    ),
                ),
            }
        }
    }

    /// Evaluate a word value, reporting and discarding it on failure
    fn value(
        &mut self,
        index: usize,
        address: &str,
        text: &str,
        undefined: UndefinedParameter,
    ) -> Option<f64> {
        match evaluate(text, &self.state.parameters, undefined) {
            Ok(value) => Some(value),
            Err(e) => {
                self.diagnostics
                    .add_error(index, format!("{} word '{}' ignored: {}", address, text, e));
                None
            }
        }
    }

    fn execute(&mut self, index: usize, block: &Block) {
        let mut x = self.state.current_x;
        let mut z = self.state.current_z;
        let mut has_coordinate = false;
        let mut mode_change = None;

        for word in &block.words {
            match word {
                Word::GCode(90) => {
                    self.state.positioning_mode = PositioningMode::Absolute;
                    mode_change = Some(PositioningMode::Absolute);
                }
                Word::GCode(91) => {
                    self.state.positioning_mode = PositioningMode::Incremental;
                    mode_change = Some(PositioningMode::Incremental);
                }
                Word::GCode(code) => {
                    if *code > 1 {
                        log::debug!("line {}: G{} classified as linear motion", index + 1, code);
                    }
                    self.state.active_motion = Some(*code);
                }
                Word::Coordinate { axis, value } => {
                    let address = match axis {
                        Axis::X => "X",
                        Axis::Z => "Z",
                    };
                    if let Some(number) =
                        self.value(index, address, value, UndefinedParameter::Error)
                    {
                        let slot = match axis {
                            Axis::X => &mut x,
                            Axis::Z => &mut z,
                        };
                        let resolved = self.state.resolve(*slot, number);
                        if resolved.is_finite() {
                            *slot = Some(resolved);
                            has_coordinate = true;
                        } else {
                            self.diagnostics.add_error(
                                index,
                                format!(
                                    "{} word '{}' ignored: {}",
                                    address,
                                    value,
                                    ExprError::NotFinite
                                ),
                            );
                        }
                    }
                }
                Word::Spindle(value) => {
                    if let Some(speed) = self.value(index, "S", value, UndefinedParameter::Zero) {
                        self.state.spindle_speed = speed;
                    }
                }
                Word::Feed(value) => {
                    if let Some(feed) = self.value(index, "F", value, UndefinedParameter::Error) {
                        self.state.feed_rate = feed;
                    }
                }
                Word::Other(_) => {}
            }
        }

        let moved = x != self.state.current_x || z != self.state.current_z;
        let first_coordinate = has_coordinate && !self.seen_coordinate;
        self.seen_coordinate |= has_coordinate;
        self.state.current_x = x;
        self.state.current_z = z;

        if self.state.position_known() && (moved || first_coordinate || mode_change.is_some()) {
            self.emit(index, mode_change);
        }
    }

    fn emit(&mut self, index: usize, mode_change: Option<PositioningMode>) {
        let point = ToolpathPoint {
            x: self.state.current_x.unwrap_or(0.0),
            z: self.state.current_z.unwrap_or(0.0),
            motion: self.state.motion(),
            g_code: self.state.active_motion,
            feed_rate: self.state.feed_rate,
            spindle_speed: self.state.spindle_speed,
            source_line: index,
            positioning_mode: self.state.positioning_mode,
            start: self.toolpath.is_empty(),
            mode_change,
        };
        log::trace!("line {}: point {:?}", index + 1, point);
        self.toolpath.push(point);
    }
}
