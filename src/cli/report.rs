//! Text and JSON rendering of interpreter results

use anyhow::{Context, Result};
use serde::Serialize;

use crate::catalog::ProgramCatalog;
use crate::core::Diagnostics;
use crate::interpreter::{InterpreterSession, PointInfo};
use crate::timing::MachiningTime;
use crate::toolpath::{Bounds, Motion, Toolpath};

/// Source lines shown above and below the selected point
const CONTEXT_LINES: usize = 2;

/// Serialized form of a whole run
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub program: &'a str,
    pub points: &'a Toolpath,
    pub bounds: Option<Bounds>,
    pub diagnostics: &'a Diagnostics,
    /// False when any word was discarded
    pub clean: bool,
    pub total_seconds: f64,
    pub total_time: String,
}

impl<'a> Report<'a> {
    pub fn new(program: &'a str, session: &'a InterpreterSession) -> Self {
        let time = session.estimate();
        Self {
            program,
            points: session.toolpath(),
            bounds: session.bounds(),
            diagnostics: session.diagnostics(),
            clean: session.diagnostics().is_clean(),
            total_seconds: time.total_seconds,
            total_time: time.to_string(),
        }
    }
}

pub fn render_json(program: &str, session: &InterpreterSession) -> Result<String> {
    serde_json::to_string_pretty(&Report::new(program, session))
        .context("Failed to serialize report")
}

/// Point table, bounds, diagnostics and total time
pub fn render_text(program: &str, session: &InterpreterSession) -> String {
    let mut out = format!(
        "{}: {} points, total time {}",
        program,
        session.points().len(),
        session.estimate()
    );
    if !session.diagnostics().is_clean() {
        out.push_str(" (words ignored, see below)");
    }
    out.push('\n');

    if !session.points().is_empty() {
        out.push_str(&format!(
            "{:>4} {:>5} {:<6} {:<6} {:>10} {:>10} {:>8} {:>8}  {}\n",
            "#", "LINE", "CODE", "MOTION", "X", "Z", "F", "S", "MODE"
        ));
    }
    for (index, point) in session.points().iter().enumerate() {
        let motion = match point.motion {
            Motion::Rapid => "rapid",
            Motion::Linear => "linear",
        };
        out.push_str(&format!(
            "{:>4} {:>5} {:<6} {:<6} {:>10.3} {:>10.3} {:>8.3} {:>8.0}  {}\n",
            index,
            point.source_line + 1,
            point.mnemonic(),
            motion,
            point.x,
            point.z,
            point.feed_rate,
            point.spindle_speed,
            point.positioning_mode.label()
        ));
    }

    if let Some(bounds) = session.bounds() {
        out.push_str(&format!(
            "bounds: X {:.3}..{:.3}  Z {:.3}..{:.3}\n",
            bounds.min_x, bounds.max_x, bounds.min_z, bounds.max_z
        ));
    }

    for diagnostic in session.diagnostics() {
        out.push_str(&format!("{}\n", diagnostic));
    }

    out
}

/// Info panel for one point followed by the surrounding source lines
pub fn render_point_info(session: &InterpreterSession, index: usize) -> Option<String> {
    let info = session.point_info(index)?;
    let mut out = format!(
        "Point {} of {} (line {})\n",
        info.index + 1,
        session.points().len(),
        info.source_line + 1
    );
    out.push_str(&format!("  Code:     {}\n", info.code));
    out.push_str(&format!("  Command:  {}\n", info.mnemonic));
    out.push_str(&format!("  X: {:.3}  Z: {:.3}\n", info.x, info.z));
    out.push_str(&format!("  dX: {:.3}  dZ: {:.3}\n", info.delta_x, info.delta_z));
    out.push_str(&format!(
        "  Feed: {}  Spindle: {}\n",
        info.feed_rate, info.spindle_speed
    ));
    out.push_str(&format!("  Mode:     {}\n", info.positioning_mode.label()));
    out.push_str(&format!(
        "  Segment:  {:.3} mm in {:.1} s\n",
        info.segment_length, info.segment_seconds
    ));
    out.push_str(&format!(
        "  Elapsed:  {}\n",
        MachiningTime {
            total_seconds: info.cumulative_seconds
        }
    ));

    out.push_str("Context:\n");
    out.push_str(&render_context(session, info.source_line));
    Some(out)
}

pub fn render_point_info_json(info: &PointInfo) -> Result<String> {
    serde_json::to_string_pretty(info).context("Failed to serialize point info")
}

/// Source lines around `line`, the selected one marked with `>` and
/// each followed by its diagnostics
pub fn render_context(session: &InterpreterSession, line: usize) -> String {
    let mut out = String::new();
    for (index, text) in session
        .program()
        .context(line, CONTEXT_LINES, CONTEXT_LINES)
    {
        let marker = if index == line { ">" } else { " " };
        out.push_str(&format!("{} {:>5}  {}\n", marker, index + 1, text));
        for diagnostic in session.diagnostics().for_line(index) {
            out.push_str(&format!("         ! {}\n", diagnostic.message));
        }
    }
    out
}

/// Catalog listing with subprogram tool labels
pub fn render_catalog(catalog: &ProgramCatalog) -> String {
    let mut out = format!("{}\n", catalog.summary());
    for program in catalog.main_programs() {
        out.push_str(&format!("  {}\n", program.name));
    }
    for program in catalog.sub_programs() {
        match program.info().and_then(|info| info.label()) {
            Some(label) => out.push_str(&format!("  {:<14} {}\n", program.name, label)),
            None => out.push_str(&format!("  {}\n", program.name)),
        }
    }
    out
}
