//! Interpreter Session
//!
//! The result of one run: program text, toolpath and diagnostics, owned
//! together so viewers and the time estimator never share hidden state.

use serde::Serialize;

use crate::core::{Diagnostics, ProgramText};
use crate::timing::{self, MachiningTime};
use crate::toolpath::{Bounds, PositioningMode, Toolpath, ToolpathPoint};

/// Everything produced by interpreting one program text
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterSession {
    program: ProgramText,
    toolpath: Toolpath,
    diagnostics: Diagnostics,
    /// Running machining time per point, computed once
    elapsed: Vec<f64>,
}

/// Details of one point, as shown in an info panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointInfo {
    pub index: usize,
    pub source_line: usize,
    pub code: String,
    pub mnemonic: String,
    pub x: f64,
    pub z: f64,
    pub delta_x: f64,
    pub delta_z: f64,
    pub feed_rate: f64,
    pub spindle_speed: f64,
    pub positioning_mode: PositioningMode,
    pub segment_length: f64,
    pub segment_seconds: f64,
    pub cumulative_seconds: f64,
}

impl InterpreterSession {
    pub(crate) fn new(program: ProgramText, toolpath: Toolpath, diagnostics: Diagnostics) -> Self {
        let elapsed = timing::elapsed_seconds(toolpath.points());
        Self {
            program,
            toolpath,
            diagnostics,
            elapsed,
        }
    }

    pub fn program(&self) -> &ProgramText {
        &self.program
    }

    pub fn toolpath(&self) -> &Toolpath {
        &self.toolpath
    }

    pub fn points(&self) -> &[ToolpathPoint] {
        self.toolpath.points()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.toolpath.bounds()
    }

    pub fn estimate(&self) -> MachiningTime {
        self.toolpath.estimate()
    }

    /// Info-panel view of the point at `index`
    pub fn point_info(&self, index: usize) -> Option<PointInfo> {
        let points = self.toolpath.points();
        let point = points.get(index)?;
        let prev = index.checked_sub(1).and_then(|i| points.get(i));

        let (delta_x, delta_z, segment_length, segment_seconds) = match prev {
            Some(prev) => (
                point.x - prev.x,
                point.z - prev.z,
                timing::segment_length(prev, point),
                timing::segment_seconds(prev, point),
            ),
            None => (0.0, 0.0, 0.0, 0.0),
        };

        Some(PointInfo {
            index,
            source_line: point.source_line,
            code: self
                .program
                .line(point.source_line)
                .unwrap_or_default()
                .trim()
                .to_string(),
            mnemonic: point.mnemonic(),
            x: point.x,
            z: point.z,
            delta_x,
            delta_z,
            feed_rate: point.feed_rate,
            spindle_speed: point.spindle_speed,
            positioning_mode: point.positioning_mode,
            segment_length,
            segment_seconds,
            cumulative_seconds: self.elapsed.get(index).copied().unwrap_or_default(),
        })
    }

    /// A playback cursor over this session's points
    pub fn playback(&self) -> Playback {
        Playback::new(self.toolpath.len())
    }
}

/// Next / previous / play cursor over point indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    current: usize,
    len: usize,
}

impl Playback {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    /// Selected index; `None` for an empty path
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.current)
    }

    pub fn step_forward(&mut self) -> Option<usize> {
        if self.current + 1 < self.len {
            self.current += 1;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn step_back(&mut self) -> Option<usize> {
        if self.current > 0 && self.len > 0 {
            self.current -= 1;
            Some(self.current)
        } else {
            None
        }
    }

    pub fn first(&mut self) -> Option<usize> {
        self.current = 0;
        self.current()
    }

    pub fn last(&mut self) -> Option<usize> {
        self.current = self.len.saturating_sub(1);
        self.current()
    }

    /// Jump to `index`; out-of-range requests leave the cursor unchanged
    pub fn seek(&mut self, index: usize) -> Option<usize> {
        if index < self.len {
            self.current = index;
            Some(index)
        } else {
            None
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.len == 0 || self.current + 1 == self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::interpret;

    #[test]
    fn test_point_info_deltas_and_code() {
        let session = interpret("N10 G0 X0 Z0\nN20 G1 X10 Z-20 F0.2 S500");
        let info = session.point_info(1).expect("point info");

        assert_eq!(info.code, "N20 G1 X10 Z-20 F0.2 S500");
        assert_eq!(info.mnemonic, "G1");
        assert_eq!(info.delta_x, 10.0);
        assert_eq!(info.delta_z, -20.0);
        assert!((info.segment_length - 500f64.sqrt()).abs() < 1e-9);
        assert!(info.segment_seconds > 0.0);
        assert_eq!(info.cumulative_seconds, info.segment_seconds);

        let first = session.point_info(0).expect("first point");
        assert_eq!(first.delta_x, 0.0);
        assert_eq!(first.cumulative_seconds, 0.0);

        assert!(session.point_info(2).is_none());
    }

    #[test]
    fn test_cumulative_time_on_long_program() {
        let mut text = String::from("G0 X0 Z0\nG1 F0.2 S400\n");
        for i in 1..=2000 {
            text.push_str(&format!("X{} Z-{}\n", i % 50, i));
        }
        let session = interpret(&text);
        let points = session.points();
        assert_eq!(points.len(), 2001);

        let mut running = 0.0;
        for index in 1..points.len() {
            running += timing::segment_seconds(&points[index - 1], &points[index]);
            let info = session.point_info(index).unwrap();
            assert!((info.cumulative_seconds - running).abs() < 1e-6);
        }

        let last = session.point_info(points.len() - 1).unwrap();
        assert!((last.cumulative_seconds - session.estimate().total_seconds).abs() < 1e-6);
    }

    #[test]
    fn test_playback_bounds() {
        let mut playback = Playback::new(3);
        assert_eq!(playback.current(), Some(0));
        assert_eq!(playback.step_back(), None);
        assert_eq!(playback.step_forward(), Some(1));
        assert_eq!(playback.step_forward(), Some(2));
        assert!(playback.is_at_end());
        assert_eq!(playback.step_forward(), None);
        assert_eq!(playback.step_back(), Some(1));
        assert_eq!(playback.seek(7), None);
        assert_eq!(playback.current(), Some(1));
        assert_eq!(playback.first(), Some(0));
        assert_eq!(playback.last(), Some(2));
    }

    #[test]
    fn test_playback_empty() {
        let mut playback = Playback::new(0);
        assert_eq!(playback.current(), None);
        assert_eq!(playback.step_forward(), None);
        assert_eq!(playback.last(), None);
        assert!(playback.is_at_end());
    }
}
