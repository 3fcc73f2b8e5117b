//! Toolpath Model
//!
//! The ordered points produced by one interpretation run. Coordinates are
//! kept in the machine frame; flipping Z for display is left to viewers
//! through [`ToolpathPoint::screen_y`].

use serde::Serialize;

use crate::timing::{self, MachiningTime};

/// Margin added around the path extents by [`Toolpath::bounds`]
pub const BOUNDS_PADDING: f64 = 20.0;

/// How a segment ending at a point is travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    /// Positioning at the fixed rapid rate (G0)
    Rapid,
    /// Cutting at the programmed feed (G1 and every other G word)
    Linear,
}

impl Motion {
    /// Classify a motion G-number; only G0 is rapid
    pub fn from_g_code(code: u32) -> Self {
        if code == 0 {
            Motion::Rapid
        } else {
            Motion::Linear
        }
    }
}

/// G90 / G91
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositioningMode {
    #[default]
    Absolute,
    Incremental,
}

impl PositioningMode {
    pub fn g_word(self) -> &'static str {
        match self {
            PositioningMode::Absolute => "G90",
            PositioningMode::Incremental => "G91",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositioningMode::Absolute => "G90 (ABS)",
            PositioningMode::Incremental => "G91 (INC)",
        }
    }
}

/// One resolved tool position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolpathPoint {
    pub x: f64,
    pub z: f64,
    pub motion: Motion,
    /// Motion G-number in effect, if any was programmed
    pub g_code: Option<u32>,
    pub feed_rate: f64,
    pub spindle_speed: f64,
    pub source_line: usize,
    pub positioning_mode: PositioningMode,
    /// Set on the first point of the path only
    pub start: bool,
    /// Set when the line carried G90 or G91
    pub mode_change: Option<PositioningMode>,
}

impl ToolpathPoint {
    /// Vertical screen coordinate for viewers drawing Z upwards
    pub fn screen_y(&self) -> f64 {
        -self.z
    }

    /// Short command label shown next to the point
    pub fn mnemonic(&self) -> String {
        if let Some(mode) = self.mode_change {
            return mode.g_word().to_string();
        }
        match self.g_code {
            Some(code) => format!("G{}", code),
            None if self.start => "START".to_string(),
            None => match self.motion {
                Motion::Rapid => "G0".to_string(),
                Motion::Linear => "G1".to_string(),
            },
        }
    }
}

/// Padded extents of a toolpath in machine coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }
}

/// Ordered points of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Toolpath {
    points: Vec<ToolpathPoint>,
}

impl Toolpath {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub(crate) fn push(&mut self, point: ToolpathPoint) {
        debug_assert!(
            self.points
                .last()
                .is_none_or(|last| last.source_line < point.source_line),
            "points must be emitted in source order, one per line"
        );
        self.points.push(point);
    }

    pub fn points(&self) -> &[ToolpathPoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&ToolpathPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolpathPoint> {
        self.points.iter()
    }

    /// Padded bounding box; `None` when there is nothing to fit
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_z: first.z,
            max_z: first.z,
        };
        for point in &self.points[1..] {
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.min_z = bounds.min_z.min(point.z);
            bounds.max_z = bounds.max_z.max(point.z);
        }

        Some(Bounds {
            min_x: bounds.min_x - BOUNDS_PADDING,
            max_x: bounds.max_x + BOUNDS_PADDING,
            min_z: bounds.min_z - BOUNDS_PADDING,
            max_z: bounds.max_z + BOUNDS_PADDING,
        })
    }

    /// Total machining time, recomputed from the points on every call
    pub fn estimate(&self) -> MachiningTime {
        timing::estimate(&self.points)
    }
}

impl<'a> IntoIterator for &'a Toolpath {
    type Item = &'a ToolpathPoint;
    type IntoIter = std::slice::Iter<'a, ToolpathPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
