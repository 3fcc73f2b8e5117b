//! Machining Time Estimation
//!
//! Rapid segments run at a fixed traverse rate. Linear segments run at
//! feed (mm/rev) times spindle speed (rev/min); a zero product makes the
//! segment free rather than an error.

use serde::Serialize;
use std::fmt;

use crate::toolpath::{Motion, ToolpathPoint};

/// Rapid traverse rate in mm/min
pub const RAPID_RATE: f64 = 6000.0;

/// Straight-line distance between two points
pub fn segment_length(prev: &ToolpathPoint, point: &ToolpathPoint) -> f64 {
    (point.x - prev.x).hypot(point.z - prev.z)
}

/// Seconds needed to travel from `prev` to `point`
pub fn segment_seconds(prev: &ToolpathPoint, point: &ToolpathPoint) -> f64 {
    let distance = segment_length(prev, point);
    match point.motion {
        Motion::Rapid => distance / RAPID_RATE * 60.0,
        Motion::Linear => {
            let feed_per_minute = point.feed_rate * point.spindle_speed;
            if feed_per_minute > 0.0 {
                distance / feed_per_minute * 60.0
            } else {
                0.0
            }
        }
    }
}

/// Running machining time at every point: entry `i` is the time from the
/// first point up to point `i`.
pub fn elapsed_seconds(points: &[ToolpathPoint]) -> Vec<f64> {
    let mut elapsed = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (index, point) in points.iter().enumerate() {
        if let Some(prev) = index.checked_sub(1).and_then(|i| points.get(i)) {
            total += segment_seconds(prev, point);
        }
        elapsed.push(total);
    }
    elapsed
}

/// Total machining time for a point list
pub fn estimate(points: &[ToolpathPoint]) -> MachiningTime {
    let total_seconds = points
        .windows(2)
        .map(|pair| segment_seconds(&pair[0], &pair[1]))
        .sum();
    MachiningTime { total_seconds }
}

/// A machining duration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MachiningTime {
    pub total_seconds: f64,
}

impl MachiningTime {
    /// Whole minutes, truncated
    pub fn minutes(&self) -> u64 {
        (self.total_seconds / 60.0).floor() as u64
    }

    /// Remaining whole seconds, truncated
    pub fn seconds(&self) -> u64 {
        (self.total_seconds % 60.0).floor() as u64
    }
}

impl fmt::Display for MachiningTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} min", self.minutes(), self.seconds())
    }
}
