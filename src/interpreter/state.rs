//! Modal Machine State
//!
//! Everything that stays in effect from one line to the next.

use crate::parser::Parameters;
use crate::toolpath::{Motion, PositioningMode};

/// Modal state threaded through one interpretation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    pub positioning_mode: PositioningMode,
    /// Last motion G-number; `None` until the first G word
    pub active_motion: Option<u32>,
    /// `None` while the machine position on this axis is unknown
    pub current_x: Option<f64>,
    pub current_z: Option<f64>,
    pub feed_rate: f64,
    pub spindle_speed: f64,
    pub parameters: Parameters,
}

impl ModalState {
    pub fn new(spindle_speed: f64) -> Self {
        Self {
            spindle_speed,
            ..Self::default()
        }
    }

    /// Point classification for the active motion word
    pub fn motion(&self) -> Motion {
        self.active_motion
            .map(Motion::from_g_code)
            .unwrap_or(Motion::Linear)
    }

    /// Resolve a programmed axis value against the last known position.
    ///
    /// An unknown position makes the value absolute whatever the mode.
    pub fn resolve(&self, current: Option<f64>, value: f64) -> f64 {
        match (current, self.positioning_mode) {
            (None, _) | (Some(_), PositioningMode::Absolute) => value,
            (Some(current), PositioningMode::Incremental) => current + value,
        }
    }

    pub fn position_known(&self) -> bool {
        self.current_x.is_some() || self.current_z.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bootstrap_and_modes() {
        let mut state = ModalState::new(0.0);
        state.positioning_mode = PositioningMode::Incremental;
        assert_eq!(state.resolve(None, 5.0), 5.0);
        assert_eq!(state.resolve(Some(10.0), 5.0), 15.0);

        state.positioning_mode = PositioningMode::Absolute;
        assert_eq!(state.resolve(Some(10.0), 5.0), 5.0);
    }

    #[test]
    fn test_motion_defaults_to_linear() {
        let mut state = ModalState::new(0.0);
        assert_eq!(state.motion(), Motion::Linear);

        state.active_motion = Some(0);
        assert_eq!(state.motion(), Motion::Rapid);
    }
}
