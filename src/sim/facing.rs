//! Facing direction and tilt
//!
//! Animated facing is restricted to four cardinal directions. Diagonal input
//! is shown as a small lean (tilt) of the cardinal sprite instead.
//!
//! Angles follow `atan2(y, x)` with +y pointing down, so sectors are:
//! Right `[-45°, 45°)`, Down `[45°, 135°)`, Left `[135°, 180°] ∪ [-180°, -135°)`,
//! Up `[-135°, -45°)`.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::INPUT_EPSILON;
use crate::settings::FacingConfig;
use crate::{exp_smoothing, normalize_angle, vector_angle};

/// Cardinal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Sector containing `angle` (radians)
    pub fn from_angle(angle: f32) -> Self {
        let a = normalize_angle(angle);
        if (-FRAC_PI_4..FRAC_PI_4).contains(&a) {
            Direction::Right
        } else if (FRAC_PI_4..3.0 * FRAC_PI_4).contains(&a) {
            Direction::Down
        } else if (-3.0 * FRAC_PI_4..-FRAC_PI_4).contains(&a) {
            Direction::Up
        } else {
            Direction::Left
        }
    }

    /// Sector of a movement vector; `None` for no input
    pub fn from_vector(v: Vec2) -> Option<Self> {
        if !v.is_finite() || v.length() <= INPUT_EPSILON {
            return None;
        }
        Some(Self::from_angle(vector_angle(v)))
    }

    /// Angle at the middle of the sector
    pub fn center_angle(&self) -> f32 {
        match self {
            Direction::Right => 0.0,
            Direction::Down => FRAC_PI_2,
            Direction::Left => PI,
            Direction::Up => -FRAC_PI_2,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Neighbouring sector (90° apart)
    pub fn is_adjacent(&self, other: Direction) -> bool {
        *self != other && self.opposite() != other
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Signed offset of `angle` from the center of `direction`
#[inline]
fn offset_from(direction: Direction, angle: f32) -> f32 {
    normalize_angle(angle - direction.center_angle())
}

/// Lean for an offset from the cardinal center: zero inside the deadzone,
/// then a linear ramp reaching the cap at the sector boundary.
pub fn tilt_for_offset(offset: f32, config: &FacingConfig) -> f32 {
    let deadzone = config.deadzone_deg.to_radians().clamp(0.0, FRAC_PI_4);
    let max_tilt = config.max_tilt_deg.max(0.0).to_radians();
    let magnitude = offset.abs();
    if magnitude <= deadzone || max_tilt == 0.0 {
        return 0.0;
    }
    let span = (FRAC_PI_4 - deadzone).max(f32::EPSILON);
    let t = ((magnitude - deadzone) / span).min(1.0);
    offset.signum() * t * max_tilt
}

/// Facing state machine: {up, down, left, right} × {moving, idle}
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FacingState {
    pub direction: Direction,
    pub moving: bool,
    /// Current (smoothed) lean in radians
    pub tilt: f32,
    /// Lean the smoothing is heading toward
    pub target_tilt: f32,
}

impl FacingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the facing for an input angle, keeping the current facing while
    /// the angle is within the hysteresis band past its sector boundary.
    fn select(&self, angle: f32, config: &FacingConfig) -> Direction {
        let raw = Direction::from_angle(angle);
        if raw == self.direction {
            return raw;
        }
        let band = FRAC_PI_4 + config.hysteresis_deg.clamp(0.0, 44.0).to_radians();
        if offset_from(self.direction, angle).abs() < band {
            self.direction
        } else {
            raw
        }
    }

    /// Advance one frame.
    ///
    /// Returns `(from, to)` when the facing changed. Zero input keeps the
    /// facing, marks the state idle, and relaxes the tilt toward zero.
    pub fn update(
        &mut self,
        input: Vec2,
        dt: f32,
        config: &FacingConfig,
    ) -> Option<(Direction, Direction)> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut transition = None;

        match Direction::from_vector(input) {
            None => {
                self.moving = false;
                self.target_tilt = 0.0;
            }
            Some(_) => {
                let angle = vector_angle(input);
                let next = self.select(angle, config);
                if next != self.direction {
                    let from = self.direction;
                    // Keep the lean on the same side of the shared boundary
                    self.tilt = if from.is_adjacent(next) {
                        -self.tilt
                    } else {
                        0.0
                    };
                    self.direction = next;
                    transition = Some((from, next));
                }
                self.moving = true;
                self.target_tilt = tilt_for_offset(offset_from(self.direction, angle), config);
            }
        }

        let max_tilt = config.max_tilt_deg.max(0.0).to_radians();
        self.tilt += (self.target_tilt - self.tilt) * exp_smoothing(config.smoothing_rate, dt);
        self.tilt = self.tilt.clamp(-max_tilt, max_tilt);

        transition
    }

    /// Visual heading: cardinal center plus lean
    pub fn visual_angle(&self) -> f32 {
        normalize_angle(self.direction.center_angle() + self.tilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn no_hysteresis() -> FacingConfig {
        FacingConfig {
            hysteresis_deg: 0.0,
            ..FacingConfig::default()
        }
    }

    fn at_deg(deg: f32) -> Vec2 {
        let r = deg.to_radians();
        Vec2::new(r.cos(), r.sin()) * 3.0
    }

    #[test]
    fn test_sector_boundaries() {
        assert_eq!(Direction::from_angle(0.0), Direction::Right);
        assert_eq!(Direction::from_angle(44.9_f32.to_radians()), Direction::Right);
        assert_eq!(Direction::from_angle(45.1_f32.to_radians()), Direction::Down);
        assert_eq!(Direction::from_angle(134.9_f32.to_radians()), Direction::Down);
        assert_eq!(Direction::from_angle(135.1_f32.to_radians()), Direction::Left);
        assert_eq!(Direction::from_angle(PI), Direction::Left);
        assert_eq!(Direction::from_angle(-135.1_f32.to_radians()), Direction::Left);
        assert_eq!(Direction::from_angle(-134.9_f32.to_radians()), Direction::Up);
        assert_eq!(Direction::from_angle(-45.1_f32.to_radians()), Direction::Up);
        assert_eq!(Direction::from_angle(-44.9_f32.to_radians()), Direction::Right);
    }

    #[test]
    fn test_wound_up_angles_map_to_sectors() {
        assert_eq!(Direction::from_angle(2.0 * PI + 0.1), Direction::Right);
        assert_eq!(Direction::from_angle(-4.0 * PI - FRAC_PI_2), Direction::Up);
        // Huge but finite angles still resolve to a sector
        let far = Direction::from_angle(1.0e9);
        assert_eq!(far, Direction::from_angle(normalize_angle(1.0e9)));
        assert_eq!(Direction::from_angle(f32::INFINITY), Direction::Right);
    }

    #[test]
    fn test_direction_names() {
        let names: Vec<&str> = Direction::ALL.iter().map(Direction::as_str).collect();
        assert_eq!(names, ["up", "down", "left", "right"]);
    }

    #[test]
    fn test_initial_state_is_down_idle() {
        let state = FacingState::new();
        assert_eq!(state.direction, Direction::Down);
        assert!(!state.moving);
        assert_eq!(state.tilt, 0.0);
    }

    #[test]
    fn test_zero_input_keeps_direction() {
        let config = FacingConfig::default();
        let mut state = FacingState::new();
        state.update(Vec2::new(-1.0, 0.0), 0.016, &config);
        assert_eq!(state.direction, Direction::Left);
        assert!(state.moving);

        let transition = state.update(Vec2::ZERO, 0.016, &config);
        assert_eq!(transition, None);
        assert_eq!(state.direction, Direction::Left);
        assert!(!state.moving);
    }

    #[test]
    fn test_transition_reported_once() {
        let config = FacingConfig::default();
        let mut state = FacingState::new();
        assert_eq!(
            state.update(Vec2::X, 0.016, &config),
            Some((Direction::Down, Direction::Right))
        );
        assert_eq!(state.update(Vec2::X, 0.016, &config), None);
    }

    #[test]
    fn test_hysteresis_holds_near_boundary() {
        let config = FacingConfig::default();
        let mut state = FacingState::new();
        state.update(Vec2::X, 0.016, &config);
        // 47° is past the boundary but inside the 4° band
        state.update(at_deg(47.0), 0.016, &config);
        assert_eq!(state.direction, Direction::Right);
        state.update(at_deg(50.0), 0.016, &config);
        assert_eq!(state.direction, Direction::Down);
        // and back: 43° is still held as Down
        state.update(at_deg(43.0), 0.016, &config);
        assert_eq!(state.direction, Direction::Down);
    }

    #[test]
    fn test_tilt_deadzone_and_cap() {
        let config = FacingConfig::default();
        assert_eq!(tilt_for_offset(5.0_f32.to_radians(), &config), 0.0);
        let full = tilt_for_offset(45.0_f32.to_radians(), &config);
        assert!((full - 15.0_f32.to_radians()).abs() < 1e-5);
        let beyond = tilt_for_offset(-60.0_f32.to_radians(), &config);
        assert!((beyond + 15.0_f32.to_radians()).abs() < 1e-5);
        let mid = tilt_for_offset(26.0_f32.to_radians(), &config);
        assert!((mid - 7.5_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn test_tilt_smooths_toward_target() {
        let config = no_hysteresis();
        let mut state = FacingState::new();
        state.update(at_deg(40.0), 1.0 / 60.0, &config);
        assert!(state.tilt > 0.0);
        assert!(state.tilt < state.target_tilt);
        for _ in 0..120 {
            state.update(at_deg(40.0), 1.0 / 60.0, &config);
        }
        assert!((state.tilt - state.target_tilt).abs() < 1e-3);
    }

    #[test]
    fn test_tilt_mirrors_on_adjacent_change() {
        let config = no_hysteresis();
        let mut state = FacingState::new();
        for _ in 0..120 {
            state.update(at_deg(44.0), 1.0 / 60.0, &config);
        }
        assert_eq!(state.direction, Direction::Right);
        let before = state.tilt;
        assert!(before > 0.0);

        state.update(at_deg(46.0), 1.0 / 60.0, &config);
        assert_eq!(state.direction, Direction::Down);
        // Lean stays toward the shared diagonal: no swing through zero
        assert!(state.tilt < 0.0);
        assert!((state.tilt + before).abs() < 1.0_f32.to_radians());
    }

    #[test]
    fn test_reversal_resets_tilt() {
        let config = no_hysteresis();
        let mut state = FacingState::new();
        for _ in 0..60 {
            state.update(at_deg(30.0), 1.0 / 60.0, &config);
        }
        state.update(at_deg(180.0), 1.0 / 60.0, &config);
        assert_eq!(state.direction, Direction::Left);
        assert!(state.tilt.abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_input_is_idle() {
        let config = FacingConfig::default();
        let mut state = FacingState::new();
        assert_eq!(state.update(Vec2::new(f32::NAN, 1.0), 0.016, &config), None);
        assert!(!state.moving);
        assert_eq!(state.direction, Direction::Down);
    }

    proptest! {
        #[test]
        fn prop_exactly_one_sector(deg in -180.0f32..180.0, magnitude in 0.01f32..100.0) {
            let v = at_deg(deg) / 3.0 * magnitude;
            let dir = Direction::from_vector(v).expect("non-zero input");
            let expected = if (-45.0..45.0).contains(&deg) {
                Direction::Right
            } else if (45.0..135.0).contains(&deg) {
                Direction::Down
            } else if (-135.0..-45.0).contains(&deg) {
                Direction::Up
            } else {
                Direction::Left
            };
            // Stay clear of float noise exactly on a boundary
            let near_boundary = [-135.0f32, -45.0, 45.0, 135.0, 180.0, -180.0]
                .iter()
                .any(|b| (deg - b).abs() < 0.01);
            if !near_boundary {
                prop_assert_eq!(dir, expected);
            }
        }

        #[test]
        fn prop_tilt_is_bounded(
            angles in proptest::collection::vec(-180.0f32..180.0, 1..40),
            dt in 0.001f32..0.2,
        ) {
            let config = FacingConfig::default();
            let max = config.max_tilt_deg.to_radians() + 1e-6;
            let mut state = FacingState::new();
            for deg in angles {
                state.update(at_deg(deg), dt, &config);
                prop_assert!(state.tilt.abs() <= max);
                prop_assert!(Direction::ALL.contains(&state.direction));
            }
        }

        #[test]
        fn prop_stateful_matches_sectors_without_hysteresis(deg in -179.0f32..179.0) {
            let config = no_hysteresis();
            let mut state = FacingState::new();
            state.update(at_deg(deg), 0.016, &config);
            prop_assert_eq!(Some(state.direction), Direction::from_vector(at_deg(deg)));
        }
    }
}
