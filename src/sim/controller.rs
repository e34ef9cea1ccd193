//! Player movement controller
//!
//! Once per tick: input → displacement → slide along last tick's contacts →
//! apply → clamp to the level → facing/tilt → fresh contacts → camera.
//! Nothing here can fail; bad input degrades to "no movement".

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::CameraFollow;
use super::collision::{Contact, resolve_against, slide_all};
use super::facing::{Direction, FacingState};
use super::geom::{Circle, Rect};
use super::level::Level;
use crate::clamp_frame_dt;
use crate::consts::{INPUT_EPSILON, MAX_SUBSTEPS, SUBSTEP_RADIUS_FRACTION};
use crate::sanitize;
use crate::settings::{MovementConfig, Settings};

/// Overlap left in place after a push-out so a player resting against a
/// wall keeps reporting contact instead of flickering in and out of it.
const CONTACT_SKIN: f32 = 0.01;

/// Character growth stage; each has its own base speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GrowthStage {
    #[default]
    Small,
    Grown,
}

impl GrowthStage {
    pub fn base_speed(&self, config: &MovementConfig) -> f32 {
        match self {
            GrowthStage::Small => config.small_speed,
            GrowthStage::Grown => config.grown_speed,
        }
    }
}

/// Per-frame movement state owned by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    pub facing: FacingState,
    /// Overlapping at least one obstacle after the last tick
    pub colliding: bool,
    /// Contacts found at the end of the last tick, deepest first
    pub contacts: Vec<Contact>,
    /// Push-out direction of the deepest contact (zero when none)
    pub collision_normal: Vec2,
    /// Contact point of the most recent collision
    pub last_contact: Option<Vec2>,
    pub camera: CameraFollow,
}

impl MovementState {
    pub fn new(position: Vec2) -> Self {
        Self {
            facing: FacingState::new(),
            colliding: false,
            contacts: Vec::new(),
            collision_normal: Vec2::ZERO,
            last_contact: None,
            camera: CameraFollow::new(position),
        }
    }
}

/// What happened during one controller step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    /// Intended displacement after sliding, before clamping
    pub displacement: Vec2,
    /// Actual change in position this tick (includes clamp and push-out)
    pub moved: Vec2,
    pub collision_started: bool,
    pub collision_ended: bool,
    pub facing_changed: Option<(Direction, Direction)>,
}

/// Clamp a circle center so the circle stays inside `bounds`.
/// Bounds narrower than the circle pin it to their center line.
pub fn clamp_to_bounds(position: Vec2, bounds: &Rect, radius: f32) -> Vec2 {
    let inner = bounds.inflate(-radius.max(0.0));
    position.clamp(inner.min, inner.max)
}

/// The player character
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    pub radius: f32,
    pub stage: GrowthStage,
    pub movement: MovementState,
}

impl Player {
    pub fn new(position: Vec2, radius: f32, stage: GrowthStage) -> Self {
        Self {
            position,
            radius,
            stage,
            movement: MovementState::new(position),
        }
    }

    /// Place a player at the level's spawn point
    pub fn spawn(level: &Level, settings: &Settings) -> Self {
        let radius = settings.movement.player_radius;
        let position = clamp_to_bounds(level.spawn, &level.bounds, radius);
        Self::new(position, radius, level.stage)
    }

    pub fn hitbox(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    /// Units per second on `level`
    pub fn speed(&self, level: &Level, config: &MovementConfig) -> f32 {
        self.stage.base_speed(config) * level.speed_multiplier
    }

    pub fn facing(&self) -> Direction {
        self.movement.facing.direction
    }

    pub fn tilt(&self) -> f32 {
        self.movement.facing.tilt
    }

    pub fn is_moving(&self) -> bool {
        self.movement.facing.moving
    }

    pub fn is_colliding(&self) -> bool {
        self.movement.colliding
    }

    pub fn last_contact(&self) -> Option<Vec2> {
        self.movement.last_contact
    }

    pub fn camera_target(&self) -> Vec2 {
        self.movement.camera.target()
    }

    pub fn grow_to(&mut self, stage: GrowthStage) {
        if self.stage != stage {
            log::info!("player stage {:?} -> {:?}", self.stage, stage);
            self.stage = stage;
        }
    }

    /// Teleport (level change, respawn); resets collision and camera state
    pub fn place(&mut self, position: Vec2, level: &Level) {
        self.position = clamp_to_bounds(position, &level.bounds, self.radius);
        let facing = self.movement.facing;
        self.movement = MovementState::new(self.position);
        self.movement.facing = facing;
    }

    /// Number of sub-steps needed so no single move exceeds half the radius
    fn substeps_for(&self, distance: f32) -> u32 {
        let max_move = (self.radius * SUBSTEP_RADIUS_FRACTION).max(1.0);
        let needed = (distance / max_move).ceil();
        if needed.is_finite() {
            (needed as u32).clamp(1, MAX_SUBSTEPS)
        } else {
            1
        }
    }

    /// Advance the player by one tick.
    ///
    /// The move is split into sub-steps with contacts refreshed after each,
    /// so a long frame cannot carry the player across a thin obstacle.
    pub fn step(
        &mut self,
        input: Vec2,
        dt: f32,
        level: &Level,
        settings: &Settings,
    ) -> StepOutcome {
        let dt = clamp_frame_dt(dt);
        let input = sanitize(input);
        let start = self.position;
        let was_colliding = self.movement.colliding;

        let mut intended = Vec2::ZERO;
        if input.length() > INPUT_EPSILON {
            intended = input.normalize() * self.speed(level, &settings.movement) * dt;
        }

        let substeps = self.substeps_for(intended.length());
        let part = intended / substeps as f32;
        let mut displacement = Vec2::ZERO;
        for _ in 0..substeps {
            let mut d = part;
            if self.movement.colliding {
                let push_outs: Vec<Vec2> = self
                    .movement
                    .contacts
                    .iter()
                    .map(|c| c.result.push_out)
                    .collect();
                d = slide_all(d, &push_outs);
            }
            self.position = clamp_to_bounds(self.position + d, &level.bounds, self.radius);
            displacement += d;
            self.refresh_contacts(level, settings.movement.push_out_nudge);
        }

        let facing_changed = self
            .movement
            .facing
            .update(input, dt, &settings.effective_facing());

        let collision_started = !was_colliding && self.movement.colliding;
        let collision_ended = was_colliding && !self.movement.colliding;

        if collision_started {
            log::debug!(
                "collision started at ({:.1}, {:.1})",
                self.position.x,
                self.position.y
            );
        }

        self.movement.camera.update(
            self.position,
            collision_started,
            self.movement.colliding,
            dt,
            &settings.camera,
        );

        StepOutcome {
            displacement,
            moved: self.position - start,
            collision_started,
            collision_ended,
            facing_changed,
        }
    }

    /// Recompute contacts against every obstacle and nudge out of the
    /// deepest one.
    fn refresh_contacts(&mut self, level: &Level, nudge: f32) {
        let contacts = resolve_against(self.hitbox(), level.obstacle_shapes());

        if let Some(deepest) = contacts.first() {
            let result = deepest.result;
            if result.is_resolvable() {
                let push = (result.penetration - CONTACT_SKIN).clamp(0.0, nudge.max(0.0));
                self.position = clamp_to_bounds(
                    self.position + result.push_out * push,
                    &level.bounds,
                    self.radius,
                );
            }
            self.movement.collision_normal = result.push_out;
            self.movement.last_contact = Some(result.point);
        } else {
            self.movement.collision_normal = Vec2::ZERO;
        }

        self.movement.colliding = !contacts.is_empty();
        self.movement.contacts = contacts;
    }
}
