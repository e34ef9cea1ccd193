//! Camera follow target
//!
//! The follow target eases toward the player every frame. When the player
//! starts pushing against an obstacle the target freezes, so the camera does
//! not jitter while the controller nudges the player out of the wall.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::per_frame_smoothing;
use crate::settings::CameraConfig;

/// Where the player was when the current freeze began
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreezeAnchor {
    pub onset: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFollow {
    target: Vec2,
    frozen: Option<FreezeAnchor>,
    distance_since_collision: f32,
}

impl CameraFollow {
    /// Start centered on `position`
    pub fn new(position: Vec2) -> Self {
        Self {
            target: position,
            frozen: None,
            distance_since_collision: 0.0,
        }
    }

    /// Smoothed point the renderer should center on
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn anchor(&self) -> Option<FreezeAnchor> {
        self.frozen
    }

    /// Distance from the collision onset point (0 when not frozen)
    pub fn distance_since_collision(&self) -> f32 {
        self.distance_since_collision
    }

    /// Jump straight to `position`, dropping any freeze
    pub fn snap_to(&mut self, position: Vec2) {
        self.target = position;
        self.frozen = None;
        self.distance_since_collision = 0.0;
    }

    /// Advance one frame.
    ///
    /// `collision_onset` freezes the target where it is; a frozen target stays
    /// put until the player is more than `resume_distance` from the onset
    /// point or the collision has ended.
    pub fn update(
        &mut self,
        player: Vec2,
        collision_onset: bool,
        colliding: bool,
        dt: f32,
        config: &CameraConfig,
    ) {
        if collision_onset && self.frozen.is_none() {
            self.frozen = Some(FreezeAnchor { onset: player });
            log::debug!("camera frozen at ({:.1}, {:.1})", self.target.x, self.target.y);
        }

        if let Some(anchor) = self.frozen {
            self.distance_since_collision = player.distance(anchor.onset);
            if !colliding || self.distance_since_collision > config.resume_distance {
                self.frozen = None;
                self.distance_since_collision = 0.0;
                log::debug!("camera resumed");
            } else {
                return;
            }
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let alpha = per_frame_smoothing(config.follow_rate, dt);
        self.target = self.target.lerp(player, alpha);
    }
}
