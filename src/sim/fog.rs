//! Fog-of-war visibility field
//!
//! Recomputed from scratch every frame from the player position and the
//! static obstacle shapes. Render input only: nothing here feeds back into
//! movement or collision.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, WorldShape, ray_aabb};
use crate::settings::{FogConfig, FogMode, Settings};
use crate::{unit_from_angle, vector_angle};

/// Visibility around the player.
///
/// Inside `inner_radius` everything is visible, beyond `outer_radius`
/// everything is dark, with a linear fade between. The organic variant
/// replaces the outer circle with one edge distance per ray and scales the
/// inner edge by the same ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisibilityField {
    Annulus {
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
    },
    Organic {
        center: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        /// Edge distance per ray; ray `i` points at `TAU * i / rays.len()`
        rays: Vec<f32>,
    },
}

impl VisibilityField {
    pub fn center(&self) -> Vec2 {
        match self {
            VisibilityField::Annulus { center, .. } | VisibilityField::Organic { center, .. } => {
                *center
            }
        }
    }

    pub fn inner_radius(&self) -> f32 {
        match self {
            VisibilityField::Annulus { inner_radius, .. }
            | VisibilityField::Organic { inner_radius, .. } => *inner_radius,
        }
    }

    pub fn outer_radius(&self) -> f32 {
        match self {
            VisibilityField::Annulus { outer_radius, .. }
            | VisibilityField::Organic { outer_radius, .. } => *outer_radius,
        }
    }

    /// Ray edge distances (empty for the annulus)
    pub fn rays(&self) -> &[f32] {
        match self {
            VisibilityField::Annulus { .. } => &[],
            VisibilityField::Organic { rays, .. } => rays,
        }
    }

    /// Fraction of the outer edge that is fully visible
    fn inner_ratio(&self) -> f32 {
        let outer = self.outer_radius();
        if outer > 0.0 {
            (self.inner_radius() / outer).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Outer edge distance in direction `theta`
    pub fn edge_at(&self, theta: f32) -> f32 {
        let rays = self.rays();
        if rays.is_empty() {
            return self.outer_radius();
        }
        let n = rays.len();
        let pos = theta.rem_euclid(TAU) / TAU * n as f32;
        let i = (pos.floor() as usize) % n;
        let j = (i + 1) % n;
        let t = pos - pos.floor();
        rays[i] + (rays[j] - rays[i]) * t
    }

    /// Visibility at a world point: 1 fully visible, 0 fully dark
    pub fn visibility_at(&self, point: Vec2) -> f32 {
        let offset = point - self.center();
        let d = offset.length();
        let outer = self.edge_at(vector_angle(offset));
        let inner = outer * self.inner_ratio();
        if d <= inner {
            1.0
        } else if d >= outer {
            0.0
        } else {
            1.0 - (d - inner) / (outer - inner).max(f32::EPSILON)
        }
    }

    /// Outline of the dark edge (one point per ray, or a sampled circle)
    pub fn edge_points(&self, samples: usize) -> Vec<Vec2> {
        let n = if self.rays().is_empty() {
            samples.max(3)
        } else {
            self.rays().len()
        };
        (0..n)
            .map(|i| {
                let theta = TAU * i as f32 / n as f32;
                self.center() + unit_from_angle(theta) * self.edge_at(theta)
            })
            .collect()
    }
}

/// Inner and outer radius for a player at `center`.
///
/// Each obstacle whose nearest point lies within the influence range adds a
/// proximity `p = 1 - d / range`; the inner radius shrinks by the
/// proximity-weighted average of those values.
pub fn annulus_radii(center: Vec2, shapes: &[WorldShape], config: &FogConfig) -> (f32, f32) {
    let outer = config.base_outer_radius.max(0.0);
    let base_inner = config.base_inner_radius.clamp(0.0, outer);
    let range = config.influence_range;
    if !(range.is_finite() && range > 0.0) || !center.is_finite() {
        return (base_inner, outer);
    }

    let (weighted, total) = shapes
        .iter()
        .filter(|s| !s.is_degenerate())
        .map(|s| s.distance_to(center))
        .filter(|d| *d < range)
        .map(|d| 1.0 - d / range)
        .fold((0.0_f32, 0.0_f32), |(w, t), p| (w + p * p, t + p));

    if total <= 0.0 {
        return (base_inner, outer);
    }

    let average = weighted / total;
    let reduction = config.max_inner_reduction.clamp(0.0, 1.0) * average;
    let inner = (base_inner * (1.0 - reduction)).clamp(0.0, outer);
    (inner, outer)
}

/// Simple annulus field
pub fn annulus(center: Vec2, shapes: &[WorldShape], config: &FogConfig) -> VisibilityField {
    let (inner_radius, outer_radius) = annulus_radii(center, shapes, config);
    VisibilityField::Annulus {
        center,
        inner_radius,
        outer_radius,
    }
}

/// Summed sine perturbation of the edge at angle `theta` and time `time`
fn edge_wobble(theta: f32, time: f32, config: &FogConfig) -> f32 {
    config
        .waves
        .iter()
        .map(|w| w.amplitude * (w.frequency * theta + w.speed * time + w.phase).sin())
        .sum()
}

/// Organic field: `ray_count` rays with an animated wobbly edge, shortened
/// where they pass through an obstacle's bounding rectangle.
pub fn organic(
    center: Vec2,
    shapes: &[WorldShape],
    time: f32,
    ray_count: usize,
    config: &FogConfig,
) -> VisibilityField {
    let (inner_radius, outer_radius) = annulus_radii(center, shapes, config);
    let floor = (config.min_ray_fraction.max(0.0) * config.base_inner_radius.max(0.0))
        .min(outer_radius);
    let penetration = config.shadow_penetration.clamp(0.0, 1.0);
    let time = if time.is_finite() { time } else { 0.0 };

    // Obstacles the player stands inside would black out every ray
    let blockers: Vec<Rect> = shapes
        .iter()
        .filter(|s| !s.is_degenerate())
        .map(|s| s.bounds())
        .filter(|r| !r.contains(center))
        .collect();

    let rays = (0..ray_count)
        .map(|i| {
            let theta = TAU * i as f32 / ray_count as f32;
            let mut r = (outer_radius * (1.0 + edge_wobble(theta, time, config))).max(floor);
            let dir = unit_from_angle(theta);
            if dir.length_squared() < 1e-12 {
                return r;
            }
            for rect in &blockers {
                if let Some(hit) = ray_aabb(center, dir, r, rect) {
                    let attenuated = hit + (r - hit) * penetration;
                    r = r.min(attenuated.max(floor));
                }
            }
            r
        })
        .collect();

    VisibilityField::Organic {
        center,
        inner_radius,
        outer_radius,
        rays,
    }
}

/// Field for this frame according to `settings`
pub fn compute(
    center: Vec2,
    shapes: &[WorldShape],
    time: f32,
    settings: &Settings,
) -> VisibilityField {
    match settings.fog.mode {
        FogMode::Annulus => annulus(center, shapes, &settings.fog),
        FogMode::Organic => {
            let time = if settings.effective_fog_animation() {
                time
            } else {
                0.0
            };
            organic(center, shapes, time, settings.fog_rays(), &settings.fog)
        }
    }
}
