//! Spatial primitives shared by collision and visibility
//!
//! World space uses screen axes: +x right, +y down. Rectangles are
//! axis-aligned and stored as min/max corners.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Rectangle anchored at its top-left corner
    pub fn from_top_left(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, pos + size)
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Zero or negative width/height, or non-finite corners
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        !(self.min.is_finite() && self.max.is_finite()) || size.x <= 0.0 || size.y <= 0.0
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Point of the rectangle closest to `p` (p itself when inside)
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Distance from `p` to the rectangle (0 when inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        (p - self.closest_point(p)).length()
    }

    /// Grow (or shrink, for negative `amount`) on every side.
    /// Shrinking past the center collapses to the center.
    pub fn inflate(&self, amount: f32) -> Rect {
        let center = self.center();
        let half = (self.size() * 0.5 + Vec2::splat(amount)).max(Vec2::ZERO);
        Rect {
            min: center - half,
            max: center + half,
        }
    }
}

/// Circle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.center.is_finite() && self.radius.is_finite()) || self.radius <= 0.0
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.center, Vec2::splat(self.radius * 2.0))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// Hitbox shape relative to its owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f32 },
    /// Rectangle whose top-left corner sits at the hitbox origin
    Rect { size: Vec2 },
}

/// A shape placed in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    Circle(Circle),
    Rect(Rect),
}

impl WorldShape {
    /// Bounding rectangle of the shape
    pub fn bounds(&self) -> Rect {
        match self {
            WorldShape::Circle(c) => c.bounds(),
            WorldShape::Rect(r) => *r,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        match self {
            WorldShape::Circle(c) => c.is_degenerate(),
            WorldShape::Rect(r) => r.is_degenerate(),
        }
    }

    /// Distance from `p` to the shape's boundary (0 when inside)
    pub fn distance_to(&self, p: Vec2) -> f32 {
        match self {
            WorldShape::Circle(c) => (p.distance(c.center) - c.radius).max(0.0),
            WorldShape::Rect(r) => r.distance_to(p),
        }
    }
}

/// Collision shape attached to an entity at an entity-relative offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub shape: Shape,
    #[serde(default)]
    pub offset: Vec2,
}

impl Hitbox {
    pub fn circle(radius: f32) -> Self {
        Self {
            shape: Shape::Circle { radius },
            offset: Vec2::ZERO,
        }
    }

    pub fn rect(size: Vec2) -> Self {
        Self {
            shape: Shape::Rect { size },
            offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Resolve to world space for an owner at `position`
    pub fn at(&self, position: Vec2) -> WorldShape {
        let origin = position + self.offset;
        match self.shape {
            Shape::Circle { radius } => WorldShape::Circle(Circle::new(origin, radius)),
            Shape::Rect { size } => WorldShape::Rect(Rect::from_top_left(origin, size)),
        }
    }
}

/// Ray vs axis-aligned rectangle (slab test)
///
/// Returns the entry parameter `t` in `[0, max_t]` along `dir` (not required
/// to be normalized). A ray starting inside the rectangle hits at `t = 0`.
/// Zero-length directions never hit.
pub fn ray_aabb(origin: Vec2, dir: Vec2, max_t: f32, rect: &Rect) -> Option<f32> {
    if dir.length_squared() < 1e-12 || !dir.is_finite() || rect.is_degenerate() {
        return None;
    }

    let mut t_min = 0.0_f32;
    let mut t_max = max_t;

    for axis in 0..2 {
        let o = origin[axis];
        let d = dir[axis];
        let lo = rect.min[axis];
        let hi = rect.max[axis];

        if d.abs() < 1e-9 {
            // Parallel to this slab: must already be between its planes
            if o < lo || o > hi {
                return None;
            }
        } else {
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_top_left() {
        let r = Rect::from_top_left(Vec2::new(110.0, 90.0), Vec2::new(50.0, 50.0));
        assert_eq!(r.min, Vec2::new(110.0, 90.0));
        assert_eq!(r.max, Vec2::new(160.0, 140.0));
        assert_eq!(r.center(), Vec2::new(135.0, 115.0));
    }

    #[test]
    fn test_rect_closest_point_and_distance() {
        let r = Rect::from_top_left(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert_eq!(r.closest_point(Vec2::new(15.0, 5.0)), Vec2::new(10.0, 5.0));
        assert_eq!(r.closest_point(Vec2::new(5.0, 5.0)), Vec2::new(5.0, 5.0));
        assert!((r.distance_to(Vec2::new(13.0, 14.0)) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_inflate_collapses_to_center() {
        let r = Rect::from_top_left(Vec2::ZERO, Vec2::new(10.0, 4.0));
        let shrunk = r.inflate(-3.0);
        assert_eq!(shrunk.min, Vec2::new(3.0, 2.0));
        assert_eq!(shrunk.max, Vec2::new(7.0, 2.0));
    }

    #[test]
    fn test_degenerate_shapes() {
        assert!(Rect::from_top_left(Vec2::ZERO, Vec2::new(0.0, 5.0)).is_degenerate());
        assert!(Circle::new(Vec2::ZERO, 0.0).is_degenerate());
        assert!(!Circle::new(Vec2::ZERO, 1.0).is_degenerate());
    }

    #[test]
    fn test_hitbox_offset() {
        let hb = Hitbox::rect(Vec2::new(4.0, 4.0)).with_offset(Vec2::new(-2.0, -2.0));
        match hb.at(Vec2::new(10.0, 10.0)) {
            WorldShape::Rect(r) => assert_eq!(r.center(), Vec2::new(10.0, 10.0)),
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let r = Rect::from_top_left(Vec2::new(10.0, -5.0), Vec2::new(10.0, 10.0));
        let hit = ray_aabb(Vec2::ZERO, Vec2::X, 100.0, &r).expect("ray should hit");
        assert!((hit - 10.0).abs() < 1e-5);
        assert!(ray_aabb(Vec2::ZERO, Vec2::Y, 100.0, &r).is_none());
        // Too short
        assert!(ray_aabb(Vec2::ZERO, Vec2::X, 5.0, &r).is_none());
        // Zero direction is skipped
        assert!(ray_aabb(Vec2::ZERO, Vec2::ZERO, 100.0, &r).is_none());
    }

    #[test]
    fn test_ray_aabb_from_inside() {
        let r = Rect::from_top_left(Vec2::new(-5.0, -5.0), Vec2::new(10.0, 10.0));
        assert_eq!(ray_aabb(Vec2::ZERO, Vec2::X, 50.0, &r), Some(0.0));
    }
}
