//! Collision detection and sliding response
//!
//! The player is always a circle. Obstacles are circles or axis-aligned
//! rectangles. Detection never blocks movement by itself: it reports a
//! push-out direction that the movement controller uses to nudge the player
//! out of penetration and to slide along the obstacle surface.

use glam::Vec2;

use super::geom::{Circle, Rect, WorldShape};

/// Push-out vectors shorter than this have no resolvable direction
const MIN_PUSH_OUT: f32 = 1e-6;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point estimate on the obstacle (if hit)
    pub point: Vec2,
    /// Unit vector from the contact toward the player center.
    /// Zero when the overlap has no resolvable direction.
    pub push_out: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            push_out: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    /// Whether the hit can be resolved by pushing out or sliding
    #[inline]
    pub fn is_resolvable(&self) -> bool {
        self.hit && self.push_out.length_squared() > MIN_PUSH_OUT
    }

    /// Surface tangent at the contact
    #[inline]
    pub fn tangent(&self) -> Vec2 {
        slide_tangent(self.push_out)
    }
}

/// A hit against one obstacle, tagged with the obstacle's index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub obstacle: usize,
    pub result: CollisionResult,
}

/// Circle vs circle
///
/// The contact point is the obstacle's surface point facing the player.
/// Concentric circles overlap with no push-out direction.
pub fn circle_circle(player: Circle, other: Circle) -> CollisionResult {
    if player.is_degenerate() || other.is_degenerate() {
        return CollisionResult::miss();
    }

    let delta = player.center - other.center;
    let dist = delta.length();
    let reach = player.radius + other.radius;
    if dist >= reach {
        return CollisionResult::miss();
    }

    let push_out = if dist > MIN_PUSH_OUT {
        delta / dist
    } else {
        Vec2::ZERO
    };

    CollisionResult {
        hit: true,
        point: other.center + push_out * other.radius,
        push_out,
        penetration: reach - dist,
    }
}

/// Circle vs axis-aligned rectangle
///
/// Clamps the circle center to the rectangle and measures the residual. When
/// the center is inside the rectangle the nearest edge is used instead; on an
/// exact tie the vertical (x-axis) edges win. A center exactly at the
/// rectangle center has no resolvable direction.
pub fn circle_rect(player: Circle, rect: &Rect) -> CollisionResult {
    if player.is_degenerate() || rect.is_degenerate() {
        return CollisionResult::miss();
    }

    let closest = rect.closest_point(player.center);
    let delta = player.center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > 0.0 {
        if dist_sq >= player.radius * player.radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            push_out: delta / dist,
            penetration: player.radius - dist,
        };
    }

    // Center inside the rectangle: leave through the nearest edge
    let c = player.center;
    if c == rect.center() {
        return CollisionResult {
            hit: true,
            point: c,
            push_out: Vec2::ZERO,
            penetration: player.radius + rect.size().min_element() * 0.5,
        };
    }

    let to_left = c.x - rect.min.x;
    let to_right = rect.max.x - c.x;
    let to_top = c.y - rect.min.y;
    let to_bottom = rect.max.y - c.y;

    let (edge_dist, point, push_out) = [
        (to_left, Vec2::new(rect.min.x, c.y), Vec2::NEG_X),
        (to_right, Vec2::new(rect.max.x, c.y), Vec2::X),
        (to_top, Vec2::new(c.x, rect.min.y), Vec2::NEG_Y),
        (to_bottom, Vec2::new(c.x, rect.max.y), Vec2::Y),
    ]
    .into_iter()
    .fold(
        (f32::INFINITY, c, Vec2::ZERO),
        |best, candidate| {
            if candidate.0 < best.0 {
                candidate
            } else {
                best
            }
        },
    );

    CollisionResult {
        hit: true,
        point,
        push_out,
        penetration: player.radius + edge_dist,
    }
}

/// Player circle vs any obstacle shape
pub fn player_vs_shape(player: Circle, shape: &WorldShape) -> CollisionResult {
    match shape {
        WorldShape::Circle(other) => circle_circle(player, *other),
        WorldShape::Rect(rect) => circle_rect(player, rect),
    }
}

/// Test the player against every obstacle shape.
///
/// Contacts are returned deepest first; equal depths keep obstacle order.
pub fn resolve_against<I>(player: Circle, shapes: I) -> Vec<Contact>
where
    I: IntoIterator<Item = WorldShape>,
{
    let mut contacts: Vec<Contact> = shapes
        .into_iter()
        .enumerate()
        .filter_map(|(obstacle, shape)| {
            let result = player_vs_shape(player, &shape);
            result.hit.then_some(Contact { obstacle, result })
        })
        .collect();
    contacts.sort_by(|a, b| {
        b.result
            .penetration
            .partial_cmp(&a.result.penetration)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    contacts
}

/// Surface tangent for a push-out direction (rotated 90°)
#[inline]
pub fn slide_tangent(push_out: Vec2) -> Vec2 {
    push_out.perp()
}

/// Slide a displacement along a surface
///
/// Motion into the surface is projected onto the tangent; motion away from
/// it is left alone. A zero push-out means the direction is unresolvable and
/// the displacement is blocked.
pub fn slide(displacement: Vec2, push_out: Vec2) -> Vec2 {
    if push_out.length_squared() <= MIN_PUSH_OUT {
        return Vec2::ZERO;
    }
    let normal = push_out.normalize();
    let into = displacement.dot(normal);
    if into >= 0.0 {
        return displacement;
    }
    let tangent = slide_tangent(normal);
    tangent * displacement.dot(tangent)
}

/// Slide against several surfaces (corners)
///
/// Repeats the projection so that clearing one wall cannot push the motion
/// back into another. Motion trapped between opposing walls ends at zero.
pub fn slide_all(displacement: Vec2, push_outs: &[Vec2]) -> Vec2 {
    let mut d = displacement;
    for _ in 0..3 {
        let before = d;
        for n in push_outs {
            d = slide(d, *n);
        }
        if d == before {
            break;
        }
    }
    let still_into = push_outs
        .iter()
        .any(|n| n.length_squared() > MIN_PUSH_OUT && d.dot(n.normalize()) < -1e-4);
    if still_into { Vec2::ZERO } else { d }
}
