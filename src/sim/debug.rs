//! Debug overlay shapes
//!
//! Built once per tick when the debug overlay is switched on; the renderer
//! draws them as outlines on top of the scene.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::controller::Player;
use super::fog::VisibilityField;
use super::geom::{Rect, WorldShape};
use super::level::Level;
use super::world::World;
use crate::settings::Settings;

/// Palette slot; the renderer picks the actual colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugColor {
    Player,
    Obstacle,
    Contact,
    Trigger,
    Ray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DebugShape {
    Circle {
        center: Vec2,
        radius: f32,
        color: DebugColor,
    },
    Rect {
        rect: Rect,
        color: DebugColor,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: DebugColor,
    },
}

impl DebugShape {
    fn from_world_shape(shape: WorldShape, color: DebugColor) -> Self {
        match shape {
            WorldShape::Circle(c) => DebugShape::Circle {
                center: c.center,
                radius: c.radius,
                color,
            },
            WorldShape::Rect(rect) => DebugShape::Rect { rect, color },
        }
    }

    pub fn color(&self) -> DebugColor {
        match self {
            DebugShape::Circle { color, .. }
            | DebugShape::Rect { color, .. }
            | DebugShape::Line { color, .. } => *color,
        }
    }
}

/// Length of the drawn push-out normal
const NORMAL_LENGTH: f32 = 24.0;

/// Overlay shapes for the current frame (empty unless debug is enabled)
pub fn debug_shapes(
    settings: &Settings,
    level: &Level,
    player: &Player,
    world: &World,
    visibility: &VisibilityField,
) -> Vec<DebugShape> {
    let mut shapes = Vec::new();

    if settings.debug_hitboxes() {
        shapes.push(DebugShape::Circle {
            center: player.position,
            radius: player.radius,
            color: DebugColor::Player,
        });
        shapes.extend(
            level
                .obstacle_shapes()
                .map(|s| DebugShape::from_world_shape(s, DebugColor::Obstacle)),
        );
        for entity in &world.entities {
            if let Some(hitbox) = entity.hitbox {
                shapes.push(DebugShape::from_world_shape(
                    hitbox.at(entity.position),
                    DebugColor::Trigger,
                ));
            }
        }
        for contact in &player.movement.contacts {
            let r = contact.result;
            shapes.push(DebugShape::Circle {
                center: r.point,
                radius: 3.0,
                color: DebugColor::Contact,
            });
            shapes.push(DebugShape::Line {
                from: r.point,
                to: r.point + r.push_out * NORMAL_LENGTH,
                color: DebugColor::Contact,
            });
        }
    }

    if settings.debug_rays() {
        let center = visibility.center();
        shapes.extend(visibility.edge_points(settings.fog_rays()).into_iter().map(|to| {
            DebugShape::Line {
                from: center,
                to,
                color: DebugColor::Ray,
            }
        }));
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fog;
    use crate::sim::level::Obstacle;

    fn scene() -> (Level, Player, World, VisibilityField) {
        let level = Level::empty("dbg", Rect::from_top_left(Vec2::ZERO, Vec2::splat(300.0)))
            .with_obstacle(Obstacle::rect(Vec2::new(10.0, 10.0), Vec2::splat(30.0)))
            .with_obstacle(Obstacle::circle(Vec2::new(200.0, 200.0), 15.0));
        let settings = Settings::default();
        let player = Player::spawn(&level, &settings);
        let world = World::from_level(&level, 1, player.position);
        let shapes: Vec<WorldShape> = level.obstacle_shapes().collect();
        let field = fog::compute(player.position, &shapes, 0.0, &settings);
        (level, player, world, field)
    }

    #[test]
    fn test_disabled_overlay_is_empty() {
        let (level, player, world, field) = scene();
        let mut settings = Settings::default();
        settings.debug.show_hitboxes = true;
        settings.debug.show_rays = true;
        assert!(debug_shapes(&settings, &level, &player, &world, &field).is_empty());
    }

    #[test]
    fn test_hitboxes_and_rays() {
        let (level, player, world, field) = scene();
        let mut settings = Settings::default();
        settings.debug.enabled = true;
        settings.debug.show_hitboxes = true;
        let shapes = debug_shapes(&settings, &level, &player, &world, &field);
        // Player plus two obstacles
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0].color(), DebugColor::Player);

        settings.debug.show_rays = true;
        let shapes = debug_shapes(&settings, &level, &player, &world, &field);
        let rays = shapes.iter().filter(|s| s.color() == DebugColor::Ray).count();
        assert_eq!(rays, settings.fog_rays());
    }
}
