//! Level data: playable bounds, static obstacles, memory items, zones
//!
//! Levels are authored as JSON (see `assets/levels/`) and loaded once before
//! play starts. Obstacles are immutable for the lifetime of the level.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::controller::GrowthStage;
use super::geom::{Hitbox, Rect, Shape, WorldShape};

/// Static collision geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner for rectangles, center for circles
    pub position: Vec2,
    pub hitbox: Hitbox,
    #[serde(default)]
    pub label: Option<String>,
}

impl Obstacle {
    pub fn rect(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            hitbox: Hitbox::rect(size),
            label: None,
        }
    }

    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            position: center,
            hitbox: Hitbox::circle(radius),
            label: None,
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn world_shape(&self) -> WorldShape {
        self.hitbox.at(self.position)
    }

    pub fn bounds(&self) -> Rect {
        self.world_shape().bounds()
    }
}

/// A collectible memory that surfaces a family photograph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDef {
    pub id: u32,
    pub position: Vec2,
    #[serde(default = "default_memory_radius")]
    pub radius: f32,
    /// Photograph identifier handed to the presentation layer
    pub photo: String,
}

fn default_memory_radius() -> f32 {
    24.0
}

/// Labeled region (music / ambience zone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDef {
    pub label: String,
    pub rect: Rect,
}

/// Ambient wanderer following a waypoint loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcDef {
    pub label: String,
    pub position: Vec2,
    pub speed: f32,
    #[serde(default)]
    pub waypoints: Vec<Vec2>,
    #[serde(default)]
    pub sprite: Option<String>,
}

fn default_speed_multiplier() -> f32 {
    1.0
}

/// A playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Playable area; the player's hitbox stays inside it
    pub bounds: Rect,
    /// Scale for levels drawn at a different zoom, so apparent speed matches
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
    #[serde(default)]
    pub stage: GrowthStage,
    pub spawn: Vec2,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default)]
    pub memories: Vec<MemoryDef>,
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    #[serde(default)]
    pub npcs: Vec<NpcDef>,
}

impl Level {
    /// Empty level covering `bounds`, spawning at its center
    pub fn empty(name: &str, bounds: Rect) -> Self {
        Self {
            name: name.to_string(),
            bounds,
            speed_multiplier: 1.0,
            stage: GrowthStage::default(),
            spawn: bounds.center(),
            obstacles: Vec::new(),
            memories: Vec::new(),
            zones: Vec::new(),
            npcs: Vec::new(),
        }
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// World-space shapes of every obstacle, in obstacle order
    pub fn obstacle_shapes(&self) -> impl Iterator<Item = WorldShape> + '_ {
        self.obstacles.iter().map(Obstacle::world_shape)
    }

    /// Labels of the zones containing `point`
    pub fn zones_at(&self, point: Vec2) -> impl Iterator<Item = &ZoneDef> + '_ {
        self.zones.iter().filter(move |z| z.rect.contains(point))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        let level: Level = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse level JSON: {e}"))?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.bounds.is_degenerate() {
            return Err(format!("Level '{}': bounds must have positive size", self.name));
        }
        if !self.speed_multiplier.is_finite() || self.speed_multiplier <= 0.0 {
            return Err(format!("Level '{}': speed_multiplier must be > 0", self.name));
        }
        if !self.bounds.contains(self.spawn) {
            return Err(format!(
                "Level '{}': spawn ({}, {}) outside bounds",
                self.name, self.spawn.x, self.spawn.y
            ));
        }
        for (i, obstacle) in self.obstacles.iter().enumerate() {
            let degenerate = match obstacle.hitbox.shape {
                Shape::Circle { radius } => !radius.is_finite() || radius <= 0.0,
                Shape::Rect { size } => !size.is_finite() || size.x <= 0.0 || size.y <= 0.0,
            };
            if degenerate || !obstacle.position.is_finite() {
                return Err(format!("Level '{}': obstacle {i} has a degenerate hitbox", self.name));
            }
        }
        let mut seen = HashSet::new();
        for memory in &self.memories {
            if !seen.insert(memory.id) {
                return Err(format!(
                    "Level '{}': duplicate memory id {}",
                    self.name, memory.id
                ));
            }
            if !memory.radius.is_finite() || memory.radius <= 0.0 {
                return Err(format!(
                    "Level '{}': memory {} radius must be > 0",
                    self.name, memory.id
                ));
            }
        }
        for npc in &self.npcs {
            if !npc.speed.is_finite() || npc.speed < 0.0 {
                return Err(format!(
                    "Level '{}': npc '{}' speed must be >= 0",
                    self.name, npc.label
                ));
            }
        }
        Ok(())
    }

    /// Built-in ground floor of the house
    pub fn demo_house() -> Self {
        let bounds = Rect::from_top_left(Vec2::ZERO, Vec2::new(960.0, 640.0));
        let mut level = Level::empty("ground-floor", bounds);
        level.spawn = Vec2::new(120.0, 520.0);
        level.obstacles = vec![
            Obstacle::rect(Vec2::new(0.0, 300.0), Vec2::new(380.0, 24.0))
                .labeled("hall-wall-west"),
            Obstacle::rect(Vec2::new(500.0, 300.0), Vec2::new(460.0, 24.0))
                .labeled("hall-wall-east"),
            Obstacle::rect(Vec2::new(80.0, 80.0), Vec2::new(180.0, 70.0)).labeled("sofa"),
            Obstacle::circle(Vec2::new(640.0, 150.0), 45.0).labeled("dining-table"),
            Obstacle::rect(Vec2::new(860.0, 360.0), Vec2::new(60.0, 200.0)).labeled("bookshelf"),
            Obstacle::circle(Vec2::new(420.0, 500.0), 28.0).labeled("plant"),
        ];
        level.memories = vec![
            MemoryDef {
                id: 1,
                position: Vec2::new(170.0, 200.0),
                radius: 24.0,
                photo: "beach-summer".to_string(),
            },
            MemoryDef {
                id: 2,
                position: Vec2::new(760.0, 120.0),
                radius: 24.0,
                photo: "birthday-cake".to_string(),
            },
            MemoryDef {
                id: 3,
                position: Vec2::new(780.0, 560.0),
                radius: 24.0,
                photo: "first-bicycle".to_string(),
            },
        ];
        level.zones = vec![
            ZoneDef {
                label: "living-room".to_string(),
                rect: Rect::from_top_left(Vec2::ZERO, Vec2::new(480.0, 300.0)),
            },
            ZoneDef {
                label: "kitchen".to_string(),
                rect: Rect::from_top_left(Vec2::new(480.0, 0.0), Vec2::new(480.0, 300.0)),
            },
            ZoneDef {
                label: "hallway".to_string(),
                rect: Rect::from_top_left(Vec2::new(0.0, 324.0), Vec2::new(960.0, 316.0)),
            },
        ];
        level.npcs = vec![NpcDef {
            label: "cat".to_string(),
            position: Vec2::new(300.0, 420.0),
            speed: 40.0,
            waypoints: vec![
                Vec2::new(300.0, 420.0),
                Vec2::new(600.0, 420.0),
                Vec2::new(600.0, 580.0),
            ],
            sprite: Some("cat-walk".to_string()),
        }];
        level
    }
}

pub fn load_level_from_path(path: &Path) -> Result<Level, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let level = Level::from_json(&raw).map_err(|e| format!("{}: {e}", path.display()))?;
    log::info!(
        "Loaded level '{}' ({} obstacles, {} memories)",
        level.name,
        level.obstacles.len(),
        level.memories.len()
    );
    Ok(level)
}
