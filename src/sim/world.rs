//! Entity store and per-frame systems
//!
//! Entities are plain structs with optional capabilities. Systems are free
//! functions over the world; they iterate entities in id order so runs are
//! reproducible.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::player_vs_shape;
use super::effects::{EffectKind, Emitter};
use super::event::{EventQueue, GameEvent};
use super::facing::Direction;
use super::geom::{Circle, Hitbox};
use super::level::Level;
use crate::settings::Settings;

/// Drawable sprite and the cardinal it faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    pub facing: Direction,
}

impl Sprite {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            facing: Direction::default(),
        }
    }
}

/// Closed loop of points walked at constant speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoints {
    pub points: Vec<Vec2>,
    /// Index of the point currently walked toward
    pub next: usize,
    pub speed: f32,
}

/// Collectible payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: u32,
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub position: Vec2,
    pub label: Option<String>,
    pub hitbox: Option<Hitbox>,
    pub sprite: Option<Sprite>,
    pub waypoints: Option<Waypoints>,
    pub memory: Option<MemoryItem>,
    pub effects: Vec<Emitter>,
}

impl Entity {
    pub fn new(id: u32, position: Vec2) -> Self {
        Self {
            id,
            position,
            label: None,
            hitbox: None,
            sprite: None,
            waypoints: None,
            memory: None,
            effects: Vec::new(),
        }
    }

    /// Nothing left to show or do
    fn is_spent(&self) -> bool {
        self.hitbox.is_none()
            && self.sprite.is_none()
            && self.waypoints.is_none()
            && self.memory.is_none()
            && self.effects.iter().all(Emitter::is_finished)
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct World {
    /// Sorted by id
    pub entities: Vec<Entity>,
    pub rng: Pcg32,
    next_id: u32,
    player_id: u32,
    collected: Vec<MemoryItem>,
}

impl World {
    /// Empty world holding only the player's avatar entity
    pub fn new(seed: u64, player_position: Vec2) -> Self {
        let mut world = Self {
            entities: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            player_id: 0,
            collected: Vec::new(),
        };
        let mut avatar = Entity::new(0, player_position);
        avatar.label = Some("player".to_string());
        avatar.sprite = Some(Sprite::new("player"));
        world.player_id = world.spawn(avatar);
        world
    }

    /// Spawn the level's memory items and wanderers
    pub fn from_level(level: &Level, seed: u64, player_position: Vec2) -> Self {
        let mut world = Self::new(seed, player_position);

        for def in &level.memories {
            let mut entity = Entity::new(0, def.position);
            entity.label = Some(def.photo.clone());
            entity.hitbox = Some(Hitbox::circle(def.radius));
            entity.sprite = Some(Sprite::new("memory-glow"));
            entity.memory = Some(MemoryItem {
                id: def.id,
                photo: def.photo.clone(),
            });
            world.spawn(entity);
        }

        for npc in &level.npcs {
            let mut entity = Entity::new(0, npc.position);
            entity.label = Some(npc.label.clone());
            entity.sprite = Some(Sprite::new(npc.sprite.as_deref().unwrap_or(&npc.label)));
            if !npc.waypoints.is_empty() {
                entity.waypoints = Some(Waypoints {
                    points: npc.waypoints.clone(),
                    next: 0,
                    speed: npc.speed,
                });
            }
            world.spawn(entity);
        }

        log::debug!("world built with {} entities", world.entities.len());
        world
    }

    /// Add an entity, assigning it a fresh id
    pub fn spawn(&mut self, mut entity: Entity) -> u32 {
        entity.id = self.next_id;
        self.next_id += 1;
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn player_id(&self) -> u32 {
        self.player_id
    }

    /// Memories picked up so far, in pickup order
    pub fn collected(&self) -> &[MemoryItem] {
        &self.collected
    }

    /// Hand the collected list over (for a level change)
    pub fn take_collected(&mut self) -> Vec<MemoryItem> {
        std::mem::take(&mut self.collected)
    }

    /// Reinstate previously collected memories, despawning any that this
    /// world would otherwise offer again
    pub fn restore_collected(&mut self, items: Vec<MemoryItem>) {
        self.entities.retain(|e| {
            e.memory
                .as_ref()
                .is_none_or(|m| !items.iter().any(|c| c.id == m.id))
        });
        self.collected = items;
    }

    /// Memories still waiting to be found
    pub fn remaining_memories(&self) -> usize {
        self.entities.iter().filter(|e| e.memory.is_some()).count()
    }

    /// Move the avatar entity (sprite, sleep glyphs) onto the player
    pub fn sync_player(&mut self, position: Vec2, facing: Direction) {
        let id = self.player_id;
        if let Some(avatar) = self.get_mut(id) {
            avatar.position = position;
            if let Some(sprite) = avatar.sprite.as_mut() {
                sprite.facing = facing;
            }
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.get(self.player_id)
            .is_some_and(|e| e.has_effect(EffectKind::Sleep))
    }

    /// Attach the sleep emitter to the player; false if already asleep
    pub fn start_sleep(&mut self, max_particles: usize) -> bool {
        let id = self.player_id;
        match self.get_mut(id) {
            Some(avatar) if !avatar.has_effect(EffectKind::Sleep) => {
                avatar.effects.push(Emitter::sleep(avatar.position, max_particles));
                true
            }
            _ => false,
        }
    }

    /// Remove the sleep emitter; false if the player was awake
    pub fn stop_sleep(&mut self) -> bool {
        let id = self.player_id;
        match self.get_mut(id) {
            Some(avatar) => {
                let before = avatar.effects.len();
                avatar.effects.retain(|e| e.kind != EffectKind::Sleep);
                avatar.effects.len() != before
            }
            None => false,
        }
    }
}

/// Walk every entity with waypoints toward its next point, looping
pub fn waypoint_system(world: &mut World, dt: f32) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    for entity in &mut world.entities {
        let Some(path) = entity.waypoints.as_mut() else {
            continue;
        };
        if path.points.is_empty() {
            continue;
        }
        path.next %= path.points.len();

        let target = path.points[path.next];
        let to_target = target - entity.position;
        let distance = to_target.length();
        let step = path.speed.max(0.0) * dt;

        if distance <= step {
            entity.position = target;
            path.next = (path.next + 1) % path.points.len();
        } else {
            entity.position += to_target / distance * step;
        }

        let heading = Direction::from_vector(to_target);
        if let (Some(sprite), Some(dir)) = (entity.sprite.as_mut(), heading) {
            sprite.facing = dir;
        }
    }
}

/// Pick up every memory the player overlaps.
///
/// The memory capability, its trigger and its sprite are removed; a heart
/// burst plays where it stood. Returns the collected memory ids.
pub fn collect_system(
    world: &mut World,
    player: Circle,
    settings: &Settings,
    events: &mut EventQueue,
) -> Vec<u32> {
    let mut picked = Vec::new();
    let max_particles = settings.quality.max_particles();

    for entity in &mut world.entities {
        if entity.memory.is_none() {
            continue;
        }
        let Some(hitbox) = entity.hitbox else {
            continue;
        };
        if !player_vs_shape(player, &hitbox.at(entity.position)).hit {
            continue;
        }
        let Some(memory) = entity.memory.take() else {
            continue;
        };

        entity.hitbox = None;
        entity.sprite = None;
        entity.effects.push(Emitter::heart_burst(
            entity.position,
            settings.effects.heart_count,
            max_particles,
        ));

        log::info!("memory {} collected ({})", memory.id, memory.photo);
        events.push(GameEvent::MemoryCollected {
            id: memory.id,
            photo: memory.photo.clone(),
        });
        picked.push(memory.id);
        world.collected.push(memory);
    }

    picked
}

/// Advance every emitter, drop finished ones and despawn spent entities
pub fn effects_system(world: &mut World, dt: f32) {
    let World { entities, rng, .. } = world;
    for entity in entities.iter_mut() {
        for emitter in &mut entity.effects {
            if emitter.kind == EffectKind::Sleep {
                emitter.origin = entity.position;
            }
            emitter.advance(dt, rng);
        }
        entity.effects.retain(|e| !e.is_finished());
    }
    entities.retain(|e| !e.is_spent());
}
