//! Game state
//!
//! Everything a frame needs lives here: the loaded level, the player, the
//! entity world, and the outputs the renderer reads (visibility, debug
//! overlay, pending events).

use glam::Vec2;

use super::controller::Player;
use super::debug::DebugShape;
use super::event::{EventQueue, GameEvent};
use super::fog::{self, VisibilityField};
use super::geom::WorldShape;
use super::level::Level;
use super::world::World;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub level: Level,
    /// World-space obstacle shapes, cached at level load
    pub(crate) obstacle_shapes: Vec<WorldShape>,
    pub player: Player,
    pub world: World,
    pub visibility: VisibilityField,
    pub events: EventQueue,
    /// Debug overlay for the last tick (empty unless enabled)
    pub debug: Vec<DebugShape>,
    /// Seconds simulated so far
    pub time: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds since the player last moved
    pub idle_time: f32,
    /// Labels of the zones the player currently stands in
    pub zones: Vec<String>,
    pub config: Settings,
}

impl GameState {
    /// Start a run on `level`
    pub fn new(level: Level, config: Settings, seed: u64) -> Self {
        let player = Player::spawn(&level, &config);
        let world = World::from_level(&level, seed, player.position);
        let obstacle_shapes: Vec<WorldShape> = level.obstacle_shapes().collect();
        let visibility = fog::compute(player.position, &obstacle_shapes, 0.0, &config);

        let mut state = Self {
            seed,
            level,
            obstacle_shapes,
            player,
            world,
            visibility,
            events: EventQueue::new(),
            debug: Vec::new(),
            time: 0.0,
            time_ticks: 0,
            idle_time: 0.0,
            zones: Vec::new(),
            config,
        };
        state.enter_initial_zones();
        log::info!(
            "run started on '{}' (seed {seed}, {} memories)",
            state.level.name,
            state.world.remaining_memories()
        );
        state
    }

    fn enter_initial_zones(&mut self) {
        self.zones = self
            .level
            .zones_at(self.player.position)
            .map(|z| z.label.clone())
            .collect();
        for label in &self.zones {
            self.events.push(GameEvent::ZoneEntered {
                label: label.clone(),
            });
        }
    }

    /// Move to another level, keeping the memories collected so far
    pub fn change_level(&mut self, level: Level) -> Result<(), String> {
        level.validate()?;

        for label in self.zones.drain(..) {
            self.events.push(GameEvent::ZoneExited { label });
        }

        let collected = self.world.take_collected();
        self.player = Player::spawn(&level, &self.config);
        self.world = World::from_level(&level, self.seed ^ self.time_ticks, self.player.position);
        self.world.restore_collected(collected);
        self.obstacle_shapes = level.obstacle_shapes().collect();
        self.level = level;
        self.idle_time = 0.0;
        self.visibility =
            fog::compute(self.player.position, &self.obstacle_shapes, self.time, &self.config);
        self.enter_initial_zones();

        log::info!("entered level '{}'", self.level.name);
        Ok(())
    }

    /// Teleport the player inside the current level
    pub fn place_player(&mut self, position: Vec2) {
        self.player.place(position, &self.level);
        self.world
            .sync_player(self.player.position, self.player.facing());
    }

    /// Point the renderer should center on
    pub fn camera_target(&self) -> Vec2 {
        self.player.camera_target()
    }

    /// Every memory in the current level has been found
    pub fn all_memories_collected(&self) -> bool {
        self.world.remaining_memories() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geom::Rect;
    use crate::sim::level::{MemoryDef, ZoneDef};

    #[test]
    fn test_new_enters_spawn_zone() {
        let mut state = GameState::new(Level::demo_house(), Settings::default(), 1);
        let entered: Vec<GameEvent> = state.events.drain().collect();
        assert_eq!(
            entered,
            vec![GameEvent::ZoneEntered {
                label: "hallway".to_string()
            }]
        );
        assert_eq!(state.zones, vec!["hallway".to_string()]);
        assert!(state.visibility.inner_radius() <= state.visibility.outer_radius());
    }

    #[test]
    fn test_change_level_keeps_collected() {
        let mut level = Level::empty("a", Rect::from_top_left(Vec2::ZERO, Vec2::splat(200.0)));
        level.memories.push(MemoryDef {
            id: 5,
            position: Vec2::new(100.0, 100.0),
            radius: 24.0,
            photo: "lake".to_string(),
        });
        let mut state = GameState::new(level.clone(), Settings::default(), 9);
        // Spawn sits on the memory
        crate::sim::world::collect_system(
            &mut state.world,
            state.player.hitbox(),
            &state.config,
            &mut state.events,
        );
        assert!(state.all_memories_collected());

        let mut next = level;
        next.name = "b".to_string();
        next.zones.push(ZoneDef {
            label: "porch".to_string(),
            rect: Rect::from_top_left(Vec2::ZERO, Vec2::splat(200.0)),
        });
        state.change_level(next).expect("valid level");
        assert_eq!(state.level.name, "b");
        assert_eq!(state.world.collected().len(), 1);
        assert!(state.all_memories_collected());
        assert_eq!(state.zones, vec!["porch".to_string()]);
    }

    #[test]
    fn test_change_level_rejects_invalid() {
        let mut state = GameState::new(Level::demo_house(), Settings::default(), 1);
        let mut bad = Level::demo_house();
        bad.speed_multiplier = 0.0;
        assert!(state.change_level(bad).is_err());
        assert_eq!(state.level.name, "ground-floor");
    }

    #[test]
    fn test_place_player_moves_avatar() {
        let mut state = GameState::new(Level::demo_house(), Settings::default(), 1);
        state.place_player(Vec2::new(700.0, 100.0));
        let avatar = state.world.get(state.world.player_id()).unwrap();
        assert_eq!(avatar.position, Vec2::new(700.0, 100.0));
        assert_eq!(state.camera_target(), Vec2::new(700.0, 100.0));
    }
}
