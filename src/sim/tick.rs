//! Per-frame simulation tick
//!
//! Advances the game state by one frame of variable length.

use glam::Vec2;

use super::debug::debug_shapes;
use super::event::GameEvent;
use super::fog;
use super::state::GameState;
use super::world::{collect_system, effects_system, waypoint_system};
use crate::clamp_frame_dt;

/// Input for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Raw movement vector (keyboard or stick); any length
    pub movement: Vec2,
}

impl TickInput {
    pub fn moving(movement: Vec2) -> Self {
        Self { movement }
    }
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = clamp_frame_dt(dt);
    state.time += dt;
    state.time_ticks += 1;

    // Player movement, collision and facing
    let outcome = state
        .player
        .step(input.movement, dt, &state.level, &state.config);

    if outcome.collision_started {
        if let Some(contact) = state.player.last_contact() {
            state.events.push(GameEvent::CollisionStarted { contact });
        }
    }
    if outcome.collision_ended {
        log::debug!("collision ended");
        state.events.push(GameEvent::CollisionEnded);
    }
    if let Some((from, to)) = outcome.facing_changed {
        state.events.push(GameEvent::FacingChanged { from, to });
    }

    update_zones(state);

    collect_system(
        &mut state.world,
        state.player.hitbox(),
        &state.config,
        &mut state.events,
    );
    state
        .world
        .sync_player(state.player.position, state.player.facing());

    waypoint_system(&mut state.world, dt);

    update_sleep(state, dt);
    effects_system(&mut state.world, dt);

    state.visibility = fog::compute(
        state.player.position,
        &state.obstacle_shapes,
        state.time,
        &state.config,
    );

    state.debug = if state.config.debug.enabled {
        debug_shapes(
            &state.config,
            &state.level,
            &state.player,
            &state.world,
            &state.visibility,
        )
    } else {
        Vec::new()
    };
}

/// Emit enter/exit events for zone changes under the player
fn update_zones(state: &mut GameState) {
    let current: Vec<String> = state
        .level
        .zones_at(state.player.position)
        .map(|z| z.label.clone())
        .collect();

    for label in state.zones.iter().filter(|l| !current.contains(l)) {
        log::debug!("left zone '{label}'");
        state.events.push(GameEvent::ZoneExited {
            label: label.clone(),
        });
    }
    for label in current.iter().filter(|l| !state.zones.contains(l)) {
        log::debug!("entered zone '{label}'");
        state.events.push(GameEvent::ZoneEntered {
            label: label.clone(),
        });
    }
    state.zones = current;
}

/// Fall asleep after idling, wake on movement
fn update_sleep(state: &mut GameState, dt: f32) {
    if state.player.is_moving() {
        state.idle_time = 0.0;
        if state.world.stop_sleep() {
            state.events.push(GameEvent::WokeUp);
        }
        return;
    }

    state.idle_time += dt;
    if state.idle_time >= state.config.effects.sleep_after
        && state.world.start_sleep(state.config.quality.max_particles())
    {
        log::debug!("player fell asleep after {:.1}s", state.idle_time);
        state.events.push(GameEvent::FellAsleep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::effects::EffectKind;
    use crate::sim::facing::Direction;
    use crate::sim::geom::Rect;
    use crate::sim::level::{Level, MemoryDef, Obstacle, ZoneDef};

    const DT: f32 = 1.0 / 60.0;

    fn room() -> Level {
        Level::empty("room", Rect::from_top_left(Vec2::ZERO, Vec2::new(400.0, 300.0)))
    }

    fn drain(state: &mut GameState) -> Vec<GameEvent> {
        state.events.drain().collect()
    }

    #[test]
    fn test_collision_events() {
        let level = room()
            .with_obstacle(Obstacle::rect(Vec2::new(110.0, 90.0), Vec2::new(50.0, 50.0)));
        let mut state = GameState::new(level, Settings::default(), 1);
        state.place_player(Vec2::new(60.0, 115.0));
        drain(&mut state);

        let right = TickInput::moving(Vec2::X);
        for _ in 0..60 {
            tick(&mut state, &right, DT);
        }
        let events = drain(&mut state);
        let started = events
            .iter()
            .filter(|e| matches!(e, GameEvent::CollisionStarted { .. }))
            .count();
        assert_eq!(started, 1);
        assert!(events.contains(&GameEvent::FacingChanged {
            from: Direction::Down,
            to: Direction::Right
        }));
        assert!(state.player.is_colliding());
        assert!(state.player.position.x < 90.0 + 0.1);
        assert!(state.player.movement.camera.is_frozen());

        // Back away
        let left = TickInput::moving(Vec2::NEG_X);
        for _ in 0..10 {
            tick(&mut state, &left, DT);
        }
        assert!(drain(&mut state).contains(&GameEvent::CollisionEnded));
        assert!(!state.player.is_colliding());
    }

    #[test]
    fn test_zone_transitions() {
        let mut level = room();
        level.zones = vec![
            ZoneDef {
                label: "west".to_string(),
                rect: Rect::from_top_left(Vec2::ZERO, Vec2::new(200.0, 300.0)),
            },
            ZoneDef {
                label: "east".to_string(),
                rect: Rect::from_top_left(Vec2::new(200.0, 0.0), Vec2::new(200.0, 300.0)),
            },
        ];
        let mut state = GameState::new(level, Settings::default(), 1);
        state.place_player(Vec2::new(150.0, 150.0));
        state.zones = vec!["west".to_string()];
        drain(&mut state);

        let right = TickInput::moving(Vec2::X);
        for _ in 0..60 {
            tick(&mut state, &right, DT);
        }
        let zone_events: Vec<GameEvent> = drain(&mut state)
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ZoneEntered { .. } | GameEvent::ZoneExited { .. }))
            .collect();
        assert_eq!(
            zone_events,
            vec![
                GameEvent::ZoneExited {
                    label: "west".to_string()
                },
                GameEvent::ZoneEntered {
                    label: "east".to_string()
                },
            ]
        );
        assert_eq!(state.zones, vec!["east".to_string()]);
    }

    #[test]
    fn test_walking_over_memory_collects_it() {
        let mut level = room();
        level.memories.push(MemoryDef {
            id: 4,
            position: Vec2::new(260.0, 150.0),
            radius: 24.0,
            photo: "kitten".to_string(),
        });
        let mut state = GameState::new(level, Settings::default(), 1);
        state.place_player(Vec2::new(100.0, 150.0));
        drain(&mut state);

        let right = TickInput::moving(Vec2::X);
        for _ in 0..90 {
            tick(&mut state, &right, DT);
        }
        let events = drain(&mut state);
        assert!(events.contains(&GameEvent::MemoryCollected {
            id: 4,
            photo: "kitten".to_string()
        }));
        assert!(state.all_memories_collected());
        assert_eq!(state.world.collected()[0].id, 4);
    }

    #[test]
    fn test_sleep_and_wake() {
        let mut state = GameState::new(room(), Settings::default(), 1);
        drain(&mut state);

        let idle = TickInput::default();
        for _ in 0..70 {
            tick(&mut state, &idle, 0.1);
        }
        let events = drain(&mut state);
        assert_eq!(events.iter().filter(|e| **e == GameEvent::FellAsleep).count(), 1);
        assert!(state.world.is_sleeping());
        let avatar = state.world.get(state.world.player_id()).unwrap();
        assert!(avatar.has_effect(EffectKind::Sleep));

        tick(&mut state, &TickInput::moving(Vec2::Y), DT);
        assert!(drain(&mut state).contains(&GameEvent::WokeUp));
        assert!(!state.world.is_sleeping());
        assert_eq!(state.idle_time, 0.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut state = GameState::new(Level::demo_house(), Settings::default(), 99);
            let inputs = [Vec2::X, Vec2::new(1.0, -1.0), Vec2::NEG_Y, Vec2::ZERO];
            for i in 0..400 {
                tick(&mut state, &TickInput::moving(inputs[(i / 100) % 4]), DT);
            }
            state
        };
        let a = run();
        let b = run();
        assert_eq!(a.player, b.player);
        assert_eq!(a.world.entities, b.world.entities);
        assert_eq!(a.visibility, b.visibility);
    }

    #[test]
    fn test_visibility_follows_player() {
        let mut state = GameState::new(room(), Settings::default(), 1);
        tick(&mut state, &TickInput::moving(Vec2::X), DT);
        assert_eq!(state.visibility.center(), state.player.position);
        assert!(state.visibility.inner_radius() <= state.visibility.outer_radius());
    }

    #[test]
    fn test_debug_overlay_gated() {
        let mut state = GameState::new(room(), Settings::default(), 1);
        state.config.debug.show_hitboxes = true;
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.debug.is_empty());

        state.config.debug.enabled = true;
        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.debug.is_empty());
    }

    #[test]
    fn test_bad_dt_is_harmless() {
        let mut state = GameState::new(room(), Settings::default(), 1);
        let before = state.player.position;
        tick(&mut state, &TickInput::moving(Vec2::X), f32::NAN);
        assert_eq!(state.player.position, before);
        assert_eq!(state.time, 0.0);
    }
}
