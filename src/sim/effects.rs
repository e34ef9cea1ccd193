//! Finite-lifetime particle emitters
//!
//! Emitters are cosmetic. Their jitter comes from the world's seeded RNG so
//! a replay with the same seed draws the same particles.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{clamp_frame_dt, unit_from_angle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Drifting "z" glyphs above an idle player; runs until removed
    Sleep,
    /// One-shot ring of hearts when a memory is collected
    HeartBurst,
}

impl EffectKind {
    /// Seconds the emitter keeps spawning (`None` = until removed, `0` = one burst)
    pub fn lifetime(&self) -> Option<f32> {
        match self {
            EffectKind::Sleep => None,
            EffectKind::HeartBurst => Some(0.0),
        }
    }

    /// Seconds between spawns for continuous emitters
    fn spawn_interval(&self) -> f32 {
        match self {
            EffectKind::Sleep => 0.8,
            EffectKind::HeartBurst => 0.0,
        }
    }

    fn particle_life(&self) -> f32 {
        match self {
            EffectKind::Sleep => 2.0,
            EffectKind::HeartBurst => 1.2,
        }
    }

    /// Opacity over normalized particle age `t` in `[0, 1]`
    pub fn alpha(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            // Fade in, then out
            EffectKind::Sleep => (t * std::f32::consts::PI).sin(),
            EffectKind::HeartBurst => 1.0 - t * t,
        }
    }

    /// Scale over normalized particle age
    pub fn scale(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EffectKind::Sleep => 0.6 + 0.4 * t,
            EffectKind::HeartBurst => 1.0 - 0.5 * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub life: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub kind: EffectKind,
    /// Spawn point (follows the owner for continuous emitters)
    pub origin: Vec2,
    pub age: f32,
    pub lifetime: Option<f32>,
    /// Seconds until the next spawn
    pub spawn_timer: f32,
    pub particles: Vec<Particle>,
    max_particles: usize,
    burst_count: usize,
    burst_done: bool,
}

impl Emitter {
    fn new(kind: EffectKind, origin: Vec2, burst_count: usize, max_particles: usize) -> Self {
        Self {
            kind,
            origin,
            age: 0.0,
            lifetime: kind.lifetime(),
            spawn_timer: 0.0,
            particles: Vec::new(),
            max_particles,
            burst_count,
            burst_done: false,
        }
    }

    pub fn sleep(origin: Vec2, max_particles: usize) -> Self {
        Self::new(EffectKind::Sleep, origin, 0, max_particles)
    }

    pub fn heart_burst(origin: Vec2, count: usize, max_particles: usize) -> Self {
        Self::new(EffectKind::HeartBurst, origin, count, max_particles)
    }

    /// Whether the emitter may still spawn particles
    fn is_emitting(&self) -> bool {
        match self.lifetime {
            None => true,
            Some(lifetime) => self.age <= lifetime,
        }
    }

    /// Done spawning and every particle has expired
    pub fn is_finished(&self) -> bool {
        !self.is_emitting() && self.particles.is_empty()
    }

    /// Start over from age zero
    pub fn restart(&mut self) {
        self.age = 0.0;
        self.spawn_timer = 0.0;
        self.particles.clear();
        self.burst_done = false;
    }

    fn spawn(&mut self, rng: &mut Pcg32) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            // Drop the oldest to make room
            self.particles.remove(0);
        }

        let life = self.kind.particle_life() * rng.random_range(0.8_f32..1.0);
        let particle = match self.kind {
            EffectKind::Sleep => Particle {
                pos: self.origin + Vec2::new(rng.random_range(-4.0..4.0), -24.0),
                vel: Vec2::new(rng.random_range(6.0..16.0), rng.random_range(-30.0..-20.0)),
                age: 0.0,
                life,
            },
            EffectKind::HeartBurst => {
                let angle = rng.random_range(0.0..TAU);
                let speed: f32 = rng.random_range(60.0..110.0);
                Particle {
                    pos: self.origin,
                    vel: unit_from_angle(angle) * speed,
                    age: 0.0,
                    life,
                }
            }
        };
        self.particles.push(particle);
    }

    /// Advance by `dt` seconds, capped at one long frame
    pub fn advance(&mut self, dt: f32, rng: &mut Pcg32) {
        let dt = clamp_frame_dt(dt);

        for p in &mut self.particles {
            p.age += dt;
            p.pos += p.vel * dt;
            match self.kind {
                EffectKind::Sleep => {
                    p.vel.x = (p.age * 3.0).cos() * 10.0;
                }
                EffectKind::HeartBurst => {
                    p.vel *= 0.96;
                    p.vel.y -= 40.0 * dt;
                }
            }
        }
        self.particles.retain(|p| p.age < p.life);

        if self.is_emitting() {
            match self.kind {
                EffectKind::HeartBurst => {
                    if !self.burst_done {
                        for _ in 0..self.burst_count {
                            self.spawn(rng);
                        }
                        self.burst_done = true;
                    }
                }
                EffectKind::Sleep => {
                    self.spawn_timer -= dt;
                    while self.spawn_timer <= 0.0 {
                        self.spawn(rng);
                        self.spawn_timer += self.kind.spawn_interval();
                    }
                }
            }
        }

        self.age += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_FRAME_DT;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_heart_burst_spawns_once_and_finishes() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut burst = Emitter::heart_burst(Vec2::new(50.0, 50.0), 10, 24);
        burst.advance(DT, &mut rng);
        assert_eq!(burst.particles.len(), 10);
        burst.advance(DT, &mut rng);
        assert_eq!(burst.particles.len(), 10);

        for _ in 0..200 {
            burst.advance(DT, &mut rng);
        }
        assert!(burst.particles.is_empty());
        assert!(burst.is_finished());
    }

    #[test]
    fn test_particle_cap() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut burst = Emitter::heart_burst(Vec2::ZERO, 10, 8);
        burst.advance(DT, &mut rng);
        assert_eq!(burst.particles.len(), 8);
    }

    #[test]
    fn test_sleep_runs_until_removed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut sleep = Emitter::sleep(Vec2::ZERO, 24);
        for _ in 0..600 {
            sleep.advance(DT, &mut rng);
            assert!(!sleep.is_finished());
        }
        assert!(!sleep.particles.is_empty());
        // Glyphs drift upward
        assert!(sleep.particles.iter().all(|p| p.pos.y < 0.0));
    }

    #[test]
    fn test_same_seed_same_particles() {
        let run = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut burst = Emitter::heart_burst(Vec2::ZERO, 6, 24);
            for _ in 0..10 {
                burst.advance(DT, &mut rng);
            }
            burst
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn test_restart() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut burst = Emitter::heart_burst(Vec2::ZERO, 4, 24);
        for _ in 0..200 {
            burst.advance(DT, &mut rng);
        }
        assert!(burst.is_finished());
        burst.restart();
        assert!(!burst.is_finished());
        burst.advance(DT, &mut rng);
        assert_eq!(burst.particles.len(), 4);
    }

    #[test]
    fn test_curves_stay_in_range() {
        for kind in [EffectKind::Sleep, EffectKind::HeartBurst] {
            for i in 0..=10 {
                let t = i as f32 / 10.0;
                let a = kind.alpha(t);
                assert!((0.0..=1.0).contains(&a));
                assert!(kind.scale(t) > 0.0);
            }
        }
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sleep = Emitter::sleep(Vec2::ZERO, 24);
        sleep.advance(f32::NAN, &mut rng);
        assert_eq!(sleep.age, 0.0);
    }

    #[test]
    fn test_huge_dt_is_capped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut sleep = Emitter::sleep(Vec2::ZERO, 24);
        sleep.advance(1.0e6, &mut rng);
        assert_eq!(sleep.particles.len(), 1);
        assert!((sleep.age - MAX_FRAME_DT).abs() < 1e-6);
        assert!(sleep.spawn_timer > 0.0);
    }
}
