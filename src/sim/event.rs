//! Typed gameplay events
//!
//! The simulation pushes events during a tick; the presentation layer
//! (audio, photo overlay, music zones) drains them once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::facing::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player started pushing against an obstacle
    CollisionStarted { contact: Vec2 },
    CollisionEnded,
    FacingChanged { from: Direction, to: Direction },
    MemoryCollected { id: u32, photo: String },
    ZoneEntered { label: String },
    ZoneExited { label: String },
    FellAsleep,
    WokeUp,
}

/// FIFO of pending events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    pending: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.pending.push(event);
    }

    /// Take every pending event in the order it was pushed
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
