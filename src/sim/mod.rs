//! Per-frame simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only advances through `tick`
//! - Seeded RNG only (cosmetic particles)
//! - Stable iteration order (obstacle order, entity id order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod controller;
pub mod debug;
pub mod effects;
pub mod event;
pub mod facing;
pub mod fog;
pub mod geom;
pub mod level;
pub mod state;
pub mod tick;
pub mod world;

pub use camera::CameraFollow;
pub use collision::{CollisionResult, Contact, resolve_against, slide, slide_all};
pub use controller::{GrowthStage, Player, StepOutcome};
pub use debug::{DebugColor, DebugShape};
pub use effects::{EffectKind, Emitter};
pub use event::{EventQueue, GameEvent};
pub use facing::{Direction, FacingState};
pub use fog::VisibilityField;
pub use geom::{Circle, Hitbox, Rect, Shape, WorldShape};
pub use level::{Level, Obstacle, load_level_from_path};
pub use state::GameState;
pub use tick::{TickInput, tick};
pub use world::{Entity, World};
