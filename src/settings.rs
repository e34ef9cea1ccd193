//! Game settings and tuning
//!
//! One explicit configuration value is built at startup and passed into the
//! simulation. Debug visualization is gated by [`DebugConfig`] on this struct,
//! never by global state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Rays cast by the organic fog edge for this preset
    pub fn fog_rays(&self) -> usize {
        match self {
            QualityPreset::Low => FOG_RAY_COUNT / 2,
            QualityPreset::Medium => FOG_RAY_COUNT,
            QualityPreset::High => FOG_RAY_COUNT * 2,
        }
    }

    /// Particle cap per emitter
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 8,
            QualityPreset::Medium => 24,
            QualityPreset::High => 64,
        }
    }
}

/// Player movement tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Base speed of the small (early) growth stage, units/s
    pub small_speed: f32,
    /// Base speed of the grown stage, units/s
    pub grown_speed: f32,
    /// Player hitbox radius
    pub player_radius: f32,
    /// Maximum push out of penetration per tick
    pub push_out_nudge: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            small_speed: 110.0,
            grown_speed: 150.0,
            player_radius: PLAYER_RADIUS,
            push_out_nudge: PUSH_OUT_NUDGE,
        }
    }
}

/// Facing direction and tilt tuning (degrees, except the rate)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FacingConfig {
    pub deadzone_deg: f32,
    pub max_tilt_deg: f32,
    /// Exponential smoothing rate toward the target tilt (1/s)
    pub smoothing_rate: f32,
    /// Extra angle past a sector boundary before the facing switches
    pub hysteresis_deg: f32,
}

impl Default for FacingConfig {
    fn default() -> Self {
        Self {
            deadzone_deg: TILT_DEADZONE_DEG,
            max_tilt_deg: TILT_MAX_DEG,
            smoothing_rate: TILT_SMOOTHING_RATE,
            hysteresis_deg: 4.0,
        }
    }
}

/// Camera follow tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the collision onset point that unfreezes the camera
    pub resume_distance: f32,
    /// Lerp factor per 60 Hz frame
    pub follow_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resume_distance: CAMERA_RESUME_DISTANCE,
            follow_rate: CAMERA_FOLLOW_RATE,
        }
    }
}

/// Which visibility field the fog calculator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FogMode {
    Annulus,
    #[default]
    Organic,
}

/// One sine component of the organic fog edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeWave {
    /// Lobes around the circle
    pub frequency: f32,
    /// Angular speed over time (rad/s)
    pub speed: f32,
    /// Relative radius amplitude
    pub amplitude: f32,
    pub phase: f32,
}

/// Fog-of-war tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub mode: FogMode,
    /// Fully visible radius with no obstacles nearby
    pub base_inner_radius: f32,
    /// Fully occluded radius
    pub base_outer_radius: f32,
    /// Obstacles farther than this from the player do not shrink the inner radius
    pub influence_range: f32,
    /// Fraction of the inner radius removed at full obstacle proximity
    pub max_inner_reduction: f32,
    pub waves: Vec<EdgeWave>,
    /// Fraction of a ray's remaining length that survives an obstacle hit
    pub shadow_penetration: f32,
    /// Shortest ray, as a fraction of the base inner radius
    pub min_ray_fraction: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            mode: FogMode::Organic,
            base_inner_radius: 120.0,
            base_outer_radius: 200.0,
            influence_range: 160.0,
            max_inner_reduction: 0.4,
            waves: vec![
                EdgeWave {
                    frequency: 3.0,
                    speed: 0.7,
                    amplitude: 0.05,
                    phase: 0.0,
                },
                EdgeWave {
                    frequency: 5.0,
                    speed: -1.1,
                    amplitude: 0.03,
                    phase: 1.3,
                },
                EdgeWave {
                    frequency: 8.0,
                    speed: 1.9,
                    amplitude: 0.015,
                    phase: 2.1,
                },
            ],
            shadow_penetration: 0.3,
            min_ray_fraction: 0.25,
        }
    }
}

/// Particle effect tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Idle seconds before the player falls asleep
    pub sleep_after: f32,
    /// Hearts released when a memory is collected
    pub heart_count: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            sleep_after: 6.0,
            heart_count: 10,
        }
    }
}

/// Debug visualization switches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub show_hitboxes: bool,
    pub show_rays: bool,
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quality preset
    pub quality: QualityPreset,
    /// Reduced motion (no tilt lean, still fog edge)
    pub reduced_motion: bool,
    pub movement: MovementConfig,
    pub facing: FacingConfig,
    pub camera: CameraConfig,
    pub fog: FogConfig,
    pub effects: EffectsConfig,
    pub debug: DebugConfig,
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Ray count for the organic fog edge
    pub fn fog_rays(&self) -> usize {
        self.quality.fog_rays()
    }

    /// Effective max tilt in degrees (respects reduced_motion)
    pub fn effective_max_tilt_deg(&self) -> f32 {
        if self.reduced_motion {
            0.0
        } else {
            self.facing.max_tilt_deg.max(0.0)
        }
    }

    /// Facing tuning with reduced_motion applied
    pub fn effective_facing(&self) -> FacingConfig {
        FacingConfig {
            max_tilt_deg: self.effective_max_tilt_deg(),
            ..self.facing
        }
    }

    /// Whether the fog edge animates over time (respects reduced_motion)
    pub fn effective_fog_animation(&self) -> bool {
        !self.reduced_motion
    }

    pub fn debug_hitboxes(&self) -> bool {
        self.debug.enabled && self.debug.show_hitboxes
    }

    pub fn debug_rays(&self) -> bool {
        self.debug.enabled && self.debug.show_rays
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse settings JSON: {e}"))
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let settings = Self::from_json(&raw).map_err(|e| format!("{}: {e}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_path(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;
        fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
