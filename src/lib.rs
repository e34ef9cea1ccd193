//! Memory House - movement, collision and fog-of-war core
//!
//! Core modules:
//! - `sim`: Per-frame simulation (player movement, collision, visibility)
//! - `settings`: Tuning and debug configuration passed into the simulation

pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference frame rate for per-frame smoothing factors
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Largest timestep accepted by a single tick (longer frames are clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Most movement sub-steps within one tick
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest sub-step move, as a fraction of the player radius
    pub const SUBSTEP_RADIUS_FRACTION: f32 = 0.5;

    /// Player hitbox radius in world units
    pub const PLAYER_RADIUS: f32 = 20.0;
    /// Inputs shorter than this are treated as no input
    pub const INPUT_EPSILON: f32 = 1e-4;

    /// Distance pushed out of an obstacle per tick while penetrating
    pub const PUSH_OUT_NUDGE: f32 = 1.5;
    /// Distance from the collision onset point before the camera resumes
    pub const CAMERA_RESUME_DISTANCE: f32 = 20.0;
    /// Camera follow factor per reference frame
    pub const CAMERA_FOLLOW_RATE: f32 = 0.15;

    /// Facing tilt: no lean inside this offset from a cardinal center (degrees)
    pub const TILT_DEADZONE_DEG: f32 = 7.0;
    /// Facing tilt: maximum lean (degrees)
    pub const TILT_MAX_DEG: f32 = 15.0;
    /// Facing tilt: exponential smoothing rate (1/s)
    pub const TILT_SMOOTHING_RATE: f32 = 12.0;

    /// Number of rays cast by the organic fog edge
    pub const FOG_RAY_COUNT: usize = 48;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // Rounding can land exactly on the open end
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Angle of a vector, `atan2(y, x)`
#[inline]
pub fn vector_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector pointing along `theta`
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Interpolation factor for exponential smoothing at `rate` per second
#[inline]
pub fn exp_smoothing(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Convert a per-frame lerp factor (tuned at 60 Hz) to one for `dt` seconds
#[inline]
pub fn per_frame_smoothing(factor: f32, dt: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    1.0 - (1.0 - factor).powf(dt * consts::REFERENCE_FPS)
}

/// Frame delta clamped to `[0, MAX_FRAME_DT]`; non-finite becomes zero
#[inline]
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Replace non-finite vectors with zero
#[inline]
pub fn sanitize(v: Vec2) -> Vec2 {
    if v.is_finite() { v } else { Vec2::ZERO }
}
