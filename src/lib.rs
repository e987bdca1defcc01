//! Physics Playground - interactive projectile and spring-mass demos
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, history, scrubbing, state machine)
//! - `settings`: Slider definitions and config construction for the UI layer
//! - `platform`: Frame-loop bookkeeping shared by the browser and native drivers

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{ControlSpec, Controls};

use glam::Vec2;

/// Scene configuration constants
pub mod consts {
    /// Projectile ball radius (pixels)
    pub const BALL_RADIUS: f32 = 8.0;
    /// Distance from the canvas bottom edge to the ground line
    pub const HORIZON_OFFSET: f32 = 30.0;
    /// Gap between the left canvas edge and the launch pose
    pub const LAUNCH_MARGIN: f32 = 30.0;
    /// Launch elevation (45 degrees)
    pub const LAUNCH_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

    /// Default gravity (pixels/frame²)
    pub const DEFAULT_GRAVITY: f32 = 0.15;
    /// Default launch speed (pixels/frame)
    pub const DEFAULT_INITIAL_SPEED: f32 = 13.0;

    /// Velocity arrow scaling (pixels per unit speed)
    pub const SPEED_SCALE: f32 = 3.5;
    /// Longest velocity arrow drawn
    pub const MAX_SPEED_ARROW_LENGTH: f32 = 111.0;
    /// Components below this magnitude are not drawn
    pub const ARROW_THRESHOLD: f32 = 0.1;
}

/// Unit vector for a launch elevation, with screen-space Y pointing down
#[inline]
pub fn launch_direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), -angle.sin())
}

/// Clamp a pointer coordinate into `[0, width]`
#[inline]
pub fn clamp_to_canvas(x: f32, width: f32) -> f32 {
    x.clamp(0.0, width.max(0.0))
}
