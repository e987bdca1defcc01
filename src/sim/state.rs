//! Simulation state and core data types
//!
//! Everything the render adapter reads after a mutation lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Duration of one simulation tick, in frames
pub const FRAME_STEP: f32 = 1.0;

/// Rejected configuration values
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("gravity must be a positive number (got {0})")]
    Gravity(f32),

    #[error("initial speed must be a positive number (got {0})")]
    InitialSpeed(f32),

    #[error("mass must be a positive number (got {0})")]
    Mass(f32),

    #[error("spring constant must be a positive number (got {0})")]
    SpringConstant(f32),

    #[error("canvas size must be positive (got {width}x{height})")]
    Arena { width: f32, height: f32 },
}

#[inline]
fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Current mode of the projectile simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Ball resting at the launch pose, waiting for a click
    Idle,
    /// Active integration, the frame loop is scheduled
    Running,
    /// Landed; pointer movement scrubs through the recorded flight
    Reversed,
    /// Trajectory left the canvas; only a relaunch recovers
    OffScreen,
}

/// One instant of motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Elapsed frames since launch
    pub elapsed: f32,
}

impl KinematicState {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            elapsed: 0.0,
        }
    }

    /// Magnitude of the velocity
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Same position and time, velocity forced to zero
    pub fn at_rest(&self) -> Self {
        Self {
            vel: Vec2::ZERO,
            ..*self
        }
    }
}

/// Launch parameters supplied by the UI layer before each run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Downward acceleration, pixels per frame²
    pub gravity: f32,
    /// Launch speed, pixels per frame
    pub initial_speed: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            initial_speed: DEFAULT_INITIAL_SPEED,
        }
    }
}

impl SimulationConfig {
    pub fn new(gravity: f32, initial_speed: f32) -> Self {
        Self {
            gravity,
            initial_speed,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.gravity) {
            return Err(ConfigError::Gravity(self.gravity));
        }
        if !positive(self.initial_speed) {
            return Err(ConfigError::InitialSpeed(self.initial_speed));
        }
        Ok(())
    }
}

/// Canvas geometry the simulation runs inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Result<Self, ConfigError> {
        if !positive(width) || !positive(height) {
            return Err(ConfigError::Arena { width, height });
        }
        Ok(Self { width, height })
    }

    /// Y coordinate of the ground line
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.height - HORIZON_OFFSET
    }

    /// Resting center of a ball of `radius` at the launch point
    pub fn launch_point(&self, radius: f32) -> Vec2 {
        Vec2::new(radius + LAUNCH_MARGIN, self.ground_y() - radius)
    }
}

/// Read-only view handed to the render adapter after every mutation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayFrame {
    pub mode: SimPhase,
    pub state: KinematicState,
    pub history_len: usize,
    /// History entry currently displayed while scrubbing
    pub display_index: Option<usize>,
}

impl DisplayFrame {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(
            SimulationConfig::new(0.0, 13.0).validate(),
            Err(ConfigError::Gravity(0.0))
        );
        assert_eq!(
            SimulationConfig::new(0.15, -1.0).validate(),
            Err(ConfigError::InitialSpeed(-1.0))
        );
        assert!(SimulationConfig::new(f32::NAN, 13.0).validate().is_err());
        assert!(SimulationConfig::new(0.15, f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_arena_geometry() {
        let arena = Arena::new(800.0, 600.0).unwrap();
        assert_eq!(arena.ground_y(), 570.0);
        assert_eq!(arena.launch_point(BALL_RADIUS), Vec2::new(38.0, 562.0));
        assert!(Arena::new(0.0, 600.0).is_err());
    }

    #[test]
    fn test_config_json_field_names() {
        let json = serde_json::to_string(&SimulationConfig::new(0.2, 10.0)).unwrap();
        assert!(json.contains("\"initialSpeed\""));
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SimulationConfig::new(0.2, 10.0));
    }

    #[test]
    fn test_display_frame_json() {
        let frame = DisplayFrame {
            mode: SimPhase::Reversed,
            state: KinematicState::new(Vec2::new(1.0, 2.0), Vec2::ZERO),
            history_len: 3,
            display_index: Some(2),
        };
        let json = frame.to_json().unwrap();
        assert!(json.contains("\"mode\":\"Reversed\""));
        assert!(json.contains("\"displayIndex\":2"));
    }
}
