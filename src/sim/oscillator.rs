//! Horizontal spring-mass oscillator
//!
//! A block tethered to a wall on the left. The user drags it to set the
//! initial displacement, then clicks to run. Samples feed the rolling
//! time-series graphs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::history::{HistoryBuffer, Timestamped};
use super::state::{Arena, ConfigError};

/// Seconds per frame
pub const OSC_DT: f32 = 0.05;
/// Right edge of the wall
pub const WALL_WIDTH: f32 = 20.0;
pub const MASS_WIDTH: f32 = 60.0;
pub const MASS_HEIGHT: f32 = 60.0;
/// Floor line as a fraction of canvas height
pub const FLOOR_RATIO: f32 = 0.7;
/// Width of the time-series graph (pixels)
pub const GRAPH_WIDTH: f32 = 400.0;
/// Time axis scale (pixels per second)
pub const TIME_SCALE: f32 = 50.0;
/// Default starting displacement from equilibrium
const DEFAULT_DISPLACEMENT: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OscillatorConfig {
    /// kg
    pub mass: f32,
    /// N/m
    pub spring_constant: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            mass: 5.0,
            spring_constant: 2.0,
        }
    }
}

impl OscillatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ConfigError::Mass(self.mass));
        }
        if !(self.spring_constant.is_finite() && self.spring_constant > 0.0) {
            return Err(ConfigError::SpringConstant(self.spring_constant));
        }
        Ok(())
    }

    /// k/m
    #[inline]
    fn stiffness(&self) -> f32 {
        self.spring_constant / self.mass
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OscPhase {
    /// Waiting at the dragged (or default) position
    Idle,
    Dragging,
    Running,
    Paused,
    /// Block left the canvas; reset required
    OffScreen,
}

/// Why a drag was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStop {
    /// Pulled past the stretch limit
    OverStretched,
    /// Pushed past twice the natural length
    OverCompressed,
    /// Pushed into the wall
    HitWall,
}

/// One point of the time-series graphs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f32,
    pub displacement: f32,
    pub velocity: f32,
    pub acceleration: f32,
    pub force: f32,
}

impl Timestamped for Sample {
    #[inline]
    fn timestamp(&self) -> f32 {
        self.time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Energies {
    pub kinetic: f32,
    pub potential: f32,
    pub total: f32,
}

#[derive(Debug, Clone)]
pub struct SpringOscillator {
    config: OscillatorConfig,
    arena: Arena,
    equilibrium_x: f32,
    /// Center of the block
    position: f32,
    velocity: f32,
    acceleration: f32,
    time: f32,
    phase: OscPhase,
    drag_offset: f32,
    samples: HistoryBuffer<Sample>,
}

impl SpringOscillator {
    pub fn new(config: OscillatorConfig, arena: Arena) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut osc = Self {
            config,
            arena,
            equilibrium_x: arena.width / 3.0,
            position: 0.0,
            velocity: 0.0,
            acceleration: 0.0,
            time: 0.0,
            phase: OscPhase::Idle,
            drag_offset: 0.0,
            samples: HistoryBuffer::with_capacity(256),
        };
        osc.reset(config)?;
        Ok(osc)
    }

    /// Natural spring length (wall to equilibrium)
    #[inline]
    fn natural_length(&self) -> f32 {
        self.equilibrium_x - WALL_WIDTH
    }

    #[inline]
    fn displacement(&self) -> f32 {
        self.position - self.equilibrium_x
    }

    /// Back to the default pose with a (possibly new) config
    pub fn reset(&mut self, config: OscillatorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.phase = OscPhase::Idle;
        self.time = 0.0;
        self.velocity = 0.0;
        self.samples.clear();

        let l0 = self.natural_length();
        self.position = if l0 > 0.0 {
            self.equilibrium_x + DEFAULT_DISPLACEMENT.min(0.5 * l0)
        } else {
            self.equilibrium_x + 50.0
        };
        self.position = self.position.max(WALL_WIDTH + MASS_WIDTH / 2.0);
        self.acceleration = -self.config.stiffness() * self.displacement();

        log::info!(
            "Oscillator reset (m={:.1} kg, k={:.1} N/m)",
            config.mass,
            config.spring_constant
        );
        Ok(())
    }

    /// Swap mass or spring constant in place. The block stays where it is;
    /// only the acceleration follows the new stiffness.
    pub fn set_config(&mut self, config: OscillatorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        if self.phase != OscPhase::Dragging {
            self.acceleration = -self.config.stiffness() * self.displacement();
        }
        Ok(())
    }

    /// New canvas size: equilibrium moves to a third of the width
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        self.arena = Arena::new(width, height)?;
        self.equilibrium_x = width / 3.0;
        self.reset(self.config)
    }

    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.arena.height * FLOOR_RATIO
    }

    /// Grab the block if `pointer` is inside it
    pub fn begin_drag(&mut self, pointer: Vec2) -> bool {
        let left = self.position - MASS_WIDTH / 2.0;
        let right = self.position + MASS_WIDTH / 2.0;
        let top = self.floor_y() - MASS_HEIGHT;
        let bottom = self.floor_y();
        let inside = pointer.x > left && pointer.x < right && pointer.y > top && pointer.y < bottom;
        if !inside {
            return false;
        }

        self.phase = OscPhase::Dragging;
        self.velocity = 0.0;
        self.acceleration = 0.0;
        self.time = 0.0;
        self.samples.clear();
        self.drag_offset = pointer.x - self.position;
        true
    }

    /// Follow the pointer, clamped to the spring's limits. Hitting a limit
    /// ends the drag.
    pub fn drag_to(&mut self, pointer_x: f32) -> Option<DragStop> {
        if self.phase != OscPhase::Dragging {
            return None;
        }

        let desired = pointer_x - self.drag_offset;
        let l0 = self.natural_length();
        let wall_limit = WALL_WIDTH + MASS_WIDTH / 2.0;
        let max_compression = (2.0 * l0).min(self.equilibrium_x - wall_limit);
        let max_x = self.equilibrium_x + l0 - MASS_WIDTH / 2.0;
        let min_x = self.equilibrium_x - max_compression;

        let (position, stop) = if desired > max_x {
            (max_x, Some(DragStop::OverStretched))
        } else if desired < min_x {
            let reason = if (min_x - wall_limit).abs() < 0.001 {
                DragStop::HitWall
            } else {
                DragStop::OverCompressed
            };
            (min_x, Some(reason))
        } else {
            (desired, None)
        };

        self.position = position;
        self.acceleration = -self.config.stiffness() * self.displacement();
        if let Some(reason) = stop {
            self.phase = OscPhase::Idle;
            self.velocity = 0.0;
            log::warn!("Drag stopped: {:?}", reason);
        }
        stop
    }

    pub fn end_drag(&mut self) {
        if self.phase == OscPhase::Dragging {
            self.phase = OscPhase::Idle;
            self.acceleration = -self.config.stiffness() * self.displacement();
        }
    }

    /// Canvas click: start, pause or resume
    pub fn toggle_running(&mut self) -> OscPhase {
        self.phase = match self.phase {
            OscPhase::Idle | OscPhase::Paused => OscPhase::Running,
            OscPhase::Running => OscPhase::Paused,
            other => other,
        };
        self.phase
    }

    /// Integrate one frame.
    ///
    /// # Panics
    /// If the oscillator is not running.
    pub fn tick(&mut self) {
        assert_eq!(
            self.phase,
            OscPhase::Running,
            "tick called outside of a running oscillator"
        );

        self.time += OSC_DT;
        let displacement = self.displacement();
        self.acceleration = -self.config.stiffness() * displacement;
        self.velocity += self.acceleration * OSC_DT;
        self.position += self.velocity * OSC_DT;

        self.samples.record(Sample {
            time: self.time,
            displacement,
            velocity: self.velocity,
            acceleration: self.acceleration,
            force: -self.config.spring_constant * displacement,
        });
        self.samples
            .trim_before(self.time - self.visible_span() - OSC_DT * 2.0);

        if self.position < -MASS_WIDTH || self.position > self.arena.width + MASS_WIDTH {
            self.phase = OscPhase::OffScreen;
            log::info!("Oscillator left the canvas");
        }
    }

    /// Driver entry point, same contract as the projectile core
    pub fn step(&mut self) -> bool {
        if self.phase != OscPhase::Running {
            return false;
        }
        self.tick();
        self.phase == OscPhase::Running
    }

    /// Seconds of history visible on the time-series graph
    #[inline]
    pub fn visible_span(&self) -> f32 {
        GRAPH_WIDTH / TIME_SCALE
    }

    pub fn energies(&self) -> Energies {
        let d = self.displacement();
        let kinetic = 0.5 * self.config.mass * self.velocity * self.velocity;
        let potential = 0.5 * self.config.spring_constant * d * d;
        Energies {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }

    pub fn phase(&self) -> OscPhase {
        self.phase
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn equilibrium_x(&self) -> f32 {
        self.equilibrium_x
    }

    pub fn config(&self) -> &OscillatorConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Spring force on the block, `-k·x`
    pub fn force(&self) -> f32 {
        -self.config.spring_constant * self.displacement()
    }

    pub fn samples(&self) -> &HistoryBuffer<Sample> {
        &self.samples
    }
}
