//! Derived values for the data table and velocity arrows

use glam::Vec2;
use serde::Serialize;

use super::oscillator::SpringOscillator;
use super::state::{Arena, KinematicState};
use crate::consts::*;

/// Values shown in the projectile data table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Readout {
    pub time: f32,
    pub vx: f32,
    pub vy: f32,
    pub speed: f32,
    /// Height of the ball's bottom above the ground line
    pub height: f32,
    /// Horizontal distance from the launch point
    pub distance: f32,
    pub gravity: f32,
}

impl Readout {
    pub fn from_state(state: &KinematicState, arena: &Arena, radius: f32, gravity: f32) -> Self {
        let launch_x = arena.launch_point(radius).x;
        Self {
            time: state.elapsed,
            vx: state.vel.x,
            vy: state.vel.y,
            speed: state.speed(),
            height: (arena.ground_y() - (state.pos.y + radius)).max(0.0),
            distance: (state.pos.x - launch_x).max(0.0),
            gravity,
        }
    }

    /// `(key, label, formatted value)` rows in display order
    pub fn rows(&self) -> [(&'static str, &'static str, String); 7] {
        [
            ("time", "Time (t)", format!("{:.1} s", self.time)),
            ("vx", "Horizontal velocity (Vx)", format!("{:.2} m/s", self.vx)),
            ("vy", "Vertical velocity (Vy)", format!("{:.2} m/s", self.vy)),
            ("v", "Speed (V)", format!("{:.2} m/s", self.speed)),
            ("height", "Height (H)", format!("{:.2} m", self.height)),
            ("distance", "Distance (X)", format!("{:.2} m", self.distance)),
            ("gravity", "Gravity (G)", format!("{:.2} m/s²", self.gravity)),
        ]
    }
}

/// Values shown in the spring-mass data table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OscillatorReadout {
    pub time: f32,
    /// Displacement from equilibrium
    pub position: f32,
    pub velocity: f32,
    pub acceleration: f32,
    pub kinetic: f32,
    pub potential: f32,
    pub total: f32,
}

impl OscillatorReadout {
    pub fn from_oscillator(osc: &SpringOscillator) -> Self {
        let energies = osc.energies();
        Self {
            time: osc.time(),
            position: osc.position() - osc.equilibrium_x(),
            velocity: osc.velocity(),
            acceleration: osc.acceleration(),
            kinetic: energies.kinetic,
            potential: energies.potential,
            total: energies.total,
        }
    }

    pub fn rows(&self) -> [(&'static str, &'static str, String); 7] {
        [
            ("time", "Time (t)", format!("{:.2}", self.time)),
            ("position", "Displacement (x)", format!("{:.2}", self.position)),
            ("velocity", "Velocity (v)", format!("{:.2}", self.velocity)),
            ("acceleration", "Acceleration (a)", format!("{:.2}", self.acceleration)),
            ("kineticEnergy", "Kinetic energy", format!("{:.2}", self.kinetic)),
            ("potentialEnergy", "Potential energy", format!("{:.2}", self.potential)),
            ("totalEnergy", "Total energy", format!("{:.2}", self.total)),
        ]
    }
}

/// Scaled velocity components anchored at the ball.
///
/// `None` marks a component too small to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityArrows {
    /// Horizontal component, from the ball
    pub vx: Option<Vec2>,
    /// Vertical component, from the tip of `vx`
    pub vy: Option<Vec2>,
    /// Resultant, from the ball
    pub v: Option<Vec2>,
}

impl VelocityArrows {
    pub fn from_state(state: &KinematicState) -> Self {
        let scale = |c: f32| (c.abs() * SPEED_SCALE).min(MAX_SPEED_ARROW_LENGTH) * c.signum();
        let scaled = Vec2::new(scale(state.vel.x), scale(state.vel.y));

        let shown = |magnitude: f32| magnitude > ARROW_THRESHOLD;
        Self {
            vx: shown(state.vel.x.abs()).then_some(Vec2::new(scaled.x, 0.0)),
            vy: shown(state.vel.y.abs()).then_some(Vec2::new(0.0, scaled.y)),
            v: shown(state.speed()).then_some(scaled),
        }
    }

    /// Single resultant arrow along the direction of travel (used while running)
    pub fn resultant(state: &KinematicState) -> Option<Vec2> {
        let speed = state.speed();
        (speed > ARROW_THRESHOLD)
            .then(|| state.vel / speed * (speed * SPEED_SCALE).min(MAX_SPEED_ARROW_LENGTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_at_launch() {
        let arena = Arena::new(800.0, 600.0).unwrap();
        let state = KinematicState::new(arena.launch_point(BALL_RADIUS), Vec2::new(3.0, -4.0));
        let r = Readout::from_state(&state, &arena, BALL_RADIUS, 0.15);
        assert_eq!(r.height, 0.0);
        assert_eq!(r.distance, 0.0);
        assert_eq!(r.speed, 5.0);

        let rows = r.rows();
        assert_eq!(rows[0].2, "0.0 s");
        assert_eq!(rows[1].2, "3.00 m/s");
        assert_eq!(rows[3].2, "5.00 m/s");
        assert_eq!(rows[6].2, "0.15 m/s²");
    }

    #[test]
    fn test_readout_in_flight() {
        let arena = Arena::new(800.0, 600.0).unwrap();
        let state = KinematicState {
            pos: Vec2::new(138.0, 462.0),
            vel: Vec2::ZERO,
            elapsed: 12.0,
        };
        let r = Readout::from_state(&state, &arena, BALL_RADIUS, 0.2);
        assert_eq!(r.height, 100.0);
        assert_eq!(r.distance, 100.0);
        assert_eq!(r.rows()[0].2, "12.0 s");
    }

    #[test]
    fn test_arrows_clamp_and_hide() {
        let state = KinematicState::new(Vec2::ZERO, Vec2::new(100.0, 0.05));
        let arrows = VelocityArrows::from_state(&state);
        assert_eq!(arrows.vx, Some(Vec2::new(MAX_SPEED_ARROW_LENGTH, 0.0)));
        assert_eq!(arrows.vy, None);
        assert!(arrows.v.is_some());

        let at_rest = KinematicState::new(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(VelocityArrows::from_state(&at_rest).v, None);
        assert_eq!(VelocityArrows::resultant(&at_rest), None);
    }

    #[test]
    fn test_resultant_length() {
        let state = KinematicState::new(Vec2::ZERO, Vec2::new(3.0, 4.0));
        let arrow = VelocityArrows::resultant(&state).unwrap();
        assert!((arrow.length() - 5.0 * SPEED_SCALE).abs() < 1e-4);
    }

    #[test]
    fn test_oscillator_readout_at_rest_pose() {
        use crate::sim::OscillatorConfig;

        let osc =
            SpringOscillator::new(OscillatorConfig::default(), Arena::new(900.0, 600.0).unwrap())
                .unwrap();
        let r = OscillatorReadout::from_oscillator(&osc);
        assert_eq!(r.position, 100.0);
        assert_eq!(r.kinetic, 0.0);
        assert_eq!(r.potential, 10_000.0);
        assert_eq!(r.total, r.potential);

        let rows = r.rows();
        assert_eq!(rows[0].2, "0.00");
        assert_eq!(rows[1].2, "100.00");
        assert_eq!(rows[3].2, "-40.00");
    }
}
