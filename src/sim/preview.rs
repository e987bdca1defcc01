//! Looping mini demos fitted to an arbitrary canvas
//!
//! The projectile launch parameters are solved so the ball starts at the
//! left pad, peaks near the top and lands at the right pad after a fixed
//! number of frames, whatever the canvas size. The oscillation preview is
//! analytic and only needs its amplitude sized to the canvas.

use std::f32::consts::TAU;

use glam::Vec2;

use super::kinematics;
use super::state::{Arena, ConfigError, KinematicState};

pub const PREVIEW_BALL_RADIUS: f32 = 6.0;
pub const PREVIEW_GROUND_OFFSET: f32 = 15.0;
pub const PREVIEW_H_PADDING: f32 = 5.0;
pub const PREVIEW_V_PADDING: f32 = 5.0;
/// Frames from launch to landing
pub const PREVIEW_TOTAL_FRAMES: u32 = 90;
/// Minimum peak height as a fraction of canvas height
const MIN_HEIGHT_RATIO: f32 = 0.3;
/// Fallback peak height for tiny canvases
const FALLBACK_PEAK_HEIGHT: f32 = 20.0;

/// Solved launch parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewFit {
    pub start: Vec2,
    pub velocity: Vec2,
    pub gravity: f32,
    pub ground_y: f32,
}

impl PreviewFit {
    pub fn fit(arena: &Arena) -> Self {
        let r = PREVIEW_BALL_RADIUS;
        let start_x = r + PREVIEW_H_PADDING;
        let ground_y = arena.height - PREVIEW_GROUND_OFFSET;
        let start_y = ground_y - r;
        let landing_x = arena.width - r - PREVIEW_H_PADDING;
        let peak_y = r + PREVIEW_V_PADDING;

        let mut peak_height = start_y - peak_y;
        if peak_height < arena.height * MIN_HEIGHT_RATIO {
            peak_height = arena.height * MIN_HEIGHT_RATIO;
        }
        if peak_height <= 0.0 {
            peak_height = FALLBACK_PEAK_HEIGHT;
        }

        let start = Vec2::new(start_x, start_y);
        let range = landing_x - start_x;
        if range <= 0.0 {
            // Too narrow to animate: show a resting ball
            return Self {
                start,
                velocity: Vec2::ZERO,
                gravity: 0.0,
                ground_y,
            };
        }

        let frames = PREVIEW_TOTAL_FRAMES as f32;
        let to_peak = frames / 2.0;
        let gravity = 2.0 * peak_height / (to_peak * to_peak);
        Self {
            start,
            velocity: Vec2::new(range / frames, -gravity * to_peak),
            gravity,
            ground_y,
        }
    }

    pub fn for_canvas(width: f32, height: f32) -> Result<Self, ConfigError> {
        Ok(Self::fit(&Arena::new(width, height)?))
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.velocity == Vec2::ZERO && self.gravity == 0.0
    }

    pub fn initial_state(&self) -> KinematicState {
        KinematicState::new(self.start, self.velocity)
    }

    /// Full path for the dashed guide line, never dipping below the launch height
    pub fn trajectory(&self) -> Vec<Vec2> {
        if self.is_static() {
            return vec![self.start];
        }

        let mut points = Vec::with_capacity(PREVIEW_TOTAL_FRAMES as usize + 2);
        let mut s = self.initial_state();
        for _ in 0..=PREVIEW_TOTAL_FRAMES {
            points.push(s.pos);
            s = kinematics::step(&s, self.gravity);
            if s.pos.y > self.start.y {
                points.push(Vec2::new(s.pos.x, self.start.y));
                break;
            }
        }
        points
    }
}

/// Frame-by-frame playback of a fitted preview
#[derive(Debug, Clone)]
pub struct PreviewPlayer {
    fit: PreviewFit,
    ball: KinematicState,
    frame: u32,
}

impl PreviewPlayer {
    pub fn new(fit: PreviewFit) -> Self {
        Self {
            ball: fit.initial_state(),
            fit,
            frame: 0,
        }
    }

    pub fn fit(&self) -> &PreviewFit {
        &self.fit
    }

    pub fn ball(&self) -> &KinematicState {
        &self.ball
    }

    /// Advance one frame. Returns `false` once the run is over and the
    /// driver should restart after a pause.
    pub fn advance(&mut self) -> bool {
        if self.fit.is_static() {
            return false;
        }
        if self.frame < PREVIEW_TOTAL_FRAMES {
            self.ball = kinematics::step(&self.ball, self.fit.gravity);
            if kinematics::touches_ground(&self.ball, PREVIEW_BALL_RADIUS, self.fit.ground_y) {
                self.ball = kinematics::settle_on_ground(
                    &self.ball,
                    PREVIEW_BALL_RADIUS,
                    self.fit.ground_y,
                );
                self.frame = PREVIEW_TOTAL_FRAMES;
            }
        }
        self.frame += 1;
        self.frame <= PREVIEW_TOTAL_FRAMES
    }

    /// Back to the launch pose
    pub fn restart(&mut self) {
        self.ball = self.fit.initial_state();
        self.frame = 0;
    }
}

pub const SHM_PREVIEW_WALL_X: f32 = 15.0;
/// Right-hand margin and gap between the wall and the swept range
pub const SHM_PREVIEW_PADDING: f32 = 40.0;
pub const SHM_PREVIEW_MASS_WIDTH: f32 = 30.0;
pub const SHM_PREVIEW_MASS_HEIGHT: f32 = 20.0;
/// Seconds per oscillation
pub const SHM_PREVIEW_PERIOD: f32 = 3.0;

/// Sinusoidal block on a spring, `x = eq + A·sin(ωt)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillationPreview {
    pub amplitude: f32,
    pub equilibrium_x: f32,
    /// Vertical center of the block and spring
    pub center_y: f32,
}

impl OscillationPreview {
    pub fn fit(arena: &Arena) -> Self {
        let available = arena.width - SHM_PREVIEW_WALL_X - 2.0 * SHM_PREVIEW_PADDING;
        let amplitude = (available - SHM_PREVIEW_MASS_WIDTH) / 2.0;
        let center_y = arena.height / 2.0;

        if amplitude <= 0.0 {
            // Too small to swing: park the block mid-canvas
            return Self {
                amplitude: 0.0,
                equilibrium_x: arena.width / 2.0,
                center_y,
            };
        }

        Self {
            amplitude,
            equilibrium_x: SHM_PREVIEW_WALL_X
                + SHM_PREVIEW_MASS_WIDTH / 2.0
                + amplitude
                + SHM_PREVIEW_PADDING,
            center_y,
        }
    }

    pub fn for_canvas(width: f32, height: f32) -> Result<Self, ConfigError> {
        Ok(Self::fit(&Arena::new(width, height)?))
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.amplitude == 0.0
    }

    #[inline]
    pub fn angular_frequency() -> f32 {
        TAU / SHM_PREVIEW_PERIOD
    }

    /// Block center x after `seconds` of wall-clock time
    pub fn position_at(&self, seconds: f32) -> f32 {
        self.equilibrium_x + self.amplitude * (Self::angular_frequency() * seconds).sin()
    }

    pub fn mass_center(&self, seconds: f32) -> Vec2 {
        Vec2::new(self.position_at(seconds), self.center_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_lands_at_right_pad() {
        let fit = PreviewFit::for_canvas(300.0, 150.0).unwrap();
        assert!(!fit.is_static());
        assert_eq!(fit.start, Vec2::new(11.0, 129.0));

        let path = fit.trajectory();
        let last = *path.last().unwrap();
        assert_eq!(last.y, fit.start.y);
        // Within about one frame of the right pad
        assert!((last.x - (300.0 - 11.0)).abs() <= fit.velocity.x * 1.5);

        // Euler lands the apex slightly below the top pad, never above it
        let apex = path.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        assert!((11.0..15.0).contains(&apex));
    }

    #[test]
    fn test_fit_narrow_canvas_is_static() {
        let fit = PreviewFit::for_canvas(20.0, 150.0).unwrap();
        assert!(fit.is_static());
        assert_eq!(fit.trajectory(), vec![fit.start]);

        let mut player = PreviewPlayer::new(fit);
        assert!(!player.advance());
    }

    #[test]
    fn test_fit_rejects_empty_canvas() {
        assert!(PreviewFit::for_canvas(0.0, 0.0).is_err());
    }

    #[test]
    fn test_short_canvas_uses_minimum_peak() {
        // start_y - peak_y = 19 - 11 = 8, below 0.3 * 40
        let fit = PreviewFit::for_canvas(300.0, 40.0).unwrap();
        let to_peak = PREVIEW_TOTAL_FRAMES as f32 / 2.0;
        let expected = 2.0 * 12.0 / (to_peak * to_peak);
        assert!((fit.gravity - expected).abs() < 1e-6);
    }

    #[test]
    fn test_player_finishes_and_restarts() {
        let fit = PreviewFit::for_canvas(300.0, 150.0).unwrap();
        let mut player = PreviewPlayer::new(fit);

        let mut frames = 1;
        while player.advance() {
            frames += 1;
            assert!(frames <= PREVIEW_TOTAL_FRAMES + 1);
        }
        assert_eq!(player.ball().pos.y, fit.ground_y - PREVIEW_BALL_RADIUS);
        assert_eq!(player.ball().vel, Vec2::ZERO);

        player.restart();
        assert_eq!(player.ball().pos, fit.start);
        assert!(player.advance());
    }

    #[test]
    fn test_oscillation_amplitude_fits_canvas() {
        // (400 - 15 - 80 - 30) / 2
        let preview = OscillationPreview::for_canvas(400.0, 100.0).unwrap();
        assert_eq!(preview.amplitude, 137.5);
        assert_eq!(preview.equilibrium_x, 15.0 + 15.0 + 137.5 + 40.0);
        assert_eq!(preview.center_y, 50.0);
        assert!(!preview.is_static());

        assert_eq!(preview.position_at(0.0), preview.equilibrium_x);
        let quarter = SHM_PREVIEW_PERIOD / 4.0;
        let right = preview.position_at(quarter);
        assert!((right - (preview.equilibrium_x + 137.5)).abs() < 1e-3);
        // Right edge of the block stays clear of the margin
        assert!(right + SHM_PREVIEW_MASS_WIDTH / 2.0 <= 400.0 - SHM_PREVIEW_PADDING + 1e-3);

        let left = preview.position_at(3.0 * quarter);
        assert!((left - (preview.equilibrium_x - 137.5)).abs() < 1e-3);
        assert!(left - SHM_PREVIEW_MASS_WIDTH / 2.0 >= SHM_PREVIEW_WALL_X + SHM_PREVIEW_PADDING - 1e-3);
    }

    #[test]
    fn test_oscillation_small_canvas_is_static() {
        let preview = OscillationPreview::for_canvas(100.0, 60.0).unwrap();
        assert!(preview.is_static());
        assert_eq!(preview.equilibrium_x, 50.0);
        assert_eq!(preview.mass_center(1.234), Vec2::new(50.0, 30.0));
    }

    #[test]
    fn test_oscillation_period() {
        let preview = OscillationPreview::for_canvas(600.0, 100.0).unwrap();
        for t in [0.2, 0.9, 1.7] {
            let a = preview.position_at(t);
            let b = preview.position_at(t + SHM_PREVIEW_PERIOD);
            assert!((a - b).abs() < 1e-2);
        }
    }
}
