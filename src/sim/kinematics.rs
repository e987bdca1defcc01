//! Constant-acceleration stepper and boundary predicates
//!
//! Semi-implicit Euler: velocity is updated first, then position moves by
//! the new velocity. One call advances exactly one frame.

use glam::Vec2;

use super::state::{FRAME_STEP, KinematicState};

/// Advance one frame under a constant acceleration
#[inline]
pub fn advance(state: &KinematicState, accel: Vec2) -> KinematicState {
    let vel = state.vel + accel;
    KinematicState {
        pos: state.pos + vel,
        vel,
        elapsed: state.elapsed + FRAME_STEP,
    }
}

/// Advance one frame under downward gravity (screen Y grows downward)
#[inline]
pub fn step(state: &KinematicState, gravity: f32) -> KinematicState {
    advance(state, Vec2::new(0.0, gravity))
}

/// Ball of `radius` touches or has passed the ground line
#[inline]
pub fn touches_ground(state: &KinematicState, radius: f32, ground_y: f32) -> bool {
    state.pos.y + radius >= ground_y
}

/// Clamp onto the ground line and stop
pub fn settle_on_ground(state: &KinematicState, radius: f32, ground_y: f32) -> KinematicState {
    KinematicState {
        pos: Vec2::new(state.pos.x, ground_y - radius),
        ..state.at_rest()
    }
}

/// Ball is fully outside the horizontal extent of the canvas
#[inline]
pub fn out_of_bounds(state: &KinematicState, radius: f32, width: f32) -> bool {
    state.pos.x > width + radius * 2.0 || state.pos.x < -radius * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_step_updates_velocity_before_position() {
        let s = KinematicState::new(Vec2::new(10.0, 100.0), Vec2::new(2.0, -3.0));
        let next = step(&s, 0.5);
        assert_eq!(next.vel, Vec2::new(2.0, -2.5));
        assert_eq!(next.pos, Vec2::new(12.0, 97.5));
        assert_eq!(next.elapsed, 1.0);
        // Input untouched
        assert_eq!(s.elapsed, 0.0);
    }

    #[test]
    fn test_settle_clamps_exactly() {
        let overshot = KinematicState {
            pos: Vec2::new(400.0, 575.3),
            vel: Vec2::new(9.0, 8.0),
            elapsed: 42.0,
        };
        assert!(touches_ground(&overshot, 8.0, 570.0));
        let settled = settle_on_ground(&overshot, 8.0, 570.0);
        assert_eq!(settled.pos, Vec2::new(400.0, 562.0));
        assert_eq!(settled.vel, Vec2::ZERO);
        assert_eq!(settled.elapsed, 42.0);
    }

    #[test]
    fn test_out_of_bounds_margins() {
        let at = |x: f32| KinematicState::new(Vec2::new(x, 0.0), Vec2::ZERO);
        assert!(!out_of_bounds(&at(816.0), 8.0, 800.0));
        assert!(out_of_bounds(&at(816.5), 8.0, 800.0));
        assert!(!out_of_bounds(&at(-16.0), 8.0, 800.0));
        assert!(out_of_bounds(&at(-16.5), 8.0, 800.0));
    }

    proptest! {
        /// Dyadic gravities and integer speeds keep every intermediate exact in f32,
        /// so the closed form must match bit for bit.
        #[test]
        fn prop_matches_euler_closed_form(
            g_num in 1u32..64,
            v0 in -20i32..20,
            n in 0u32..120,
        ) {
            let g = g_num as f32 / 64.0;
            let y0 = 100.0f32;
            let mut s = KinematicState::new(Vec2::new(0.0, y0), Vec2::new(0.0, v0 as f32));
            for _ in 0..n {
                s = step(&s, g);
            }
            let nf = n as f32;
            let expected = y0 + nf * v0 as f32 + g * nf * (nf + 1.0) / 2.0;
            prop_assert_eq!(s.pos.y, expected);
            prop_assert_eq!(s.elapsed, nf);
        }
    }
}
