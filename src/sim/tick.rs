//! Simulation state machine
//!
//! `SimulationCore` owns the live state, the recorded history and the
//! current phase. An external driver calls `step()` once per frame and
//! stops scheduling frames as soon as it returns `false`.

use glam::Vec2;

use super::history::HistoryBuffer;
use super::kinematics;
use super::scrub::{self, Axis, ScrubRange};
use super::state::{Arena, ConfigError, DisplayFrame, KinematicState, SimPhase, SimulationConfig};
use crate::consts::*;
use crate::{clamp_to_canvas, launch_direction};

/// Where a freshly integrated state ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Still travelling inside the canvas
    InFlight,
    /// Hit the terminal surface; settle and enable scrubbing
    Landed,
    /// Left the canvas; discard the run
    OffScreen,
}

/// Per-scenario parameters of the generic core
pub trait Scenario {
    /// Axis the pointer scrubs along once landed
    fn scrub_axis(&self) -> Axis {
        Axis::Horizontal
    }

    /// Static pose shown before the first launch
    fn rest_pose(&self, arena: &Arena) -> KinematicState;

    /// Initial state of a run
    fn seed(&self, config: &SimulationConfig, arena: &Arena) -> KinematicState;

    /// Integrate one frame
    fn advance(&self, state: &KinematicState, config: &SimulationConfig) -> KinematicState;

    /// Collision predicate applied after every integration
    fn classify(&self, state: &KinematicState, arena: &Arena) -> Outcome;

    /// Terminal snapshot recorded on landing
    fn settle(&self, state: &KinematicState, arena: &Arena) -> KinematicState;
}

/// Ball launched from the lower-left corner, landing on the ground line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub radius: f32,
    pub launch_angle: f32,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            launch_angle: LAUNCH_ANGLE,
        }
    }
}

impl Scenario for Projectile {
    fn rest_pose(&self, arena: &Arena) -> KinematicState {
        KinematicState::new(arena.launch_point(self.radius), Vec2::ZERO)
    }

    fn seed(&self, config: &SimulationConfig, arena: &Arena) -> KinematicState {
        KinematicState::new(
            arena.launch_point(self.radius),
            launch_direction(self.launch_angle) * config.initial_speed,
        )
    }

    fn advance(&self, state: &KinematicState, config: &SimulationConfig) -> KinematicState {
        kinematics::step(state, config.gravity)
    }

    fn classify(&self, state: &KinematicState, arena: &Arena) -> Outcome {
        // Ground wins over the side edges on the same frame
        if kinematics::touches_ground(state, self.radius, arena.ground_y()) {
            Outcome::Landed
        } else if kinematics::out_of_bounds(state, self.radius, arena.width) {
            Outcome::OffScreen
        } else {
            Outcome::InFlight
        }
    }

    fn settle(&self, state: &KinematicState, arena: &Arena) -> KinematicState {
        kinematics::settle_on_ground(state, self.radius, arena.ground_y())
    }
}

/// All state of one interactive simulation
#[derive(Debug, Clone)]
pub struct SimulationCore<S: Scenario = Projectile> {
    scenario: S,
    arena: Arena,
    /// Config of the current (or last) run
    config: SimulationConfig,
    phase: SimPhase,
    /// Live state while running, displayed snapshot while reversed
    live: KinematicState,
    history: HistoryBuffer,
    /// Computed once on landing
    range: Option<ScrubRange>,
    display_index: Option<usize>,
}

impl SimulationCore<Projectile> {
    pub fn projectile(arena: Arena) -> Self {
        Self::new(Projectile::default(), arena)
    }
}

impl<S: Scenario> SimulationCore<S> {
    pub fn new(scenario: S, arena: Arena) -> Self {
        let live = scenario.rest_pose(&arena);
        Self {
            scenario,
            arena,
            config: SimulationConfig::default(),
            phase: SimPhase::Idle,
            live,
            history: HistoryBuffer::with_capacity(256),
            range: None,
            display_index: None,
        }
    }

    /// Start (or restart) a run. Legal from every phase.
    ///
    /// An invalid config leaves the simulation untouched.
    pub fn launch(&mut self, config: SimulationConfig) -> Result<(), ConfigError> {
        if let Err(e) = config.validate() {
            log::warn!("Launch rejected: {}", e);
            return Err(e);
        }

        self.config = config;
        self.history.clear();
        self.range = None;
        self.display_index = None;
        self.live = self.scenario.seed(&config, &self.arena);
        self.phase = SimPhase::Running;

        log::info!(
            "Launched (gravity {:.2}, speed {:.1})",
            config.gravity,
            config.initial_speed
        );
        Ok(())
    }

    /// Integrate one frame and record it.
    ///
    /// # Panics
    /// If the simulation is not running.
    pub fn tick(&mut self) {
        assert_eq!(
            self.phase,
            SimPhase::Running,
            "tick called outside of a running simulation"
        );

        let next = self.scenario.advance(&self.live, &self.config);
        self.history.record(self.live);

        match self.scenario.classify(&next, &self.arena) {
            Outcome::InFlight => {
                self.live = next;
            }
            Outcome::Landed => {
                let settled = self.scenario.settle(&next, &self.arena);
                self.history.record(settled);
                self.live = settled;
                self.range = Some(ScrubRange::of(
                    self.history.entries(),
                    self.scenario.scrub_axis(),
                ));
                self.display_index = Some(self.history.len() - 1);
                self.phase = SimPhase::Reversed;
                log::info!(
                    "Landed at x={:.1} after {} frames",
                    settled.pos.x,
                    settled.elapsed
                );
            }
            Outcome::OffScreen => {
                self.history.clear();
                self.live = next;
                self.phase = SimPhase::OffScreen;
                log::info!("Trajectory left the canvas at x={:.1}", next.pos.x);
            }
        }
    }

    /// Driver entry point: advance if running, report whether another frame is wanted
    pub fn step(&mut self) -> bool {
        if self.phase != SimPhase::Running {
            return false;
        }
        self.tick();
        self.phase == SimPhase::Running
    }

    /// Rewind the display to the snapshot nearest `pointer`.
    ///
    /// No-op (returns `None`) outside of `Reversed`.
    pub fn scrub(&mut self, pointer: f32) -> Option<usize> {
        if self.phase != SimPhase::Reversed {
            return None;
        }
        let range = self.range?;

        let target = clamp_to_canvas(pointer, self.arena.width);
        let index = scrub::resolve(
            self.history.entries(),
            range,
            target,
            self.scenario.scrub_axis(),
        );
        self.live = self.history.entries()[index];
        self.display_index = Some(index);

        log::trace!("Scrubbed to {} (target {:.1})", index, target);
        Some(index)
    }

    /// Adopt new canvas dimensions. History is never touched.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        self.arena = Arena::new(width, height)?;
        match self.phase {
            SimPhase::Idle => {
                self.live = self.scenario.rest_pose(&self.arena);
            }
            SimPhase::Reversed => {
                let current = self.scenario.scrub_axis().component(self.live.pos);
                self.scrub(current);
            }
            SimPhase::Running | SimPhase::OffScreen => {}
        }
        Ok(())
    }

    #[inline]
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Currently displayable kinematic state
    #[inline]
    pub fn current_state(&self) -> &KinematicState {
        &self.live
    }

    #[inline]
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn scrub_range(&self) -> Option<ScrubRange> {
        self.range
    }

    pub fn display_index(&self) -> Option<usize> {
        self.display_index
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn scenario(&self) -> &S {
        &self.scenario
    }

    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame {
            mode: self.phase,
            state: self.live,
            history_len: self.history.len(),
            display_index: self.display_index,
        }
    }
}

/// Headless driver: step until the run ends or `max_frames` is reached.
/// Returns the number of frames stepped.
pub fn run_to_completion<S: Scenario>(core: &mut SimulationCore<S>, max_frames: u32) -> u32 {
    let mut frames = 0;
    while frames < max_frames && core.phase() == SimPhase::Running {
        core.step();
        frames += 1;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core(width: f32, height: f32) -> SimulationCore {
        SimulationCore::projectile(Arena::new(width, height).unwrap())
    }

    #[test]
    fn test_idle_rest_pose() {
        let sim = core(800.0, 600.0);
        assert_eq!(sim.phase(), SimPhase::Idle);
        assert_eq!(sim.current_state().pos, Vec2::new(38.0, 562.0));
        assert!(sim.history().is_empty());
    }

    #[test]
    fn test_launch_seeds_45_degrees() {
        let mut sim = core(800.0, 600.0);
        sim.launch(SimulationConfig::new(0.15, 13.0)).unwrap();
        assert_eq!(sim.phase(), SimPhase::Running);
        let s = sim.current_state();
        assert!((s.vel.x - 13.0 * LAUNCH_ANGLE.cos()).abs() < 1e-5);
        assert!((s.vel.y + 13.0 * LAUNCH_ANGLE.sin()).abs() < 1e-5);
        assert_eq!(s.elapsed, 0.0);
    }

    #[test]
    fn test_invalid_launch_stays_idle() {
        let mut sim = core(800.0, 600.0);
        let err = sim.launch(SimulationConfig::new(-0.1, 13.0)).unwrap_err();
        assert_eq!(err, ConfigError::Gravity(-0.1));
        assert_eq!(sim.phase(), SimPhase::Idle);
        assert!(!sim.step());
    }

    #[test]
    fn test_invalid_launch_keeps_reversed_run() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::default()).unwrap();
        run_to_completion(&mut sim, 1_000);
        assert_eq!(sim.phase(), SimPhase::Reversed);
        let idx = sim.scrub(400.0).unwrap();
        let history_before = sim.history().entries().to_vec();
        let shown = *sim.current_state();

        let err = sim.launch(SimulationConfig::new(0.0, 13.0)).unwrap_err();
        assert_eq!(err, ConfigError::Gravity(0.0));
        assert_eq!(sim.phase(), SimPhase::Reversed);
        assert_eq!(sim.history().entries(), history_before.as_slice());
        assert_eq!(sim.display_index(), Some(idx));
        assert_eq!(*sim.current_state(), shown);
        assert_eq!(sim.scrub(400.0), Some(idx));
    }

    #[test]
    fn test_history_grows_one_per_tick() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::default()).unwrap();
        for n in 1..=20 {
            assert!(sim.step());
            assert_eq!(sim.history().len(), n);
        }
        assert_eq!(sim.current_state().elapsed, 20.0);
    }

    #[test]
    fn test_landing_on_wide_canvas() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::new(0.15, 13.0)).unwrap();

        let mut ticks = 0;
        while sim.step() {
            ticks += 1;
        }
        ticks += 1; // the landing tick returns false

        assert_eq!(sim.phase(), SimPhase::Reversed);
        // One entry per tick plus the settled entry
        assert_eq!(sim.history().len(), ticks + 1);

        let last = *sim.history().last().unwrap();
        assert_eq!(last.vel, Vec2::ZERO);
        assert_eq!(last.pos.y + BALL_RADIUS, 600.0 - HORIZON_OFFSET);
        assert_eq!(sim.display_index(), Some(sim.history().len() - 1));

        let idx = sim.scrub(last.pos.x).unwrap();
        assert_eq!(idx, sim.history().len() - 1);
        assert_eq!(*sim.current_state(), last);
    }

    #[test]
    fn test_off_screen_on_800_wide_canvas() {
        // At speed 13 the ball would land near x=1160, well past 800+2r
        let mut sim = core(800.0, 600.0);
        sim.launch(SimulationConfig::new(0.15, 13.0)).unwrap();
        let frames = run_to_completion(&mut sim, 1000);

        assert_eq!(sim.phase(), SimPhase::OffScreen);
        assert_eq!(frames, 85);
        assert!(sim.history().is_empty());
        assert_eq!(sim.scrub(400.0), None);
        assert!(!sim.step());
    }

    #[test]
    fn test_scrub_is_display_only() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::default()).unwrap();
        run_to_completion(&mut sim, 1000);
        let before = sim.history().entries().to_vec();

        let idx = sim.scrub(300.0).unwrap();
        assert_eq!(sim.history().entries(), before.as_slice());
        assert_eq!(*sim.current_state(), before[idx]);
        assert!(sim.current_state().speed() > 0.0);

        // Same pointer, same answer
        assert_eq!(sim.scrub(300.0), Some(idx));
    }

    #[test]
    fn test_scrub_clamps_pointer() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::default()).unwrap();
        run_to_completion(&mut sim, 1000);

        assert_eq!(sim.scrub(-500.0), sim.scrub(0.0));
        assert_eq!(sim.scrub(5000.0), sim.scrub(1280.0));
    }

    #[test]
    fn test_scrub_ignored_while_running() {
        let mut sim = core(1280.0, 600.0);
        assert_eq!(sim.scrub(100.0), None);
        sim.launch(SimulationConfig::default()).unwrap();
        sim.step();
        let live = *sim.current_state();
        assert_eq!(sim.scrub(100.0), None);
        assert_eq!(*sim.current_state(), live);
    }

    #[test]
    fn test_relaunch_clears_history() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::default()).unwrap();
        run_to_completion(&mut sim, 1000);
        assert_eq!(sim.phase(), SimPhase::Reversed);
        assert!(!sim.history().is_empty());

        sim.launch(SimulationConfig::new(0.3, 8.0)).unwrap();
        assert_eq!(sim.phase(), SimPhase::Running);
        assert!(sim.history().is_empty());
        assert_eq!(sim.scrub_range(), None);
        assert_eq!(sim.display_index(), None);
        assert_eq!(sim.config().gravity, 0.3);

        sim.step();
        assert_eq!(sim.history().len(), 1);
    }

    #[test]
    #[should_panic(expected = "outside of a running simulation")]
    fn test_tick_while_idle_panics() {
        core(800.0, 600.0).tick();
    }

    #[test]
    fn test_resize_keeps_history() {
        let mut sim = core(1280.0, 600.0);
        sim.launch(SimulationConfig::default()).unwrap();
        run_to_completion(&mut sim, 1000);
        let idx = sim.scrub(500.0).unwrap();
        let len = sim.history().len();

        sim.resize(1400.0, 700.0).unwrap();
        assert_eq!(sim.history().len(), len);
        assert_eq!(sim.display_index(), Some(idx));
        assert_eq!(sim.phase(), SimPhase::Reversed);

        // Narrower than the display point: the pointer clamps to the new edge
        sim.resize(200.0, 700.0).unwrap();
        assert_eq!(sim.history().len(), len);
        assert!(sim.current_state().pos.x <= 200.0 + 10.0);
    }

    #[test]
    fn test_resize_idle_moves_rest_pose() {
        let mut sim = core(800.0, 600.0);
        sim.resize(1024.0, 768.0).unwrap();
        assert_eq!(sim.current_state().pos, Vec2::new(38.0, 730.0));
        assert!(sim.resize(0.0, 768.0).is_err());
    }

    /// Falls straight down: every recorded x is the same
    struct VerticalDrop;

    impl Scenario for VerticalDrop {
        fn rest_pose(&self, _arena: &Arena) -> KinematicState {
            KinematicState::new(Vec2::new(100.0, 50.0), Vec2::ZERO)
        }
        fn seed(&self, _config: &SimulationConfig, arena: &Arena) -> KinematicState {
            self.rest_pose(arena)
        }
        fn advance(&self, state: &KinematicState, config: &SimulationConfig) -> KinematicState {
            kinematics::step(state, config.gravity)
        }
        fn classify(&self, state: &KinematicState, arena: &Arena) -> Outcome {
            if kinematics::touches_ground(state, 5.0, arena.ground_y()) {
                Outcome::Landed
            } else {
                Outcome::InFlight
            }
        }
        fn settle(&self, state: &KinematicState, arena: &Arena) -> KinematicState {
            kinematics::settle_on_ground(state, 5.0, arena.ground_y())
        }
    }

    #[test]
    fn test_vertical_drop_scrubs_to_rest() {
        let mut sim = SimulationCore::new(VerticalDrop, Arena::new(400.0, 400.0).unwrap());
        sim.launch(SimulationConfig::new(0.5, 1.0)).unwrap();
        run_to_completion(&mut sim, 1000);

        assert_eq!(sim.phase(), SimPhase::Reversed);
        assert!(sim.scrub_range().unwrap().is_degenerate());
        let last = sim.history().len() - 1;
        for pointer in [0.0, 100.0, 399.0] {
            assert_eq!(sim.scrub(pointer), Some(last));
        }
    }

    #[test]
    fn test_frame_reports_mode() {
        let mut sim = core(1280.0, 600.0);
        assert_eq!(sim.frame().mode, SimPhase::Idle);
        sim.launch(SimulationConfig::default()).unwrap();
        sim.step();
        let frame = sim.frame();
        assert_eq!(frame.mode, SimPhase::Running);
        assert_eq!(frame.history_len, 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = core(1280.0, 600.0);
        let mut b = core(1280.0, 600.0);
        a.launch(SimulationConfig::new(0.2, 11.0)).unwrap();
        b.launch(SimulationConfig::new(0.2, 11.0)).unwrap();
        run_to_completion(&mut a, 1000);
        run_to_completion(&mut b, 1000);
        assert_eq!(a.history().entries(), b.history().entries());
    }
}
