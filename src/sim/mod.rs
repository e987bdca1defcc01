//! Deterministic simulation module
//!
//! All physics and interaction logic lives here. This module must stay pure:
//! - Fixed one-frame timestep only
//! - No rendering or platform dependencies
//! - Mutation only through the frame driver and pointer handlers

pub mod history;
pub mod kinematics;
pub mod oscillator;
pub mod preview;
pub mod readout;
pub mod scrub;
pub mod state;
pub mod tick;

pub use history::{HistoryBuffer, Timestamped};
pub use oscillator::{DragStop, Energies, OscPhase, OscillatorConfig, Sample, SpringOscillator};
pub use preview::{OscillationPreview, PreviewFit, PreviewPlayer};
pub use readout::{OscillatorReadout, Readout, VelocityArrows};
pub use scrub::{Axis, ScrubRange, resolve, resolve_closest};
pub use state::{
    Arena, ConfigError, DisplayFrame, FRAME_STEP, KinematicState, SimPhase, SimulationConfig,
};
pub use tick::{Outcome, Projectile, Scenario, SimulationCore, run_to_completion};
