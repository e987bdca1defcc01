//! Platform abstraction layer
//!
//! Frame-loop bookkeeping shared by the browser driver and tests. The
//! browser hands out an opaque handle per `requestAnimationFrame`; a
//! generation counter guards against a stale callback running after its
//! loop was cancelled or replaced.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::sim::{ConfigError, Scenario, SimulationConfig, SimulationCore};

/// Identifies one scheduled frame continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(u64);

/// Tracks the single pending frame continuation of a simulation
#[derive(Debug, Default)]
pub struct FrameLoop {
    generation: u64,
    pending: Option<i32>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scheduling a continuation. Any earlier token becomes stale.
    pub fn begin(&mut self) -> FrameToken {
        self.generation += 1;
        FrameToken(self.generation)
    }

    /// Remember the platform handle of the request made for the current token
    pub fn attach(&mut self, handle: i32) {
        self.pending = Some(handle);
    }

    /// Stop the loop. Returns the handle the platform must cancel, if any.
    pub fn cancel(&mut self) -> Option<i32> {
        self.generation += 1;
        self.pending.take()
    }

    /// A continuation fired. `false` means it belongs to a cancelled loop
    /// and must not touch simulation state.
    pub fn accept(&mut self, token: FrameToken) -> bool {
        if token.0 != self.generation {
            log::debug!("Dropping stale frame {:?}", token);
            return false;
        }
        self.pending = None;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Restart a run with a fresh config.
///
/// The config is checked before the pending frame is cancelled, so a
/// rejected launch leaves both the loop and the simulation running as they
/// were. On success returns the platform handle the caller must cancel.
pub fn relaunch<S: Scenario>(
    core: &mut SimulationCore<S>,
    frames: &mut FrameLoop,
    config: SimulationConfig,
) -> Result<Option<i32>, ConfigError> {
    config.validate()?;
    let stale = frames.cancel();
    core.launch(config)?;
    Ok(stale)
}
