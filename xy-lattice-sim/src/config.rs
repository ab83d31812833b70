//! Engine configuration and temperature helpers.

use std::time::Duration;

use crate::lattice::LatticeSize;
use crate::render::DEFAULT_VIEWPORT;
use crate::statistics::MAX_TEMPERATURE;

/// Smallest beta accepted over the command channel (T = 2).
pub const MIN_COMMAND_BETA: f64 = 1.0 / MAX_TEMPERATURE;

/// Frame interval matching a 60 Hz display.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// `beta = 1 / T`; `T = 0` gives `+∞`.
pub fn temperature_to_beta(t: f64) -> f64 {
    if t == 0.0 {
        f64::INFINITY
    } else {
        1.0 / t
    }
}

/// `T = 1 / beta`; `beta = +∞` gives 0.
pub fn beta_to_temperature(beta: f64) -> f64 {
    if beta.is_infinite() {
        0.0
    } else {
        1.0 / beta
    }
}

/// Settings for a simulation engine and its worker thread.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Initial lattice size sent with the surface handoff.
    pub size: LatticeSize,
    /// Initial inverse temperature.
    pub beta: f64,
    /// Time between animation frames while running.
    pub frame_interval: Duration,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: LatticeSize::N32,
            beta: 1.0,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Logical output size surfaces are expected to have.
    pub const VIEWPORT: (usize, usize) = (DEFAULT_VIEWPORT, DEFAULT_VIEWPORT);

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_temperature(mut self, t: f64) -> Self {
        self.beta = temperature_to_beta(t);
        self
    }
}
