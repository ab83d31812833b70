//! The simulation engine: lattice, kernel, renderer and surface in one owner.
//!
//! An engine exists only after a surface handoff and lives on the worker
//! thread. It also carries the animation state (`Stopped`/`Running`); the
//! worker asks it for one frame at a time while it is running, so there is
//! never more than one schedule per engine.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::command::{Instruction, Method, Property, SurfaceHandoff};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::lattice::{LatticeSize, LatticeState};
use crate::metropolis::{MetropolisEngine, SweepStats};
use crate::render::{PixelBuffer, Renderer};
use crate::statistics;
use crate::surface::Surface;

/// Animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

pub struct SimulationEngine {
    surface: Box<dyn Surface>,
    lattice: LatticeState,
    kernel: MetropolisEngine,
    renderer: Renderer,
    rng: StdRng,
    state: LoopState,
    sweeps: u64,
    last_stats: SweepStats,
}

impl SimulationEngine {
    /// Build an engine around a surface. The lattice starts zero-filled and
    /// nothing is drawn until [`initialize_data`](Self::initialize_data) and
    /// [`render`](Self::render) are called.
    pub fn new(surface: Box<dyn Surface>, size: LatticeSize, config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let renderer = Renderer::new(size, surface.size());
        Self {
            surface,
            lattice: LatticeState::new(size),
            kernel: MetropolisEngine::new(config.beta),
            renderer,
            rng,
            state: LoopState::Stopped,
            sweeps: 0,
            last_stats: SweepStats::default(),
        }
    }

    /// Build from a handoff, rejecting dimensions outside the size set.
    pub fn from_handoff(handoff: SurfaceHandoff, config: &EngineConfig) -> Result<Self> {
        let size = handoff.lattice_size()?;
        Ok(Self::new(handoff.surface, size, config))
    }

    pub fn lattice(&self) -> &LatticeState {
        &self.lattice
    }

    pub fn size(&self) -> LatticeSize {
        self.lattice.size()
    }

    pub fn beta(&self) -> f64 {
        self.kernel.beta()
    }

    /// Change the inverse temperature. Takes effect from the next sweep.
    pub fn set_beta(&mut self, beta: f64) {
        self.kernel.set_beta(beta);
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Total sweeps performed since the engine was built.
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Counters from the most recent sweep.
    pub fn last_stats(&self) -> SweepStats {
        self.last_stats
    }

    /// Lattice-sized pixel buffer from the most recent render.
    pub fn pixels(&self) -> &PixelBuffer {
        self.renderer.pixels()
    }

    pub fn magnetization(&self) -> f64 {
        statistics::magnetization(&self.lattice)
    }

    /// Reallocate lattice and pixel buffer. Pauses first if running.
    pub fn resize(&mut self, size: LatticeSize) {
        self.pause();
        log::debug!("resize {} -> {}", self.lattice.size(), size);
        self.lattice.resize(size);
        self.renderer.resize(size);
    }

    /// Fresh uniformly random field. Pauses first if running.
    pub fn initialize_data(&mut self) {
        self.pause();
        self.lattice.initialize(&mut self.rng);
    }

    /// Start the animation. A second call while running is a no-op.
    pub fn play(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("play ignored, already running");
            return;
        }
        log::debug!("play");
        self.state = LoopState::Running;
    }

    /// Stop the animation. Safe to call when already stopped.
    pub fn pause(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("pause after {} sweeps", self.sweeps);
        }
        self.state = LoopState::Stopped;
    }

    /// Pause, then exactly one sweep and one render.
    pub fn step(&mut self) -> SweepStats {
        self.pause();
        let stats = self.sweep();
        self.render();
        stats
    }

    /// Pause, then a fresh random field and a render.
    pub fn reset(&mut self) {
        self.pause();
        self.initialize_data();
        self.render();
    }

    /// One Metropolis sweep, regardless of animation state.
    pub fn sweep(&mut self) -> SweepStats {
        let stats = self.kernel.sweep(&mut self.lattice, &mut self.rng);
        self.sweeps += 1;
        self.last_stats = stats;
        stats
    }

    /// Draw the current field onto the surface.
    pub fn render(&mut self) {
        self.renderer.render(&self.lattice, self.surface.as_mut());
    }

    /// One animation frame: sweep then render, only while running.
    pub fn frame(&mut self) -> Option<SweepStats> {
        if self.state != LoopState::Running {
            return None;
        }
        let stats = self.sweep();
        self.render();
        Some(stats)
    }

    /// Dispatch a decoded method.
    pub fn invoke(&mut self, method: Method) {
        match method {
            Method::Resize(size) => self.resize(size),
            Method::InitializeData => self.initialize_data(),
            Method::Play => self.play(),
            Method::Pause => self.pause(),
            Method::Step => {
                self.step();
            }
            Method::Render => self.render(),
            Method::Reset => self.reset(),
        }
    }

    pub fn set_property(&mut self, property: Property) {
        match property {
            Property::Beta(beta) => self.set_beta(beta),
        }
    }

    /// Apply a non-handoff instruction. Handoffs are handled by the owner,
    /// which builds a new engine; one reaching here is ignored.
    pub fn apply(&mut self, instruction: Instruction) {
        match instruction {
            Instruction::Invoke(method) => self.invoke(method),
            Instruction::SetProperty(property) => self.set_property(property),
            Instruction::Handoff(handoff) => {
                log::warn!("handoff {:?} delivered to a live engine, ignored", handoff);
            }
        }
    }
}
