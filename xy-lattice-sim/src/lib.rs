//! # xy-lattice-sim
//!
//! Classical XY model on an N×N torus, relaxed by single-site Metropolis
//! sweeps and rendered as a hue field.
//!
//! ## Physics
//!
//! - Each site holds a planar spin angle θ ∈ [0, 2π)
//! - Nearest-neighbor coupling: E = -Σ⟨ij⟩ cos(θᵢ - θⱼ) (J = 1, k_B = 1)
//! - Order parameter: m = |Σ (cos θ, sin θ)| / N², in [0, 1]
//! - The Berezinskii–Kosterlitz–Thouless crossover sits near T ≈ 0.89
//!
//! ## Threading
//!
//! The [`worker::SimWorker`] owns the engine on a dedicated thread and is
//! driven by ordered, fire-and-forget instruction batches
//! ([`command::Instruction`]). Rendered frames leave through the
//! handed-off [`surface::Surface`].

pub mod error;
pub mod lattice;
pub mod metropolis;
pub mod render;
pub mod surface;
pub mod statistics;
pub mod config;
pub mod command;
pub mod engine;
pub mod worker;

pub mod prelude {
    pub use crate::command::*;
    pub use crate::config::*;
    pub use crate::engine::*;
    pub use crate::error::SimError;
    pub use crate::lattice::*;
    pub use crate::metropolis::*;
    pub use crate::render::*;
    pub use crate::statistics::*;
    pub use crate::surface::*;
    pub use crate::worker::*;
}
