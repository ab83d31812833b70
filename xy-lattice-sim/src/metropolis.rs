//! Single-site Metropolis updates for the XY model.
//!
//! A sweep walks the lattice in raster order (row-major) and attempts one
//! update per site. It is a direct sequential sweep, not a checkerboard:
//! when a site is visited, neighbors earlier in the same pass already hold
//! their updated angles. Sweeps must stay sequential for this reason.
//!
//! Per site:
//! 1. `E_now   = -Σ cos(θ - θ_j)` over the 4 neighbors
//! 2. propose `δ ~ Uniform[0, 2π)`
//! 3. `E_after = -Σ cos(θ + δ - θ_j)`
//! 4. accept if `E_after < E_now`, or if `u < exp(-β (E_after - E_now))`
//!    for a fresh `u ~ Uniform(0, 1)`
//! 5. on acceptance `θ ← (θ + δ) mod 2π`

use std::f64::consts::TAU;

use rand::distributions::Open01;
use rand::Rng;

use crate::lattice::LatticeState;

/// Probability of accepting a move that changes the local energy by `delta_e`.
///
/// Downhill moves are always accepted. At `β = +∞` (zero temperature) any
/// move with `delta_e >= 0` has probability exactly 0; this avoids the
/// `∞ · 0 = NaN` that the naive Boltzmann factor produces at `delta_e = 0`.
pub fn acceptance_probability(beta: f64, delta_e: f64) -> f64 {
    if delta_e < 0.0 {
        return 1.0;
    }
    if beta.is_infinite() {
        return 0.0;
    }
    (-beta * delta_e).exp()
}

/// Outcome of one attempted single-site update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    pub energy_now: f64,
    pub energy_after: f64,
    pub accepted: bool,
}

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub attempted: usize,
    pub accepted: usize,
}

impl SweepStats {
    /// Fraction of attempted moves that were accepted.
    pub fn acceptance_ratio(&self) -> f64 {
        if self.attempted == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.attempted as f64
    }
}

/// Metropolis kernel parameterized by inverse temperature.
///
/// `beta` is not validated here: callers may set any value between sweeps,
/// including `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetropolisEngine {
    beta: f64,
}

impl Default for MetropolisEngine {
    fn default() -> Self {
        Self { beta: 1.0 }
    }
}

impl MetropolisEngine {
    pub fn new(beta: f64) -> Self {
        Self { beta }
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta;
    }

    /// Attempt to rotate site (x, y) by `delta`.
    ///
    /// `draw` is only consulted for uphill (or flat) moves, mirroring the
    /// short-circuit of the acceptance rule; it is a closure so the random
    /// number is not consumed for downhill moves.
    pub fn attempt<F: FnOnce() -> f64>(
        &self,
        lattice: &mut LatticeState,
        x: usize,
        y: usize,
        delta: f64,
        draw: F,
    ) -> Proposal {
        let theta = lattice.get(x, y);
        let energy_now = lattice.local_energy(x, y, theta);
        let energy_after = lattice.local_energy(x, y, theta + delta);

        let accepted = energy_after < energy_now
            || draw() < acceptance_probability(self.beta, energy_after - energy_now);

        if accepted {
            lattice.set(x, y, theta + delta);
        }

        Proposal {
            energy_now,
            energy_after,
            accepted,
        }
    }

    /// One full raster-order sweep.
    pub fn sweep<R: Rng + ?Sized>(&self, lattice: &mut LatticeState, rng: &mut R) -> SweepStats {
        self.sweep_with(lattice, rng, |_, _, _| {})
    }

    /// Sweep, calling `observe(x, y, proposal)` after every attempt.
    pub fn sweep_with<R, F>(&self, lattice: &mut LatticeState, rng: &mut R, mut observe: F) -> SweepStats
    where
        R: Rng + ?Sized,
        F: FnMut(usize, usize, &Proposal),
    {
        let n = lattice.side();
        let mut stats = SweepStats::default();

        for y in 0..n {
            for x in 0..n {
                let delta = TAU * rng.gen::<f64>();
                let proposal = self.attempt(lattice, x, y, delta, || rng.sample(Open01));
                stats.attempted += 1;
                if proposal.accepted {
                    stats.accepted += 1;
                }
                observe(x, y, &proposal);
            }
        }

        stats
    }
}
