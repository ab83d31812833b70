//! N×N field of planar spin angles on a torus.
//!
//! Sites are stored row-major: site (x, y) lives at index `y * n + x`.
//! Every site has exactly four neighbors, `(x±1 mod n, y)` and
//! `(x, y±1 mod n)`, so there is no boundary special-casing anywhere.
//! All stored angles lie in `[0, 2π)`.

use std::f64::consts::TAU;
use std::fmt;

use rand::Rng;

use crate::error::{Result, SimError};

/// The fixed set of lattice side lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LatticeSize {
    #[default]
    N32,
    N64,
    N128,
    N256,
    N512,
}

impl LatticeSize {
    /// All sizes, smallest first.
    pub const ALL: [LatticeSize; 5] = [
        LatticeSize::N32,
        LatticeSize::N64,
        LatticeSize::N128,
        LatticeSize::N256,
        LatticeSize::N512,
    ];

    /// Side length N.
    pub const fn side(self) -> usize {
        match self {
            LatticeSize::N32 => 32,
            LatticeSize::N64 => 64,
            LatticeSize::N128 => 128,
            LatticeSize::N256 => 256,
            LatticeSize::N512 => 512,
        }
    }

    /// Position in [`LatticeSize::ALL`] (slider index).
    pub fn index(self) -> usize {
        LatticeSize::ALL
            .iter()
            .position(|&s| s == self)
            .unwrap_or_default()
    }

    /// Inverse of [`LatticeSize::index`].
    pub fn from_index(idx: usize) -> Option<Self> {
        LatticeSize::ALL.get(idx).copied()
    }

    /// Validate a side length. Non-positive and off-set values are rejected.
    pub fn from_side(n: i64) -> Result<Self> {
        LatticeSize::ALL
            .iter()
            .copied()
            .find(|s| s.side() as i64 == n)
            .ok_or(SimError::InvalidSize(n))
    }
}

impl TryFrom<usize> for LatticeSize {
    type Error = SimError;

    fn try_from(n: usize) -> Result<Self> {
        LatticeSize::from_side(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for LatticeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.side())
    }
}

/// Reduce an angle into `[0, 2π)`.
///
/// `rem_euclid` can round up to exactly `2π` for tiny negative inputs,
/// which is folded back to 0.
pub fn wrap_angle(theta: f64) -> f64 {
    let r = theta.rem_euclid(TAU);
    if r >= TAU {
        0.0
    } else {
        r
    }
}

/// The spin field.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeState {
    size: LatticeSize,
    angles: Vec<f64>,
}

impl LatticeState {
    /// Allocate a zero-filled lattice. Call [`LatticeState::initialize`] for a random start.
    pub fn new(size: LatticeSize) -> Self {
        let n = size.side();
        Self {
            size,
            angles: vec![0.0; n * n],
        }
    }

    /// Uniformly random lattice.
    pub fn random<R: Rng + ?Sized>(size: LatticeSize, rng: &mut R) -> Self {
        let mut lattice = Self::new(size);
        lattice.initialize(rng);
        lattice
    }

    pub fn size(&self) -> LatticeSize {
        self.size
    }

    /// Side length N.
    pub fn side(&self) -> usize {
        self.size.side()
    }

    /// Number of sites (N²).
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Raw row-major angle field (read-only).
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Linear index of site (x, y).
    pub fn index(&self, x: usize, y: usize) -> usize {
        let n = self.side();
        (y % n) * n + (x % n)
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.angles[self.index(x, y)]
    }

    /// Store an angle at (x, y), wrapped into `[0, 2π)`.
    pub fn set(&mut self, x: usize, y: usize, theta: f64) {
        let idx = self.index(x, y);
        self.angles[idx] = wrap_angle(theta);
    }

    /// Store an angle by linear index, wrapped into `[0, 2π)`.
    pub fn set_index(&mut self, idx: usize, theta: f64) {
        self.angles[idx] = wrap_angle(theta);
    }

    /// Set every site to the same angle.
    pub fn fill(&mut self, theta: f64) {
        let theta = wrap_angle(theta);
        self.angles.iter_mut().for_each(|a| *a = theta);
    }

    /// Replace the field with N² independent draws from `Uniform[0, 2π)`.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for a in self.angles.iter_mut() {
            *a = wrap_angle(TAU * rng.gen::<f64>());
        }
    }

    /// Reallocate at a new size. Prior contents are discarded.
    pub fn resize(&mut self, size: LatticeSize) {
        let n = size.side();
        self.size = size;
        self.angles = vec![0.0; n * n];
    }

    /// The 4 neighbors of (x, y) as linear indices: right, left, down, up.
    pub fn neighbors(&self, x: usize, y: usize) -> [usize; 4] {
        let n = self.side();
        [
            y * n + (x + 1) % n,
            y * n + (x + n - 1) % n,
            ((y + 1) % n) * n + x,
            ((y + n - 1) % n) * n + x,
        ]
    }

    /// Bond energy of site (x, y) if it held angle `theta`:
    /// `-Σ cos(theta - θ_neighbor)` over the 4 neighbors.
    pub fn local_energy(&self, x: usize, y: usize, theta: f64) -> f64 {
        -self
            .neighbors(x, y)
            .iter()
            .map(|&j| (theta - self.angles[j]).cos())
            .sum::<f64>()
    }

    /// Total energy, each bond counted once (right and down bonds).
    pub fn energy(&self) -> f64 {
        let n = self.side();
        let mut e = 0.0;
        for y in 0..n {
            for x in 0..n {
                let here = self.angles[y * n + x];
                let [right, _, down, _] = self.neighbors(x, y);
                e -= (here - self.angles[right]).cos();
                e -= (here - self.angles[down]).cos();
            }
        }
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_fills_every_size_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in LatticeSize::ALL {
            let lat = LatticeState::random(size, &mut rng);
            let n = size.side();
            assert_eq!(lat.len(), n * n);
            assert!(
                lat.angles().iter().all(|&a| (0.0..TAU).contains(&a)),
                "angle out of [0, 2π) for N={}",
                n
            );
        }
    }

    #[test]
    fn test_size_validation() {
        assert_eq!(LatticeSize::from_side(128).unwrap(), LatticeSize::N128);
        assert!(LatticeSize::from_side(0).is_err());
        assert!(LatticeSize::from_side(-32).is_err());
        assert!(LatticeSize::from_side(48).is_err());
        assert!(LatticeSize::try_from(1024usize).is_err());
        for (i, s) in LatticeSize::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
            assert_eq!(LatticeSize::from_index(i), Some(*s));
        }
        assert_eq!(LatticeSize::from_index(5), None);
    }

    #[test]
    fn test_neighbors_wrap() {
        let lat = LatticeState::new(LatticeSize::N32);
        let n = 32;
        // Corner (0, 0): left is (31, 0), up is (0, 31)
        let [right, left, down, up] = lat.neighbors(0, 0);
        assert_eq!(right, 1);
        assert_eq!(left, n - 1);
        assert_eq!(down, n);
        assert_eq!(up, (n - 1) * n);
        // Opposite corner
        let [right, left, down, up] = lat.neighbors(n - 1, n - 1);
        assert_eq!(right, (n - 1) * n);
        assert_eq!(left, (n - 1) * n + n - 2);
        assert_eq!(down, n - 1);
        assert_eq!(up, (n - 2) * n + n - 1);
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut lat = LatticeState::random(LatticeSize::N32, &mut rng);
        lat.resize(LatticeSize::N64);
        assert_eq!(lat.side(), 64);
        assert_eq!(lat.len(), 64 * 64);
        assert!(lat.angles().iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert_eq!(wrap_angle(TAU), 0.0);
        assert!((wrap_angle(-1.0) - (TAU - 1.0)).abs() < 1e-12);
        assert!((wrap_angle(3.0 * TAU + 0.5) - 0.5).abs() < 1e-9);
        assert!(wrap_angle(-1e-300) < TAU);
    }

    #[test]
    fn test_ground_state_energy() {
        let mut lat = LatticeState::new(LatticeSize::N32);
        lat.fill(1.3);
        // 2 bonds per site, each contributes -1
        assert!((lat.energy() + 2.0 * 32.0 * 32.0).abs() < 1e-9);
        assert!((lat.local_energy(5, 5, 1.3) + 4.0).abs() < 1e-12);
    }
}
