//! Order parameter and its running average over temperature.

use crate::lattice::LatticeState;

/// Highest temperature on the control (k_B T / J).
pub const MAX_TEMPERATURE: f64 = 2.0;
/// Temperature resolution of the control and of the curve buckets.
pub const TEMPERATURE_STEP: f64 = 0.01;
/// Buckets covering `[0.00, 2.00]` inclusive.
pub const TEMPERATURE_BUCKETS: usize = 201;

/// `|(Σ cos θ, Σ sin θ)| / N` over a set of angles; 0 for an empty set.
pub fn magnetization_of(angles: &[f64]) -> f64 {
    if angles.is_empty() {
        return 0.0;
    }
    let (sx, sy) = angles
        .iter()
        .fold((0.0, 0.0), |(sx, sy), &a| (sx + a.cos(), sy + a.sin()));
    sx.hypot(sy) / angles.len() as f64
}

/// XY order parameter of the lattice, in `[0, 1]`.
pub fn magnetization(lattice: &LatticeState) -> f64 {
    magnetization_of(lattice.angles())
}

/// Running mean of magnetization per temperature bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnetizationCurve {
    cumulative: Vec<f64>,
    counts: Vec<u32>,
}

impl Default for MagnetizationCurve {
    fn default() -> Self {
        Self::new()
    }
}

impl MagnetizationCurve {
    pub fn new() -> Self {
        Self {
            cumulative: vec![0.0; TEMPERATURE_BUCKETS],
            counts: vec![0; TEMPERATURE_BUCKETS],
        }
    }

    /// Bucket index for temperature `t`, or `None` outside `[0, 2]`.
    pub fn bucket(t: f64) -> Option<usize> {
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        let idx = (t / TEMPERATURE_STEP).round() as usize;
        (idx < TEMPERATURE_BUCKETS).then_some(idx)
    }

    /// Add one sample. Returns false if `t` has no bucket.
    pub fn record(&mut self, t: f64, m: f64) -> bool {
        match Self::bucket(t) {
            Some(idx) => {
                self.cumulative[idx] += m;
                self.counts[idx] += 1;
                true
            }
            None => false,
        }
    }

    pub fn samples(&self, bucket: usize) -> u32 {
        self.counts.get(bucket).copied().unwrap_or(0)
    }

    /// Mean of bucket, `None` when empty.
    pub fn mean(&self, bucket: usize) -> Option<f64> {
        match self.samples(bucket) {
            0 => None,
            n => Some(self.cumulative[bucket] / n as f64),
        }
    }

    /// `[T, <m>]` for every non-empty bucket, ascending in T.
    pub fn points(&self) -> Vec<[f64; 2]> {
        (0..TEMPERATURE_BUCKETS)
            .filter_map(|i| self.mean(i).map(|m| [i as f64 * TEMPERATURE_STEP, m]))
            .collect()
    }

    pub fn clear(&mut self) {
        self.cumulative.iter_mut().for_each(|c| *c = 0.0);
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::LatticeSize;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_aligned_lattice_is_fully_magnetized() {
        let mut lat = LatticeState::new(LatticeSize::N64);
        lat.fill(2.1);
        assert_abs_diff_eq!(magnetization(&lat), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_opposite_halves_cancel() {
        let mut lat = LatticeState::new(LatticeSize::N32);
        let n = lat.side();
        for y in 0..n {
            for x in 0..n {
                lat.set(x, y, if y < n / 2 { 0.3 } else { 0.3 + PI });
            }
        }
        assert_abs_diff_eq!(magnetization(&lat), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(magnetization_of(&[]), 0.0);
    }

    #[test]
    fn test_buckets() {
        assert_eq!(MagnetizationCurve::bucket(0.0), Some(0));
        assert_eq!(MagnetizationCurve::bucket(1.0), Some(100));
        assert_eq!(MagnetizationCurve::bucket(0.894), Some(89));
        assert_eq!(MagnetizationCurve::bucket(2.0), Some(200));
        assert_eq!(MagnetizationCurve::bucket(2.01), None);
        assert_eq!(MagnetizationCurve::bucket(-0.5), None);
        assert_eq!(MagnetizationCurve::bucket(f64::NAN), None);
    }

    #[test]
    fn test_running_average() {
        let mut curve = MagnetizationCurve::new();
        assert!(curve.points().is_empty());
        assert!(curve.record(0.5, 0.9));
        assert!(curve.record(0.5, 0.7));
        assert!(curve.record(1.5, 0.1));
        assert!(!curve.record(3.0, 0.1));

        assert_eq!(curve.samples(50), 2);
        assert_abs_diff_eq!(curve.mean(50).unwrap(), 0.8, epsilon = 1e-12);
        assert_eq!(curve.mean(51), None);

        let pts = curve.points();
        assert_eq!(pts.len(), 2);
        assert_abs_diff_eq!(pts[0][0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(pts[1][1], 0.1, epsilon = 1e-12);

        curve.clear();
        assert!(curve.points().is_empty());
    }
}
