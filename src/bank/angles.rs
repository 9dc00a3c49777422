//! Orientation grid over the half circle.

use crate::util::{MsldError, MsldResult};

/// Evenly spaced line orientations `k * 180 / n` for `k = 0..n`.
///
/// A line and its 180 degree rotation are the same line, so the grid covers
/// `[0, 180)` only.
#[derive(Clone, Debug, PartialEq)]
pub struct OrientationGrid {
    count: usize,
    step_deg: f64,
}

impl OrientationGrid {
    /// Creates a grid with `count` orientations.
    pub fn new(count: usize) -> MsldResult<Self> {
        if count == 0 {
            return Err(MsldError::InvalidOrientationCount { count });
        }
        Ok(Self {
            count,
            step_deg: 180.0 / count as f64,
        })
    }

    /// Returns the number of orientations.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always false; a grid holds at least one orientation.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the angular step in degrees.
    pub fn step_deg(&self) -> f64 {
        self.step_deg
    }

    /// Returns the angle for index `idx` in degrees.
    pub fn angle_at(&self, idx: usize) -> f64 {
        debug_assert!(idx < self.count);
        idx as f64 * self.step_deg
    }

    /// Iterates over all angles in the grid.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.count).map(|idx| self.angle_at(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::OrientationGrid;
    use crate::MsldError;

    #[test]
    fn grid_spans_half_circle() {
        let grid = OrientationGrid::new(12).unwrap();
        let angles: Vec<f64> = grid.iter().collect();
        assert_eq!(angles.len(), 12);
        assert_eq!(angles[0], 0.0);
        assert!((angles[1] - 15.0).abs() < 1e-12);
        assert!((angles[11] - 165.0).abs() < 1e-12);
    }

    #[test]
    fn non_divisor_counts_keep_exact_spacing() {
        let grid = OrientationGrid::new(7).unwrap();
        assert_eq!(grid.len(), 7);
        assert!(grid.iter().all(|a| a < 180.0));
        assert!((grid.step_deg() * 7.0 - 180.0).abs() < 1e-9);
    }

    #[test]
    fn zero_orientations_is_rejected() {
        assert_eq!(
            OrientationGrid::new(0).unwrap_err(),
            MsldError::InvalidOrientationCount { count: 0 }
        );
    }
}
