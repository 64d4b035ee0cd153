//! Capital grid — strictly increasing asset levels on `[kMin, kMax]`.
use crate::{
    config::GridSpec,
    errors::{ModelError, ModelResult},
};
use ndarray::ArrayView1;

/// Grid — immutable capital levels.
///
/// Point `i` of an `n`-point grid sits at
/// `kMin + (kMax - kMin) · (i / (n-1))^curvature`; `curvature = 1` is the
/// uniform grid. Endpoints are exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    points: Vec<f64>,
}

impl Grid {
    /// Uniformly spaced grid.
    ///
    /// # Errors
    /// See [`GridSpec::new`].
    pub fn uniform(k_min: f64, k_max: f64, k_num: usize) -> ModelResult<Self> {
        Self::from_spec(&GridSpec::new(k_min, k_max, k_num, 1.0)?)
    }

    /// Power-spaced grid, denser near `k_min` for `curvature > 1`.
    ///
    /// # Errors
    /// See [`GridSpec::new`].
    pub fn power(k_min: f64, k_max: f64, k_num: usize, curvature: f64) -> ModelResult<Self> {
        Self::from_spec(&GridSpec::new(k_min, k_max, k_num, curvature)?)
    }

    /// Build the grid described by a validated [`GridSpec`].
    ///
    /// # Errors
    /// [`ModelError::InvalidGridBounds`] if rounding collapses two adjacent
    /// points (extreme curvature with many points).
    pub fn from_spec(spec: &GridSpec) -> ModelResult<Self> {
        let GridSpec { k_min, k_max, k_num, curvature } = *spec;
        let span = k_max - k_min;
        let last = (k_num - 1) as f64;
        let mut points: Vec<f64> =
            (0..k_num).map(|i| k_min + span * (i as f64 / last).powf(curvature)).collect();
        points[0] = k_min;
        points[k_num - 1] = k_max;
        if points.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ModelError::InvalidGridBounds {
                min: k_min,
                max: k_max,
                reason: "Grid points must be strictly increasing.",
            });
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: grids hold at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Borrowing limit `kMin`.
    pub fn min(&self) -> f64 {
        self.points[0]
    }

    /// Upper bound `kMax`.
    pub fn max(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    pub fn points(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.points.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_grid_has_even_spacing_and_exact_endpoints() {
        let grid = Grid::uniform(0.0, 40.0, 101).unwrap();

        assert_eq!(grid.len(), 101);
        assert_eq!(grid.min(), 0.0);
        assert_eq!(grid.max(), 40.0);
        assert_relative_eq!(grid.as_slice()[50], 20.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Curvature > 1 clusters points near the borrowing limit.
    fn power_grid_is_denser_near_lower_bound() {
        let grid = Grid::power(1.0, 11.0, 11, 2.0).unwrap();
        let k = grid.as_slice();

        assert_relative_eq!(k[1], 1.1, epsilon = 1e-12);
        assert!(k[1] - k[0] < k[10] - k[9]);
        assert!(k.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(grid.max(), 11.0);
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert!(matches!(Grid::uniform(2.0, 1.0, 10), Err(ModelError::InvalidGridBounds { .. })));
        assert!(matches!(Grid::uniform(0.0, 1.0, 1), Err(ModelError::InvalidGridSize { n: 1 })));
        assert!(matches!(
            Grid::power(0.0, 1.0, 10, 0.0),
            Err(ModelError::InvalidGridCurvature { .. })
        ));
    }
}
