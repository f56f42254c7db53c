//! Rescaling of heightfields into the `[0, 1]` range terrain engines expect.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Grid, RangeStats, TerrainError};

/// What to do with a perfectly flat heightfield (`range == 0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlatPolicy {
    /// Emit an all-zero heightfield.
    #[default]
    Zero,
    /// Fail with [`TerrainError::DegenerateRange`].
    Reject,
}

/// Returns a copy of `grid` with every sample mapped to `(v - min) / range`.
pub fn normalize(grid: &Grid, stats: &RangeStats, policy: FlatPolicy) -> Result<Grid, TerrainError> {
    let mut out = grid.clone();
    normalize_in_place(&mut out, stats, policy)?;
    Ok(out)
}

/// In-place variant of [`normalize`].
///
/// On error the grid is left untouched.
pub fn normalize_in_place(
    grid: &mut Grid,
    stats: &RangeStats,
    policy: FlatPolicy,
) -> Result<(), TerrainError> {
    // f64 keeps `max - min` finite for grids spanning most of the f32 range.
    let min = stats.min as f64;
    let range = stats.max as f64 - min;

    if range == 0.0 {
        return match policy {
            FlatPolicy::Zero => {
                warn!(value = stats.min, "flat heightfield, normalizing to zero");
                grid.as_mut_slice().fill(0.0);
                Ok(())
            }
            FlatPolicy::Reject => Err(TerrainError::DegenerateRange { value: stats.min }),
        };
    }

    debug!(min = stats.min, max = stats.max, samples = grid.len(), "normalizing heightfield");

    grid.as_mut_slice().par_iter_mut().for_each(|v| {
        *v = ((*v as f64 - min) / range) as f32;
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_extent_is_unit() {
        let grid = Grid::from_fn(9, 9, |i, j| 250.0 + (i as f32 * 3.1) - (j as f32 * 1.7));
        let stats = RangeStats::compute(&grid).unwrap();

        let out = normalize(&grid, &stats, FlatPolicy::Zero).unwrap();
        let out_stats = RangeStats::compute(&out).unwrap();

        assert_eq!(out_stats.min, 0.0);
        assert_eq!(out_stats.max, 1.0);
        // Source grid is not mutated.
        assert_eq!(grid.get(0, 0), 250.0);
    }

    #[test]
    fn test_in_place_matches_copy() {
        let grid = Grid::from_fn(3, 4, |i, j| (i * j) as f32);
        let stats = RangeStats::compute(&grid).unwrap();

        let copy = normalize(&grid, &stats, FlatPolicy::Zero).unwrap();
        let mut in_place = grid.clone();
        normalize_in_place(&mut in_place, &stats, FlatPolicy::Zero).unwrap();

        assert_eq!(copy, in_place);
        assert!((in_place.get(2, 3) - 1.0).abs() < 1e-6);
        assert!((in_place.get(1, 3) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_flat_grid_zero_policy() {
        let grid = Grid::filled(5, 5, 3.25);
        let stats = RangeStats::compute(&grid).unwrap();

        let out = normalize(&grid, &stats, FlatPolicy::Zero).unwrap();
        assert!(out.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_flat_grid_reject_policy() {
        let mut grid = Grid::filled(5, 5, 3.25);
        let stats = RangeStats::compute(&grid).unwrap();

        let result = normalize_in_place(&mut grid, &stats, FlatPolicy::Reject);
        assert_eq!(result, Err(TerrainError::DegenerateRange { value: 3.25 }));
        assert!(grid.as_slice().iter().all(|&v| v == 3.25));
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let grid = Grid::from_vec(1, 3, vec![-3.0e38, 0.0, 3.0e38]).unwrap();
        let stats = RangeStats::compute(&grid).unwrap();

        let out = normalize(&grid, &stats, FlatPolicy::Zero).unwrap();
        assert!(out.as_slice().iter().all(|v| v.is_finite()));
        assert_eq!(out.get(0, 0), 0.0);
        assert!((out.get(0, 1) - 0.5).abs() < 1e-6);
        assert_eq!(out.get(0, 2), 1.0);
    }
}
