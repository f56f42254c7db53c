//! Single-pass min/max/range statistics.

use super::{Grid, TerrainError};

/// Minimum, maximum and range (`max - min`) of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeStats {
    pub min: f32,
    pub max: f32,
    pub range: f32,
}

impl RangeStats {
    /// Scans `grid` once and returns its extent.
    ///
    /// NaN samples never compare and are skipped. A grid with no comparable
    /// samples (including an empty grid) yields [`TerrainError::EmptyGrid`].
    pub fn compute(grid: &Grid) -> Result<Self, TerrainError> {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;

        for &v in grid.as_slice() {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }

        if min > max {
            return Err(TerrainError::EmptyGrid);
        }

        Ok(Self {
            min,
            max,
            range: max - min,
        })
    }

    /// True when every sample had the same value.
    pub fn is_flat(&self) -> bool {
        self.range == 0.0
    }
}
