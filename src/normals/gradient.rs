//! Finite-difference gradient with second-order interior accuracy.

use crate::terrain::{Grid, TerrainError};

/// Computes the partial derivatives of `vals` along both axes.
///
/// Returns `(dx, dy)`, each with the shape of `vals`. `dx` differentiates
/// along the first axis (`i`), `dy` along the second (`j`).
///
/// Interior samples use the central difference `v[k+1] / 2 - v[k-1] / 2`;
/// the first and last sample on each axis use a one-sided difference so no
/// row or column is lost.
///
/// Grids with fewer than two samples on either axis yield
/// [`TerrainError::GridTooSmall`].
pub fn gradient(vals: &Grid) -> Result<(Grid, Grid), TerrainError> {
    let (nx, ny) = vals.shape();
    if nx < 2 || ny < 2 {
        return Err(TerrainError::GridTooSmall { nx, ny });
    }

    let mut dx = Grid::new(nx, ny);
    let mut dy = Grid::new(nx, ny);

    for j in 0..ny {
        dx[(0, j)] = vals[(1, j)] - vals[(0, j)];
        dx[(nx - 1, j)] = vals[(nx - 1, j)] - vals[(nx - 2, j)];
    }
    for i in 1..nx - 1 {
        for j in 0..ny {
            dx[(i, j)] = vals[(i + 1, j)] * 0.5 - vals[(i - 1, j)] * 0.5;
        }
    }

    for (i, row) in vals.rows().enumerate() {
        dy[(i, 0)] = row[1] - row[0];
        dy[(i, ny - 1)] = row[ny - 1] - row[ny - 2];
        for j in 1..ny - 1 {
            dy[(i, j)] = row[j + 1] * 0.5 - row[j - 1] * 0.5;
        }
    }

    Ok((dx, dy))
}
