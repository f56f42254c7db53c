//! Per-sample unit surface normals of a heightfield.

use glam::Vec3;
use rayon::prelude::*;
use tracing::debug;

use super::gradient;
use crate::terrain::{Grid, PixelSpacing, TerrainError};

/// Unit surface normals stored as three component grids.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalField {
    pub dx: Grid,
    pub dy: Grid,
    pub dz: Grid,
}

impl NormalField {
    pub fn shape(&self) -> (usize, usize) {
        self.dx.shape()
    }

    /// Returns the normal at `(i, j)` as a vector.
    pub fn at(&self, i: usize, j: usize) -> Vec3 {
        Vec3::new(self.dx[(i, j)], self.dy[(i, j)], self.dz[(i, j)])
    }

    /// Iterates over all normals in storage order.
    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.dx
            .as_slice()
            .iter()
            .zip(self.dy.as_slice())
            .zip(self.dz.as_slice())
            .map(|((&x, &y), &z)| Vec3::new(x, y, z))
    }
}

/// Turns a spacing-scaled slope `(dx, dy)` into a unit normal.
///
/// Normals point away from increasing height, so callers pass the negated
/// gradient. Works in f64 so steep but finite slopes keep their direction.
fn unit_normal(dx: f64, dy: f64) -> Vec3 {
    let slope = dx.hypot(dy);
    let dz = slope.atan().cos().max(0.0);

    let d = slope.hypot(dz);
    if d.is_finite() && d > 0.0 {
        return Vec3::new((dx / d) as f32, (dy / d) as f32, (dz / d) as f32);
    }

    // Overflowed gradient: a vertical wall facing down-slope.
    let axis = |v: f64| if v.is_infinite() { v.signum() as f32 } else { 0.0 };
    let wall = Vec3::new(axis(dx), axis(dy), 0.0).normalize_or_zero();
    if wall == Vec3::ZERO {
        Vec3::Z
    } else {
        wall
    }
}

/// Calculates the surface normals of `vals`.
///
/// `spacing` gives the world distance between samples along the first
/// (`xres`) and second (`yres`) axes.
pub fn surface_normals(vals: &Grid, spacing: PixelSpacing) -> Result<NormalField, TerrainError> {
    spacing.validate()?;
    let (mut dx, mut dy) = gradient(vals)?;
    let mut dz = Grid::new(vals.nx(), vals.ny());

    debug!(nx = vals.nx(), ny = vals.ny(), xres = spacing.xres, yres = spacing.yres, "computing surface normals");

    let (xres, yres) = (f64::from(spacing.xres), f64::from(spacing.yres));
    dx.as_mut_slice()
        .par_iter_mut()
        .zip(dy.as_mut_slice().par_iter_mut())
        .zip(dz.as_mut_slice().par_iter_mut())
        .for_each(|((x, y), z)| {
            let n = unit_normal(f64::from(*x) / -xres, f64::from(*y) / -yres);
            *x = n.x;
            *y = n.y;
            *z = n.z;
        });

    Ok(NormalField { dx, dy, dz })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spacing(xres: f32, yres: f32) -> PixelSpacing {
        PixelSpacing::new(xres, yres).unwrap()
    }

    #[test]
    fn test_flat_grid_points_up() {
        let vals = Grid::filled(5, 5, 120.0);
        let field = surface_normals(&vals, spacing(2.5, 2.5)).unwrap();

        for n in field.iter() {
            assert_eq!(n, Vec3::Z);
        }
    }

    #[test]
    fn test_normals_are_unit_length() {
        let vals = Grid::from_fn(17, 17, |i, j| {
            let (x, y) = (i as f32 * 0.4, j as f32 * 0.3);
            (x.sin() * y.cos()) * 500.0 + (x * y) * 12.0
        });
        let field = surface_normals(&vals, spacing(1.0, 3.0)).unwrap();

        for n in field.iter() {
            assert!((n.length() - 1.0).abs() < 1e-5, "length {}", n.length());
        }
    }

    #[test]
    fn test_steep_finite_input_stays_unit_length() {
        let vals = Grid::from_vec(2, 2, vec![-3.0e38, 0.0, 3.0e38, 1.0]).unwrap();
        let field = surface_normals(&vals, spacing(1.0e-3, 1.0e-3)).unwrap();

        for n in field.iter() {
            assert!(n.is_finite());
            assert!((n.length() - 1.0).abs() < 1e-5, "length {}", n.length());
        }
    }

    #[test]
    fn test_steep_diagonal_cliff_keeps_direction() {
        // Both slopes are finite but their hypotenuse exceeds f32::MAX.
        let vals = Grid::from_vec(2, 2, vec![-1.5e38, 1.5e38, 1.5e38, 1.5e38]).unwrap();
        let field = surface_normals(&vals, spacing(1.0, 1.0)).unwrap();

        let n = field.at(0, 0);
        let expected = Vec3::new(-1.0, -1.0, 0.0).normalize();
        assert!((n - expected).length() < 1e-5, "normal {:?}", n);
    }

    #[test]
    fn test_normal_leans_away_from_uphill() {
        // Height increases with i: the normal must lean toward -x.
        let vals = Grid::from_fn(4, 4, |i, _| i as f32 * 2.0);
        let field = surface_normals(&vals, spacing(1.0, 1.0)).unwrap();

        let n = field.at(1, 1);
        assert!(n.x < 0.0);
        assert!(n.y.abs() < 1e-6);
        assert!(n.z > 0.0);
    }

    #[test]
    fn test_ramp_matches_closed_form() {
        // v = 2i + j with unit spacing: slope (-2, -1), dz = 1 / sqrt(6).
        let vals = Grid::from_fn(3, 3, |i, j| 2.0 * i as f32 + j as f32);
        let field = surface_normals(&vals, spacing(1.0, 1.0)).unwrap();

        let dz = 1.0 / 6.0_f32.sqrt();
        let d = (5.0 + dz * dz).sqrt();
        let expected = Vec3::new(-2.0 / d, -1.0 / d, dz / d);
        for n in field.iter() {
            assert!((n - expected).length() < 1e-6);
        }
    }

    #[test]
    fn test_spacing_scales_slope() {
        let vals = Grid::from_fn(3, 3, |i, _| i as f32);
        let coarse = surface_normals(&vals, spacing(10.0, 10.0)).unwrap();
        let fine = surface_normals(&vals, spacing(0.1, 0.1)).unwrap();

        assert!(coarse.at(1, 1).z > fine.at(1, 1).z);
    }

    #[test]
    fn test_errors() {
        let vals = Grid::new(1, 4);
        assert_eq!(
            surface_normals(&vals, spacing(1.0, 1.0)),
            Err(TerrainError::GridTooSmall { nx: 1, ny: 4 })
        );

        let vals = Grid::new(3, 3);
        let bad = PixelSpacing { xres: 0.0, yres: 1.0 };
        assert!(matches!(
            surface_normals(&vals, bad),
            Err(TerrainError::InvalidSpacing { .. })
        ));
    }

    #[test]
    fn test_overflowed_gradient_falls_back() {
        let n = unit_normal(f64::NEG_INFINITY, 0.0);
        assert_eq!(n, Vec3::new(-1.0, 0.0, 0.0));

        let n = unit_normal(f64::INFINITY, f64::INFINITY);
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert_eq!(n.z, 0.0);
    }
}
